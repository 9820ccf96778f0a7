use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use tileforge::resources::discover_entries;
use tileforge::{GameRegistry, PipelineConfig};

const USAGE: &str = "usage: tileforge <resources_dir> [--config <file.json>] [--dump <atlas.png>]";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    resources_root: PathBuf,
    config: Option<PathBuf>,
    dump: Option<PathBuf>,
}

impl CliArgs {
    fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resources_root = None;
        let mut config = None;
        let mut dump = None;
        let mut iter = args.into_iter();
        while let Some(raw) = iter.next() {
            let arg: String = raw.into();
            match arg.as_str() {
                "--config" => {
                    let value: String = iter.next().ok_or_else(|| anyhow!("--config requires a value"))?.into();
                    config = Some(PathBuf::from(value));
                }
                "--dump" => {
                    let value: String = iter.next().ok_or_else(|| anyhow!("--dump requires a value"))?.into();
                    dump = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => bail!("unknown flag '{flag}'\n{USAGE}"),
                _ if resources_root.is_none() => resources_root = Some(PathBuf::from(&arg)),
                _ => bail!("unexpected argument '{arg}'\n{USAGE}"),
            }
        }
        let resources_root = resources_root.ok_or_else(|| anyhow!("missing resources directory\n{USAGE}"))?;
        Ok(Self { resources_root, config, dump })
    }

    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        config.resources_root = self.resources_root;
        if self.dump.is_some() {
            config.atlas_dump_path = self.dump;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = CliArgs::parse(env::args().skip(1))?.into_config()?;
    let root = config.resources_root.clone();
    let names = discover_entries(&root);
    if names.is_empty() {
        log::warn!("no entries found under {}", root.display());
    }
    log::info!("registering {} entries from {}", names.len(), root.display());

    let registry = GameRegistry::load(config, &names).context("building resources")?;

    let resources = registry.resources();
    if let Some(atlas) = resources.texture_atlas() {
        let (width, height) = atlas.packed_size();
        log::info!(
            "atlas {}x{} holds {} textures ({width}x{height} used)",
            atlas.side(),
            atlas.side(),
            atlas.placements().len()
        );
    }
    for name in registry.entries() {
        let rect = resources.texture_rect(name);
        let mut extras = Vec::new();
        if resources.has_animation(name) {
            extras.push("animation");
        }
        if resources.has_variations(name) {
            extras.push("variations");
        }
        if resources.has_connected_texture(name) {
            extras.push("connected");
        }
        log::info!("{name}: {rect:?} {}", extras.join(", "));
    }
    Ok(())
}
