use std::path::PathBuf;

/// Result alias used across the pipeline.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Conditions that abort a load or build step.
///
/// Recoverable conditions (duplicate keys, missing files, geometry misses)
/// never show up here; they are logged and the pipeline carries on.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode or encode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("malformed side-car file {path:?}: {source}")]
    SideCar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed pipeline config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid connected texture: {0}")]
    InvalidConnectedTexture(String),

    #[error("invalid weighted texture: {0}")]
    InvalidWeights(String),

    #[error("invalid animation: {0}")]
    InvalidAnimation(String),

    #[error("{count} textures do not fit into a {max_side}x{max_side} atlas")]
    AtlasOverflow { count: usize, max_side: u32 },

    #[error("texture atlas already built; cannot load '{key}'")]
    AtlasFrozen { key: String },

    #[error("{kind} not loaded: {key}")]
    NotLoaded { kind: &'static str, key: String },
}
