//! Resource pipeline for a 2D tile renderer.
//!
//! Source images and their side-car files are loaded through a
//! [`GameRegistry`], packed into one texture atlas, and exposed as per-key
//! geometry: vertex quads, animations, weighted variations and connected
//! (autotiling) textures.

pub mod atlas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod resources;

pub use config::PipelineConfig;
pub use error::{ResourceError, Result};
pub use resources::{GameRegistry, ResourceManager};
