//! Loaded textures and everything derived from them.
//!
//! The [`ResourceManager`] owns the raw images and the per-key geometry; the
//! [`GameRegistry`] maps registry names onto it.

pub mod animation;
pub mod connected;
pub mod manager;
pub mod registry;
pub mod vertex_quad;
pub mod weighted_texture;

use glam::IVec2;

pub use animation::Animation;
pub use connected::{BlobTexture, ConnectedTexture, FenceTexture, Neighbours};
pub use manager::{DEFAULT_TEXTURE_KEY, ResourceManager};
pub use registry::{
    Category, EntityData, GameRegistry, MAX_HEALTH_DEFAULT, ObjectData, RegistryName, TileData, discover_entries,
};
pub use vertex_quad::{QuadVertex, VertexQuad};
pub use weighted_texture::WeightedTexture;

/// Geometry that lives at some position inside a texture and has to follow
/// that texture when it is packed into the atlas.
pub trait Relocatable {
    /// Top-left corner of the first rectangle.
    fn origin(&self) -> IVec2;

    /// Translate every rectangle so the first one starts at `position`.
    fn move_to(&mut self, position: IVec2);

    fn translate(&mut self, offset: IVec2) {
        let target = self.origin() + offset;
        self.move_to(target);
    }
}
