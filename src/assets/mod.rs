//! Asset location, descriptor parsing, and the asset cache.

mod cache;
mod descriptors;
mod loader;

pub use cache::AssetCache;
pub use descriptors::{
    load_materials, load_render_pipelines, DescriptorProperty, DescriptorPropertyValue,
    MaterialDescriptor,
};
pub use loader::{basename, AssetLoader};
