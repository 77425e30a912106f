//! Graphics backend seam.
//!
//! The engine core is written against a headless, command-recording device
//! rather than a concrete GPU API. The device owns every GPU-side object
//! (shaders, buffers, textures, pipeline state objects, binding tables)
//! behind typed handles and applies buffer updates to CPU-side storage, so
//! frame output is fully observable: each indexed draw is recorded together
//! with a snapshot of the state it was issued under.

mod device;
mod shader;
mod texture;

pub use device::{
    BindingTableId, BoundResource, BufferId, BufferUsage, DepthStencilState, Device, DrawCall,
    PipelineStateDesc, PipelineStateId, RasterizerState, ShaderId, TextureId,
};
pub use shader::{ShaderDesc, ShaderReflection, ShaderResourceKind};
pub use texture::{ColorSpace, PixelFormat, SubresourceDesc, TextureDesc, TextureDimension};

/// Blend factors for the fixed-function blend stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    InvSrcAlpha,
}

/// A complete blend equation: `src·src_factor + dst·dst_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
}

/// Comparison function for depth-buffer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonFunc {
    Never,
    #[default]
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    None,
    #[default]
    Back,
    Front,
}
