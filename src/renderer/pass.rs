//! Render pass and render pipeline descriptions.

use crate::gfx::{ComparisonFunc, CullMode};

/// How to sort objects by depth during a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthSorting {
    /// Objects are rendered in caller order.
    #[default]
    None,
    /// Objects closer to the camera are rendered first.
    FrontToBack,
    /// Objects closer to the camera are rendered last.
    BackToFront,
}

/// The type of alpha blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaBlendMode {
    /// Do not alpha blend.
    #[default]
    None,
    /// Source and destination are blended according to source alpha.
    BlendSrc,
    /// Source is added on top of destination.
    Additive,
}

/// Graphics pipeline options with per-field overrides.
///
/// Unset fields fall back along the chain: material override → render-pass
/// default → engine default (cull back, front counter-clockwise, no alpha
/// blend, depth test less, depth write on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphicsPipelineOptions {
    pub cull_mode: Option<CullMode>,
    pub front_ccw: Option<bool>,
    pub alpha_blend_mode: Option<AlphaBlendMode>,
    pub depth_enable: Option<bool>,
    pub depth_comparison_func: Option<ComparisonFunc>,
    pub depth_write_enable: Option<bool>,
}

/// Pipeline options with every field decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPipelineOptions {
    pub cull_mode: CullMode,
    pub front_ccw: bool,
    pub alpha_blend_mode: AlphaBlendMode,
    pub depth_enable: bool,
    pub depth_comparison_func: ComparisonFunc,
    pub depth_write_enable: bool,
}

impl GraphicsPipelineOptions {
    /// Combines pass defaults with a material override into a final set of
    /// options. Per field: the override wins if present, else the default,
    /// else the engine default.
    #[must_use]
    pub fn combine(defaults: &Self, overrides: &Self) -> ResolvedPipelineOptions {
        ResolvedPipelineOptions {
            cull_mode: overrides
                .cull_mode
                .or(defaults.cull_mode)
                .unwrap_or(CullMode::Back),
            front_ccw: overrides.front_ccw.or(defaults.front_ccw).unwrap_or(true),
            alpha_blend_mode: overrides
                .alpha_blend_mode
                .or(defaults.alpha_blend_mode)
                .unwrap_or(AlphaBlendMode::None),
            depth_enable: overrides
                .depth_enable
                .or(defaults.depth_enable)
                .unwrap_or(true),
            depth_comparison_func: overrides
                .depth_comparison_func
                .or(defaults.depth_comparison_func)
                .unwrap_or(ComparisonFunc::Less),
            depth_write_enable: overrides
                .depth_write_enable
                .or(defaults.depth_write_enable)
                .unwrap_or(true),
        }
    }
}

/// Description of a render pass in a pipeline.
///
/// A render pass renders the meshes whose material type matches its filter,
/// in a fixed depth order, with its default pipeline options applied
/// wherever the material does not override them.
#[derive(Debug, Clone, Default)]
pub struct RenderPassDesc {
    /// The type of materials to render in this pass (matched
    /// case-insensitively against the material's type tag).
    pub material_type: String,
    /// How to depth-sort the objects assigned to this pass.
    pub depth_sorting: DepthSorting,
    /// Default pipeline options for materials rendered in this pass.
    pub default_options: GraphicsPipelineOptions,
}

/// Description of a render pipeline: an ordered list of render passes.
#[derive(Debug, Clone, Default)]
pub struct RenderPipelineDesc {
    /// Name of the pipeline, used for lookup and diagnostics.
    pub name: String,
    /// The passes, rendered in declared order.
    pub render_passes: Vec<RenderPassDesc>,
}
