//! Materials and their per-render-pass graphics state.
//!
//! A material owns, per global render-pass index, a pipeline state object
//! and a resource binding table. These are materialized lazily when a render
//! pipeline with a matching pass is registered and dropped again when that
//! pipeline is destroyed, so a material's pass table always mirrors the set
//! of live pipelines.

use super::pass::{AlphaBlendMode, GraphicsPipelineOptions, RenderPassDesc};

use crate::error::{Error, Result};
use crate::gfx::{
    BindingTableId, BlendFactor, BlendState, BoundResource, BufferId, BufferUsage,
    DepthStencilState, Device, PipelineStateDesc, PipelineStateId, RasterizerState, ShaderId,
    ShaderResourceKind, TextureId,
};

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::{error, warn};
use slotmap::new_key_type;

new_key_type! {
    pub(crate) struct MaterialKey;
}

/// Handle to a material owned by a [`super::Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialHandle {
    pub(crate) key: MaterialKey,
    pub(crate) renderer: u32,
}

/// Value of a material shader property.
///
/// The default value of a property also fixes its type; parameter overrides
/// must match it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    /// A texture reference; `None` when the referenced texture failed to
    /// load.
    Texture(Option<TextureId>),
}

impl PropertyValue {
    /// Size of the value inside the material constant buffer. Textures are
    /// bound directly and take no buffer space.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        match self {
            PropertyValue::Int(_) | PropertyValue::Float(_) => 4,
            PropertyValue::Vec2(_) => 8,
            PropertyValue::Vec3(_) => 12,
            PropertyValue::Vec4(_) => 16,
            PropertyValue::Mat4(_) => 64,
            PropertyValue::Texture(_) => 0,
        }
    }

    fn write_to(&self, out: &mut [u8]) {
        match self {
            PropertyValue::Int(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            PropertyValue::Float(v) => out[..4].copy_from_slice(&v.to_le_bytes()),
            PropertyValue::Vec2(v) => out[..8].copy_from_slice(bytemuck::bytes_of(v)),
            PropertyValue::Vec3(v) => out[..12].copy_from_slice(bytemuck::bytes_of(v)),
            PropertyValue::Vec4(v) => out[..16].copy_from_slice(bytemuck::bytes_of(v)),
            PropertyValue::Mat4(v) => out[..64].copy_from_slice(bytemuck::bytes_of(v)),
            PropertyValue::Texture(_) => {}
        }
    }
}

/// Description of a material shader property.
#[derive(Debug, Clone)]
pub struct PropertyDesc {
    /// Property name; must match a shader variable for texture properties.
    pub name: String,
    /// Default value, used when a mesh instance provides no override.
    pub default_value: PropertyValue,
}

/// A named parameter value supplied at draw time.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub value: PropertyValue,
}

/// Description of a material.
#[derive(Debug, Clone)]
pub struct MaterialDesc {
    /// Name of the material, used for lookup and diagnostics.
    pub name: String,
    /// Type tag matched against render-pass material filters.
    pub material_type: String,
    /// The material's shader.
    pub shader: ShaderId,
    /// Shader properties with default values.
    pub properties: Vec<PropertyDesc>,
    /// Per-field pipeline option overrides.
    pub pipeline_options: GraphicsPipelineOptions,
    /// Number of directional lights the material's shader uses.
    pub num_directional_lights: u32,
    /// Number of point lights the material's shader uses.
    pub num_point_lights: u32,
}

// A property with its packed offset in the material constant buffer.
#[derive(Debug, Clone)]
struct PackedParam {
    name: String,
    default_value: PropertyValue,
    buffer_offset: usize,
}

// Graphics state for one (material × render pass) combination.
struct PassData {
    pipeline: PipelineStateId,
    bindings: BindingTableId,
}

/// Names that the engine binds itself; material properties may not use them.
const PREDEFINED_VARIABLES: [&str; 4] = [
    "InstanceConstants",
    "ViewConstants",
    "Material",
    "DirectionalLightConstants",
];

pub(crate) struct Material {
    name: String,
    material_type: String,
    shader: ShaderId,
    options: GraphicsPipelineOptions,
    num_directional_lights: u32,
    num_point_lights: u32,

    params: Vec<PackedParam>,
    param_buffer: Option<BufferId>,
    param_buffer_size: usize,

    // Indexed by global render-pass index; `None` where this material is
    // not rendered.
    pass_data: Vec<Option<PassData>>,
}

impl Material {
    pub(crate) fn new(device: &mut Device, desc: &MaterialDesc) -> Result<Self> {
        validate_against_shader(device, desc)?;

        // Pack the non-texture properties into the constant buffer in
        // declaration order. A property that does not fit in the remainder
        // of the current 16-byte block is bumped to the next block.
        let mut params = Vec::with_capacity(desc.properties.len());
        let mut buffer_size = 0usize;
        for property in &desc.properties {
            let property_size = property.default_value.byte_size();
            const PARAM_ALIGNMENT: usize = 16;
            let remaining = PARAM_ALIGNMENT - (buffer_size % PARAM_ALIGNMENT);
            if property_size > remaining {
                buffer_size = buffer_size.div_ceil(PARAM_ALIGNMENT) * PARAM_ALIGNMENT;
            }
            params.push(PackedParam {
                name: property.name.clone(),
                default_value: property.default_value,
                buffer_offset: buffer_size,
            });
            buffer_size += property_size;
        }

        let param_buffer = if buffer_size > 0 {
            Some(device.create_buffer(
                &format!("{} constants", desc.name),
                buffer_size,
                BufferUsage::Dynamic,
            )?)
        } else {
            None
        };

        Ok(Self {
            name: desc.name.clone(),
            material_type: desc.material_type.clone(),
            shader: desc.shader,
            options: desc.pipeline_options,
            num_directional_lights: desc.num_directional_lights,
            num_point_lights: desc.num_point_lights,
            params,
            param_buffer,
            param_buffer_size: buffer_size,
            pass_data: Vec::new(),
        })
    }

    #[must_use]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub(crate) fn num_directional_lights(&self) -> u32 {
        self.num_directional_lights
    }

    #[must_use]
    pub(crate) fn num_point_lights(&self) -> u32 {
        self.num_point_lights
    }

    /// Builds the pipeline state and binding table for a render pass.
    ///
    /// Does nothing if the pass's material-type filter does not match.
    pub(crate) fn set_render_pass(
        &mut self,
        device: &mut Device,
        pass_index: usize,
        pass: &RenderPassDesc,
        view_buffer: BufferId,
        instance_buffer: BufferId,
    ) -> Result<()> {
        if !pass.material_type.eq_ignore_ascii_case(&self.material_type) {
            return Ok(());
        }

        if pass_index >= self.pass_data.len() {
            self.pass_data.resize_with(pass_index + 1, || None);
        }

        let options = GraphicsPipelineOptions::combine(&pass.default_options, &self.options);
        let blend = match options.alpha_blend_mode {
            AlphaBlendMode::None => None,
            AlphaBlendMode::BlendSrc => Some(BlendState {
                src_factor: BlendFactor::SrcAlpha,
                dst_factor: BlendFactor::InvSrcAlpha,
            }),
            AlphaBlendMode::Additive => Some(BlendState {
                src_factor: BlendFactor::One,
                dst_factor: BlendFactor::One,
            }),
        };

        let pipeline = device.create_pipeline_state(PipelineStateDesc {
            name: format!("{} pass {pass_index}", self.name),
            shader: self.shader,
            blend,
            depth_stencil: DepthStencilState {
                depth_enable: options.depth_enable,
                depth_func: options.depth_comparison_func,
                depth_write_enable: options.depth_write_enable,
            },
            rasterizer: RasterizerState {
                cull_mode: options.cull_mode,
                front_ccw: options.front_ccw,
            },
        })?;

        // Static variables are bound once here; the dynamic set (Material,
        // DirectionalLightConstants, texture properties) is rebound per
        // draw in `set_active`.
        let bindings = device.create_binding_table();
        device.bind(bindings, "InstanceConstants", BoundResource::Buffer(instance_buffer));
        device.bind(bindings, "ViewConstants", BoundResource::Buffer(view_buffer));

        if let Some(old) = self.pass_data[pass_index].replace(PassData { pipeline, bindings }) {
            device.destroy_pipeline_state(old.pipeline);
            device.destroy_binding_table(old.bindings);
        }
        Ok(())
    }

    /// Drops the graphics state for a render pass, if any exists.
    pub(crate) fn clear_render_pass(&mut self, device: &mut Device, pass_index: usize) {
        if pass_index < self.pass_data.len() {
            if let Some(data) = self.pass_data[pass_index].take() {
                device.destroy_pipeline_state(data.pipeline);
                device.destroy_binding_table(data.bindings);
            }
        }
    }

    /// Checks if this material is rendered during the given pass.
    #[must_use]
    pub(crate) fn is_used(&self, pass_index: usize) -> bool {
        pass_index < self.pass_data.len() && self.pass_data[pass_index].is_some()
    }

    /// Activates the material for a render pass: binds the pipeline state,
    /// writes the parameter buffer, binds textures and the directional
    /// light buffer, and commits the resource bindings.
    pub(crate) fn set_active(
        &self,
        device: &mut Device,
        pass_index: usize,
        params: &[Param],
        directional_lights: BufferId,
    ) {
        let Some(data) = self.pass_data.get(pass_index).and_then(Option::as_ref) else {
            return;
        };

        device.set_pipeline_state(data.pipeline);

        // Fill the parameter buffer: caller-supplied value if present,
        // otherwise the material default. Texture properties bind their
        // shader resource view instead.
        let mut buffer = vec![0u8; self.param_buffer_size];
        for param in &self.params {
            let value = params
                .iter()
                .find(|p| p.name == param.name)
                .map_or(param.default_value, |p| p.value);

            if let PropertyValue::Texture(texture) = value {
                if let Some(texture) = texture {
                    device.bind(data.bindings, &param.name, BoundResource::TextureView(texture));
                }
            } else {
                value.write_to(&mut buffer[param.buffer_offset..]);
            }
        }
        if let Some(param_buffer) = self.param_buffer {
            device.write_buffer(param_buffer, &buffer);
            device.bind(data.bindings, "Material", BoundResource::Buffer(param_buffer));
        }

        device.bind(
            data.bindings,
            "DirectionalLightConstants",
            BoundResource::Buffer(directional_lights),
        );
        device.commit_bindings(data.bindings);
    }

    /// Releases all graphics state owned by the material.
    pub(crate) fn destroy(&mut self, device: &mut Device) {
        for pass_index in 0..self.pass_data.len() {
            self.clear_render_pass(device, pass_index);
        }
        if let Some(buffer) = self.param_buffer.take() {
            device.destroy_buffer(buffer);
        }
    }
}

/// Classifies the material's properties against the shader's reflected
/// resources.
///
/// Texture properties must match a reflected texture variable by name; a
/// missing variable is only logged, because shaders under development may
/// have optimized it away. A property whose name collides with a predefined
/// variable, a type mismatch, or a shader variable with no matching
/// property are configuration errors.
fn validate_against_shader(device: &Device, desc: &MaterialDesc) -> Result<()> {
    let reflection = device.shader_reflection(desc.shader).ok_or_else(|| {
        Error::BadArgument(format!("material \"{}\" has an invalid shader", desc.name))
    })?;

    let mut shader_variables: Vec<(String, ShaderResourceKind)> = Vec::new();
    for (name, kind) in reflection.resources() {
        if PREDEFINED_VARIABLES.contains(&name) {
            if kind != ShaderResourceKind::ConstantBuffer {
                error!(
                    "type of variable \"{name}\" in shader of material \"{}\" does not match its predefined type",
                    desc.name
                );
                return Err(Error::BadArgument(format!(
                    "shader variable \"{name}\" must be a constant buffer"
                )));
            }
        } else {
            shader_variables.push((name.to_string(), kind));
        }
    }

    for property in &desc.properties {
        if !matches!(property.default_value, PropertyValue::Texture(_)) {
            // Non-texture properties live inside the Material constant
            // buffer and are not top-level variables.
            continue;
        }

        if PREDEFINED_VARIABLES.contains(&property.name.as_str()) {
            return Err(Error::BadArgument(format!(
                "material \"{}\" property \"{}\" collides with a predefined variable",
                desc.name, property.name
            )));
        }

        match shader_variables.iter().position(|(n, _)| *n == property.name) {
            None => {
                warn!(
                    "missing shader variable for property \"{}\" of material \"{}\"",
                    property.name, desc.name
                );
            }
            Some(index) => {
                if shader_variables[index].1 != ShaderResourceKind::Texture {
                    error!(
                        "mismatch for shader variable type for property \"{}\" of material \"{}\"",
                        property.name, desc.name
                    );
                    return Err(Error::BadArgument(format!(
                        "property \"{}\" does not match the shader variable type",
                        property.name
                    )));
                }
                shader_variables.swap_remove(index);
            }
        }
    }

    if let Some((name, _)) = shader_variables.first() {
        error!(
            "missing material property for shader variable \"{name}\" of material \"{}\"",
            desc.name
        );
        return Err(Error::BadArgument(format!(
            "shader variable \"{name}\" has no matching material property"
        )));
    }
    Ok(())
}
