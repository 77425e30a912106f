//! The headless graphics device.
//!
//! Owns every GPU-side object behind `slotmap` handles and records issued
//! draws into a per-frame command log. Buffer updates follow the
//! map-with-discard model: a write replaces the buffer contents from offset
//! zero. Each recorded draw carries a byte snapshot of every constant
//! buffer bound at the time of the draw, which is what makes the render
//! loop observable to tests.

use super::shader::{self, ShaderDesc, ShaderReflection};
use super::texture::TextureDesc;
use super::{BlendState, ComparisonFunc, CullMode};

use crate::error::{Error, Result};

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct ShaderId;
    pub struct BufferId;
    pub struct TextureId;
    pub struct PipelineStateId;
    pub struct BindingTableId;
}

/// Lifetime/update policy of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Contents are fixed at creation.
    Immutable,
    /// Contents are rewritten with map-discard updates.
    Dynamic,
}

/// Depth-stencil portion of a pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_enable: bool,
    pub depth_func: ComparisonFunc,
    pub depth_write_enable: bool,
}

/// Rasterizer portion of a pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizerState {
    pub cull_mode: CullMode,
    pub front_ccw: bool,
}

/// Full description of a graphics pipeline state object.
#[derive(Debug, Clone)]
pub struct PipelineStateDesc {
    pub name: String,
    pub shader: ShaderId,
    pub blend: Option<BlendState>,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
}

/// A resource bound to a named shader variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundResource {
    Buffer(BufferId),
    TextureView(TextureId),
}

/// One recorded indexed draw with the state it was issued under.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub pipeline: PipelineStateId,
    pub vertex_buffer: Option<BufferId>,
    pub index_buffer: Option<BufferId>,
    pub index_count: u32,
    /// The committed binding table (variable name → resource).
    pub bindings: Vec<(String, BoundResource)>,
    /// Byte snapshots of every buffer in `bindings`, taken at draw time.
    pub buffer_snapshots: Vec<(String, Vec<u8>)>,
}

impl DrawCall {
    /// Returns the draw-time contents of the named constant buffer, if one
    /// was bound.
    #[must_use]
    pub fn buffer_contents(&self, name: &str) -> Option<&[u8]> {
        self.buffer_snapshots
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Returns the texture bound to the named variable, if any.
    #[must_use]
    pub fn bound_texture(&self, name: &str) -> Option<TextureId> {
        self.bindings.iter().find_map(|(n, r)| match r {
            BoundResource::TextureView(id) if n == name => Some(*id),
            _ => None,
        })
    }
}

struct ShaderObject {
    #[allow(dead_code)]
    name: String,
    reflection: ShaderReflection,
}

struct BufferObject {
    name: String,
    usage: BufferUsage,
    data: Vec<u8>,
}

struct TextureObject {
    width: u32,
    height: u32,
}

/// The headless command-recording graphics device.
pub struct Device {
    shaders: SlotMap<ShaderId, ShaderObject>,
    buffers: SlotMap<BufferId, BufferObject>,
    textures: SlotMap<TextureId, TextureObject>,
    pipelines: SlotMap<PipelineStateId, PipelineStateDesc>,
    binding_tables: SlotMap<BindingTableId, FxHashMap<String, BoundResource>>,

    // Current command-stream state
    bound_pipeline: Option<PipelineStateId>,
    bound_vertex_buffer: Option<BufferId>,
    bound_index_buffer: Option<BufferId>,
    committed_bindings: Vec<(String, BoundResource)>,

    draw_calls: Vec<DrawCall>,
}

impl Default for Device {
    fn default() -> Self {
        Self::new()
    }
}

impl Device {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shaders: SlotMap::with_key(),
            buffers: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            pipelines: SlotMap::with_key(),
            binding_tables: SlotMap::with_key(),
            bound_pipeline: None,
            bound_vertex_buffer: None,
            bound_index_buffer: None,
            committed_bindings: Vec::new(),
            draw_calls: Vec::new(),
        }
    }

    // ========================================================================
    // Shaders
    // ========================================================================

    pub fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId> {
        let reflection = shader::compile(desc)?;
        Ok(self.shaders.insert(ShaderObject {
            name: desc.name.clone(),
            reflection,
        }))
    }

    #[must_use]
    pub fn shader_reflection(&self, shader: ShaderId) -> Option<&ShaderReflection> {
        self.shaders.get(shader).map(|s| &s.reflection)
    }

    // ========================================================================
    // Buffers
    // ========================================================================

    pub fn create_buffer(&mut self, name: &str, size: usize, usage: BufferUsage) -> Result<BufferId> {
        if size == 0 {
            return Err(Error::ResourceCreation(format!(
                "buffer \"{name}\" has zero size"
            )));
        }
        Ok(self.buffers.insert(BufferObject {
            name: name.to_string(),
            usage,
            data: vec![0; size],
        }))
    }

    pub fn create_buffer_with_data(
        &mut self,
        name: &str,
        usage: BufferUsage,
        data: &[u8],
    ) -> Result<BufferId> {
        let id = self.create_buffer(name, data.len(), usage)?;
        self.buffers[id].data.copy_from_slice(data);
        Ok(id)
    }

    /// Map-with-discard write: replaces the buffer contents from offset 0.
    ///
    /// Dynamic buffers only; `data` must fit in the buffer.
    pub fn write_buffer(&mut self, buffer: BufferId, data: &[u8]) {
        let object = &mut self.buffers[buffer];
        debug_assert!(object.usage == BufferUsage::Dynamic, "{}", object.name);
        assert!(data.len() <= object.data.len());
        object.data[..data.len()].copy_from_slice(data);
    }

    #[must_use]
    pub fn buffer_data(&self, buffer: BufferId) -> &[u8] {
        &self.buffers[buffer].data
    }

    #[must_use]
    pub fn buffer_size(&self, buffer: BufferId) -> usize {
        self.buffers[buffer].data.len()
    }

    pub fn destroy_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(buffer);
    }

    // ========================================================================
    // Textures
    // ========================================================================

    pub fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        // Validate that every subresource window lies inside the backing
        // buffer before accepting the texture.
        for index in 0..desc.subresource_count() {
            let sub = desc.subresource(index);
            if sub.data_offset + sub.data_size > desc.data().len() {
                return Err(Error::ResourceCreation(format!(
                    "texture subresource {index} exceeds the backing buffer"
                )));
            }
        }
        Ok(self.textures.insert(TextureObject {
            width: desc.width(),
            height: desc.height(),
        }))
    }

    #[must_use]
    pub fn texture_size(&self, texture: TextureId) -> (u32, u32) {
        let object = &self.textures[texture];
        (object.width, object.height)
    }

    pub fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(texture);
    }

    // ========================================================================
    // Pipeline states & binding tables
    // ========================================================================

    pub fn create_pipeline_state(&mut self, desc: PipelineStateDesc) -> Result<PipelineStateId> {
        if !self.shaders.contains_key(desc.shader) {
            return Err(Error::ResourceCreation(format!(
                "pipeline \"{}\" references a destroyed shader",
                desc.name
            )));
        }
        Ok(self.pipelines.insert(desc))
    }

    #[must_use]
    pub fn pipeline_state(&self, pipeline: PipelineStateId) -> &PipelineStateDesc {
        &self.pipelines[pipeline]
    }

    pub fn destroy_pipeline_state(&mut self, pipeline: PipelineStateId) {
        self.pipelines.remove(pipeline);
    }

    pub fn create_binding_table(&mut self) -> BindingTableId {
        self.binding_tables.insert(FxHashMap::default())
    }

    /// Binds a resource to a named shader variable in a binding table.
    pub fn bind(&mut self, table: BindingTableId, name: &str, resource: BoundResource) {
        self.binding_tables[table].insert(name.to_string(), resource);
    }

    pub fn destroy_binding_table(&mut self, table: BindingTableId) {
        self.binding_tables.remove(table);
    }

    // ========================================================================
    // Command stream
    // ========================================================================

    pub fn set_pipeline_state(&mut self, pipeline: PipelineStateId) {
        self.bound_pipeline = Some(pipeline);
    }

    pub fn set_vertex_buffer(&mut self, buffer: BufferId) {
        self.bound_vertex_buffer = Some(buffer);
    }

    pub fn set_index_buffer(&mut self, buffer: BufferId) {
        self.bound_index_buffer = Some(buffer);
    }

    /// Commits a binding table to the command stream; the committed set is
    /// captured by subsequent draws.
    pub fn commit_bindings(&mut self, table: BindingTableId) {
        let mut bindings: Vec<_> = self.binding_tables[table]
            .iter()
            .map(|(name, resource)| (name.clone(), *resource))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        self.committed_bindings = bindings;
    }

    /// Records an indexed draw with the currently bound state.
    pub fn draw_indexed(&mut self, index_count: u32) {
        let pipeline = self.bound_pipeline.expect("no pipeline bound");
        let buffer_snapshots = self
            .committed_bindings
            .iter()
            .filter_map(|(name, resource)| match resource {
                BoundResource::Buffer(id) => self
                    .buffers
                    .get(*id)
                    .map(|b| (name.clone(), b.data.clone())),
                BoundResource::TextureView(_) => None,
            })
            .collect();

        self.draw_calls.push(DrawCall {
            pipeline,
            vertex_buffer: self.bound_vertex_buffer,
            index_buffer: self.bound_index_buffer,
            index_count,
            bindings: self.committed_bindings.clone(),
            buffer_snapshots,
        });
    }

    /// Drains the recorded draws since the previous call.
    pub fn take_draw_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draw_calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_snapshot_bound_buffers() {
        let mut device = Device::new();
        let shader = device
            .create_shader(&ShaderDesc {
                name: "s".into(),
                source: "cbuffer A { float x; };\nvs_main ps_main".into(),
            })
            .unwrap();
        let pso = device
            .create_pipeline_state(PipelineStateDesc {
                name: "p".into(),
                shader,
                blend: None,
                depth_stencil: DepthStencilState {
                    depth_enable: true,
                    depth_func: ComparisonFunc::Less,
                    depth_write_enable: true,
                },
                rasterizer: RasterizerState {
                    cull_mode: CullMode::Back,
                    front_ccw: true,
                },
            })
            .unwrap();

        let buffer = device.create_buffer("A", 4, BufferUsage::Dynamic).unwrap();
        let table = device.create_binding_table();
        device.bind(table, "A", BoundResource::Buffer(buffer));

        device.write_buffer(buffer, &1.0f32.to_le_bytes());
        device.set_pipeline_state(pso);
        device.commit_bindings(table);
        device.draw_indexed(3);

        // Overwrite after the draw; the snapshot must keep the draw-time value
        device.write_buffer(buffer, &2.0f32.to_le_bytes());

        let draws = device.take_draw_calls();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].buffer_contents("A"), Some(&1.0f32.to_le_bytes()[..]));
    }
}
