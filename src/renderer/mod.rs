//! The renderer: render-resource ownership and the per-frame dispatch loop.
//!
//! The renderer owns all graphics resources (shaders, textures, meshes,
//! materials, render pipelines) and hands out typed handles. Render passes
//! are stored in a single global table with dense, reused indices: a
//! pipeline's passes occupy indices popped from a free stack (or appended),
//! and every material keeps a plain vector indexed by global pass index for
//! its per-pass graphics state. Destroying a pipeline clears those entries
//! on all alive materials and returns the indices to the free stack.

mod camera;
pub mod material;
mod mesh;
mod pass;

pub use camera::{Camera, CameraKind, CameraMatrices, CameraProperties, Frustum};
pub use material::{MaterialDesc, MaterialHandle, Param, PropertyDesc, PropertyValue};
pub use mesh::{MeshDesc, MeshHandle, MeshInstance, Sprite, Vertex};
pub use pass::{
    AlphaBlendMode, DepthSorting, GraphicsPipelineOptions, RenderPassDesc, RenderPipelineDesc,
    ResolvedPipelineOptions,
};

use material::{Material, MaterialKey};
use mesh::MeshKey;

use crate::error::{Error, Result};
use crate::gfx::{
    BufferId, BufferUsage, Device, DrawCall, ShaderDesc, ShaderId, TextureDesc, TextureId,
};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use slotmap::{new_key_type, SlotMap};

use std::sync::atomic::{AtomicU32, Ordering};

new_key_type! {
    struct PipelineKey;
}

/// Handle to a render pipeline owned by a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPipelineHandle {
    key: PipelineKey,
    renderer: u32,
}

/// A directional light: infinitely far away, all rays parallel.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    /// Direction the light is pointing to (the direction the rays travel).
    pub direction: Vec3,
    /// Intensity multiplier for the colors.
    pub intensity: f32,
    /// Color for diffuse reflection.
    pub diffuse_color: Vec3,
    /// Color for specular reflection.
    pub specular_color: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 0.0, -1.0),
            intensity: 0.0,
            diffuse_color: Vec3::ZERO,
            specular_color: Vec3::ZERO,
        }
    }
}

// ============================================================================
// Constant buffer layouts (16-byte aligned)
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct InstanceConstants {
    world: Mat4,
    world_inv: Mat4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ViewConstants {
    view: Mat4,
    view_proj: Mat4,
    view_proj_inv: Mat4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct PackedDirectionalLight {
    direction: Vec3,
    intensity: f32,
    diffuse_color: Vec3,
    _pad0: f32,
    specular_color: Vec3,
    _pad1: f32,
}

const _: () = assert!(std::mem::size_of::<PackedDirectionalLight>() == 3 * 16);

struct Mesh {
    index_count: u32,
    vertex_buffer: BufferId,
    index_buffer: BufferId,
}

struct RenderPipeline {
    pass_indices: Vec<usize>,
}

// Number of sprites the reusable sprite buffers hold per batch.
const SPRITE_BATCH_SIZE: usize = 1024;
const VERTICES_PER_SPRITE: usize = 4;
const INDICES_PER_SPRITE: usize = 6;

static NEXT_RENDERER_ID: AtomicU32 = AtomicU32::new(1);

/// The renderer.
pub struct Renderer {
    id: u32,
    device: Device,

    materials: SlotMap<MaterialKey, Material>,
    pipelines: SlotMap<PipelineKey, RenderPipeline>,
    meshes: SlotMap<MeshKey, Mesh>,

    // Global render-pass table; freed entries are reused before the table
    // grows.
    render_passes: Vec<Option<RenderPassDesc>>,
    unused_pass_indices: Vec<usize>,

    instance_buffer: BufferId,
    view_buffer: BufferId,
    directional_light_buffer: Option<BufferId>,

    sprite_vertex_buffer: BufferId,
    sprite_index_buffer: BufferId,

    max_directional_lights: u32,
    max_point_lights: u32,
    dynamic_lights: Vec<DirectionalLight>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        let mut device = Device::new();

        let instance_buffer = device
            .create_buffer(
                "VS Instance Constants",
                std::mem::size_of::<InstanceConstants>(),
                BufferUsage::Dynamic,
            )
            .expect("instance constants");
        let view_buffer = device
            .create_buffer(
                "VS View Constants",
                std::mem::size_of::<ViewConstants>(),
                BufferUsage::Dynamic,
            )
            .expect("view constants");

        let sprite_vertex_buffer = device
            .create_buffer(
                "Sprite Vertices",
                SPRITE_BATCH_SIZE * VERTICES_PER_SPRITE * std::mem::size_of::<Vertex>(),
                BufferUsage::Dynamic,
            )
            .expect("sprite vertex buffer");

        // Prebuilt index buffer: two counter-clockwise triangles per sprite.
        let mut indices = Vec::with_capacity(SPRITE_BATCH_SIZE * INDICES_PER_SPRITE);
        for sprite in 0..SPRITE_BATCH_SIZE as u16 {
            let v = sprite * VERTICES_PER_SPRITE as u16;
            indices.extend_from_slice(&[v, v + 2, v + 1, v, v + 3, v + 2]);
        }
        let sprite_index_buffer = device
            .create_buffer_with_data(
                "Sprite Indices",
                BufferUsage::Immutable,
                bytemuck::cast_slice(&indices),
            )
            .expect("sprite index buffer");

        Self {
            id: NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed),
            device,
            materials: SlotMap::with_key(),
            pipelines: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            render_passes: Vec::new(),
            unused_pass_indices: Vec::new(),
            instance_buffer,
            view_buffer,
            directional_light_buffer: None,
            sprite_vertex_buffer,
            sprite_index_buffer,
            max_directional_lights: 0,
            max_point_lights: 0,
            dynamic_lights: Vec::new(),
        }
    }

    /// Access to the underlying device (tests inspect recorded draws and
    /// adapters create textures through it).
    pub fn device_mut(&mut self) -> &mut Device {
        &mut self.device
    }

    // ========================================================================
    // Resource creation
    // ========================================================================

    /// Compiles a shader source into a vertex + pixel stage pair.
    pub fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId> {
        self.device.create_shader(desc)
    }

    /// Creates a texture from a texture description.
    pub fn create_texture(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        self.device.create_texture(desc)
    }

    /// Creates an immutable mesh from vertex and index data.
    pub fn create_mesh(&mut self, desc: &MeshDesc) -> Result<MeshHandle> {
        let vertex_buffer = self.device.create_buffer_with_data(
            "Mesh Vertices",
            BufferUsage::Immutable,
            bytemuck::cast_slice(&desc.vertices),
        )?;
        let index_buffer = self.device.create_buffer_with_data(
            "Mesh Indices",
            BufferUsage::Immutable,
            bytemuck::cast_slice(&desc.indices),
        )?;
        let key = self.meshes.insert(Mesh {
            index_count: desc.indices.len() as u32,
            vertex_buffer,
            index_buffer,
        });
        Ok(MeshHandle {
            key,
            renderer: self.id,
        })
    }

    /// Destroys a mesh and its buffers.
    pub fn destroy_mesh(&mut self, handle: MeshHandle) {
        if handle.renderer == self.id {
            if let Some(mesh) = self.meshes.remove(handle.key) {
                self.device.destroy_buffer(mesh.vertex_buffer);
                self.device.destroy_buffer(mesh.index_buffer);
            }
        }
    }

    /// Creates a material.
    ///
    /// The material immediately receives per-pass graphics state for every
    /// render pass of every live pipeline whose material type matches. The
    /// directional-light buffer is grown if the new material declares more
    /// lights than any other alive material.
    pub fn create_material(&mut self, desc: &MaterialDesc) -> Result<MaterialHandle> {
        let mut material = Material::new(&mut self.device, desc)?;

        for (index, pass) in self.render_passes.iter().enumerate() {
            if let Some(pass) = pass {
                material.set_render_pass(
                    &mut self.device,
                    index,
                    pass,
                    self.view_buffer,
                    self.instance_buffer,
                )?;
            }
        }

        self.max_directional_lights = self
            .max_directional_lights
            .max(material.num_directional_lights());
        self.max_point_lights = self.max_point_lights.max(material.num_point_lights());

        let key = self.materials.insert(material);
        self.ensure_light_buffer_capacity();
        Ok(MaterialHandle {
            key,
            renderer: self.id,
        })
    }

    /// Destroys a material, dropping its per-pass graphics state and
    /// recomputing the maximum light capacities over the remaining alive
    /// materials.
    pub fn destroy_material(&mut self, handle: MaterialHandle) {
        if handle.renderer != self.id {
            return;
        }
        if let Some(mut material) = self.materials.remove(handle.key) {
            material.destroy(&mut self.device);
        }
        self.max_directional_lights = self
            .materials
            .values()
            .map(Material::num_directional_lights)
            .max()
            .unwrap_or(0);
        self.max_point_lights = self
            .materials
            .values()
            .map(Material::num_point_lights)
            .max()
            .unwrap_or(0);
    }

    /// Creates a render pipeline from its pass descriptions.
    ///
    /// The passes receive global indices (reused from previously destroyed
    /// pipelines where possible) and every alive material with a matching
    /// type gets per-pass graphics state for them.
    pub fn create_render_pipeline(
        &mut self,
        desc: &RenderPipelineDesc,
    ) -> Result<RenderPipelineHandle> {
        let mut pass_indices = Vec::with_capacity(desc.render_passes.len());
        for pass in &desc.render_passes {
            let index = match self.unused_pass_indices.pop() {
                Some(index) => index,
                None => {
                    self.render_passes.push(None);
                    self.render_passes.len() - 1
                }
            };
            self.render_passes[index] = Some(pass.clone());
            pass_indices.push(index);
        }

        let result = self.set_render_passes_on_materials(&pass_indices, &desc.render_passes);
        if let Err(err) = result {
            // Roll back so a failed pipeline leaves the global table and
            // the alive materials untouched.
            for material in self.materials.values_mut() {
                for &index in &pass_indices {
                    material.clear_render_pass(&mut self.device, index);
                }
            }
            self.remove_render_passes(&pass_indices);
            return Err(err);
        }

        let key = self.pipelines.insert(RenderPipeline { pass_indices });
        Ok(RenderPipelineHandle {
            key,
            renderer: self.id,
        })
    }

    /// Destroys a render pipeline.
    ///
    /// All alive materials drop their graphics state for the pipeline's
    /// global pass indices, and the indices are pushed onto the free stack
    /// for reuse.
    pub fn destroy_render_pipeline(&mut self, handle: RenderPipelineHandle) {
        if handle.renderer != self.id {
            return;
        }
        if let Some(pipeline) = self.pipelines.remove(handle.key) {
            for material in self.materials.values_mut() {
                for &index in &pipeline.pass_indices {
                    material.clear_render_pass(&mut self.device, index);
                }
            }
            self.remove_render_passes(&pipeline.pass_indices);
        }
    }

    /// True while the material has a live pipeline state for the given
    /// global render-pass index.
    #[must_use]
    pub fn material_is_used(&self, handle: MaterialHandle, pass_index: usize) -> bool {
        handle.renderer == self.id
            && self
                .materials
                .get(handle.key)
                .is_some_and(|m| m.is_used(pass_index))
    }

    /// The global render-pass indices of a pipeline, in render order.
    #[must_use]
    pub fn pipeline_pass_indices(&self, handle: RenderPipelineHandle) -> Option<&[usize]> {
        (handle.renderer == self.id)
            .then(|| self.pipelines.get(handle.key))
            .flatten()
            .map(|p| p.pass_indices.as_slice())
    }

    // ========================================================================
    // Dynamic lights
    // ========================================================================

    /// Sets the dynamic lighting for all subsequent render commands.
    ///
    /// The directional-light buffer is rewritten at the capacity declared by
    /// the alive materials: excess input lights are dropped and missing
    /// slots are zero-filled.
    pub fn set_dynamic_lights(&mut self, lights: &[DirectionalLight]) {
        self.dynamic_lights = lights.to_vec();
        self.fill_directional_light_buffer();
    }

    #[must_use]
    pub fn max_directional_lights(&self) -> u32 {
        self.max_directional_lights
    }

    /// Capacity, in lights, of the current directional-light buffer.
    #[must_use]
    pub fn directional_light_buffer_capacity(&self) -> usize {
        self.directional_light_buffer.map_or(0, |buffer| {
            self.device.buffer_size(buffer) / std::mem::size_of::<PackedDirectionalLight>()
        })
    }

    // ========================================================================
    // Frame rendering
    // ========================================================================

    /// Renders a collection of mesh instances through a render pipeline.
    ///
    /// Passes execute in pipeline order; within each pass the eligible
    /// meshes are depth-sorted according to the pass's policy and drawn in
    /// that order. Validation failures surface before any device state is
    /// touched.
    pub fn render_meshes(
        &mut self,
        pipeline: RenderPipelineHandle,
        meshes: &[MeshInstance],
        camera: &Camera,
    ) -> Result<()> {
        if pipeline.renderer != self.id || !self.pipelines.contains_key(pipeline.key) {
            return Err(Error::BadArgument(
                "render pipeline was not created by this renderer".into(),
            ));
        }
        for instance in meshes {
            if instance.material.renderer != self.id
                || !self.materials.contains_key(instance.material.key)
            {
                return Err(Error::BadArgument(
                    "mesh material was not created by this renderer".into(),
                ));
            }
            if instance.mesh.renderer != self.id || !self.meshes.contains_key(instance.mesh.key) {
                return Err(Error::BadArgument(
                    "mesh was not created by this renderer".into(),
                ));
            }
        }

        // View-specific constants for this frame
        let matrices = camera.matrices();
        self.device.write_buffer(
            self.view_buffer,
            bytemuck::bytes_of(&ViewConstants {
                view: matrices.view,
                view_proj: matrices.view_proj,
                view_proj_inv: matrices.view_proj_inv,
            }),
        );

        // The mesh's distance "in front of" the camera. Clip-space Z shrinks
        // as objects recede, so negate it to make larger mean farther away.
        let view_distance = |transform: &Mat4| -> f32 {
            let translation = transform.w_axis.truncate();
            -(matrices.view_proj * translation.extend(1.0)).z
        };

        // Space to filter and sort meshes per render pass. Reserved once
        // and reused.
        let mut pass_meshes: Vec<&MeshInstance> = Vec::with_capacity(meshes.len());

        let lights = self.require_light_buffer()?;
        let pass_indices = self.pipelines[pipeline.key].pass_indices.clone();
        for pass_index in pass_indices {
            pass_meshes.clear();
            for instance in meshes {
                if self.materials[instance.material.key].is_used(pass_index) {
                    pass_meshes.push(instance);
                }
            }

            match self.render_passes[pass_index]
                .as_ref()
                .map_or(DepthSorting::None, |p| p.depth_sorting)
            {
                DepthSorting::None => {}
                DepthSorting::FrontToBack => {
                    // Smaller distance renders first
                    pass_meshes.sort_by(|a, b| {
                        view_distance(&a.transform).total_cmp(&view_distance(&b.transform))
                    });
                }
                DepthSorting::BackToFront => {
                    // Larger distance renders first
                    pass_meshes.sort_by(|a, b| {
                        view_distance(&b.transform).total_cmp(&view_distance(&a.transform))
                    });
                }
            }

            for &instance in &pass_meshes {
                let material = &self.materials[instance.material.key];
                material.set_active(
                    &mut self.device,
                    pass_index,
                    &instance.material_params,
                    lights,
                );

                let mesh = &self.meshes[instance.mesh.key];
                self.device.set_vertex_buffer(mesh.vertex_buffer);
                self.device.set_index_buffer(mesh.index_buffer);

                self.device.write_buffer(
                    self.instance_buffer,
                    bytemuck::bytes_of(&InstanceConstants {
                        world: instance.transform,
                        world_inv: instance.transform.inverse(),
                    }),
                );

                self.device.draw_indexed(mesh.index_count);
            }
        }
        Ok(())
    }

    /// Renders a collection of sprites in camera space.
    ///
    /// Sprites are batched through a reusable ring vertex buffer with a
    /// prebuilt index buffer; one indexed draw is issued per batch per pass
    /// in which the material is live. Quads are not scissored; callers that
    /// batch by clip rectangle get whole-batch clipping only.
    pub fn render_sprites(
        &mut self,
        pipeline: RenderPipelineHandle,
        sprites: &[Sprite],
        material: MaterialHandle,
        params: &[Param],
    ) -> Result<()> {
        if pipeline.renderer != self.id || !self.pipelines.contains_key(pipeline.key) {
            return Err(Error::BadArgument(
                "render pipeline was not created by this renderer".into(),
            ));
        }
        if material.renderer != self.id || !self.materials.contains_key(material.key) {
            return Err(Error::BadArgument(
                "material was not created by this renderer".into(),
            ));
        }

        let lights = self.require_light_buffer()?;
        let pass_indices = self.pipelines[pipeline.key].pass_indices.clone();
        for pass_index in pass_indices {
            if !self.materials[material.key].is_used(pass_index) {
                continue;
            }

            self.materials[material.key].set_active(&mut self.device, pass_index, params, lights);

            for batch in sprites.chunks(SPRITE_BATCH_SIZE) {
                let mut vertices = vec![Vertex::default(); batch.len() * VERTICES_PER_SPRITE];
                for (sprite, quad) in batch.iter().zip(vertices.chunks_exact_mut(4)) {
                    let (tl, br) = (sprite.position_top_left, sprite.position_bottom_right);
                    let (uv_tl, uv_br) = (sprite.uv_top_left, sprite.uv_bottom_right);
                    quad[0].position = Vec3::new(tl.x, tl.y, 0.0);
                    quad[1].position = Vec3::new(br.x, tl.y, 0.0);
                    quad[2].position = Vec3::new(br.x, br.y, 0.0);
                    quad[3].position = Vec3::new(tl.x, br.y, 0.0);
                    quad[0].uv = uv_tl;
                    quad[1].uv = glam::Vec2::new(uv_br.x, uv_tl.y);
                    quad[2].uv = uv_br;
                    quad[3].uv = glam::Vec2::new(uv_tl.x, uv_br.y);
                }

                self.device
                    .write_buffer(self.sprite_vertex_buffer, bytemuck::cast_slice(&vertices));
                self.device.set_vertex_buffer(self.sprite_vertex_buffer);
                self.device.set_index_buffer(self.sprite_index_buffer);
                self.device
                    .draw_indexed((batch.len() * INDICES_PER_SPRITE) as u32);
            }
        }
        Ok(())
    }

    /// Drains the draw calls recorded since the last call.
    pub fn take_draw_calls(&mut self) -> Vec<DrawCall> {
        self.device.take_draw_calls()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn set_render_passes_on_materials(
        &mut self,
        indices: &[usize],
        passes: &[RenderPassDesc],
    ) -> Result<()> {
        for material in self.materials.values_mut() {
            for (&index, pass) in indices.iter().zip(passes) {
                material.set_render_pass(
                    &mut self.device,
                    index,
                    pass,
                    self.view_buffer,
                    self.instance_buffer,
                )?;
            }
        }
        Ok(())
    }

    fn remove_render_passes(&mut self, indices: &[usize]) {
        for &index in indices {
            self.render_passes[index] = None;
            self.unused_pass_indices.push(index);
        }
    }

    // Grows the directional-light buffer when the alive materials demand
    // more capacity than it has, then refills it from the current lights.
    fn ensure_light_buffer_capacity(&mut self) {
        if self.max_directional_lights == 0 {
            return;
        }
        let needed =
            self.max_directional_lights as usize * std::mem::size_of::<PackedDirectionalLight>();
        let current = self.directional_light_buffer.map(|b| self.device.buffer_size(b));
        if current.is_none() || current.unwrap() < needed {
            let buffer = self
                .device
                .create_buffer("Directional Lights", needed, BufferUsage::Dynamic)
                .expect("directional light buffer");
            self.directional_light_buffer = Some(buffer);
            self.fill_directional_light_buffer();
        }
    }

    fn fill_directional_light_buffer(&mut self) {
        let Some(buffer) = self.directional_light_buffer else {
            return;
        };
        let capacity =
            self.device.buffer_size(buffer) / std::mem::size_of::<PackedDirectionalLight>();

        let mut packed = Vec::with_capacity(capacity);
        for light in self.dynamic_lights.iter().take(capacity) {
            packed.push(PackedDirectionalLight {
                direction: light.direction.normalize_or(Vec3::new(0.0, 0.0, -1.0)),
                intensity: light.intensity,
                diffuse_color: light.diffuse_color,
                _pad0: 0.0,
                specular_color: light.specular_color,
                _pad1: 0.0,
            });
        }
        // Zero-fill the remaining slots
        while packed.len() < capacity {
            packed.push(PackedDirectionalLight {
                direction: Vec3::new(0.0, 0.0, -1.0),
                intensity: 0.0,
                diffuse_color: Vec3::ZERO,
                _pad0: 0.0,
                specular_color: Vec3::ZERO,
                _pad1: 0.0,
            });
        }
        self.device
            .write_buffer(buffer, bytemuck::cast_slice(&packed));
    }

    // Materials always bind the directional-light buffer; create a minimal
    // one lazily for material sets that declare no lights.
    fn require_light_buffer(&mut self) -> Result<BufferId> {
        if let Some(buffer) = self.directional_light_buffer {
            return Ok(buffer);
        }
        let buffer = self.device.create_buffer(
            "Directional Lights",
            std::mem::size_of::<PackedDirectionalLight>(),
            BufferUsage::Dynamic,
        )?;
        self.directional_light_buffer = Some(buffer);
        self.fill_directional_light_buffer();
        Ok(buffer)
    }
}
