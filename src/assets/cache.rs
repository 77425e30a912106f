//! The asset cache.
//!
//! Five typed caches keyed by case-insensitive name. Shaders, textures and
//! render models load lazily through the asset loader on first access;
//! materials and render pipelines are registries populated in bulk from
//! their descriptor files, and `get` never constructs new entries for them.
//! A name that cannot be resolved is logged at most once per process and
//! reported as `None` at the cache boundary.

use super::descriptors::{self, DescriptorPropertyValue, MaterialDescriptor};
use super::loader::{basename, AssetLoader};

use crate::gfx::{ColorSpace, ShaderDesc, ShaderId, TextureId};
use crate::io::{dds, model, tga, SeekOrigin, Stream};
use crate::renderer::{
    MaterialDesc, MaterialHandle, MeshDesc, Param, PropertyDesc, PropertyValue, Renderer,
    RenderPipelineHandle, Vertex,
};
use crate::scene::{RenderModel, RenderModelMesh};

use glam::Mat4;
use log::error;
use rustc_hash::{FxHashMap, FxHashSet};

use std::rc::Rc;

fn cache_key(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Owns and memoizes shaders, textures, materials, render pipelines and
/// render models, resolving cross-dependencies between them: materials
/// depend on shaders and textures, render models on materials and textures.
pub struct AssetCache {
    loader: AssetLoader,
    renderer: Renderer,

    shaders: FxHashMap<String, ShaderId>,
    textures: FxHashMap<String, TextureId>,
    materials: FxHashMap<String, MaterialHandle>,
    render_pipelines: FxHashMap<String, RenderPipelineHandle>,
    render_models: FxHashMap<String, Rc<RenderModel>>,

    // One log line per unresolvable name, per process
    logged_failures: FxHashSet<String>,
}

impl AssetCache {
    /// Creates the cache and registers the render-pipeline and material
    /// descriptor files, in that order.
    #[must_use]
    pub fn new(loader: AssetLoader, renderer: Renderer) -> Self {
        let mut cache = Self {
            loader,
            renderer,
            shaders: FxHashMap::default(),
            textures: FxHashMap::default(),
            materials: FxHashMap::default(),
            render_pipelines: FxHashMap::default(),
            render_models: FxHashMap::default(),
            logged_failures: FxHashSet::default(),
        };

        if let Some(text) = cache.loader.open_config("RenderPipelines") {
            let pipelines = descriptors::load_render_pipelines(&text);
            cache.register_render_pipelines(&pipelines);
        }
        if let Some(text) = cache.loader.open_config("Materials") {
            let materials = descriptors::load_materials(&text);
            cache.register_materials(&materials);
        }
        cache
    }

    #[must_use]
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    // ========================================================================
    // Registries
    // ========================================================================

    /// Registers render pipelines from their descriptors.
    pub fn register_render_pipelines(&mut self, descs: &[crate::renderer::RenderPipelineDesc]) {
        for desc in descs {
            match self.renderer.create_render_pipeline(desc) {
                Ok(handle) => {
                    self.render_pipelines.insert(cache_key(&desc.name), handle);
                }
                Err(err) => error!("cannot create render pipeline \"{}\": {err}", desc.name),
            }
        }
    }

    /// Registers materials from their descriptors, resolving shader and
    /// texture references through the lazy caches.
    pub fn register_materials(&mut self, descs: &[MaterialDescriptor]) {
        for desc in descs {
            let Some(shader) = self.get_shader(&desc.shader) else {
                error!("cannot create material \"{}\": shader missing", desc.name);
                continue;
            };

            let mut properties = Vec::with_capacity(desc.properties.len());
            for property in &desc.properties {
                let default_value = match &property.default_value {
                    DescriptorPropertyValue::Int(v) => PropertyValue::Int(*v),
                    DescriptorPropertyValue::Float(v) => PropertyValue::Float(*v),
                    DescriptorPropertyValue::Vec2(v) => PropertyValue::Vec2(*v),
                    DescriptorPropertyValue::Vec3(v) => PropertyValue::Vec3(*v),
                    DescriptorPropertyValue::Vec4(v) => PropertyValue::Vec4(*v),
                    DescriptorPropertyValue::Mat4(v) => PropertyValue::Mat4(*v),
                    DescriptorPropertyValue::Texture(name) => {
                        PropertyValue::Texture(self.get_texture(name))
                    }
                };
                properties.push(PropertyDesc {
                    name: property.name.clone(),
                    default_value,
                });
            }

            let material_desc = MaterialDesc {
                name: desc.name.clone(),
                material_type: desc.material_type.clone(),
                shader,
                properties,
                pipeline_options: desc.pipeline_options,
                num_directional_lights: desc.num_directional_lights,
                num_point_lights: desc.num_point_lights,
            };
            match self.renderer.create_material(&material_desc) {
                Ok(handle) => {
                    self.materials.insert(cache_key(&desc.name), handle);
                }
                Err(err) => error!("cannot create material \"{}\": {err}", desc.name),
            }
        }
    }

    /// Looks up a registered render pipeline by name (case-insensitive).
    pub fn get_render_pipeline(&mut self, name: &str) -> Option<RenderPipelineHandle> {
        let key = cache_key(name);
        if let Some(&handle) = self.render_pipelines.get(&key) {
            return Some(handle);
        }
        self.log_failure(&key, || format!("cannot find render pipeline \"{name}\""));
        None
    }

    /// Looks up a registered material by name (case-insensitive).
    pub fn get_material(&mut self, name: &str) -> Option<MaterialHandle> {
        let key = cache_key(name);
        if let Some(&handle) = self.materials.get(&key) {
            return Some(handle);
        }
        self.log_failure(&key, || format!("cannot find material \"{name}\""));
        None
    }

    // ========================================================================
    // Lazy caches
    // ========================================================================

    /// Loads a shader by name, memoizing the result.
    pub fn get_shader(&mut self, name: &str) -> Option<ShaderId> {
        let key = cache_key(name);
        if let Some(&shader) = self.shaders.get(&key) {
            return Some(shader);
        }

        let source = self.loader.open_shader(name).and_then(|mut stream| {
            let bytes = stream.read_to_end().ok()?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        });
        let shader = source.and_then(|source| {
            self.renderer
                .create_shader(&ShaderDesc {
                    name: name.to_string(),
                    source,
                })
                .map_err(|err| error!("cannot create shader \"{name}\": {err}"))
                .ok()
        });

        match shader {
            Some(shader) => {
                self.shaders.insert(key, shader);
                Some(shader)
            }
            None => {
                self.log_failure(&key, || format!("cannot load shader \"{name}\""));
                None
            }
        }
    }

    /// Loads a texture by name with the typical albedo default (sRGB).
    pub fn get_texture(&mut self, name: &str) -> Option<TextureId> {
        self.get_texture_with_color_space(name, ColorSpace::Srgb)
    }

    /// Loads a texture by name, memoizing the result. The color space is
    /// used for files that do not carry their own (typically sRGB for
    /// albedo textures and linear for normal maps).
    pub fn get_texture_with_color_space(
        &mut self,
        name: &str,
        default_color_space: ColorSpace,
    ) -> Option<TextureId> {
        let key = cache_key(name);
        if let Some(&texture) = self.textures.get(&key) {
            return Some(texture);
        }

        let texture = self.loader.open_texture(name).and_then(|mut stream| {
            let desc = load_texture_desc(stream.as_mut(), default_color_space)
                .map_err(|err| error!("cannot load texture \"{name}\": {err}"))
                .ok()?;
            self.renderer
                .create_texture(&desc)
                .map_err(|err| error!("cannot create texture \"{name}\": {err}"))
                .ok()
        });

        match texture {
            Some(texture) => {
                self.textures.insert(key, texture);
                Some(texture)
            }
            None => {
                self.log_failure(&key, || format!("cannot load texture \"{name}\""));
                None
            }
        }
    }

    /// Loads a render model by name, memoizing the result.
    pub fn get_render_model(&mut self, name: &str) -> Option<Rc<RenderModel>> {
        let key = cache_key(name);
        if let Some(model) = self.render_models.get(&key) {
            return Some(Rc::clone(model));
        }

        let model = self
            .loader
            .open_model(name)
            .and_then(|mut stream| stream.read_to_end().ok())
            .and_then(|data| {
                model::read_model(&data)
                    .map_err(|err| error!("cannot read model \"{name}\": {err}"))
                    .ok()
            })
            .map(|model| Rc::new(self.create_render_model(&model)));

        match model {
            Some(model) => {
                self.render_models.insert(key, Rc::clone(&model));
                Some(model)
            }
            None => {
                self.log_failure(&key, || format!("cannot load render model \"{name}\""));
                None
            }
        }
    }

    // ========================================================================
    // Model instantiation
    // ========================================================================

    // Turns an in-memory model into a renderable one: meshes whose material
    // is unknown are dropped, bone transforms are resolved to absolute
    // root transforms, and file parameters become material parameter
    // overrides.
    fn create_render_model(&mut self, model: &model::Model) -> RenderModel {
        let mut render_meshes = Vec::new();

        for mesh in &model.meshes {
            let Some(material_info) = mesh.materials.first() else {
                continue;
            };
            let Some(material) = self.get_material(basename(&material_info.name)) else {
                continue;
            };

            let mesh_desc = MeshDesc {
                vertices: material_info
                    .vertices
                    .iter()
                    .map(|v| Vertex {
                        position: v.position,
                        normal: v.normal,
                        tangent: v.tangent,
                        binormal: v.binormal,
                        uv: v.uv[0],
                        color: v.color,
                    })
                    .collect(),
                indices: material_info.indices.clone(),
            };
            let Ok(render_mesh) = self
                .renderer
                .create_mesh(&mesh_desc)
                .map_err(|err| error!("cannot create mesh \"{}\": {err}", mesh.name))
            else {
                continue;
            };

            let mut params = Vec::new();
            for param in &material_info.params {
                let value = match &param.value {
                    model::ModelParamValue::Int(v) => Some(PropertyValue::Int(*v)),
                    model::ModelParamValue::Float(v) => Some(PropertyValue::Float(*v)),
                    model::ModelParamValue::Float3(v) => Some(PropertyValue::Vec3(*v)),
                    model::ModelParamValue::Float4(v) => Some(PropertyValue::Vec4(*v)),
                    model::ModelParamValue::Texture(texture_name) => self
                        .get_texture(basename(texture_name))
                        .map(|texture| PropertyValue::Texture(Some(texture))),
                };
                if let Some(value) = value {
                    params.push(Param {
                        name: param.name.clone(),
                        value,
                    });
                }
            }

            let mut render_mesh = RenderModelMesh {
                name: mesh.name.clone(),
                mesh: render_mesh,
                billboard_mode: crate::scene::BillboardMode::None,
                material,
                material_params: params,
                visible: mesh.visible,
                root_transform: Mat4::IDENTITY,
                parent_transform: Mat4::IDENTITY,
            };

            if let Some(bone_index) = mesh.bone_index {
                let bone = &model.bones[bone_index as usize];
                render_mesh.billboard_mode = bone.billboard_mode;
                render_mesh.root_transform = absolute_transform(&model.bones, Some(bone_index));
                render_mesh.parent_transform = bone.parent_transform;
            }

            render_meshes.push(render_mesh);
        }

        RenderModel::new(render_meshes)
    }

    fn log_failure(&mut self, key: &str, message: impl FnOnce() -> String) {
        if self.logged_failures.insert(key.to_string()) {
            error!("{}", message());
        }
    }
}

// Walks the bone hierarchy to produce a bone's absolute transform relative
// to the model's root.
fn absolute_transform(bones: &[model::Bone], mut bone_index: Option<u32>) -> Mat4 {
    let mut transform = Mat4::IDENTITY;
    while let Some(index) = bone_index {
        let bone = &bones[index as usize];
        transform = bone.parent_transform * transform;
        bone_index = bone.parent_bone_index;
    }
    transform
}

// Sniffs the container format from the first four bytes: DDS files start
// with "DDS ", everything else goes through the TGA path.
fn load_texture_desc(
    stream: &mut dyn Stream,
    default_color_space: ColorSpace,
) -> crate::Result<crate::gfx::TextureDesc> {
    let mut magic = [0u8; 4];
    stream.read_exact(&mut magic)?;
    stream.seek(0, SeekOrigin::Begin)?;
    if &magic == b"DDS " {
        dds::load(stream, default_color_space)
    } else {
        tga::load(stream, default_color_space)
    }
}
