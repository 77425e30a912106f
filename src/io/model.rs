//! Model binary format.
//!
//! Models are chunked files with a skeleton (bone hierarchy with local
//! transforms and billboard modes), a list of meshes split into per-material
//! submeshes, and a connection table attaching meshes to bones. Lights are
//! counted but not loaded; they still occupy object indices that the
//! connection table refers to.

use super::chunk::{payload_string, ByteCursor, ChunkReader, MinichunkReader};

use crate::error::{Error, Result};
use crate::scene::BillboardMode;

use glam::{Mat4, Vec2, Vec3, Vec4};

// Top-level and nested chunk ids
const CHUNK_SKELETON: u32 = 0x200;
const CHUNK_SKELETON_BONE_COUNT: u32 = 0x201;
const CHUNK_SKELETON_BONE: u32 = 0x202;
const CHUNK_SKELETON_BONE_NAME: u32 = 0x203;
const CHUNK_SKELETON_BONE_DATA_V1: u32 = 0x205;
const CHUNK_SKELETON_BONE_DATA_V2: u32 = 0x206;

const CHUNK_MESH: u32 = 0x400;
const CHUNK_MESH_NAME: u32 = 0x401;
const CHUNK_MESH_INFO: u32 = 0x402;
const CHUNK_SUBMESH: u32 = 0x10000;
const CHUNK_SUBMESH_INFO: u32 = 0x10001;
const CHUNK_SUBMESH_INDICES: u32 = 0x10004;
const CHUNK_SUBMESH_VERTICES_V1: u32 = 0x10005;
const CHUNK_SUBMESH_VERTICES_V2: u32 = 0x10007;
const CHUNK_SHADER_INFO: u32 = 0x10100;
const CHUNK_SHADER_NAME: u32 = 0x10101;
const CHUNK_SHADER_PARAM_INT: u32 = 0x10102;
const CHUNK_SHADER_PARAM_FLOAT: u32 = 0x10103;
const CHUNK_SHADER_PARAM_FLOAT3: u32 = 0x10104;
const CHUNK_SHADER_PARAM_TEXTURE: u32 = 0x10105;
const CHUNK_SHADER_PARAM_FLOAT4: u32 = 0x10106;

const CHUNK_LIGHT: u32 = 0x1300;

const CHUNK_CONNECTIONS: u32 = 0x600;
const CHUNK_CONNECTIONS_OBJECT: u32 = 0x602;

const NO_PARENT: u32 = u32::MAX;

/// A model vertex as stored in the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: [Vec2; 2],
    pub tangent: Vec3,
    pub binormal: Vec3,
    pub color: Vec4,
}

/// A bone of the model skeleton.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone; always less than this bone's own index.
    pub parent_bone_index: Option<u32>,
    pub visible: bool,
    pub billboard_mode: BillboardMode,
    /// Transform relative to the parent bone.
    pub parent_transform: Mat4,
}

/// A material parameter stored in the model file.
#[derive(Debug, Clone)]
pub enum ModelParamValue {
    Int(i32),
    Float(f32),
    Float3(Vec3),
    Float4(Vec4),
    Texture(String),
}

/// A named material parameter.
#[derive(Debug, Clone)]
pub struct ModelParam {
    pub name: String,
    pub value: ModelParamValue,
}

/// The per-material geometry of a mesh.
#[derive(Debug, Clone, Default)]
pub struct ModelMaterial {
    /// Shader/material name.
    pub name: String,
    pub params: Vec<ModelParam>,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u16>,
}

/// A mesh of the model.
#[derive(Debug, Clone, Default)]
pub struct ModelMesh {
    pub name: String,
    pub lod: i32,
    pub alt: i32,
    pub visible: bool,
    pub materials: Vec<ModelMaterial>,
    /// Bone the mesh is attached to via the connection table.
    pub bone_index: Option<u32>,
}

/// An in-memory model as read from a model file.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub bones: Vec<Bone>,
    pub meshes: Vec<ModelMesh>,
}

fn verify(condition: bool) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::InvalidFormat("model file failed validation".into()))
    }
}

// Bone transforms are stored as three rows of an affine 3x4 matrix.
fn read_bone_transform(cursor: &mut ByteCursor) -> Result<Mat4> {
    let row0 = cursor.read_vec4()?;
    let row1 = cursor.read_vec4()?;
    let row2 = cursor.read_vec4()?;
    Ok(Mat4::from_cols(row0, row1, row2, Vec4::new(0.0, 0.0, 0.0, 1.0)).transpose())
}

// Splits trailing _LODn and _ALTn markers off a mesh name.
fn parse_mesh_name(full_name: &str) -> (String, i32, i32) {
    let mut name = full_name;
    let mut lod = 0;
    let mut alt = 0;

    if let Some(offset) = name.find("_ALT") {
        if let Ok(value) = name[offset + 4..].parse() {
            alt = value;
            name = &name[..offset];
        }
    }
    if let Some(offset) = name.find("_LOD") {
        if let Ok(value) = name[offset + 4..].parse() {
            lod = value;
            name = &name[..offset];
        }
    }
    (name.to_string(), lod, alt)
}

fn read_vertex(cursor: &mut ByteCursor, v2: bool) -> Result<ModelVertex> {
    let mut vertex = ModelVertex {
        position: cursor.read_vec3()?,
        normal: cursor.read_vec3()?,
        ..Default::default()
    };
    for uv in &mut vertex.uv {
        *uv = cursor.read_vec2()?;
    }
    vertex.tangent = cursor.read_vec3()?;
    vertex.binormal = cursor.read_vec3()?;
    vertex.color = cursor.read_vec4()?;
    if v2 {
        // Version 2 carries an extra zeroed Vector4
        cursor.read_vec4()?;
    }
    // Bone indices and weights, zeroed in practice
    for _ in 0..4 {
        cursor.read_u32()?;
    }
    for _ in 0..4 {
        cursor.read_f32()?;
    }
    Ok(vertex)
}

fn read_submesh(reader: &mut ChunkReader) -> Result<(Vec<ModelVertex>, Vec<u16>)> {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    while reader.has_chunk() {
        match reader.id() {
            CHUNK_SUBMESH_INFO => {
                verify(reader.has_data())?;
                let data = reader.read_data()?;
                let mut cursor = ByteCursor::new(data);
                vertices = vec![ModelVertex::default(); cursor.read_u32()? as usize];
                indices = vec![0u16; cursor.read_u32()? as usize * 3];
            }
            CHUNK_SUBMESH_VERTICES_V1 | CHUNK_SUBMESH_VERTICES_V2 => {
                verify(reader.has_data())?;
                let v2 = reader.id() == CHUNK_SUBMESH_VERTICES_V2;
                let data = reader.read_data()?;
                let mut cursor = ByteCursor::new(data);
                for vertex in &mut vertices {
                    *vertex = read_vertex(&mut cursor, v2)?;
                }
            }
            CHUNK_SUBMESH_INDICES => {
                verify(reader.has_data())?;
                let data = reader.read_data()?;
                let mut cursor = ByteCursor::new(data);
                for index in &mut indices {
                    *index = cursor.read_u16()?;
                }
            }
            _ => {}
        }
        reader.next()?;
    }
    Ok((vertices, indices))
}

// Shader parameters are minichunk pairs: id 1 = name, id 2 = value.
fn read_material_param(
    data: &[u8],
    value: impl Fn(&[u8]) -> Result<ModelParamValue>,
) -> Result<ModelParam> {
    let mut name = String::new();
    let mut param_value = None;

    let mut reader = MinichunkReader::new(data);
    while reader.has_chunk() {
        match reader.id() {
            1 => name = payload_string(reader.read_data()?),
            2 => param_value = Some(value(reader.read_data()?)?),
            _ => {}
        }
        reader.next()?;
    }

    let value = param_value
        .ok_or_else(|| Error::InvalidFormat("shader parameter without a value".into()))?;
    Ok(ModelParam { name, value })
}

fn read_shader_info(reader: &mut ChunkReader) -> Result<(String, Vec<ModelParam>)> {
    let mut name = String::new();
    let mut params = Vec::new();

    while reader.has_chunk() {
        match reader.id() {
            CHUNK_SHADER_NAME => {
                verify(reader.has_data())?;
                name = payload_string(reader.read_data()?);
            }
            CHUNK_SHADER_PARAM_INT => {
                verify(reader.has_data())?;
                params.push(read_material_param(reader.read_data()?, |data| {
                    Ok(ModelParamValue::Int(ByteCursor::new(data).read_i32()?))
                })?);
            }
            CHUNK_SHADER_PARAM_FLOAT => {
                verify(reader.has_data())?;
                params.push(read_material_param(reader.read_data()?, |data| {
                    Ok(ModelParamValue::Float(ByteCursor::new(data).read_f32()?))
                })?);
            }
            CHUNK_SHADER_PARAM_FLOAT3 => {
                verify(reader.has_data())?;
                params.push(read_material_param(reader.read_data()?, |data| {
                    Ok(ModelParamValue::Float3(ByteCursor::new(data).read_vec3()?))
                })?);
            }
            CHUNK_SHADER_PARAM_FLOAT4 => {
                verify(reader.has_data())?;
                params.push(read_material_param(reader.read_data()?, |data| {
                    Ok(ModelParamValue::Float4(ByteCursor::new(data).read_vec4()?))
                })?);
            }
            CHUNK_SHADER_PARAM_TEXTURE => {
                verify(reader.has_data())?;
                params.push(read_material_param(reader.read_data()?, |data| {
                    Ok(ModelParamValue::Texture(payload_string(data)))
                })?);
            }
            _ => {}
        }
        reader.next()?;
    }
    Ok((name, params))
}

fn read_mesh(reader: &mut ChunkReader) -> Result<ModelMesh> {
    let mut mesh = ModelMesh::default();
    let mut submesh_idx = 0;
    let mut shader_idx = 0;

    while reader.has_chunk() {
        match reader.id() {
            CHUNK_MESH_NAME => {
                verify(reader.has_data())?;
                let (name, lod, alt) = parse_mesh_name(&payload_string(reader.read_data()?));
                mesh.name = name;
                mesh.lod = lod;
                mesh.alt = alt;
            }
            CHUNK_MESH_INFO => {
                verify(reader.has_data())?;
                let data = reader.read_data()?;
                let mut cursor = ByteCursor::new(data);
                mesh.materials = vec![ModelMaterial::default(); cursor.read_u32()? as usize];
                // Bounding box, unused here
                cursor.read_vec3()?;
                cursor.read_vec3()?;
                cursor.read_u32()?;
                mesh.visible = cursor.read_u32()? == 0;
            }
            CHUNK_SUBMESH => {
                verify(!reader.has_data())?;
                verify(submesh_idx < mesh.materials.len())?;
                reader.open()?;
                let (vertices, indices) = read_submesh(reader)?;
                reader.close();
                mesh.materials[submesh_idx].vertices = vertices;
                mesh.materials[submesh_idx].indices = indices;
                submesh_idx += 1;
            }
            CHUNK_SHADER_INFO => {
                verify(!reader.has_data())?;
                verify(shader_idx < mesh.materials.len())?;
                reader.open()?;
                let (name, params) = read_shader_info(reader)?;
                reader.close();
                mesh.materials[shader_idx].name = name;
                mesh.materials[shader_idx].params = params;
                shader_idx += 1;
            }
            _ => {}
        }
        reader.next()?;
    }
    Ok(mesh)
}

fn read_skeleton_bone(reader: &mut ChunkReader) -> Result<Bone> {
    let mut bone = Bone {
        name: String::new(),
        parent_bone_index: None,
        visible: true,
        billboard_mode: BillboardMode::None,
        parent_transform: Mat4::IDENTITY,
    };
    let mut parent_index = NO_PARENT;

    while reader.has_chunk() {
        match reader.id() {
            CHUNK_SKELETON_BONE_NAME => {
                verify(reader.has_data())?;
                bone.name = payload_string(reader.read_data()?);
            }
            CHUNK_SKELETON_BONE_DATA_V1 => {
                verify(reader.has_data())?;
                let data = reader.read_data()?;
                let mut cursor = ByteCursor::new(data);
                parent_index = cursor.read_u32()?;
                bone.visible = cursor.read_u32()? != 0;
                bone.billboard_mode = BillboardMode::None;
                bone.parent_transform = read_bone_transform(&mut cursor)?;
            }
            CHUNK_SKELETON_BONE_DATA_V2 => {
                verify(reader.has_data())?;
                let data = reader.read_data()?;
                let mut cursor = ByteCursor::new(data);
                parent_index = cursor.read_u32()?;
                bone.visible = cursor.read_u32()? != 0;
                bone.billboard_mode = BillboardMode::from_raw(cursor.read_u32()?);
                bone.parent_transform = read_bone_transform(&mut cursor)?;
            }
            _ => {}
        }
        reader.next()?;
    }

    bone.parent_bone_index = (parent_index != NO_PARENT).then_some(parent_index);
    Ok(bone)
}

fn read_skeleton(reader: &mut ChunkReader) -> Result<Vec<Bone>> {
    let mut bones: Vec<Bone> = Vec::new();

    while reader.has_chunk() {
        match reader.id() {
            CHUNK_SKELETON_BONE_COUNT => {
                verify(reader.has_data())?;
                let count = ByteCursor::new(reader.read_data()?).read_u32()?;
                bones.reserve(count as usize);
            }
            CHUNK_SKELETON_BONE => {
                verify(!reader.has_data())?;
                reader.open()?;
                let bone = read_skeleton_bone(reader)?;
                reader.close();
                // Only the first bone can be parentless, and parents always
                // come before their children.
                verify(bone.parent_bone_index.is_some() != bones.is_empty())?;
                if let Some(parent) = bone.parent_bone_index {
                    verify((parent as usize) < bones.len())?;
                }
                bones.push(bone);
            }
            _ => {}
        }
        reader.next()?;
    }
    Ok(bones)
}

fn read_connection_object(data: &[u8]) -> Result<(u32, u32)> {
    let mut object_index = None;
    let mut bone_index = None;

    let mut reader = MinichunkReader::new(data);
    while reader.has_chunk() {
        match reader.id() {
            2 => object_index = Some(ByteCursor::new(reader.read_data()?).read_u32()?),
            3 => bone_index = Some(ByteCursor::new(reader.read_data()?).read_u32()?),
            _ => {}
        }
        reader.next()?;
    }

    match (object_index, bone_index) {
        (Some(object), Some(bone)) => Ok((object, bone)),
        _ => Err(Error::InvalidFormat("incomplete object connection".into())),
    }
}

/// Reads a model from the bytes of a model file.
pub fn read_model(data: &[u8]) -> Result<Model> {
    let mut model = Model::default();
    let mut reader = ChunkReader::new(data);

    // Meshes and lights share the object index space of the connection
    // table; lights occupy a slot but load nothing.
    let mut object_indices: Vec<Option<usize>> = Vec::new();

    while reader.has_chunk() {
        match reader.id() {
            CHUNK_SKELETON => {
                verify(!reader.has_data())?;
                reader.open()?;
                model.bones = read_skeleton(&mut reader)?;
                reader.close();
            }
            CHUNK_MESH => {
                verify(!reader.has_data())?;
                reader.open()?;
                object_indices.push(Some(model.meshes.len()));
                model.meshes.push(read_mesh(&mut reader)?);
                reader.close();
            }
            CHUNK_LIGHT => {
                object_indices.push(None);
            }
            CHUNK_CONNECTIONS => {
                verify(!reader.has_data())?;
                reader.open()?;
                while reader.has_chunk() {
                    if reader.id() == CHUNK_CONNECTIONS_OBJECT {
                        verify(reader.has_data())?;
                        let (object, bone) = read_connection_object(reader.read_data()?)?;
                        verify((object as usize) < object_indices.len())?;
                        verify((bone as usize) < model.bones.len())?;
                        if let Some(mesh_index) = object_indices[object as usize] {
                            model.meshes[mesh_index].bone_index = Some(bone);
                        }
                    }
                    reader.next()?;
                }
                reader.close();
            }
            _ => {}
        }
        reader.next()?;
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_name_markers_are_parsed() {
        assert_eq!(parse_mesh_name("Hull_LOD2"), ("Hull".to_string(), 2, 0));
        assert_eq!(parse_mesh_name("Hull_ALT1"), ("Hull".to_string(), 0, 1));
        assert_eq!(parse_mesh_name("Hull_LOD1_ALT3"), ("Hull".to_string(), 1, 3));
        assert_eq!(parse_mesh_name("Hull"), ("Hull".to_string(), 0, 0));
    }
}
