//! Asset Cache Tests
//!
//! Tests for:
//! - Case-insensitive lookup across all cache types
//! - Registry semantics: get never creates materials or pipelines
//! - Lazy loading and memoization of shaders, textures and render models
//! - Cross-cache dependency resolution (model -> material -> shader/texture)

use auriga::assets::{AssetCache, AssetLoader};
use auriga::renderer::Renderer;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const SHADER_SOURCE: &str = r"
cbuffer InstanceConstants { float4x4 world; };
cbuffer ViewConstants { float4x4 view; };
cbuffer Material { float4 TintColor; };
cbuffer DirectionalLightConstants { float4 lights[8]; };
Texture2D BaseTexture;
float4 vs_main() { return 0; }
float4 ps_main() { return 0; }
";

const MATERIALS_XML: &str = r#"<Materials>
  <Material Name="MeshGloss" Type="Mesh">
    <Shader>MeshShader</Shader>
    <Num_Directional_Lights>2</Num_Directional_Lights>
    <Param Name="TintColor" Type="float4">1, 0, 0, 1</Param>
    <Param Name="BaseTexture" Type="texture">W_BLANK</Param>
  </Material>
  <Material Name="Broken" Type="Mesh">
    <Shader>NoSuchShader</Shader>
  </Material>
</Materials>"#;

const PIPELINES_XML: &str = r#"<RenderPipelines>
  <RenderPipeline Name="Space">
    <RenderPass>
      <Material_Type>Mesh</Material_Type>
      <Depth_Sort>back_to_front</Depth_Sort>
      <Cull_Mode>back</Cull_Mode>
    </RenderPass>
  </RenderPipeline>
</RenderPipelines>"#;

// A 1x1 uncompressed BGRA DDS file
fn dds_bytes() -> Vec<u8> {
    let mut out = b"DDS ".to_vec();
    out.extend_from_slice(&124u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes()); // height
    out.extend_from_slice(&1u32.to_le_bytes()); // width
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&1u32.to_le_bytes()); // mips
    out.extend_from_slice(&[0u8; 44]);
    out.extend_from_slice(&32u32.to_le_bytes());
    out.extend_from_slice(&0x41u32.to_le_bytes()); // DDPF_RGB | ALPHAPIXELS
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&32u32.to_le_bytes());
    out.extend_from_slice(&0x00FF_0000u32.to_le_bytes());
    out.extend_from_slice(&0x0000_FF00u32.to_le_bytes());
    out.extend_from_slice(&0x0000_00FFu32.to_le_bytes());
    out.extend_from_slice(&0xFF00_0000u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&[128, 64, 32, 255]); // one pixel
    out
}

// ---- minimal chunked model builder -----------------------------------------

fn leaf(id: u32, data: &[u8]) -> Vec<u8> {
    let mut out = id.to_le_bytes().to_vec();
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    out
}

fn container(id: u32, children: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = children.iter().flatten().copied().collect();
    let mut out = id.to_le_bytes().to_vec();
    out.extend_from_slice(&(payload.len() as u32 | 0x8000_0000).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

fn cstring(s: &str) -> Vec<u8> {
    let mut out = s.as_bytes().to_vec();
    out.push(0);
    out
}

fn vertex_v2() -> Vec<u8> {
    let mut out = Vec::new();
    for _ in 0..(3 + 3 + 2 + 2 + 3 + 3 + 4 + 4) {
        out.extend_from_slice(&0.0f32.to_le_bytes());
    }
    for _ in 0..4 {
        out.extend_from_slice(&0u32.to_le_bytes());
    }
    for _ in 0..4 {
        out.extend_from_slice(&0.0f32.to_le_bytes());
    }
    out
}

fn model_bytes(material_name: &str) -> Vec<u8> {
    let mut submesh_info = 3u32.to_le_bytes().to_vec();
    submesh_info.extend_from_slice(&1u32.to_le_bytes());

    let vertices: Vec<u8> = [vertex_v2(), vertex_v2(), vertex_v2()].concat();
    let indices: Vec<u8> = [0u16, 1, 2].iter().flat_map(|i| i.to_le_bytes()).collect();

    let mut mesh_info = 1u32.to_le_bytes().to_vec();
    mesh_info.extend_from_slice(&[0u8; 24]);
    mesh_info.extend_from_slice(&0u32.to_le_bytes());
    mesh_info.extend_from_slice(&0u32.to_le_bytes());

    container(
        0x400,
        &[
            leaf(0x401, &cstring("Hull")),
            leaf(0x402, &mesh_info),
            container(
                0x10000,
                &[
                    leaf(0x10001, &submesh_info),
                    leaf(0x10007, &vertices),
                    leaf(0x10004, &indices),
                ],
            ),
            container(0x10100, &[leaf(0x10101, &cstring(material_name))]),
        ],
    )
}

// ---- fixture ----------------------------------------------------------------

fn write_file(path: &Path, data: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = fs::File::create(path).unwrap();
    file.write_all(data).unwrap();
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("auriga_assets_{}_{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let xml = dir.join("Data").join("Xml");
    write_file(&xml.join("Materials.xml"), MATERIALS_XML.as_bytes());
    write_file(&xml.join("RenderPipelines.xml"), PIPELINES_XML.as_bytes());

    let art = dir.join("Data").join("Art");
    write_file(
        &art.join("Shaders").join("MeshShader.hlsl"),
        SHADER_SOURCE.as_bytes(),
    );
    write_file(&art.join("Textures").join("W_BLANK.dds"), &dds_bytes());
    write_file(
        &art.join("Models").join("Ship.alo"),
        &model_bytes("MeshGloss"),
    );
    write_file(
        &art.join("Models").join("Wreck.alo"),
        &model_bytes("UnknownMaterial"),
    );

    dir
}

fn make_cache(name: &str) -> AssetCache {
    AssetCache::new(AssetLoader::new(vec![fixture_dir(name)]), Renderer::new())
}

// ============================================================================
// Registries
// ============================================================================

#[test]
fn lookups_are_case_insensitive() {
    let mut cache = make_cache("case");

    let material = cache.get_material("MeshGloss").unwrap();
    assert_eq!(cache.get_material("MESHGLOSS"), Some(material));
    assert_eq!(cache.get_material("meshgloss"), Some(material));

    let pipeline = cache.get_render_pipeline("Space").unwrap();
    assert_eq!(cache.get_render_pipeline("sPaCe"), Some(pipeline));
}

#[test]
fn registries_never_create_on_get() {
    let mut cache = make_cache("registry");
    assert!(cache.get_material("NotRegistered").is_none());
    // Repeated lookups stay None (the failure is only logged once)
    assert!(cache.get_material("NotRegistered").is_none());
    assert!(cache.get_render_pipeline("NotRegistered").is_none());
}

#[test]
fn materials_with_missing_shaders_are_skipped() {
    let mut cache = make_cache("broken");
    // "Broken" references a shader that doesn't exist, so registration
    // skipped it without affecting its siblings
    assert!(cache.get_material("Broken").is_none());
    assert!(cache.get_material("MeshGloss").is_some());
}

// ============================================================================
// Lazy caches
// ============================================================================

#[test]
fn textures_load_lazily_and_memoize() {
    let mut cache = make_cache("texture");

    let texture = cache.get_texture("W_BLANK").unwrap();
    // Different case hits the same cache entry
    assert_eq!(cache.get_texture("w_blank"), Some(texture));
    assert!(cache.get_texture("W_MISSING").is_none());
}

#[test]
fn shaders_load_lazily_and_memoize() {
    let mut cache = make_cache("shader");
    let shader = cache.get_shader("MeshShader").unwrap();
    assert_eq!(cache.get_shader("MESHSHADER"), Some(shader));
    assert!(cache.get_shader("Nope").is_none());
}

// ============================================================================
// Render models
// ============================================================================

#[test]
fn render_models_resolve_materials_through_the_cache() {
    let mut cache = make_cache("model");

    let model = cache.get_render_model("Ship").unwrap();
    assert_eq!(model.meshes().len(), 1);
    assert_eq!(model.meshes()[0].name, "Hull");
    assert!(model.meshes()[0].visible);

    let material = cache.get_material("MeshGloss").unwrap();
    assert_eq!(model.meshes()[0].material, material);

    // Memoized: the same model comes back
    let again = cache.get_render_model("SHIP").unwrap();
    assert!(std::rc::Rc::ptr_eq(&model, &again));
}

#[test]
fn model_meshes_with_unknown_materials_are_dropped() {
    let mut cache = make_cache("wreck");
    let model = cache.get_render_model("Wreck").unwrap();
    assert!(model.meshes().is_empty());
}

#[test]
fn missing_models_are_reported_as_none() {
    let mut cache = make_cache("missing");
    assert!(cache.get_render_model("Ghost").is_none());
    assert!(cache.get_render_model("Ghost").is_none());
}
