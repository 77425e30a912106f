//! XML descriptor parsing for materials and render pipelines.
//!
//! Both descriptor files are lists of elements under a single root. A
//! descriptor that fails to parse is logged and skipped; it does not abort
//! loading of the descriptors after it.

use crate::error::Result;
use crate::gfx::{ComparisonFunc, CullMode};
use crate::io::xml::{self, FromText, Node};
use crate::renderer::{
    AlphaBlendMode, DepthSorting, GraphicsPipelineOptions, RenderPassDesc, RenderPipelineDesc,
};

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::error;

/// A material property value as stored in a descriptor; textures are
/// referenced by name.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorPropertyValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Texture(String),
}

/// A named material property with its default value.
#[derive(Debug, Clone)]
pub struct DescriptorProperty {
    pub name: String,
    pub default_value: DescriptorPropertyValue,
}

/// A material as described by the Materials descriptor file. Shader and
/// textures are referenced by name and resolved by the asset cache.
#[derive(Debug, Clone, Default)]
pub struct MaterialDescriptor {
    pub name: String,
    pub material_type: String,
    pub shader: String,
    pub num_directional_lights: u32,
    pub num_point_lights: u32,
    pub properties: Vec<DescriptorProperty>,
    pub pipeline_options: GraphicsPipelineOptions,
}

impl FromText for CullMode {
    fn from_text(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("none") {
            Some(CullMode::None)
        } else if text.eq_ignore_ascii_case("back") {
            Some(CullMode::Back)
        } else if text.eq_ignore_ascii_case("front") {
            Some(CullMode::Front)
        } else {
            None
        }
    }
}

impl FromText for AlphaBlendMode {
    fn from_text(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("none") {
            Some(AlphaBlendMode::None)
        } else if text.eq_ignore_ascii_case("blend_src") {
            Some(AlphaBlendMode::BlendSrc)
        } else if text.eq_ignore_ascii_case("additive") {
            Some(AlphaBlendMode::Additive)
        } else {
            None
        }
    }
}

impl FromText for ComparisonFunc {
    fn from_text(text: &str) -> Option<Self> {
        const NAMES: [(&str, ComparisonFunc); 8] = [
            ("never", ComparisonFunc::Never),
            ("less", ComparisonFunc::Less),
            ("equal", ComparisonFunc::Equal),
            ("less_equal", ComparisonFunc::LessEqual),
            ("greater", ComparisonFunc::Greater),
            ("not_equal", ComparisonFunc::NotEqual),
            ("greater_equal", ComparisonFunc::GreaterEqual),
            ("always", ComparisonFunc::Always),
        ];
        NAMES
            .iter()
            .find(|(name, _)| text.eq_ignore_ascii_case(name))
            .map(|(_, func)| *func)
    }
}

impl FromText for DepthSorting {
    fn from_text(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("none") {
            Some(DepthSorting::None)
        } else if text.eq_ignore_ascii_case("front_to_back") {
            Some(DepthSorting::FrontToBack)
        } else if text.eq_ignore_ascii_case("back_to_front") {
            Some(DepthSorting::BackToFront)
        } else {
            None
        }
    }
}

// The pipeline-option children shared by material and render-pass elements.
fn parse_pipeline_options(node: &Node) -> Result<GraphicsPipelineOptions> {
    Ok(GraphicsPipelineOptions {
        cull_mode: xml::optional_child(node, "Cull_Mode")?,
        front_ccw: xml::optional_child(node, "Front_CCW")?,
        alpha_blend_mode: xml::optional_child(node, "Alpha_Blend")?,
        depth_enable: xml::optional_child(node, "Depth_Enable")?,
        depth_comparison_func: xml::optional_child(node, "Depth_Func")?,
        depth_write_enable: xml::optional_child(node, "Depth_Write_Enable")?,
    })
}

fn parse_material(node: &Node) -> Result<MaterialDescriptor> {
    let mut desc = MaterialDescriptor {
        name: xml::require_attribute(node, "Name")?.to_string(),
        material_type: xml::attribute(node, "Type").unwrap_or_default().to_string(),
        shader: xml::child_text(node, "Shader").unwrap_or_default().to_string(),
        num_directional_lights: xml::optional_child_value(node, "Num_Directional_Lights", 0)?,
        num_point_lights: xml::optional_child_value(node, "Num_Point_Lights", 0)?,
        properties: Vec::new(),
        pipeline_options: parse_pipeline_options(node)?,
    };

    for child in xml::elements(node) {
        if !child.tag_name().name().eq_ignore_ascii_case("Param") {
            continue;
        }
        let name = xml::require_attribute(&child, "Name")?.to_string();
        let value_text = xml::text(&child);
        let default_value = match xml::require_attribute(&child, "Type")? {
            "int" => DescriptorPropertyValue::Int(xml::parse_value(value_text)?),
            "float" => DescriptorPropertyValue::Float(xml::parse_value(value_text)?),
            "float2" => DescriptorPropertyValue::Vec2(xml::parse_value(value_text)?),
            "float3" => DescriptorPropertyValue::Vec3(xml::parse_value(value_text)?),
            "float4" => DescriptorPropertyValue::Vec4(xml::parse_value(value_text)?),
            "matrix" => DescriptorPropertyValue::Mat4(xml::parse_value(value_text)?),
            "texture" => DescriptorPropertyValue::Texture(value_text.to_string()),
            other => {
                return Err(crate::Error::Parse(format!(
                    "\"{other}\" is not a valid property type"
                )))
            }
        };
        desc.properties.push(DescriptorProperty {
            name,
            default_value,
        });
    }
    Ok(desc)
}

/// Parses the Materials descriptor file. Bad entries are logged and
/// skipped.
#[must_use]
pub fn load_materials(xml_text: &str) -> Vec<MaterialDescriptor> {
    let mut materials = Vec::new();
    match xml::parse(xml_text) {
        Ok(doc) => {
            for node in xml::elements(&doc.root_element()) {
                match parse_material(&node) {
                    Ok(material) => materials.push(material),
                    Err(err) => error!("parse error: {err}"),
                }
            }
        }
        Err(err) => error!("parse error: {err}"),
    }
    materials
}

fn parse_render_pass(node: &Node) -> Result<RenderPassDesc> {
    Ok(RenderPassDesc {
        material_type: xml::child_text(node, "Material_Type")
            .unwrap_or_default()
            .to_string(),
        depth_sorting: xml::optional_child_value(node, "Depth_Sort", DepthSorting::None)?,
        default_options: parse_pipeline_options(node)?,
    })
}

fn parse_render_pipeline(node: &Node) -> Result<RenderPipelineDesc> {
    let mut desc = RenderPipelineDesc {
        name: xml::require_attribute(node, "Name")?.to_string(),
        render_passes: Vec::new(),
    };
    for child in xml::elements(node) {
        desc.render_passes.push(parse_render_pass(&child)?);
    }
    Ok(desc)
}

/// Parses the RenderPipelines descriptor file. Bad entries are logged and
/// skipped.
#[must_use]
pub fn load_render_pipelines(xml_text: &str) -> Vec<RenderPipelineDesc> {
    let mut pipelines = Vec::new();
    match xml::parse(xml_text) {
        Ok(doc) => {
            for node in xml::elements(&doc.root_element()) {
                match parse_render_pipeline(&node) {
                    Ok(pipeline) => pipelines.push(pipeline),
                    Err(err) => error!("parse error: {err}"),
                }
            }
        }
        Err(err) => error!("parse error: {err}"),
    }
    pipelines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_descriptor_parses_typed_params() {
        let text = r#"
<Materials>
  <Material Name="Hull" Type="Mesh">
    <Shader>MeshShader</Shader>
    <Num_Directional_Lights>2</Num_Directional_Lights>
    <Cull_Mode>front</Cull_Mode>
    <Param Name="TintColor" Type="float4">1, 0, 0, 1</Param>
    <Param Name="BaseTexture" Type="texture">W_HULL</Param>
  </Material>
</Materials>"#;
        let materials = load_materials(text);
        assert_eq!(materials.len(), 1);
        let material = &materials[0];
        assert_eq!(material.name, "Hull");
        assert_eq!(material.num_directional_lights, 2);
        assert_eq!(material.pipeline_options.cull_mode, Some(CullMode::Front));
        assert_eq!(
            material.properties[0].default_value,
            DescriptorPropertyValue::Vec4(Vec4::new(1.0, 0.0, 0.0, 1.0))
        );
        assert_eq!(
            material.properties[1].default_value,
            DescriptorPropertyValue::Texture("W_HULL".to_string())
        );
    }

    #[test]
    fn bad_material_is_skipped_not_fatal() {
        let text = r#"
<Materials>
  <Material><Shader>s</Shader></Material>
  <Material Name="Good" Type="Mesh"><Shader>s</Shader></Material>
</Materials>"#;
        let materials = load_materials(text);
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].name, "Good");
    }
}
