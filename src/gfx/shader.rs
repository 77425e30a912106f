//! Shader compilation and reflection.
//!
//! Shaders are authored as a single HLSL source file with a `vs_main`
//! vertex entry point and a `ps_main` pixel entry point. The device does not
//! execute shaders; it "compiles" them by reflecting the top-level resources
//! (constant buffers and textures) that the renderer later binds by name.

use crate::error::{Error, Result};

use std::fmt::Write;

/// Description of a shader to compile.
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    /// Name of the shader, used in diagnostics.
    pub name: String,
    /// The HLSL source text.
    pub source: String,
}

/// Kind of a reflected top-level shader resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderResourceKind {
    /// A `cbuffer` block.
    ConstantBuffer,
    /// A texture shader-resource view.
    Texture,
}

/// The reflected top-level resources of a compiled shader.
#[derive(Debug, Clone, Default)]
pub struct ShaderReflection {
    resources: Vec<(String, ShaderResourceKind)>,
}

impl ShaderReflection {
    /// Iterates the reflected resources in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = (&str, ShaderResourceKind)> {
        self.resources.iter().map(|(n, k)| (n.as_str(), *k))
    }

    /// Looks up a resource by (case-sensitive) name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ShaderResourceKind> {
        self.resources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, k)| *k)
    }
}

/// Compiles (reflects) a shader source.
///
/// Both entry points must be present; the reflection collects `cbuffer` and
/// `Texture2D`/`TextureCube`/`Texture3D` declarations. A failed compile
/// produces a diagnostic that includes a numbered dump of the source, since
/// broken shader files usually arrive through several include layers.
pub fn compile(desc: &ShaderDesc) -> Result<ShaderReflection> {
    let mut missing = Vec::new();
    for entry_point in ["vs_main", "ps_main"] {
        if !desc.source.contains(entry_point) {
            missing.push(entry_point);
        }
    }
    if !missing.is_empty() {
        return Err(Error::ResourceCreation(format!(
            "shader \"{}\" is missing entry point(s) {}:\n{}",
            desc.name,
            missing.join(", "),
            numbered_source(&desc.source)
        )));
    }

    let mut reflection = ShaderReflection::default();
    for line in desc.source.lines() {
        let line = strip_comment(line).trim();
        if let Some(rest) = line.strip_prefix("cbuffer ") {
            if let Some(name) = identifier(rest) {
                reflection
                    .resources
                    .push((name.to_string(), ShaderResourceKind::ConstantBuffer));
            }
        } else if let Some(rest) = texture_declaration(line) {
            if let Some(name) = identifier(rest) {
                reflection
                    .resources
                    .push((name.to_string(), ShaderResourceKind::Texture));
            }
        }
    }
    Ok(reflection)
}

fn strip_comment(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

fn texture_declaration(line: &str) -> Option<&str> {
    for keyword in ["Texture2D ", "TextureCube ", "Texture3D ", "Texture1D "] {
        if let Some(rest) = line.strip_prefix(keyword) {
            return Some(rest);
        }
    }
    None
}

// First identifier in `rest`: letters, digits and underscores up to the
// first delimiter.
fn identifier(rest: &str) -> Option<&str> {
    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

fn numbered_source(source: &str) -> String {
    let mut out = String::new();
    for (i, line) in source.lines().enumerate() {
        let _ = writeln!(out, "{}: {}", i + 1, line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r"
cbuffer ViewConstants { float4x4 view; };
cbuffer Material { float4 TintColor; };
Texture2D BaseTexture;   // combined sampler
float4 vs_main() { return 0; }
float4 ps_main() { return 0; }
";

    #[test]
    fn reflection_finds_buffers_and_textures() {
        let reflection = compile(&ShaderDesc {
            name: "test".into(),
            source: SOURCE.into(),
        })
        .unwrap();
        assert_eq!(
            reflection.find("ViewConstants"),
            Some(ShaderResourceKind::ConstantBuffer)
        );
        assert_eq!(
            reflection.find("BaseTexture"),
            Some(ShaderResourceKind::Texture)
        );
        assert_eq!(reflection.find("vs_main"), None);
    }

    #[test]
    fn missing_entry_point_dumps_source() {
        let err = compile(&ShaderDesc {
            name: "broken".into(),
            source: "float4 vs_main() { return 0; }".into(),
        })
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ps_main"));
        assert!(message.contains("1: float4 vs_main"));
    }
}
