//! XML descriptor parsing helpers.
//!
//! Thin layer over `roxmltree` with the conventions the descriptor files
//! follow: attribute and child-element lookups are case-insensitive, and
//! text values parse through [`FromText`] (floats accept a trailing `f`,
//! booleans accept yes/no, vectors are comma-separated).

use crate::error::{Error, Result};
use crate::math::Point;

use glam::{Mat4, Vec2, Vec3, Vec4};

pub use roxmltree::{Document, Node};

/// Parses an XML document. The document borrows `text`.
pub fn parse(text: &str) -> Result<Document<'_>> {
    Document::parse(text).map_err(|err| Error::Parse(format!("invalid XML: {err}")))
}

/// Finds an attribute by case-insensitive name.
#[must_use]
pub fn attribute<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .map(|a| a.value())
}

/// The value of a required attribute (case-insensitive lookup).
pub fn require_attribute<'a>(node: &Node<'a, '_>, name: &str) -> Result<&'a str> {
    attribute(node, name)
        .ok_or_else(|| Error::Parse(format!("missing attribute \"{name}\" on <{}>", tag(node))))
}

/// Finds the first child element by case-insensitive name.
#[must_use]
pub fn child<'a, 'b>(node: &Node<'a, 'b>, name: &str) -> Option<Node<'a, 'b>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name().eq_ignore_ascii_case(name))
}

/// Iterates the child elements of a node.
pub fn elements<'a, 'b>(node: &Node<'a, 'b>) -> impl Iterator<Item = Node<'a, 'b>> {
    node.children().filter(Node::is_element)
}

/// The trimmed text content of a node.
#[must_use]
pub fn text<'a>(node: &Node<'a, '_>) -> &'a str {
    node.text().unwrap_or("").trim()
}

/// The text content of a child element, if the child exists and has no
/// element children of its own.
#[must_use]
pub fn child_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    let child = child(node, name)?;
    if elements(&child).next().is_some() {
        return None;
    }
    Some(text(&child))
}

/// Parses the text content of an optional child element, falling back to a
/// default when the child is absent.
pub fn optional_child_value<T: FromText>(node: &Node, name: &str, default: T) -> Result<T> {
    match child_text(node, name) {
        Some(value) => parse_value(value),
        None => Ok(default),
    }
}

/// Parses the text content of an optional child element into an `Option`.
pub fn optional_child<T: FromText>(node: &Node, name: &str) -> Result<Option<T>> {
    match child_text(node, name) {
        Some(value) => parse_value(value).map(Some),
        None => Ok(None),
    }
}

/// Parses a text value, or fails with [`Error::Parse`].
pub fn parse_value<T: FromText>(value: &str) -> Result<T> {
    T::from_text(value.trim())
        .ok_or_else(|| Error::Parse(format!("\"{value}\" is not a valid value")))
}

fn tag(node: &Node) -> String {
    node.tag_name().name().to_string()
}

/// Types that parse from descriptor text.
pub trait FromText: Sized {
    fn from_text(text: &str) -> Option<Self>;
}

impl FromText for String {
    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

impl FromText for bool {
    fn from_text(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("yes") {
            return Some(true);
        }
        if text.eq_ignore_ascii_case("false") || text.eq_ignore_ascii_case("no") {
            return Some(false);
        }
        None
    }
}

// Floats in the data files often carry a trailing 'f'.
fn strip_float_suffix(text: &str) -> &str {
    text.strip_suffix(['f', 'F']).unwrap_or(text)
}

impl FromText for f32 {
    fn from_text(text: &str) -> Option<Self> {
        strip_float_suffix(text).parse().ok()
    }
}

impl FromText for f64 {
    fn from_text(text: &str) -> Option<Self> {
        strip_float_suffix(text).parse().ok()
    }
}

impl FromText for i32 {
    fn from_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl FromText for u32 {
    fn from_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

// Splits on commas and whitespace into exactly N parts.
fn split_n<const N: usize>(text: &str) -> Option<[&str; N]> {
    let mut parts = text.split([',', ' ', '\t', '\r', '\n']).filter(|p| !p.is_empty());
    let mut result = [""; N];
    for slot in &mut result {
        *slot = parts.next()?;
    }
    parts.next().is_none().then_some(result)
}

impl FromText for Vec2 {
    fn from_text(text: &str) -> Option<Self> {
        let [x, y] = split_n::<2>(text)?;
        Some(Vec2::new(f32::from_text(x)?, f32::from_text(y)?))
    }
}

impl FromText for Vec3 {
    fn from_text(text: &str) -> Option<Self> {
        let [x, y, z] = split_n::<3>(text)?;
        Some(Vec3::new(
            f32::from_text(x)?,
            f32::from_text(y)?,
            f32::from_text(z)?,
        ))
    }
}

impl FromText for Vec4 {
    fn from_text(text: &str) -> Option<Self> {
        let [x, y, z, w] = split_n::<4>(text)?;
        Some(Vec4::new(
            f32::from_text(x)?,
            f32::from_text(y)?,
            f32::from_text(z)?,
            f32::from_text(w)?,
        ))
    }
}

impl FromText for Mat4 {
    fn from_text(text: &str) -> Option<Self> {
        let parts = split_n::<16>(text)?;
        let mut values = [0.0f32; 16];
        for (value, part) in values.iter_mut().zip(parts) {
            *value = f32::from_text(part)?;
        }
        Some(Mat4::from_cols_array(&values))
    }
}

/// A flat list of interpolator control points: space- or comma-separated
/// x,y pairs.
impl FromText for Vec<Point> {
    fn from_text(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text
            .split([',', ' ', '\t', '\r', '\n'])
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() || parts.len() % 2 != 0 {
            return None;
        }
        let mut points = Vec::with_capacity(parts.len() / 2);
        for pair in parts.chunks_exact(2) {
            points.push(Point::new(f64::from_text(pair[0])?, f64::from_text(pair[1])?));
        }
        Some(points)
    }
}
