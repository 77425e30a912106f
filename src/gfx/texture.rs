//! Texture descriptors and CPU-side pixel decoding.
//!
//! A [`TextureDesc`] owns the raw bytes of a texture together with the
//! per-subresource layout (one subresource per mip × array slice). The
//! decoder unpacks block-compressed (BC1/BC2/BC3) and uncompressed
//! (RGBA8/BGRA8) data into linear or sRGB pixel arrays.

use glam::Vec4;

/// Dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureDimension {
    /// One-dimensional; height and depth are 1. Can be an array.
    D1,
    /// Two-dimensional; depth is 1. Can be an array.
    D2,
    /// Three-dimensional. Cannot be an array.
    D3,
    /// Two-dimensional cubemap; array size is a multiple of 6.
    Cubemap,
}

/// The format of pixel data in a texture.
///
/// The sRGB variants carry gamma-compressed color data; everything else is
/// linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    /// 4x4 block compression, 8 bytes per block (1:8 vs RGBA8).
    Bc1Unorm,
    Bc1UnormSrgb,
    /// 4x4 block compression with 4-bit explicit alpha, 16 bytes per block.
    Bc2Unorm,
    Bc2UnormSrgb,
    /// 4x4 block compression with interpolated alpha, 16 bytes per block.
    Bc3Unorm,
    Bc3UnormSrgb,
}

/// Color space of pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Gamma compressed.
    Srgb,
    /// Not gamma compressed.
    Linear,
}

impl PixelFormat {
    /// Returns the color space this format stores data in.
    #[must_use]
    pub fn color_space(self) -> ColorSpace {
        match self {
            PixelFormat::Rgba8Unorm
            | PixelFormat::Bgra8Unorm
            | PixelFormat::Bc1Unorm
            | PixelFormat::Bc2Unorm
            | PixelFormat::Bc3Unorm => ColorSpace::Linear,
            PixelFormat::Rgba8UnormSrgb
            | PixelFormat::Bgra8UnormSrgb
            | PixelFormat::Bc1UnormSrgb
            | PixelFormat::Bc2UnormSrgb
            | PixelFormat::Bc3UnormSrgb => ColorSpace::Srgb,
        }
    }

    /// Converts the format to its equivalent in the given color space.
    #[must_use]
    pub fn with_color_space(self, color_space: ColorSpace) -> PixelFormat {
        use PixelFormat::{
            Bc1Unorm, Bc1UnormSrgb, Bc2Unorm, Bc2UnormSrgb, Bc3Unorm, Bc3UnormSrgb, Bgra8Unorm,
            Bgra8UnormSrgb, Rgba8Unorm, Rgba8UnormSrgb,
        };
        match color_space {
            ColorSpace::Linear => match self {
                Rgba8UnormSrgb => Rgba8Unorm,
                Bgra8UnormSrgb => Bgra8Unorm,
                Bc1UnormSrgb => Bc1Unorm,
                Bc2UnormSrgb => Bc2Unorm,
                Bc3UnormSrgb => Bc3Unorm,
                other => other,
            },
            ColorSpace::Srgb => match self {
                Rgba8Unorm => Rgba8UnormSrgb,
                Bgra8Unorm => Bgra8UnormSrgb,
                Bc1Unorm => Bc1UnormSrgb,
                Bc2Unorm => Bc2UnormSrgb,
                Bc3Unorm => Bc3UnormSrgb,
                other => other,
            },
        }
    }

    /// True for the block-compressed formats.
    #[must_use]
    pub fn is_block_compressed(self) -> bool {
        !matches!(
            self,
            PixelFormat::Rgba8Unorm
                | PixelFormat::Rgba8UnormSrgb
                | PixelFormat::Bgra8Unorm
                | PixelFormat::Bgra8UnormSrgb
        )
    }
}

/// Layout of a single subresource (one mip level of one array slice).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceDesc {
    /// Offset of this subresource in the texture data, in bytes.
    pub data_offset: usize,
    /// Size of this subresource in the texture data, in bytes.
    pub data_size: usize,
    /// Row stride in bytes (2D and 3D textures).
    pub stride: usize,
    /// Depth-slice stride in bytes (3D textures); a multiple of `stride`.
    pub depth_stride: usize,
}

/// Description of a texture: attributes, subresource layout, and the single
/// backing byte buffer. Immutable after construction.
#[derive(Debug, Clone)]
pub struct TextureDesc {
    dimension: TextureDimension,
    width: u32,
    height: u32,
    depth_or_array_size: u32,
    mip_levels: u32,
    pixel_format: PixelFormat,
    subresources: Vec<SubresourceDesc>,
    data: Vec<u8>,
}

impl TextureDesc {
    #[must_use]
    pub fn new(
        dimension: TextureDimension,
        width: u32,
        height: u32,
        depth_or_array_size: u32,
        mip_levels: u32,
        pixel_format: PixelFormat,
        subresources: Vec<SubresourceDesc>,
        data: Vec<u8>,
    ) -> Self {
        assert!(width >= 1 && height >= 1 && mip_levels >= 1);
        assert!(!subresources.is_empty() && !data.is_empty());
        Self {
            dimension,
            width,
            height,
            depth_or_array_size,
            mip_levels,
            pixel_format,
            subresources,
            data,
        }
    }

    #[must_use]
    pub fn dimension(&self) -> TextureDimension {
        self.dimension
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth of the texture; 1 unless this is a 3D texture.
    #[must_use]
    pub fn depth(&self) -> u32 {
        if self.dimension == TextureDimension::D3 {
            self.depth_or_array_size
        } else {
            1
        }
    }

    /// Array size; 0 unless this is an array texture. Cubemaps report a
    /// multiple of 6.
    #[must_use]
    pub fn array_size(&self) -> u32 {
        if self.dimension == TextureDimension::D3 {
            0
        } else {
            self.depth_or_array_size
        }
    }

    #[must_use]
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    #[must_use]
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Index of the subresource for a given mip level and array slice.
    #[must_use]
    pub fn subresource_index(&self, mip_level: u32, array_index: u32) -> usize {
        (mip_level + array_index * self.mip_levels) as usize
    }

    #[must_use]
    pub fn subresource(&self, index: usize) -> &SubresourceDesc {
        &self.subresources[index]
    }

    #[must_use]
    pub fn subresource_count(&self) -> usize {
        self.subresources.len()
    }

    /// Unpacks a subresource into linear-space floating-point pixels.
    ///
    /// If the texture stores sRGB data, the pixels are gamma-expanded.
    #[must_use]
    pub fn pixels_linear(&self, subresource_index: usize) -> Vec<Vec4> {
        let srgb = self.unpack(subresource_index);
        match self.pixel_format.color_space() {
            ColorSpace::Srgb => srgb
                .iter()
                .map(|&[r, g, b, a]| {
                    Vec4::new(
                        srgb_to_linear(r),
                        srgb_to_linear(g),
                        srgb_to_linear(b),
                        f32::from(a) / 255.0,
                    )
                })
                .collect(),
            ColorSpace::Linear => srgb
                .iter()
                .map(|&[r, g, b, a]| {
                    Vec4::new(
                        f32::from(r) / 255.0,
                        f32::from(g) / 255.0,
                        f32::from(b) / 255.0,
                        f32::from(a) / 255.0,
                    )
                })
                .collect(),
        }
    }

    /// Unpacks a subresource into sRGB-space 8-bit pixels.
    ///
    /// If the texture stores linear data, the pixels are gamma-compressed.
    #[must_use]
    pub fn pixels_srgb(&self, subresource_index: usize) -> Vec<[u8; 4]> {
        let pixels = self.unpack(subresource_index);
        match self.pixel_format.color_space() {
            ColorSpace::Srgb => pixels,
            ColorSpace::Linear => pixels
                .iter()
                .map(|&[r, g, b, a]| {
                    [
                        linear_to_srgb(f32::from(r) / 255.0),
                        linear_to_srgb(f32::from(g) / 255.0),
                        linear_to_srgb(f32::from(b) / 255.0),
                        a,
                    ]
                })
                .collect(),
        }
    }

    // Unpacks the subresource's raw data into 8-bit RGBA in the format's
    // native color space.
    fn unpack(&self, subresource_index: usize) -> Vec<[u8; 4]> {
        let mip_level = subresource_index % self.mip_levels as usize;
        let width = (self.width >> mip_level).max(1) as usize;
        let height = (self.height >> mip_level).max(1) as usize;

        let sub = &self.subresources[subresource_index];
        let src = &self.data[sub.data_offset..sub.data_offset + sub.data_size];
        let mut pixels = vec![[0u8; 4]; width * height];

        match self.pixel_format {
            PixelFormat::Rgba8Unorm | PixelFormat::Rgba8UnormSrgb => {
                for (dest, px) in pixels.iter_mut().zip(src.chunks_exact(4)) {
                    *dest = [px[0], px[1], px[2], px[3]];
                }
            }
            PixelFormat::Bgra8Unorm | PixelFormat::Bgra8UnormSrgb => {
                for (dest, px) in pixels.iter_mut().zip(src.chunks_exact(4)) {
                    *dest = [px[2], px[1], px[0], px[3]];
                }
            }
            PixelFormat::Bc1Unorm | PixelFormat::Bc1UnormSrgb => {
                decode_blocks(&mut pixels, width, height, src, 8, |block| {
                    unpack_bc1_block(block, None)
                });
            }
            PixelFormat::Bc2Unorm | PixelFormat::Bc2UnormSrgb => {
                decode_blocks(&mut pixels, width, height, src, 16, |block| {
                    unpack_bc1_block(&block[8..], Some(unpack_bc2_alpha(block)))
                });
            }
            PixelFormat::Bc3Unorm | PixelFormat::Bc3UnormSrgb => {
                decode_blocks(&mut pixels, width, height, src, 16, |block| {
                    unpack_bc1_block(&block[8..], Some(unpack_bc4_block(block)))
                });
            }
        }
        pixels
    }
}

// ============================================================================
// Block-compression decoding
// ============================================================================

fn decode_blocks(
    pixels: &mut [[u8; 4]],
    width: usize,
    height: usize,
    src: &[u8],
    block_bytes: usize,
    unpack: impl Fn(&[u8]) -> [[u8; 4]; 16],
) {
    let aligned_width = (width + 3) & !3;
    let aligned_height = (height + 3) & !3;
    let mut blocks = src.chunks_exact(block_bytes);
    for y in (0..aligned_height).step_by(4) {
        for x in (0..aligned_width).step_by(4) {
            let Some(block) = blocks.next() else { return };
            let values = unpack(block);
            copy_block(pixels, width, height, x, y, &values);
        }
    }
}

// Copies an unpacked 4x4 block into the pixel grid, clipping blocks that
// hang over the right or bottom edge.
fn copy_block(
    pixels: &mut [[u8; 4]],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    values: &[[u8; 4]; 16],
) {
    let num_rows = 4.min(height - y);
    let num_cols = 4.min(width - x);
    for row in 0..num_rows {
        let dest = (y + row) * width + x;
        pixels[dest..dest + num_cols].copy_from_slice(&values[row * 4..row * 4 + num_cols]);
    }
}

// Converts a 16-bit 5:6:5 color to 8-bit RGB.
fn rgb565(value: u16) -> [u8; 3] {
    let r5 = u32::from(value >> 11) & 0x1F;
    let g6 = u32::from(value >> 5) & 0x3F;
    let b5 = u32::from(value) & 0x1F;
    [
        (r5 * 255 / 31) as u8,
        (g6 * 255 / 63) as u8,
        (b5 * 255 / 31) as u8,
    ]
}

fn lerp_u8(from: u8, to: u8, from_amount: u32, total_amount: u32) -> u8 {
    let to_amount = total_amount - from_amount;
    ((u32::from(from) * from_amount + u32::from(to) * to_amount) / total_amount) as u8
}

fn lerp_rgb(from: [u8; 3], to: [u8; 3], from_amount: u32, total_amount: u32) -> [u8; 3] {
    [
        lerp_u8(from[0], to[0], from_amount, total_amount),
        lerp_u8(from[1], to[1], from_amount, total_amount),
        lerp_u8(from[2], to[2], from_amount, total_amount),
    ]
}

// Builds the 4-entry BC1 color palette from the first 4 bytes of a block.
fn bc1_palette(data: &[u8]) -> [[u8; 4]; 4] {
    let c0 = u16::from_le_bytes([data[0], data[1]]);
    let c1 = u16::from_le_bytes([data[2], data[3]]);
    let color0 = rgb565(c0);
    let color1 = rgb565(c1);

    let mut palette = [[0u8; 4]; 4];
    palette[0] = [color0[0], color0[1], color0[2], 255];
    palette[1] = [color1[0], color1[1], color1[2], 255];
    if c0 > c1 {
        // Four opaque colors
        let c2 = lerp_rgb(color0, color1, 2, 3);
        let c3 = lerp_rgb(color0, color1, 1, 3);
        palette[2] = [c2[0], c2[1], c2[2], 255];
        palette[3] = [c3[0], c3[1], c3[2], 255];
    } else {
        // Three colors and transparent black
        let c2 = lerp_rgb(color0, color1, 1, 2);
        palette[2] = [c2[0], c2[1], c2[2], 255];
        palette[3] = [0, 0, 0, 0];
    }
    palette
}

// Unpacks an 8-byte BC1 color block, substituting per-pixel alpha when the
// caller decoded it separately (BC2/BC3).
fn unpack_bc1_block(data: &[u8], alpha: Option<[u8; 16]>) -> [[u8; 4]; 16] {
    let palette = bc1_palette(data);
    let mut bits = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);

    let mut values = [[0u8; 4]; 16];
    for (i, value) in values.iter_mut().enumerate() {
        *value = palette[(bits & 3) as usize];
        if let Some(alpha) = &alpha {
            value[3] = alpha[i];
        }
        bits >>= 2;
    }
    values
}

// BC2: 16 4-bit explicit alpha values in the first 8 bytes.
fn unpack_bc2_alpha(data: &[u8]) -> [u8; 16] {
    let mut bits = u64::from_le_bytes(data[..8].try_into().unwrap());
    let mut alpha = [0u8; 16];
    for value in &mut alpha {
        *value = ((bits & 0xF) * 255 / 15) as u8;
        bits >>= 4;
    }
    alpha
}

// BC4 (the alpha block of BC3): 2 endpoint bytes and 16 3-bit palette
// indices.
fn unpack_bc4_block(data: &[u8]) -> [u8; 16] {
    let mut palette = [0u8; 8];
    palette[0] = data[0];
    palette[1] = data[1];
    if palette[0] > palette[1] {
        for i in 0..6 {
            palette[i + 2] = lerp_u8(palette[0], palette[1], 6 - i as u32, 7);
        }
    } else {
        for i in 0..4 {
            palette[i + 2] = lerp_u8(palette[0], palette[1], 4 - i as u32, 5);
        }
        palette[6] = 0;
        palette[7] = 255;
    }

    let mut bits = 0u64;
    for (i, &byte) in data[2..8].iter().enumerate() {
        bits |= u64::from(byte) << (i * 8);
    }

    let mut values = [0u8; 16];
    for value in &mut values {
        *value = palette[(bits & 7) as usize];
        bits >>= 3;
    }
    values
}

// ============================================================================
// sRGB transfer function
// ============================================================================

fn srgb_to_linear(value: u8) -> f32 {
    let v = f32::from(value) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(v: f32) -> u8 {
    let v = v.clamp(0.0, 1.0);
    let s = if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0 + 0.5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc_2d(format: PixelFormat, width: u32, height: u32, data: Vec<u8>) -> TextureDesc {
        let size = data.len();
        TextureDesc::new(
            TextureDimension::D2,
            width,
            height,
            0,
            1,
            format,
            vec![SubresourceDesc {
                data_offset: 0,
                data_size: size,
                stride: size / height as usize,
                depth_stride: 0,
            }],
            data,
        )
    }

    #[test]
    fn bgra_swizzles_to_rgba() {
        let desc = desc_2d(PixelFormat::Bgra8Unorm, 1, 1, vec![10, 20, 30, 40]);
        assert_eq!(desc.pixels_srgb(0)[0][..3], [30, 20, 10]);
    }

    #[test]
    fn bc1_solid_color_block_decodes() {
        // Both endpoints pure red (0xF800), all indices 0
        let mut data = vec![0x00, 0xF8, 0x00, 0xF8];
        data.extend_from_slice(&[0, 0, 0, 0]);
        let desc = desc_2d(PixelFormat::Bc1UnormSrgb, 4, 4, data);
        let pixels = desc.pixels_srgb(0);
        assert_eq!(pixels.len(), 16);
        assert!(pixels.iter().all(|p| *p == [255, 0, 0, 255]));
    }
}
