//! DDS texture loading.
//!
//! Supports the formats the game's assets actually use: uncompressed 24/32
//! bit RGB/RGBA/BGRA surfaces (24-bit data is promoted to 32-bit) and the
//! DXT1/DXT2/DXT3/DXT4/DXT5 FOURCC codes mapped to BC1/BC2/BC3. Files
//! without a DX10 extension header carry no color-space information; the
//! caller supplies the default (typically sRGB for albedo textures and
//! linear for normal maps).

use super::stream::Stream;

use crate::error::{Error, Result};
use crate::gfx::{ColorSpace, PixelFormat, SubresourceDesc, TextureDesc, TextureDimension};

const DDS_MAGIC: u32 = 0x2053_4444; // "DDS "

const DDSD_DEPTH: u32 = 0x0080_0000;
const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;
const DDSCAPS2_CUBEMAP: u32 = 0x200;

const FOURCC_DXT1: u32 = 0x3154_5844;
const FOURCC_DXT2: u32 = 0x3254_5844;
const FOURCC_DXT3: u32 = 0x3354_5844;
const FOURCC_DXT4: u32 = 0x3454_5844;
const FOURCC_DXT5: u32 = 0x3554_5844;
const FOURCC_DX10: u32 = 0x3031_5844;

struct Header {
    height: u32,
    width: u32,
    depth: u32,
    mip_levels: u32,
    pf_flags: u32,
    fourcc: u32,
    rgb_bit_count: u32,
    r_mask: u32,
    g_mask: u32,
    b_mask: u32,
    caps2: u32,
}

fn read_header(stream: &mut dyn Stream) -> Result<Header> {
    if stream.read_u32()? != DDS_MAGIC {
        return Err(Error::InvalidFormat("not a DDS file".into()));
    }
    let size = stream.read_u32()?;
    if size != 124 {
        return Err(Error::InvalidFormat("bad DDS header size".into()));
    }
    let flags = stream.read_u32()?;
    let height = stream.read_u32()?;
    let width = stream.read_u32()?;
    let _pitch = stream.read_u32()?;
    let depth = stream.read_u32()?;
    let mip_levels = stream.read_u32()?.max(1);
    let mut reserved = [0u8; 11 * 4];
    stream.read_exact(&mut reserved)?;

    let pf_size = stream.read_u32()?;
    if pf_size != 32 {
        return Err(Error::InvalidFormat("bad DDS pixel format size".into()));
    }
    let pf_flags = stream.read_u32()?;
    let fourcc = stream.read_u32()?;
    let rgb_bit_count = stream.read_u32()?;
    let r_mask = stream.read_u32()?;
    let g_mask = stream.read_u32()?;
    let b_mask = stream.read_u32()?;
    let _a_mask = stream.read_u32()?;

    let _caps = stream.read_u32()?;
    let caps2 = stream.read_u32()?;
    let _caps3 = stream.read_u32()?;
    let _caps4 = stream.read_u32()?;
    let _reserved2 = stream.read_u32()?;

    let depth = if flags & DDSD_DEPTH != 0 { depth.max(1) } else { 1 };

    Ok(Header {
        height,
        width,
        depth,
        mip_levels,
        pf_flags,
        fourcc,
        rgb_bit_count,
        r_mask,
        g_mask,
        b_mask,
        caps2,
    })
}

// Maps a DXGI format code from the DX10 extension header.
fn dxgi_format(code: u32) -> Result<PixelFormat> {
    match code {
        28 => Ok(PixelFormat::Rgba8Unorm),
        29 => Ok(PixelFormat::Rgba8UnormSrgb),
        87 => Ok(PixelFormat::Bgra8Unorm),
        91 => Ok(PixelFormat::Bgra8UnormSrgb),
        71 => Ok(PixelFormat::Bc1Unorm),
        72 => Ok(PixelFormat::Bc1UnormSrgb),
        74 => Ok(PixelFormat::Bc2Unorm),
        75 => Ok(PixelFormat::Bc2UnormSrgb),
        77 => Ok(PixelFormat::Bc3Unorm),
        78 => Ok(PixelFormat::Bc3UnormSrgb),
        other => Err(Error::InvalidFormat(format!(
            "unsupported DXGI format {other}"
        ))),
    }
}

// Pixel layout of the source data, before any promotion.
enum SourceLayout {
    Rgb24,
    Rgba32,
    Bgra32,
    Block(PixelFormat),
}

/// Loads a DDS texture.
///
/// `default_color_space` applies when the file has no DX10 header.
pub fn load(stream: &mut dyn Stream, default_color_space: ColorSpace) -> Result<TextureDesc> {
    let header = read_header(stream)?;

    let mut color_space = default_color_space;
    let mut array_size = 1u32;

    let layout = if header.pf_flags & DDPF_FOURCC != 0 {
        match header.fourcc {
            FOURCC_DXT1 => SourceLayout::Block(PixelFormat::Bc1Unorm),
            FOURCC_DXT2 | FOURCC_DXT3 => SourceLayout::Block(PixelFormat::Bc2Unorm),
            FOURCC_DXT4 | FOURCC_DXT5 => SourceLayout::Block(PixelFormat::Bc3Unorm),
            FOURCC_DX10 => {
                // DX10 extension header: the format carries its own color
                // space.
                let format = dxgi_format(stream.read_u32()?)?;
                let _resource_dimension = stream.read_u32()?;
                let _misc_flag = stream.read_u32()?;
                array_size = stream.read_u32()?.max(1);
                let _misc_flags2 = stream.read_u32()?;
                color_space = format.color_space();
                if format.is_block_compressed() {
                    SourceLayout::Block(format.with_color_space(ColorSpace::Linear))
                } else {
                    match format.with_color_space(ColorSpace::Linear) {
                        PixelFormat::Bgra8Unorm => SourceLayout::Bgra32,
                        _ => SourceLayout::Rgba32,
                    }
                }
            }
            other => {
                return Err(Error::InvalidFormat(format!(
                    "unsupported DDS FOURCC {other:#x}"
                )))
            }
        }
    } else if header.pf_flags & DDPF_RGB != 0 {
        let has_alpha = header.pf_flags & DDPF_ALPHAPIXELS != 0;
        let rgba_masks = (header.r_mask, header.g_mask, header.b_mask)
            == (0x0000_00FF, 0x0000_FF00, 0x00FF_0000);
        let bgra_masks = (header.r_mask, header.g_mask, header.b_mask)
            == (0x00FF_0000, 0x0000_FF00, 0x0000_00FF);
        match (header.rgb_bit_count, has_alpha) {
            (24, false) if bgra_masks || rgba_masks => SourceLayout::Rgb24,
            (32, _) if rgba_masks => SourceLayout::Rgba32,
            (32, _) if bgra_masks => SourceLayout::Bgra32,
            _ => {
                return Err(Error::InvalidFormat(
                    "unsupported DDS RGB masks or bit count".into(),
                ))
            }
        }
    } else {
        return Err(Error::InvalidFormat("unsupported DDS pixel format".into()));
    };

    if header.caps2 & DDSCAPS2_CUBEMAP != 0 {
        array_size = 6;
    }

    let dimension = if header.caps2 & DDSCAPS2_CUBEMAP != 0 {
        TextureDimension::Cubemap
    } else if header.depth > 1 {
        TextureDimension::D3
    } else {
        TextureDimension::D2
    };

    // Assemble the subresources, promoting 24-bit RGB to 32-bit on the fly.
    let format = match layout {
        SourceLayout::Block(block) => block.with_color_space(color_space),
        SourceLayout::Rgb24 | SourceLayout::Rgba32 => {
            PixelFormat::Rgba8Unorm.with_color_space(color_space)
        }
        SourceLayout::Bgra32 => PixelFormat::Bgra8Unorm.with_color_space(color_space),
    };

    let mut data = Vec::new();
    let mut subresources = Vec::new();
    for _slice in 0..array_size {
        for mip in 0..header.mip_levels {
            let width = (header.width >> mip).max(1) as usize;
            let height = (header.height >> mip).max(1) as usize;
            let depth = (header.depth >> mip).max(1) as usize;

            let data_offset = data.len();
            let (data_size, stride) = match layout {
                SourceLayout::Block(block) => {
                    let block_bytes = if matches!(block, PixelFormat::Bc1Unorm) { 8 } else { 16 };
                    let blocks_x = width.div_ceil(4);
                    let blocks_y = height.div_ceil(4);
                    let size = blocks_x * blocks_y * block_bytes * depth;
                    let mut raw = vec![0u8; size];
                    stream.read_exact(&mut raw)?;
                    data.extend_from_slice(&raw);
                    (size, blocks_x * block_bytes)
                }
                SourceLayout::Rgb24 => {
                    // Promote to 32-bit with opaque alpha; the file stores
                    // BGR order for these masks.
                    let mut raw = vec![0u8; width * height * depth * 3];
                    stream.read_exact(&mut raw)?;
                    for px in raw.chunks_exact(3) {
                        data.extend_from_slice(&[px[2], px[1], px[0], 255]);
                    }
                    (width * height * depth * 4, width * 4)
                }
                SourceLayout::Rgba32 | SourceLayout::Bgra32 => {
                    let size = width * height * depth * 4;
                    let mut raw = vec![0u8; size];
                    stream.read_exact(&mut raw)?;
                    data.extend_from_slice(&raw);
                    (size, width * 4)
                }
            };

            subresources.push(SubresourceDesc {
                data_offset,
                data_size,
                stride,
                depth_stride: data_size / depth,
            });
        }
    }

    Ok(TextureDesc::new(
        dimension,
        header.width,
        header.height,
        if dimension == TextureDimension::D3 {
            header.depth
        } else {
            array_size
        },
        header.mip_levels,
        format,
        subresources,
        data,
    ))
}
