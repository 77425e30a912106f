//! TGA texture loading.
//!
//! Uncompressed truecolor images only, as a single 2D surface with one mip
//! level. TGA stores BGR(A) bottom-up by default; rows are flipped to
//! top-down here and 24-bit data is promoted to 32-bit.

use super::stream::Stream;

use crate::error::{Error, Result};
use crate::gfx::{ColorSpace, PixelFormat, SubresourceDesc, TextureDesc, TextureDimension};

const IMAGE_TYPE_TRUECOLOR: u8 = 2;

// Descriptor bit: first row is the top row.
const DESCRIPTOR_TOP_DOWN: u8 = 0x20;

/// Loads a TGA texture with the caller's default color space.
pub fn load(stream: &mut dyn Stream, default_color_space: ColorSpace) -> Result<TextureDesc> {
    let mut header = [0u8; 18];
    stream.read_exact(&mut header)?;

    let id_length = header[0] as usize;
    let color_map_type = header[1];
    let image_type = header[2];
    let width = u16::from_le_bytes([header[12], header[13]]) as usize;
    let height = u16::from_le_bytes([header[14], header[15]]) as usize;
    let bits_per_pixel = header[16];
    let descriptor = header[17];

    if image_type != IMAGE_TYPE_TRUECOLOR || color_map_type != 0 {
        return Err(Error::InvalidFormat("unsupported TGA image type".into()));
    }
    if bits_per_pixel != 24 && bits_per_pixel != 32 {
        return Err(Error::InvalidFormat("unsupported TGA bit depth".into()));
    }
    if width == 0 || height == 0 {
        return Err(Error::InvalidFormat("empty TGA image".into()));
    }

    if id_length > 0 {
        let mut id = vec![0u8; id_length];
        stream.read_exact(&mut id)?;
    }

    let src_pixel_bytes = bits_per_pixel as usize / 8;
    let mut raw = vec![0u8; width * height * src_pixel_bytes];
    stream.read_exact(&mut raw)?;

    let top_down = descriptor & DESCRIPTOR_TOP_DOWN != 0;
    let mut data = Vec::with_capacity(width * height * 4);
    for row in 0..height {
        let src_row = if top_down { row } else { height - 1 - row };
        let row_data = &raw[src_row * width * src_pixel_bytes..][..width * src_pixel_bytes];
        for px in row_data.chunks_exact(src_pixel_bytes) {
            let alpha = if src_pixel_bytes == 4 { px[3] } else { 255 };
            data.extend_from_slice(&[px[0], px[1], px[2], alpha]);
        }
    }

    Ok(TextureDesc::new(
        TextureDimension::D2,
        width as u32,
        height as u32,
        1,
        1,
        PixelFormat::Bgra8Unorm.with_color_space(default_color_space),
        vec![SubresourceDesc {
            data_offset: 0,
            data_size: data.len(),
            stride: width * 4,
            depth_stride: data.len(),
        }],
        data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryStream;

    #[test]
    fn bottom_up_rows_are_flipped() {
        // 1x2 pixels, 24bpp, bottom-up: file stores the bottom row first
        let mut file = vec![0u8; 18];
        file[2] = IMAGE_TYPE_TRUECOLOR;
        file[12] = 1; // width
        file[14] = 2; // height
        file[16] = 24;
        file.extend_from_slice(&[1, 1, 1]); // bottom row
        file.extend_from_slice(&[2, 2, 2]); // top row

        let desc = load(&mut MemoryStream::new(file), ColorSpace::Srgb).unwrap();
        assert_eq!(desc.pixel_format(), PixelFormat::Bgra8UnormSrgb);
        assert_eq!(&desc.data()[..4], &[2, 2, 2, 255]);
        assert_eq!(&desc.data()[4..8], &[1, 1, 1, 255]);
    }
}
