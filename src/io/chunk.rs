//! Chunked binary container format.
//!
//! A chunked file is a sequence of tagged chunks, each with an 8-byte
//! header: a little-endian `u32` id followed by a `u32` size whose high bit
//! marks a container chunk holding nested chunks instead of raw data.
//! Minichunks are the compact variant used inside some leaf payloads: a
//! `u8` id followed by a `u8` size, never nested.

use crate::error::{Error, Result};

const CONTAINER_FLAG: u32 = 0x8000_0000;
const HEADER_SIZE: usize = 8;

/// Reads a tree of tagged chunks from a byte buffer.
///
/// The reader is a cursor over the chunks at one nesting level; `open` and
/// `close` descend into and out of container chunks.
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
    // (container chunk start, parent level end), innermost last
    stack: Vec<(usize, usize)>,
}

impl<'a> ChunkReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            end: data.len(),
            stack: Vec::new(),
        }
    }

    /// True while the cursor is on a chunk at the current level.
    #[must_use]
    pub fn has_chunk(&self) -> bool {
        self.pos + HEADER_SIZE <= self.end
    }

    /// The id of the current chunk.
    #[must_use]
    pub fn id(&self) -> u32 {
        u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().unwrap())
    }

    /// True if the current chunk holds raw data (leaf chunk).
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.raw_size() & CONTAINER_FLAG == 0
    }

    /// The raw data of the current leaf chunk.
    pub fn read_data(&self) -> Result<&'a [u8]> {
        let start = self.pos + HEADER_SIZE;
        let end = start + self.payload_len();
        if end > self.end {
            return Err(Error::InvalidFormat("chunk exceeds its container".into()));
        }
        Ok(&self.data[start..end])
    }

    /// Advances to the next chunk at the current level.
    pub fn next(&mut self) -> Result<()> {
        let end = self.pos + HEADER_SIZE + self.payload_len();
        if end > self.end {
            return Err(Error::InvalidFormat("chunk exceeds its container".into()));
        }
        self.pos = end;
        Ok(())
    }

    /// Descends into the current container chunk.
    pub fn open(&mut self) -> Result<()> {
        if self.has_data() {
            return Err(Error::InvalidFormat(format!(
                "chunk {:#x} is not a container",
                self.id()
            )));
        }
        let payload_start = self.pos + HEADER_SIZE;
        let payload_end = payload_start + self.payload_len();
        if payload_end > self.end {
            return Err(Error::InvalidFormat("chunk exceeds its container".into()));
        }
        self.stack.push((self.pos, self.end));
        self.pos = payload_start;
        self.end = payload_end;
        Ok(())
    }

    /// Ascends out of the current container chunk; the cursor returns to
    /// the container itself, so the following `next` skips past it.
    pub fn close(&mut self) {
        if let Some((container_start, parent_end)) = self.stack.pop() {
            self.pos = container_start;
            self.end = parent_end;
        }
    }

    fn raw_size(&self) -> u32 {
        u32::from_le_bytes(self.data[self.pos + 4..self.pos + 8].try_into().unwrap())
    }

    fn payload_len(&self) -> usize {
        (self.raw_size() & !CONTAINER_FLAG) as usize
    }
}

/// Reads a flat sequence of minichunks from a leaf payload.
pub struct MinichunkReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MinichunkReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub fn has_chunk(&self) -> bool {
        self.pos + 2 <= self.data.len()
    }

    /// The id of the current minichunk.
    #[must_use]
    pub fn id(&self) -> u8 {
        self.data[self.pos]
    }

    /// The data of the current minichunk.
    pub fn read_data(&self) -> Result<&'a [u8]> {
        let len = self.data[self.pos + 1] as usize;
        let start = self.pos + 2;
        if start + len > self.data.len() {
            return Err(Error::InvalidFormat("minichunk exceeds its payload".into()));
        }
        Ok(&self.data[start..start + len])
    }

    /// Advances to the next minichunk.
    pub fn next(&mut self) -> Result<()> {
        let len = self.data[self.pos + 1] as usize;
        let end = self.pos + 2 + len;
        if end > self.data.len() {
            return Err(Error::InvalidFormat("minichunk exceeds its payload".into()));
        }
        self.pos = end;
        Ok(())
    }
}

/// A little-endian cursor over a chunk payload.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.pos + count > self.data.len() {
            return Err(Error::InvalidFormat("truncated chunk payload".into()));
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_vec2(&mut self) -> Result<glam::Vec2> {
        Ok(glam::Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vec3(&mut self) -> Result<glam::Vec3> {
        Ok(glam::Vec3::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    pub fn read_vec4(&mut self) -> Result<glam::Vec4> {
        Ok(glam::Vec4::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }
}

/// Interprets a chunk payload as a NUL-terminated byte string.
#[must_use]
pub fn payload_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: u32, data: &[u8]) -> Vec<u8> {
        let mut out = id.to_le_bytes().to_vec();
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    fn container(id: u32, children: &[u8]) -> Vec<u8> {
        let mut out = id.to_le_bytes().to_vec();
        out.extend_from_slice(&(children.len() as u32 | CONTAINER_FLAG).to_le_bytes());
        out.extend_from_slice(children);
        out
    }

    #[test]
    fn nested_chunks_round_trip() {
        let inner = leaf(0x201, &[1, 2, 3]);
        let mut data = container(0x200, &inner);
        data.extend(leaf(0x400, &[9]));

        let mut reader = ChunkReader::new(&data);
        assert!(reader.has_chunk());
        assert_eq!(reader.id(), 0x200);
        assert!(!reader.has_data());

        reader.open().unwrap();
        assert_eq!(reader.id(), 0x201);
        assert_eq!(reader.read_data().unwrap(), &[1, 2, 3]);
        reader.next().unwrap();
        assert!(!reader.has_chunk());
        reader.close();

        reader.next().unwrap();
        assert_eq!(reader.id(), 0x400);
        assert!(reader.has_data());
        reader.next().unwrap();
        assert!(!reader.has_chunk());
    }
}
