//! I/O: streams, chunked binary formats, archives, and descriptor files.

mod chunk;
mod crc;
pub mod dds;
pub mod map;
mod mega;
pub mod model;
mod stream;
pub mod tga;
pub mod xml;

pub use chunk::{payload_string, ByteCursor, ChunkReader, MinichunkReader};
pub use crc::crc32;
pub use mega::MegaFile;
pub use stream::{FileStream, MemoryStream, SeekOrigin, Stream};
