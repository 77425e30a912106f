//! Mega archives.
//!
//! A mega archive is a single file holding a filename table and a file-info
//! table followed by the packed sub-files. Sub-files are addressed by the
//! CRC-32 of their upper-cased name and exposed as seekable read-only
//! streams whose positions are local to the view; multiple open sub-files
//! share the underlying archive file.

use super::crc::crc32;
use super::stream::{FileStream, SeekOrigin, Stream};

use crate::error::Result;

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, Copy)]
struct SubFileInfo {
    crc32: u32,
    file_size: u32,
    file_offset: u32,
    file_name_index: u32,
}

/// A mega archive opened for reading.
pub struct MegaFile {
    file: Rc<RefCell<FileStream>>,
    filenames: Vec<String>,
    file_info: Vec<SubFileInfo>,
}

impl MegaFile {
    /// Opens an archive and reads its tables.
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = FileStream::open(path)?;

        let file_name_count = file.read_u32()?;
        let file_info_count = file.read_u32()?;

        let mut filenames = Vec::with_capacity(file_name_count as usize);
        for _ in 0..file_name_count {
            let length = file.read_u16()? as usize;
            let mut name = vec![0u8; length];
            file.read_exact(&mut name)?;
            filenames.push(String::from_utf8_lossy(&name).into_owned());
        }

        let mut file_info = Vec::with_capacity(file_info_count as usize);
        for _ in 0..file_info_count {
            let info = SubFileInfo {
                crc32: file.read_u32()?,
                file_size: {
                    let _file_index = file.read_u32()?;
                    file.read_u32()?
                },
                file_offset: file.read_u32()?,
                file_name_index: file.read_u32()?,
            };
            file_info.push(info);
        }

        Ok(Self {
            file: Rc::new(RefCell::new(file)),
            filenames,
            file_info,
        })
    }

    /// Number of sub-files in the archive.
    #[must_use]
    pub fn len(&self) -> usize {
        self.file_info.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_info.is_empty()
    }

    /// Opens a sub-file by path, looked up by the CRC-32 of the upper-cased
    /// name. Returns `None` if the archive does not contain it.
    #[must_use]
    pub fn open_file(&self, path: &str) -> Option<Box<dyn Stream>> {
        let crc = crc32(path.to_ascii_uppercase().as_bytes());
        let info = self.file_info.iter().find(|info| {
            info.crc32 == crc
                && self
                    .filenames
                    .get(info.file_name_index as usize)
                    .is_some_and(|name| name.eq_ignore_ascii_case(path))
        })?;
        Some(Box::new(SubFile {
            file: Rc::clone(&self.file),
            info: *info,
            position: 0,
        }))
    }
}

// A read-only view of one sub-file inside the archive.
struct SubFile {
    file: Rc<RefCell<FileStream>>,
    info: SubFileInfo,
    position: u64,
}

impl Stream for SubFile {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        // Another view may have moved the shared file position; restore it.
        let mut file = self.file.borrow_mut();
        file.seek(
            (u64::from(self.info.file_offset) + self.position) as i64,
            SeekOrigin::Begin,
        )?;

        // Clip the read to the end of the sub-file
        let remaining = u64::from(self.info.file_size).saturating_sub(self.position) as usize;
        let count = buffer.len().min(remaining);
        let read = file.read(&mut buffer[..count])?;
        self.position += read as u64;
        Ok(read)
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let base = match origin {
            SeekOrigin::Begin => 0i64,
            SeekOrigin::Current => self.position as i64,
            SeekOrigin::End => i64::from(self.info.file_size),
        };
        self.position = (base + offset).clamp(0, i64::from(self.info.file_size)) as u64;
        Ok(self.position)
    }
}
