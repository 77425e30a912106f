//! Locates and opens assets according to the game's data layout.
//!
//! Assets resolve across an ordered list of data paths ("mod paths" first),
//! each layered as a physical directory tree with optional mega archives
//! behind it. Asset names are flexible: each asset type has a subdirectory
//! and a list of extensions that are tried in order, so requesting texture
//! `W_BLANK` looks for `W_BLANK`, `W_BLANK.dds` and `W_BLANK.tga`.

use crate::io::{xml, FileStream, MegaFile, Stream};

use log::{debug, error};

use std::path::{Path, PathBuf};

/// Strips the directory and extension from an asset reference, leaving the
/// bare asset name. Model files refer to materials and textures by full
/// path with either separator.
#[must_use]
pub fn basename(name: &str) -> &str {
    let name = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

// One data path: a physical directory tree plus the mega archives its
// `Data/megafiles.xml` index lists.
struct AssetLayer {
    data_path: PathBuf,
    mega_files: Vec<MegaFile>,
}

impl AssetLayer {
    fn new(data_path: PathBuf) -> Self {
        let mut mega_files = Vec::new();

        // The index file lists the archives to mount, in order.
        let index_path = data_path.join("Data").join("megafiles.xml");
        if let Ok(mut stream) = FileStream::open(&index_path) {
            if let Ok(bytes) = stream.read_to_end() {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                if let Ok(doc) = xml::parse(&text) {
                    for node in xml::elements(&doc.root_element()) {
                        let mega_path = data_path.join(xml::text(&node));
                        match MegaFile::open(&mega_path) {
                            Ok(mega) => mega_files.push(mega),
                            Err(err) => {
                                error!("cannot open mega archive \"{}\": {err}", mega_path.display());
                            }
                        }
                    }
                }
            }
        }

        Self {
            data_path,
            mega_files,
        }
    }

    // Tries the physical filesystem first (as-is, then per extension),
    // then every mega archive the same way.
    fn open_file(&self, relative: &Path, extensions: &[&str]) -> Option<Box<dyn Stream>> {
        let mut candidates = vec![relative.to_path_buf()];
        for extension in extensions {
            candidates.push(relative.with_extension(extension));
        }

        for candidate in &candidates {
            if let Ok(file) = FileStream::open(&self.data_path.join(candidate)) {
                debug!("opened file \"{}\"", candidate.display());
                return Some(Box::new(file));
            }
        }

        for mega in &self.mega_files {
            for candidate in &candidates {
                let name = candidate.to_string_lossy().replace('/', "\\");
                if let Some(stream) = mega.open_file(&name) {
                    debug!("opened archived file \"{name}\"");
                    return Some(stream);
                }
            }
        }
        None
    }
}

/// Locates and opens assets across the configured data paths.
pub struct AssetLoader {
    layers: Vec<AssetLayer>,
}

impl AssetLoader {
    /// Creates a loader over an ordered list of data paths; earlier paths
    /// win.
    #[must_use]
    pub fn new(data_paths: Vec<PathBuf>) -> Self {
        Self {
            layers: data_paths.into_iter().map(AssetLayer::new).collect(),
        }
    }

    /// Opens a configuration asset and returns its text.
    #[must_use]
    pub fn open_config(&self, name: &str) -> Option<String> {
        let mut stream = self.open_file(Path::new("Data").join("Xml"), name, &["xml"])?;
        let bytes = stream.read_to_end().ok()?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Opens a texture asset.
    #[must_use]
    pub fn open_texture(&self, name: &str) -> Option<Box<dyn Stream>> {
        self.open_file(Path::new("Data").join("Art").join("Textures"), name, &["dds", "tga"])
    }

    /// Opens a model asset.
    #[must_use]
    pub fn open_model(&self, name: &str) -> Option<Box<dyn Stream>> {
        self.open_file(Path::new("Data").join("Art").join("Models"), name, &["alo"])
    }

    /// Opens a shader asset.
    #[must_use]
    pub fn open_shader(&self, name: &str) -> Option<Box<dyn Stream>> {
        self.open_file(Path::new("Data").join("Art").join("Shaders"), name, &["hlsl"])
    }

    /// Opens a map asset.
    #[must_use]
    pub fn open_map(&self, name: &str) -> Option<Box<dyn Stream>> {
        self.open_file(Path::new("Data").join("Art").join("Maps"), name, &[])
    }

    fn open_file(
        &self,
        base_path: PathBuf,
        name: &str,
        extensions: &[&str],
    ) -> Option<Box<dyn Stream>> {
        if name.is_empty() {
            return None;
        }
        let relative = base_path.join(name);
        for layer in &self.layers {
            if let Some(stream) = layer.open_file(&relative, extensions) {
                return Some(stream);
            }
        }
        error!("unable to open file \"{}\"", relative.display());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_strips_path_and_extension() {
        assert_eq!(basename("Data\\Art\\Textures\\W_BLANK.DDS"), "W_BLANK");
        assert_eq!(basename("foo/bar.tga"), "bar");
        assert_eq!(basename("plain"), "plain");
    }
}
