//! The game-object type store.
//!
//! Game-object types arrive by the thousands from XML definition files; the
//! store copies their strings into a bump arena and indexes the types by
//! the CRC-32 of their uppercased name, which keeps loading fast and lookup
//! allocation-free.

use crate::assets::AssetLoader;
use crate::io::crc32;
use crate::io::xml::{self, Node};

use bumpalo::Bump;
use log::error;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Describes a game object.
///
/// A `GameObjectType` is a read-only view; the string data is owned by the
/// store's arena.
#[derive(Debug, Clone, Copy)]
pub struct GameObjectType {
    /// The name of this game object type.
    pub name: &'static str,
    /// The name of the render model to use in space mode.
    pub space_model_name: &'static str,
    /// The factor by which the model is scaled.
    pub scale_factor: f64,
    /// Should this object be rendered in the background layer?
    pub is_in_background: bool,
    /// Is this type a marker?
    pub is_marker: bool,
}

/// Loads and stores game-object types; lookups return views tied to the
/// store's lifetime.
pub struct GameObjectTypeStore {
    types: Vec<GameObjectType>,
    // CRC of the uppercased name → indices into `types` (duplicate CRCs are
    // resolved by comparing names).
    by_crc: FxHashMap<u32, SmallVec<[u32; 1]>>,
    // Drop order: the references in `types` point into this arena, which is
    // never reset and outlives them inside the store.
    arena: Box<Bump>,
}

impl GameObjectTypeStore {
    /// Loads the store from an XML index file: the index lists further XML
    /// files, each containing game-object type definitions.
    #[must_use]
    pub fn load(asset_loader: &AssetLoader, index_filename: &str) -> Self {
        let mut store = Self {
            types: Vec::new(),
            by_crc: FxHashMap::default(),
            arena: Box::new(Bump::new()),
        };

        let Some(index_data) = asset_loader.open_config(index_filename) else {
            return store;
        };
        let Ok(index) = xml::parse(&index_data) else {
            error!("cannot parse game object type index \"{index_filename}\"");
            return store;
        };

        let mut config_files = Vec::new();
        for file in xml::elements(&index.root_element()) {
            config_files.push(xml::text(&file).to_string());
        }
        for file in config_files {
            if let Some(config_data) = asset_loader.open_config(&file) {
                match xml::parse(&config_data) {
                    Ok(config) => store.read_game_object_types(&config.root_element()),
                    Err(err) => error!("cannot parse game object types: {err}"),
                }
            }
        }
        store
    }

    /// Finds a type by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GameObjectType> {
        let crc = crc32(name.to_ascii_uppercase().as_bytes());
        self.by_crc.get(&crc).and_then(|indices| {
            indices
                .iter()
                .map(|&i| &self.types[i as usize])
                .find(|t| t.name.eq_ignore_ascii_case(name))
        })
    }

    /// Finds a type by the CRC-32 of its uppercased name. With duplicate
    /// CRCs an arbitrary one of the duplicates is returned.
    #[must_use]
    pub fn get_by_crc(&self, crc: u32) -> Option<&GameObjectType> {
        self.by_crc
            .get(&crc)
            .and_then(|indices| indices.first())
            .map(|&i| &self.types[i as usize])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn read_game_object_types(&mut self, root: &Node) {
        for node in xml::elements(root) {
            match self.read_game_object_type(&node) {
                Ok(object_type) => {
                    let crc = crc32(object_type.name.to_ascii_uppercase().as_bytes());
                    let index = self.types.len() as u32;
                    self.types.push(object_type);
                    self.by_crc.entry(crc).or_default().push(index);
                }
                Err(err) => error!("cannot read game object type: {err}"),
            }
        }
    }

    fn read_game_object_type(&self, node: &Node) -> crate::Result<GameObjectType> {
        let name = self.copy_string(xml::require_attribute(node, "Name")?);
        let space_model_name =
            self.copy_string(xml::child_text(node, "Space_Model_Name").unwrap_or_default());
        let scale_factor = xml::optional_child_value(node, "Scale_Factor", 1.0)?;
        let is_in_background = xml::optional_child_value(node, "In_Background", false)?;

        let mut is_marker = false;
        if let Some(behaviors) = xml::child_text(node, "Behavior") {
            for behavior in behaviors.split([',', ' ', '\t', '\r', '\n']) {
                if behavior.eq_ignore_ascii_case("MARKER") {
                    is_marker = true;
                }
            }
        }

        Ok(GameObjectType {
            name,
            space_model_name,
            scale_factor,
            is_in_background,
            is_marker,
        })
    }

    // Copies a string into the arena and returns a view of the copy.
    fn copy_string(&self, s: &str) -> &'static str {
        let copy = self.arena.alloc_str(s);
        // SAFETY: the arena is boxed, never reset, and dropped only with
        // the store itself, after every `GameObjectType` referencing it.
        // References handed out by `get` are reborrowed with the store's
        // lifetime.
        unsafe { std::mem::transmute::<&str, &'static str>(copy) }
    }
}
