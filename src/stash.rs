use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::StashError;
use crate::schema::Schema;

/// A named collection of brush schemas, persistable as a single artifact.
///
/// The binary format is compact and suited for local brush libraries; the
/// JSON form is for interchange with diagram editors.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Stash {
    brushes: AHashMap<String, Schema>,
}

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a schema under the given name, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) {
        self.brushes.insert(name.into(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.brushes.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Schema> {
        self.brushes.remove(name)
    }

    /// All stored brush names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        self.brushes.keys().map(String::as_str).sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }

    /// Serializes the stash using the bincode format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StashError> {
        Ok(encode_to_vec(self, standard())?)
    }

    /// Deserializes a stash from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StashError> {
        decode_from_slice(bytes, standard())
            .map(|(stash, _)| stash) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(StashError::from)
    }

    /// Saves the stash to a file in the bincode format.
    pub fn save(&self, path: &str) -> Result<(), StashError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Loads a stash from a file written by [`Stash::save`].
    pub fn load(path: &str) -> Result<Self, StashError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Renders the stash as pretty-printed JSON for editor interchange.
    pub fn to_json(&self) -> Result<String, StashError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a stash from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, StashError> {
        Ok(serde_json::from_str(json)?)
    }
}
