//! The class index: a read-only table mapping a model output position to a
//! human-readable label, loaded once at startup from an ImageNet-style JSON
//! side file and shared by reference with every request handler

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Mapping from stringified class id to a `(code, label)` pair, e.g.
/// `"42": ["n01614925", "bald_eagle"]`
#[derive(Debug)]
pub struct ClassIndex {
    entries: HashMap<String, (String, String)>,
}

impl ClassIndex {
    /// Load the index from its JSON side file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("could not open class index {}", path.display()))?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let entries = serde_json::from_reader(reader).context("malformed class index")?;
        Ok(ClassIndex { entries })
    }

    /// Human-readable label for a class id, if the id is in the table
    pub fn label(&self, id: usize) -> Option<&str> {
        self.entries
            .get(&id.to_string())
            .map(|(_code, label)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
