//! The build manifest.
//!
//! Machine-consumable record of every emitted bundle and its public URL, in
//! entry declaration order. Regenerable byte-for-byte from the same inputs
//! and source tree state; content hashes are defined functions of content.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::mode::BuildMode;
use crate::version::VersionTag;
use crate::{Error, Result};

/// Filename of the emitted manifest, at the output root.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Final public URLs for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOutputs {
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,
}

/// A binary asset emitted under the fixed fonts subpath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub mode: BuildMode,
    pub version: VersionTag,
    pub entries: IndexMap<String, EntryOutputs>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub externals: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetRecord>,
}

impl Manifest {
    pub fn new(mode: BuildMode, version: VersionTag) -> Self {
        Self {
            mode,
            version,
            entries: IndexMap::new(),
            externals: IndexMap::new(),
            assets: Vec::new(),
        }
    }

    pub fn set_script(&mut self, entry: impl Into<String>, url: impl Into<String>) {
        let entry = entry.into();
        let url = url.into();
        match self.entries.get_mut(&entry) {
            Some(outputs) => outputs.script = url,
            None => {
                self.entries.insert(entry, EntryOutputs { script: url, stylesheet: None });
            }
        }
    }

    pub fn set_stylesheet(&mut self, entry: &str, url: impl Into<String>) {
        if let Some(outputs) = self.entries.get_mut(entry) {
            outputs.stylesheet = Some(url.into());
        }
    }

    pub fn add_asset(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.assets.push(AssetRecord { name: name.into(), path: path.into() });
    }

    pub fn entry(&self, name: &str) -> Option<&EntryOutputs> {
        self.entries.get(name)
    }

    /// Whether the module is resolved against a host global instead of
    /// being embedded.
    pub fn is_external(&self, module: &str) -> bool {
        self.externals.contains_key(module)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidConfig(format!("manifest serialization failed: {e}")))
    }
}
