//! Entry declarations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A named logical bundle: scripts and stylesheets combined into one chunk,
/// in declared order. Immutable for the duration of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    /// Source module references, relative to the build context directory.
    pub sources: Vec<PathBuf>,
}

impl Entry {
    pub fn new(name: impl Into<String>, sources: Vec<PathBuf>) -> Self {
        Self { name: name.into(), sources }
    }
}
