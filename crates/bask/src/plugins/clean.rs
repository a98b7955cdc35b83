//! Output-tree cleaning.

use std::fs;
use std::path::{Path, PathBuf};

use crate::context::BuildContext;
use crate::manifest::MANIFEST_FILENAME;
use crate::output::{BUNDLES_DIR, FONTS_DIR, LIB_DIR};
use crate::plugin::{LifecyclePhase, LifecyclePlugin};
use crate::{Error, Result};

/// Deletes the build-owned subtrees under the output root before anything
/// new is written, so every build starts from a known-good empty state.
///
/// Idempotent: running against an already-clean (or missing) root is a
/// no-op. Permission problems fail loudly instead of deleting part of the
/// tree silently.
pub struct CleanPlugin {
    extra: Vec<PathBuf>,
}

impl CleanPlugin {
    pub fn new() -> Self {
        Self { extra: Vec::new() }
    }

    /// Additional root-relative paths the build owns, e.g. the rendered
    /// template filename.
    pub fn with_extra_paths(mut self, extra: Vec<PathBuf>) -> Self {
        self.extra = extra;
        self
    }

    fn owned_paths(&self) -> impl Iterator<Item = &Path> {
        [BUNDLES_DIR, FONTS_DIR, LIB_DIR, MANIFEST_FILENAME]
            .into_iter()
            .map(Path::new)
            .chain(self.extra.iter().map(PathBuf::as_path))
    }
}

impl Default for CleanPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecyclePlugin for CleanPlugin {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn phase(&self) -> LifecyclePhase {
        LifecyclePhase::PreBuild
    }

    fn on(&self, _phase: LifecyclePhase, ctx: &mut BuildContext) -> Result<()> {
        let root = ctx.output_root().to_path_buf();
        for rel in self.owned_paths() {
            let target = root.join(rel);
            remove(&target)?;
        }
        tracing::debug!(root = %root.display(), "output tree cleaned");
        Ok(())
    }
}

fn remove(target: &Path) -> Result<()> {
    let result = match target.symlink_metadata() {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(target),
        Ok(_) => fs::remove_file(target),
    };
    result.map_err(|source| Error::OutputNotWritable { path: target.to_path_buf(), source })
}
