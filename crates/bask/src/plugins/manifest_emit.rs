//! Manifest emission.
//!
//! Serializes the manifest after every artifact is on disk, so a manifest
//! on disk always describes a complete output tree.

use crate::context::BuildContext;
use crate::manifest::MANIFEST_FILENAME;
use crate::plugin::{LifecyclePhase, LifecyclePlugin};
use crate::writer;
use crate::Result;

/// Writes `manifest.json` under the output root in the post-emit phase.
#[derive(Debug, Default)]
pub struct ManifestEmitPlugin;

impl ManifestEmitPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl LifecyclePlugin for ManifestEmitPlugin {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn phase(&self) -> LifecyclePhase {
        LifecyclePhase::PostEmit
    }

    fn on(&self, _phase: LifecyclePhase, ctx: &mut BuildContext) -> Result<()> {
        let mut json = ctx.manifest.to_json_pretty()?;
        json.push('\n');
        let path = ctx.output_root().join(MANIFEST_FILENAME);
        writer::write_file(&path, json.as_bytes())?;
        tracing::debug!(path = %path.display(), "manifest written");
        Ok(())
    }
}
