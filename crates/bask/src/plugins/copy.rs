//! Verbatim vendor copies.
//!
//! Pre-built third-party directories bypass the rule/transform chain
//! entirely and land under the fixed `lib/<package>` subpath.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::context::{Artifact, ArtifactKind, ArtifactPayload, BuildContext};
use crate::plugin::{LifecyclePhase, LifecyclePlugin};
use crate::{Error, Result};

/// One declared copy: a source directory and its target package name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorCopy {
    /// Target subdirectory under `lib/`.
    pub package: String,
    /// Source directory copied verbatim.
    pub from: PathBuf,
}

/// Stages recursive copies of configured vendor directories.
pub struct VendorCopyPlugin {
    copies: Vec<VendorCopy>,
}

impl VendorCopyPlugin {
    pub fn new(copies: Vec<VendorCopy>) -> Self {
        Self { copies }
    }
}

impl LifecyclePlugin for VendorCopyPlugin {
    fn name(&self) -> &'static str {
        "vendor-copy"
    }

    fn phase(&self) -> LifecyclePhase {
        LifecyclePhase::ContentGeneration
    }

    fn on(&self, _phase: LifecyclePhase, ctx: &mut BuildContext) -> Result<()> {
        for copy in &self.copies {
            if !copy.from.is_dir() {
                return Err(Error::InvalidConfig(format!(
                    "vendor source '{}' for package '{}' is not a directory",
                    copy.from.display(),
                    copy.package
                )));
            }
            let rel_path = ctx.planner.vendor_path(&copy.package);
            tracing::debug!(
                package = %copy.package,
                from = %copy.from.display(),
                "staging vendor copy"
            );
            ctx.artifacts.push(Artifact {
                kind: ArtifactKind::VendorDir,
                entry: None,
                rel_path,
                payload: ArtifactPayload::CopyDir(copy.from.clone()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use crate::testsupport::test_context_at;

    #[test]
    fn stages_one_artifact_per_declared_copy() {
        let dir = tempfile::tempdir().unwrap();
        let jquery = dir.path().join("node_modules/jquery");
        fs::create_dir_all(&jquery).unwrap();
        let bootstrap = dir.path().join("node_modules/bootstrap");
        fs::create_dir_all(&bootstrap).unwrap();

        let mut ctx = test_context_at(dir.path());
        let plugin = VendorCopyPlugin::new(vec![
            VendorCopy { package: "jquery".into(), from: jquery.clone() },
            VendorCopy { package: "bootstrap".into(), from: bootstrap },
        ]);
        plugin.on(LifecyclePhase::ContentGeneration, &mut ctx).unwrap();

        let staged: Vec<_> = ctx.artifacts.of_kind(ArtifactKind::VendorDir).collect();
        assert_eq!(staged.len(), 2);
        assert_eq!(staged[0].rel_path, Path::new("lib/jquery"));
        let ArtifactPayload::CopyDir(from) = &staged[0].payload else {
            panic!("vendor copies are directory artifacts");
        };
        assert_eq!(from, &jquery);
    }

    #[test]
    fn missing_source_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_context_at(dir.path());
        let plugin = VendorCopyPlugin::new(vec![VendorCopy {
            package: "jquery".into(),
            from: dir.path().join("gone"),
        }]);
        let err = plugin.on(LifecyclePhase::ContentGeneration, &mut ctx).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
