//! Shared build state passed through the plugin chain.

use std::path::PathBuf;

use crate::bundler::{BundleJob, ModuleGraph};
use crate::manifest::Manifest;
use crate::mode::BuildMode;
use crate::output::OutputPlanner;
use crate::version::VersionTag;

/// What an artifact is, for reporting and manifest bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    ScriptBundle,
    Stylesheet,
    BinaryAsset,
    Template,
    VendorDir,
}

/// How an artifact is materialized on disk.
#[derive(Debug, Clone)]
pub enum ArtifactPayload {
    /// Bytes written to the target path.
    Bytes(Vec<u8>),
    /// Directory copied verbatim to the target path.
    CopyDir(PathBuf),
}

/// One planned output, addressed relative to the output root.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Owning entry, where one exists.
    pub entry: Option<String>,
    pub rel_path: PathBuf,
    pub payload: ArtifactPayload,
}

/// Append-only set of artifacts staged for emission.
///
/// Plugins may add artifacts and observe what earlier plugins added; nothing
/// is ever removed, which keeps the phase ordering auditable.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    items: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.items.push(artifact);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn of_kind(&self, kind: ArtifactKind) -> impl Iterator<Item = &Artifact> {
        self.items.iter().filter(move |a| a.kind == kind)
    }
}

/// Mutable state shared by the orchestrator and the plugin chain for one
/// invocation. Constructed after the version tag resolves; discarded when
/// the build returns.
pub struct BuildContext {
    pub mode: BuildMode,
    pub tag: VersionTag,
    pub planner: OutputPlanner,
    /// The job handed to the bundling engine. Pre-build plugins may still
    /// shape it; it is settled once the module graph exists.
    pub job: BundleJob,
    /// Module-graph output, present from content-generation onwards.
    pub graph: Option<ModuleGraph>,
    pub artifacts: ArtifactSet,
    pub manifest: Manifest,
}

impl BuildContext {
    pub fn new(planner: OutputPlanner, job: BundleJob, manifest: Manifest) -> Self {
        Self {
            mode: planner.mode(),
            tag: planner.tag().clone(),
            planner,
            job,
            graph: None,
            artifacts: ArtifactSet::new(),
            manifest,
        }
    }

    /// Absolute output root for this build.
    pub fn output_root(&self) -> &std::path::Path {
        &self.planner.layout().root
    }
}
