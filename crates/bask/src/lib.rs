//! # bask
//!
//! Deterministic build orchestration for static web assets.
//!
//! Bask turns a tree of heterogeneous source files (scripts, stylesheets,
//! fonts) into a versioned set of deployable bundles. It owns the
//! orchestration only: which transform chain applies to which file, the
//! order lifecycle plugins fire in, how outputs are named and where they
//! land. The module-bundling engine behind the [`bundler::Bundler`] trait is
//! an external collaborator, and the per-file-type compilers are opaque
//! transform descriptions executed by that engine.
//!
//! A build either fully succeeds and returns a [`Manifest`], or fully fails
//! with no manifest and an output tree the caller must not serve.

pub mod bindings;
pub mod bundler;
pub mod config;
pub mod context;
pub mod entry;
pub mod hash;
pub mod manifest;
pub mod mode;
pub mod orchestrator;
pub mod output;
pub mod plugin;
pub mod plugins;
pub mod rules;
pub mod version;
pub mod writer;

// Shared fixtures, available to unit tests and (behind the `test-utils`
// feature) to integration suites and downstream crates.
#[cfg(any(test, feature = "test-utils"))]
pub mod testsupport;

pub use bindings::ExternalBindings;
pub use bundler::{BundleJob, Bundler, ModuleGraph, PassthroughBundler};
pub use config::BuildConfig;
pub use context::{Artifact, ArtifactKind, ArtifactPayload, ArtifactSet, BuildContext};
pub use entry::Entry;
pub use manifest::Manifest;
pub use mode::BuildMode;
pub use orchestrator::{BuildOrchestrator, BuildPlan};
pub use output::{OutputLayout, OutputPlanner};
pub use plugin::{LifecyclePhase, LifecyclePlugin, PluginChain};
pub use rules::{AssetCategory, Rule, RuleSet, Transform};
pub use version::{FixedTagger, GitTagger, TagScope, VersionTag, VersionTagger};

/// Error types for build orchestration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Revision lookup failed, so no version tag can be derived. Raised
    /// before any file is touched; there is no random or empty fallback.
    #[error("version unavailable: {reason}")]
    VersionUnavailable { reason: String },

    /// The output tree cannot be cleaned or written.
    #[error("output not writable at '{path}': {source}")]
    OutputNotWritable {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact path escapes the output root or is otherwise unusable.
    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    /// Invalid build declarations.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Declaration loading failed.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Host template rendering failed.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The bundling engine failed while constructing the module graph.
    #[error("bundling engine failed: {0:#}")]
    Bundler(anyhow::Error),

    /// I/O failure outside the output tree.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Umbrella fatal signal: a phase failed and the build stopped with no
    /// manifest. The output tree is indeterminate and must not be served.
    #[error("build aborted during {phase}: {source}")]
    BuildAborted {
        phase: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a phase failure into the umbrella abort signal.
    pub(crate) fn aborted(phase: &'static str, source: Error) -> Self {
        Error::BuildAborted { phase, source: Box::new(source) }
    }

    /// The phase a [`Error::BuildAborted`] failure happened in.
    pub fn aborted_phase(&self) -> Option<&'static str> {
        match self {
            Error::BuildAborted { phase, .. } => Some(phase),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Bundler(err)
    }
}

/// Result type alias for build orchestration.
pub type Result<T> = std::result::Result<T, Error>;
