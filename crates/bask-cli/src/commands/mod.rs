//! Command implementations.

mod build;
mod plan;

pub use build::build;
pub use plan::plan;

use bask::{BuildConfig, BuildOrchestrator, GitTagger, PassthroughBundler};

use crate::cli::CommonArgs;

/// Load the declarations and assemble the orchestrator the way both
/// commands do: git-backed tagging scoped per the declarations, with the
/// reference bundling engine.
fn orchestrator_from(args: &CommonArgs) -> bask::Result<BuildOrchestrator> {
    let config = BuildConfig::load(&args.config)?;
    let mode = args.mode();
    tracing::debug!(config = %args.config.display(), %mode, "declarations loaded");
    let tagger = GitTagger::new(config.context_dir()).with_scope(config.tag_scope());
    config.orchestrator(mode, Box::new(tagger), Box::new(PassthroughBundler::new()))
}
