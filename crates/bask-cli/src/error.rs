//! Miette conversion for build failures.

use bask::Error;
use miette::{Report, miette};

/// Convert a build failure into a diagnostic, attaching a hint where one is
/// actionable.
pub fn to_report(err: Error) -> Report {
    match &err {
        Error::VersionUnavailable { reason } => miette!(
            help = "the version tag derives from revision history; run inside a repository \
                    with at least one commit touching the source tree",
            "version unavailable: {reason}"
        ),
        Error::OutputNotWritable { path, source } => miette!(
            help = "check permissions on the output root; the build owns it exclusively",
            "cannot write '{}': {source}",
            path.display()
        ),
        Error::InvalidConfig(reason) => miette!(
            help = "check the declaration file referenced by --config",
            "invalid configuration: {reason}"
        ),
        Error::BuildAborted { phase, source } => {
            miette!("build aborted during {phase}: {source}")
        }
        _ => miette!("{err}"),
    }
}
