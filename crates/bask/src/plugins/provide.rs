//! Implicit global-symbol provision.
//!
//! Identifiers configured here may be used free-standing in script sources;
//! an implicit import binding them to the named module is injected before
//! bundling. This is a pure source rewrite on the job, evaluated ahead of the
//! module graph. Deferring a whole module to a runtime global is the external
//! binding table's job instead.

use std::fmt::Write as _;

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};

use crate::context::BuildContext;
use crate::plugin::{LifecyclePhase, LifecyclePlugin};
use crate::rules::AssetCategory;
use crate::{Error, Result};

/// One provided identifier with its precompiled detection patterns.
struct Provided {
    ident: String,
    module: String,
    uses: Regex,
    declares: Regex,
}

/// Injects implicit import preambles for configured free-standing
/// identifiers in script sources.
///
/// Detection is best-effort: an identifier-boundary match for uses, skipped
/// when the source already declares or imports the name itself.
pub struct ProvidePlugin {
    provided: Vec<Provided>,
}

impl ProvidePlugin {
    /// Identifier → module map, applied in declaration order.
    pub fn new(map: IndexMap<String, String>) -> Result<Self> {
        let provided = map
            .into_iter()
            .map(|(ident, module)| {
                // `$` and `_` are identifier characters in scripts, so plain
                // word boundaries would miss them.
                let escaped = regex::escape(&ident);
                let uses = compile(&format!(r"(?:^|[^\w$]){escaped}(?:[^\w$]|$)"))?;
                let declares = compile(&format!(
                    r"(?:var|let|const|function|class)\s+{escaped}(?:[^\w$]|$)|import[^;\n]*[^\w$]{escaped}[^\w$][^;\n]*from"
                ))?;
                Ok(Provided { ident, module, uses, declares })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { provided })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|e| Error::InvalidConfig(format!("bad provide pattern: {e}")))
}

impl LifecyclePlugin for ProvidePlugin {
    fn name(&self) -> &'static str {
        "provide"
    }

    fn phase(&self) -> LifecyclePhase {
        LifecyclePhase::PreBuild
    }

    fn on(&self, _phase: LifecyclePhase, ctx: &mut BuildContext) -> Result<()> {
        let context_dir = ctx.job.context_dir.clone();
        for entry in &mut ctx.job.entries {
            for source in &mut entry.sources {
                if source.category != Some(AssetCategory::Script) {
                    continue;
                }
                let path = context_dir.join(&source.path);
                let Ok(text) = std::fs::read_to_string(&path) else {
                    tracing::debug!(
                        path = %path.display(),
                        "skipping unreadable source for symbol provision"
                    );
                    continue;
                };
                let mut preamble = String::new();
                for provided in &self.provided {
                    if provided.uses.is_match(&text) && !provided.declares.is_match(&text) {
                        let _ = writeln!(
                            preamble,
                            "import {} from \"{}\";",
                            provided.ident, provided.module
                        );
                    }
                }
                if !preamble.is_empty() {
                    tracing::debug!(
                        source = %source.path.display(),
                        "injected implicit import bindings"
                    );
                    source.preamble = preamble;
                }
            }
        }
        Ok(())
    }
}
