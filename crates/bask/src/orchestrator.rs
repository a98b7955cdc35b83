//! Build orchestration.
//!
//! Composes entries, rules, lifecycle plugins and external bindings into one
//! deterministic plan, drives the external bundling engine through the
//! phases, and returns the manifest. Fail-fast: any phase failure aborts the
//! whole build with no manifest, leaving the output tree indeterminate for
//! the caller to discard. No partial recovery is attempted.

use std::path::PathBuf;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::bindings::ExternalBindings;
use crate::bundler::{BundleJob, Bundler, PlannedEntry, PlannedSource, PlannedTransform};
use crate::context::{Artifact, ArtifactKind, ArtifactPayload, BuildContext};
use crate::entry::Entry;
use crate::manifest::Manifest;
use crate::mode::BuildMode;
use crate::output::{OutputLayout, OutputPlanner};
use crate::plugin::{LifecyclePhase, PluginChain};
use crate::rules::{AssetCategory, RuleSet};
use crate::version::{VersionTag, VersionTagger};
use crate::writer;
use crate::{Error, Result};

/// Dry-run description of one assembled build, for callers that want to
/// inspect the plan without touching the output tree.
#[derive(Debug, Serialize)]
pub struct BuildPlan {
    pub mode: BuildMode,
    pub version: VersionTag,
    /// The job as it would be handed to the bundling engine.
    pub job: BundleJob,
    /// Script bundle public URLs per entry; known before bundling because
    /// script names embed the version tag, not a content hash.
    pub scripts: IndexMap<String, String>,
    /// Non-fatal diagnostics: rule conflicts and unresolved bindings.
    pub warnings: Vec<String>,
}

/// Plan, job, manifest skeleton and diagnostics for one invocation.
struct Assembly {
    planner: OutputPlanner,
    job: BundleJob,
    manifest: Manifest,
    warnings: Vec<String>,
}

/// Drives one build invocation end to end.
pub struct BuildOrchestrator {
    mode: BuildMode,
    layout: OutputLayout,
    context_dir: PathBuf,
    tagger: Box<dyn VersionTagger>,
    bundler: Box<dyn Bundler>,
    entries: Vec<Entry>,
    rules: RuleSet,
    plugins: PluginChain,
    externals: ExternalBindings,
    host_globals: Vec<String>,
}

impl std::fmt::Debug for BuildOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOrchestrator")
            .field("mode", &self.mode)
            .field("context_dir", &self.context_dir)
            .field("host_globals", &self.host_globals)
            .finish_non_exhaustive()
    }
}

impl BuildOrchestrator {
    pub fn new(
        mode: BuildMode,
        layout: OutputLayout,
        context_dir: impl Into<PathBuf>,
        tagger: Box<dyn VersionTagger>,
        bundler: Box<dyn Bundler>,
    ) -> Self {
        Self {
            mode,
            layout,
            context_dir: context_dir.into(),
            tagger,
            bundler,
            entries: Vec::new(),
            rules: RuleSet::default(),
            plugins: PluginChain::new(),
            externals: ExternalBindings::new(),
            host_globals: Vec::new(),
        }
    }

    pub fn with_entries(mut self, entries: Vec<Entry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_plugins(mut self, plugins: PluginChain) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_externals(mut self, externals: ExternalBindings) -> Self {
        self.externals = externals;
        self
    }

    pub fn with_host_globals(mut self, host_globals: Vec<String>) -> Self {
        self.host_globals = host_globals;
        self
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Assemble the plan without touching the output tree.
    pub fn plan(&self) -> Result<BuildPlan> {
        self.check_entries()?;
        let tag = self.tagger.tag()?;
        let assembly = self.assemble(tag.clone());
        let scripts = assembly
            .manifest
            .entries
            .iter()
            .map(|(name, outputs)| (name.clone(), outputs.script.clone()))
            .collect();
        Ok(BuildPlan {
            mode: self.mode,
            version: tag,
            job: assembly.job,
            scripts,
            warnings: assembly.warnings,
        })
    }

    /// Run the full build: resolve the tag, assemble the job, fire the
    /// phases in order and write the output tree.
    ///
    /// Phase order is `pre-build → module graph → content-generation →
    /// emit → post-emit`; any failure after tag resolution surfaces as
    /// [`Error::BuildAborted`] naming the phase.
    pub fn build(&self) -> Result<Manifest> {
        self.check_entries()?;
        // Fatal before any file is touched.
        let tag = self.tagger.tag()?;
        tracing::info!(mode = %self.mode, version = %tag, "assembling build plan");

        let assembly = self.assemble(tag);
        for warning in &assembly.warnings {
            tracing::warn!("{warning}");
        }
        let mut ctx = BuildContext::new(assembly.planner, assembly.job, assembly.manifest);

        self.plugins
            .run_phase(LifecyclePhase::PreBuild, &mut ctx)
            .map_err(|e| Error::aborted("pre-build", e))?;

        let graph = self
            .bundler
            .bundle(&ctx.job)
            .map_err(|e| Error::aborted("module-graph", Error::Bundler(e)))?;
        ctx.graph = Some(graph);

        self.plugins
            .run_phase(LifecyclePhase::ContentGeneration, &mut ctx)
            .map_err(|e| Error::aborted("content-generation", e))?;

        self.materialize_chunks(&mut ctx).map_err(|e| Error::aborted("emit", e))?;
        writer::write_artifacts(ctx.output_root(), &ctx.artifacts)
            .map_err(|e| Error::aborted("emit", e))?;

        self.plugins
            .run_phase(LifecyclePhase::PostEmit, &mut ctx)
            .map_err(|e| Error::aborted("post-emit", e))?;

        tracing::info!(artifacts = ctx.artifacts.len(), "build complete");
        Ok(ctx.manifest)
    }

    fn check_entries(&self) -> Result<()> {
        let mut seen = FxHashSet::default();
        for entry in &self.entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(Error::InvalidConfig(format!("duplicate entry '{}'", entry.name)));
            }
        }
        Ok(())
    }

    /// Match every entry source against the rules, resolve transform options
    /// for the mode, and seed the manifest with the script URLs (final from
    /// the start, since script names embed the tag).
    fn assemble(&self, tag: VersionTag) -> Assembly {
        let planner = OutputPlanner::new(self.mode, tag.clone(), self.layout.clone());
        let mut manifest = Manifest::new(self.mode, tag);
        let mut warnings = Vec::new();
        let mut planned_entries = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let mut sources = Vec::with_capacity(entry.sources.len());
            for source in &entry.sources {
                let display = source.to_string_lossy().replace('\\', "/");
                let candidates = self.rules.matches_for(&display);
                if candidates.len() > 1 {
                    let claims: Vec<String> = candidates
                        .iter()
                        .map(|(index, rule)| format!("rule {index} ({})", rule.category()))
                        .collect();
                    warnings.push(format!(
                        "rules overlap on '{display}': {}; first declared rule wins",
                        claims.join(", ")
                    ));
                }
                let planned = match candidates.first() {
                    Some((_, rule)) => PlannedSource {
                        path: source.clone(),
                        category: Some(rule.category()),
                        transforms: rule
                            .transforms()
                            .iter()
                            .map(|t| PlannedTransform {
                                name: t.name.clone(),
                                options: t.options_for(self.mode),
                            })
                            .collect(),
                        preamble: String::new(),
                    },
                    // No rule claims the file; the engine's default
                    // handling applies and content passes through.
                    None => PlannedSource {
                        path: source.clone(),
                        category: None,
                        transforms: Vec::new(),
                        preamble: String::new(),
                    },
                };
                sources.push(planned);
            }
            planned_entries.push(PlannedEntry { name: entry.name.clone(), sources });

            let script = planner.script_path(&entry.name);
            manifest.set_script(&entry.name, planner.public_url(&script));
        }

        for (module, global) in self.externals.iter() {
            manifest.externals.insert(module.to_string(), global.to_string());
        }
        for (module, global) in self.externals.unresolved(&self.host_globals) {
            warnings.push(format!(
                "module '{module}' is declared external but the host does not declare \
                 global '{global}'"
            ));
        }

        let job = BundleJob {
            mode: self.mode,
            context_dir: self.context_dir.clone(),
            entries: planned_entries,
            externals: self.externals.clone(),
        };
        Assembly { planner, job, manifest, warnings }
    }

    /// Turn the module graph into the remaining artifacts: one script
    /// bundle per entry plus any binary assets. Stylesheet pieces already
    /// claimed by an extraction artifact stay out of the script bundle;
    /// without extraction they ride along inline.
    fn materialize_chunks(&self, ctx: &mut BuildContext) -> Result<()> {
        let extracted: FxHashSet<String> = ctx
            .artifacts
            .of_kind(ArtifactKind::Stylesheet)
            .filter_map(|a| a.entry.clone())
            .collect();

        let mut scripts: Vec<(String, PathBuf, Vec<u8>)> = Vec::new();
        let mut assets: Vec<(String, String, Vec<u8>)> = Vec::new();
        {
            let graph = ctx
                .graph
                .as_ref()
                .ok_or_else(|| Error::InvalidConfig("module graph missing at emit time".into()))?;
            for chunk in &graph.chunks {
                let mut content = Vec::new();
                for piece in &chunk.pieces {
                    let include = match piece.category {
                        AssetCategory::Script => true,
                        AssetCategory::Stylesheet => !extracted.contains(&chunk.entry),
                        AssetCategory::Binary => false,
                    };
                    if include {
                        if !content.is_empty() {
                            content.push(b'\n');
                        }
                        content.extend_from_slice(&piece.content);
                    }
                }
                scripts.push((chunk.entry.clone(), ctx.planner.script_path(&chunk.entry), content));

                // Binary sources declared directly on an entry are routed to
                // the fonts subpath like engine-discovered assets.
                for piece in chunk.pieces.iter().filter(|p| p.category == AssetCategory::Binary) {
                    let name = piece
                        .source
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let ext = piece
                        .source
                        .extension()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    assets.push((name, ext, piece.content.clone()));
                }
            }
            for asset in &graph.assets {
                assets.push((asset.logical_name.clone(), asset.ext.clone(), asset.content.clone()));
            }
        }

        for (entry, rel_path, content) in scripts {
            ctx.artifacts.push(Artifact {
                kind: ArtifactKind::ScriptBundle,
                entry: Some(entry),
                rel_path,
                payload: ArtifactPayload::Bytes(content),
            });
        }
        let mut seen = FxHashSet::default();
        for (name, ext, content) in assets {
            if !seen.insert((name.clone(), ext.clone())) {
                continue;
            }
            let rel_path = ctx.planner.binary_path(&name, &ext);
            ctx.manifest.add_asset(format!("{name}.{ext}"), ctx.planner.public_url(&rel_path));
            ctx.artifacts.push(Artifact {
                kind: ArtifactKind::BinaryAsset,
                entry: None,
                rel_path,
                payload: ArtifactPayload::Bytes(content),
            });
        }
        Ok(())
    }
}
