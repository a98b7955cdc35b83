//! The bundling-engine boundary.
//!
//! The orchestrator never transpiles, minifies or resolves module graphs
//! itself; it assembles a [`BundleJob`] and hands it to a [`Bundler`]. The
//! engine may parallelize transform execution across unrelated files
//! however it likes; the orchestration layer only constrains phase and
//! plugin sequencing.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::bindings::ExternalBindings;
use crate::mode::BuildMode;
use crate::rules::AssetCategory;

/// A transform with its mode-resolved options.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedTransform {
    pub name: String,
    pub options: Value,
}

/// One source module with its assigned transform chain.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedSource {
    /// Path relative to the job's context directory.
    pub path: PathBuf,
    /// Category claimed by the matching rule. `None` means no rule matched
    /// and the engine applies its default handling.
    pub category: Option<AssetCategory>,
    /// Transform chain in application order. Empty for unmatched files.
    pub transforms: Vec<PlannedTransform>,
    /// Source text prepended before bundling (implicit import bindings from
    /// global-symbol provision). Empty for most sources.
    pub preamble: String,
}

/// One entry's planned sources, in declared order.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedEntry {
    pub name: String,
    pub sources: Vec<PlannedSource>,
}

/// Everything the bundling engine needs for one invocation. Immutable once
/// the module graph is being constructed.
#[derive(Debug, Clone, Serialize)]
pub struct BundleJob {
    pub mode: BuildMode,
    /// Directory source paths are resolved against.
    pub context_dir: PathBuf,
    pub entries: Vec<PlannedEntry>,
    /// Modules resolved against a host-provided global at load time instead
    /// of being embedded.
    pub externals: ExternalBindings,
}

/// One piece of an entry chunk, tagged with the category its rule claimed.
#[derive(Debug, Clone)]
pub struct ChunkPiece {
    pub category: AssetCategory,
    pub source: PathBuf,
    pub content: Vec<u8>,
}

/// The combined chunk the engine produced for one entry.
#[derive(Debug, Clone)]
pub struct EntryChunk {
    pub entry: String,
    pub pieces: Vec<ChunkPiece>,
}

/// A binary asset the engine discovered while building the graph (fonts
/// referenced from stylesheets, for instance).
#[derive(Debug, Clone)]
pub struct DiscoveredAsset {
    pub logical_name: String,
    pub ext: String,
    pub content: Vec<u8>,
}

/// Module-graph output: one chunk per entry plus discovered binary assets.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    pub chunks: Vec<EntryChunk>,
    pub assets: Vec<DiscoveredAsset>,
}

impl ModuleGraph {
    pub fn chunk(&self, entry: &str) -> Option<&EntryChunk> {
        self.chunks.iter().find(|c| c.entry == entry)
    }
}

/// The external module-bundling engine.
///
/// Implementations own module resolution, transform execution and anything
/// else between sources and chunks. Failures abort the build.
pub trait Bundler {
    fn bundle(&self, job: &BundleJob) -> anyhow::Result<ModuleGraph>;
}

/// Minimal reference engine used by the CLI and the test suite.
///
/// It concatenates each entry's sources into one chunk without resolving
/// imports, treats transforms as pass-through markers, and discovers binary
/// assets from `url(...)` references in stylesheet sources. It exists to
/// exercise the orchestration layer, not to replace a real engine.
#[derive(Debug, Default)]
pub struct PassthroughBundler;

impl PassthroughBundler {
    pub fn new() -> Self {
        Self
    }
}

impl Bundler for PassthroughBundler {
    fn bundle(&self, job: &BundleJob) -> anyhow::Result<ModuleGraph> {
        let url_re = Regex::new(r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#).expect("static pattern");

        let mut graph = ModuleGraph::default();
        for entry in &job.entries {
            let mut pieces = Vec::with_capacity(entry.sources.len());
            for source in &entry.sources {
                let path = job.context_dir.join(&source.path);
                let raw = std::fs::read(&path)
                    .map_err(|e| anyhow::anyhow!("cannot read '{}': {e}", path.display()))?;
                let category = source
                    .category
                    .unwrap_or_else(|| default_category(&source.path));

                let content = if source.preamble.is_empty() {
                    raw
                } else {
                    let mut with_preamble = source.preamble.clone().into_bytes();
                    with_preamble.extend_from_slice(&raw);
                    with_preamble
                };

                if category == AssetCategory::Stylesheet {
                    collect_referenced_assets(&url_re, &path, &content, &mut graph.assets);
                }

                pieces.push(ChunkPiece {
                    category,
                    source: source.path.clone(),
                    content,
                });
            }
            graph.chunks.push(EntryChunk { entry: entry.name.clone(), pieces });
        }
        Ok(graph)
    }
}

/// Default handling for files no rule claimed.
fn default_category(path: &Path) -> AssetCategory {
    match path.extension().and_then(|e| e.to_str()) {
        Some("css") | Some("scss") | Some("sass") | Some("less") => AssetCategory::Stylesheet,
        _ => AssetCategory::Script,
    }
}

/// Pull `url(...)` references out of stylesheet content and load the files
/// they point at, relative to the stylesheet. Unreadable references are
/// skipped; a real engine resolves these through its own loaders.
fn collect_referenced_assets(
    url_re: &Regex,
    stylesheet: &Path,
    content: &[u8],
    assets: &mut Vec<DiscoveredAsset>,
) {
    let Ok(text) = std::str::from_utf8(content) else {
        return;
    };
    let base = stylesheet.parent().unwrap_or_else(|| Path::new("."));

    for capture in url_re.captures_iter(text) {
        let reference = capture[1].split(['?', '#']).next().unwrap_or("");
        if reference.is_empty() || reference.starts_with("data:") || reference.contains("://") {
            continue;
        }
        let target = base.join(reference);
        let Ok(bytes) = std::fs::read(&target) else {
            tracing::debug!(reference, from = %stylesheet.display(), "skipping unreadable asset reference");
            continue;
        };
        let logical_name = target
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = target
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if assets.iter().any(|a| a.logical_name == logical_name && a.ext == ext) {
            continue;
        }
        assets.push(DiscoveredAsset { logical_name, ext, content: bytes });
    }
}
