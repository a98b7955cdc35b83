//! Stylesheet extraction.
//!
//! Stylesheets processed alongside scripts in one entry come out of the
//! chunk into standalone files instead of riding inline in the script
//! bundle. Extracted names follow the mode policy: stable in development so
//! incremental reloads keep their URL, content-hashed in production for
//! cache invalidation independent of the version tag.

use crate::context::{Artifact, ArtifactKind, ArtifactPayload, BuildContext};
use crate::plugin::{LifecyclePhase, LifecyclePlugin};
use crate::rules::AssetCategory;
use crate::{Error, Result};

/// Pulls stylesheet pieces out of entry chunks into standalone artifacts.
#[derive(Debug, Default)]
pub struct CssExtractPlugin;

impl CssExtractPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl LifecyclePlugin for CssExtractPlugin {
    fn name(&self) -> &'static str {
        "css-extract"
    }

    fn phase(&self) -> LifecyclePhase {
        LifecyclePhase::ContentGeneration
    }

    fn on(&self, _phase: LifecyclePhase, ctx: &mut BuildContext) -> Result<()> {
        let graph = ctx.graph.as_ref().ok_or_else(|| {
            Error::InvalidConfig("stylesheet extraction needs a module graph".into())
        })?;

        let mut extracted: Vec<(String, Vec<u8>)> = Vec::new();
        for chunk in &graph.chunks {
            let mut content: Vec<u8> = Vec::new();
            for piece in
                chunk.pieces.iter().filter(|p| p.category == AssetCategory::Stylesheet)
            {
                if !content.is_empty() {
                    content.push(b'\n');
                }
                content.extend_from_slice(&piece.content);
            }
            if !content.is_empty() {
                extracted.push((chunk.entry.clone(), content));
            }
        }

        for (entry, content) in extracted {
            let rel_path = ctx.planner.stylesheet_path(&entry, &content);
            ctx.manifest.set_stylesheet(&entry, ctx.planner.public_url(&rel_path));
            tracing::debug!(entry = %entry, path = %rel_path.display(), "extracted stylesheet");
            ctx.artifacts.push(Artifact {
                kind: ArtifactKind::Stylesheet,
                entry: Some(entry),
                rel_path,
                payload: ArtifactPayload::Bytes(content),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::bundler::{ChunkPiece, EntryChunk, ModuleGraph};
    use crate::hash;
    use crate::mode::BuildMode;
    use crate::testsupport::test_context_with_mode;

    fn context_with_chunk(mode: BuildMode, root: &Path) -> BuildContext {
        let mut ctx = test_context_with_mode(mode, root);
        ctx.manifest.set_script("main", "/static/bundles/main-abc1234.js");
        ctx.graph = Some(ModuleGraph {
            chunks: vec![EntryChunk {
                entry: "main".into(),
                pieces: vec![
                    ChunkPiece {
                        category: AssetCategory::Script,
                        source: "app.js".into(),
                        content: b"run();".to_vec(),
                    },
                    ChunkPiece {
                        category: AssetCategory::Stylesheet,
                        source: "site.scss".into(),
                        content: b"body { margin: 0; }".to_vec(),
                    },
                    ChunkPiece {
                        category: AssetCategory::Stylesheet,
                        source: "theme.scss".into(),
                        content: b"a { color: teal; }".to_vec(),
                    },
                ],
            }],
            assets: Vec::new(),
        });
        ctx
    }

    #[test]
    fn development_extraction_uses_the_stable_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_with_chunk(BuildMode::Development, dir.path());

        CssExtractPlugin::new().on(LifecyclePhase::ContentGeneration, &mut ctx).unwrap();

        let artifact = ctx.artifacts.of_kind(ArtifactKind::Stylesheet).next().unwrap();
        assert_eq!(artifact.rel_path, Path::new("bundles/main.css"));
        let ArtifactPayload::Bytes(content) = &artifact.payload else {
            panic!("stylesheets are byte artifacts");
        };
        assert_eq!(content, b"body { margin: 0; }\na { color: teal; }");
        assert_eq!(
            ctx.manifest.entry("main").unwrap().stylesheet.as_deref(),
            Some("/static/bundles/main.css"),
        );
    }

    #[test]
    fn production_extraction_hashes_the_final_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context_with_chunk(BuildMode::Production, dir.path());

        CssExtractPlugin::new().on(LifecyclePhase::ContentGeneration, &mut ctx).unwrap();

        let artifact = ctx.artifacts.of_kind(ArtifactKind::Stylesheet).next().unwrap();
        let expected = format!(
            "bundles/main.{}.css",
            hash::fingerprint(b"body { margin: 0; }\na { color: teal; }"),
        );
        assert_eq!(artifact.rel_path, Path::new(&expected));
    }

    #[test]
    fn entries_without_stylesheets_produce_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_context_with_mode(BuildMode::Production, dir.path());
        ctx.graph = Some(ModuleGraph {
            chunks: vec![EntryChunk {
                entry: "main".into(),
                pieces: vec![ChunkPiece {
                    category: AssetCategory::Script,
                    source: "app.js".into(),
                    content: b"run();".to_vec(),
                }],
            }],
            assets: Vec::new(),
        });

        CssExtractPlugin::new().on(LifecyclePhase::ContentGeneration, &mut ctx).unwrap();
        assert_eq!(ctx.artifacts.len(), 0);
    }

    #[test]
    fn missing_graph_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_context_with_mode(BuildMode::Production, dir.path());
        assert!(CssExtractPlugin::new().on(LifecyclePhase::ContentGeneration, &mut ctx).is_err());
    }
}
