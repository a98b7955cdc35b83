//! Host template rendering.
//!
//! The host page references bundles through placeholder markers; rendering
//! substitutes the final public URLs. Registered after stylesheet extraction
//! so every name it observes is final. Filenames embed the version tag, so
//! substitution before names are settled would bake in stale URLs.

use std::path::PathBuf;

use minijinja::{Environment, context};

use crate::context::{Artifact, ArtifactKind, ArtifactPayload, BuildContext};
use crate::plugin::{LifecyclePhase, LifecyclePlugin};
use crate::Result;

/// Renders the host template with the finalized bundle references.
pub struct TemplatePlugin {
    source: PathBuf,
    output: String,
}

impl TemplatePlugin {
    /// `source` is the template file; `output` is the rendered filename,
    /// placed at the output root.
    pub fn new(source: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        Self { source: source.into(), output: output.into() }
    }
}

impl LifecyclePlugin for TemplatePlugin {
    fn name(&self) -> &'static str {
        "template"
    }

    fn phase(&self) -> LifecyclePhase {
        LifecyclePhase::ContentGeneration
    }

    fn on(&self, _phase: LifecyclePhase, ctx: &mut BuildContext) -> Result<()> {
        let text = std::fs::read_to_string(&self.source)?;

        let mut env = Environment::new();
        env.add_template("host", &text)?;
        let rendered = env.get_template("host")?.render(context! {
            entries => minijinja::Value::from_serialize(&ctx.manifest.entries),
            mode => ctx.mode.to_string(),
            version => ctx.tag.to_string(),
        })?;

        tracing::debug!(output = %self.output, "rendered host template");
        ctx.artifacts.push(Artifact {
            kind: ArtifactKind::Template,
            entry: None,
            rel_path: PathBuf::from(&self.output),
            payload: ArtifactPayload::Bytes(rendered.into_bytes()),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use crate::testsupport::test_context_at;
    use crate::Error;

    const TEMPLATE: &str = "\
<script src=\"{{ entries.main.script }}\"></script>
{% if entries.main.stylesheet %}<link href=\"{{ entries.main.stylesheet }}\">{% endif %}
<!-- {{ mode }} {{ version }} -->
";

    #[test]
    fn substitutes_final_bundle_references() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("resources.html.in");
        fs::write(&source, TEMPLATE).unwrap();

        let mut ctx = test_context_at(dir.path());
        ctx.manifest.set_script("main", "/static/bundles/main-abc1234.js");
        ctx.manifest.set_stylesheet("main", "/static/bundles/main.css");

        let plugin = TemplatePlugin::new(&source, "resources.html");
        plugin.on(LifecyclePhase::ContentGeneration, &mut ctx).unwrap();

        let artifact = ctx.artifacts.of_kind(ArtifactKind::Template).next().unwrap();
        assert_eq!(artifact.rel_path, Path::new("resources.html"));
        let ArtifactPayload::Bytes(bytes) = &artifact.payload else {
            panic!("templates are byte artifacts");
        };
        let rendered = std::str::from_utf8(bytes).unwrap();
        assert!(rendered.contains("src=\"/static/bundles/main-abc1234.js\""));
        assert!(rendered.contains("href=\"/static/bundles/main.css\""));
        assert!(rendered.contains("development abc1234"));
    }

    #[test]
    fn missing_stylesheet_renders_without_a_link() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("resources.html.in");
        fs::write(&source, TEMPLATE).unwrap();

        let mut ctx = test_context_at(dir.path());
        ctx.manifest.set_script("main", "/static/bundles/main-abc1234.js");

        TemplatePlugin::new(&source, "resources.html")
            .on(LifecyclePhase::ContentGeneration, &mut ctx)
            .unwrap();

        let artifact = ctx.artifacts.of_kind(ArtifactKind::Template).next().unwrap();
        let ArtifactPayload::Bytes(bytes) = &artifact.payload else {
            panic!("templates are byte artifacts");
        };
        assert!(!std::str::from_utf8(bytes).unwrap().contains("<link"));
    }

    #[test]
    fn bad_template_syntax_is_a_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.html.in");
        fs::write(&source, "{{ entries.main").unwrap();

        let mut ctx = test_context_at(dir.path());
        let err = TemplatePlugin::new(&source, "resources.html")
            .on(LifecyclePhase::ContentGeneration, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn missing_template_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = test_context_at(dir.path());
        let err = TemplatePlugin::new(dir.path().join("gone.html.in"), "resources.html")
            .on(LifecyclePhase::ContentGeneration, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
