//! Output layout and path planning.
//!
//! Three addressing schemes coexist on purpose: script bundles carry the
//! revision-derived version tag (they change atomically with a deploy),
//! extracted stylesheets carry a content hash in production (finer-grained
//! cache invalidation during iterative tuning), and binary assets keep
//! stable names (they are referenced from stylesheets whose URLs are already
//! versioned). Downstream caching and URL behavior depend on the exact
//! scheme.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hash;
use crate::mode::BuildMode;
use crate::version::{TAG_LEN, VersionTag};

/// Subdirectory for script and stylesheet bundles.
pub const BUNDLES_DIR: &str = "bundles";
/// Subdirectory for binary assets.
pub const FONTS_DIR: &str = "fonts";
/// Subdirectory for verbatim vendor copies.
pub const LIB_DIR: &str = "lib";

/// Where artifacts land on disk and how they are addressed at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputLayout {
    /// Output root, wholly owned by the build.
    pub root: PathBuf,
    /// Public base path prepended to emitted URLs, e.g.
    /// `/static/site` or `++plone++site.static`.
    pub public_base: String,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self { root: root.into(), public_base: public_base.into() }
    }
}

/// Computes output paths for one build invocation.
#[derive(Debug, Clone)]
pub struct OutputPlanner {
    mode: BuildMode,
    tag: VersionTag,
    layout: OutputLayout,
}

impl OutputPlanner {
    pub fn new(mode: BuildMode, tag: VersionTag, layout: OutputLayout) -> Self {
        Self { mode, tag, layout }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn tag(&self) -> &VersionTag {
        &self.tag
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// `bundles/{name}-{tag}.js`, in both modes.
    pub fn script_path(&self, name: &str) -> PathBuf {
        Path::new(BUNDLES_DIR).join(format!("{name}-{}.js", self.tag))
    }

    /// `bundles/{name}.css` in development, `bundles/{name}.{hash}.css` in
    /// production. The hash is a function of the final stylesheet content,
    /// independent of the version tag.
    pub fn stylesheet_path(&self, name: &str, content: &[u8]) -> PathBuf {
        let filename = match self.mode {
            BuildMode::Development => format!("{name}.css"),
            BuildMode::Production => format!("{name}.{}.css", hash::fingerprint(content)),
        };
        Path::new(BUNDLES_DIR).join(filename)
    }

    /// `fonts/{name}.{ext}`, never hashed.
    pub fn binary_path(&self, name: &str, ext: &str) -> PathBuf {
        Path::new(FONTS_DIR).join(format!("{name}.{ext}"))
    }

    /// `lib/{package}` for verbatim vendor copies.
    pub fn vendor_path(&self, package: &str) -> PathBuf {
        Path::new(LIB_DIR).join(package)
    }

    /// Runtime URL for a planned relative path.
    pub fn public_url(&self, rel: &Path) -> String {
        let mut url = self.layout.public_base.trim_end_matches('/').to_string();
        for component in rel.components() {
            url.push('/');
            url.push_str(&component.as_os_str().to_string_lossy());
        }
        url
    }
}

/// Recover `(logical name, tag)` from a planned script filename.
pub fn parse_script_filename(filename: &str) -> Option<(String, VersionTag)> {
    let stem = filename.strip_suffix(".js")?;
    let (name, tag) = stem.rsplit_once('-')?;
    if name.is_empty() || tag.len() != TAG_LEN {
        return None;
    }
    let tag = VersionTag::new(tag).ok()?;
    Some((name.to_string(), tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(mode: BuildMode) -> OutputPlanner {
        OutputPlanner::new(
            mode,
            VersionTag::new("abc1234").unwrap(),
            OutputLayout::new("/srv/static", "/static/site"),
        )
    }

    #[test]
    fn script_paths_are_tagged_in_both_modes() {
        for mode in [BuildMode::Development, BuildMode::Production] {
            assert_eq!(
                planner(mode).script_path("main"),
                Path::new("bundles/main-abc1234.js"),
            );
        }
    }

    #[test]
    fn stylesheet_naming_depends_on_mode() {
        let css = b"body { margin: 0; }";
        assert_eq!(
            planner(BuildMode::Development).stylesheet_path("main", css),
            Path::new("bundles/main.css"),
        );

        let prod = planner(BuildMode::Production).stylesheet_path("main", css);
        let filename = prod.file_name().unwrap().to_str().unwrap();
        let expected = format!("main.{}.css", crate::hash::fingerprint(css));
        assert_eq!(filename, expected);
    }

    #[test]
    fn stylesheet_hash_tracks_content_not_tag() {
        let a = planner(BuildMode::Production).stylesheet_path("main", b"a {}");
        let b = planner(BuildMode::Production).stylesheet_path("main", b"b {}");
        assert_ne!(a, b);

        let other_tag = OutputPlanner::new(
            BuildMode::Production,
            VersionTag::new("1111111").unwrap(),
            OutputLayout::new("/srv/static", "/static/site"),
        );
        assert_eq!(a, other_tag.stylesheet_path("main", b"a {}"));
    }

    #[test]
    fn binary_assets_keep_stable_names() {
        let p = planner(BuildMode::Production);
        assert_eq!(p.binary_path("glyphicons", "woff2"), Path::new("fonts/glyphicons.woff2"));
    }

    #[test]
    fn public_urls_join_the_base() {
        let p = planner(BuildMode::Production);
        assert_eq!(
            p.public_url(&p.script_path("main")),
            "/static/site/bundles/main-abc1234.js",
        );
        assert_eq!(p.public_url(Path::new("fonts/x.woff")), "/static/site/fonts/x.woff");
    }

    #[test]
    fn script_filename_round_trips() {
        let p = planner(BuildMode::Production);
        let path = p.script_path("senaite-core");
        let filename = path.file_name().unwrap().to_str().unwrap();
        let (name, tag) = parse_script_filename(filename).unwrap();
        assert_eq!(name, "senaite-core");
        assert_eq!(&tag, p.tag());
    }

    #[test]
    fn parse_rejects_untagged_filenames() {
        assert!(parse_script_filename("main.js").is_none());
        assert!(parse_script_filename("main-notahash.js").is_none());
        assert!(parse_script_filename("main-abc1234.css").is_none());
    }
}
