//! Build declarations.
//!
//! Declarations are read once per invocation from a `bask.toml` file merged
//! with `BASK_`-prefixed environment variables; they are never hot-reloaded
//! within a build. Relative paths resolve against the directory holding the
//! declaration file.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format as _, Toml};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::bindings::ExternalBindings;
use crate::bundler::Bundler;
use crate::entry::Entry;
use crate::mode::BuildMode;
use crate::orchestrator::BuildOrchestrator;
use crate::output::OutputLayout;
use crate::plugin::PluginChain;
use crate::plugins::{
    CleanPlugin, CssExtractPlugin, ManifestEmitPlugin, ProvidePlugin, TemplatePlugin, VendorCopy,
    VendorCopyPlugin,
};
use crate::rules::{AssetCategory, Rule, RuleSet, Transform};
use crate::version::{TagScope, VersionTagger};
use crate::{Error, Result};

/// Environment variable prefix merged over the declaration file. Nested keys
/// split on `__`, e.g. `BASK_LAYOUT__PUBLIC_BASE`.
pub const ENV_PREFIX: &str = "BASK_";

/// One declared rule, as written in the declaration file. Compiled into a
/// [`Rule`] at plan-assembly time.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    pub category: AssetCategory,
    /// Suffix/regex patterns claiming files for this rule.
    pub test: Vec<String>,
    /// Paths never matched, e.g. vendor directories.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default, rename = "transform")]
    pub transforms: Vec<Transform>,
}

impl RuleConfig {
    fn compile(&self) -> Result<Rule> {
        let test: Vec<&str> = self.test.iter().map(String::as_str).collect();
        let exclude: Vec<&str> = self.exclude.iter().map(String::as_str).collect();
        Rule::new(self.category, &test, self.transforms.clone())?.exclude(&exclude)
    }
}

/// Host template declaration: template source and rendered output filename
/// (placed at the output root).
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    pub source: PathBuf,
    pub output: String,
}

/// Which part of revision history feeds the version tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// Last commit touching the tag directory (default).
    #[default]
    Workdir,
    /// Repository `HEAD`, so changes anywhere bump the tag.
    Repository,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagConfig {
    #[serde(default)]
    pub scope: ScopeKind,
    /// Directory the workdir scope derives from; defaults to the context
    /// directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// The complete input declaration set for one build invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Directory entry sources resolve against. Defaults to the directory
    /// holding the declaration file.
    #[serde(default)]
    pub context: Option<PathBuf>,
    pub layout: OutputLayout,
    #[serde(default)]
    pub tag: TagConfig,
    #[serde(default)]
    pub template: Option<TemplateConfig>,
    #[serde(default, rename = "entry")]
    pub entries: Vec<Entry>,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleConfig>,
    #[serde(default, rename = "vendor")]
    pub vendors: Vec<VendorCopy>,
    /// Free-standing identifier → module, bound by an implicit import before
    /// bundling.
    #[serde(default)]
    pub provide: IndexMap<String, String>,
    /// Module key → runtime global symbol, resolved at load time instead of
    /// being embedded.
    #[serde(default)]
    pub externals: IndexMap<String, String>,
    /// Globals the host promises to provide, for the best-effort binding
    /// check.
    #[serde(default)]
    pub host_globals: Vec<String>,
}

impl BuildConfig {
    /// Load declarations from `path`, merging `BASK_`-prefixed environment
    /// variables over the file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::InvalidConfig(format!(
                "no build declarations at '{}'",
                path.display()
            )));
        }
        let config: BuildConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolved_against(base))
    }

    /// Rebase every relative path in the declarations onto `base`.
    fn resolved_against(mut self, base: &Path) -> Self {
        let rebase = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        self.context = Some(rebase(self.context.unwrap_or_else(|| PathBuf::from("."))));
        self.layout.root = rebase(std::mem::take(&mut self.layout.root));
        if let Some(template) = &mut self.template {
            template.source = rebase(std::mem::take(&mut template.source));
        }
        for vendor in &mut self.vendors {
            vendor.from = rebase(std::mem::take(&mut vendor.from));
        }
        if let Some(path) = self.tag.path.take() {
            self.tag.path = Some(rebase(path));
        }
        self
    }

    /// Directory entry sources resolve against.
    pub fn context_dir(&self) -> &Path {
        self.context.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Scope feeding the version tag.
    pub fn tag_scope(&self) -> TagScope {
        match self.tag.scope {
            ScopeKind::Repository => TagScope::Repository,
            ScopeKind::Workdir => TagScope::WorkDir(
                self.tag.path.clone().unwrap_or_else(|| self.context_dir().to_path_buf()),
            ),
        }
    }

    /// Compile the declared rules, preserving declaration order.
    pub fn rule_set(&self) -> Result<RuleSet> {
        let rules = self.rules.iter().map(RuleConfig::compile).collect::<Result<Vec<_>>>()?;
        Ok(RuleSet::new(rules))
    }

    /// The standard plugin chain for these declarations, in the fixed
    /// registration order: clean, symbol provision, stylesheet extraction,
    /// vendor copies, template rendering, manifest emission. The template
    /// plugin comes after extraction so it only ever observes final names.
    pub fn plugin_chain(&self) -> Result<PluginChain> {
        let mut chain = PluginChain::new();
        let mut clean = CleanPlugin::new();
        if let Some(template) = &self.template {
            clean = clean.with_extra_paths(vec![PathBuf::from(&template.output)]);
        }
        chain.add(clean);
        if !self.provide.is_empty() {
            chain.add(ProvidePlugin::new(self.provide.clone())?);
        }
        chain.add(CssExtractPlugin::new());
        if !self.vendors.is_empty() {
            chain.add(VendorCopyPlugin::new(self.vendors.clone()));
        }
        if let Some(template) = &self.template {
            chain.add(TemplatePlugin::new(&template.source, &template.output));
        }
        chain.add(ManifestEmitPlugin::new());
        Ok(chain)
    }

    /// Assemble the orchestrator for one invocation.
    pub fn orchestrator(
        &self,
        mode: BuildMode,
        tagger: Box<dyn VersionTagger>,
        bundler: Box<dyn Bundler>,
    ) -> Result<BuildOrchestrator> {
        if self.entries.is_empty() {
            return Err(Error::InvalidConfig("no entries declared".into()));
        }
        let externals: ExternalBindings =
            self.externals.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Ok(
            BuildOrchestrator::new(mode, self.layout.clone(), self.context_dir(), tagger, bundler)
                .with_entries(self.entries.clone())
                .with_rules(self.rule_set()?)
                .with_plugins(self.plugin_chain()?)
                .with_externals(externals)
                .with_host_globals(self.host_globals.clone()),
        )
    }
}
