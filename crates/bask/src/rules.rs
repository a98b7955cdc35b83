//! File-type rules and their transform chains.
//!
//! Each rule claims one asset category via suffix patterns and carries the
//! ordered transform chain the bundling engine must apply to matched files.
//! Matching is a linear scan in declaration order, exclusion predicates
//! first, first accepting rule wins. No priorities, no merging of chains;
//! overlapping rules are reported as diagnostics and resolved by order.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mode::BuildMode;
use crate::{Error, Result};

/// Broad category a rule claims ownership of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Script,
    Stylesheet,
    Binary,
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetCategory::Script => write!(f, "script"),
            AssetCategory::Stylesheet => write!(f, "stylesheet"),
            AssetCategory::Binary => write!(f, "binary"),
        }
    }
}

/// A named, opaque content-rewriting step executed by the bundling engine.
///
/// Transforms are idempotent and composable from the orchestrator's point of
/// view; only their name and options travel through the build plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transform {
    pub name: String,
    /// Options handed to the transform in every mode.
    #[serde(default)]
    pub options: Value,
    /// Development-only overlay merged over `options`. Mode changes the
    /// parameters a transform sees, never whether it runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_options: Option<Value>,
}

impl Transform {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), options: Value::Null, dev_options: None }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    pub fn with_dev_options(mut self, dev_options: Value) -> Self {
        self.dev_options = Some(dev_options);
        self
    }

    /// Effective options for the given mode.
    pub fn options_for(&self, mode: BuildMode) -> Value {
        match (&self.dev_options, mode) {
            (Some(overlay), BuildMode::Development) => {
                let mut merged = self.options.clone();
                merge_values(&mut merged, overlay);
                merged
            }
            _ => self.options.clone(),
        }
    }
}

/// Deep-merge `overlay` into `base`. Objects merge key-wise, anything else
/// replaces.
fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}

/// One declared rule: suffix predicates, exclusions, transform chain.
#[derive(Debug, Clone)]
pub struct Rule {
    category: AssetCategory,
    test: Vec<Regex>,
    exclude: Vec<Regex>,
    transforms: Vec<Transform>,
}

impl Rule {
    /// Compile a rule from suffix/regex patterns. Patterns match
    /// case-insensitively against slash-separated relative paths.
    pub fn new(
        category: AssetCategory,
        test: &[&str],
        transforms: Vec<Transform>,
    ) -> Result<Self> {
        Ok(Self {
            category,
            test: compile_patterns(test)?,
            exclude: Vec::new(),
            transforms,
        })
    }

    /// Add exclusion patterns; an excluded path skips this rule entirely,
    /// regardless of the test patterns.
    pub fn exclude(mut self, patterns: &[&str]) -> Result<Self> {
        self.exclude = compile_patterns(patterns)?;
        Ok(self)
    }

    pub fn category(&self) -> AssetCategory {
        self.category
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    fn accepts(&self, path: &str) -> bool {
        if self.exclude.iter().any(|re| re.is_match(path)) {
            return false;
        }
        self.test.iter().any(|re| re.is_match(path))
    }
}

fn compile_patterns(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::InvalidConfig(format!("bad rule pattern '{p}': {e}")))
        })
        .collect()
}

/// Result of matching one path against the rule set.
#[derive(Debug)]
pub enum Match<'a> {
    /// First accepting rule in declaration order.
    Rule(&'a Rule),
    /// No rule claims the file; it passes through to the bundling engine's
    /// default handling unmodified.
    Unmatched,
}

/// Ordered set of rules; declaration order is the tie-break.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Match a path, first accepting rule wins.
    ///
    /// Version-query suffixes (`font.woff2?v=1.2.3`) are stripped before
    /// matching so suffix anchors behave.
    pub fn match_path(&self, path: &str) -> Match<'_> {
        let bare = strip_query(path);
        self.rules
            .iter()
            .find(|rule| rule.accepts(bare))
            .map_or(Match::Unmatched, Match::Rule)
    }

    /// All accepting rules with their declaration index, for conflict
    /// diagnostics. More than one entry means the declarations overlap and
    /// the first entry is the one `match_path` resolves to.
    pub fn matches_for(&self, path: &str) -> Vec<(usize, &Rule)> {
        let bare = strip_query(path);
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.accepts(bare))
            .collect()
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
