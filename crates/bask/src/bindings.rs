//! External runtime bindings.
//!
//! Module keys listed here are never embedded in a bundle; the bundling
//! engine emits a load-time reference to the named host global instead.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered table of module key → runtime global symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalBindings {
    map: IndexMap<String, String>,
}

impl ExternalBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: impl Into<String>, global: impl Into<String>) {
        self.map.insert(module.into(), global.into());
    }

    /// Global symbol the module resolves to at load time, if declared
    /// external.
    pub fn resolve(&self, module: &str) -> Option<&str> {
        self.map.get(module).map(String::as_str)
    }

    pub fn is_external(&self, module: &str) -> bool {
        self.map.contains_key(module)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bindings whose global is not among the declared host-provided
    /// globals. Best-effort: with no declared globals nothing can be
    /// checked and the result is empty.
    pub fn unresolved<'a>(
        &'a self,
        host_globals: &'a [String],
    ) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.iter().filter(move |(_, global)| {
            !host_globals.is_empty() && !host_globals.iter().any(|g| g == global)
        })
    }
}

impl FromIterator<(String, String)> for ExternalBindings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { map: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ExternalBindings {
        let mut bindings = ExternalBindings::new();
        bindings.insert("jquery", "jQuery");
        bindings.insert("bootstrap", "bootstrap");
        bindings
    }

    #[test]
    fn resolves_declared_modules() {
        let bindings = table();
        assert_eq!(bindings.resolve("jquery"), Some("jQuery"));
        assert!(bindings.is_external("bootstrap"));
        assert_eq!(bindings.resolve("react"), None);
    }

    #[test]
    fn preserves_declaration_order() {
        let bindings = table();
        let keys: Vec<_> = bindings.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["jquery", "bootstrap"]);
    }

    #[test]
    fn unresolved_is_empty_without_host_globals() {
        let bindings = table();
        assert_eq!(bindings.unresolved(&[]).count(), 0);
    }

    #[test]
    fn unresolved_flags_missing_globals() {
        let bindings = table();
        let host = vec!["jQuery".to_string()];
        let missing: Vec<_> = bindings.unresolved(&host).collect();
        assert_eq!(missing, [("bootstrap", "bootstrap")]);
    }
}
