//! Build mode selection.
//!
//! The mode is global to one build invocation. It parameterizes naming and
//! the options handed to transforms; it never changes which rules, transforms
//! or plugins are registered.

use serde::{Deserialize, Serialize};

/// Environment variable consulted by [`BuildMode::from_env`].
pub const MODE_ENV_VAR: &str = "BASK_MODE";

/// Build mode for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Stable stylesheet names, debug-friendly transform options.
    #[default]
    Development,
    /// Content-hashed stylesheet names, production transform options.
    Production,
}

impl BuildMode {
    /// Read the mode from `BASK_MODE`.
    ///
    /// Anything other than a production-like value selects development, so an
    /// unset environment yields a development build.
    pub fn from_env() -> Self {
        match std::env::var(MODE_ENV_VAR) {
            Ok(value) => value.parse().unwrap_or(BuildMode::Development),
            Err(_) => BuildMode::Development,
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, BuildMode::Development)
    }

    pub fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }
}

impl std::str::FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(BuildMode::Development),
            "production" | "prod" => Ok(BuildMode::Production),
            other => Err(format!("invalid build mode: {other}")),
        }
    }
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildMode::Development => write!(f, "development"),
            BuildMode::Production => write!(f, "production"),
        }
    }
}
