use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use tracing::warn;

use crate::parser::tree::DEFAULT_MAX_NODES;

pub const ENV_PREFIX: &str = "EDGAR";

/// Runtime knobs, read from `EDGAR_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Traversal bound on parsed tree nodes per document.
    pub max_nodes: usize,
    /// Files parsed per parallel batch.
    pub chunk_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_nodes: DEFAULT_MAX_NODES,
            chunk_size: 500,
        }
    }
}

impl Settings {
    /// Load from the process environment, falling back to defaults when a
    /// value does not parse.
    pub fn load() -> Self {
        match Self::from_env(Environment::with_prefix(ENV_PREFIX)) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                warn!(error = %e, "invalid {}_* settings; using defaults", ENV_PREFIX);
                Self::default()
            }
        }
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    // Zero would stall the batch loop or index nothing.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.max_nodes == 0 {
            self.max_nodes = defaults.max_nodes;
        }
        if self.chunk_size == 0 {
            self.chunk_size = defaults.chunk_size;
        }
        self
    }
}

// ── Tests ──
