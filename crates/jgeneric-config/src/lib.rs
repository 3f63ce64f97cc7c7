//! Configuration for jgeneric: logging, resolver limits and the optional resolution cache.
//!
//! ```toml
//! [logging]
//! level = "jgeneric.resolve=trace,info"
//! json = false
//!
//! [resolver]
//! max_depth = 64
//!
//! [cache]
//! enabled = true
//! capacity = 4096
//! ```

use std::path::Path;
use std::sync::Once;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;

/// Tracing target used by this crate.
pub const CONFIG_TARGET: &str = "jgeneric.config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a source snippet; keep only the message.
        ConfigError::Toml(err.message().trim().to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JgenericConfig {
    /// Global logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Limits applied while resolving generic types.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Memoization of resolution results.
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled, events are filtered but discarded.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// `EnvFilter` directives for `level`, with `rust_log` appended so it overrides per target.
    ///
    /// A bare level is accepted in any case (and `warning` for `warn`); anything else is passed
    /// through as a directive string.
    pub fn filter_directives(&self, rust_log: Option<&str>) -> String {
        let level = self.level.trim();
        let mut directives = match level.to_ascii_lowercase().as_str() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            lowered => match lowered.parse::<tracing::Level>() {
                Ok(parsed) => parsed.to_string().to_ascii_lowercase(),
                Err(_) => level.to_owned(),
            },
        };
        if let Some(extra) = rust_log.map(str::trim).filter(|extra| !extra.is_empty()) {
            directives.push(',');
            directives.push_str(extra);
        }
        directives
    }

    /// The effective filter: `level`, merged with `RUST_LOG` when that is set. Falls back to
    /// `info` when the merged directives do not parse.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let rust_log = std::env::var("RUST_LOG").ok();
        let directives = self.filter_directives(rust_log.as_deref());
        tracing_subscriber::EnvFilter::try_new(directives)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(Self::default_level()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Maximum number of ancestors visited while searching for a type variable's binding.
    ///
    /// Reaching the limit ends the search as if the hierarchy were exhausted, so the variable
    /// falls back to its declared bounds.
    #[serde(default = "ResolverConfig::default_max_depth")]
    #[schemars(range(min = 1))]
    pub max_depth: usize,
}

impl ResolverConfig {
    fn default_max_depth() -> usize {
        64
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Memoize results keyed on `(declared type, owner, context)`.
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of cached results. The cache is cleared when it fills up.
    #[serde(default = "CacheConfig::default_capacity")]
    #[schemars(range(min = 1))]
    pub capacity: usize,
}

impl CacheConfig {
    fn default_capacity() -> usize {
        4_096
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: Self::default_capacity(),
        }
    }
}

impl JgenericConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    /// Load a config from a TOML string.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: JgenericConfig = toml::from_str(text)?;
        config.normalize();
        Ok(config)
    }

    /// Replace values that are syntactically valid but unusable.
    fn normalize(&mut self) {
        if self.resolver.max_depth == 0 {
            tracing::warn!(
                target: CONFIG_TARGET,
                default = ResolverConfig::default_max_depth(),
                "ignoring resolver.max_depth = 0 (must be >= 1)"
            );
            self.resolver.max_depth = ResolverConfig::default_max_depth();
        }
        if self.cache.capacity == 0 {
            if self.cache.enabled {
                tracing::warn!(
                    target: CONFIG_TARGET,
                    "cache.capacity = 0 disables the resolution cache"
                );
            }
            self.cache.enabled = false;
            self.cache.capacity = CacheConfig::default_capacity();
        }
    }
}

/// JSON schema describing the config file.
pub fn json_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(JgenericConfig);
    serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
}

static TRACING_INIT: Once = Once::new();

/// Installs a global `tracing` subscriber configured from `config`.
///
/// Safe to call multiple times; only the first call has an effect. Returns whether this call
/// installed the subscriber.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let mut installed = false;
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let writer = if config.stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::sink)
        };

        let result = if config.json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(writer))
                .try_init()
        };
        installed = result.is_ok();
    });
    installed
}
