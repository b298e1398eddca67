//! Error types for the fallible edges of the core: spawning and config loading.
//!
//! Per-tick conditions (missing target, stale projectile, damage on a dead
//! entity) are not errors: they are handled where detected and logged.

use std::path::PathBuf;
use thiserror::Error;

/// Blueprint rejected before the entity enters the simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpawnError {
    #[error("blueprint `{kind}` has no spawn position")]
    MissingSpawnPosition { kind: String },

    #[error("blueprint `{kind}` spawn position ({x}, {y}) is not finite")]
    NonFiniteSpawnPosition { kind: String, x: f32, y: f32 },

    #[error("blueprint `{kind}` has zero max health")]
    ZeroMaxHealth { kind: String },

    #[error("blueprint `{kind}`: `{name}` must be finite and non-negative, got {value}")]
    InvalidValue { kind: String, name: &'static str, value: f32 },

    #[error("blueprint `{kind}`: attack profile `{profile}` is invalid ({reason})")]
    InvalidProfile {
        kind: String,
        profile: String,
        reason: &'static str,
    },

    #[error("blueprint `{kind}` references unknown attack profile `{profile}`")]
    UnknownProfile { kind: String, profile: String },
}

/// Config file could not be read or parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}
