//! Error types.

/// Invalid engine or island configuration.
///
/// Raised by the `validate` methods and by the constructors that call them,
/// always before any generation is executed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("crossover_probability must be within [0, 1], got {0}")]
    CrossoverProbability(f64),
    #[error("migration_interval must be at least 1")]
    MigrationInterval,
    #[error("an archipelago needs at least one island")]
    NoIslands,
}

/// Errors surfaced by engines and archipelagos.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvolveError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("population is empty")]
    EmptyPopulation,
}
