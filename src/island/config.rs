//! Island layer configuration.

use crate::error::ConfigError;

/// Configuration for an [`Archipelago`](super::Archipelago).
///
/// # Defaults
///
/// ```
/// use u_evolve::island::IslandConfig;
///
/// let config = IslandConfig::default();
/// assert_eq!(config.migration_interval, 10);
///
/// let config = IslandConfig::default().with_migration_interval(25);
/// assert_eq!(config.migration_interval, 25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IslandConfig {
    /// Number of island steps between two migrations.
    ///
    /// Every step advances one island by one generation, so with `n` islands
    /// an interval of `n` migrates once per round.
    pub migration_interval: usize,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            migration_interval: 10,
        }
    }
}

impl IslandConfig {
    /// Sets the migration interval.
    pub fn with_migration_interval(mut self, steps: usize) -> Self {
        self.migration_interval = steps;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.migration_interval == 0 {
            return Err(ConfigError::MigrationInterval);
        }
        Ok(())
    }
}
