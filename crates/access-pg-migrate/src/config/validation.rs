//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};

const SSL_MODES: &[&str] = &["disable", "require", "verify-ca", "verify-full"];

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let pg = &config.postgres;
    if pg.host.trim().is_empty() {
        return Err(MigrateError::Config("postgres.host is required".into()));
    }
    if pg.database.trim().is_empty() {
        return Err(MigrateError::Config("postgres.database is required".into()));
    }
    if pg.user.trim().is_empty() {
        return Err(MigrateError::Config("postgres.user is required".into()));
    }
    if pg.schema.trim().is_empty() {
        return Err(MigrateError::Config("postgres.schema is required".into()));
    }
    if !SSL_MODES.contains(&pg.ssl_mode.to_lowercase().as_str()) {
        return Err(MigrateError::Config(format!(
            "postgres.ssl_mode must be one of {}, got '{}'",
            SSL_MODES.join(", "),
            pg.ssl_mode
        )));
    }
    if pg.max_connections == 0 {
        return Err(MigrateError::Config(
            "postgres.max_connections must be at least 1".into(),
        ));
    }

    if config.access.driver.trim().is_empty() {
        return Err(MigrateError::Config("access.driver is required".into()));
    }

    if config.migration.insert_batch_size == 0 {
        return Err(MigrateError::Config(
            "migration.insert_batch_size must be at least 1".into(),
        ));
    }
    if config.migration.string_length_threshold == 0 {
        return Err(MigrateError::Config(
            "migration.string_length_threshold must be at least 1".into(),
        ));
    }

    Ok(())
}
