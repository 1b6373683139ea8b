//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl PostgresConfig {
    /// Build a libpq-style connection string. The password is omitted.
    pub fn display_target(&self) -> String {
        format!(
            "host={} port={} dbname={} user={} sslmode={}",
            self.host, self.port, self.database, self.user, self.ssl_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.postgres.host, "localhost");
        assert_eq!(config.postgres.port, 5432);
        assert_eq!(config.postgres.database, "postgres");
        assert_eq!(config.postgres.schema, "public");
        assert_eq!(config.postgres.effective_owner(), "postgres");
        assert_eq!(config.migration.string_length_threshold, 255);
        assert_eq!(config.migration.insert_batch_size, 500);
        assert!(!config.migration.legacy_row_count);
        assert_eq!(config.access.output_dir, std::path::PathBuf::from("."));
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
postgres:
  host: db.internal
  user: etl
  password: hunter2
  owner: reporting
migration:
  insert_batch_size: 50
  legacy_row_count: true
access:
  output_dir: /tmp/out
  template_accdb: /opt/empty.accdb
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.postgres.host, "db.internal");
        assert_eq!(config.postgres.effective_owner(), "reporting");
        assert_eq!(config.migration.insert_batch_size, 50);
        assert!(config.migration.legacy_row_count);
        assert_eq!(
            config.access.template().unwrap(),
            &std::path::PathBuf::from("/opt/empty.accdb")
        );
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let err = Config::from_yaml("postgres:\n  ssl_mode: sometimes\n").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_password_not_serialized() {
        let mut config = Config::default();
        config.postgres.password = "topsecret".into();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("topsecret"));
        assert!(!config.postgres.display_target().contains("topsecret"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "postgres:\n  database: warehouse").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.postgres.database, "warehouse");
    }
}
