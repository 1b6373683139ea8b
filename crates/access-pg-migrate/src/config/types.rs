//! Configuration type definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// PostgreSQL server (target of `to-postgres`, source of `to-access`).
    #[serde(default)]
    pub postgres: PostgresConfig,

    /// Access database files and ODBC settings.
    #[serde(default)]
    pub access: AccessConfig,

    /// Migration behavior.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// PostgreSQL connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// Database host (default: "localhost").
    #[serde(default = "default_localhost")]
    pub host: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    /// Database name (default: "postgres").
    #[serde(default = "default_postgres")]
    pub database: String,

    /// Username (default: "postgres").
    #[serde(default = "default_postgres")]
    pub user: String,

    /// Password. Never serialized.
    #[serde(default = "default_postgres", skip_serializing)]
    pub password: String,

    /// Schema tables are created in or read from (default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,

    /// Owner assigned to created tables. Defaults to `user`.
    #[serde(default)]
    pub owner: Option<String>,

    /// SSL mode: disable, require, verify-ca, verify-full (default: "disable").
    #[serde(default = "default_disable")]
    pub ssl_mode: String,

    /// Pool size (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("schema", &self.schema)
            .field("owner", &self.owner)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: default_localhost(),
            port: default_pg_port(),
            database: default_postgres(),
            user: default_postgres(),
            password: default_postgres(),
            schema: default_public_schema(),
            owner: None,
            ssl_mode: default_disable(),
            max_connections: default_max_connections(),
        }
    }
}

impl PostgresConfig {
    /// Owner for created tables.
    pub fn effective_owner(&self) -> &str {
        self.owner.as_deref().unwrap_or(&self.user)
    }
}

/// Access (ODBC) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// ODBC driver name.
    #[serde(default = "default_access_driver")]
    pub driver: String,

    /// Directory that receives `<table>.accdb` files (default: ".").
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Empty `.accdb` database copied for every exported table.
    #[serde(default)]
    pub template_accdb: Option<PathBuf>,

    /// Empty `.mdb` database, used when no `.accdb` template is set.
    #[serde(default)]
    pub template_mdb: Option<PathBuf>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            driver: default_access_driver(),
            output_dir: default_output_dir(),
            template_accdb: None,
            template_mdb: None,
        }
    }
}

impl AccessConfig {
    /// Template file to copy for a new table, preferring `.accdb`.
    pub fn template(&self) -> Option<&PathBuf> {
        self.template_accdb.as_ref().or(self.template_mdb.as_ref())
    }
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Observed length above which unbounded strings become `TEXT` (default: 255).
    #[serde(default = "default_string_threshold")]
    pub string_length_threshold: usize,

    /// Rows per multi-row INSERT on PostgreSQL (default: 500).
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,

    /// Report one more row than was processed, matching older tooling output.
    #[serde(default)]
    pub legacy_row_count: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            string_length_threshold: default_string_threshold(),
            insert_batch_size: default_insert_batch_size(),
            legacy_row_count: false,
        }
    }
}

fn default_localhost() -> String {
    "localhost".to_string()
}

fn default_postgres() -> String {
    "postgres".to_string()
}

fn default_pg_port() -> u16 {
    5432
}

fn default_public_schema() -> String {
    "public".to_string()
}

fn default_disable() -> String {
    "disable".to_string()
}

fn default_max_connections() -> usize {
    4
}

fn default_access_driver() -> String {
    "Microsoft Access Driver (*.mdb, *.accdb)".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_string_threshold() -> usize {
    255
}

fn default_insert_batch_size() -> usize {
    500
}
