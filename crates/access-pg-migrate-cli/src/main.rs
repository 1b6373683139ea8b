//! access-pg-migrate CLI - move tables between Microsoft Access and PostgreSQL.

mod progress;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use access_pg_migrate::drivers::postgres::dialect_for;
use access_pg_migrate::{
    preview_ddl, AccessDialect, Config, DdlPreview, DialectImpl, MigrateError, MigrationResult,
    Orchestrator, PostgresConfig, PostgresSource, TableSource,
};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::progress::BarObserver;

/// Some tables failed while the rest were migrated.
const EXIT_TABLE_FAILURES: u8 = 3;

#[derive(Parser)]
#[command(name = "access-pg-migrate")]
#[command(about = "Move tables between Microsoft Access and PostgreSQL")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    /// Print the DDL instead of executing it
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy tables from Access database files into PostgreSQL
    ToPostgres {
        /// Access files, one table each
        #[arg(required = true)]
        access_files: Vec<String>,

        #[command(flatten)]
        pg: PgArgs,
    },

    /// Export PostgreSQL tables into Access database files
    ToAccess {
        /// PostgreSQL tables to export
        #[arg(required = true)]
        tables: Vec<String>,

        #[command(flatten)]
        pg: PgArgs,

        /// Directory for the exported files [default: .]
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Empty .accdb or .mdb file copied for each table
        #[arg(long)]
        template: Option<PathBuf>,
    },
}

/// PostgreSQL connection overrides.
#[derive(Args)]
struct PgArgs {
    /// PostgreSQL host [default: localhost]
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Database name [default: postgres]
    #[arg(short, long)]
    database: Option<String>,

    /// User name [default: postgres]
    #[arg(short, long)]
    username: Option<String>,

    /// Password [default: postgres]
    #[arg(short, long)]
    password: Option<String>,

    /// Port [default: 5432]
    #[arg(long)]
    port: Option<u16>,

    /// Schema holding the tables [default: public]
    #[arg(long)]
    schema: Option<String>,
}

impl PgArgs {
    fn apply(self, config: &mut PostgresConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(database) = self.database {
            config.database = database;
        }
        if let Some(user) = self.username {
            config.user = user;
        }
        if let Some(password) = self.password {
            config.password = password;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(schema) = self.schema {
            config.schema = schema;
        }
    }
}

enum Outcome {
    Migrated(MigrationResult),
    Previewed(Vec<DdlPreview>),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, MigrateError> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, &cli.log_format)?;

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    let show_progress = !cli.no_progress && !cli.output_json;

    let outcome = match cli.command {
        Commands::ToPostgres { access_files, pg } => {
            pg.apply(&mut config.postgres);
            config.validate()?;
            to_postgres(&config, &access_files, cli.dry_run, show_progress).await?
        }
        Commands::ToAccess {
            tables,
            pg,
            output_dir,
            template,
        } => {
            pg.apply(&mut config.postgres);
            if let Some(dir) = output_dir {
                config.access.output_dir = dir;
            }
            if let Some(path) = template {
                set_template(&mut config, path);
            }
            config.validate()?;
            to_access(&config, &tables, cli.dry_run, show_progress).await?
        }
    };

    match outcome {
        Outcome::Previewed(previews) => {
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&previews)?);
            } else {
                for preview in &previews {
                    println!("-- {} ({})\n{}\n", preview.table, preview.identifier, preview.ddl);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Migrated(result) => {
            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                print_summary(&result);
            }
            if result.has_failures() {
                Ok(ExitCode::from(EXIT_TABLE_FAILURES))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn to_postgres(
    config: &Config,
    files: &[String],
    dry_run: bool,
    show_progress: bool,
) -> Result<Outcome, MigrateError> {
    let source = access_source(config)?;

    if dry_run {
        let dialect = preview_dialect(config, Target::Postgres);
        let previews = preview_ddl(source.as_ref(), &dialect, files).await?;
        return Ok(Outcome::Previewed(previews));
    }

    info!("Connecting to {}", config.postgres.display_target());
    let connector =
        access_pg_migrate::PostgresConnector::new(&config.postgres, &config.migration).await?;
    let orchestrator = with_progress(
        Orchestrator::new(source, Box::new(connector), &config.migration),
        show_progress,
    );
    Ok(Outcome::Migrated(orchestrator.run(files).await?))
}

async fn to_access(
    config: &Config,
    tables: &[String],
    dry_run: bool,
    show_progress: bool,
) -> Result<Outcome, MigrateError> {
    info!("Connecting to {}", config.postgres.display_target());
    let source = PostgresSource::new(&config.postgres).await?;

    if dry_run {
        let dialect = preview_dialect(config, Target::Access);
        let previews = preview_ddl(&source, &dialect, tables).await?;
        return Ok(Outcome::Previewed(previews));
    }

    let connector = access_connector(config)?;
    let orchestrator = with_progress(
        Orchestrator::new(Box::new(source), connector, &config.migration),
        show_progress,
    );
    Ok(Outcome::Migrated(orchestrator.run(tables).await?))
}

#[derive(Clone, Copy)]
enum Target {
    Postgres,
    Access,
}

/// Dialect used to render DDL for a dry run, without opening the sink.
fn preview_dialect(config: &Config, target: Target) -> DialectImpl {
    match target {
        Target::Postgres => DialectImpl::Postgres(dialect_for(&config.postgres, &config.migration)),
        Target::Access => DialectImpl::Access(AccessDialect::new()),
    }
}

fn with_progress(orchestrator: Orchestrator, show_progress: bool) -> Orchestrator {
    if show_progress {
        orchestrator.with_observer(Arc::new(BarObserver::default()))
    } else {
        orchestrator
    }
}

fn set_template(config: &mut Config, path: PathBuf) {
    let is_mdb = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mdb"));
    if is_mdb {
        config.access.template_accdb = None;
        config.access.template_mdb = Some(path);
    } else {
        config.access.template_accdb = Some(path);
    }
}

#[cfg(feature = "access")]
fn access_source(config: &Config) -> Result<Box<dyn TableSource>, MigrateError> {
    Ok(Box::new(access_pg_migrate::AccessSource::new(&config.access)?))
}

#[cfg(not(feature = "access"))]
fn access_source(_config: &Config) -> Result<Box<dyn TableSource>, MigrateError> {
    Err(access_unavailable())
}

#[cfg(feature = "access")]
fn access_connector(
    config: &Config,
) -> Result<Box<dyn access_pg_migrate::SinkConnector>, MigrateError> {
    Ok(Box::new(access_pg_migrate::AccessConnector::new(&config.access)?))
}

#[cfg(not(feature = "access"))]
fn access_connector(
    _config: &Config,
) -> Result<Box<dyn access_pg_migrate::SinkConnector>, MigrateError> {
    Err(access_unavailable())
}

#[cfg(not(feature = "access"))]
fn access_unavailable() -> MigrateError {
    MigrateError::Config(
        "Access support is not compiled in; rebuild with --features access".to_string(),
    )
}

fn print_summary(result: &MigrationResult) {
    let status_msg = if result.has_failures() {
        "Migration completed with errors"
    } else {
        "Migration completed!"
    };
    println!("\n{}", status_msg);
    println!("  Run ID: {}", result.run_id);
    println!("  Duration: {:.2}s", result.duration_seconds);
    println!("  Tables: {}/{}", result.tables_success, result.tables_total);
    for stats in &result.tables {
        println!("    {}: {}", stats.table, stats.summary());
    }
    println!("  Rows: {}", result.rows_transferred);
    println!("  Throughput: {} rows/sec", result.rows_per_second);
    for failure in &result.failed_tables {
        println!("  Failed: {}: {}", failure.identifier, failure.error);
    }
}

fn setup_logging(verbose: bool, format: &str) -> Result<(), MigrateError> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => {
            return Err(MigrateError::Config(format!(
                "unknown log format '{}' (expected text or json)",
                other
            )))
        }
    }

    Ok(())
}
