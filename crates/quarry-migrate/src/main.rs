//! quarry-migrate CLI
//!
//! Plans and applies schema migrations described by JSON schema files.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use quarry_migrate::prelude::*;
use quarry_sql_core::dialect::Dialect;
use quarry_sql_core::Ex;
use quarry_sql_postgres::PostgresDialect;

/// Schema differ and migration planner.
#[derive(Parser)]
#[command(name = "quarry-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target database dialect.
    #[arg(short, long, env = "QUARRY_DIALECT", value_enum, default_value_t = DialectKind::Postgres)]
    dialect: DialectKind,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectKind {
    Postgres,
}

impl DialectKind {
    fn dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Postgres => Box::new(PostgresDialect::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the script migrating the observed schema to the desired one.
    Diff {
        /// Schema file declaring the desired tables.
        #[arg(long, env = "QUARRY_DESIRED")]
        desired: PathBuf,

        /// Schema file snapshotting the database (empty database if omitted).
        #[arg(long, env = "QUARRY_OBSERVED")]
        observed: Option<PathBuf>,

        /// Only plan this table.
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Print CREATE statements for every desired table.
    Create {
        /// Schema file declaring the desired tables.
        #[arg(long, env = "QUARRY_DESIRED")]
        desired: PathBuf,
    },

    /// List the tables, columns and keys of a schema file.
    Show {
        /// Schema file to list.
        #[arg(long, env = "QUARRY_DESIRED")]
        desired: PathBuf,
    },

    /// Apply the migration script to a database.
    Apply {
        /// Schema file declaring the desired tables.
        #[arg(long, env = "QUARRY_DESIRED")]
        desired: PathBuf,

        /// Schema file snapshotting the database (empty database if omitted).
        #[arg(long, env = "QUARRY_OBSERVED")]
        observed: Option<PathBuf>,

        /// Database connection string.
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },
}

fn plan(
    desired: &Path,
    observed: Option<&Path>,
    table: Option<&str>,
    dialect: &dyn Dialect,
) -> anyhow::Result<MigrationPlan> {
    let desired = SchemaFile::load(desired)?.to_database()?;
    let mut plan = match observed {
        Some(path) => {
            let observed = SchemaFile::load(path)?.to_database()?;
            migrate(&desired, &observed, dialect)?
        }
        None => migrate(&desired, &Empty, dialect)?,
    };

    if let Some(name) = table {
        if desired.table(name).is_none() {
            return Err(MigrateError::UnknownTable(name.to_string()).into());
        }
        plan.steps.retain(|step| step.table == name);
    }

    info!(
        tables = plan.steps.len(),
        statements = plan.statements().count(),
        "migration planned"
    );
    Ok(plan)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let dialect = cli.dialect.dialect();
    info!(driver = dialect.driver_name(), "using dialect");

    match cli.command {
        Commands::Diff {
            desired,
            observed,
            table,
        } => {
            let plan = plan(&desired, observed.as_deref(), table.as_deref(), dialect.as_ref())?;
            if plan.is_empty() {
                info!("Schema is up to date.");
            } else {
                print!("{plan}");
            }
        }

        Commands::Create { desired } => {
            for table in SchemaFile::load(&desired)?.to_tables()? {
                for statement in dialect.create_table_if_not_exists(&table) {
                    let (sql, _) = statement.build()?;
                    println!("{sql}");
                }
            }
        }

        Commands::Show { desired } => {
            let file = SchemaFile::load(&desired)?;
            for table in file.to_tables()? {
                println!("{}", table.name);
                println!("{:-<60}", "");
                for column in &table.columns {
                    let (data_type, _) = dialect.data_type(&column.column_type).build()?;
                    let marker = if column.is_deprecated() { " (deprecated)" } else { "" };
                    println!("  {} {data_type}{marker}", column.name);
                }
                for key in &table.keys {
                    let kind = if key.is_primary() {
                        "PRIMARY KEY"
                    } else if key.is_unique {
                        "UNIQUE"
                    } else {
                        "INDEX"
                    };
                    let (def, _) = key.def.table_expr(&table).build()?;
                    println!("  {kind} {} ({def})", key.name);
                }
                println!();
            }
        }

        Commands::Apply {
            desired,
            observed,
            database_url,
            dry_run,
        } => {
            let plan = plan(&desired, observed.as_deref(), None, dialect.as_ref())?;
            if plan.is_empty() {
                info!("Schema is up to date.");
                return Ok(());
            }

            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
                print!("{plan}");
                return Ok(());
            }

            let pool = quarry_sql_postgres::connect(&database_url)
                .await
                .map_err(MigrateError::Database)?;
            let statements: Vec<Ex> = plan.statements().cloned().collect();
            quarry_sql_postgres::execute_all(&pool, &statements)
                .await
                .map_err(MigrateError::Database)?;
            info!(statements = statements.len(), "migration applied");
        }
    }

    Ok(())
}
