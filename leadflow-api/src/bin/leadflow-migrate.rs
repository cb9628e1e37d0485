//! Key Migration CLI
//!
//! Converts a LeadFlow database from integer to UUID keys and back.
//! Connection settings come from the same environment variables as the
//! server (`DATABASE_URL` or `LEADFLOW_DB_*`).
//!
//! Usage:
//!   leadflow-migrate status
//!   leadflow-migrate plan [--rollback | --drop-legacy]
//!   leadflow-migrate migrate
//!   leadflow-migrate rollback --yes
//!   leadflow-migrate drop-legacy --yes

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use leadflow_api::schema::detect_key_shape;
use leadflow_api::telemetry::{init_tracing, LogFormat, TelemetryConfig};
use leadflow_api::{DbConfig, KeyShape, MigrationError, MigrationPlan, Migrator};

#[derive(Parser, Debug)]
#[command(name = "leadflow-migrate")]
#[command(version, about = "Integer to UUID key migration for LeadFlow", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which key type the database currently uses
    Status,

    /// Print the SQL a command would run, without connecting
    Plan {
        /// Show the rollback plan
        #[arg(long, conflicts_with = "drop_legacy")]
        rollback: bool,

        /// Show the plan that drops the parked integer columns
        #[arg(long)]
        drop_legacy: bool,
    },

    /// Convert integer keys to UUID keys in one transaction
    Migrate,

    /// Restore integer keys (only while the legacy columns exist)
    Rollback {
        /// Confirm the rollback
        #[arg(long)]
        yes: bool,
    },

    /// Drop the parked integer columns; the migration can no longer be reversed
    DropLegacy {
        /// Confirm dropping the legacy columns
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Commands::Plan {
        rollback,
        drop_legacy,
    } = cli.command
    {
        let plan = if rollback {
            MigrationPlan::rollback()
        } else if drop_legacy {
            MigrationPlan::drop_legacy()
        } else {
            MigrationPlan::forward()
        };
        print!("{}", plan);
        return ExitCode::SUCCESS;
    }

    let mut telemetry_config = TelemetryConfig {
        service_name: "leadflow-migrate".to_string(),
        ..TelemetryConfig::default()
    };
    if std::env::var_os("LEADFLOW_LOG_FORMAT").is_none() {
        telemetry_config.log_format = LogFormat::Pretty;
    }
    if let Err(e) = init_tracing(&telemetry_config) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Key migration command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), CliError> {
    let pool = DbConfig::from_env().create_pool()?;
    let migrator = Migrator::new(pool.clone());

    match command {
        Commands::Status => {
            let conn = pool.get().await.map_err(MigrationError::from)?;
            let shape = detect_key_shape(&conn)
                .await
                .map_err(MigrationError::from)?;
            println!("{}", describe(shape));
        }
        Commands::Plan { .. } => {}
        Commands::Migrate => {
            migrator.migrate().await?;
            println!("Key migration applied.");
        }
        Commands::Rollback { yes } => {
            require_confirmation(yes, "rollback")?;
            migrator.rollback().await?;
            println!("Integer keys restored.");
        }
        Commands::DropLegacy { yes } => {
            require_confirmation(yes, "drop-legacy")?;
            migrator.drop_legacy_columns().await?;
            println!("Legacy key columns dropped.");
        }
    }

    Ok(())
}

fn describe(shape: KeyShape) -> &'static str {
    match shape {
        KeyShape::Missing => "no leadflow tables found",
        KeyShape::Integer => "integer keys (migration pending)",
        KeyShape::Uuid => "uuid keys (migration applied)",
        KeyShape::Unknown => "unrecognized key type on leads.id",
    }
}

fn require_confirmation(confirmed: bool, command: &str) -> Result<(), CliError> {
    if confirmed {
        Ok(())
    } else {
        Err(CliError::NotConfirmed(command.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("refusing to run '{0}' without --yes")]
    NotConfirmed(String),

    #[error(transparent)]
    Config(#[from] leadflow_api::ApiError),

    #[error(transparent)]
    Migration(#[from] MigrationError),
}
