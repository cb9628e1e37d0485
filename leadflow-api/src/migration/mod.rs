//! Key Migration
//!
//! Converts the seven keyed tables from integer to UUID primary keys, and
//! back again while the parked integer columns still exist.
//!
//! A migration is a [`MigrationPlan`]: an ordered list of named
//! [`MigrationStep`]s generated from [`leadflow_core::KEYED_TABLES`]. The
//! [`Migrator`] runs a plan inside a single transaction. Either every step
//! commits or none does; a failing step is logged with its name and the
//! transaction is rolled back before the error is returned.

mod plan;
mod rollback;

pub use plan::forward_steps;
pub use rollback::{drop_legacy_steps, rollback_steps};

use std::fmt;

use deadpool_postgres::{GenericClient, Pool};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::schema::{column_type, detect_key_shape, KeyShape};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum MigrationError {
    /// A step failed; the whole transaction was rolled back.
    #[error("migration step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("key migration already applied (leads.id is {found})")]
    AlreadyApplied { found: String },

    #[error("key migration has not been applied")]
    NotApplied,

    #[error("legacy key columns have been dropped; the key migration can no longer be reversed")]
    LegacyColumnsDropped,

    #[error("table leads not found in the current schema")]
    MissingSchema,

    #[error("failed to acquire database connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
}

pub type MigrationResult<T> = Result<T, MigrationError>;

// ============================================================================
// STEPS AND PLANS
// ============================================================================

/// One named unit of a migration: a list of SQL statements run in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    pub name: &'static str,
    pub statements: Vec<String>,
}

impl MigrationStep {
    pub fn new(name: &'static str, statements: Vec<String>) -> Self {
        Self { name, statements }
    }

    /// Execute every statement of this step on `client`.
    pub async fn apply<C>(&self, client: &C) -> Result<(), tokio_postgres::Error>
    where
        C: GenericClient + Sync,
    {
        for statement in &self.statements {
            client.batch_execute(statement).await?;
        }
        Ok(())
    }
}

/// What a plan does; decides the precondition checked before its first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// Integer keys to UUID keys.
    Forward,
    /// UUID keys back to integer keys.
    Rollback,
    /// Drop the parked integer columns, making the migration permanent.
    DropLegacy,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Forward => "migrate",
            PlanKind::Rollback => "rollback",
            PlanKind::DropLegacy => "drop-legacy",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub kind: PlanKind,
    pub steps: Vec<MigrationStep>,
}

impl MigrationPlan {
    pub fn forward() -> Self {
        Self {
            kind: PlanKind::Forward,
            steps: forward_steps(),
        }
    }

    pub fn rollback() -> Self {
        Self {
            kind: PlanKind::Rollback,
            steps: rollback_steps(),
        }
    }

    pub fn drop_legacy() -> Self {
        Self {
            kind: PlanKind::DropLegacy,
            steps: drop_legacy_steps(),
        }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }
}

/// Renders the plan as an annotated SQL script.
impl fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-- plan: {}", self.kind)?;
        for (index, step) in self.steps.iter().enumerate() {
            writeln!(f, "\n-- {}. {}", index + 1, step.name)?;
            for statement in &step.statements {
                writeln!(f, "{};", statement.trim_end_matches(';'))?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// RUNNER
// ============================================================================

/// Runs migration plans against a pool.
///
/// Assumes it is the only writer of the schema while a plan runs.
#[derive(Clone)]
pub struct Migrator {
    pool: Pool,
}

impl Migrator {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Convert integer keys to UUID keys.
    pub async fn migrate(&self) -> MigrationResult<()> {
        self.run_plan(&MigrationPlan::forward()).await
    }

    /// Restore integer keys. Only possible while the legacy columns exist.
    pub async fn rollback(&self) -> MigrationResult<()> {
        self.run_plan(&MigrationPlan::rollback()).await
    }

    /// Drop the parked integer columns.
    pub async fn drop_legacy_columns(&self) -> MigrationResult<()> {
        self.run_plan(&MigrationPlan::drop_legacy()).await
    }

    /// Run `plan` in one transaction.
    pub async fn run_plan(&self, plan: &MigrationPlan) -> MigrationResult<()> {
        let mut conn = self.pool.get().await?;
        let tx = conn.transaction().await?;

        info!(plan = %plan.kind, steps = plan.steps.len(), "Starting key migration");

        // Returning early drops `tx`, which rolls it back.
        check_precondition(&tx, plan.kind).await?;

        for step in &plan.steps {
            info!(plan = %plan.kind, step = step.name, "Applying step");
            if let Err(source) = step.apply(&tx).await {
                error!(
                    plan = %plan.kind,
                    step = step.name,
                    error = %source,
                    "Migration step failed, rolling back"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Explicit rollback failed");
                }
                return Err(MigrationError::Step {
                    step: step.name,
                    source,
                });
            }
        }

        tx.commit().await.map_err(|source| {
            error!(plan = %plan.kind, error = %source, "Commit failed");
            MigrationError::Step {
                step: "commit",
                source,
            }
        })?;

        info!(plan = %plan.kind, "Key migration finished");
        Ok(())
    }
}

async fn check_precondition<C>(client: &C, kind: PlanKind) -> MigrationResult<()>
where
    C: GenericClient + Sync,
{
    let shape = detect_key_shape(client).await?;
    match (kind, shape) {
        (_, KeyShape::Missing) => Err(MigrationError::MissingSchema),
        (PlanKind::Forward, KeyShape::Integer) => Ok(()),
        (PlanKind::Forward, _) => Err(MigrationError::AlreadyApplied {
            found: column_type(client, "leads", "id")
                .await?
                .unwrap_or_default(),
        }),
        (PlanKind::Rollback, KeyShape::Uuid) => {
            if column_type(client, "leads", "legacy_id").await?.is_some() {
                Ok(())
            } else {
                Err(MigrationError::LegacyColumnsDropped)
            }
        }
        (PlanKind::DropLegacy, KeyShape::Uuid) => Ok(()),
        (PlanKind::Rollback | PlanKind::DropLegacy, _) => Err(MigrationError::NotApplied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_plan_step_order() {
        assert_eq!(
            MigrationPlan::forward().step_names(),
            vec![
                "enable_uuid_extension",
                "add_uuid_primary_columns",
                "add_uuid_foreign_columns",
                "backfill_uuid_foreign_keys",
                "drop_integer_foreign_keys",
                "swap_primary_keys",
                "add_uuid_foreign_keys",
                "park_legacy_columns",
                "rename_uuid_columns",
            ]
        );
    }

    #[test]
    fn test_plan_renders_as_sql_script() {
        let script = MigrationPlan::forward().to_string();
        assert!(script.starts_with("-- plan: migrate"));
        assert!(script.contains("-- 1. enable_uuid_extension"));
        assert!(script.contains("CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\";"));
        assert!(!script.contains(";;"));
    }

    #[test]
    fn test_precondition_error_messages() {
        let err = MigrationError::AlreadyApplied {
            found: "uuid".to_string(),
        };
        assert_eq!(err.to_string(), "key migration already applied (leads.id is uuid)");
        assert!(MigrationError::LegacyColumnsDropped
            .to_string()
            .contains("can no longer be reversed"));
    }
}
