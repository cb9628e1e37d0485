//! Forward plan: integer keys to UUID keys.

use leadflow_core::{KeyedTable, KEYED_TABLES};

use super::MigrationStep;

/// The nine forward steps, in execution order.
///
/// Order matters: foreign columns are backfilled while the integer keys
/// still join, integer foreign keys go before the primary keys they depend
/// on, and the integer columns are parked under `legacy_*` names before the
/// UUID columns take over `id` / `lead_id` / `task_id`.
pub fn forward_steps() -> Vec<MigrationStep> {
    vec![
        enable_uuid_extension(),
        add_uuid_primary_columns(),
        add_uuid_foreign_columns(),
        backfill_uuid_foreign_keys(),
        drop_integer_foreign_keys(),
        swap_primary_keys(),
        add_uuid_foreign_keys(),
        park_legacy_columns(),
        rename_uuid_columns(),
    ]
}

fn enable_uuid_extension() -> MigrationStep {
    MigrationStep::new(
        "enable_uuid_extension",
        vec![r#"CREATE EXTENSION IF NOT EXISTS "uuid-ossp""#.to_string()],
    )
}

fn add_uuid_primary_columns() -> MigrationStep {
    let statements = KEYED_TABLES
        .iter()
        .map(|t| {
            format!(
                "ALTER TABLE {} ADD COLUMN uuid_id UUID DEFAULT uuid_generate_v4()",
                t.name
            )
        })
        .collect();
    MigrationStep::new("add_uuid_primary_columns", statements)
}

fn add_uuid_foreign_columns() -> MigrationStep {
    let statements = KeyedTable::children()
        .map(|(t, p)| format!("ALTER TABLE {} ADD COLUMN {} UUID", t.name, p.uuid_column()))
        .collect();
    MigrationStep::new("add_uuid_foreign_columns", statements)
}

/// Rows whose integer reference is NULL are left with a NULL UUID reference.
fn backfill_uuid_foreign_keys() -> MigrationStep {
    let statements = KeyedTable::children()
        .map(|(t, p)| {
            format!(
                "UPDATE {child} SET {uuid_fk} = \
                 (SELECT uuid_id FROM {parent} WHERE {parent}.id = {child}.{fk}) \
                 WHERE {fk} IS NOT NULL",
                child = t.name,
                parent = p.parent_table,
                uuid_fk = p.uuid_column(),
                fk = p.fk_column,
            )
        })
        .collect();
    MigrationStep::new("backfill_uuid_foreign_keys", statements)
}

fn drop_integer_foreign_keys() -> MigrationStep {
    let statements = KeyedTable::children()
        .map(|(t, p)| {
            format!(
                "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
                t.name,
                p.legacy_constraint(t.name)
            )
        })
        .collect();
    MigrationStep::new("drop_integer_foreign_keys", statements)
}

fn swap_primary_keys() -> MigrationStep {
    let statements = KEYED_TABLES
        .iter()
        .flat_map(|t| {
            [
                format!("ALTER TABLE {} DROP CONSTRAINT {}", t.name, t.pkey_constraint()),
                format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY (uuid_id)",
                    t.name,
                    t.pkey_constraint()
                ),
            ]
        })
        .collect();
    MigrationStep::new("swap_primary_keys", statements)
}

fn add_uuid_foreign_keys() -> MigrationStep {
    let statements = KeyedTable::children()
        .map(|(t, p)| {
            format!(
                "ALTER TABLE {child} ADD CONSTRAINT {constraint} \
                 FOREIGN KEY ({uuid_fk}) REFERENCES {parent}(uuid_id){on_delete}",
                child = t.name,
                constraint = p.uuid_constraint(t.name),
                uuid_fk = p.uuid_column(),
                parent = p.parent_table,
                on_delete = p.on_delete.as_sql(),
            )
        })
        .collect();
    MigrationStep::new("add_uuid_foreign_keys", statements)
}

/// Moves the integer columns out of the way instead of dropping them, so the
/// migration stays reversible until an operator drops them explicitly.
/// NOT NULL is relaxed because rows written after the migration never set
/// the legacy references.
fn park_legacy_columns() -> MigrationStep {
    let mut statements = Vec::new();
    for t in KEYED_TABLES.iter() {
        statements.push(format!("ALTER TABLE {} RENAME COLUMN id TO legacy_id", t.name));
        statements.push(format!(
            "ALTER TABLE {} ALTER COLUMN legacy_id DROP NOT NULL",
            t.name
        ));
        if let Some(p) = &t.parent {
            statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                t.name,
                p.fk_column,
                p.legacy_column()
            ));
            statements.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL",
                t.name,
                p.legacy_column()
            ));
        }
    }
    MigrationStep::new("park_legacy_columns", statements)
}

/// Also tightens owned children to NOT NULL, matching a freshly bootstrapped
/// database. An orphan note, comment or attachment fails the step and with
/// it the whole migration.
fn rename_uuid_columns() -> MigrationStep {
    let mut statements = Vec::new();
    for t in KEYED_TABLES.iter() {
        statements.push(format!("ALTER TABLE {} RENAME COLUMN uuid_id TO id", t.name));
        if let Some(p) = &t.parent {
            statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                t.name,
                p.uuid_column(),
                p.fk_column
            ));
            if p.requires_parent() {
                statements.push(format!(
                    "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
                    t.name, p.fk_column
                ));
            }
        }
    }
    MigrationStep::new("rename_uuid_columns", statements)
}
