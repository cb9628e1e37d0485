//! Reverse plans: back to integer keys, or make the UUID keys permanent.

use leadflow_core::{KeyedTable, KEYED_TABLES};

use super::MigrationStep;
use crate::schema::SUPPLEMENTARY_COLUMNS;

/// Steps that restore the integer layout from a migrated database whose
/// legacy columns are still parked.
///
/// Rows created after the migration got a `legacy_id` from the original
/// sequence but no legacy references; those are recomputed from the UUID
/// references first. Columns that only exist in the UUID layout are lost.
pub fn rollback_steps() -> Vec<MigrationStep> {
    vec![
        drop_supplementary_columns(),
        backfill_legacy_keys(),
        drop_uuid_foreign_keys(),
        drop_uuid_primary_keys(),
        restore_legacy_columns(),
        restore_integer_keys(),
        drop_uuid_columns(),
    ]
}

/// The deferred column drop. Afterwards the migration cannot be reversed.
pub fn drop_legacy_steps() -> Vec<MigrationStep> {
    let mut statements = Vec::new();
    for t in KEYED_TABLES.iter().rev() {
        if let Some(p) = &t.parent {
            statements.push(format!(
                "ALTER TABLE {} DROP COLUMN IF EXISTS {}",
                t.name,
                p.legacy_column()
            ));
        }
        statements.push(format!("ALTER TABLE {} DROP COLUMN IF EXISTS legacy_id", t.name));
    }
    vec![MigrationStep::new("drop_legacy_columns", statements)]
}

fn drop_supplementary_columns() -> MigrationStep {
    let statements = SUPPLEMENTARY_COLUMNS
        .iter()
        .map(|(table, column)| format!("ALTER TABLE {} DROP COLUMN IF EXISTS {}", table, column))
        .collect();
    MigrationStep::new("drop_supplementary_columns", statements)
}

fn backfill_legacy_keys() -> MigrationStep {
    let mut statements = Vec::new();
    for t in KEYED_TABLES.iter() {
        statements.push(format!(
            "UPDATE {table} SET legacy_id = nextval(pg_get_serial_sequence('{table}', 'legacy_id')) \
             WHERE legacy_id IS NULL",
            table = t.name
        ));
    }
    for (t, p) in KeyedTable::children() {
        statements.push(format!(
            "UPDATE {child} SET {legacy_fk} = {parent}.legacy_id FROM {parent} \
             WHERE {parent}.id = {child}.{fk}",
            child = t.name,
            parent = p.parent_table,
            legacy_fk = p.legacy_column(),
            fk = p.fk_column,
        ));
        statements.push(format!(
            "UPDATE {} SET {} = NULL WHERE {} IS NULL",
            t.name,
            p.legacy_column(),
            p.fk_column
        ));
    }
    MigrationStep::new("backfill_legacy_keys", statements)
}

fn drop_uuid_foreign_keys() -> MigrationStep {
    let statements = KeyedTable::children()
        .map(|(t, p)| {
            format!(
                "ALTER TABLE {} DROP CONSTRAINT IF EXISTS {}",
                t.name,
                p.uuid_constraint(t.name)
            )
        })
        .collect();
    MigrationStep::new("drop_uuid_foreign_keys", statements)
}

fn drop_uuid_primary_keys() -> MigrationStep {
    let statements = KEYED_TABLES
        .iter()
        .map(|t| format!("ALTER TABLE {} DROP CONSTRAINT {}", t.name, t.pkey_constraint()))
        .collect();
    MigrationStep::new("drop_uuid_primary_keys", statements)
}

fn restore_legacy_columns() -> MigrationStep {
    let mut statements = Vec::new();
    for t in KEYED_TABLES.iter() {
        statements.push(format!("ALTER TABLE {} RENAME COLUMN id TO uuid_id", t.name));
        statements.push(format!("ALTER TABLE {} RENAME COLUMN legacy_id TO id", t.name));
        if let Some(p) = &t.parent {
            statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                t.name,
                p.fk_column,
                p.uuid_column()
            ));
            statements.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                t.name,
                p.legacy_column(),
                p.fk_column
            ));
        }
    }
    MigrationStep::new("restore_legacy_columns", statements)
}

fn restore_integer_keys() -> MigrationStep {
    let mut statements: Vec<String> = KEYED_TABLES
        .iter()
        .map(|t| {
            format!(
                "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY (id)",
                t.name,
                t.pkey_constraint()
            )
        })
        .collect();
    statements.extend(KeyedTable::children().map(|(t, p)| {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}(id)",
            t.name,
            p.legacy_constraint(t.name),
            p.fk_column,
            p.parent_table
        )
    }));
    MigrationStep::new("restore_integer_keys", statements)
}

fn drop_uuid_columns() -> MigrationStep {
    let mut statements = Vec::new();
    for t in KEYED_TABLES.iter() {
        if let Some(p) = &t.parent {
            statements.push(format!("ALTER TABLE {} DROP COLUMN {}", t.name, p.uuid_column()));
        }
        statements.push(format!("ALTER TABLE {} DROP COLUMN uuid_id", t.name));
    }
    MigrationStep::new("drop_uuid_columns", statements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_step_order() {
        let names: Vec<_> = rollback_steps().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "drop_supplementary_columns",
                "backfill_legacy_keys",
                "drop_uuid_foreign_keys",
                "drop_uuid_primary_keys",
                "restore_legacy_columns",
                "restore_integer_keys",
                "drop_uuid_columns",
            ]
        );
    }

    #[test]
    fn test_restored_foreign_keys_use_default_names_without_cascade() {
        let restore = restore_integer_keys();
        assert!(restore.statements.contains(
            &"ALTER TABLE notes ADD CONSTRAINT notes_lead_id_fkey FOREIGN KEY (lead_id) REFERENCES leads(id)"
                .to_string()
        ));
        assert!(restore.statements.iter().all(|s| !s.contains("CASCADE")));
        // Primary keys come back before the references that need them.
        assert!(restore.statements[0].contains("leads_pkey"));
    }

    #[test]
    fn test_legacy_drop_is_idempotent() {
        let steps = drop_legacy_steps();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].statements.iter().all(|s| s.contains("IF EXISTS")));
        assert_eq!(steps[0].statements.len(), 13);
    }
}
