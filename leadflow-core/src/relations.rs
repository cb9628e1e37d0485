//! Table and foreign-key layout shared by the schema bootstrap and the key
//! migration.
//!
//! [`KEYED_TABLES`] is the single source of truth for which tables carry a
//! surrogate key, which parent each child points at, and which relations
//! cascade on delete. Parents always precede their children.

/// Delete behaviour of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnDelete {
    /// Deleting the parent fails while children exist.
    Restrict,
    /// Deleting the parent deletes its children.
    Cascade,
}

impl OnDelete {
    /// SQL suffix for a `FOREIGN KEY ... REFERENCES` clause.
    pub fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::Restrict => "",
            OnDelete::Cascade => " ON DELETE CASCADE",
        }
    }
}

/// Foreign reference from a child table to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    /// Canonical FK column name (`lead_id`, `task_id`).
    pub fk_column: &'static str,
    pub parent_table: &'static str,
    pub on_delete: OnDelete,
}

/// A table keyed by a surrogate `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedTable {
    pub name: &'static str,
    pub parent: Option<ParentRef>,
}

pub const KEYED_TABLES: [KeyedTable; 7] = [
    KeyedTable {
        name: "leads",
        parent: None,
    },
    KeyedTable {
        name: "tasks",
        parent: Some(ParentRef {
            fk_column: "lead_id",
            parent_table: "leads",
            on_delete: OnDelete::Restrict,
        }),
    },
    // TODO: confirm with sales ops whether activities and logs should cascade
    // with their lead like notes do.
    KeyedTable {
        name: "activities",
        parent: Some(ParentRef {
            fk_column: "lead_id",
            parent_table: "leads",
            on_delete: OnDelete::Restrict,
        }),
    },
    KeyedTable {
        name: "logs",
        parent: Some(ParentRef {
            fk_column: "lead_id",
            parent_table: "leads",
            on_delete: OnDelete::Restrict,
        }),
    },
    KeyedTable {
        name: "notes",
        parent: Some(ParentRef {
            fk_column: "lead_id",
            parent_table: "leads",
            on_delete: OnDelete::Cascade,
        }),
    },
    KeyedTable {
        name: "task_comments",
        parent: Some(ParentRef {
            fk_column: "task_id",
            parent_table: "tasks",
            on_delete: OnDelete::Cascade,
        }),
    },
    KeyedTable {
        name: "task_attachments",
        parent: Some(ParentRef {
            fk_column: "task_id",
            parent_table: "tasks",
            on_delete: OnDelete::Cascade,
        }),
    },
];

impl KeyedTable {
    /// Name of the primary key constraint, identical before and after the
    /// key migration.
    pub fn pkey_constraint(&self) -> String {
        format!("{}_pkey", self.name)
    }

    /// Iterate the child tables.
    pub fn children() -> impl Iterator<Item = (&'static KeyedTable, &'static ParentRef)> {
        KEYED_TABLES
            .iter()
            .filter_map(|table| table.parent.as_ref().map(|parent| (table, parent)))
    }

    /// Look up a table by name.
    pub fn by_name(name: &str) -> Option<&'static KeyedTable> {
        KEYED_TABLES.iter().find(|table| table.name == name)
    }
}

impl ParentRef {
    /// Staging column that holds the UUID reference during the migration,
    /// e.g. `lead_uuid_id`.
    pub fn uuid_column(&self) -> String {
        let stem = self.fk_column.trim_end_matches("_id");
        format!("{}_uuid_id", stem)
    }

    /// Name the integer FK column is parked under, e.g. `legacy_lead_id`.
    pub fn legacy_column(&self) -> String {
        format!("legacy_{}", self.fk_column)
    }

    /// Constraint name PostgreSQL generated for the integer FK.
    pub fn legacy_constraint(&self, child: &str) -> String {
        format!("{}_{}_fkey", child, self.fk_column)
    }

    /// Constraint name of the UUID FK.
    pub fn uuid_constraint(&self, child: &str) -> String {
        format!("{}_{}_fkey", child, self.uuid_column())
    }

    /// Owned children (the cascading ones) cannot exist without a parent, so
    /// their reference is NOT NULL in the UUID layout.
    pub fn requires_parent(&self) -> bool {
        self.on_delete == OnDelete::Cascade
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parents_precede_children() {
        let mut seen = HashSet::new();
        for table in KEYED_TABLES.iter() {
            if let Some(parent) = &table.parent {
                assert!(
                    seen.contains(parent.parent_table),
                    "{} listed before its parent {}",
                    table.name,
                    parent.parent_table
                );
            }
            seen.insert(table.name);
        }
    }

    #[test]
    fn test_cascade_set() {
        let cascading: HashSet<_> = KeyedTable::children()
            .filter(|(_, parent)| parent.on_delete == OnDelete::Cascade)
            .map(|(table, parent)| (table.name, parent.parent_table))
            .collect();

        let expected: HashSet<_> = [
            ("notes", "leads"),
            ("task_comments", "tasks"),
            ("task_attachments", "tasks"),
        ]
        .into_iter()
        .collect();

        assert_eq!(cascading, expected);
    }

    #[test]
    fn test_column_names() {
        let tasks = KeyedTable::by_name("tasks").unwrap();
        let parent = tasks.parent.unwrap();
        assert_eq!(parent.uuid_column(), "lead_uuid_id");
        assert_eq!(parent.legacy_column(), "legacy_lead_id");
        assert_eq!(parent.legacy_constraint(tasks.name), "tasks_lead_id_fkey");
        assert_eq!(parent.uuid_constraint(tasks.name), "tasks_lead_uuid_id_fkey");
        assert_eq!(tasks.pkey_constraint(), "tasks_pkey");

        let comments = KeyedTable::by_name("task_comments").unwrap();
        assert_eq!(comments.parent.unwrap().uuid_column(), "task_uuid_id");
        assert!(comments.parent.unwrap().requires_parent());
        assert!(!parent.requires_parent());
    }

    #[test]
    fn test_seven_tables_six_children() {
        assert_eq!(KEYED_TABLES.len(), 7);
        assert_eq!(KeyedTable::children().count(), 6);
        assert!(KeyedTable::by_name("leads").unwrap().parent.is_none());
    }
}
