//! LeadFlow Test Utilities
//!
//! Shared test infrastructure for the LeadFlow workspace:
//! - Proptest generators for entity types and raw client input
//! - Fixtures for entities, request bodies and a seeded legacy database
//! - Assertions over entity invariants

// Re-export core types for convenience
pub use leadflow_core::{
    ActivityType, DueDate, EntityId, Lead, LeadStatus, Task, TaskPriority, TaskStatus, Timestamp,
    PROGRESS_MAX, PROGRESS_MIN,
};

use chrono::Utc;
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating LeadFlow entity types.

    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    // === Identity and Time ===

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a Timestamp (DateTime<Utc>).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // Generate timestamps within a reasonable range (2020-2030)
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    /// Generate a calendar date between 2020 and 2030.
    pub fn arb_due_date() -> impl Strategy<Value = DueDate> {
        (2020i32..2031, 1u32..13, 1u32..29).prop_filter_map("valid date", |(y, m, d)| {
            NaiveDate::from_ymd_opt(y, m, d)
        })
    }

    /// Due date strings as the browser sends them: a date input value or a
    /// full ISO timestamp.
    pub fn arb_due_date_input() -> impl Strategy<Value = String> {
        prop_oneof![
            arb_due_date().prop_map(|d| d.format("%Y-%m-%d").to_string()),
            arb_timestamp().prop_map(|ts| ts.to_rfc3339()),
        ]
    }

    /// Strings that are not dates in any accepted format.
    pub fn arb_invalid_due_date_input() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("not-a-date".to_string()),
            Just("2024-13-45".to_string()),
            Just("31/12/2024".to_string()),
            "[a-z]{3,12}",
        ]
    }

    /// Completion percentages, valid or not.
    pub fn arb_progress() -> impl Strategy<Value = i32> {
        prop_oneof![
            3 => PROGRESS_MIN..=PROGRESS_MAX,
            1 => -500i32..PROGRESS_MIN,
            1 => (PROGRESS_MAX + 1)..500,
        ]
    }

    // === Enum Generators ===

    pub fn arb_lead_status() -> impl Strategy<Value = LeadStatus> {
        prop_oneof![
            Just(LeadStatus::New),
            Just(LeadStatus::Contacted),
            Just(LeadStatus::Qualified),
            Just(LeadStatus::Proposal),
            Just(LeadStatus::Negotiation),
            Just(LeadStatus::Won),
            Just(LeadStatus::Lost),
        ]
    }

    pub fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::Pending),
            Just(TaskStatus::InProgress),
            Just(TaskStatus::Completed),
            Just(TaskStatus::Cancelled),
        ]
    }

    pub fn arb_task_priority() -> impl Strategy<Value = TaskPriority> {
        prop_oneof![
            Just(TaskPriority::Low),
            Just(TaskPriority::Medium),
            Just(TaskPriority::High),
            Just(TaskPriority::Urgent),
        ]
    }

    pub fn arb_activity_type() -> impl Strategy<Value = ActivityType> {
        prop_oneof![
            Just(ActivityType::Call),
            Just(ActivityType::Email),
            Just(ActivityType::Meeting),
            Just(ActivityType::FollowUp),
            Just(ActivityType::Other),
        ]
    }

    // === Entity Generators ===

    /// Generate a Lead.
    pub fn arb_lead() -> impl Strategy<Value = Lead> {
        (
            arb_uuid(),
            "[A-Za-z ]{1,40}",
            proptest::option::of("[A-Za-z]{2,20}"),
            arb_lead_status(),
            proptest::option::of(0.0f64..1_000_000.0),
            arb_timestamp(),
        )
            .prop_map(|(id, name, company, status, estimated_value, created_at)| Lead {
                id,
                name,
                company,
                email: None,
                phone: None,
                status,
                source: None,
                estimated_value,
                created_at,
                updated_at: created_at,
            })
    }

    /// Generate a Task that satisfies the completion invariants: completed
    /// tasks have progress 100 and a `completed_at`, others have none.
    pub fn arb_task(lead_id: Option<EntityId>) -> impl Strategy<Value = Task> {
        (
            arb_uuid(),
            "[A-Za-z ]{1,60}",
            arb_task_status(),
            arb_task_priority(),
            PROGRESS_MIN..=PROGRESS_MAX,
            0i32..1000,
            proptest::option::of(arb_due_date()),
            arb_timestamp(),
        )
            .prop_map(
                move |(id, title, status, priority, progress, sort_order, due_date, created_at)| {
                    let completed = status == TaskStatus::Completed;
                    Task {
                        id,
                        lead_id,
                        title,
                        description: None,
                        status,
                        priority,
                        progress: if completed { PROGRESS_MAX } else { progress },
                        sort_order,
                        due_date,
                        assigned_to: None,
                        created_at,
                        updated_at: created_at,
                        completed_at: completed.then_some(created_at),
                    }
                },
            )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use serde_json::{json, Value};

    /// A lead in its initial status.
    pub fn new_lead(name: &str) -> Lead {
        let now = Utc::now();
        Lead {
            id: Uuid::new_v4(),
            name: name.to_string(),
            company: Some("ACME".to_string()),
            email: Some("contato@acme.com.br".to_string()),
            phone: None,
            status: LeadStatus::New,
            source: Some("website".to_string()),
            estimated_value: Some(15_000.0),
            created_at: now,
            updated_at: now,
        }
    }

    /// A pending task, optionally tied to a lead.
    pub fn pending_task(lead_id: Option<EntityId>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            lead_id,
            title: "Send proposal".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            progress: 0,
            sort_order: 0,
            due_date: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// A completed task.
    pub fn completed_task(lead_id: Option<EntityId>) -> Task {
        let now = Utc::now();
        Task {
            status: TaskStatus::Completed,
            progress: PROGRESS_MAX,
            completed_at: Some(now),
            ..pending_task(lead_id)
        }
    }

    // === Request Bodies ===

    /// Body of `POST /api/leads`.
    pub fn create_lead_body(name: &str) -> Value {
        json!({
            "name": name,
            "company": "ACME",
            "email": "contato@acme.com.br",
            "status": "new",
            "estimated_value": 15000.0
        })
    }

    /// Body of `POST /api/tasks`.
    pub fn create_task_body(title: &str, lead_id: Option<EntityId>, due_date: Option<&str>) -> Value {
        json!({
            "title": title,
            "lead_id": lead_id,
            "priority": "high",
            "due_date": due_date
        })
    }

    /// Body of `POST /api/activities` as the web client sends it.
    pub fn create_activity_body(title: &str, task_id: Option<EntityId>) -> Value {
        json!({
            "title": title,
            "type": "call",
            "task_id": task_id,
            "scheduled_at": "2030-01-15T10:00"
        })
    }

    // === Legacy Database Seed ===

    /// Rows per table inserted by [`LEGACY_SEED`].
    pub const LEGACY_SEED_COUNTS: [(&str, i64); 7] = [
        ("leads", 2),
        ("tasks", 2),
        ("activities", 1),
        ("logs", 2),
        ("notes", 2),
        ("task_comments", 2),
        ("task_attachments", 1),
    ];

    /// Data for an integer-keyed database: lead `L1` owns task `T1`, which
    /// owns two comments and an attachment; `T2` belongs to no lead. Task ids
    /// start at 10 so a backfill that joins the wrong parent table finds
    /// nothing instead of a lead with the same id.
    pub const LEGACY_SEED: &str = r#"
INSERT INTO leads (id, name, company, status) VALUES
    (1, 'L1', 'ACME', 'qualified'),
    (2, 'L2', NULL, 'new');
SELECT setval(pg_get_serial_sequence('leads', 'id'), 2);

INSERT INTO tasks (id, lead_id, title, status, progress, due_date) VALUES
    (10, 1, 'T1', 'in_progress', 40, DATE '2030-01-31'),
    (11, NULL, 'T2', 'pending', 0, NULL);
SELECT setval(pg_get_serial_sequence('tasks', 'id'), 11);

INSERT INTO activities (lead_id, activity_type, title) VALUES (1, 'call', 'Call L1');

INSERT INTO logs (lead_id, action, description) VALUES
    (1, 'lead_created', 'L1 created'),
    (NULL, 'import', 'Initial import');

INSERT INTO notes (lead_id, content, author) VALUES
    (1, 'Interested in the annual plan', 'ana'),
    (1, 'Asked for a discount', 'ana');

INSERT INTO task_comments (task_id, comment) VALUES
    (10, 'Draft sent'),
    (10, 'Waiting for feedback');

INSERT INTO task_attachments (task_id, filename, file_url, file_size) VALUES
    (10, 'proposal.pdf', 'https://files.example.com/proposal.pdf', 2048);
"#;
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over entity invariants.

    use super::*;

    /// Assert the completion invariants of a task.
    pub fn assert_task_consistent(task: &Task) {
        assert!(
            (PROGRESS_MIN..=PROGRESS_MAX).contains(&task.progress),
            "progress {} out of range",
            task.progress
        );
        if task.status == TaskStatus::Completed {
            assert_eq!(task.progress, PROGRESS_MAX, "completed task below 100%");
            assert!(task.completed_at.is_some(), "completed task without completed_at");
        } else {
            assert!(
                task.completed_at.is_none(),
                "{:?} task has completed_at",
                task.status
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_core::{parse_due_date, KEYED_TABLES};
    use proptest::prelude::*;

    #[test]
    fn test_task_fixtures_are_consistent() {
        assertions::assert_task_consistent(&fixtures::pending_task(None));
        assertions::assert_task_consistent(&fixtures::completed_task(None));
    }

    #[test]
    fn test_legacy_seed_covers_every_table() {
        for table in KEYED_TABLES.iter() {
            assert!(
                fixtures::LEGACY_SEED_COUNTS
                    .iter()
                    .any(|(name, count)| *name == table.name && *count > 0),
                "no seed rows for {}",
                table.name
            );
        }
    }

    #[test]
    fn test_create_task_body_fields() {
        let body = fixtures::create_task_body("T1", None, Some("2030-01-31"));
        assert_eq!(body["title"], "T1");
        assert!(body["lead_id"].is_null());
        assert_eq!(body["due_date"], "2030-01-31");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_tasks_are_consistent(task in generators::arb_task(None)) {
            assertions::assert_task_consistent(&task);
        }

        #[test]
        fn prop_due_date_inputs_parse(raw in generators::arb_due_date_input()) {
            prop_assert!(matches!(parse_due_date(&raw), Ok(Some(_))));
        }

        #[test]
        fn prop_invalid_due_date_inputs_are_rejected(raw in generators::arb_invalid_due_date_input()) {
            prop_assert!(parse_due_date(&raw).is_err());
        }
    }
}
