//! API Request and Response Types
//!
//! Request bodies and query parameters for the REST endpoints. Entity
//! records themselves live in `leadflow-core` and are returned as-is.

// Lead types
mod lead;
pub use lead::*;

// Task, comment and attachment types
mod task;
pub use task::*;

// Activity types
mod activity;
pub use activity::*;

// Note types
mod note;
pub use note::*;

// Log types
mod log;
pub use log::*;

// Health and admin types
mod admin;
pub use admin::*;

use serde::{Deserialize, Deserializer};

/// Treat a blank optional string as absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Keeps an explicit JSON `null` apart from an absent field: absent is
/// `None` (via `#[serde(default)]`), `null` is `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    //! Entities are returned as-is, so their JSON is the response contract
    //! the web client codes against.

    use leadflow_test_utils::fixtures::{completed_task, new_lead, pending_task};
    use leadflow_test_utils::generators::{arb_lead, arb_task, arb_uuid};
    use proptest::prelude::*;
    use serde_json::{json, Value};

    #[test]
    fn test_lead_body_shape() {
        let lead = new_lead("ACME");
        let body = serde_json::to_value(&lead).unwrap();
        assert_eq!(body["id"], json!(lead.id.to_string()));
        assert_eq!(body["status"], "new");
        assert_eq!(body["estimated_value"], 15000.0);
        assert!(body["phone"].is_null());
    }

    #[test]
    fn test_completion_fields_in_task_body() {
        let lead = new_lead("ACME");
        let open = serde_json::to_value(pending_task(Some(lead.id))).unwrap();
        assert_eq!(open["lead_id"], json!(lead.id.to_string()));
        assert_eq!(open["status"], "pending");
        assert!(open["completed_at"].is_null());

        let done = serde_json::to_value(completed_task(None)).unwrap();
        assert_eq!(done["status"], "completed");
        assert_eq!(done["progress"], 100);
        assert!(done["completed_at"].is_string());
        assert!(done["lead_id"].is_null());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_lead_status_uses_wire_name(lead in arb_lead()) {
            let body = serde_json::to_value(&lead).unwrap();
            prop_assert_eq!(&body["status"], &json!(lead.status.as_db_str()));
            prop_assert!(body["created_at"].is_string());
        }

        #[test]
        fn prop_task_due_date_is_date_only(
            (lead_id, task) in arb_uuid().prop_flat_map(|id| (Just(id), arb_task(Some(id)))),
        ) {
            let body = serde_json::to_value(&task).unwrap();
            match &body["due_date"] {
                Value::Null => prop_assert!(task.due_date.is_none()),
                Value::String(raw) => {
                    prop_assert_eq!(raw.len(), 10);
                    prop_assert_eq!(Some(raw.clone()), task.due_date.map(|d| d.to_string()));
                }
                other => prop_assert!(false, "due_date serialized as {}", other),
            }
            prop_assert_eq!(&body["lead_id"], &json!(lead_id.to_string()));
        }
    }
}
