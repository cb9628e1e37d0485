//! Activity-related API types

use leadflow_core::{parse_timestamp, ActivityType, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

use super::{non_blank, nullable};
use crate::error::ApiResult;
use crate::validation::{HasUpdates, ValidateNonEmpty};

/// Request to create an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateActivityRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub lead_id: Option<EntityId>,
    /// Task this activity is scheduled for
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub task_id: Option<EntityId>,
    /// Accepts `type` as sent by the web client
    #[serde(alias = "type")]
    pub activity_type: Option<ActivityType>,
    pub title: String,
    pub description: Option<String>,
    /// ISO 8601 timestamp
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl CreateActivityRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.title.validate_non_empty("title")?;
        self.parsed_scheduled_at().map(|_| ())
    }

    pub fn parsed_scheduled_at(&self) -> ApiResult<Option<Timestamp>> {
        match non_blank(&self.scheduled_at) {
            Some(raw) => Ok(parse_timestamp("scheduled_at", raw)?),
            None => Ok(None),
        }
    }
}

/// Request to update an activity. Absent fields are left unchanged; an
/// explicit `null` on `lead_id` or `task_id` unlinks the activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateActivityRequest {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub lead_id: Option<Option<EntityId>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub task_id: Option<Option<EntityId>>,
    #[serde(alias = "type")]
    pub activity_type: Option<ActivityType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateActivityRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.validate_has_updates()?;
        if self.title.is_some() {
            self.title.validate_non_empty("title")?;
        }
        self.parsed_scheduled_at().map(|_| ())
    }

    pub fn parsed_scheduled_at(&self) -> ApiResult<Option<Timestamp>> {
        match non_blank(&self.scheduled_at) {
            Some(raw) => Ok(parse_timestamp("scheduled_at", raw)?),
            None => Ok(None),
        }
    }
}

impl HasUpdates for UpdateActivityRequest {
    fn has_any_updates(&self) -> bool {
        self.lead_id.is_some()
            || self.task_id.is_some()
            || self.activity_type.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || self.scheduled_at.is_some()
            || self.completed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_test_utils::fixtures::create_activity_body;
    use leadflow_test_utils::generators::{arb_activity_type, arb_uuid};
    use proptest::prelude::*;

    #[test]
    fn test_type_alias_accepted() {
        let req: CreateActivityRequest =
            serde_json::from_str(r#"{"type": "meeting", "title": "Kickoff"}"#).unwrap();
        assert_eq!(req.activity_type, Some(ActivityType::Meeting));
        assert!(!req.completed);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_bad_schedule_rejected() {
        let req: CreateActivityRequest =
            serde_json::from_str(r#"{"title": "Call", "scheduled_at": "tomorrow"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_completed_only_update_is_valid() {
        let req = UpdateActivityRequest {
            completed: Some(true),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_null_task_unlinks_but_absent_keeps() {
        let keep: UpdateActivityRequest =
            serde_json::from_str(r#"{"title": "Call again"}"#).unwrap();
        assert_eq!(keep.task_id, None);

        let clear: UpdateActivityRequest = serde_json::from_str(r#"{"task_id": null}"#).unwrap();
        assert_eq!(clear.task_id, Some(None));
        assert!(clear.validate().is_ok());

        let id = uuid::Uuid::nil();
        let set: UpdateActivityRequest =
            serde_json::from_str(&format!(r#"{{"task_id": "{}"}}"#, id)).unwrap();
        assert_eq!(set.task_id, Some(Some(id)));
        assert_eq!(set.lead_id, None);
    }

    proptest! {
        #[test]
        fn prop_client_type_field_maps_every_kind(kind in arb_activity_type(), task in arb_uuid()) {
            let mut body = create_activity_body("Check in", Some(task));
            body["type"] = serde_json::json!(kind.as_db_str());
            let req: CreateActivityRequest = serde_json::from_value(body).unwrap();
            prop_assert!(req.validate().is_ok());
            prop_assert_eq!(req.activity_type, Some(kind));
            prop_assert_eq!(req.task_id, Some(task));
            prop_assert!(req.parsed_scheduled_at().unwrap().is_some());
        }
    }
}
