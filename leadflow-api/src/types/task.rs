//! Task-related API types: tasks, comments and attachments.

use leadflow_core::{
    parse_due_date, validate_progress, DueDate, EntityId, TaskPriority, TaskStatus,
};
use serde::{Deserialize, Serialize};

use super::non_blank;
use crate::error::{ApiError, ApiResult};
use crate::validation::{HasUpdates, ValidateNonEmpty, ValidateRange};

// ============================================================================
// TASKS
// ============================================================================

/// Request to create a new task.
///
/// `due_date` arrives as the raw string from the date input; it is parsed
/// here so that a malformed value is rejected before reaching the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    /// Lead this task belongs to
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub lead_id: Option<EntityId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Completion percentage (0-100)
    pub progress: Option<i32>,
    /// Position within the kanban column
    #[serde(default, alias = "sortOrder")]
    pub sort_order: Option<i32>,
    /// `YYYY-MM-DD`, an ISO 8601 timestamp, or empty
    pub due_date: Option<String>,
    pub assigned_to: Option<String>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.title.validate_non_empty("title")?;
        if let Some(progress) = self.progress {
            validate_progress(progress)?;
        }
        self.parsed_due_date().map(|_| ())
    }

    pub fn parsed_due_date(&self) -> ApiResult<Option<DueDate>> {
        match non_blank(&self.due_date) {
            Some(raw) => Ok(parse_due_date(raw)?),
            None => Ok(None),
        }
    }
}

/// Request to update a task. Absent fields are left unchanged; an empty
/// `due_date` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub lead_id: Option<EntityId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub progress: Option<i32>,
    #[serde(default, alias = "sortOrder")]
    pub sort_order: Option<i32>,
    pub due_date: Option<String>,
    pub assigned_to: Option<String>,
}

/// How an update request affects the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateChange {
    Keep,
    Clear,
    Set(DueDate),
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.validate_has_updates()?;
        if self.title.is_some() {
            self.title.validate_non_empty("title")?;
        }
        if let Some(progress) = self.progress {
            validate_progress(progress)?;
        }
        self.due_date_change().map(|_| ())
    }

    pub fn due_date_change(&self) -> ApiResult<DueDateChange> {
        match &self.due_date {
            None => Ok(DueDateChange::Keep),
            Some(raw) => match parse_due_date(raw)? {
                Some(date) => Ok(DueDateChange::Set(date)),
                None => Ok(DueDateChange::Clear),
            },
        }
    }
}

impl HasUpdates for UpdateTaskRequest {
    fn has_any_updates(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.lead_id.is_some()
            || self.status.is_some()
            || self.priority.is_some()
            || self.progress.is_some()
            || self.sort_order.is_some()
            || self.due_date.is_some()
            || self.assigned_to.is_some()
    }
}

/// Body of `PUT /api/tasks/:id/status`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateTaskStatusRequest {
    pub status: TaskStatus,
}

/// Body of `PUT /api/tasks/:id/progress`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateTaskProgressRequest {
    pub progress: i32,
}

impl UpdateTaskProgressRequest {
    pub fn validate(&self) -> ApiResult<()> {
        validate_progress(self.progress)?;
        Ok(())
    }
}

/// Body of `PUT /api/tasks/:id/order`. The web client sends `sortOrder`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateTaskOrderRequest {
    #[serde(rename = "sortOrder", alias = "sort_order")]
    pub sort_order: i32,
}

impl UpdateTaskOrderRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.sort_order.validate_range("sortOrder", 0, i32::MAX)
    }
}

/// Query parameters of `GET /api/tasks/filtered`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[cfg_attr(feature = "openapi", param(value_type = Option<String>, format = "uuid"))]
    pub lead_id: Option<EntityId>,
    pub assigned_to: Option<String>,
    /// Case-insensitive match on title and description
    pub search: Option<String>,
    /// Only tasks past their due date and not yet completed or cancelled
    pub overdue: Option<bool>,
}

// ============================================================================
// COMMENTS
// ============================================================================

/// Request to add a comment to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateTaskCommentRequest {
    pub comment: String,
    pub user_id: Option<String>,
}

impl CreateTaskCommentRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.comment.validate_non_empty("comment")
    }
}

// ============================================================================
// ATTACHMENTS
// ============================================================================

/// Request to register a file attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateTaskAttachmentRequest {
    pub filename: String,
    pub file_url: String,
    /// Size in bytes
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub uploaded_by: Option<String>,
}

impl CreateTaskAttachmentRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.filename.validate_non_empty("filename")?;
        self.file_url.validate_non_empty("file_url")?;
        match self.file_size {
            Some(size) if size < 0 => Err(ApiError::invalid_range("file_size", 0, i64::MAX)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MSG_INVALID_DUE_DATE;
    use leadflow_test_utils::fixtures::create_task_body;
    use leadflow_test_utils::generators::{
        arb_due_date_input, arb_invalid_due_date_input, arb_progress, arb_task_priority,
        arb_task_status, arb_uuid,
    };
    use proptest::prelude::*;

    fn create_request(due_date: Option<&str>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: "Call back".to_string(),
            description: None,
            lead_id: None,
            status: None,
            priority: None,
            progress: None,
            sort_order: None,
            due_date: due_date.map(str::to_string),
            assigned_to: None,
        }
    }

    #[test]
    fn test_invalid_due_date_uses_client_message() {
        let err = create_request(Some("31/02/2024")).validate().unwrap_err();
        assert_eq!(err.message, MSG_INVALID_DUE_DATE);
    }

    #[test]
    fn test_blank_due_date_is_none() {
        assert_eq!(create_request(Some("")).parsed_due_date().unwrap(), None);
        assert_eq!(create_request(None).parsed_due_date().unwrap(), None);
        assert_eq!(
            create_request(Some("2024-05-01")).parsed_due_date().unwrap(),
            DueDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn test_update_due_date_change() {
        let keep = UpdateTaskRequest {
            title: Some("x".to_string()),
            ..Default::default()
        };
        assert_eq!(keep.due_date_change().unwrap(), DueDateChange::Keep);

        let clear = UpdateTaskRequest {
            due_date: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(clear.due_date_change().unwrap(), DueDateChange::Clear);

        let bad = UpdateTaskRequest {
            due_date: Some("2024-13-40".to_string()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_order_request_accepts_both_spellings() {
        let camel: UpdateTaskOrderRequest = serde_json::from_str(r#"{"sortOrder": 4}"#).unwrap();
        let snake: UpdateTaskOrderRequest = serde_json::from_str(r#"{"sort_order": 4}"#).unwrap();
        assert_eq!(camel, snake);
        assert!(UpdateTaskOrderRequest { sort_order: -1 }.validate().is_err());
    }

    #[test]
    fn test_attachment_requires_url() {
        let req = CreateTaskAttachmentRequest {
            filename: "proposta.pdf".to_string(),
            file_url: " ".to_string(),
            file_size: Some(1024),
            mime_type: Some("application/pdf".to_string()),
            uploaded_by: None,
        };
        assert!(req.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_progress_request_matches_range(progress in arb_progress()) {
            let ok = UpdateTaskProgressRequest { progress }.validate().is_ok();
            prop_assert_eq!(ok, (0..=100).contains(&progress));

            let mut create = create_request(None);
            create.progress = Some(progress);
            prop_assert_eq!(create.validate().is_ok(), ok);
        }

        #[test]
        fn prop_browser_due_dates_are_accepted(raw in arb_due_date_input(), lead in arb_uuid()) {
            let req: CreateTaskRequest =
                serde_json::from_value(create_task_body("Follow up", Some(lead), Some(&raw)))
                    .unwrap();
            prop_assert!(req.validate().is_ok());
            prop_assert!(req.parsed_due_date().unwrap().is_some());
            prop_assert_eq!(req.lead_id, Some(lead));
        }

        #[test]
        fn prop_malformed_due_dates_use_client_message(raw in arb_invalid_due_date_input()) {
            let err = create_request(Some(&raw)).validate().unwrap_err();
            prop_assert_eq!(err.message, MSG_INVALID_DUE_DATE);

            let update = UpdateTaskRequest {
                due_date: Some(raw),
                ..Default::default()
            };
            prop_assert!(update.validate().is_err());
        }

        #[test]
        fn prop_status_and_priority_use_wire_names(
            status in arb_task_status(),
            priority in arb_task_priority(),
        ) {
            let body = serde_json::json!({
                "title": "Kanban card",
                "status": status.as_db_str(),
                "priority": priority.as_db_str(),
            });
            let req: CreateTaskRequest = serde_json::from_value(body).unwrap();
            prop_assert_eq!(req.status, Some(status));
            prop_assert_eq!(req.priority, Some(priority));

            let moved: UpdateTaskStatusRequest =
                serde_json::from_value(serde_json::json!({ "status": status.as_db_str() })).unwrap();
            prop_assert_eq!(moved.status, status);
        }
    }
}
