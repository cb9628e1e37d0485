//! OpenAPI Specification for the LeadFlow API
//!
//! Generated by utoipa from the route annotations and the request and
//! entity types.

use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::routes::{activity, admin, attachment, health, lead, log, note, task};
use crate::types::*;

use leadflow_core::{
    Activity, ActivityType, AttachmentSummary, Lead, LeadStatus, LogEntry, Note, Task,
    TaskAttachment, TaskComment, TaskPriority, TaskStatus, TaskSummary,
};

/// OpenAPI document for the LeadFlow API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeadFlow API",
        version = "0.2.0",
        description = "Lead tracking and task board backend",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local Development")
    ),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Leads", description = "Sales prospects"),
        (name = "Tasks", description = "Task board with comments and attachments"),
        (name = "Logs", description = "Audit trail"),
        (name = "Activities", description = "Scheduled calls, meetings and follow-ups"),
        (name = "Notes", description = "Free-text notes on leads"),
        (name = "Attachments", description = "Files attached to tasks"),
        (name = "Admin", description = "Administrative operations")
    ),
    paths(
        // === Health ===
        health::health,
        health::readiness,

        // === Leads ===
        lead::list_leads,
        lead::create_lead,
        lead::get_lead,
        lead::update_lead,
        lead::delete_lead,
        lead::list_lead_notes,

        // === Tasks ===
        task::list_tasks,
        task::create_task,
        task::list_tasks_filtered,
        task::update_task,
        task::update_task_status,
        task::update_task_progress,
        task::update_task_order,
        task::delete_task,
        task::list_task_comments,
        task::create_task_comment,
        task::list_task_attachments,
        task::create_task_attachment,
        task::delete_task_attachment,

        // === Logs ===
        log::list_logs,
        log::create_log,

        // === Activities ===
        activity::list_activities,
        activity::create_activity,
        activity::update_activity,
        activity::delete_activity,

        // === Notes ===
        note::list_notes,
        note::create_note,
        note::delete_note,

        // === Attachments ===
        attachment::list_attachments,
        attachment::delete_attachment,

        // === Admin ===
        admin::reset_database,
    ),
    components(
        schemas(
            ErrorBody,

            // === Request Types ===
            CreateLeadRequest, UpdateLeadRequest,
            CreateTaskRequest, UpdateTaskRequest, UpdateTaskStatusRequest,
            UpdateTaskProgressRequest, UpdateTaskOrderRequest,
            CreateTaskCommentRequest, CreateTaskAttachmentRequest,
            CreateActivityRequest, UpdateActivityRequest,
            CreateNoteRequest, CreateLogRequest,
            HealthResponse, ResetResponse,
            health::ReadinessResponse, health::ComponentHealth,

            // === Core Domain Types (from leadflow-core) ===
            LeadStatus, TaskStatus, TaskPriority, ActivityType,
            Lead, Task, TaskSummary, TaskComment, TaskAttachment, AttachmentSummary,
            LogEntry, Activity, Note,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }

    /// Generate OpenAPI spec as YAML string.
    pub fn to_yaml() -> Result<String, String> {
        let openapi = Self::openapi();
        serde_yaml::to_string(&openapi).map_err(|e| e.to_string())
    }
}
