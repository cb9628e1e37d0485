//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the data access
//! facade used by the route handlers. Every method takes one pooled session
//! for its duration and returns typed records from `leadflow-core`.

use std::str::FromStr;
use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use leadflow_core::{
    Activity, AttachmentSummary, DomainError, EntityId, Lead, LogEntry, Note, Task,
    TaskAttachment, TaskComment, TaskStatus, TaskSummary, KEYED_TABLES,
};
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};
use tracing::{debug, info};

use crate::constants::MSG_LEAD_HAS_DEPENDENTS;
use crate::error::{ApiError, ApiResult};
use crate::schema;
use crate::types::*;

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full connection string; overrides the individual fields when set
    pub url: Option<String>,
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Extra server options, e.g. `-c search_path=scratch,public`
    pub options: Option<String>,
    /// Maximum pool size
    pub max_size: usize,
    /// How long to wait for a free connection
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            dbname: "leadflow".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            options: None,
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// `DATABASE_URL` takes precedence over the `LEADFLOW_DB_*` fields.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            host: std::env::var("LEADFLOW_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("LEADFLOW_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("LEADFLOW_DB_NAME").unwrap_or_else(|_| "leadflow".to_string()),
            user: std::env::var("LEADFLOW_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("LEADFLOW_DB_PASSWORD").unwrap_or_default(),
            options: std::env::var("LEADFLOW_DB_OPTIONS").ok(),
            max_size: std::env::var("LEADFLOW_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("LEADFLOW_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    ///
    /// No connection is opened until the first checkout.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        match &self.url {
            Some(url) => cfg.url = Some(url.clone()),
            None => {
                cfg.host = Some(self.host.clone());
                cfg.port = Some(self.port);
                cfg.dbname = Some(self.dbname.clone());
                cfg.user = Some(self.user.clone());
                cfg.password = Some(self.password.clone());
            }
        }
        cfg.options = self.options.clone();

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        pool_cfg.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// ROW MAPPING
// ============================================================================

const LEAD_COLUMNS: &str = "id, name, company, email, phone, status, source, estimated_value, \
                            created_at, updated_at";

const TASK_COLUMNS: &str = "id, lead_id, title, description, status, priority, progress, \
                            sort_order, due_date, assigned_to, created_at, updated_at, completed_at";

const TASK_SUMMARY_SELECT: &str = "SELECT t.id, t.lead_id, t.title, t.description, t.status, \
     t.priority, t.progress, t.sort_order, t.due_date, t.assigned_to, t.created_at, \
     t.updated_at, t.completed_at, l.name AS lead_name, \
     (SELECT COUNT(*) FROM task_comments c WHERE c.task_id = t.id) AS comment_count, \
     (SELECT COUNT(*) FROM task_attachments a WHERE a.task_id = t.id) AS attachment_count \
     FROM tasks t LEFT JOIN leads l ON l.id = t.lead_id";

const TASK_SUMMARY_ORDER: &str = "ORDER BY t.status, t.sort_order, t.created_at DESC";

const COMMENT_COLUMNS: &str = "id, task_id, comment, user_id, created_at";

const ATTACHMENT_COLUMNS: &str =
    "id, task_id, filename, file_url, file_size, mime_type, uploaded_by, created_at";

const LOG_COLUMNS: &str = "id, lead_id, action, description, user_name, metadata, created_at";

const ACTIVITY_COLUMNS: &str = "id, lead_id, task_id, activity_type, title, description, \
                                scheduled_at, completed, created_at, updated_at";

const NOTE_COLUMNS: &str = "id, lead_id, content, author, created_at";

/// Parse a stored enum value. A bad value means the row was written outside
/// the API.
fn parse_column<T>(row: &Row, column: &str) -> ApiResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    T::from_str(&raw).map_err(|e| {
        ApiError::database_error(format!("Unreadable {} column: {}", column, e))
    })
}

fn lead_from_row(row: &Row) -> ApiResult<Lead> {
    Ok(Lead {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        company: row.try_get("company")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        status: parse_column(row, "status")?,
        source: row.try_get("source")?,
        estimated_value: row.try_get("estimated_value")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn task_from_row(row: &Row) -> ApiResult<Task> {
    Ok(Task {
        id: row.try_get("id")?,
        lead_id: row.try_get("lead_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: parse_column(row, "status")?,
        priority: parse_column(row, "priority")?,
        progress: row.try_get("progress")?,
        sort_order: row.try_get("sort_order")?,
        due_date: row.try_get("due_date")?,
        assigned_to: row.try_get("assigned_to")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

fn task_summary_from_row(row: &Row) -> ApiResult<TaskSummary> {
    Ok(TaskSummary {
        task: task_from_row(row)?,
        lead_name: row.try_get("lead_name")?,
        comment_count: row.try_get("comment_count")?,
        attachment_count: row.try_get("attachment_count")?,
    })
}

fn comment_from_row(row: &Row) -> ApiResult<TaskComment> {
    Ok(TaskComment {
        id: row.try_get("id")?,
        task_id: row.try_get("task_id")?,
        comment: row.try_get("comment")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn attachment_from_row(row: &Row) -> ApiResult<TaskAttachment> {
    Ok(TaskAttachment {
        id: row.try_get("id")?,
        task_id: row.try_get("task_id")?,
        filename: row.try_get("filename")?,
        file_url: row.try_get("file_url")?,
        file_size: row.try_get("file_size")?,
        mime_type: row.try_get("mime_type")?,
        uploaded_by: row.try_get("uploaded_by")?,
        created_at: row.try_get("created_at")?,
    })
}

fn log_from_row(row: &Row) -> ApiResult<LogEntry> {
    Ok(LogEntry {
        id: row.try_get("id")?,
        lead_id: row.try_get("lead_id")?,
        action: row.try_get("action")?,
        description: row.try_get("description")?,
        user_name: row.try_get("user_name")?,
        metadata: row.try_get("metadata")?,
        created_at: row.try_get("created_at")?,
    })
}

fn activity_from_row(row: &Row) -> ApiResult<Activity> {
    Ok(Activity {
        id: row.try_get("id")?,
        lead_id: row.try_get("lead_id")?,
        task_id: row.try_get("task_id")?,
        activity_type: parse_column(row, "activity_type")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        scheduled_at: row.try_get("scheduled_at")?,
        completed: row.try_get("completed")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn note_from_row(row: &Row) -> ApiResult<Note> {
    Ok(Note {
        id: row.try_get("id")?,
        lead_id: row.try_get("lead_id")?,
        content: row.try_get("content")?,
        author: row.try_get("author")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_rows<T>(rows: &[Row], f: fn(&Row) -> ApiResult<T>) -> ApiResult<Vec<T>> {
    rows.iter().map(f).collect()
}

fn not_found(entity: &'static str, id: EntityId) -> ApiError {
    DomainError::NotFound { entity, id }.into()
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim)
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// Database client that wraps a connection pool and provides the entity
/// operations used by the API.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    /// Create a new database client with the given pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a new database client from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// The underlying pool, shared with the key migration.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    // ========================================================================
    // SCHEMA
    // ========================================================================

    /// Create or complete the UUID-keyed schema.
    pub async fn initialize_schema(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        schema::initialize(&conn).await
    }

    // ========================================================================
    // LEAD OPERATIONS
    // ========================================================================

    /// List all leads, newest first.
    pub async fn lead_list(&self) -> ApiResult<Vec<Lead>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!("SELECT {} FROM leads ORDER BY created_at DESC", LEAD_COLUMNS),
                &[],
            )
            .await?;
        map_rows(&rows, lead_from_row)
    }

    pub async fn lead_get(&self, id: EntityId) -> ApiResult<Lead> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {} FROM leads WHERE id = $1", LEAD_COLUMNS),
                &[&id],
            )
            .await?
            .ok_or_else(|| not_found("Lead", id))?;
        lead_from_row(&row)
    }

    pub async fn lead_create(&self, req: &CreateLeadRequest) -> ApiResult<Lead> {
        let conn = self.get_conn().await?;
        let status = req.status.unwrap_or_default();
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO leads (name, company, email, phone, status, source, estimated_value) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
                    LEAD_COLUMNS
                ),
                &[
                    &req.name.trim(),
                    &trimmed(&req.company),
                    &trimmed(&req.email),
                    &trimmed(&req.phone),
                    &status.as_db_str(),
                    &trimmed(&req.source),
                    &req.estimated_value,
                ],
            )
            .await?;
        let lead = lead_from_row(&row)?;
        info!(lead_id = %lead.id, "Lead created");
        Ok(lead)
    }

    /// Update the given fields of a lead.
    pub async fn lead_update(&self, id: EntityId, req: &UpdateLeadRequest) -> ApiResult<Lead> {
        let conn = self.get_conn().await?;
        let status = req.status.map(|s| s.as_db_str());
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE leads SET \
                     name = COALESCE($2, name), \
                     company = COALESCE($3, company), \
                     email = COALESCE($4, email), \
                     phone = COALESCE($5, phone), \
                     status = COALESCE($6, status), \
                     source = COALESCE($7, source), \
                     estimated_value = COALESCE($8, estimated_value), \
                     updated_at = NOW() \
                     WHERE id = $1 RETURNING {}",
                    LEAD_COLUMNS
                ),
                &[
                    &id,
                    &trimmed(&req.name),
                    &trimmed(&req.company),
                    &trimmed(&req.email),
                    &trimmed(&req.phone),
                    &status,
                    &trimmed(&req.source),
                    &req.estimated_value,
                ],
            )
            .await?
            .ok_or_else(|| not_found("Lead", id))?;
        lead_from_row(&row)
    }

    /// Delete a lead. Notes go with it; tasks, activities and logs block it.
    pub async fn lead_delete(&self, id: EntityId) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM leads WHERE id = $1", &[&id])
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
                    debug!(lead_id = %id, "Lead delete blocked by dependents");
                    ApiError::business_rule(MSG_LEAD_HAS_DEPENDENTS)
                } else {
                    ApiError::from(e)
                }
            })?;
        if deleted == 0 {
            return Err(not_found("Lead", id));
        }
        info!(lead_id = %id, "Lead deleted");
        Ok(())
    }

    // ========================================================================
    // TASK OPERATIONS
    // ========================================================================

    /// All tasks with lead name and comment/attachment counts, in board order.
    pub async fn task_list_with_counts(&self) -> ApiResult<Vec<TaskSummary>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!("{} {}", TASK_SUMMARY_SELECT, TASK_SUMMARY_ORDER),
                &[],
            )
            .await?;
        map_rows(&rows, task_summary_from_row)
    }

    pub async fn task_get(&self, id: EntityId) -> ApiResult<Task> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS),
                &[&id],
            )
            .await?
            .ok_or_else(|| not_found("Tarefa", id))?;
        task_from_row(&row)
    }

    /// Create a task. Without an explicit `sort_order` it goes to the end of
    /// its status column.
    pub async fn task_create(&self, req: &CreateTaskRequest) -> ApiResult<Task> {
        let due_date = req.parsed_due_date()?;
        let status = req.status.unwrap_or_default();
        let progress = if status == TaskStatus::Completed {
            leadflow_core::PROGRESS_MAX
        } else {
            req.progress.unwrap_or(leadflow_core::PROGRESS_MIN)
        };
        let priority = req.priority.unwrap_or_default();

        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO tasks (lead_id, title, description, status, priority, progress, \
                     sort_order, due_date, assigned_to, completed_at) \
                     VALUES ($1, $2, $3, $4::varchar, $5, $6, \
                     COALESCE($7, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM tasks \
                                   WHERE status = $4::varchar)), \
                     $8, $9, CASE WHEN $4::varchar = 'completed' THEN NOW() END) \
                     RETURNING {}",
                    TASK_COLUMNS
                ),
                &[
                    &req.lead_id,
                    &req.title.trim(),
                    &trimmed(&req.description),
                    &status.as_db_str(),
                    &priority.as_db_str(),
                    &progress,
                    &req.sort_order,
                    &due_date,
                    &trimmed(&req.assigned_to),
                ],
            )
            .await?;
        let task = task_from_row(&row)?;
        info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    /// Update the given fields of a task.
    ///
    /// Moving to `completed` stamps `completed_at` and sets progress to 100;
    /// moving anywhere else clears `completed_at`.
    pub async fn task_update(&self, id: EntityId, req: &UpdateTaskRequest) -> ApiResult<Task> {
        let (due_date_set, due_date) = match req.due_date_change()? {
            DueDateChange::Keep => (false, None),
            DueDateChange::Clear => (true, None),
            DueDateChange::Set(date) => (true, Some(date)),
        };
        let status = req.status.map(|s| s.as_db_str());
        let priority = req.priority.map(|p| p.as_db_str());

        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE tasks SET \
                     lead_id = COALESCE($2, lead_id), \
                     title = COALESCE($3, title), \
                     description = COALESCE($4, description), \
                     status = COALESCE($5::varchar, status), \
                     priority = COALESCE($6, priority), \
                     progress = CASE WHEN $5::varchar = 'completed' THEN 100 \
                                     ELSE COALESCE($7, progress) END, \
                     sort_order = COALESCE($8, sort_order), \
                     due_date = CASE WHEN $9 THEN $10::date ELSE due_date END, \
                     assigned_to = COALESCE($11, assigned_to), \
                     completed_at = CASE WHEN $5::varchar IS NULL THEN completed_at \
                                         WHEN $5::varchar = 'completed' THEN COALESCE(completed_at, NOW()) \
                                         ELSE NULL END, \
                     updated_at = NOW() \
                     WHERE id = $1 RETURNING {}",
                    TASK_COLUMNS
                ),
                &[
                    &id,
                    &req.lead_id,
                    &trimmed(&req.title),
                    &trimmed(&req.description),
                    &status,
                    &priority,
                    &req.progress,
                    &req.sort_order,
                    &due_date_set,
                    &due_date,
                    &trimmed(&req.assigned_to),
                ],
            )
            .await?
            .ok_or_else(|| not_found("Tarefa", id))?;
        task_from_row(&row)
    }

    /// Move a task to another status column.
    pub async fn task_update_status(&self, id: EntityId, status: TaskStatus) -> ApiResult<Task> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE tasks SET \
                     status = $2::varchar, \
                     progress = CASE WHEN $2::varchar = 'completed' THEN 100 ELSE progress END, \
                     completed_at = CASE WHEN $2::varchar = 'completed' \
                                         THEN COALESCE(completed_at, NOW()) ELSE NULL END, \
                     updated_at = NOW() \
                     WHERE id = $1 RETURNING {}",
                    TASK_COLUMNS
                ),
                &[&id, &status.as_db_str()],
            )
            .await?
            .ok_or_else(|| not_found("Tarefa", id))?;
        task_from_row(&row)
    }

    pub async fn task_update_progress(&self, id: EntityId, progress: i32) -> ApiResult<Task> {
        let progress = leadflow_core::validate_progress(progress)?;
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE tasks SET progress = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
                    TASK_COLUMNS
                ),
                &[&id, &progress],
            )
            .await?
            .ok_or_else(|| not_found("Tarefa", id))?;
        task_from_row(&row)
    }

    pub async fn task_update_order(&self, id: EntityId, sort_order: i32) -> ApiResult<Task> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE tasks SET sort_order = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
                    TASK_COLUMNS
                ),
                &[&id, &sort_order],
            )
            .await?
            .ok_or_else(|| not_found("Tarefa", id))?;
        task_from_row(&row)
    }

    /// Delete a task with its comments and attachments.
    ///
    /// Refused while activities are scheduled against it.
    pub async fn task_delete(&self, id: EntityId) -> ApiResult<()> {
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await?;

        let exists = tx
            .query_opt("SELECT 1 FROM tasks WHERE id = $1 FOR UPDATE", &[&id])
            .await?
            .is_some();
        if !exists {
            return Err(not_found("Tarefa", id));
        }

        let activities: i64 = tx
            .query_one("SELECT COUNT(*) FROM activities WHERE task_id = $1", &[&id])
            .await?
            .try_get(0)?;
        if activities > 0 {
            return Err(DomainError::HasDependents {
                entity: "Tarefa",
                id,
                dependents: "atividade(s) vinculada(s)",
                count: activities,
            }
            .into());
        }

        tx.execute("DELETE FROM tasks WHERE id = $1", &[&id]).await?;
        tx.commit().await?;
        info!(task_id = %id, "Task deleted");
        Ok(())
    }

    /// Tasks matching every given filter, in board order.
    pub async fn task_list_filtered(&self, filter: &TaskFilter) -> ApiResult<Vec<TaskSummary>> {
        let status = filter.status.map(|s| s.as_db_str());
        let priority = filter.priority.map(|p| p.as_db_str());
        let assigned_to = trimmed(&filter.assigned_to).filter(|s| !s.is_empty());
        let search = trimmed(&filter.search)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(status) = &status {
            params.push(status);
            clauses.push(format!("t.status = ${}", params.len()));
        }
        if let Some(priority) = &priority {
            params.push(priority);
            clauses.push(format!("t.priority = ${}", params.len()));
        }
        if let Some(lead_id) = &filter.lead_id {
            params.push(lead_id);
            clauses.push(format!("t.lead_id = ${}", params.len()));
        }
        if let Some(assigned_to) = &assigned_to {
            params.push(assigned_to);
            clauses.push(format!("t.assigned_to = ${}", params.len()));
        }
        if let Some(search) = &search {
            params.push(search);
            clauses.push(format!(
                "(t.title ILIKE ${n} OR t.description ILIKE ${n})",
                n = params.len()
            ));
        }
        if filter.overdue == Some(true) {
            clauses.push(
                "(t.due_date < CURRENT_DATE AND t.status NOT IN ('completed', 'cancelled'))"
                    .to_string(),
            );
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!("{} {} {}", TASK_SUMMARY_SELECT, where_clause, TASK_SUMMARY_ORDER),
                &params,
            )
            .await?;
        map_rows(&rows, task_summary_from_row)
    }

    async fn ensure_task_exists(
        conn: &deadpool_postgres::Object,
        task_id: EntityId,
    ) -> ApiResult<()> {
        conn.query_opt("SELECT 1 FROM tasks WHERE id = $1", &[&task_id])
            .await?
            .map(|_| ())
            .ok_or_else(|| not_found("Tarefa", task_id))
    }

    // ========================================================================
    // TASK COMMENT OPERATIONS
    // ========================================================================

    /// Comments on a task, oldest first.
    pub async fn task_comment_list(&self, task_id: EntityId) -> ApiResult<Vec<TaskComment>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM task_comments WHERE task_id = $1 ORDER BY created_at ASC",
                    COMMENT_COLUMNS
                ),
                &[&task_id],
            )
            .await?;
        map_rows(&rows, comment_from_row)
    }

    pub async fn task_comment_create(
        &self,
        task_id: EntityId,
        req: &CreateTaskCommentRequest,
    ) -> ApiResult<TaskComment> {
        let conn = self.get_conn().await?;
        Self::ensure_task_exists(&conn, task_id).await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO task_comments (task_id, comment, user_id) VALUES ($1, $2, $3) \
                     RETURNING {}",
                    COMMENT_COLUMNS
                ),
                &[&task_id, &req.comment.trim(), &trimmed(&req.user_id)],
            )
            .await?;
        comment_from_row(&row)
    }

    // ========================================================================
    // TASK ATTACHMENT OPERATIONS
    // ========================================================================

    pub async fn task_attachment_list(&self, task_id: EntityId) -> ApiResult<Vec<TaskAttachment>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM task_attachments WHERE task_id = $1 ORDER BY created_at DESC",
                    ATTACHMENT_COLUMNS
                ),
                &[&task_id],
            )
            .await?;
        map_rows(&rows, attachment_from_row)
    }

    pub async fn task_attachment_create(
        &self,
        task_id: EntityId,
        req: &CreateTaskAttachmentRequest,
    ) -> ApiResult<TaskAttachment> {
        let conn = self.get_conn().await?;
        Self::ensure_task_exists(&conn, task_id).await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO task_attachments \
                     (task_id, filename, file_url, file_size, mime_type, uploaded_by) \
                     VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
                    ATTACHMENT_COLUMNS
                ),
                &[
                    &task_id,
                    &req.filename.trim(),
                    &req.file_url.trim(),
                    &req.file_size,
                    &trimmed(&req.mime_type),
                    &trimmed(&req.uploaded_by),
                ],
            )
            .await?;
        attachment_from_row(&row)
    }

    /// Every attachment with its task title, newest first.
    pub async fn attachment_list_all(&self) -> ApiResult<Vec<AttachmentSummary>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                "SELECT a.id, a.task_id, a.filename, a.file_url, a.file_size, a.mime_type, \
                 a.uploaded_by, a.created_at, t.title AS task_title \
                 FROM task_attachments a LEFT JOIN tasks t ON t.id = a.task_id \
                 ORDER BY a.created_at DESC",
                &[],
            )
            .await?;
        rows.iter()
            .map(|row| {
                Ok(AttachmentSummary {
                    attachment: attachment_from_row(row)?,
                    task_title: row.try_get("task_title")?,
                })
            })
            .collect()
    }

    /// Delete an attachment, optionally only if it belongs to `task_id`.
    pub async fn attachment_delete(
        &self,
        id: EntityId,
        task_id: Option<EntityId>,
    ) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM task_attachments WHERE id = $1 AND ($2::uuid IS NULL OR task_id = $2)",
                &[&id, &task_id],
            )
            .await?;
        if deleted == 0 {
            return Err(not_found("Anexo", id));
        }
        Ok(())
    }

    // ========================================================================
    // LOG OPERATIONS
    // ========================================================================

    /// Log entries, newest first.
    pub async fn log_list(&self, filter: &LogFilter) -> ApiResult<Vec<LogEntry>> {
        let action = trimmed(&filter.action).filter(|s| !s.is_empty());
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM logs \
                     WHERE ($1::uuid IS NULL OR lead_id = $1) \
                       AND ($2::varchar IS NULL OR action = $2) \
                     ORDER BY created_at DESC LIMIT $3",
                    LOG_COLUMNS
                ),
                &[&filter.lead_id, &action, &filter.effective_limit()],
            )
            .await?;
        map_rows(&rows, log_from_row)
    }

    pub async fn log_create(&self, req: &CreateLogRequest) -> ApiResult<LogEntry> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO logs (lead_id, action, description, user_name, metadata) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {}",
                    LOG_COLUMNS
                ),
                &[
                    &req.lead_id,
                    &req.action.trim(),
                    &trimmed(&req.description),
                    &trimmed(&req.user_name),
                    &req.metadata,
                ],
            )
            .await?;
        log_from_row(&row)
    }

    // ========================================================================
    // ACTIVITY OPERATIONS
    // ========================================================================

    pub async fn activity_list(&self) -> ApiResult<Vec<Activity>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM activities ORDER BY scheduled_at ASC NULLS LAST, created_at DESC",
                    ACTIVITY_COLUMNS
                ),
                &[],
            )
            .await?;
        map_rows(&rows, activity_from_row)
    }

    pub async fn activity_create(&self, req: &CreateActivityRequest) -> ApiResult<Activity> {
        let scheduled_at = req.parsed_scheduled_at()?;
        let activity_type = req.activity_type.unwrap_or_default();
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO activities \
                     (lead_id, task_id, activity_type, title, description, scheduled_at, completed) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
                    ACTIVITY_COLUMNS
                ),
                &[
                    &req.lead_id,
                    &req.task_id,
                    &activity_type.as_db_str(),
                    &req.title.trim(),
                    &trimmed(&req.description),
                    &scheduled_at,
                    &req.completed,
                ],
            )
            .await?;
        activity_from_row(&row)
    }

    pub async fn activity_update(
        &self,
        id: EntityId,
        req: &UpdateActivityRequest,
    ) -> ApiResult<Activity> {
        let scheduled_at = req.parsed_scheduled_at()?;
        let activity_type = req.activity_type.map(|t| t.as_db_str());
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE activities SET \
                     lead_id = CASE WHEN $2 THEN $3::uuid ELSE lead_id END, \
                     task_id = CASE WHEN $4 THEN $5::uuid ELSE task_id END, \
                     activity_type = COALESCE($6, activity_type), \
                     title = COALESCE($7, title), \
                     description = COALESCE($8, description), \
                     scheduled_at = COALESCE($9, scheduled_at), \
                     completed = COALESCE($10, completed), \
                     updated_at = NOW() \
                     WHERE id = $1 RETURNING {}",
                    ACTIVITY_COLUMNS
                ),
                &[
                    &id,
                    &req.lead_id.is_some(),
                    &req.lead_id.flatten(),
                    &req.task_id.is_some(),
                    &req.task_id.flatten(),
                    &activity_type,
                    &trimmed(&req.title),
                    &trimmed(&req.description),
                    &scheduled_at,
                    &req.completed,
                ],
            )
            .await?
            .ok_or_else(|| not_found("Atividade", id))?;
        activity_from_row(&row)
    }

    pub async fn activity_delete(&self, id: EntityId) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM activities WHERE id = $1", &[&id])
            .await?;
        if deleted == 0 {
            return Err(not_found("Atividade", id));
        }
        Ok(())
    }

    // ========================================================================
    // NOTE OPERATIONS
    // ========================================================================

    pub async fn note_list_by_lead(&self, lead_id: EntityId) -> ApiResult<Vec<Note>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM notes WHERE lead_id = $1 ORDER BY created_at DESC",
                    NOTE_COLUMNS
                ),
                &[&lead_id],
            )
            .await?;
        map_rows(&rows, note_from_row)
    }

    pub async fn note_list_all(&self) -> ApiResult<Vec<Note>> {
        let conn = self.get_conn().await?;
        let rows = conn
            .query(
                &format!("SELECT {} FROM notes ORDER BY created_at DESC", NOTE_COLUMNS),
                &[],
            )
            .await?;
        map_rows(&rows, note_from_row)
    }

    pub async fn note_create(&self, req: &CreateNoteRequest) -> ApiResult<Note> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO notes (lead_id, content, author) VALUES ($1, $2, $3) RETURNING {}",
                    NOTE_COLUMNS
                ),
                &[&req.lead_id, &req.content.trim(), &trimmed(&req.author)],
            )
            .await?;
        note_from_row(&row)
    }

    pub async fn note_delete(&self, id: EntityId) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn.execute("DELETE FROM notes WHERE id = $1", &[&id]).await?;
        if deleted == 0 {
            return Err(not_found("Nota", id));
        }
        Ok(())
    }

    // ========================================================================
    // HEALTH AND ADMIN
    // ========================================================================

    /// Check database connectivity.
    pub async fn health_check(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;

        // Simple query to verify connectivity
        conn.query_one("SELECT 1", &[]).await?;

        Ok(())
    }

    /// Remove every row from the seven keyed tables in one transaction.
    pub async fn reset_database(&self) -> ApiResult<()> {
        let tables: Vec<&str> = KEYED_TABLES.iter().rev().map(|t| t.name).collect();
        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await?;
        tx.batch_execute(&format!("TRUNCATE TABLE {}", tables.join(", ")))
            .await?;
        tx.commit().await?;
        info!(tables = tables.len(), "Database reset");
        Ok(())
    }
}
