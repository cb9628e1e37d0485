//! Schema Bootstrap
//!
//! DDL for fresh installations (UUID keys) and for the integer-keyed layout
//! that predates the key migration. The server only ever runs against the
//! UUID layout; the legacy DDL exists so operators and tests can stand up a
//! pre-migration database.

use deadpool_postgres::GenericClient;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// DDL
// ============================================================================

/// Current layout. Constraint names match what the key migration leaves
/// behind, so a migrated database and a fresh one are indistinguishable to
/// the application.
pub const UUID_SCHEMA: &str = r#"
CREATE EXTENSION IF NOT EXISTS "uuid-ossp";

CREATE TABLE IF NOT EXISTS leads (
    id UUID DEFAULT uuid_generate_v4(),
    name VARCHAR(255) NOT NULL,
    company VARCHAR(255),
    email VARCHAR(255),
    phone VARCHAR(50),
    status VARCHAR(50) NOT NULL DEFAULT 'new',
    source VARCHAR(100),
    estimated_value DOUBLE PRECISION,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT leads_pkey PRIMARY KEY (id)
);

CREATE TABLE IF NOT EXISTS tasks (
    id UUID DEFAULT uuid_generate_v4(),
    lead_id UUID,
    title VARCHAR(255) NOT NULL,
    description TEXT,
    status VARCHAR(50) NOT NULL DEFAULT 'pending',
    priority VARCHAR(20) NOT NULL DEFAULT 'medium',
    progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
    sort_order INTEGER NOT NULL DEFAULT 0,
    due_date DATE,
    assigned_to VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    completed_at TIMESTAMPTZ,
    CONSTRAINT tasks_pkey PRIMARY KEY (id),
    CONSTRAINT tasks_lead_uuid_id_fkey FOREIGN KEY (lead_id) REFERENCES leads(id)
);

CREATE TABLE IF NOT EXISTS activities (
    id UUID DEFAULT uuid_generate_v4(),
    lead_id UUID,
    activity_type VARCHAR(50) NOT NULL DEFAULT 'other',
    title VARCHAR(255) NOT NULL,
    description TEXT,
    scheduled_at TIMESTAMPTZ,
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT activities_pkey PRIMARY KEY (id),
    CONSTRAINT activities_lead_uuid_id_fkey FOREIGN KEY (lead_id) REFERENCES leads(id)
);

CREATE TABLE IF NOT EXISTS logs (
    id UUID DEFAULT uuid_generate_v4(),
    lead_id UUID,
    action VARCHAR(100) NOT NULL,
    description TEXT,
    user_name VARCHAR(255),
    metadata JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT logs_pkey PRIMARY KEY (id),
    CONSTRAINT logs_lead_uuid_id_fkey FOREIGN KEY (lead_id) REFERENCES leads(id)
);

CREATE TABLE IF NOT EXISTS notes (
    id UUID DEFAULT uuid_generate_v4(),
    lead_id UUID NOT NULL,
    content TEXT NOT NULL,
    author VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT notes_pkey PRIMARY KEY (id),
    CONSTRAINT notes_lead_uuid_id_fkey FOREIGN KEY (lead_id) REFERENCES leads(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS task_comments (
    id UUID DEFAULT uuid_generate_v4(),
    task_id UUID NOT NULL,
    comment TEXT NOT NULL,
    user_id VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT task_comments_pkey PRIMARY KEY (id),
    CONSTRAINT task_comments_task_uuid_id_fkey FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS task_attachments (
    id UUID DEFAULT uuid_generate_v4(),
    task_id UUID NOT NULL,
    filename VARCHAR(255) NOT NULL,
    file_url TEXT NOT NULL,
    file_size BIGINT,
    mime_type VARCHAR(100),
    uploaded_by VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT task_attachments_pkey PRIMARY KEY (id),
    CONSTRAINT task_attachments_task_uuid_id_fkey FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
);
"#;

/// Columns that exist only in the UUID layout. Applied on every startup so
/// that a freshly migrated database picks them up.
pub const UUID_SUPPLEMENT: &str = r#"
ALTER TABLE activities ADD COLUMN IF NOT EXISTS task_id UUID;

DO $$
BEGIN
    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint
        WHERE conname = 'activities_task_id_fkey'
          AND conrelid = 'activities'::regclass
    ) THEN
        ALTER TABLE activities
            ADD CONSTRAINT activities_task_id_fkey FOREIGN KEY (task_id) REFERENCES tasks(id);
    END IF;
END
$$;

CREATE INDEX IF NOT EXISTS idx_tasks_lead_id ON tasks(lead_id);
CREATE INDEX IF NOT EXISTS idx_tasks_status_order ON tasks(status, sort_order);
CREATE INDEX IF NOT EXISTS idx_activities_task_id ON activities(task_id);
CREATE INDEX IF NOT EXISTS idx_notes_lead_id ON notes(lead_id);
CREATE INDEX IF NOT EXISTS idx_logs_created_at ON logs(created_at DESC);
"#;

/// Columns added to the UUID layout by [`UUID_SUPPLEMENT`], as
/// `(table, column)`. The rollback drops these before restoring integer keys.
pub const SUPPLEMENTARY_COLUMNS: [(&str, &str); 1] = [("activities", "task_id")];

/// Integer-keyed layout as it existed before the key migration. Constraint
/// names are PostgreSQL's generated defaults (`<table>_pkey`,
/// `<table>_<column>_fkey`), which the migration relies on.
pub const LEGACY_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS leads (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    company VARCHAR(255),
    email VARCHAR(255),
    phone VARCHAR(50),
    status VARCHAR(50) NOT NULL DEFAULT 'new',
    source VARCHAR(100),
    estimated_value DOUBLE PRECISION,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS tasks (
    id SERIAL PRIMARY KEY,
    lead_id INTEGER REFERENCES leads(id),
    title VARCHAR(255) NOT NULL,
    description TEXT,
    status VARCHAR(50) NOT NULL DEFAULT 'pending',
    priority VARCHAR(20) NOT NULL DEFAULT 'medium',
    progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
    sort_order INTEGER NOT NULL DEFAULT 0,
    due_date DATE,
    assigned_to VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    completed_at TIMESTAMPTZ
);

CREATE TABLE IF NOT EXISTS activities (
    id SERIAL PRIMARY KEY,
    lead_id INTEGER REFERENCES leads(id),
    activity_type VARCHAR(50) NOT NULL DEFAULT 'other',
    title VARCHAR(255) NOT NULL,
    description TEXT,
    scheduled_at TIMESTAMPTZ,
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS logs (
    id SERIAL PRIMARY KEY,
    lead_id INTEGER REFERENCES leads(id),
    action VARCHAR(100) NOT NULL,
    description TEXT,
    user_name VARCHAR(255),
    metadata JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS notes (
    id SERIAL PRIMARY KEY,
    lead_id INTEGER REFERENCES leads(id),
    content TEXT NOT NULL,
    author VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS task_comments (
    id SERIAL PRIMARY KEY,
    task_id INTEGER REFERENCES tasks(id),
    comment TEXT NOT NULL,
    user_id VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS task_attachments (
    id SERIAL PRIMARY KEY,
    task_id INTEGER REFERENCES tasks(id),
    filename VARCHAR(255) NOT NULL,
    file_url TEXT NOT NULL,
    file_size BIGINT,
    mime_type VARCHAR(100),
    uploaded_by VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

// ============================================================================
// INSPECTION
// ============================================================================

/// Key type of the `leads.id` column, which decides the layout of the whole
/// database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// No `leads` table in the current schema.
    Missing,
    /// Integer keys, key migration not applied.
    Integer,
    /// UUID keys.
    Uuid,
    /// Anything else; the database was changed by hand.
    Unknown,
}

/// Data type of a column in the current schema, as reported by
/// `information_schema.columns.data_type`.
pub async fn column_type<C>(
    client: &C,
    table: &str,
    column: &str,
) -> Result<Option<String>, tokio_postgres::Error>
where
    C: GenericClient + Sync,
{
    let row = client
        .query_opt(
            "SELECT data_type::text FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2",
            &[&table, &column],
        )
        .await?;
    Ok(row.map(|r| r.get(0)))
}

/// Detect the key layout from `leads.id`.
pub async fn detect_key_shape<C>(client: &C) -> Result<KeyShape, tokio_postgres::Error>
where
    C: GenericClient + Sync,
{
    let shape = match column_type(client, "leads", "id").await?.as_deref() {
        None => KeyShape::Missing,
        Some("integer") | Some("bigint") => KeyShape::Integer,
        Some("uuid") => KeyShape::Uuid,
        Some(other) => {
            warn!(data_type = other, "Unexpected type for leads.id");
            KeyShape::Unknown
        }
    };
    Ok(shape)
}

// ============================================================================
// BOOTSTRAP
// ============================================================================

/// Create or complete the UUID layout.
///
/// A database still on integer keys is refused: the application cannot run
/// against it until `leadflow-migrate migrate` has been applied.
pub async fn initialize<C>(client: &C) -> ApiResult<()>
where
    C: GenericClient + Sync,
{
    match detect_key_shape(client).await? {
        KeyShape::Integer => {
            return Err(ApiError::service_unavailable(
                "Database uses integer keys; run `leadflow-migrate migrate` first",
            ));
        }
        KeyShape::Unknown => {
            return Err(ApiError::service_unavailable(
                "Unrecognised key type on leads.id",
            ));
        }
        KeyShape::Missing => {
            info!("Creating database schema");
            client.batch_execute(UUID_SCHEMA).await?;
        }
        KeyShape::Uuid => {
            // Tables may still be missing if a previous bootstrap was interrupted.
            client.batch_execute(UUID_SCHEMA).await?;
        }
    }
    client.batch_execute(UUID_SUPPLEMENT).await?;
    info!("Database schema ready");
    Ok(())
}

/// Create the integer-keyed layout.
pub async fn create_legacy_schema<C>(client: &C) -> ApiResult<()>
where
    C: GenericClient + Sync,
{
    client.batch_execute(LEGACY_SCHEMA).await?;
    Ok(())
}
