//! Scratch databases for integration tests.
//!
//! Each test gets its own PostgreSQL schema, selected through the session
//! `search_path`, so tests can run in parallel against one database. The
//! `uuid-ossp` extension lives in `public`, which stays on the path; the
//! advisory lock serializes its creation between concurrent tests.

use deadpool_postgres::Pool;
use leadflow_api::db::{DbClient, DbConfig};
use leadflow_api::schema;
use leadflow_api::Migrator;
use leadflow_test_utils::fixtures::LEGACY_SEED;

pub struct ScratchDb {
    pub schema: String,
    pub pool: Pool,
    admin: Pool,
}

impl ScratchDb {
    /// An empty schema.
    pub async fn empty() -> ScratchDb {
        let base = DbConfig::from_env();
        let admin = base.create_pool().expect("Failed to create admin pool");
        let schema = format!("lf_test_{}", uuid::Uuid::new_v4().simple());

        let conn = admin.get().await.expect("Failed to connect to test database");
        conn.batch_execute(&format!(
            "BEGIN; \
             SELECT pg_advisory_xact_lock(7301); \
             CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\" WITH SCHEMA public; \
             COMMIT; \
             CREATE SCHEMA {};",
            schema
        ))
        .await
        .expect("Failed to create scratch schema");

        let config = DbConfig {
            options: Some(format!("-c search_path={},public", schema)),
            max_size: 4,
            ..base
        };
        let pool = config.create_pool().expect("Failed to create scratch pool");

        ScratchDb {
            schema,
            pool,
            admin,
        }
    }

    /// Integer-keyed tables filled with the legacy seed.
    pub async fn legacy() -> ScratchDb {
        let scratch = Self::empty().await;
        let conn = scratch.pool.get().await.expect("Failed to connect");
        schema::create_legacy_schema(&conn)
            .await
            .expect("Failed to create legacy tables");
        conn.batch_execute(LEGACY_SEED)
            .await
            .expect("Failed to seed legacy tables");
        scratch
    }

    /// UUID-keyed tables created by the server bootstrap.
    pub async fn bootstrapped() -> ScratchDb {
        let scratch = Self::empty().await;
        scratch
            .db()
            .initialize_schema()
            .await
            .expect("Failed to bootstrap schema");
        scratch
    }

    pub fn db(&self) -> DbClient {
        DbClient::new(self.pool.clone())
    }

    pub fn migrator(&self) -> Migrator {
        Migrator::new(self.pool.clone())
    }

    pub async fn count(&self, table: &str) -> i64 {
        self.scalar(&format!("SELECT COUNT(*) FROM {}", table)).await
    }

    pub async fn scalar(&self, sql: &str) -> i64 {
        let conn = self.pool.get().await.expect("Failed to connect");
        conn.query_one(sql, &[])
            .await
            .expect("Query failed")
            .get(0)
    }

    /// Columns and constraints of the scratch schema, in a stable order.
    pub async fn layout(&self) -> Vec<String> {
        let conn = self.pool.get().await.expect("Failed to connect");
        let columns = conn
            .query(
                "SELECT table_name || '.' || column_name || ' ' || data_type || ' ' || is_nullable \
                 FROM information_schema.columns WHERE table_schema = $1 \
                 ORDER BY table_name, column_name",
                &[&self.schema],
            )
            .await
            .expect("Failed to read columns");
        let constraints = conn
            .query(
                "SELECT table_name || ' ' || constraint_name || ' ' || constraint_type \
                 FROM information_schema.table_constraints WHERE table_schema = $1 \
                   AND constraint_type IN ('PRIMARY KEY', 'FOREIGN KEY', 'UNIQUE') \
                 ORDER BY table_name, constraint_name",
                &[&self.schema],
            )
            .await
            .expect("Failed to read constraints");
        columns
            .iter()
            .chain(constraints.iter())
            .map(|row| row.get::<_, String>(0))
            .collect()
    }

    pub async fn drop(self) {
        self.pool.close();
        let conn = self.admin.get().await.expect("Failed to connect");
        conn.batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .await
            .expect("Failed to drop scratch schema");
    }
}
