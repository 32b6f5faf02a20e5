//! # ads-db-sqlite
//!
//! SQLite implementation of the `DocumentStore` port. Every collection lives
//! in one `documents` table; bodies are stored as JSON text.

use std::str::FromStr;

use ads_core::traits::{Document, DocumentStore};
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id         TEXT NOT NULL,
    created_at TEXT NOT NULL,
    body       TEXT NOT NULL,
    UNIQUE (collection, id)
)";

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    ///
    /// An in-memory database lives inside a single pooled connection, so the
    /// pool is pinned to one connection that never expires.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid sqlite url: {url}"))?
            .create_if_missing(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open {url}"))?;
        sqlx::query(SCHEMA).execute(&pool).await?;

        info!(url, "sqlite document store ready");
        Ok(Self { pool })
    }

    /// Writes a document under a caller-chosen id, replacing the body of an
    /// existing one. Used for records keyed by an external id (user profiles).
    #[instrument(skip(self, body))]
    pub async fn put(&self, collection: &str, id: &str, body: Value) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO documents (collection, id, created_at, body) VALUES (?, ?, ?, ?)
             ON CONFLICT (collection, id) DO UPDATE SET body = excluded.body",
        )
        .bind(collection)
        .bind(id)
        .bind(Utc::now())
        .bind(body.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_document(row: &SqliteRow) -> anyhow::Result<Document> {
    let id: String = row.try_get("id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let raw: String = row.try_get("body")?;
    let body = serde_json::from_str(&raw).with_context(|| format!("corrupt body for {id}"))?;
    Ok(Document {
        id,
        created_at,
        body,
    })
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    /// Assigns a time-ordered UUID and the server timestamp.
    #[instrument(skip(self, body))]
    async fn create(&self, collection: &str, body: Value) -> anyhow::Result<String> {
        if !body.is_object() {
            bail!("document body must be a JSON object");
        }
        let id = Uuid::now_v7().to_string();

        sqlx::query("INSERT INTO documents (collection, id, created_at, body) VALUES (?, ?, ?, ?)")
            .bind(collection)
            .bind(&id)
            .bind(Utc::now())
            .bind(body.to_string())
            .execute(&self.pool)
            .await?;

        debug!(id = %id, "document inserted");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Option<Document>> {
        let row = sqlx::query("SELECT id, created_at, body FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    /// Newest first.
    async fn list(&self, collection: &str) -> anyhow::Result<Vec<Document>> {
        let rows = sqlx::query("SELECT id, created_at, body FROM documents WHERE collection = ? ORDER BY seq DESC")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_document).collect()
    }

    /// Read-merge-write inside one transaction.
    #[instrument(skip(self, patch))]
    async fn update(&self, collection: &str, id: &str, patch: Value) -> anyhow::Result<()> {
        let Value::Object(fields) = patch else {
            bail!("document patch must be a JSON object");
        };

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| anyhow!("document {collection}/{id} not found"))?;

        let mut body: Value = serde_json::from_str(&row.try_get::<String, _>("body")?)?;
        let target = body
            .as_object_mut()
            .ok_or_else(|| anyhow!("document {collection}/{id} is not an object"))?;
        for (key, value) in fields {
            target.insert(key, value);
        }

        sqlx::query("UPDATE documents SET body = ? WHERE collection = ? AND id = ?")
            .bind(body.to_string())
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
