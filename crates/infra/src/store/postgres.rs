//! Postgres-backed document store.
//!
//! All collections share one table. Document bodies live in a `JSONB` column;
//! identity and timestamps are real columns so ordering by creation time is an
//! index scan rather than a JSON extraction.
//!
//! ## Query translation
//!
//! | Query | SQL |
//! |-------|-----|
//! | `where_eq(f, v)` | `data -> f = v::jsonb` |
//! | `filter(f, Lt, v)` | `jsonb_typeof(data -> f) = jsonb_typeof(v) AND data -> f < v` |
//! | `order_by(f, dir)` | `ORDER BY data -> f dir NULLS LAST` |
//! | `createdAt` / `updatedAt` | mapped to the timestamp columns |
//!
//! Range comparisons only match values of the same JSON type, the same rule
//! the in-memory store applies.
//!
//! ## Change feed
//!
//! Notifications are published in-process after each committed write, so
//! `watch` only observes writes made through this instance.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use aesthetica_core::DocumentId;
use aesthetica_events::{ChangeEvent, ChangeKind, EventBus, InMemoryEventBus, Subscription};

use super::{
    CREATED_AT_FIELD, Document, DocumentStore, FilterOp, ID_FIELD, Query, StoreError,
    StoredDocument, UPDATED_AT_FIELD, strip_reserved,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS catalog_documents (
    collection  TEXT        NOT NULL,
    id          TEXT        NOT NULL,
    data        JSONB       NOT NULL DEFAULT '{}'::jsonb,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (collection, id)
);
CREATE INDEX IF NOT EXISTS catalog_documents_created_idx
    ON catalog_documents (collection, created_at);
"#;

const RETURNING: &str = " RETURNING id, data, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
    bus: Arc<InMemoryEventBus<ChangeEvent>>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            bus: Arc::new(InMemoryEventBus::new()),
        }
    }

    /// Connect and make sure the documents table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    fn announce(&self, collection: &str, doc: &StoredDocument, kind: ChangeKind) {
        let at = match kind {
            ChangeKind::Deleted => Utc::now(),
            _ => doc.updated_at,
        };
        let _ = self
            .bus
            .publish(ChangeEvent::new(collection, doc.id.clone(), kind, at));
    }
}

fn decode_row(row: &PgRow) -> Result<StoredDocument, StoreError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StoreError::Serialization(format!("failed to read id column: {e}")))?;
    let Json(data): Json<JsonValue> = row
        .try_get("data")
        .map_err(|e| StoreError::Serialization(format!("failed to read data column: {e}")))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| StoreError::Serialization(format!("failed to read created_at column: {e}")))?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(|e| StoreError::Serialization(format!("failed to read updated_at column: {e}")))?;

    let id = id
        .parse::<DocumentId>()
        .map_err(|e| StoreError::Serialization(format!("stored id '{id}' is invalid: {e}")))?;
    let JsonValue::Object(data) = data else {
        return Err(StoreError::Serialization(format!(
            "document {id} body is not a JSON object"
        )));
    };

    Ok(StoredDocument {
        id,
        data,
        created_at,
        updated_at,
    })
}

/// Timestamp filters carry microseconds since the epoch.
fn micros_to_datetime(field: &str, value: &JsonValue) -> Result<DateTime<Utc>, StoreError> {
    value
        .as_i64()
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .ok_or_else(|| {
            StoreError::InvalidQuery(format!(
                "filter on '{field}' expects microseconds since the epoch"
            ))
        })
}

fn push_select<'a>(builder: &mut QueryBuilder<'a, Postgres>, collection: &'a str, query: &'a Query) -> Result<(), StoreError> {
    builder.push("SELECT id, data, created_at, updated_at FROM catalog_documents WHERE collection = ");
    builder.push_bind(collection);

    for filter in &query.filters {
        builder.push(" AND ");
        match filter.field.as_str() {
            ID_FIELD => {
                let Some(id) = filter.value.as_str() else {
                    return Err(StoreError::InvalidQuery("id filters take a string".to_string()));
                };
                builder.push("id ");
                builder.push(filter.op.as_sql());
                builder.push(" ");
                builder.push_bind(id);
            }
            column @ (CREATED_AT_FIELD | UPDATED_AT_FIELD) => {
                let at = micros_to_datetime(column, &filter.value)?;
                builder.push(if column == CREATED_AT_FIELD { "created_at " } else { "updated_at " });
                builder.push(filter.op.as_sql());
                builder.push(" ");
                builder.push_bind(at);
            }
            field => {
                if filter.op != FilterOp::Eq {
                    builder.push("jsonb_typeof(data -> ");
                    builder.push_bind(field);
                    builder.push(") = jsonb_typeof(");
                    builder.push_bind(Json(&filter.value));
                    builder.push(") AND ");
                }
                builder.push("data -> ");
                builder.push_bind(field);
                builder.push(" ");
                builder.push(filter.op.as_sql());
                builder.push(" ");
                builder.push_bind(Json(&filter.value));
            }
        }
    }

    builder.push(" ORDER BY ");
    match &query.order_by {
        Some(order) => {
            match order.field.as_str() {
                CREATED_AT_FIELD => {
                    builder.push("created_at");
                }
                UPDATED_AT_FIELD => {
                    builder.push("updated_at");
                }
                ID_FIELD => {
                    builder.push("id");
                }
                field => {
                    builder.push("data -> ");
                    builder.push_bind(field);
                }
            }
            builder.push(" ");
            builder.push(order.direction.as_sql());
            builder.push(" NULLS LAST, created_at ASC");
        }
        None => {
            builder.push("created_at ASC, id ASC");
        }
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, data, created_at, updated_at
            FROM catalog_documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self, query), err)]
    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let mut builder = QueryBuilder::new("");
        push_select(&mut builder, collection, query)?;

        let rows = builder
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("query", e))?;

        rows.iter().map(decode_row).collect()
    }

    #[instrument(skip(self, data), err)]
    async fn insert(&self, collection: &str, mut data: Document) -> Result<StoredDocument, StoreError> {
        strip_reserved(&mut data);
        let id = DocumentId::generate();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO catalog_documents (collection, id, data, created_at, updated_at)
            VALUES ($1, $2, $3, clock_timestamp(), clock_timestamp())
            {RETURNING}
            "#
        ))
        .bind(collection)
        .bind(id.as_str())
        .bind(Json(JsonValue::Object(data)))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        let stored = decode_row(&row)?;
        self.announce(collection, &stored, ChangeKind::Created);
        Ok(stored)
    }

    #[instrument(skip(self, data), fields(id = %id), err)]
    async fn merge(
        &self,
        collection: &str,
        id: &DocumentId,
        mut data: Document,
    ) -> Result<StoredDocument, StoreError> {
        strip_reserved(&mut data);

        let row = sqlx::query(&format!(
            r#"
            UPDATE catalog_documents
            SET data = data || $3,
                updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE collection = $1 AND id = $2
            {RETURNING}
            "#
        ))
        .bind(collection)
        .bind(id.as_str())
        .bind(Json(JsonValue::Object(data)))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("merge", e))?
        .ok_or_else(|| StoreError::not_found(collection, id))?;

        let stored = decode_row(&row)?;
        self.announce(collection, &stored, ChangeKind::Updated);
        Ok(stored)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        delta: i64,
    ) -> Result<StoredDocument, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE catalog_documents
            SET data = jsonb_set(
                    data,
                    ARRAY[$3::text],
                    to_jsonb(COALESCE((data ->> $3)::bigint, 0) + $4)
                ),
                updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE collection = $1 AND id = $2
            {RETURNING}
            "#
        ))
        .bind(collection)
        .bind(id.as_str())
        .bind(field)
        .bind(delta)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("increment", e))?
        .ok_or_else(|| StoreError::not_found(collection, id))?;

        let stored = decode_row(&row)?;
        self.announce(collection, &stored, ChangeKind::Updated);
        Ok(stored)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        let row = sqlx::query(&format!(
            "DELETE FROM catalog_documents WHERE collection = $1 AND id = $2{RETURNING}"
        ))
        .bind(collection)
        .bind(id.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete", e))?
        .ok_or_else(|| StoreError::not_found(collection, id))?;

        let stored = decode_row(&row)?;
        self.announce(collection, &stored, ChangeKind::Deleted);
        Ok(())
    }

    fn watch(&self, collection: &str) -> Subscription<ChangeEvent> {
        let collection = collection.to_string();
        self.bus
            .subscribe()
            .filtered(move |ev: &ChangeEvent| ev.collection() == collection)
    }
}

/// Map SQLx errors to store errors.
///
/// `22P02` (invalid text representation) shows up when an increment targets a
/// non-integer field; everything else is a backend failure.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("22P02") => StoreError::InvalidQuery(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Serialization(format!("decode failed in {}: {}", operation, err))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
