//! Collection-scoped document store.
//!
//! Every record lives as a JSON object in the `documents` table keyed by
//! `(collection, id)`. Queries filter and sort on top-level fields through
//! SQLite's JSON functions. Behaviour follows a hosted document database:
//! `update` merges fields and fails on a missing document, `delete` of a
//! missing document succeeds, and sorting on a field drops documents that
//! do not have it.

use std::sync::Arc;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::query::{validate_field, Direction, Query};
use super::{Database, StoreError};
use crate::models::{Collection, Record};

// ─── Types ────────────────────────────────────────────────────────────────────

/// A stored document: its id plus the JSON body without the id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Map<String, Value>,
}

impl Document {
    /// Decode into a typed record, exposing the document id as `id`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut body = self.body.clone();
        body.insert("id".into(), Value::String(self.id.to_string()));
        Ok(serde_json::from_value(Value::Object(body))?)
    }
}

/// Serialize a write payload into a document body.
pub fn to_body<T: Serialize>(value: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(StoreError::InvalidField(format!(
            "document body must be an object, got {other}"
        ))),
    }
}

// ─── Trait ────────────────────────────────────────────────────────────────────

pub trait DocumentStore: Send + Sync {
    fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, StoreError>;

    fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Insert a new document and return its store-assigned id.
    fn create(&self, collection: Collection, record: Map<String, Value>) -> Result<Uuid, StoreError>;

    /// Create or replace the document with a caller-chosen id.
    fn put(&self, collection: Collection, id: Uuid, record: Map<String, Value>) -> Result<(), StoreError>;

    /// Merge `partial` into an existing document.
    fn update(&self, collection: Collection, id: Uuid, partial: Map<String, Value>) -> Result<(), StoreError>;

    fn delete(&self, collection: Collection, id: Uuid) -> Result<(), StoreError>;
}

/// List and decode records. Documents that fail to decode are logged and
/// skipped so one bad record does not hide the rest of the roster.
pub fn list_records<T: Record>(store: &dyn DocumentStore, query: &Query) -> Result<Vec<T>, StoreError> {
    let documents = store.list(T::COLLECTION, query)?;
    let mut records = Vec::with_capacity(documents.len());
    for doc in &documents {
        match doc.decode::<T>() {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(collection = %T::COLLECTION, id = %doc.id, "Skipping undecodable document: {e}");
            }
        }
    }
    Ok(records)
}

pub fn get_record<T: Record>(store: &dyn DocumentStore, id: Uuid) -> Result<Option<T>, StoreError> {
    get_record_in(store, T::COLLECTION, id)
}

/// Fetch and decode a document that is not a doctor-owned record.
pub fn get_record_in<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    id: Uuid,
) -> Result<Option<T>, StoreError> {
    match store.get(collection, id)? {
        Some(doc) => Ok(Some(doc.decode()?)),
        None => Ok(None),
    }
}

// ─── SQLite implementation ────────────────────────────────────────────────────

pub struct SqliteDocumentStore {
    db: Arc<Database>,
}

impl SqliteDocumentStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// A store over a fresh in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(Arc::new(Database::open_in_memory()?)))
    }
}

fn to_sql_value(value: &Value) -> Result<SqlValue, StoreError> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => {
            return Err(StoreError::InvalidField(format!("cannot filter on composite value {value}")))
        }
    })
}

fn select_sql(collection: Collection, query: &Query) -> Result<(String, Vec<SqlValue>), StoreError> {
    let mut sql = String::from("SELECT id, body FROM documents WHERE collection = ?1");
    let mut values = vec![SqlValue::Text(collection.as_str().to_string())];

    for filter in &query.filters {
        validate_field(&filter.field)?;
        values.push(to_sql_value(&filter.value)?);
        sql.push_str(&format!(
            " AND json_extract(body, '$.{}') {} ?{}",
            filter.field,
            filter.op.sql(),
            values.len()
        ));
    }

    let mut order = Vec::with_capacity(query.order_by.len() + 1);
    for key in &query.order_by {
        validate_field(&key.field)?;
        sql.push_str(&format!(" AND json_type(body, '$.{}') IS NOT NULL", key.field));
        let dir = match key.direction {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        };
        order.push(format!("json_extract(body, '$.{}') {dir}", key.field));
    }
    order.push("rowid ASC".to_string());
    sql.push_str(" ORDER BY ");
    sql.push_str(&order.join(", "));

    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    Ok((sql, values))
}

fn parse_body(collection: Collection, id: &str, body: &str) -> Result<Map<String, Value>, StoreError> {
    serde_json::from_str(body).map_err(|_| StoreError::CorruptDocument {
        collection: collection.to_string(),
        id: id.to_string(),
    })
}

fn parse_id(collection: Collection, id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::CorruptDocument {
        collection: collection.to_string(),
        id: id.to_string(),
    })
}

impl DocumentStore for SqliteDocumentStore {
    fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, StoreError> {
        let (sql, values) = select_sql(collection, query)?;
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, body) = row?;
            let parsed = parse_id(collection, &id)
                .and_then(|doc_id| Ok(Document { id: doc_id, body: parse_body(collection, &id, &body)? }));
            match parsed {
                Ok(doc) => documents.push(doc),
                Err(e) => tracing::warn!(%collection, %id, "Skipping corrupt document: {e}"),
            }
        }
        tracing::debug!(%collection, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, StoreError> {
        let conn = self.db.lock()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(b) => Ok(Some(Document {
                id,
                body: parse_body(collection, &id.to_string(), &b)?,
            })),
            None => Ok(None),
        }
    }

    fn create(&self, collection: Collection, mut record: Map<String, Value>) -> Result<Uuid, StoreError> {
        record.remove("id");
        let id = Uuid::new_v4();
        let body = serde_json::to_string(&record)?;
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)",
            params![collection.as_str(), id.to_string(), body],
        )?;
        tracing::debug!(%collection, %id, "Document created");
        Ok(id)
    }

    fn put(&self, collection: Collection, id: Uuid, mut record: Map<String, Value>) -> Result<(), StoreError> {
        record.remove("id");
        let body = serde_json::to_string(&record)?;
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, id) DO UPDATE SET body = excluded.body",
            params![collection.as_str(), id.to_string(), body],
        )?;
        Ok(())
    }

    fn update(&self, collection: Collection, id: Uuid, partial: Map<String, Value>) -> Result<(), StoreError> {
        let conn = self.db.lock()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(existing) = existing else {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };

        let mut body = parse_body(collection, &id.to_string(), &existing)?;
        for (key, value) in partial {
            if key != "id" {
                body.insert(key, value);
            }
        }

        conn.execute(
            "UPDATE documents SET body = ?1 WHERE collection = ?2 AND id = ?3",
            params![serde_json::to_string(&body)?, collection.as_str(), id.to_string()],
        )?;
        tracing::debug!(%collection, %id, "Document updated");
        Ok(())
    }

    fn delete(&self, collection: Collection, id: Uuid) -> Result<(), StoreError> {
        let conn = self.db.lock()?;
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id.to_string()],
        )?;
        tracing::debug!(%collection, %id, removed, "Document deleted");
        Ok(())
    }
}
