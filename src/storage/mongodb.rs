//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoExpenseStore`, an `ExpenseStore` backed by a single
//! `expenses` collection.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag.
//!
//! # Storage model
//!
//! The upstream expense id is stored as `_id`, so MongoDB's primary key
//! index is the uniqueness guarantee behind `insert_if_absent`: a losing
//! concurrent insert fails with a duplicate-key error (code 11000), which is
//! reported as `Ok(false)`.
//!
//! Each document also carries a `synced_at` timestamp and an `insert_seq`
//! counter set at insert time. Timestamps only have millisecond precision,
//! so records of one batch usually share one; `insert_seq` is strictly
//! increasing within the process and breaks those ties. Together they order
//! `find_recent_by_group` by insertion, and both are stripped before the
//! document is handed back as an `Expense`.
//!
//! # Connection
//!
//! The connection is created lazily by [`MongoExpenseStore::ensure_connected`],
//! which every data call goes through. It is idempotent and safe to race:
//! concurrent first callers share one initialisation. Indexes are created as
//! part of it.

use crate::core::error::{BoardResult, StorageError};
use crate::core::{Expense, ExpenseStore};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, Document, doc};
use mongodb::{Client, Database, IndexModel};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::OnceCell;

const BACKEND: &str = "MongoDB";
const COLLECTION: &str = "expenses";
const SYNCED_AT: &str = "synced_at";
const INSERT_SEQ: &str = "insert_seq";

/// Tie-breaker for inserts landing in the same millisecond
static NEXT_INSERT_SEQ: AtomicI64 = AtomicI64::new(0);
const DUPLICATE_KEY: i32 = 11000;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

fn query_error(message: String) -> StorageError {
    StorageError::QueryError {
        backend: BACKEND.to_string(),
        message,
    }
}

/// Convert a serde_json::Value (expected to be an Object) into a BSON Document,
/// renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: serde_json::Value) -> Result<Document, StorageError> {
    let bson_val = bson::to_bson(&json)
        .map_err(|e| query_error(format!("Failed to convert JSON to BSON: {}", e)))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(query_error("Expected BSON document, got non-object".to_string())),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value, renaming `_id` → `id`
/// and dropping storage-only fields.
fn document_to_json(mut doc: Document) -> serde_json::Value {
    doc.remove(SYNCED_AT);
    doc.remove(INSERT_SEQ);

    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

fn expense_to_document(expense: &Expense) -> Result<Document, StorageError> {
    let json = serde_json::to_value(expense)
        .map_err(|e| query_error(format!("Failed to serialize expense: {}", e)))?;
    let mut doc = json_to_document(json)?;
    doc.insert(SYNCED_AT, bson::DateTime::now());
    doc.insert(INSERT_SEQ, NEXT_INSERT_SEQ.fetch_add(1, Ordering::SeqCst));
    Ok(doc)
}

fn document_to_expense(doc: Document) -> Result<Expense, StorageError> {
    serde_json::from_value(document_to_json(doc))
        .map_err(|e| query_error(format!("Failed to deserialize expense: {}", e)))
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// MongoExpenseStore
// ---------------------------------------------------------------------------

struct Connection {
    client: Client,
    database: Database,
}

/// Expense store backed by MongoDB.
///
/// Cloning is cheap and clones share one lazily created connection.
///
/// # Example
///
/// ```rust,ignore
/// use split_board::storage::MongoExpenseStore;
///
/// let store = MongoExpenseStore::new("mongodb://localhost:27017", "expense-tracker");
/// store.ensure_connected().await?;
/// let inserted = store.insert_if_absent(&expense).await?;
/// ```
#[derive(Clone)]
pub struct MongoExpenseStore {
    uri: String,
    database_name: String,
    connection: Arc<OnceCell<Connection>>,
}

impl MongoExpenseStore {
    /// Create a store for the given connection string. Nothing is contacted
    /// until the first data call.
    ///
    /// A database named in the URI path takes precedence over
    /// `database_name`.
    pub fn new(uri: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database_name: database_name.into(),
            connection: Arc::new(OnceCell::new()),
        }
    }

    /// Whether a connection has been established
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Connect and create indexes, once per process
    ///
    /// A failed attempt leaves the store unconnected, so the next call tries
    /// again.
    pub async fn ensure_connected(&self) -> BoardResult<Database> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                let client = Client::with_uri_str(&self.uri).await.map_err(|e| {
                    StorageError::ConnectionError {
                        backend: BACKEND.to_string(),
                        message: e.to_string(),
                    }
                })?;

                let database = client
                    .default_database()
                    .unwrap_or_else(|| client.database(&self.database_name));

                Self::ensure_indexes(&database).await?;

                tracing::info!(database = %database.name(), "MongoDB connected");
                Ok::<_, StorageError>(Connection { client, database })
            })
            .await?;

        Ok(connection.database.clone())
    }

    /// Close the connection if one was opened
    pub async fn shutdown(&self) {
        if let Some(connection) = self.connection.get() {
            connection.client.clone().shutdown().await;
            tracing::info!("MongoDB disconnected");
        }
    }

    /// Create secondary indexes on the expenses collection
    ///
    /// - `group_id: 1` - group filters
    /// - `date: 1` - date range scans
    /// - `group_id: 1, synced_at: -1, insert_seq: -1` - "most recent for a group"
    ///
    /// `_id` already carries the unique constraint. Idempotent.
    async fn ensure_indexes(database: &Database) -> Result<(), StorageError> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "group_id": 1 }).build(),
            IndexModel::builder().keys(doc! { "date": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "group_id": 1, SYNCED_AT: -1, INSERT_SEQ: -1 })
                .build(),
        ];

        database
            .collection::<Document>(COLLECTION)
            .create_indexes(indexes)
            .await
            .map_err(|e| {
                query_error(format!(
                    "Failed to create indexes on expenses collection: {}",
                    e
                ))
            })?;

        Ok(())
    }

    async fn collection(&self) -> BoardResult<mongodb::Collection<Document>> {
        Ok(self.ensure_connected().await?.collection(COLLECTION))
    }
}

#[async_trait]
impl ExpenseStore for MongoExpenseStore {
    async fn find_by_id(&self, id: i64) -> BoardResult<Option<Expense>> {
        let doc = self
            .collection()
            .await?
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| query_error(format!("Failed to get expense: {}", e)))?;

        match doc {
            Some(d) => Ok(Some(document_to_expense(d)?)),
            None => Ok(None),
        }
    }

    async fn insert_if_absent(&self, expense: &Expense) -> BoardResult<bool> {
        let doc = expense_to_document(expense)?;

        match self.collection().await?.insert_one(doc).await {
            Ok(_) => Ok(true),
            Err(e) if is_duplicate_key(&e) => Ok(false),
            Err(e) => Err(query_error(format!("Failed to insert expense: {}", e)).into()),
        }
    }

    async fn find_recent_by_group(
        &self,
        group_id: i64,
        limit: usize,
    ) -> BoardResult<Vec<Expense>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection()
            .await?
            .find(doc! { "group_id": group_id })
            .sort(doc! { SYNCED_AT: -1, INSERT_SEQ: -1 })
            .limit(limit as i64)
            .await
            .map_err(|e| query_error(format!("Failed to list expenses: {}", e)))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| query_error(format!("Failed to collect expenses: {}", e)))?;

        docs.into_iter()
            .map(|d| document_to_expense(d).map_err(Into::into))
            .collect()
    }
}
