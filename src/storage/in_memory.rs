//! In-memory implementation of ExpenseStore for testing and development

use crate::core::error::{BoardResult, StorageError};
use crate::core::{Expense, ExpenseStore};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Records {
    ids: HashSet<i64>,
    /// Insertion order; later entries are newer
    log: Vec<Expense>,
}

/// In-memory expense store
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// the id check and the insert happen under one write lock, which gives the
/// same uniqueness guarantee as a unique index.
#[derive(Clone, Default)]
pub struct InMemoryExpenseStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryExpenseStore {
    /// Create a new in-memory expense store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_error(e: impl std::fmt::Display) -> StorageError {
        StorageError::QueryError {
            backend: "in-memory".to_string(),
            message: format!("Failed to acquire lock: {}", e),
        }
    }
}

#[async_trait]
impl ExpenseStore for InMemoryExpenseStore {
    async fn find_by_id(&self, id: i64) -> BoardResult<Option<Expense>> {
        let records = self.records.read().map_err(Self::lock_error)?;

        if !records.ids.contains(&id) {
            return Ok(None);
        }

        Ok(records.log.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_if_absent(&self, expense: &Expense) -> BoardResult<bool> {
        let mut records = self.records.write().map_err(Self::lock_error)?;

        if !records.ids.insert(expense.id) {
            return Ok(false);
        }

        records.log.push(expense.clone());
        Ok(true)
    }

    async fn find_recent_by_group(
        &self,
        group_id: i64,
        limit: usize,
    ) -> BoardResult<Vec<Expense>> {
        let records = self.records.read().map_err(Self::lock_error)?;

        Ok(records
            .log
            .iter()
            .rev()
            .filter(|e| e.group_id == Some(group_id))
            .take(limit)
            .cloned()
            .collect())
    }
}
