//! Fetch / deduplicate / persist / notify
//!
//! [`ExpenseSync::sync`] pulls the latest page of a group's expenses,
//! stores the ones whose id the store has never seen, and sends one message
//! describing them.
//!
//! # Failure policy
//!
//! - An upstream failure aborts the sync before anything is written.
//! - A store failure on one expense is logged and that expense is recorded
//!   in [`SyncReport::failed`]; the rest of the batch is still processed.
//!   The failed expense gets no notification and is picked up again by the
//!   next sync since it was never stored.
//! - A notification failure is logged and otherwise ignored. Stored records
//!   stay stored.
//!
//! Nothing is retried within a sync.

pub mod message;

use crate::core::error::BoardResult;
use crate::core::{Expense, ExpenseStore, NotificationSink, UpstreamClient};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub use message::{format_expense, join_blocks};

/// What one sync did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub group_id: i64,

    /// When the upstream page was fetched
    pub synced_at: DateTime<Utc>,

    /// Expenses returned by upstream
    pub fetched: usize,

    /// Newly stored ids, in upstream order
    pub inserted: Vec<i64>,

    /// Ids that were already stored (including lost insert races)
    pub skipped: Vec<i64>,

    /// Ids whose lookup or insert failed
    pub failed: Vec<i64>,

    /// Whether the message for the new expenses was delivered
    pub notified: bool,
}

/// Sync settings
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// How many of the latest upstream expenses to look at
    pub page_size: usize,

    /// Footer link of each notification block
    pub dashboard_url: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            dashboard_url: String::new(),
        }
    }
}

enum Outcome {
    Inserted,
    Skipped,
}

/// The sync routine and its collaborators
#[derive(Clone)]
pub struct ExpenseSync {
    upstream: Arc<dyn UpstreamClient>,
    store: Arc<dyn ExpenseStore>,
    sink: Arc<dyn NotificationSink>,
    options: SyncOptions,
}

impl ExpenseSync {
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        store: Arc<dyn ExpenseStore>,
        sink: Arc<dyn NotificationSink>,
        options: SyncOptions,
    ) -> Self {
        Self {
            upstream,
            store,
            sink,
            options,
        }
    }

    pub fn store(&self) -> &Arc<dyn ExpenseStore> {
        &self.store
    }

    pub fn upstream(&self) -> &Arc<dyn UpstreamClient> {
        &self.upstream
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run one sync for `group_id`
    ///
    /// Only an upstream (or upstream configuration) failure is returned as
    /// an error; see the module docs for the rest.
    pub async fn sync(&self, group_id: i64) -> BoardResult<SyncReport> {
        let expenses = self
            .upstream
            .fetch_expenses(group_id, self.options.page_size)
            .await?;

        let mut report = SyncReport {
            group_id,
            synced_at: Utc::now(),
            fetched: expenses.len(),
            ..SyncReport::default()
        };
        let mut blocks = Vec::new();

        for expense in &expenses {
            match self.process(expense).await {
                Ok(Outcome::Inserted) => {
                    blocks.push(format_expense(expense, &self.options.dashboard_url));
                    report.inserted.push(expense.id);
                }
                Ok(Outcome::Skipped) => {
                    tracing::debug!(expense_id = expense.id, "Expense already stored, skipping");
                    report.skipped.push(expense.id);
                }
                Err(e) => {
                    tracing::warn!(
                        group_id,
                        expense_id = expense.id,
                        error = %e,
                        "Failed to store expense, continuing with batch"
                    );
                    report.failed.push(expense.id);
                }
            }
        }

        if !blocks.is_empty() {
            report.notified = self.notify(group_id, &join_blocks(&blocks)).await;
        }

        tracing::info!(
            group_id,
            fetched = report.fetched,
            inserted = report.inserted.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            notified = report.notified,
            "Expense sync complete"
        );

        Ok(report)
    }

    async fn process(&self, expense: &Expense) -> BoardResult<Outcome> {
        if self.store.find_by_id(expense.id).await?.is_some() {
            return Ok(Outcome::Skipped);
        }

        // A concurrent sync may have stored it since the lookup
        if self.store.insert_if_absent(expense).await? {
            Ok(Outcome::Inserted)
        } else {
            Ok(Outcome::Skipped)
        }
    }

    async fn notify(&self, group_id: i64, text: &str) -> bool {
        match self.sink.send(text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(group_id, error = %e, "Failed to deliver expense notification");
                false
            }
        }
    }
}
