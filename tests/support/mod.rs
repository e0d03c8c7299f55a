//! Shared fakes for integration tests
//!
//! - `FakeUpstream`: scripted bookkeeping API
//! - `RecordingSink`: captures every message, can be told to fail
//! - `FlakyStore`: in-memory store whose inserts fail for chosen ids

#![allow(dead_code)]

use split_board::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub const DASHBOARD_URL: &str = "https://board.example/";

/// Expense with two participants splitting the cost evenly
pub fn expense(id: i64, group_id: i64) -> Expense {
    Expense::new(id, group_id, format!("Expense {}", id), "20.00", "CAD")
        .with_share(1, "Ana", Some("Ruiz"), "20.00", "10.00")
        .with_share(2, "Ben", None, "0.00", "10.00")
}

/// Expense with three participants
pub fn three_way_expense(id: i64, group_id: i64) -> Expense {
    Expense::new(id, group_id, "Dinner", "90.00", "CAD")
        .with_share(1, "Ana", Some("Ruiz"), "90.00", "30.00")
        .with_share(2, "Ben", None, "0.00", "30.00")
        .with_share(3, "Cleo", Some("Park"), "0.00", "30.00")
}

pub fn sync_options() -> SyncOptions {
    SyncOptions {
        page_size: 10,
        dashboard_url: DASHBOARD_URL.to_string(),
    }
}

// ---------------------------------------------------------------------------
// FakeUpstream
// ---------------------------------------------------------------------------

#[derive(Default)]
struct UpstreamState {
    /// Most recent first, as upstream returns them
    expenses: Vec<Expense>,
    groups: Vec<Group>,
    fail_status: Option<u16>,
    expense_calls: usize,
}

#[derive(Clone, Default)]
pub struct FakeUpstream {
    state: Arc<Mutex<UpstreamState>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expenses(expenses: Vec<Expense>) -> Self {
        let upstream = Self::new();
        upstream.set_expenses(expenses);
        upstream
    }

    pub fn set_expenses(&self, expenses: Vec<Expense>) {
        self.state.lock().unwrap().expenses = expenses;
    }

    pub fn set_groups(&self, groups: Vec<Group>) {
        self.state.lock().unwrap().groups = groups;
    }

    pub fn fail_with(&self, status: u16) {
        self.state.lock().unwrap().fail_status = Some(status);
    }

    pub fn expense_calls(&self) -> usize {
        self.state.lock().unwrap().expense_calls
    }
}

#[async_trait]
impl UpstreamClient for FakeUpstream {
    async fn fetch_expenses(&self, group_id: i64, limit: usize) -> BoardResult<Vec<Expense>> {
        let mut state = self.state.lock().unwrap();
        state.expense_calls += 1;

        if let Some(status) = state.fail_status {
            return Err(UpstreamError::Status { status }.into());
        }

        Ok(state
            .expenses
            .iter()
            .filter(|e| e.group_id == Some(group_id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_groups(&self) -> BoardResult<GroupsResponse> {
        let state = self.state.lock().unwrap();

        if let Some(status) = state.fail_status {
            return Err(UpstreamError::Status { status }.into());
        }

        Ok(GroupsResponse {
            groups: state.groups.clone(),
            extra: Default::default(),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SinkState {
    delivered: Vec<String>,
    attempts: usize,
    failing: bool,
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    state: Arc<Mutex<SinkState>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let sink = Self::new();
        sink.state.lock().unwrap().failing = true;
        sink
    }

    /// Messages delivered successfully
    pub fn messages(&self) -> Vec<String> {
        self.state.lock().unwrap().delivered.clone()
    }

    /// Every call to `send`, including failed ones
    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, text: &str) -> BoardResult<()> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;

        if state.failing {
            return Err(NotificationError::Status { status: 500 }.into());
        }

        state.delivered.push(text.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FlakyStore
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: InMemoryExpenseStore,
    failing_ids: Arc<Mutex<HashSet<i64>>>,
}

impl FlakyStore {
    pub fn failing_on(ids: &[i64]) -> Self {
        let store = Self::default();
        store.failing_ids.lock().unwrap().extend(ids);
        store
    }

    pub fn heal(&self) {
        self.failing_ids.lock().unwrap().clear();
    }

    pub fn inner(&self) -> &InMemoryExpenseStore {
        &self.inner
    }
}

#[async_trait]
impl ExpenseStore for FlakyStore {
    async fn find_by_id(&self, id: i64) -> BoardResult<Option<Expense>> {
        self.inner.find_by_id(id).await
    }

    async fn insert_if_absent(&self, expense: &Expense) -> BoardResult<bool> {
        if self.failing_ids.lock().unwrap().contains(&expense.id) {
            return Err(StorageError::ConnectionError {
                backend: "flaky".to_string(),
                message: "connection reset".to_string(),
            }
            .into());
        }
        self.inner.insert_if_absent(expense).await
    }

    async fn find_recent_by_group(
        &self,
        group_id: i64,
        limit: usize,
    ) -> BoardResult<Vec<Expense>> {
        self.inner.find_recent_by_group(group_id, limit).await
    }
}
