//! Service traits for the collaborators of the sync routine
//!
//! The sync routine only ever talks to these traits, so tests can swap in
//! fakes and the binary can pick a storage backend at startup.

use crate::core::error::BoardResult;
use crate::core::expense::Expense;
use crate::core::group::GroupsResponse;
use async_trait::async_trait;

/// Persistence for deduplicated expense records
///
/// Implementations must make `insert_if_absent` atomic with respect to the
/// expense id: two concurrent inserts of the same id store it once, and the
/// loser gets `Ok(false)`.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Get an expense by its upstream id
    async fn find_by_id(&self, id: i64) -> BoardResult<Option<Expense>>;

    /// Store an expense unless one with the same id exists
    ///
    /// Returns `true` when the record was stored by this call. A duplicate
    /// id is not an error.
    async fn insert_if_absent(&self, expense: &Expense) -> BoardResult<bool>;

    /// Most recently stored expenses of a group, newest first
    async fn find_recent_by_group(&self, group_id: i64, limit: usize)
    -> BoardResult<Vec<Expense>>;
}

/// Authenticated reads against the bookkeeping API
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Latest expenses of a group, most recent first
    async fn fetch_expenses(&self, group_id: i64, limit: usize) -> BoardResult<Vec<Expense>>;

    /// All groups of the authenticated user, with member balances
    async fn fetch_groups(&self) -> BoardResult<GroupsResponse>;
}

/// Best-effort delivery of a text message to a chat channel
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver `text`; blank text is a successful no-op
    async fn send(&self, text: &str) -> BoardResult<()>;
}
