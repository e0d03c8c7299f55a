//! # split-board
//!
//! Backend of a shared-expense dashboard. It reads group balances and recent
//! expenses from the Splitwise API, keeps a deduplicated copy of expenses in
//! a document store, and posts newly seen expenses to a Discord webhook.
//!
//! ## Features
//!
//! - **Sync on read**: listing a group's expenses first pulls the latest
//!   page from upstream and stores the expenses never seen before
//! - **Id-based deduplication**: the store's unique insert is the only
//!   guard, so concurrent syncs of one group never store a record twice
//! - **Best-effort notifications**: one message per sync, failures logged
//! - **Pluggable storage**: in-memory by default, MongoDB behind the
//!   `mongodb_backend` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use split_board::prelude::*;
//!
//! ServerBuilder::new()
//!     .with_config(AppConfig::load()?)
//!     .with_store(InMemoryExpenseStore::new())
//!     .serve()
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod notify;
pub mod server;
pub mod storage;
pub mod sync;
pub mod upstream;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Balance, BoardError, BoardResult, ConfigError, Expense, ExpenseShare, ExpenseStore, Group,
        GroupMember, GroupsResponse, NotificationError, NotificationSink, RequestError,
        StorageError, UpstreamClient, UpstreamError, UserRef,
    };

    // === Sync ===
    pub use crate::sync::{ExpenseSync, SyncOptions, SyncReport, format_expense};

    // === Collaborators ===
    pub use crate::notify::DiscordWebhook;
    pub use crate::storage::InMemoryExpenseStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoExpenseStore;
    pub use crate::upstream::SplitwiseClient;

    // === Config ===
    pub use crate::config::{AppConfig, EnvSecret};

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost, build_routes};

    // === External dependencies ===
    pub use async_trait::async_trait;
}
