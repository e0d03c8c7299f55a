//! Core module containing the domain model, error types and service traits

pub mod error;
pub mod expense;
pub mod group;
pub mod service;

pub use error::{
    BoardError, BoardResult, ConfigError, NotificationError, RequestError, StorageError,
    UpstreamError,
};
pub use expense::{Expense, ExpenseShare, UserRef};
pub use group::{Balance, Group, GroupMember, GroupsResponse};
pub use service::{ExpenseStore, NotificationSink, UpstreamClient};
