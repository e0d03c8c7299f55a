//! Expense records as served by the bookkeeping API
//!
//! The struct models the fields split-board reads and keeps every other
//! upstream field in a flattened `extra` map, so a stored record reads back
//! as the document upstream sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One upstream expense
///
/// `id` is assigned upstream and is unique across all groups. Once stored,
/// a record is never updated, even if upstream later edits the expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,

    /// Null for expenses outside any group
    #[serde(default)]
    pub group_id: Option<i64>,

    #[serde(default)]
    pub description: String,

    /// Decimal amount, kept as the string upstream sent
    pub cost: String,

    pub currency_code: String,

    /// Occurrence date (RFC 3339)
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub created_by: Option<UserRef>,

    /// Per-participant shares
    #[serde(default)]
    pub users: Vec<ExpenseShare>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user reference as embedded in expenses (`created_by`, `users[].user`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i64,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRef {
    /// First and last name joined by a space, without a dangling space when
    /// the last name is missing
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.last_name.as_deref())
    }
}

/// How much one participant paid and owes for an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub user: UserRef,

    pub user_id: i64,

    pub paid_share: String,

    pub owed_share: String,

    #[serde(default)]
    pub net_balance: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Expense {
    /// Create a minimal expense (mostly useful for tests and fixtures)
    pub fn new(
        id: i64,
        group_id: i64,
        description: impl Into<String>,
        cost: impl Into<String>,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            id,
            group_id: Some(group_id),
            description: description.into(),
            cost: cost.into(),
            currency_code: currency_code.into(),
            date: None,
            created_at: None,
            created_by: None,
            users: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Add a participant share
    pub fn with_share(
        mut self,
        user_id: i64,
        first_name: impl Into<String>,
        last_name: Option<&str>,
        paid_share: impl Into<String>,
        owed_share: impl Into<String>,
    ) -> Self {
        self.users.push(ExpenseShare {
            user: UserRef {
                id: user_id,
                first_name: first_name.into(),
                last_name: last_name.map(str::to_string),
                extra: Map::new(),
            },
            user_id,
            paid_share: paid_share.into(),
            owed_share: owed_share.into(),
            net_balance: None,
            extra: Map::new(),
        });
        self
    }
}

pub(crate) fn full_name(first: &str, last: Option<&str>) -> String {
    match last.map(str::trim).filter(|l| !l.is_empty()) {
        Some(last) => format!("{} {}", first, last),
        None => first.to_string(),
    }
}
