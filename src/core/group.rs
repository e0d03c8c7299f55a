//! Group snapshots (read through from upstream, never persisted)

use crate::core::expense::full_name;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the upstream group list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupsResponse {
    pub groups: Vec<Group>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub members: Vec<GroupMember>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: i64,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: Option<String>,

    /// One entry per currency the member has a non-settled balance in
    #[serde(default)]
    pub balance: Vec<Balance>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signed balance in one currency: positive means the member is owed money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency_code: String,

    pub amount: String,
}

impl GroupMember {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.last_name.as_deref())
    }
}

impl GroupsResponse {
    pub fn find(&self, group_id: i64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }
}
