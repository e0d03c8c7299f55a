//! Server host: the state shared by every request handler
//!
//! The host owns the sync routine (and through it the upstream client,
//! the store and the sink) plus the configuration the handlers read.

use crate::config::AppConfig;
use crate::core::error::BoardResult;
use crate::core::{Expense, ExpenseStore, GroupsResponse, UpstreamClient};
use crate::sync::{ExpenseSync, SyncReport};
use std::sync::Arc;

pub struct ServerHost {
    /// Configuration the server was built with
    pub config: Arc<AppConfig>,

    /// Sync routine and its collaborators
    pub sync: ExpenseSync,

    /// Value of the `Cache-Control` header on read endpoints
    pub cache_control: String,
}

impl ServerHost {
    pub fn new(config: AppConfig, sync: ExpenseSync) -> Self {
        let cache_control = config.http.cache_control();

        Self {
            config: Arc::new(config),
            sync,
            cache_control,
        }
    }

    pub fn store(&self) -> &Arc<dyn ExpenseStore> {
        self.sync.store()
    }

    pub fn upstream(&self) -> &Arc<dyn UpstreamClient> {
        self.sync.upstream()
    }

    /// Sync the group, then read back its most recent stored expenses
    ///
    /// Every list request refreshes the store first, so the response
    /// includes anything upstream added since the last request.
    pub async fn refresh_and_list(&self, group_id: i64) -> BoardResult<(SyncReport, Vec<Expense>)> {
        let report = self.sync.sync(group_id).await?;
        let expenses = self
            .store()
            .find_recent_by_group(group_id, self.config.sync.list_limit)
            .await?;

        Ok((report, expenses))
    }

    /// Group snapshots, read through from upstream
    pub async fn groups(&self) -> BoardResult<GroupsResponse> {
        self.upstream().fetch_groups().await
    }
}
