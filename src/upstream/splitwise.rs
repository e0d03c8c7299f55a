//! Splitwise v3.0 REST client
//!
//! Only the two reads split-board needs: `get_expenses` and `get_groups`.
//! Responses are decoded into the typed payloads of [`crate::core`] right
//! here, so nothing past this module handles untyped JSON.

use crate::config::{EnvSecret, UpstreamConfig};
use crate::core::error::{BoardResult, UpstreamError};
use crate::core::{Expense, GroupsResponse, UpstreamClient};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Deserialize)]
struct ExpensesEnvelope {
    expenses: Vec<Expense>,
}

/// Bookkeeping API client authenticating with a bearer API key
///
/// The key is read from the environment on every call, so a missing key
/// only fails the requests that need it.
#[derive(Clone)]
pub struct SplitwiseClient {
    client: Client,
    base_url: String,
    api_key: EnvSecret,
}

impl SplitwiseClient {
    pub fn new(config: &UpstreamConfig) -> BoardResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("split-board/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Transport {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key_env.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> BoardResult<T> {
        let api_key = self.api_key.resolve()?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "Upstream API error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(transport_error)?;

        serde_json::from_slice(&body).map_err(|e| {
            UpstreamError::Decode {
                message: format!("{}: {}", endpoint, e),
            }
            .into()
        })
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    let message = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else {
        err.to_string()
    };
    UpstreamError::Transport { message }
}

#[async_trait]
impl UpstreamClient for SplitwiseClient {
    async fn fetch_expenses(&self, group_id: i64, limit: usize) -> BoardResult<Vec<Expense>> {
        let envelope: ExpensesEnvelope = self
            .get_json(
                "get_expenses",
                &[("group_id", group_id.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        Ok(envelope.expenses)
    }

    async fn fetch_groups(&self) -> BoardResult<GroupsResponse> {
        self.get_json("get_groups", &[]).await
    }
}
