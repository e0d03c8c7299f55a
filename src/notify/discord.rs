//! Discord webhook sink
//!
//! Posts `{"content": "..."}` to the webhook URL named in the configuration.
//! Discord rejects messages longer than 2000 characters, so longer texts go
//! out as several posts split on line boundaries.

use crate::config::{EnvSecret, NotifyConfig};
use crate::core::error::{BoardResult, NotificationError};
use crate::core::NotificationSink;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Maximum `content` length Discord accepts
pub const DISCORD_MAX_MESSAGE_CHARS: usize = 2000;

/// Per-post request timeout
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat webhook sink
///
/// The webhook URL is read from the environment on every send.
#[derive(Clone)]
pub struct DiscordWebhook {
    client: Client,
    webhook_url: EnvSecret,
    max_chars: usize,
}

impl DiscordWebhook {
    pub fn new(config: &NotifyConfig) -> BoardResult<Self> {
        Self::with_secret(config.webhook_url_env.clone())
    }

    pub fn with_secret(webhook_url: EnvSecret) -> BoardResult<Self> {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::Transport {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            webhook_url,
            max_chars: DISCORD_MAX_MESSAGE_CHARS,
        })
    }

    pub fn timeout(&self) -> Duration {
        WEBHOOK_TIMEOUT
    }

    /// Override the per-post length limit
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    async fn post(&self, url: &str, content: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(url)
            .json(&json!({ "content": content }))
            .send()
            .await
            .map_err(|e| NotificationError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for DiscordWebhook {
    async fn send(&self, text: &str) -> BoardResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let url = self.webhook_url.resolve()?;
        let chunks = split_message(text, self.max_chars);

        for (index, chunk) in chunks.iter().enumerate() {
            self.post(&url, chunk).await?;
            tracing::debug!(part = index + 1, parts = chunks.len(), "Webhook message posted");
        }

        Ok(())
    }
}

/// Split `text` into pieces of at most `max_chars` characters
///
/// Breaks happen between lines; a single line longer than the limit is cut
/// into limit-sized pieces. Blank pieces are dropped.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    let mut flush = |current: &mut String, current_len: &mut usize| {
        if !current.trim().is_empty() {
            chunks.push(std::mem::take(current));
        }
        current.clear();
        *current_len = 0;
    };

    for line in text.split('\n') {
        let line_len = line.chars().count();

        if line_len > max_chars {
            flush(&mut current, &mut current_len);
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                let mut piece: String = piece.iter().collect();
                flush(&mut piece, &mut 0);
            }
            continue;
        }

        let separator = usize::from(!current.is_empty());
        if current_len + separator + line_len > max_chars {
            flush(&mut current, &mut current_len);
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    flush(&mut current, &mut current_len);
    chunks
}
