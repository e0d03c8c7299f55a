//! Notification sinks

pub mod discord;

pub use discord::{DISCORD_MAX_MESSAGE_CHARS, DiscordWebhook, split_message};
