//! Real-time hub configuration types.

use super::defaults::{
    default_announce_presence, default_command_buffer, default_mailbox_capacity,
    default_max_message_size,
};
use serde::{Deserialize, Serialize};

/// Hub and WebSocket framing settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Per-connection outbound mailbox capacity. A connection whose mailbox
    /// fills up is evicted as a slow consumer.
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Capacity of the coordinating task's command queue
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
    /// Maximum inbound WebSocket frame/message size in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Broadcast `user_joined` / `user_left` envelopes on connect and disconnect
    #[serde(default = "default_announce_presence")]
    pub announce_presence: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            command_buffer: default_command_buffer(),
            max_message_size: default_max_message_size(),
            announce_presence: default_announce_presence(),
        }
    }
}

impl HubConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mailbox_capacity == 0 {
            anyhow::bail!("hub.mailbox_capacity must be at least 1");
        }
        if self.command_buffer == 0 {
            anyhow::bail!("hub.command_buffer must be at least 1");
        }
        if self.max_message_size < 1024 {
            anyhow::bail!(
                "hub.max_message_size must be at least 1024 bytes (configured: {})",
                self.max_message_size
            );
        }
        Ok(())
    }
}
