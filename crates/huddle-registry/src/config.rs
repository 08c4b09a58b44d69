//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`RoomRegistry`](crate::RoomRegistry) and its actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Capacity given to every room the registry creates.
    pub room_capacity: usize,

    /// Size of the actor's command channel. When it fills up, callers
    /// of [`RegistryHandle`](crate::RegistryHandle) wait.
    pub command_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            room_capacity: 2,
            command_buffer: 64,
        }
    }
}

impl RegistryConfig {
    /// Creates a config with the given room capacity and default buffer.
    pub fn with_capacity(room_capacity: usize) -> Self {
        Self {
            room_capacity,
            ..Default::default()
        }
    }

    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// Room capacity must be positive; a zero command buffer would make
    /// `tokio::sync::mpsc::channel` panic.
    pub fn validated(mut self) -> Self {
        if self.room_capacity == 0 {
            tracing::warn!("room_capacity of 0 is invalid, using 1");
            self.room_capacity = 1;
        }
        if self.command_buffer == 0 {
            tracing::warn!("command_buffer of 0 is invalid, using 1");
            self.command_buffer = 1;
        }
        self
    }
}
