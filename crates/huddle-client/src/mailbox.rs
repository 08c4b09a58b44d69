//! Inbound mailbox shared between the listener task and the client.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Raw datagram payloads received since the last drain.
///
/// Cloning gives another handle to the same mailbox.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    inner: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one payload.
    pub async fn push(&self, payload: Vec<u8>) {
        self.inner.lock().await.push(payload);
    }

    /// Empties the mailbox and returns the distinct payloads it held.
    ///
    /// Byte-identical payloads collapse into one entry. Arrival order is
    /// not kept.
    pub async fn drain(&self) -> HashSet<Vec<u8>> {
        let drained = std::mem::take(&mut *self.inner.lock().await);
        drained.into_iter().collect()
    }

    /// Number of payloads waiting, duplicates included.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
