//! Periodic removal of empty rooms.
//!
//! Emptiness never deletes a room by itself. Something has to call
//! `remove_empty`; [`spawn_sweeper`] is that something when the host
//! doesn't already have a scheduler.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::RegistryHandle;

/// Runs `remove_empty` every `period` until the registry actor stops.
///
/// The first sweep happens immediately. Missed ticks are skipped rather
/// than bunched up.
pub fn spawn_sweeper(registry: RegistryHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match registry.remove_empty().await {
                Ok(removed) if !removed.is_empty() => {
                    tracing::debug!(count = removed.len(), "sweep removed empty rooms");
                }
                Ok(_) => {}
                Err(_) => {
                    tracing::debug!("registry gone, sweeper exiting");
                    break;
                }
            }
        }
    })
}
