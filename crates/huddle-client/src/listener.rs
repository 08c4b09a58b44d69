//! Background task that fills the mailbox from the client's data socket.

use std::net::SocketAddr;

use huddle_transport::{DatagramReceiver, TransportError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::Mailbox;

/// Owns the receive socket through a spawned task.
///
/// Every datagram that arrives is appended to the [`Mailbox`] untouched.
/// Call [`stop`](Self::stop) to end the task and release the socket;
/// dropping the listener without stopping it aborts the task.
pub struct InboundListener {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl InboundListener {
    /// Binds `addr` and starts receiving into `mailbox`.
    ///
    /// Datagrams longer than `max_len` are truncated.
    pub async fn spawn(
        addr: &str,
        max_len: usize,
        mailbox: Mailbox,
    ) -> Result<Self, TransportError> {
        let mut receiver = DatagramReceiver::bind(addr, max_len).await?;
        let local_addr = receiver.local_addr().map_err(TransportError::BindFailed)?;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            tracing::info!(%local_addr, "inbound listener started");
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    received = receiver.recv() => match received {
                        Ok((payload, from)) => {
                            tracing::trace!(%from, bytes = payload.len(), "datagram received");
                            mailbox.push(payload).await;
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "datagram receive failed");
                        }
                    },
                }
            }
            tracing::info!(%local_addr, "inbound listener stopped");
        });

        Ok(Self {
            local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// The address the receive socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signals the task to stop and waits for it to finish.
    ///
    /// The socket is closed by the time this returns.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::debug!(error = %e, "inbound listener task ended abnormally");
            }
        }
    }
}

impl Drop for InboundListener {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
