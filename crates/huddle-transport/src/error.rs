/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Host name resolution produced no usable address.
    #[error("no address found for {0}")]
    AddrNotFound(String),

    /// Opening the reliable connection failed (refused, unreachable).
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Binding a socket failed.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The peer closed the connection before sending anything.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
}
