//! # Huddle
//!
//! Room-based matchmaking and messaging for small multiplayer games.
//!
//! Players register with a broker, create or join bounded-capacity
//! rooms over a reliable control plane (TCP), and exchange in-room
//! messages over an unreliable data plane (UDP).
//!
//! - Broker side: [`RegistryHandle`](prelude::RegistryHandle) plus the
//!   [`dispatch`](huddle_registry::dispatch) functions. The socket loops
//!   that feed them belong to the host application.
//! - Client side: [`Client`](prelude::Client).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use huddle::prelude::*;
//!
//! # async fn demo() -> Result<(), HuddleError> {
//! let mut client = Client::connect(ClientConfig::new("127.0.0.1")).await?;
//! client.autojoin().await?;
//! client.send(&"hello").await?;
//! let inbox = client.deliveries().await;
//! # let _ = inbox;
//! client.stop().await;
//! # Ok(())
//! # }
//! ```

mod error;

pub use error::HuddleError;

pub use huddle_client as client;
pub use huddle_protocol as protocol;
pub use huddle_registry as registry;
pub use huddle_transport as transport;

/// Everything a typical broker or client needs.
pub mod prelude {
    pub use crate::HuddleError;
    pub use huddle_client::{Client, ClientConfig, ClientError};
    pub use huddle_protocol::{
        ControlRequest, ControlResponse, DataRequest, Delivery, PlayerId, ProtocolError,
        Recipients, RoomId, RoomSummary,
    };
    pub use huddle_registry::{
        RegistryConfig, RegistryError, RegistryHandle, RoomRegistry, dispatch, spawn_sweeper,
    };
    pub use huddle_transport::TransportError;
}
