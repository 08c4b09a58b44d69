//! Room and player registry for Huddle.
//!
//! This is the matchmaking state machine: players register, rooms are
//! created (explicitly or by autojoin), players join and leave, and
//! data-plane messages fan out to room members.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: owns all rooms and players; no internal locking
//! - [`RegistryHandle`]: serialized, cloneable access via an actor task
//! - [`Room`] / [`Player`]: the two records the registry keeps
//! - [`dispatch`]: what a dispatcher calls per request and per datagram
//! - [`spawn_sweeper`]: periodic removal of empty rooms

mod actor;
mod config;
pub mod dispatch;
mod error;
mod player;
mod registry;
mod room;
mod sweep;

pub use actor::RegistryHandle;
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use player::Player;
pub use registry::RoomRegistry;
pub use room::Room;
pub use sweep::spawn_sweeper;
