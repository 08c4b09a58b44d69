//! Client SDK for Huddle.
//!
//! A [`Client`] registers with the broker on connect, then talks to it
//! over two channels: one-shot TCP requests for room management, and
//! UDP datagrams for in-room messages. Inbound datagrams are collected
//! by an [`InboundListener`] task into a [`Mailbox`] that the caller
//! drains with [`Client::get_messages`] or [`Client::deliveries`].

mod client;
mod config;
mod error;
mod listener;
mod mailbox;

pub use client::Client;
pub use config::ClientConfig;
pub use error::ClientError;
pub use listener::InboundListener;
pub use mailbox::Mailbox;
