//! # topicd
//!
//! `topicd` is a small text-line publish/subscribe broker. Clients connect over
//! TCP, authenticate with a shared secret, subscribe to named topics, and
//! publish messages that are fanned out to the other subscribers of a topic.
//!
//! ## Core Modules
//!
//! - `broker`: The topic registry shared by all connections: connected clients and topic subscriptions.
//! - `client`: Represents a connected client and the queue used to write to it.
//! - `config`: Handles loading and managing server configuration.
//! - `protocol`: The line codec and the per-connection session state machine.
//! - `transport`: The TCP listener, the per-connection handler, and the terminal client.
//! - `utils`: Shared error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod protocol;
pub mod transport;
pub mod utils;
