//! Networking: wire protocol, state cache, HTTP service, and remote client.

pub mod cache;
pub mod client;
pub mod protocol;
pub mod service;
