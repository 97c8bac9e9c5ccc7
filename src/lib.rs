//! chirpy: a short-message HTTP API.
//!
//! The interesting part is [`identity`] (password hashing, stateless HMAC tokens, the
//! bearer gate) and the moderated write path in [`chirps`]. [`server`] wires both to
//! axum routes over a [`storage::Store`].

pub mod chirps;
pub mod config;
pub mod error;
pub mod identity;
pub mod server;
pub mod storage;
pub mod users;
