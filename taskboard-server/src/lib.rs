//! `Taskboard` backend service library.
//!
//! Exposes the storage components, the index consistency coordinator,
//! and the HTTP surface for use in tests and embedding.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod http;
pub mod index;
pub mod store;
