//! Shared domain and wire types for `Taskboard`.

pub mod api;
pub mod category;
pub mod task;
pub mod user;
