//! Domain types for the study planner
//!
//! Core domain types: WorkItem, Hours, AuthInfo.
//! All are serde types because they travel across the host link unchanged.

mod auth;
mod id;
mod item;

pub use auth::AuthInfo;
pub use id::{generate_item_id, now_ms};
pub use item::{Hours, ItemError, WorkItem};
