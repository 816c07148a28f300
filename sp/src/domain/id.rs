//! Work item ID generation
//!
//! IDs are the creation time in Unix milliseconds, rendered as a decimal string.
//! Example: `1718035200123`

use chrono::Utc;
use tracing::debug;

use super::item::WorkItem;

/// Current time in Unix milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate an item ID that no existing item uses
///
/// Two adds inside the same millisecond would collide, so the timestamp is
/// bumped until it is free.
pub fn generate_item_id(existing: &[WorkItem]) -> String {
    generate_item_id_at(now_ms(), existing)
}

pub(crate) fn generate_item_id_at(mut millis: i64, existing: &[WorkItem]) -> String {
    debug!(millis, existing = existing.len(), "generate_item_id_at: called");
    loop {
        let candidate = millis.to_string();
        if !existing.iter().any(|item| item.id == candidate) {
            return candidate;
        }
        debug!(%candidate, "generate_item_id_at: collision, bumping");
        millis += 1;
    }
}
