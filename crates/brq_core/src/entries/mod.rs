//! The render queue and its entries.
//!
//! An entry is one row of the queue table: a camera plus the per-row
//! overrides (name template, output path, frame range, resolution, pixel
//! aspect, scene configuration, presets). [`RenderQueue`] owns the ordered
//! entry list, the queue-level default output path, reorder/duplicate
//! operations, and persistence.

mod queue;
mod types;

// Re-export all public types
pub use queue::{QueueRecord, RenderQueue};
pub use types::{is_default_field, RenderEntry, DEFAULT_FIELD, DEFAULT_PATH_TEXT};
