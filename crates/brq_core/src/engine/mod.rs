//! Queue execution engine.
//!
//! This module turns a [`RenderQueue`](crate::entries::RenderQueue) into
//! rendered frames on disk. A run always walks the queue twice through the
//! same per-entry pipeline: a pre-check pass that validates every entry and
//! asks the user about anything suspicious, then a commit pass that renders.
//! Nothing renders until the whole queue has passed pre-check.
//!
//! # Architecture
//!
//! ```text
//! QueueExecutor::run
//!     ├── pass: Precheck          (validate, prompt, no rendering)
//!     │       ├── preflight      renderer + developer-toggle check
//!     │       └── per entry:
//!     │           ├── camera lookup (identity only)
//!     │           ├── frames     frame-range parsing
//!     │           ├── GlobalsScope   resolution / pixel-aspect overrides
//!     │           ├── scene config + presets
//!     │           ├── template   name substitution + validation
//!     │           └── output     directory check, collision probe
//!     └── pass: Commit            (same pipeline, renders each frame)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use brq_core::engine::QueueExecutor;
//!
//! let mut executor = QueueExecutor::new(&mut host, &prompt, settings, logger);
//! let report = executor.run(&queue);
//! println!("{:?}: {} frame(s) rendered", report.outcome, report.rendered_frames());
//! ```

mod errors;
mod executor;
mod scope;
mod types;

pub mod frames;
pub mod output;
pub mod preflight;
pub mod template;

pub use errors::{EntryError, EntryResult};
pub use executor::QueueExecutor;
pub use scope::GlobalsScope;
pub use types::{
    EntryReport, EntryStatus, FrameOutcome, FrameReport, QueueOutcome, RunMode, RunReport,
};
