//! Shared types for the snapback engine.
//!
//! The engine walks a live value and produces a [`Mirror`]: an owned tree
//! that records the value's shape and data. Every node in that walk is
//! addressed by a [`Path`], which is what errors and diagnostics report.
//!
//! # Invariants
//! - A `Mirror` never borrows from the value it was captured from.
//! - Every error raised while walking carries the path it was raised at.

pub mod error;
pub mod mirror;
pub mod options;
pub mod path;

pub use error::{SnapshotError, Unavailable};
pub use mirror::{Kind, Mirror, Scalar};
pub use options::{FieldPolicy, OpaquePolicy, Options};
pub use path::{Path, Segment};
