//! MISE.GRAPH Core Types
//!
//! This crate contains pure types and logic with no I/O: the slot-filter
//! algebra and nodule identity used by the procedure graph compiler.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod id;
pub mod slot_filter;

// Re-exports
pub use id::{Nodule, NoduleSource, RandomNodules, SequentialNodules};
pub use slot_filter::{SlotFilter, SlotIndex};
