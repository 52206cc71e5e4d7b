//! MISE.GRAPH Procedure Compiler
//!
//! Compiles nested procedure descriptions - ordered mixes of atomic tokens
//! and slot-gated alternation groups - into variant graphs whose complete
//! traversals each represent one fully concrete resolution of the
//! procedure, then enumerates and validates those traversals.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod graph;
pub mod path;
pub mod stack;
pub mod validate;
pub mod walk;

// Re-exports
pub use compiler::{CompileError, Compiler};
pub use graph::{Edge, EdgeId, VariantGraph};
pub use path::{AltSequence, FilteredAlt, PathItem, ProcedurePath};
pub use stack::{apply, SlotFilterStack, StackCommand, StackDirection, StackError};
pub use validate::{validate, ChoiceSequence, WalkInvalidity};
pub use walk::{Walk, Walks};
