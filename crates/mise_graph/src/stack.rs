//! Slot filter stack and stack commands.
//!
//! Each open nesting scope of a walk holds one slot filter on the stack.
//! Edges carry optional commands; replaying a complete walk's commands must
//! return the stack to empty.

use mise_core::SlotFilter;
use serde::{Deserialize, Serialize};

/// Which way a stack command moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackDirection {
    /// Open a scope
    Push,
    /// Close the innermost scope
    Pop,
}

/// A single push or pop of a slot filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackCommand {
    /// Push or pop
    pub direction: StackDirection,
    /// The filter being pushed, or expected on top when popping
    pub slot_filter: SlotFilter,
}

impl StackCommand {
    /// Create a push command
    #[must_use]
    pub fn push(slot_filter: SlotFilter) -> Self {
        Self {
            direction: StackDirection::Push,
            slot_filter,
        }
    }

    /// Create a pop command
    #[must_use]
    pub fn pop(slot_filter: SlotFilter) -> Self {
        Self {
            direction: StackDirection::Pop,
            slot_filter,
        }
    }
}

/// One slot filter per open nesting scope, innermost last
pub type SlotFilterStack = Vec<SlotFilter>;

/// Stack replay failure
///
/// Both variants signal a malformed graph; they are never user-facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    /// Pop issued against an empty stack
    #[error("pop from an empty slot filter stack")]
    Empty,

    /// Popped filter differs from the one the command expects
    #[error("popped slot filter '{found}' does not match expected '{expected}'")]
    Mismatch {
        /// Filter the pop command expected
        expected: SlotFilter,
        /// Filter actually on top of the stack
        found: SlotFilter,
    },
}

/// Apply a single optional stack command
///
/// `None` is a no-op. A push appends the command's filter; a pop removes
/// the top entry after checking it equals the command's filter exactly.
///
/// # Errors
///
/// Returns [`StackError::Empty`] when popping an empty stack and
/// [`StackError::Mismatch`] when the top entry disagrees with the command.
pub fn apply(stack: &mut SlotFilterStack, command: Option<&StackCommand>) -> Result<(), StackError> {
    let Some(command) = command else {
        return Ok(());
    };
    match command.direction {
        StackDirection::Push => {
            stack.push(command.slot_filter.clone());
            Ok(())
        }
        StackDirection::Pop => match stack.pop() {
            None => Err(StackError::Empty),
            Some(top) if top != command.slot_filter => Err(StackError::Mismatch {
                expected: command.slot_filter.clone(),
                found: top,
            }),
            Some(_) => Ok(()),
        },
    }
}
