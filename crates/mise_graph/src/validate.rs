//! Walk validation and choice-sequence derivation.
//!
//! A walk's stack-command sequence is internally consistent when, along
//! every open nesting chain, the running intersection of the filters it
//! presents stays non-empty. Validation is bracket matching with narrowing
//! intersection: a push inherits the enclosing scope's running filter, and
//! a pop folds the closed scope's final filter back into the enclosing
//! scope. A closed chain's constraint evaporates with it, so unrelated
//! re-entries at the same depth stay independent.

use crate::stack::{StackCommand, StackDirection};
use mise_core::SlotFilter;
use serde::{Deserialize, Serialize};

/// Per-depth record of the narrowed filters a walk actually used
///
/// The canonical fingerprint of which combination of alternatives a walk
/// represents: index 0 holds the filters of every top-level scope the walk
/// opened, in order; index 1 the scopes nested one level deeper, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChoiceSequence {
    depths: Vec<Vec<SlotFilter>>,
}

impl ChoiceSequence {
    /// Recorded filters per depth, outermost first
    #[must_use]
    pub fn depths(&self) -> &[Vec<SlotFilter>] {
        &self.depths
    }

    /// Number of depths the walk visited
    #[must_use]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// True when the walk opened no scopes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// True when every recorded filter agrees with the supplied per-depth
    /// preferences
    ///
    /// A recorded filter agrees when it shares at least one slot with the
    /// preference at its depth; depths beyond the supplied slice are
    /// unconstrained. Use this to narrow validated walks to an externally
    /// chosen selection.
    #[must_use]
    pub fn agrees_with(&self, preferences: &[SlotFilter]) -> bool {
        self.depths
            .iter()
            .zip(preferences)
            .all(|(recorded, preference)| {
                recorded.iter().all(|filter| filter.intersects(preference))
            })
    }
}

impl From<Vec<Vec<SlotFilter>>> for ChoiceSequence {
    fn from(depths: Vec<Vec<SlotFilter>>) -> Self {
        Self { depths }
    }
}

/// Why a stack-command sequence describes no feasible walk
///
/// Infeasibility is the common case across a rich graph's search space;
/// it is returned as data and nothing panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkInvalidity {
    /// Filters along one nesting chain narrow to the empty set
    #[error("slot filters at depth {depth} narrow to an empty set")]
    EmptyIntersection {
        /// Depth of the push that emptied the intersection
        depth: usize,
    },

    /// A pop command arrived with no scope open
    #[error("pop command with no open scope")]
    StrayPop,

    /// Scopes were still open when the sequence ended
    #[error("{count} scopes still open at end of walk")]
    OpenScopes {
        /// Number of scopes left open
        count: usize,
    },
}

/// Validate a stack-command sequence and derive its choice sequence
///
/// # Errors
///
/// Returns [`WalkInvalidity`] when the sequence is not internally
/// consistent: conflicting slot requirements along a nesting chain, a pop
/// with no open scope, or scopes left open at the end.
pub fn validate(commands: &[StackCommand]) -> Result<ChoiceSequence, WalkInvalidity> {
    // Running narrowed filter per open scope, innermost last.
    let mut open: Vec<SlotFilter> = Vec::new();
    let mut depths: Vec<Vec<SlotFilter>> = Vec::new();

    for command in commands {
        match command.direction {
            StackDirection::Push => {
                let depth = open.len();
                let narrowed = match open.last() {
                    Some(enclosing) => enclosing.intersection(&command.slot_filter),
                    None => command.slot_filter.clone(),
                };
                if narrowed.is_block_all() {
                    return Err(WalkInvalidity::EmptyIntersection { depth });
                }
                if depths.len() <= depth {
                    depths.push(Vec::new());
                }
                depths[depth].push(narrowed.clone());
                open.push(narrowed);
            }
            StackDirection::Pop => {
                let Some(closed) = open.pop() else {
                    return Err(WalkInvalidity::StrayPop);
                };
                // Fold the closed scope's final filter back into the
                // enclosing scope and its last recorded entry.
                if let Some(enclosing) = open.last_mut() {
                    *enclosing = closed.clone();
                    let depth = open.len() - 1;
                    if let Some(recorded) = depths.get_mut(depth).and_then(|bucket| bucket.last_mut()) {
                        *recorded = closed;
                    }
                }
            }
        }
    }

    if !open.is_empty() {
        return Err(WalkInvalidity::OpenScopes { count: open.len() });
    }
    Ok(ChoiceSequence { depths })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StackCommand;

    fn white(indices: &[u32]) -> SlotFilter {
        SlotFilter::white_list(indices.iter().copied())
    }

    fn push(filter: SlotFilter) -> StackCommand {
        StackCommand::push(filter)
    }

    fn pop(filter: SlotFilter) -> StackCommand {
        StackCommand::pop(filter)
    }

    #[test]
    fn test_empty_sequence_is_valid_and_choice_free() {
        let choices = validate(&[]).unwrap();
        assert!(choices.is_empty());
    }

    #[test]
    fn test_single_scope_records_its_filter() {
        let commands = [push(white(&[0])), pop(white(&[0]))];
        let choices = validate(&commands).unwrap();
        assert_eq!(choices, vec![vec![white(&[0])]].into());
    }

    #[test]
    fn test_sequential_scopes_are_independent() {
        // Mutually exclusive filters in sequential top-level scopes do not
        // constrain each other.
        let commands = [
            push(white(&[0])),
            pop(white(&[0])),
            push(white(&[0]).invert()),
            pop(white(&[0]).invert()),
        ];
        let choices = validate(&commands).unwrap();
        assert_eq!(
            choices,
            vec![vec![white(&[0]), white(&[0]).invert()]].into()
        );
    }

    #[test]
    fn test_nested_conflict_is_invalid() {
        let commands = [push(white(&[1])), push(white(&[0]))];
        let err = validate(&commands).unwrap_err();
        assert_eq!(err, WalkInvalidity::EmptyIntersection { depth: 1 });
    }

    #[test]
    fn test_nested_agreement_narrows_both_records() {
        // Outer scope allows {0, 1}; the inner choice of {0} narrows the
        // outer record as well.
        let commands = [
            push(white(&[0, 1])),
            push(white(&[0])),
            pop(white(&[0])),
            pop(white(&[0, 1])),
        ];
        let choices = validate(&commands).unwrap();
        assert_eq!(
            choices,
            vec![vec![white(&[0])], vec![white(&[0])]].into()
        );
    }

    #[test]
    fn test_committed_inner_choice_constrains_later_sibling() {
        // Within one open scope, an inner scope settling on {0} conflicts
        // with a later inner scope requiring {1}.
        let commands = [
            push(white(&[0, 1])),
            push(white(&[0])),
            pop(white(&[0])),
            push(white(&[1])),
        ];
        let err = validate(&commands).unwrap_err();
        assert_eq!(err, WalkInvalidity::EmptyIntersection { depth: 1 });
    }

    #[test]
    fn test_closed_chain_constraint_evaporates() {
        // The same conflicting pair is fine once the first chain has fully
        // closed before the second opens.
        let commands = [
            push(white(&[0, 1])),
            push(white(&[0])),
            pop(white(&[0])),
            pop(white(&[0, 1])),
            push(white(&[0, 1])),
            push(white(&[1])),
            pop(white(&[1])),
            pop(white(&[0, 1])),
        ];
        let choices = validate(&commands).unwrap();
        assert_eq!(
            choices,
            vec![
                vec![white(&[0]), white(&[1])],
                vec![white(&[0]), white(&[1])],
            ]
            .into()
        );
    }

    #[test]
    fn test_stray_pop_is_invalid() {
        let commands = [pop(white(&[0]))];
        assert_eq!(validate(&commands).unwrap_err(), WalkInvalidity::StrayPop);
    }

    #[test]
    fn test_unclosed_scopes_are_invalid() {
        let commands = [push(white(&[0])), push(white(&[0]))];
        assert_eq!(
            validate(&commands).unwrap_err(),
            WalkInvalidity::OpenScopes { count: 2 }
        );
    }

    #[test]
    fn test_black_list_chains_always_narrow() {
        // Black lists have co-finite allowed sets, so nesting any two
        // keeps the intersection non-empty.
        let commands = [
            push(SlotFilter::black_list([0])),
            push(SlotFilter::black_list([1])),
            pop(SlotFilter::black_list([1])),
            pop(SlotFilter::black_list([0])),
        ];
        let choices = validate(&commands).unwrap();
        assert_eq!(choices.len(), 2);
    }

    #[test]
    fn test_agrees_with_preferences() {
        let choices: ChoiceSequence =
            vec![vec![white(&[0]), white(&[0, 1])], vec![white(&[2])]].into();

        assert!(choices.agrees_with(&[white(&[0])]));
        assert!(choices.agrees_with(&[white(&[0]), white(&[2])]));
        assert!(!choices.agrees_with(&[white(&[1])]));
        assert!(!choices.agrees_with(&[white(&[0]), white(&[3])]));
        // No preferences supplied: everything agrees.
        assert!(choices.agrees_with(&[]));
    }
}
