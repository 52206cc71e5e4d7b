//! Procedure path model.
//!
//! A procedure is an ordered mix of atomic tokens and alternation groups.
//! Tokens are opaque to this crate; alternation branches are gated by slot
//! filters and may nest further alternations in their items.

use mise_core::SlotFilter;
use serde::{Deserialize, Serialize};

/// One entry of a procedure path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathItem<T> {
    /// An atomic step
    Token(T),
    /// A group of mutually filtered alternative sub-paths
    Alternation(AltSequence<T>),
}

/// One branch of an alternation
///
/// A branch with empty items is a *null branch*: taking it skips the
/// alternation entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredAlt<T> {
    /// Sub-path taken when this branch is chosen
    pub items: Vec<PathItem<T>>,
    /// Slots for which this branch is a valid choice
    pub slot_filter: SlotFilter,
}

impl<T> FilteredAlt<T> {
    /// Create a branch gated by the given filter
    #[must_use]
    pub fn new(items: Vec<PathItem<T>>, slot_filter: SlotFilter) -> Self {
        Self { items, slot_filter }
    }

    /// Create a branch valid for every slot
    #[must_use]
    pub fn unfiltered(items: Vec<PathItem<T>>) -> Self {
        Self::new(items, SlotFilter::ALLOW_ALL)
    }

    /// Create a null branch: no items, gated by the given filter
    #[must_use]
    pub fn null(slot_filter: SlotFilter) -> Self {
        Self::new(Vec::new(), slot_filter)
    }

    /// True when the branch has no items
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.items.is_empty()
    }
}

/// An ordered sequence of alternative branches at one point in a procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AltSequence<T> {
    /// The branches, in declaration order
    pub alts: Vec<FilteredAlt<T>>,
}

impl<T> AltSequence<T> {
    /// Create an empty alternation
    #[must_use]
    pub fn new() -> Self {
        Self { alts: Vec::new() }
    }

    /// Append a branch
    pub fn push(&mut self, alt: FilteredAlt<T>) {
        self.alts.push(alt);
    }

    /// Number of branches
    #[must_use]
    pub fn len(&self) -> usize {
        self.alts.len()
    }

    /// True when there are no branches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alts.is_empty()
    }

    /// Union of all branch filters
    #[must_use]
    pub fn coverage(&self) -> SlotFilter {
        self.alts
            .iter()
            .fold(SlotFilter::BLOCK_ALL, |acc, alt| acc.union(&alt.slot_filter))
    }
}

impl<T: Clone> AltSequence<T> {
    /// Normalize the alternation for lowering
    ///
    /// Appends a synthetic null branch covering whatever the declared
    /// branches leave uncovered (the "else" escape hatch), drops dead
    /// branches gated by BLOCK_ALL, and merges all null branches into a
    /// single one placed last whose filter is the union of theirs.
    ///
    /// The result's filters union to ALLOW_ALL, it contains at most one
    /// null branch and no BLOCK_ALL branch, and it is never empty.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let else_filter = self.coverage().invert();

        let mut branches = self.alts.clone();
        if !else_filter.is_block_all() {
            branches.push(FilteredAlt::null(else_filter));
        }

        branches.retain(|alt| !alt.slot_filter.is_block_all());

        let (nulls, mut kept): (Vec<_>, Vec<_>) =
            branches.into_iter().partition(FilteredAlt::is_null);
        if !nulls.is_empty() {
            let null_filter = nulls
                .iter()
                .fold(SlotFilter::BLOCK_ALL, |acc, alt| acc.union(&alt.slot_filter));
            kept.push(FilteredAlt::null(null_filter));
        }

        Self { alts: kept }
    }
}

impl<T> Default for AltSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<FilteredAlt<T>>> for AltSequence<T> {
    fn from(alts: Vec<FilteredAlt<T>>) -> Self {
        Self { alts }
    }
}

/// An ordered procedure description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedurePath<T> {
    /// The path items, in execution order
    pub items: Vec<PathItem<T>>,
}

impl<T> ProcedurePath<T> {
    /// Create an empty path
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a path item
    pub fn push(&mut self, item: PathItem<T>) {
        self.items.push(item);
    }

    /// Append an atomic token
    pub fn push_token(&mut self, token: T) {
        self.items.push(PathItem::Token(token));
    }

    /// Append an alternation group
    pub fn push_alternation(&mut self, alternation: AltSequence<T>) {
        self.items.push(PathItem::Alternation(alternation));
    }
}

impl<T> Default for ProcedurePath<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<PathItem<T>>> for ProcedurePath<T> {
    fn from(items: Vec<PathItem<T>>) -> Self {
        Self { items }
    }
}
