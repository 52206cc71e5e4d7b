//! The variant graph.
//!
//! Edges live in a dense arena addressed by [`EdgeId`]; adjacency maps each
//! nodule to its outbound edge ids in insertion order. Parallel edges
//! between the same nodule pair stay distinct. The graph is built once and
//! never mutated afterward.

use crate::stack::StackCommand;
use indexmap::IndexMap;
use mise_core::Nodule;
use serde::{Deserialize, Serialize};

/// Index of an edge in the graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(u64);

impl EdgeId {
    /// Position in the arena
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "edge_{}", self.0)
    }
}

/// A directed, token-bearing connection between two nodules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge<T> {
    /// Source nodule
    pub src: Nodule,
    /// Destination nodule
    pub dst: Nodule,
    /// Tokens encountered along this edge, in order
    pub tokens: Vec<T>,
    /// Command applied when entering the edge
    pub start_command: Option<StackCommand>,
    /// Command applied when leaving the edge
    pub close_command: Option<StackCommand>,
}

/// A compiled procedure graph with its two distinguished nodules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantGraph<T> {
    edges: Vec<Edge<T>>,
    outbound: IndexMap<Nodule, Vec<EdgeId>>,
    start: Nodule,
    close: Nodule,
}

impl<T> VariantGraph<T> {
    /// Create an empty graph between the given distinguished nodules
    #[must_use]
    pub(crate) fn new(start: Nodule, close: Nodule) -> Self {
        let mut outbound = IndexMap::new();
        outbound.insert(start, Vec::new());
        outbound.insert(close, Vec::new());
        Self {
            edges: Vec::new(),
            outbound,
            start,
            close,
        }
    }

    /// Append an edge to the arena and its source's adjacency
    pub(crate) fn connect(&mut self, edge: Edge<T>) -> EdgeId {
        let id = EdgeId(self.edges.len() as u64);
        self.outbound.entry(edge.src).or_default().push(id);
        self.outbound.entry(edge.dst).or_default();
        self.edges.push(edge);
        id
    }

    /// The distinguished entry nodule
    #[must_use]
    pub fn start(&self) -> Nodule {
        self.start
    }

    /// The distinguished exit nodule
    #[must_use]
    pub fn close(&self) -> Nodule {
        self.close
    }

    /// Get edge by id
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge<T>> {
        self.edges.get(id.index())
    }

    /// Outbound edge ids of a nodule, in insertion order
    #[must_use]
    pub fn outbound(&self, nodule: Nodule) -> &[EdgeId] {
        self.outbound.get(&nodule).map_or(&[], Vec::as_slice)
    }

    /// Iterate over nodules and their outbound edge ids
    pub fn adjacency(&self) -> impl Iterator<Item = (Nodule, &[EdgeId])> {
        self.outbound.iter().map(|(nodule, ids)| (*nodule, ids.as_slice()))
    }

    /// Iterate over all edges with their ids, in arena order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge<T>)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, edge)| (EdgeId(i as u64), edge))
    }

    /// Total edge count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Total nodule count
    #[must_use]
    pub fn nodule_count(&self) -> usize {
        self.outbound.len()
    }
}
