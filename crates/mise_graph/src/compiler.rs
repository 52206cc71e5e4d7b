//! Compiler from procedure paths to variant graphs.
//!
//! Lowering scans a path left-to-right, accumulating consecutive tokens
//! into a pending segment. Each alternation becomes a pair of fresh
//! nodules with one sub-graph per normalized branch between them; a
//! branch's push command rides the first edge of its sub-path and the
//! matching pop rides the last, landing on the same edge when the branch
//! has no items.

use crate::graph::{Edge, EdgeId, VariantGraph};
use crate::path::{PathItem, ProcedurePath};
use crate::stack::StackCommand;
use indexmap::IndexSet;
use mise_core::{Nodule, NoduleSource, SequentialNodules};

/// Lowering failure
///
/// Every variant signals a bug in the lowering itself, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// An alternation normalized to no branches
    #[error("alternation normalized to no branches")]
    EmptyAlternation,

    /// An edge id appears in more than one adjacency entry
    #[error("edge {id} linked from more than one nodule")]
    DuplicateEdge {
        /// The offending edge id
        id: EdgeId,
    },

    /// An edge exists in the arena but no adjacency entry references it
    #[error("edge {id} is not linked from any nodule")]
    DanglingEdge {
        /// The offending edge id
        id: EdgeId,
    },
}

/// Compiler for lowering procedure paths
#[derive(Debug, Clone, Default)]
pub struct Compiler<S = SequentialNodules> {
    nodules: S,
}

impl Compiler<SequentialNodules> {
    /// Create a compiler with a deterministic sequential nodule source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: NoduleSource> Compiler<S> {
    /// Create a compiler drawing nodules from the given source
    #[must_use]
    pub fn with_source(nodules: S) -> Self {
        Self { nodules }
    }

    /// Compile a procedure path into a variant graph
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] when lowering produces an inconsistent
    /// graph; this indicates a bug in the compiler, not bad input.
    pub fn compile<T: Clone>(
        &mut self,
        path: &ProcedurePath<T>,
    ) -> Result<VariantGraph<T>, CompileError> {
        let start = self.nodules.next_nodule();
        let close = self.nodules.next_nodule();
        let mut graph = VariantGraph::new(start, close);

        self.compile_path(&path.items, start, close, &mut graph, None, None)?;

        verify(&graph)?;
        Ok(graph)
    }

    /// Lower one path between two anchors
    ///
    /// `open_command` rides the first edge built here; `close_command`
    /// rides the final edge into `close`. An empty path produces a single
    /// edge carrying both.
    fn compile_path<T: Clone>(
        &mut self,
        items: &[PathItem<T>],
        start: Nodule,
        close: Nodule,
        graph: &mut VariantGraph<T>,
        mut open_command: Option<StackCommand>,
        close_command: Option<StackCommand>,
    ) -> Result<(), CompileError> {
        let mut anchor = start;
        let mut pending: Vec<T> = Vec::new();

        for item in items {
            match item {
                PathItem::Token(token) => pending.push(token.clone()),
                PathItem::Alternation(alternation) => {
                    // Close the pending segment; only this first edge may
                    // still carry the enclosing scope's push.
                    let alt_start = self.nodules.next_nodule();
                    graph.connect(Edge {
                        src: anchor,
                        dst: alt_start,
                        tokens: std::mem::take(&mut pending),
                        start_command: open_command.take(),
                        close_command: None,
                    });

                    let alt_close = self.nodules.next_nodule();
                    let normalized = alternation.normalized();
                    if normalized.is_empty() {
                        return Err(CompileError::EmptyAlternation);
                    }
                    for alt in &normalized.alts {
                        let push = StackCommand::push(alt.slot_filter.clone());
                        let pop = StackCommand::pop(alt.slot_filter.clone());
                        self.compile_path(
                            &alt.items,
                            alt_start,
                            alt_close,
                            graph,
                            Some(push),
                            Some(pop),
                        )?;
                    }

                    anchor = alt_close;
                }
            }
        }

        graph.connect(Edge {
            src: anchor,
            dst: close,
            tokens: pending,
            start_command: open_command.take(),
            close_command,
        });
        Ok(())
    }
}

/// Check arena consistency: every edge linked from exactly one nodule
fn verify<T>(graph: &VariantGraph<T>) -> Result<(), CompileError> {
    let mut seen = IndexSet::new();
    for (_, ids) in graph.adjacency() {
        for &id in ids {
            if !seen.insert(id) {
                return Err(CompileError::DuplicateEdge { id });
            }
        }
    }
    for (id, _) in graph.edges() {
        if !seen.contains(&id) {
            return Err(CompileError::DanglingEdge { id });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{AltSequence, FilteredAlt};
    use crate::stack::StackDirection;
    use mise_core::SlotFilter;

    fn white(indices: &[u32]) -> SlotFilter {
        SlotFilter::white_list(indices.iter().copied())
    }

    fn branch(tokens: &[&'static str], filter: SlotFilter) -> FilteredAlt<&'static str> {
        FilteredAlt::new(tokens.iter().map(|t| PathItem::Token(*t)).collect(), filter)
    }

    #[test]
    fn test_compile_plain_sequence_is_one_edge() {
        let mut path = ProcedurePath::new();
        path.push_token("A");
        path.push_token("B");
        path.push_token("C");

        let graph = Compiler::new().compile(&path).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.nodule_count(), 2);

        let id = graph.outbound(graph.start())[0];
        let edge = graph.edge(id).unwrap();
        assert_eq!(edge.tokens, vec!["A", "B", "C"]);
        assert_eq!(edge.dst, graph.close());
        assert!(edge.start_command.is_none());
        assert!(edge.close_command.is_none());
    }

    #[test]
    fn test_compile_empty_path_still_connects() {
        let path: ProcedurePath<&str> = ProcedurePath::new();
        let graph = Compiler::new().compile(&path).unwrap();
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.edge(graph.outbound(graph.start())[0]).unwrap();
        assert!(edge.tokens.is_empty());
    }

    #[test]
    fn test_compile_alternation_shape() {
        // A [B {0} | C ~{0}] D
        let mut path = ProcedurePath::new();
        path.push_token("A");
        path.push_alternation(
            vec![
                branch(&["B"], white(&[0])),
                branch(&["C"], white(&[0]).invert()),
            ]
            .into(),
        );
        path.push_token("D");

        let graph = Compiler::new().compile(&path).unwrap();
        // start -> alt_start, two branches, alt_close -> close
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.nodule_count(), 4);

        let entry = graph.edge(graph.outbound(graph.start())[0]).unwrap();
        assert_eq!(entry.tokens, vec!["A"]);
        let alt_start = entry.dst;
        assert_eq!(graph.outbound(alt_start).len(), 2);

        for &id in graph.outbound(alt_start) {
            let edge = graph.edge(id).unwrap();
            let push = edge.start_command.as_ref().unwrap();
            let pop = edge.close_command.as_ref().unwrap();
            assert_eq!(push.direction, StackDirection::Push);
            assert_eq!(pop.direction, StackDirection::Pop);
            assert_eq!(push.slot_filter, pop.slot_filter);
        }
    }

    #[test]
    fn test_compile_null_branch_carries_push_and_pop_on_one_edge() {
        let mut path = ProcedurePath::new();
        path.push_alternation(vec![branch(&["I"], white(&[0]))].into());

        let graph = Compiler::new().compile(&path).unwrap();
        let else_filter = white(&[0]).invert();

        let null_edge = graph
            .edges()
            .map(|(_, edge)| edge)
            .find(|edge| edge.tokens.is_empty() && edge.start_command.is_some())
            .unwrap();
        assert_eq!(
            null_edge.start_command.as_ref().unwrap().direction,
            StackDirection::Push
        );
        assert_eq!(
            null_edge.close_command.as_ref().unwrap().direction,
            StackDirection::Pop
        );
        assert_eq!(
            null_edge.start_command.as_ref().unwrap().slot_filter,
            else_filter
        );
    }

    #[test]
    fn test_compile_branch_push_rides_into_nested_alternation() {
        // The outer branch starts with a nested alternation, so its push
        // must ride the empty segment edge into the inner alt start and
        // appear exactly once.
        let inner: AltSequence<&str> =
            vec![branch(&["P"], white(&[0])), branch(&["Q"], white(&[0]).invert())].into();
        let outer: AltSequence<&str> = vec![FilteredAlt::unfiltered(vec![
            PathItem::Alternation(inner),
            PathItem::Token("R"),
        ])]
        .into();

        let mut path = ProcedurePath::new();
        path.push_alternation(outer);

        let graph = Compiler::new().compile(&path).unwrap();

        let outer_pushes: Vec<_> = graph
            .edges()
            .filter(|(_, edge)| {
                edge.start_command
                    .as_ref()
                    .is_some_and(|command| {
                        command.direction == StackDirection::Push
                            && command.slot_filter == SlotFilter::ALLOW_ALL
                    })
            })
            .collect();
        assert_eq!(outer_pushes.len(), 1);
        let (_, carrier) = outer_pushes[0];
        assert!(carrier.tokens.is_empty());
        assert!(carrier.close_command.is_none());
    }

    #[test]
    fn test_compile_parallel_branches_stay_distinct() {
        // Two unfiltered branches with identical tokens must remain two
        // distinct edge chains.
        let mut path = ProcedurePath::new();
        path.push_alternation(
            vec![
                FilteredAlt::unfiltered(vec![PathItem::Token("X")]),
                FilteredAlt::unfiltered(vec![PathItem::Token("X")]),
            ]
            .into(),
        );

        let graph = Compiler::new().compile(&path).unwrap();
        let entry = graph.edge(graph.outbound(graph.start())[0]).unwrap();
        assert_eq!(graph.outbound(entry.dst).len(), 2);
    }

    #[test]
    fn test_compile_with_random_nodule_source() {
        let mut path = ProcedurePath::new();
        path.push_token("A");
        path.push_alternation(
            vec![
                branch(&["B"], white(&[0])),
                branch(&["C"], white(&[0]).invert()),
            ]
            .into(),
        );

        let graph = Compiler::with_source(mise_core::RandomNodules)
            .compile(&path)
            .unwrap();
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let mut path = ProcedurePath::new();
        path.push_token("A");
        path.push_alternation(
            vec![branch(&["B"], white(&[0])), branch(&["C"], white(&[1]))].into(),
        );

        let first = Compiler::new().compile(&path).unwrap();
        let second = Compiler::new().compile(&path).unwrap();
        assert_eq!(first, second);
    }
}
