//! Exhaustive walk enumeration.
//!
//! A walk is one complete start-to-close traversal of a variant graph; the
//! enumerator visits every branch of every alternation, so the walk count
//! is the product of branch counts along the way. Iteration is lazy and
//! restartable; nothing is cached between calls.

use crate::graph::{EdgeId, VariantGraph};
use crate::stack::StackCommand;
use crate::validate::{validate, ChoiceSequence};
use mise_core::Nodule;
use serde::{Deserialize, Serialize};

/// One complete start-to-close traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Walk {
    /// Edges traversed, in order
    pub hops: Vec<EdgeId>,
    /// Stack commands carried by those edges, flattened in traversal order
    pub commands: Vec<StackCommand>,
}

/// Depth-first frame: a nodule and the next outbound edge to try
#[derive(Debug, Clone)]
struct Frame {
    nodule: Nodule,
    next: usize,
}

/// Lazy iterator over every complete walk of a graph
#[derive(Debug)]
pub struct Walks<'g, T> {
    graph: &'g VariantGraph<T>,
    frames: Vec<Frame>,
    hops: Vec<EdgeId>,
}

impl<'g, T> Walks<'g, T> {
    pub(crate) fn new(graph: &'g VariantGraph<T>) -> Self {
        Self {
            graph,
            frames: vec![Frame {
                nodule: graph.start(),
                next: 0,
            }],
            hops: Vec::new(),
        }
    }

    /// Collect the flattened command sequence along the current hops
    fn commands(&self) -> Vec<StackCommand> {
        let mut commands = Vec::new();
        for &id in &self.hops {
            if let Some(edge) = self.graph.edge(id) {
                if let Some(command) = &edge.start_command {
                    commands.push(command.clone());
                }
                if let Some(command) = &edge.close_command {
                    commands.push(command.clone());
                }
            }
        }
        commands
    }
}

impl<T> Iterator for Walks<'_, T> {
    type Item = Walk;

    fn next(&mut self) -> Option<Walk> {
        loop {
            let frame = self.frames.last_mut()?;
            let outbound = self.graph.outbound(frame.nodule);

            if frame.next < outbound.len() {
                let id = outbound[frame.next];
                frame.next += 1;
                match self.graph.edge(id) {
                    Some(edge) => {
                        self.hops.push(id);
                        self.frames.push(Frame {
                            nodule: edge.dst,
                            next: 0,
                        });
                    }
                    None => {
                        tracing::warn!("edge {} missing from arena; dropping branch", id);
                    }
                }
                continue;
            }

            // Exhausted this nodule; a nodule with no outbound edges at
            // all is a terminal.
            let terminal = outbound.is_empty();
            let nodule = frame.nodule;
            let walk = if terminal && nodule == self.graph.close() {
                Some(Walk {
                    hops: self.hops.clone(),
                    commands: self.commands(),
                })
            } else {
                if terminal {
                    tracing::warn!(
                        "walk ended at {} instead of the close nodule; dropping",
                        nodule
                    );
                }
                None
            };

            self.frames.pop();
            self.hops.pop();
            if let Some(walk) = walk {
                return Some(walk);
            }
        }
    }
}

impl<T> VariantGraph<T> {
    /// Lazily enumerate every complete walk from start to close
    #[must_use]
    pub fn walks(&self) -> Walks<'_, T> {
        Walks::new(self)
    }

    /// Lazily enumerate legal walks with their choice sequences
    ///
    /// Walks whose stack-command sequences fail validation are filtered
    /// out; the common case across a rich graph's search space.
    pub fn legal_walks(&self) -> impl Iterator<Item = (Walk, ChoiceSequence)> {
        self.walks()
            .filter_map(|walk| validate(&walk.commands).ok().map(|choices| (walk, choices)))
    }

    /// Concatenate the tokens along a walk's hops, in order
    #[must_use]
    pub fn walk_tokens(&self, walk: &Walk) -> Vec<&T> {
        walk.hops
            .iter()
            .filter_map(|&id| self.edge(id))
            .flat_map(|edge| edge.tokens.iter())
            .collect()
    }
}
