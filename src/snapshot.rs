//! Serializable views of graphs and solver steps, for progress logs.
//!
//! Records hold plain indexes and values, so they can be written out with any serde format after the step they came from is gone.

use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::color::Color;
use crate::graph::ColorGraph;
use crate::location::Location;
use crate::search::SolverStep;

/// One node of a [`GraphSnapshot`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NodeRecord<C> {
    /// Dense index of this node within its snapshot, in the graph's iteration order.
    pub index: usize,
    /// Where the node is.
    pub position: Location,
    /// The node's colour.
    pub color: C,
}

/// A graph laid out as an indexed node list and an adjacency list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GraphSnapshot<C> {
    /// Every node, ordered by index.
    pub nodes: Vec<NodeRecord<C>>,
    /// The sorted neighbor indexes of each node, ordered by index.
    pub adjacency: Vec<Vec<usize>>,
}

impl<C: Color> From<&ColorGraph<C>> for GraphSnapshot<C> {
    fn from(graph: &ColorGraph<C>) -> Self {
        let indexes: HashMap<_, _> = graph.nodes().enumerate().map(|(i, node)| (node, i)).collect();

        let nodes = graph.nodes()
            .enumerate()
            .map(|(index, node)| NodeRecord { index, position: node.location(), color: node.color() })
            .collect_vec();
        let adjacency = graph.nodes()
            .map(|node| graph.neighbors(node).map(|neighbor| indexes[&neighbor]).sorted().collect_vec())
            .collect_vec();

        Self { nodes, adjacency }
    }
}

/// One move of a [`StepRecord`]: tap `position`, then pick `color`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MoveRecord<C> {
    /// The location of the recoloured node.
    pub position: Location,
    /// The colour it was recoloured to.
    pub color: C,
}

/// A [`SolverStep`] flattened for logging.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StepRecord<C> {
    /// The step's number.
    pub step: usize,
    /// The best bound at the time the record was taken.
    pub minimum_ceiling: usize,
    /// Whether this step solved the puzzle.
    pub is_solution: bool,
    /// The moves on the step's branch, in order.
    pub moves: Vec<MoveRecord<C>>,
    /// The graph after the step.
    pub graph: GraphSnapshot<C>,
}

impl<C: Color> From<&SolverStep<C>> for StepRecord<C> {
    fn from(step: &SolverStep<C>) -> Self {
        Self {
            step: step.number,
            minimum_ceiling: step.cache.minimum_ceiling(),
            is_solution: step.is_solution,
            moves: step.moves.iter()
                .map(|node| MoveRecord { position: node.location(), color: node.color() })
                .collect_vec(),
            graph: GraphSnapshot::from(step.graph.as_ref()),
        }
    }
}
