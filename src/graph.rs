use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use itertools::Itertools;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use thiserror::Error;

use crate::color::Color;
use crate::location::Location;

/// A region of the puzzle: a fixed [`Location`] and its current colour.
///
/// Nodes are plain values. Recolouring produces a new node via [`Node::with_color`]; the old value is untouched.
/// Equality covers both fields, so a node and its recoloured replacement are different graph vertices,
/// while [`Node::location`] stays the identity used for rankings and presence checks.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Node<C: Color> {
    pub(crate) location: Location,
    pub(crate) color: C,
}

impl<C: Color> Node<C> {
    /// Construct a node at `location` with `color`.
    pub fn new(location: Location, color: C) -> Self {
        Self { location, color }
    }

    /// The location of this node, i.e. its identity.
    pub fn location(&self) -> Location {
        self.location
    }

    /// The current colour of this node.
    pub fn color(&self) -> C {
        self.color
    }

    /// A new node at the same location carrying `color`.
    pub fn with_color(&self, color: C) -> Self {
        Self { location: self.location, color }
    }
}

/// Reasons a [`ColorGraph`] could not be constructed or relabelled.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum GraphError {
    /// A node was listed as its own neighbor.
    #[error("node at {0:?} is connected to itself")]
    SelfLoop(Location),
    /// Two different nodes share one location.
    #[error("more than one node at {0:?}")]
    DuplicateLocation(Location),
    /// A node's colour has no entry in the label map passed to [`ColorGraph::combine_neighbors`].
    #[error("colour of the node at {0:?} has no label")]
    UnlabeledColor(Location),
    /// A label has no entry in the average colour map passed to [`ColorGraph::combine_neighbors`].
    #[error("label of the node at {0:?} has no average colour")]
    MissingAverage(Location),
}

/// An undirected graph of colored regions.
///
/// Adjacency is symmetric by construction and self-loops are rejected.
/// A graph is never modified once built: [`recolor_node_and_merge`](Self::recolor_node_and_merge) returns a new graph, so search branches can share a graph freely.
/// Nodes iterate in insertion order, which is stable.
#[derive(Clone, Debug)]
pub struct ColorGraph<C: Color> {
    pub(crate) connections: UnGraphMap<Node<C>, ()>,
    pub(crate) by_location: HashMap<Location, Node<C>>,
}

impl<C: Color> ColorGraph<C> {
    /// Build a graph from each node and its neighbors.
    ///
    /// Neighbor lists need not be symmetric; every listed pair becomes an undirected edge.
    /// Nodes are ordered by first appearance, a node before its neighbors.
    pub fn new<I, J>(connections: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item=(Node<C>, J)>,
        J: IntoIterator<Item=Node<C>>,
    {
        let mut graph = Self::empty(0, 0);

        for (node, neighbors) in connections {
            graph.insert_node(node)?;
            for neighbor in neighbors {
                if neighbor == node {
                    return Err(GraphError::SelfLoop(node.location));
                }
                graph.insert_node(neighbor)?;
                graph.connections.add_edge(node, neighbor, ());
            }
        }

        Ok(graph)
    }

    /// Build a graph from a node list and an edge list. Nodes keep the order of `nodes`.
    ///
    /// Edges between nodes missing from `nodes` add those nodes at the end.
    pub fn from_edges<I, E>(nodes: I, edges: E) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item=Node<C>>,
        E: IntoIterator<Item=(Node<C>, Node<C>)>,
    {
        let nodes = nodes.into_iter();
        let mut graph = Self::empty(nodes.size_hint().0, 0);
        for node in nodes {
            graph.insert_node(node)?;
        }
        for (a, b) in edges {
            if a == b {
                return Err(GraphError::SelfLoop(a.location));
            }
            graph.insert_node(a)?;
            graph.insert_node(b)?;
            graph.connections.add_edge(a, b, ());
        }

        Ok(graph)
    }

    fn empty(nodes: usize, edges: usize) -> Self {
        Self {
            connections: UnGraphMap::with_capacity(nodes, edges),
            by_location: HashMap::with_capacity(nodes),
        }
    }

    fn insert_node(&mut self, node: Node<C>) -> Result<(), GraphError> {
        match self.by_location.get(&node.location) {
            Some(existing) if *existing != node => Err(GraphError::DuplicateLocation(node.location)),
            Some(_) => Ok(()),
            None => {
                self.by_location.insert(node.location, node);
                self.connections.add_node(node);
                Ok(())
            }
        }
    }

    /// The number of nodes.
    pub fn node_count(&self) -> usize {
        self.connections.node_count()
    }

    /// The number of edges, as stored.
    pub fn edge_count(&self) -> usize {
        self.connections.edge_count()
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item=Node<C>> + '_ {
        self.connections.nodes()
    }

    /// The neighbors of `node`; empty if `node` is not in this graph.
    pub fn neighbors(&self, node: Node<C>) -> impl Iterator<Item=Node<C>> + '_ {
        self.contains(node)
            .then(|| self.connections.neighbors(node))
            .into_iter()
            .flatten()
    }

    /// Whether this exact node (location and colour) is in the graph.
    pub fn contains(&self, node: Node<C>) -> bool {
        self.connections.contains_node(node)
    }

    /// Whether `a` and `b` are adjacent.
    pub fn are_adjacent(&self, a: Node<C>, b: Node<C>) -> bool {
        self.connections.contains_edge(a, b)
    }

    /// The node currently occupying `location`, if it has not been absorbed by a merge.
    pub fn node_at(&self, location: Location) -> Option<Node<C>> {
        self.by_location.get(&location).copied()
    }

    /// The distinct colours present, in order of first appearance.
    pub fn colors(&self) -> Vec<C> {
        self.nodes().map(|node| node.color).unique().collect_vec()
    }

    /// Whether no two adjacent nodes share a colour. The solver requires this of its input.
    pub fn is_color_proper(&self) -> bool {
        self.connections.all_edges().all(|(a, b, _)| a.color != b.color)
    }

    /// Whether every node can reach every other node. An empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.nodes().next() else {
            return true;
        };

        let mut bfs = Bfs::new(&self.connections, start);
        let mut reached = 0;
        while bfs.next(&self.connections).is_some() {
            reached += 1;
        }

        reached == self.node_count()
    }

    /// The number of edges, computed as half the double-counted degree sum.
    ///
    /// # Panics
    /// If the double count is odd, which would mean the adjacency is not symmetric.
    pub fn n_edges(&self) -> usize {
        let double_count: usize = self.nodes()
            .map(|node| self.connections.neighbors(node).count())
            .sum();
        assert_eq!(double_count & 1, 0, "double counted edges should be even, got {double_count}");

        double_count / 2
    }

    /// Collapse every maximal connected group of nodes whose colours share a label into one node.
    ///
    /// `color_labels` maps each colour to its cluster label and `average_color` maps each label to the colour its merged node will carry.
    /// The node of each group that comes first in iteration order represents the group.
    /// Two representatives are adjacent when any members of their groups were.
    /// The result has no two adjacent nodes with the same label.
    pub fn combine_neighbors<L>(
        &self,
        color_labels: &HashMap<C, L>,
        average_color: &HashMap<L, C>,
    ) -> Result<Self, GraphError>
    where
        L: Copy + Eq + Hash,
    {
        self.combine_by(|color| color_labels.get(color).copied(), |label| average_color.get(label).copied())
    }

    /// Merge adjacent nodes of equal colour so the graph becomes colour-proper.
    pub fn merge_same_colored(&self) -> Self {
        // every colour labels itself, so neither lookup can fail
        match self.combine_by(|color| Some(*color), |color| Some(*color)) {
            Ok(graph) => graph,
            Err(err) => unreachable!("identity labelling failed: {err}"),
        }
    }

    fn combine_by<L>(
        &self,
        label_of: impl Fn(&C) -> Option<L>,
        average_of: impl Fn(&L) -> Option<C>,
    ) -> Result<Self, GraphError>
    where
        L: Copy + Eq + Hash,
    {
        let labels = self.nodes()
            .map(|node| label_of(&node.color).map(|label| (node, label)).ok_or(GraphError::UnlabeledColor(node.location)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        let mut representative_of: HashMap<Node<C>, Node<C>> = HashMap::with_capacity(self.node_count());
        let mut representatives = Vec::new();

        for start in self.nodes() {
            if representative_of.contains_key(&start) {
                continue;
            }

            let label = labels[&start];
            let color = average_of(&label).ok_or(GraphError::MissingAverage(start.location))?;
            let representative = start.with_color(color);
            representatives.push(representative);
            representative_of.insert(start, representative);

            let mut border = vec![start];
            while let Some(node) = border.pop() {
                for neighbor in self.connections.neighbors(node) {
                    if representative_of.contains_key(&neighbor) || labels[&neighbor] != label {
                        continue;
                    }
                    representative_of.insert(neighbor, representative);
                    border.push(neighbor);
                }
            }
        }

        let mut combined = Self::empty(representatives.len(), self.edge_count());
        for representative in representatives {
            combined.insert_node(representative)?;
        }
        for (a, b, _) in self.connections.all_edges() {
            let (a, b) = (representative_of[&a], representative_of[&b]);
            if a != b {
                combined.connections.add_edge(a, b, ());
            }
        }

        Ok(combined)
    }

    /// Recolour `to_recolor` to `color` and merge it with every direct neighbor already of that colour: one flood-fill move.
    ///
    /// Returns the new graph and the merged node, which sits at `to_recolor`'s location.
    /// `self` is left untouched.
    ///
    /// On a colour-proper graph one hop is enough: a same-coloured neighbor's own same-coloured neighbors would already be adjacent to it,
    /// so the result is colour-proper too. If no neighbor has `color`, only the colour changes.
    ///
    /// # Panics
    /// If `to_recolor` is not in this graph.
    pub fn recolor_node_and_merge(&self, to_recolor: Node<C>, color: C) -> (Self, Node<C>) {
        assert!(self.contains(to_recolor), "cannot recolor {to_recolor:?}, it is not in the graph");

        let recolored = to_recolor.with_color(color);
        let to_merge: HashSet<Node<C>> = self.connections.neighbors(to_recolor)
            .filter(|node| node.color == color)
            .chain([to_recolor])
            .collect();

        let mut merged = Self::empty(self.node_count() + 1 - to_merge.len(), self.edge_count());
        for node in self.nodes() {
            if node == to_recolor {
                merged.by_location.insert(recolored.location, recolored);
                merged.connections.add_node(recolored);
            } else if !to_merge.contains(&node) {
                merged.by_location.insert(node.location, node);
                merged.connections.add_node(node);
            }
        }

        let replace = |node: Node<C>| if to_merge.contains(&node) { recolored } else { node };
        for (a, b, _) in self.connections.all_edges() {
            let (a, b) = (replace(a), replace(b));
            if a != b {
                merged.connections.add_edge(a, b, ());
            }
        }

        (merged, recolored)
    }
}
