use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use ndarray::{Array2, ArrayView1};

use crate::color::Color;
use crate::graph::{ColorGraph, Node};

/// Hop counts between every pair of nodes in a [`ColorGraph`].
///
/// Each node is assigned a dense index; [`Self::distance`] and [`Self::row`] look nodes up by value.
/// Pairs that cannot reach each other keep the sentinel distance `node_count`.
#[derive(Clone, Debug)]
pub struct DistanceMatrix<C: Color> {
    indexes: HashMap<Node<C>, usize>,
    distances: Array2<usize>,
}

impl<C: Color> DistanceMatrix<C> {
    /// The index assigned to `node`.
    pub fn index_of(&self, node: Node<C>) -> Option<usize> {
        self.indexes.get(&node).copied()
    }

    /// Every node and its index.
    pub fn indexes(&self) -> &HashMap<Node<C>, usize> {
        &self.indexes
    }

    /// The number of hops between `a` and `b`, or [`None`] if either is not in the matrix.
    pub fn distance(&self, a: Node<C>, b: Node<C>) -> Option<usize> {
        Some(self.distances[[self.index_of(a)?, self.index_of(b)?]])
    }

    /// All distances from `node`, laid out by index.
    pub fn row(&self, node: Node<C>) -> Option<ArrayView1<'_, usize>> {
        Some(self.distances.row(self.index_of(node)?))
    }

    /// The raw matrix, laid out by index.
    pub fn as_array(&self) -> &Array2<usize> {
        &self.distances
    }

    /// The eccentricity of each node: the largest entry of its row.
    pub fn eccentricities(&self) -> HashMap<Node<C>, usize> {
        self.indexes.iter()
            .map(|(node, i)| (*node, self.distances.row(*i).iter().copied().max().unwrap_or(0)))
            .collect()
    }

    /// The largest distance in the matrix, i.e. the diameter of the graph.
    pub fn max_eccentricity(&self) -> usize {
        self.distances.iter().copied().max().unwrap_or(0)
    }
}

impl<C: Color> ColorGraph<C> {
    /// All pairs shortest hop counts, indexing nodes in iteration order.
    pub fn distance_matrix(&self) -> DistanceMatrix<C> {
        let indexes = self.nodes().enumerate().map(|(i, node)| (node, i)).collect();
        self.distance_matrix_with(indexes)
    }

    /// All pairs shortest hop counts using caller-chosen indexes.
    ///
    /// One breadth-first expansion per node, O(n²) overall on these sparse graphs; puzzles are small enough that nothing cleverer pays off.
    ///
    /// # Panics
    /// If `indexes` does not hold exactly the nodes of this graph with indexes below the node count.
    pub fn distance_matrix_with(&self, indexes: HashMap<Node<C>, usize>) -> DistanceMatrix<C> {
        let node_count = self.node_count();
        assert_eq!(indexes.len(), node_count, "indexes must be the same length as the graph");
        assert!(
            indexes.iter().all(|(node, i)| *i < node_count && self.contains(*node)),
            "indexes must cover exactly the nodes of the graph",
        );

        let mut distances = Array2::from_elem((node_count, node_count), node_count);

        for (center, center_index) in indexes.iter() {
            let mut seen = HashSet::from([*center]);
            let mut frontier = vec![*center];
            let mut distance = 1;

            while !frontier.is_empty() {
                let mut next_frontier = Vec::new();
                for node in frontier {
                    for neighbor in self.neighbors(node) {
                        if seen.insert(neighbor) {
                            distances[[*center_index, indexes[&neighbor]]] = distance;
                            next_frontier.push(neighbor);
                        }
                    }
                }

                frontier = next_frontier;
                distance += 1;
            }

            distances[[*center_index, *center_index]] = 0;
        }

        DistanceMatrix { indexes, distances }
    }

    /// The eccentricity of every node: its largest distance to any other node.
    pub fn eccentricities(&self) -> HashMap<Node<C>, usize> {
        self.distance_matrix().eccentricities()
    }

    /// Whether `moves_left` moves could possibly collapse this graph.
    ///
    /// A move contracts one node with some of its neighbors, shortening any path by at most 2 hops,
    /// so a graph whose largest eccentricity exceeds `2 * moves_left` cannot end as a single node.
    pub fn is_feasible(&self, moves_left: usize) -> bool {
        self.distance_matrix().max_eccentricity() <= 2 * moves_left
    }

    /// Every node if [`Self::is_feasible`] holds for `moves_left`, otherwise none.
    pub fn exclude_impossible_starts(&self, moves_left: usize) -> Vec<Node<C>> {
        if !self.is_feasible(moves_left) {
            return Vec::new();
        }

        // high eccentricity alone does not rule a node out; something else has to be left to flood into it
        self.nodes().collect_vec()
    }

    /// Nodes which cannot be the next one recoloured if the graph is to be collapsed within `allowed_moves` moves.
    ///
    /// After the move on `c`, the remaining `allowed_moves - 1` moves need every pair `(u, w)` within `2 * (allowed_moves - 1)` hops.
    /// The move only shortens paths through `c`'s merged star, to no less than `d(u, c) + d(c, w) - 2`,
    /// so `c` is ruled out when some pair farther apart than that has `d(u, c) + d(c, w) > 2 * allowed_moves`.
    /// Every node is ruled out when the graph is not [feasible](Self::is_feasible) at all.
    ///
    /// This only ever excludes nodes that no solution of the allowed length could recolour next.
    pub fn bad_starting_nodes(&self, allowed_moves: usize) -> HashSet<Node<C>> {
        if allowed_moves == 0 {
            return self.nodes().collect();
        }

        let matrix = self.distance_matrix();
        if matrix.max_eccentricity() > 2 * allowed_moves {
            return self.nodes().collect();
        }

        let distances = matrix.as_array();
        let far_pairs = (0..self.node_count())
            .tuple_combinations()
            .filter(|&(u, w)| distances[[u, w]] > 2 * (allowed_moves - 1))
            .collect_vec();

        matrix.indexes().iter()
            .filter(|(_, c)| far_pairs.iter().any(|&(u, w)| distances[[u, **c]] + distances[[**c, w]] > 2 * allowed_moves))
            .map(|(node, _)| *node)
            .collect()
    }
}
