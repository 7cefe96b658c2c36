use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use itertools::Itertools;

use crate::color::Color;
use crate::graph::{ColorGraph, Node};
use crate::location::Location;

/// State shared by every branch of one search.
///
/// Only [`minimum_ceiling`](Self::minimum_ceiling) ever changes, and only from the single active branch.
#[derive(Debug)]
pub struct SolverCache<C: Color> {
    minimum_ceiling: Cell<usize>,
    node_ranking: Vec<Location>,
    color_ranking: Vec<C>,
    color_positions: HashMap<C, usize>,
}

impl<C: Color> SolverCache<C> {
    pub(crate) fn new(minimum_ceiling: usize, node_ranking: Vec<Location>, color_ranking: Vec<C>) -> Self {
        let color_positions = color_ranking.iter()
            .enumerate()
            .map(|(i, color)| (*color, i))
            .collect();

        Self {
            minimum_ceiling: Cell::new(minimum_ceiling),
            node_ranking,
            color_ranking,
            color_positions,
        }
    }

    /// The fewest moves known to solve the puzzle so far. Never increases.
    pub fn minimum_ceiling(&self) -> usize {
        self.minimum_ceiling.get()
    }

    pub(crate) fn lower_ceiling(&self, moves: usize) {
        debug_assert!(moves < self.minimum_ceiling.get());
        self.minimum_ceiling.set(moves);
    }

    /// How many more moves a branch that has made `moves_made` may make and still beat the ceiling.
    ///
    /// [`None`] when even one more move could only tie it.
    pub fn moves_left(&self, moves_made: usize) -> Option<usize> {
        self.minimum_ceiling().checked_sub(moves_made + 1).filter(|left| *left > 0)
    }

    /// The fixed order of the initial graph's locations.
    pub fn node_ranking(&self) -> &[Location] {
        &self.node_ranking
    }

    /// The fixed order in which colours are tried.
    pub fn color_ranking(&self) -> &[C] {
        &self.color_ranking
    }

    /// `colors` without duplicates, in [`color_ranking`](Self::color_ranking) order.
    ///
    /// # Panics
    /// If a colour is not in the ranking; the ranking is checked against the graph before a search starts.
    pub fn reorder_and_dedup_colors(&self, colors: impl IntoIterator<Item=C>) -> Vec<C> {
        colors.into_iter()
            .map(|color| match self.color_positions.get(&color) {
                Some(position) => *position,
                None => panic!("{color:?} is not in the color ranking"),
            })
            .sorted_unstable()
            .dedup()
            .map(|position| self.color_ranking[position])
            .collect_vec()
    }
}

/// One branch of the search: a move history, the graph it produced, and what to try next.
///
/// Branches are never modified; a new branch is derived for every move and every change of focus.
#[derive(Debug)]
pub struct SearchInfo<C: Color> {
    /// The graph after [`chosen_nodes`](Self::chosen_nodes).
    pub graph: Rc<ColorGraph<C>>,
    /// The node produced by each move so far, in order.
    pub chosen_nodes: Vec<Node<C>>,
    /// The node to be recoloured next.
    pub focused_node: Node<C>,
    /// Locations which may still become the focus when this branch changes focus, in ranking order.
    pub other_allowed_nodes: Vec<Location>,
    /// Colours not yet tried on the focused node, in ranking order.
    pub untried_colors: Vec<C>,
    /// The branch this one was derived from.
    pub parent: Option<Rc<SearchInfo<C>>>,
}

impl<C: Color> SearchInfo<C> {
    /// A branch with no moves yet, focused on `focused_node`.
    pub(crate) fn root(
        cache: &SolverCache<C>,
        graph: Rc<ColorGraph<C>>,
        focused_node: Node<C>,
        other_allowed_nodes: Vec<Location>,
    ) -> Self {
        let untried_colors = cache.reorder_and_dedup_colors(graph.neighbors(focused_node).map(|node| node.color));

        Self {
            graph,
            chosen_nodes: Vec::new(),
            focused_node,
            other_allowed_nodes,
            untried_colors,
            parent: None,
        }
    }

    /// The branch continuing from `parent` after its focus was merged into `merged`.
    pub(crate) fn after_move(
        parent: &Rc<Self>,
        graph: Rc<ColorGraph<C>>,
        merged: Node<C>,
        untried_colors: Vec<C>,
    ) -> Self {
        let mut chosen_nodes = Vec::with_capacity(parent.chosen_nodes.len() + 1);
        chosen_nodes.extend_from_slice(&parent.chosen_nodes);
        chosen_nodes.push(merged);

        Self {
            graph,
            chosen_nodes,
            focused_node: merged,
            other_allowed_nodes: parent.other_allowed_nodes.clone(),
            untried_colors,
            parent: Some(Rc::clone(parent)),
        }
    }

    /// The branch which keeps `parent`'s moves but recolours `focused_node` next.
    pub(crate) fn refocused(
        parent: &Rc<Self>,
        focused_node: Node<C>,
        other_allowed_nodes: Vec<Location>,
        untried_colors: Vec<C>,
    ) -> Self {
        Self {
            graph: Rc::clone(&parent.graph),
            chosen_nodes: parent.chosen_nodes.clone(),
            focused_node,
            other_allowed_nodes,
            untried_colors,
            parent: Some(Rc::clone(parent)),
        }
    }

    /// The number of moves made on this branch.
    pub fn moves_made(&self) -> usize {
        self.chosen_nodes.len()
    }

    /// Colours of nodes which recolouring the focus to `color` would bring next to it for the first time:
    /// neighbors of the focus's `color` neighbors that are neither the focus nor already its neighbors.
    pub(crate) fn exposed_colors(&self, color: C) -> Vec<C> {
        let graph = &self.graph;
        graph.neighbors(self.focused_node)
            .filter(|neighbor| neighbor.color == color)
            .flat_map(|neighbor| graph.neighbors(neighbor))
            .filter(|second| *second != self.focused_node && !graph.are_adjacent(self.focused_node, *second))
            .map(|second| second.color)
            .collect_vec()
    }
}

/// One explored move, handed to whoever drives the search.
#[derive(Clone, Debug)]
pub struct SolverStep<C: Color> {
    /// 1-based count of moves explored so far in this search.
    pub number: usize,
    /// The graph after the move.
    pub graph: Rc<ColorGraph<C>>,
    /// The node produced by each move on this branch, this move last.
    pub moves: Vec<Node<C>>,
    /// The search's shared state, read it for the current best bound.
    pub cache: Rc<SolverCache<C>>,
    /// Whether the move collapsed the graph to a single node, setting a new [`minimum_ceiling`](SolverCache::minimum_ceiling).
    pub is_solution: bool,
}
