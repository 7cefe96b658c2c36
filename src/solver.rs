use std::collections::HashSet;
use std::rc::Rc;

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, debug_span, info, trace};

use crate::color::Color;
use crate::graph::{ColorGraph, Node};
use crate::search::{SearchInfo, SolverCache, SolverStep};

/// Reasons a search cannot start.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum SolverFailure {
    /// The graph has no nodes.
    #[error("the graph is empty")]
    EmptyGraph,
    /// Some nodes cannot reach each other, so the graph can never become a single node.
    #[error("the graph is not connected")]
    Disconnected,
    /// Two adjacent nodes share a colour; merge them first with [`ColorGraph::merge_same_colored`].
    #[error("adjacent nodes share a colour")]
    NotColorProper,
    /// An explicit colour ranking does not list exactly the colours present in the graph.
    #[error("the colour ranking does not match the colours in the graph")]
    ColorRankingMismatch,
}

/// Search for the fewest moves collapsing `graph` to one node, trying colours in order of first appearance.
///
/// See [`Solver`].
pub fn solve<C: Color>(graph: ColorGraph<C>) -> Result<Solver<C>, SolverFailure> {
    let color_ranking = graph.colors();
    Solver::new(graph, color_ranking)
}

/// As [`solve`], trying colours in the order of `color_ranking`, which must list each colour of `graph` exactly once.
pub fn solve_with_ranking<C: Color>(graph: ColorGraph<C>, color_ranking: Vec<C>) -> Result<Solver<C>, SolverFailure> {
    let present: HashSet<C> = graph.colors().into_iter().collect();
    let ranked: HashSet<C> = color_ranking.iter().copied().collect();
    if color_ranking.len() != present.len() || ranked != present {
        return Err(SolverFailure::ColorRankingMismatch);
    }

    Solver::new(graph, color_ranking)
}

enum Phase<C: Color> {
    Entry,
    Colors { next: usize },
    Fallback { candidates: Vec<Node<C>>, bad: HashSet<Node<C>>, next: usize },
}

struct Frame<C: Color> {
    info: Rc<SearchInfo<C>>,
    flooded: bool,
    phase: Phase<C>,
}

/// A lazy branch-and-bound search, yielding a [`SolverStep`] for every move it explores.
///
/// Each node of the input graph in turn is the first one recoloured.
/// A branch keeps recolouring its merged node through every colour worth trying, then may hand the focus to a node ranked after the one it started from.
/// Branches which can no longer beat [`SolverCache::minimum_ceiling`] are cut.
/// Once the iterator is exhausted, the ceiling is the minimum number of moves and the last step with [`is_solution`](SolverStep::is_solution) holds a move sequence achieving it.
///
/// Nothing runs ahead of the consumer: dropping the iterator cancels the search.
pub struct Solver<C: Color> {
    cache: Rc<SolverCache<C>>,
    graph: Rc<ColorGraph<C>>,
    next_first: usize,
    // bad first nodes, for the moves left when they were computed
    pub(crate) root_bad: Option<(usize, HashSet<Node<C>>)>,
    stack: Vec<Frame<C>>,
    steps: usize,
}

impl<C: Color> Solver<C> {
    fn new(graph: ColorGraph<C>, color_ranking: Vec<C>) -> Result<Self, SolverFailure> {
        let _span = debug_span!("solver_setup", nodes = graph.node_count()).entered();

        if graph.node_count() == 0 {
            return Err(SolverFailure::EmptyGraph);
        }
        if !graph.is_connected() {
            return Err(SolverFailure::Disconnected);
        }
        if !graph.is_color_proper() {
            return Err(SolverFailure::NotColorProper);
        }

        // a lone node is already solved
        let minimum_ceiling = match graph.node_count() {
            1 => 0,
            n => n,
        };
        let node_ranking = graph.nodes().map(|node| node.location()).collect_vec();

        info!(
            nodes = graph.node_count(),
            edges = graph.n_edges(),
            colors = color_ranking.len(),
            "starting search",
        );

        Ok(Self {
            cache: Rc::new(SolverCache::new(minimum_ceiling, node_ranking, color_ranking)),
            graph: Rc::new(graph),
            next_first: 0,
            root_bad: None,
            stack: Vec::new(),
            steps: 0,
        })
    }

    /// The state shared with every step.
    pub fn cache(&self) -> &Rc<SolverCache<C>> {
        &self.cache
    }

    /// The number of steps yielded so far.
    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Push a root branch for the next first node worth trying, returning `false` once every first node is done.
    fn start_next_root(&mut self) -> bool {
        while self.next_first < self.cache.node_ranking().len() {
            let index = self.next_first;
            self.next_first += 1;

            let Some(moves_left) = self.cache.moves_left(0) else {
                continue;
            };
            let location = self.cache.node_ranking()[index];
            let Some(first) = self.graph.node_at(location) else {
                continue;
            };
            if self.root_bad_starts(moves_left).contains(&first) {
                debug!(?location, moves_left, "skipping first node");
                continue;
            }

            debug!(?location, ceiling = self.cache.minimum_ceiling(), "starting from first node");
            let other_allowed_nodes = self.cache.node_ranking()[index + 1..].to_vec();
            let info = SearchInfo::root(&self.cache, Rc::clone(&self.graph), first, other_allowed_nodes);
            self.stack.push(Frame { info: Rc::new(info), flooded: false, phase: Phase::Entry });
            return true;
        }

        false
    }

    /// Nodes of the input graph which cannot be recoloured first in a solution of at most `moves_left` moves.
    ///
    /// Recomputed only when `moves_left` differs from the last call, i.e. after the ceiling drops.
    pub(crate) fn root_bad_starts(&mut self, moves_left: usize) -> &HashSet<Node<C>> {
        let bad = match self.root_bad.take() {
            Some((cached, bad)) if cached == moves_left => bad,
            _ => {
                trace!(moves_left, "computing bad first nodes");
                self.graph.bad_starting_nodes(moves_left)
            }
        };

        &self.root_bad.insert((moves_left, bad)).1
    }

    /// Advance the top frame by one action, returning a step if that action was a move.
    fn advance(&mut self) -> Option<SolverStep<C>> {
        let cache = Rc::clone(&self.cache);
        let frame = self.stack.last_mut()?;
        let info = Rc::clone(&frame.info);

        match &mut frame.phase {
            Phase::Entry => {
                let feasible = cache.moves_left(info.moves_made())
                    .is_some_and(|moves_left| info.graph.is_feasible(moves_left));
                if feasible {
                    frame.phase = Phase::Colors { next: 0 };
                } else {
                    trace!(moves = info.moves_made(), "branch cannot beat the ceiling");
                    self.stack.pop();
                }
                None
            }
            Phase::Colors { next } => {
                if cache.moves_left(info.moves_made()).is_none() {
                    self.stack.pop();
                    return None;
                }

                let Some(&color) = info.untried_colors.get(*next) else {
                    self.enter_fallback();
                    return None;
                };
                *next += 1;

                let untried_colors = cache.reorder_and_dedup_colors(
                    info.untried_colors[*next..].iter().copied().chain(info.exposed_colors(color))
                );
                let (graph, merged) = info.graph.recolor_node_and_merge(info.focused_node, color);
                let graph = Rc::new(graph);
                let child = SearchInfo::after_move(&info, Rc::clone(&graph), merged, untried_colors);
                let is_solution = graph.node_count() == 1;

                self.steps += 1;
                let step = SolverStep {
                    number: self.steps,
                    graph,
                    moves: child.chosen_nodes.clone(),
                    cache: Rc::clone(&cache),
                    is_solution,
                };
                trace!(step = self.steps, moves = child.moves_made(), is_solution, "explored move");

                if is_solution {
                    cache.lower_ceiling(child.moves_made());
                    info!(minimum_ceiling = child.moves_made(), step = self.steps, "found a better solution");
                    // a solution closes this branch, remaining colours included
                    self.stack.pop();
                } else {
                    self.stack.push(Frame { info: Rc::new(child), flooded: true, phase: Phase::Entry });
                }

                Some(step)
            }
            Phase::Fallback { candidates, bad, next } => {
                let Some(&candidate) = candidates.get(*next) else {
                    self.stack.pop();
                    return None;
                };
                *next += 1;

                if bad.contains(&candidate) {
                    return None;
                }

                let mut untried_colors = cache.reorder_and_dedup_colors(info.graph.neighbors(candidate).map(|node| node.color));
                // recolouring into the focus a node that was never next to the focus's previous self
                // gives the same graph as doing that move first
                if let Some(parent) = &info.parent {
                    if parent.focused_node.color() == candidate.color() && info.graph.are_adjacent(candidate, info.focused_node) {
                        untried_colors.retain(|color| *color != info.focused_node.color());
                    }
                }

                let other_allowed_nodes = candidates[*next..].iter().map(|node| node.location()).collect_vec();
                let child = SearchInfo::refocused(&info, candidate, other_allowed_nodes, untried_colors);
                self.stack.push(Frame { info: Rc::new(child), flooded: false, phase: Phase::Entry });
                None
            }
        }
    }

    /// Switch the top frame to trying other focus nodes, or drop it if its focus was never flooded.
    fn enter_fallback(&mut self) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let moves_left = self.cache.moves_left(frame.info.moves_made());
        let (true, Some(moves_left)) = (frame.flooded, moves_left) else {
            self.stack.pop();
            return;
        };

        let info = &frame.info;
        let candidates = info.other_allowed_nodes.iter()
            .filter_map(|location| info.graph.node_at(*location))
            .filter(|node| *node != info.focused_node)
            .collect_vec();
        let bad = info.graph.bad_starting_nodes(moves_left);

        frame.phase = Phase::Fallback { candidates, bad, next: 0 };
    }
}

impl<C: Color> Iterator for Solver<C> {
    type Item = SolverStep<C>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.stack.is_empty() && !self.start_next_root() {
                return None;
            }
            if let Some(step) = self.advance() {
                return Some(step);
            }
        }
    }
}
