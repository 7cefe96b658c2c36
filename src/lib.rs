#![warn(missing_docs)]

//! # `kami2-solver`
//!
//! A solver for [KAMI 2](https://www.stateofplaygames.com/work/kami2) and other flood-fill puzzles: find the fewest moves which turn a board into a single colour.
//! Begin by building a graph, either directly with [`ColorGraph::new`] or from a grid using a builder such as [`SquareBoardBuilder`](builder::SquareBoardBuilder) or [`TriangleBoardBuilder`](builder::TriangleBoardBuilder).
//! Then call [`solve()`], which yields a lazy [`Solver`] iterator of [`SolverStep`]s.
//! Drive it to the end and the [`minimum_ceiling`](SolverCache::minimum_ceiling) of the search is the answer.
//!
//! Colours are opaque to the solver: any `Copy + Eq + Hash + Ord + Debug` type will do (see [`Color`]).
//! Board geometry lives in the [`shape`] module as the `Sh` type parameter of the builders.
//!
//! # Internals
//! A board is expressed as an undirected graph G. A vertex is a maximal region of one colour and edges, naturally, join touching regions.
//! A move recolours one vertex, merging it with every neighbor of the new colour; the puzzle is solved once one vertex is left.
//!
//! The search is a depth-first branch-and-bound over move sequences:
//! 1. Every vertex in turn is the first one recoloured.
//! A branch keeps recolouring the vertex it flooded, trying only colours of its current neighbors and colours its last move exposed, in a fixed ranking.
//! 2. Once a flooded vertex has tried every colour, the branch may switch to recolouring some other vertex ranked after the one it started from.
//! This keeps each set of moves from being explored in more than one order.
//! 3. Every move shortens any path by at most two hops, so a branch whose graph is wider than twice its remaining moves is cut,
//! and vertices which cannot lie on every long path are never chosen next.
//!
//! Each improving solution lowers the shared bound, so later branches are cut sooner.
//! Each explored move is handed to the caller as a [`SolverStep`]; [`snapshot`] turns steps into serializable records for logs.

pub use analysis::DistanceMatrix;
pub use builder::Builder;
pub use color::{Color, Rgb};
pub use graph::{ColorGraph, GraphError, Node};
pub use location::{Dimension, Location};
pub use search::{SearchInfo, SolverCache, SolverStep};
pub use solver::{solve, solve_with_ranking, Solver, SolverFailure};

pub(crate) mod analysis;
pub(crate) mod color;
pub(crate) mod graph;
pub(crate) mod location;
pub(crate) mod search;
pub(crate) mod solver;
pub mod builder;
pub mod shape;
pub mod snapshot;
