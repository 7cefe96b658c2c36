use std::collections::HashSet;
use std::marker::PhantomData;
use std::num::NonZero;

use ndarray::Array2;
use thiserror::Error;
use unordered_pair::UnorderedPair;

use crate::color::Color;
use crate::graph::{ColorGraph, GraphError, Node};
use crate::location::{Dimension, Location};
use crate::shape::{BoardShape, SquareStep, Step, TriangleStep};

/// Reasons a builder may become invalid while building.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum BuilderInvalidReason {
    /// A feature like a colour or a wall was placed outside the bounds specified by `dims` on a builder.
    #[error("feature placed out of bounds")]
    FeatureOutOfBounds,
    /// A location was neither painted nor dropped by the time the board was built.
    #[error("location {0:?} was never painted")]
    Unpainted(Location),
    /// The board has no cells left, or was given no rows at all.
    #[error("the board is empty")]
    EmptyBoard,
    /// The painted cells did not form a valid graph.
    #[error(transparent)]
    InvalidGraph(#[from] GraphError),
}

/// Functionality all builders must implement, parametrised over the colour type `C` of the resulting graph.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
pub trait Builder<C: Color>: Clone {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(x, y)` order.
    fn with_dims(dims: (Dimension, Dimension)) -> Self;
    /// Give the cell at `location` a colour, replacing any colour it had.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if `location` is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    fn paint(&mut self, location: Location, color: C) -> &mut Self;
    /// Drop a location from the board, leaving a hole which nothing floods through.
    /// The colour here, if any, is ignored regardless of where in the chain this method is called.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if `location` is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    fn drop_location(&mut self, location: Location) -> &mut Self;
    /// Disconnect the two `locations`, i.e. place a wall between them.
    ///
    /// If the two locations are not adjacent, this function does nothing and does not invalidate the builder.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](BuilderInvalidReason::FeatureOutOfBounds) invalid state if either location is out of bounds.
    /// If the builder is already in an invalid state, this function does nothing.
    fn disconnect(&mut self, locations: UnorderedPair<Location>) -> &mut Self;
    /// Check the validity of this builder, ensuring no [`BuilderInvalidReason`] condition has arisen.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<BuilderInvalidReason>)` otherwise.
    /// Unpainted cells are only detected by [`Self::build`].
    fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>>;
    /// Convert the state of this builder into a colour-proper [`ColorGraph`], merging adjacent cells of equal colour.
    /// If the builder is invalid for any reason, a [`Vec`] of [`BuilderInvalidReason`] will indicate why.
    fn build(&self) -> Result<ColorGraph<C>, Vec<BuilderInvalidReason>>;
}

/// A builder for boards of cells shaped by `Sh`, each painted with a colour `C`.
///
/// Cells become nodes in column-major order, left to right, each column top to bottom.
#[derive(Clone, Debug)]
pub struct BoardBuilder<Sh: Step, C: Color> {
    // width, height
    dims: (Dimension, Dimension),
    cells: Array2<Option<C>>,
    invalid_reasons: Vec<BuilderInvalidReason>,
    // walls
    edge_blacklist: HashSet<UnorderedPair<Location>>,
    // holes
    location_blacklist: HashSet<Location>,
    shape: PhantomData<Sh>,
}

/// A builder for rectangular boards of square cells.
pub type SquareBoardBuilder<C> = BoardBuilder<SquareStep, C>;
/// A builder for KAMI 2 boards of triangular cells; see [`TriangleStep`] for the layout.
pub type TriangleBoardBuilder<C> = BoardBuilder<TriangleStep, C>;

impl<Sh: Step, C: Color> BoardBuilder<Sh, C> {
    /// The dimensions of this board, in `(x, y)` order.
    pub fn dims(&self) -> (Dimension, Dimension) {
        self.dims
    }

    #[inline]
    fn in_bounds(&self, location: Location) -> bool {
        location.0 < self.dims.0.get() && location.1 < self.dims.1.get()
    }

    /// Shorthand for multiple calls to [`Builder::disconnect`], with the same conditions.
    ///
    /// Disconnect cells neighboring `location`.
    /// Any appearance of a direction after the first in `directions` is ignored.
    pub fn disconnect_around(&mut self, location: Location, directions: Vec<Sh>) -> &mut Self {
        for direction in directions {
            if let Some(other) = direction.attempt_from(location) {
                self.disconnect(UnorderedPair::from((location, other)));
            }
        }

        self
    }

    fn node_at(&self, location: Location) -> Option<Node<C>> {
        if !self.in_bounds(location) || self.location_blacklist.contains(&location) {
            return None;
        }

        self.cells.get(location.as_index())
            .copied()
            .flatten()
            .map(|color| Node::new(location, color))
    }
}

impl BoardBuilder<SquareStep, char> {
    /// Shorthand for a square board given as text, one string per row and one `char` per cell.
    ///
    /// See [`BoardBuilder::paint_rows`].
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BuilderInvalidReason> {
        BoardBuilder::paint_rows(rows)
    }
}

impl<Sh: Step> BoardBuilder<Sh, char> {
    /// Build up a board given as text, one string per row and one `char` per cell.
    ///
    /// `.` and spaces are holes, as is everything past the end of a row shorter than the longest.
    /// Every other `char` is a colour.
    /// Fails with [`EmptyBoard`](BuilderInvalidReason::EmptyBoard) if there are no rows or every row is empty.
    pub fn paint_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BuilderInvalidReason> {
        let width = rows.iter().map(|row| row.as_ref().chars().count()).max().unwrap_or(0);
        let (Some(width), Some(height)) = (NonZero::new(width), NonZero::new(rows.len())) else {
            return Err(BuilderInvalidReason::EmptyBoard);
        };

        let mut builder = Self::with_dims((width, height));
        for (y, row) in rows.iter().enumerate() {
            let mut chars = row.as_ref().chars();
            for x in 0..width.get() {
                match chars.next() {
                    Some(color) if color != '.' && !color.is_whitespace() => builder.paint(Location(x, y), color),
                    _ => builder.drop_location(Location(x, y)),
                };
            }
        }

        Ok(builder)
    }
}

impl<Sh: Step, C: Color> Builder<C> for BoardBuilder<Sh, C> {
    fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            cells: Array2::from_elem((dims.1.get(), dims.0.get()), None),

            invalid_reasons: Default::default(),
            edge_blacklist: Default::default(),
            location_blacklist: Default::default(),
            shape: PhantomData,
        }
    }

    fn paint(&mut self, location: Location, color: C) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        match self.cells.get_mut(location.as_index()) {
            Some(cell) => *cell = Some(color),
            None => self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds),
        }

        self
    }

    fn drop_location(&mut self, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !self.in_bounds(location) {
            self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
            return self;
        }

        self.location_blacklist.insert(location);
        self
    }

    fn disconnect(&mut self, locations: UnorderedPair<Location>) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        for location in [locations.0, locations.1] {
            if !self.in_bounds(location) {
                self.invalid_reasons.push(BuilderInvalidReason::FeatureOutOfBounds);
                return self;
            }
        }

        if Sh::direction_to(locations.0, locations.1).is_none() {
            return self;
        }

        self.edge_blacklist.insert(locations);
        self
    }

    fn is_valid(&self) -> Option<&Vec<BuilderInvalidReason>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    fn build(&self) -> Result<ColorGraph<C>, Vec<BuilderInvalidReason>> {
        if !self.invalid_reasons.is_empty() {
            return Err(self.invalid_reasons.clone());
        }

        let mut nodes = Vec::with_capacity(self.cells.len());
        let mut unpainted = Vec::new();
        for x in 0..self.dims.0.get() {
            for y in 0..self.dims.1.get() {
                let location = Location(x, y);
                if self.location_blacklist.contains(&location) {
                    continue;
                }
                match self.node_at(location) {
                    Some(node) => nodes.push(node),
                    None => unpainted.push(BuilderInvalidReason::Unpainted(location)),
                }
            }
        }

        if !unpainted.is_empty() {
            return Err(unpainted);
        }
        if nodes.is_empty() {
            return Err(vec![BuilderInvalidReason::EmptyBoard]);
        }

        let edges = nodes.iter()
            .flat_map(|node| {
                let node = *node;
                Sh::neighbors_of(node.location())
                    .into_iter()
                    .filter(move |(_, other)| !self.edge_blacklist.contains(&UnorderedPair::from((node.location(), *other))))
                    .filter_map(move |(_, other)| self.node_at(other))
                    .map(move |other| (node, other))
            });

        let graph = ColorGraph::from_edges(nodes.iter().copied(), edges)
            .map_err(|err| vec![BuilderInvalidReason::from(err)])?;

        Ok(graph.merge_same_colored())
    }
}
