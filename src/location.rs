use std::num::NonZero;

use ndarray::Ix;
use serde::Serialize;

pub(crate) type Coord = usize;
/// A board dimension, i.e. a width or height; never zero.
pub type Dimension = NonZero<Coord>;

/// A location `(x, y)` on a board. The top left corner is `Location(0, 0)`.
///
/// A location stands in for the centre of a puzzle cell and is the identity of a [`Node`](crate::Node):
/// recolouring a node keeps its location, and a graph never holds two nodes at one location.
#[derive(Clone, Eq, Hash, Copy, PartialEq, Ord, PartialOrd, Debug, Serialize)]
pub struct Location(pub Coord, pub Coord);

impl Location {
    pub(crate) fn as_index(&self) -> (Coord, Coord) {
        (self.1, self.0)
    }

    /// Offset this location, returning [`None`] if either coordinate would become negative.
    pub fn offset_by(self, rhs: (isize, isize)) -> Option<Self> {
        Some(Self(self.0.checked_add_signed(rhs.0)?, self.1.checked_add_signed(rhs.1)?))
    }
}

impl From<(Ix, Ix)> for Location {
    fn from(value: (Ix, Ix)) -> Self {
        Self(value.1, value.0)
    }
}
