use std::hash::Hash;

use itertools::Itertools;
use strum::VariantArray;

use crate::location::Location;

/// Functionality that must be implemented on a case-by-case basis for any board shape.
///
/// [`SquareStep`] and [`TriangleStep`] are built-in implementations.
pub trait Step: Sized + Copy + VariantArray + PartialEq + Eq + Hash + Ord + PartialOrd {
    /// Attempt the step from `location` in the direction specified by `self` and return the resultant [`Location`].
    ///
    /// Returns [`None`] if the step would leave the board through its top or left edge.
    /// Steps off the bottom or right edge still succeed; the builder checks those against its dimensions.
    fn attempt_from(&self, location: Location) -> Option<Location>;
    /// Invert the direction specified by `self`, such that stepping one way then the inverse way returns to the start.
    fn invert(&self) -> Self;
}

/// The square cell type and rectangular board shape.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum SquareStep {
    /// Towards row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Towards column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl Step for SquareStep {
    fn attempt_from(&self, location: Location) -> Option<Location> {
        match self {
            Self::Up => location.offset_by((0, -1)),
            Self::Down => location.offset_by((0, 1)),
            Self::Left => location.offset_by((-1, 0)),
            Self::Right => location.offset_by((1, 0)),
        }
    }

    fn invert(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// NB: we organize triangular grids as columns of triangles, alternating in direction:
//
//   column 0  1  2  3
//         |> <|  |> <|    rows of each column stack downwards
//
// even columns point right and odd columns point left.
// a triangle shares its flat side with the column on its flat side and each slanted side with a triangle in the column it points away from;
// which two rows those are depends on the column pair, since every other pair is offset half a row
//
//   pair 0 (columns 0, 1): (1, r) touches (0, r) and (0, r + 1)
//   pair 1 (columns 2, 3): (3, r) touches (2, r - 1) and (2, r)
/// The triangular cell type found in KAMI 2 puzzles.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum TriangleStep {
    /// Across the flat side, i.e. left from a right-pointing triangle and right from a left-pointing one.
    Flat,
    /// Across the upper slanted side.
    Upper,
    /// Across the lower slanted side.
    Lower,
}

impl TriangleStep {
    /// Whether the triangle at `location` points right, i.e. its flat side faces left.
    pub fn points_right(location: Location) -> bool {
        location.0 & 1 == 0
    }
}

impl Step for TriangleStep {
    fn attempt_from(&self, location: Location) -> Option<Location> {
        let pair_is_offset = (location.0 / 2) & 1 == 1;

        if Self::points_right(location) {
            match self {
                Self::Flat => location.offset_by((-1, 0)),
                Self::Upper => location.offset_by((1, if pair_is_offset { 0 } else { -1 })),
                Self::Lower => location.offset_by((1, if pair_is_offset { 1 } else { 0 })),
            }
        } else {
            match self {
                Self::Flat => location.offset_by((1, 0)),
                Self::Upper => location.offset_by((-1, if pair_is_offset { -1 } else { 0 })),
                Self::Lower => location.offset_by((-1, if pair_is_offset { 0 } else { 1 })),
            }
        }
    }

    fn invert(&self) -> Self {
        match self {
            Self::Flat => Self::Flat,
            Self::Upper => Self::Lower,
            Self::Lower => Self::Upper,
        }
    }
}

/// Functionality on top of [`Step`] with identical implementation across all `Sh`.
pub trait BoardShape: Step {
    /// Get all neighbors of a [`Location`] in "theory", by attempting every step direction in `Self::VARIANTS`.
    ///
    /// Steps which would leave the board through the top or left edge are skipped.
    fn neighbors_of(location: Location) -> Vec<(Self, Location)>;
    /// Determine the direction from `a` to `b` by calling [`attempt_from`](Step::attempt_from) until one works.
    ///
    /// Returns [`None`] if `a` and `b` are not adjacent on a board of this shape.
    fn direction_to(a: Location, b: Location) -> Option<Self>;
}

impl<Sh> BoardShape for Sh
where
    Sh: Step,
{
    fn neighbors_of(location: Location) -> Vec<(Self, Location)> {
        Self::VARIANTS.iter()
            .filter_map(|dir| Some((*dir, dir.attempt_from(location)?)))
            .collect_vec()
    }

    fn direction_to(a: Location, b: Location) -> Option<Self> {
        Self::VARIANTS.iter().find(|dir| dir.attempt_from(a) == Some(b)).copied()
    }
}
