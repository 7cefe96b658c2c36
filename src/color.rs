use std::fmt::{Debug, Display, Formatter};
use std::hash::Hash;

use serde::Serialize;

/// Anything usable as the colour of a [`Node`](crate::Node).
///
/// The solver never looks inside a colour; it only compares, hashes and orders them.
/// Palette indices, `char`s from a text board and [`Rgb`] triples all qualify.
pub trait Color: Copy + Eq + Hash + Ord + Debug {}

impl<T> Color for T where T: Copy + Eq + Hash + Ord + Debug {}

/// An 8-bit RGB triple, as sampled from a screenshot and averaged per palette cluster.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<(u8, u8, u8)> for Rgb {
    fn from(value: (u8, u8, u8)) -> Self {
        Self(value.0, value.1, value.2)
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}
