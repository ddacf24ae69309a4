// ABOUTME: Index paths addressing nodes from the root of the grid tree.
// ABOUTME: Also computes where a new view lands relative to an existing one.

use std::fmt;
use std::ops::Deref;

use sash_core::{Direction, Orientation};

/// Child indices to follow from the root; empty means the root itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Location(Vec<usize>);

impl Location {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    /// Location of the enclosing node, `None` for the root.
    pub fn parent(&self) -> Option<Location> {
        self.tail().map(|(rest, _)| Location(rest.to_vec()))
    }

    /// Split into the parent path and the last index.
    pub fn tail(&self) -> Option<(&[usize], usize)> {
        self.0.split_last().map(|(last, rest)| (rest, *last))
    }

    /// True when `self` is a proper prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Location) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn child(&self, index: usize) -> Location {
        let mut child = self.clone();
        child.push(index);
        child
    }
}

impl Deref for Location {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Location {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for Location {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Location {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}

/// Orientation of the branch that the last index of `location` points into.
///
/// A location of length `n` names a child of a branch at depth `n - 1`. The
/// empty location is treated as a child of a virtual parent above the root.
pub fn location_orientation(root: Orientation, location: &[usize]) -> Orientation {
    root.at_depth(location.len() + 1)
}

/// Where a view inserted `direction` of the node at `location` must go.
///
/// Along the parent's axis the new view becomes a sibling (before for Up/Left,
/// after for Down/Right). Across it, the node gets wrapped in a new branch and
/// the new view becomes its first or second child.
pub fn relative_location(root: Orientation, location: &Location, direction: Direction) -> Location {
    let after = usize::from(direction.is_after());

    let Some((rest, index)) = location.tail() else {
        return Location(vec![after]);
    };

    if location_orientation(root, location) == direction.orientation() {
        let mut sibling = Location::from(rest);
        sibling.push(index + after);
        sibling
    } else {
        location.child(after)
    }
}
