// ABOUTME: Geometry value types shared by the layout engine and its consumers.
// ABOUTME: Orientation/direction algebra, sizes, rectangles and min/max constraints.

use serde::{Deserialize, Serialize};

/// Maximum used for "no upper bound" on a view dimension.
pub const UNBOUNDED: u32 = u32::MAX;

/// Axis along which a branch lays out its children.
///
/// `Vertical` stacks children top to bottom, `Horizontal` places them left to
/// right. Persisted as `0` / `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl Orientation {
    pub fn orthogonal(self) -> Self {
        match self {
            Orientation::Vertical => Orientation::Horizontal,
            Orientation::Horizontal => Orientation::Vertical,
        }
    }

    /// Orientation of a branch at `depth` below a root with this orientation.
    pub fn at_depth(self, depth: usize) -> Self {
        if depth % 2 == 0 {
            self
        } else {
            self.orthogonal()
        }
    }
}

impl From<Orientation> for u8 {
    fn from(orientation: Orientation) -> u8 {
        match orientation {
            Orientation::Vertical => 0,
            Orientation::Horizontal => 1,
        }
    }
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Orientation::Vertical),
            1 => Ok(Orientation::Horizontal),
            other => Err(format!("invalid orientation {other}, expected 0 or 1")),
        }
    }
}

/// Where a new view goes relative to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The axis this direction moves along.
    pub fn orientation(self) -> Orientation {
        match self {
            Direction::Up | Direction::Down => Orientation::Vertical,
            Direction::Left | Direction::Right => Orientation::Horizontal,
        }
    }

    /// Down and Right insert after the reference, Up and Left before it.
    pub fn is_after(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extent along `orientation`: height for vertical, width for horizontal.
    pub fn along(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Vertical => self.height,
            Orientation::Horizontal => self.width,
        }
    }

    /// Build a size from its extent along `orientation` and across it.
    pub fn from_axes(orientation: Orientation, along: u32, across: u32) -> Self {
        match orientation {
            Orientation::Vertical => Self::new(across, along),
            Orientation::Horizontal => Self::new(along, across),
        }
    }
}

/// Rectangle in container pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Sub-rectangle starting `offset` along `orientation` with extent `extent`.
    pub fn slice(&self, orientation: Orientation, offset: u32, extent: u32) -> Rect {
        match orientation {
            Orientation::Vertical => Rect {
                x: self.x,
                y: self.y.saturating_add(offset),
                width: self.width,
                height: extent,
            },
            Orientation::Horizontal => Rect {
                x: self.x.saturating_add(offset),
                y: self.y,
                width: extent,
                height: self.height,
            },
        }
    }
}

/// Size bounds a view reports to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraints {
    pub minimum_width: u32,
    pub maximum_width: u32,
    pub minimum_height: u32,
    pub maximum_height: u32,
}

impl Constraints {
    pub fn new(minimum_width: u32, maximum_width: u32, minimum_height: u32, maximum_height: u32) -> Self {
        Self {
            minimum_width,
            maximum_width: maximum_width.max(minimum_width),
            minimum_height,
            maximum_height: maximum_height.max(minimum_height),
        }
    }

    /// Minimum in both dimensions, no maximum.
    pub fn at_least(minimum_width: u32, minimum_height: u32) -> Self {
        Self::new(minimum_width, UNBOUNDED, minimum_height, UNBOUNDED)
    }

    /// `(min, max)` along `orientation`.
    pub fn range(&self, orientation: Orientation) -> (u32, u32) {
        match orientation {
            Orientation::Vertical => (self.minimum_height, self.maximum_height),
            Orientation::Horizontal => (self.minimum_width, self.maximum_width),
        }
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self::at_least(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_alternates_with_depth() {
        let root = Orientation::Vertical;
        assert_eq!(root.at_depth(0), Orientation::Vertical);
        assert_eq!(root.at_depth(1), Orientation::Horizontal);
        assert_eq!(root.at_depth(2), Orientation::Vertical);
        assert_eq!(Orientation::Horizontal.at_depth(3), Orientation::Vertical);
    }

    #[test]
    fn orientation_persists_as_integer() {
        assert_eq!(serde_json::to_string(&Orientation::Vertical).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Orientation::Horizontal).unwrap(), "1");
        let parsed: Orientation = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Orientation::Horizontal);
        assert!(serde_json::from_str::<Orientation>("2").is_err());
    }

    #[test]
    fn direction_axes() {
        assert_eq!(Direction::Up.orientation(), Orientation::Vertical);
        assert_eq!(Direction::Down.orientation(), Orientation::Vertical);
        assert_eq!(Direction::Left.orientation(), Orientation::Horizontal);
        assert_eq!(Direction::Right.orientation(), Orientation::Horizontal);
        assert!(!Direction::Up.is_after());
        assert!(Direction::Right.is_after());
    }

    #[test]
    fn size_axes() {
        let size = Size::new(800, 600);
        assert_eq!(size.along(Orientation::Vertical), 600);
        assert_eq!(size.along(Orientation::Horizontal), 800);
        assert_eq!(Size::from_axes(Orientation::Vertical, 600, 800), size);
        assert_eq!(Size::from_axes(Orientation::Horizontal, 800, 600), size);
    }

    #[test]
    fn constraints_never_invert() {
        let c = Constraints::new(100, 50, 10, 20);
        assert_eq!(c.range(Orientation::Horizontal), (100, 100));
        assert_eq!(c.range(Orientation::Vertical), (10, 20));
    }

    #[test]
    fn rect_slices_along_axis() {
        let rect = Rect { x: 10, y: 20, width: 800, height: 600 };
        assert_eq!(
            rect.slice(Orientation::Vertical, 200, 400),
            Rect { x: 10, y: 220, width: 800, height: 400 }
        );
        assert_eq!(
            rect.slice(Orientation::Horizontal, 600, 200),
            Rect { x: 610, y: 20, width: 200, height: 600 }
        );
    }
}
