// ABOUTME: Shared types and configuration for sashgrid.
// ABOUTME: Defines orientations, directions, size constraints and config file handling.

pub mod config;
pub mod geometry;

pub use config::{ConfigError, GridConfig};
pub use geometry::{Constraints, Direction, Orientation, Rect, Size, UNBOUNDED};
