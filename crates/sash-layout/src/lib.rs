// ABOUTME: Recursive split-view layout engine.
// ABOUTME: Arranges views in alternating rows and columns and keeps them sized to a container.

pub(crate) mod distribute;
mod error;
mod grid;
mod location;
mod node;
mod serialize;
mod view;

pub use error::GridError;
pub use grid::{Grid, GridNode, GridOptions};
pub use location::{location_orientation, relative_location, Location};
pub use node::ConstraintOverflow;
pub use serialize::{SerializedGrid, SerializedNode};
pub use view::{BoxError, SerializableView, View, ViewDeserializer};
