// ABOUTME: Error type for grid operations.
// ABOUTME: Every variant is reported before the tree is touched.

use crate::location::Location;
use crate::view::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("View {0} is not part of the grid")]
    UnknownView(String),

    #[error("View {0} is already part of the grid")]
    DuplicateView(String),

    #[error("Cannot remove view {0}: the grid must keep at least one view")]
    LastView(String),

    #[error("View {0} cannot be moved relative to itself")]
    SelfReference(String),

    #[error("No insertion point at location {0}")]
    InvalidLocation(Location),

    #[error("Malformed grid state: {0}")]
    MalformedState(String),

    #[error("Failed to restore view: {0}")]
    ViewDeserialize(#[source] BoxError),
}

impl GridError {
    pub(crate) fn unknown(id: &impl std::fmt::Debug) -> Self {
        GridError::UnknownView(format!("{id:?}"))
    }
}
