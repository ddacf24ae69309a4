// ABOUTME: Capabilities the engine needs from the views it arranges.
// ABOUTME: Sizing, optional JSON persistence, and a factory for restoring views.

use std::fmt::Debug;
use std::hash::Hash;

use sash_core::Constraints;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A rectangular unit of content placed in the grid.
///
/// The grid asks for constraints and reports the box it assigned through
/// [`View::layout`]. When constraints change, forward the notification with
/// [`Grid::on_view_did_change`](crate::Grid::on_view_did_change).
pub trait View {
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;

    fn constraints(&self) -> Constraints;

    fn layout(&mut self, width: u32, height: u32);
}

/// A view that can describe itself for persistence.
pub trait SerializableView: View {
    fn to_json(&self) -> serde_json::Value;
}

/// Rebuilds views from the data their `to_json` produced.
pub trait ViewDeserializer {
    type View: View;

    fn from_json(&mut self, data: &serde_json::Value) -> Result<Self::View, BoxError>;
}
