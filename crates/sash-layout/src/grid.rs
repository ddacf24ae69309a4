// ABOUTME: Grid façade owning the node tree and the view index.
// ABOUTME: Adds, removes, moves and resizes views, then lays out the affected subtree.

use std::collections::HashMap;

use sash_core::{Direction, GridConfig, Orientation, Rect, Size};

use crate::distribute::Policy;
use crate::error::GridError;
use crate::location::{relative_location, Location};
use crate::node::{ConstraintOverflow, NodeId, NodeTree};
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridOptions {
    pub orientation: Orientation,
    /// Container size until the first call to [`Grid::layout`]
    pub size: Size,
    pub proportional_layout: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            size: Size::default(),
            proportional_layout: true,
        }
    }
}

impl From<&GridConfig> for GridOptions {
    fn from(config: &GridConfig) -> Self {
        Self {
            orientation: config.orientation,
            size: Size::new(config.width, config.height),
            proportional_layout: config.proportional_layout,
        }
    }
}

impl GridOptions {
    pub(crate) fn policy(&self) -> Policy {
        if self.proportional_layout {
            Policy::Proportional
        } else {
            Policy::LastFirst
        }
    }
}

/// Owned snapshot of the tree; changing it does not affect the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridNode<Id> {
    Branch {
        orientation: Orientation,
        size: Size,
        children: Vec<GridNode<Id>>,
    },
    Leaf {
        id: Id,
        size: Size,
    },
}

impl<Id> GridNode<Id> {
    pub fn is_branch(&self) -> bool {
        matches!(self, GridNode::Branch { .. })
    }

    pub fn size(&self) -> Size {
        match self {
            GridNode::Branch { size, .. } | GridNode::Leaf { size, .. } => *size,
        }
    }

    pub fn children(&self) -> &[GridNode<Id>] {
        match self {
            GridNode::Branch { children, .. } => children,
            GridNode::Leaf { .. } => &[],
        }
    }
}

/// Where a new leaf goes once a location has been resolved.
enum Insertion {
    Branch(NodeId, usize),
    WrapLeaf(NodeId, usize),
}

/// A recursive grid of views.
///
/// The root branch splits along the configured orientation and every level
/// below alternates. The grid always holds at least one view.
#[derive(Debug)]
pub struct Grid<V: View> {
    pub(crate) tree: NodeTree<V>,
    pub(crate) index: HashMap<V::Id, NodeId>,
}

impl<V: View> Grid<V> {
    pub fn new(view: V) -> Self {
        Self::with_options(view, GridOptions::default())
    }

    pub fn with_options(view: V, options: GridOptions) -> Self {
        let mut grid = Self::empty(options);
        let id = view.id();
        let root = grid.tree.root();
        let leaf = grid.tree.new_leaf(view);
        let axis = grid.tree.axis_size(root);
        grid.tree.insert_child(root, 0, leaf, axis);
        grid.index.insert(id, leaf);
        grid.tree.layout();
        grid
    }

    /// A grid with no views yet; only valid while it is being populated.
    pub(crate) fn empty(options: GridOptions) -> Self {
        Self {
            tree: NodeTree::new(options.orientation, options.size, options.policy()),
            index: HashMap::new(),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.tree.orientation()
    }

    /// Container size of the last layout.
    pub fn size(&self) -> Size {
        self.tree.container()
    }

    pub fn view_count(&self) -> usize {
        self.index.len()
    }

    pub fn contains(&self, id: &V::Id) -> bool {
        self.index.contains_key(id)
    }

    pub fn view(&self, id: &V::Id) -> Option<&V> {
        self.tree.view(*self.index.get(id)?)
    }

    pub fn view_mut(&mut self, id: &V::Id) -> Option<&mut V> {
        self.tree.view_mut(*self.index.get(id)?)
    }

    /// Views in visual order.
    pub fn views(&self) -> impl Iterator<Item = &V> + '_ {
        self.tree
            .leaves()
            .into_iter()
            .filter_map(move |leaf| self.tree.view(leaf))
    }

    pub fn view_location(&self, id: &V::Id) -> Result<Location, GridError> {
        Ok(self.tree.location(self.leaf(id)?))
    }

    pub fn view_rect(&self, id: &V::Id) -> Result<Rect, GridError> {
        Ok(self.tree.rect(self.leaf(id)?))
    }

    /// Size assigned to the view by the last layout.
    pub fn view_size(&self, id: &V::Id) -> Result<Size, GridError> {
        self.view_rect(id).map(|rect| rect.size())
    }

    /// Rectangles of every view in container coordinates.
    pub fn view_rects(&self) -> HashMap<V::Id, Rect> {
        self.tree
            .leaf_rects()
            .into_iter()
            .filter_map(|(leaf, rect)| Some((self.tree.view(leaf)?.id(), rect)))
            .collect()
    }

    /// Set the container size and lay out the whole tree.
    pub fn layout(&mut self, width: u32, height: u32) {
        self.tree.set_container(Size::new(width, height));
        self.tree.layout();
        if let Some(overflow) = self.overflow() {
            tracing::warn!(
                orientation = ?overflow.orientation,
                required = overflow.required,
                available = overflow.available,
                "container too small for view minimums"
            );
        }
    }

    /// Reports when the container cannot satisfy every minimum.
    pub fn overflow(&self) -> Option<ConstraintOverflow> {
        self.tree.overflow()
    }

    /// Re-run layout after a view's constraints changed.
    pub fn on_view_did_change(&mut self, id: &V::Id) -> Result<(), GridError> {
        self.leaf(id)?;
        tracing::debug!(view = ?id, "view constraints changed");
        self.tree.layout();
        Ok(())
    }

    /// Insert `view` next to `reference`, asking for `size` along the split axis.
    pub fn add_view(
        &mut self,
        view: V,
        size: u32,
        reference: &V::Id,
        direction: Direction,
    ) -> Result<(), GridError> {
        let id = view.id();
        if self.contains(&id) {
            return Err(GridError::DuplicateView(format!("{id:?}")));
        }
        let reference_location = self.view_location(reference)?;
        let location = relative_location(self.orientation(), &reference_location, direction);
        tracing::debug!(view = ?id, ?reference, ?direction, %location, size, "adding view");
        self.add_view_at(view, size, &location)
    }

    /// Insert `view` so that it ends up at `location`.
    ///
    /// The location may point one level below an existing leaf (index 0 or 1),
    /// in which case that leaf is wrapped in a new branch first.
    pub fn add_view_at(&mut self, view: V, size: u32, location: &Location) -> Result<(), GridError> {
        let id = view.id();
        if self.contains(&id) {
            return Err(GridError::DuplicateView(format!("{id:?}")));
        }
        let insertion = self.resolve(location)?;
        let leaf = self.tree.new_leaf(view);
        let branch = self.insert_leaf(leaf, size, insertion);
        self.index.insert(id, leaf);
        // The new minimum may not fit the target branch; grow it from above.
        let start = self.tree.fitting_ancestor(branch);
        self.tree.layout_node(start);
        Ok(())
    }

    /// Take `id` out of the grid and hand it back.
    pub fn remove_view(&mut self, id: &V::Id) -> Result<V, GridError> {
        let leaf = self.leaf(id)?;
        if self.index.len() == 1 {
            return Err(GridError::LastView(format!("{id:?}")));
        }

        let holder = self.detach(leaf).ok_or_else(|| GridError::unknown(id))?;
        self.index.remove(id);
        self.tree.layout_node(holder);
        tracing::debug!(view = ?id, remaining = self.index.len(), "removed view");
        self.tree.take_leaf(leaf).ok_or_else(|| GridError::unknown(id))
    }

    /// Move `id` next to `reference` with one layout pass at the end.
    pub fn move_view(
        &mut self,
        id: &V::Id,
        size: u32,
        reference: &V::Id,
        direction: Direction,
    ) -> Result<(), GridError> {
        let leaf = self.leaf(id)?;
        self.leaf(reference)?;
        if id == reference {
            return Err(GridError::SelfReference(format!("{id:?}")));
        }

        self.detach(leaf).ok_or_else(|| GridError::unknown(id))?;
        let reference_location = self.view_location(reference)?;
        let location = relative_location(self.orientation(), &reference_location, direction);
        // A live reference always resolves; the fallback keeps the detached leaf
        // in the tree if it ever does not.
        let insertion = self.resolve(&location);
        debug_assert!(insertion.is_ok(), "moving {id:?}: {location} does not resolve");
        let insertion = insertion.unwrap_or_else(|_| {
            let root = self.tree.root();
            Insertion::Branch(root, self.tree.children(root).len())
        });
        self.insert_leaf(leaf, size, insertion);
        tracing::debug!(view = ?id, ?reference, ?direction, %location, size, "moved view");
        self.tree.layout();
        Ok(())
    }

    /// Resize a view by moving the sashes of its nearest ancestors.
    ///
    /// The width is taken from the closest horizontal branch on the path to the
    /// root and the height from the closest vertical one. Returns whether any
    /// dimension changed; a dimension is left alone when a neighbour would
    /// leave its bounds.
    pub fn resize_view(&mut self, id: &V::Id, size: Size) -> Result<bool, GridError> {
        let leaf = self.leaf(id)?;
        let mut applied = false;

        for along in [Orientation::Horizontal, Orientation::Vertical] {
            let mut child = leaf;
            while let Some((branch, index)) = self.tree.index_in_parent(child) {
                if self.tree.orientation_of(branch) == along {
                    let delta = i64::from(size.along(along)) - i64::from(self.tree.size(child));
                    if delta != 0 && self.tree.resize_child(branch, index, delta) {
                        self.tree.layout_node(branch);
                        applied = true;
                    }
                    break;
                }
                child = branch;
            }
        }

        tracing::debug!(view = ?id, ?size, applied, "resize view");
        Ok(applied)
    }

    /// Owned structural snapshot of the tree.
    pub fn get_views(&self) -> GridNode<V::Id> {
        let root = self.tree.root();
        let orientation = self.orientation();
        GridNode::Branch {
            orientation,
            size: self.size(),
            children: self.snapshot_children(root, orientation, self.tree.cross_size(root)),
        }
    }

    fn snapshot_children(&self, branch: NodeId, orientation: Orientation, cross: u32) -> Vec<GridNode<V::Id>> {
        self.tree
            .children(branch)
            .iter()
            .filter_map(|child| {
                let along = self.tree.size(*child);
                let size = Size::from_axes(orientation, along, cross);
                if self.tree.is_branch(*child) {
                    let child_orientation = orientation.orthogonal();
                    Some(GridNode::Branch {
                        orientation: child_orientation,
                        size,
                        children: self.snapshot_children(*child, child_orientation, along),
                    })
                } else {
                    let id = self.tree.view(*child)?.id();
                    Some(GridNode::Leaf { id, size })
                }
            })
            .collect()
    }

    /// Hand every view back in visual order.
    pub fn into_views(self) -> Vec<V> {
        self.tree.into_views()
    }

    fn leaf(&self, id: &V::Id) -> Result<NodeId, GridError> {
        self.index.get(id).copied().ok_or_else(|| GridError::unknown(id))
    }

    /// Check that `location` names an insertion point without touching the tree.
    fn resolve(&self, location: &Location) -> Result<Insertion, GridError> {
        let invalid = || GridError::InvalidLocation(location.clone());
        let (rest, index) = location.tail().ok_or_else(invalid)?;
        let target = self.tree.node_at(rest).ok_or_else(invalid)?;

        if self.tree.is_branch(target) {
            if index > self.tree.children(target).len() {
                return Err(invalid());
            }
            Ok(Insertion::Branch(target, index))
        } else {
            if index > 1 {
                return Err(invalid());
            }
            Ok(Insertion::WrapLeaf(target, index))
        }
    }

    /// Attach a detached leaf; returns the branch whose subtree needs layout.
    fn insert_leaf(&mut self, leaf: NodeId, size: u32, insertion: Insertion) -> NodeId {
        let (branch, index) = match insertion {
            Insertion::Branch(branch, index) => (branch, index),
            Insertion::WrapLeaf(target, index) => match self.tree.wrap_in_branch(target) {
                Some(branch) => (branch, index),
                None => (self.tree.root(), 0),
            },
        };
        self.tree.insert_child(branch, index, leaf, size);
        branch
    }

    /// Unlink a leaf from its parent; returns the branch now holding its siblings.
    fn detach(&mut self, leaf: NodeId) -> Option<NodeId> {
        let (parent, index) = self.tree.index_in_parent(leaf)?;
        self.tree.remove_child(parent, index).map(|(_, holder)| holder)
    }
}
