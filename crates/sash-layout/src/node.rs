// ABOUTME: Arena-backed tree of branch and leaf nodes for grid layout.
// ABOUTME: Supports inserting, removing, collapsing, resizing and laying out nodes.

use slotmap::SlotMap;

use sash_core::{Orientation, Rect, Size};

use crate::distribute::{self, Policy, Slot};
use crate::location::Location;
use crate::view::View;

slotmap::new_key_type! {
    /// Stable handle to a node; survives reparenting and collapses.
    pub struct NodeId;
}

#[derive(Debug)]
pub(crate) enum NodeKind<V> {
    Leaf(V),
    Branch(Vec<NodeId>),
}

/// `size` is the node's extent along its parent's orientation. A node's
/// extent across that axis is shared with its siblings and lives on the parent.
#[derive(Debug)]
pub(crate) struct Node<V> {
    parent: Option<NodeId>,
    size: u32,
    kind: NodeKind<V>,
}

/// Space a branch cannot provide along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintOverflow {
    pub orientation: Orientation,
    /// Sum of minimums along `orientation`
    pub required: u32,
    /// Container extent along `orientation`
    pub available: u32,
}

/// Orientation is never stored: a branch's orientation follows from its depth
/// and the root orientation.
#[derive(Debug)]
pub(crate) struct NodeTree<V> {
    nodes: SlotMap<NodeId, Node<V>>,
    root: NodeId,
    orientation: Orientation,
    container: Size,
    policy: Policy,
}

impl<V: View> NodeTree<V> {
    pub fn new(orientation: Orientation, container: Size, policy: Policy) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            parent: None,
            size: container.along(orientation.orthogonal()),
            kind: NodeKind::Branch(Vec::new()),
        });
        Self {
            nodes,
            root,
            orientation,
            container,
            policy,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn set_container(&mut self, container: Size) {
        self.container = container;
        self.nodes[self.root].size = container.along(self.orientation.orthogonal());
    }

    /// Allocate a detached leaf.
    pub fn new_leaf(&mut self, view: V) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            size: 0,
            kind: NodeKind::Leaf(view),
        })
    }

    /// Allocate a detached, empty branch.
    pub fn new_branch(&mut self) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            size: 0,
            kind: NodeKind::Branch(Vec::new()),
        })
    }

    /// Free a detached leaf and hand back its view.
    pub fn take_leaf(&mut self, id: NodeId) -> Option<V> {
        match self.nodes.remove(id)?.kind {
            NodeKind::Leaf(view) => Some(view),
            NodeKind::Branch(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn size(&self, id: NodeId) -> u32 {
        self.nodes[id].size
    }

    pub fn view(&self, id: NodeId) -> Option<&V> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Leaf(view) => Some(view),
            NodeKind::Branch(_) => None,
        }
    }

    pub fn view_mut(&mut self, id: NodeId) -> Option<&mut V> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Leaf(view) => Some(view),
            NodeKind::Branch(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id].kind {
            NodeKind::Branch(children) => children,
            NodeKind::Leaf(_) => &[],
        }
    }

    pub fn is_branch(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Branch(_))
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            depth += 1;
            current = self.parent(parent);
        }
        depth
    }

    /// Orientation `id` splits along if it is a branch.
    pub fn orientation_of(&self, id: NodeId) -> Orientation {
        self.orientation.at_depth(self.depth(id))
    }

    /// Extent of a branch along its own orientation.
    pub fn axis_size(&self, branch: NodeId) -> u32 {
        match self.parent(branch) {
            None => self.container.along(self.orientation),
            Some(parent) => self.cross_size(parent),
        }
    }

    /// Extent of a branch across its orientation, shared by all its children.
    pub fn cross_size(&self, branch: NodeId) -> u32 {
        if branch == self.root {
            self.container.along(self.orientation.orthogonal())
        } else {
            self.nodes[branch].size
        }
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    pub fn location(&self, id: NodeId) -> Location {
        let mut indices = Vec::new();
        let mut current = id;
        while let Some((parent, index)) = self.index_in_parent(current) {
            indices.push(index);
            current = parent;
        }
        indices.reverse();
        Location::from(indices)
    }

    pub fn node_at(&self, location: &[usize]) -> Option<NodeId> {
        let mut current = self.root;
        for index in location {
            current = *self.children(current).get(*index)?;
        }
        Some(current)
    }

    /// Views in visual order (depth first).
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.nodes[id].kind {
            NodeKind::Leaf(_) => out.push(id),
            NodeKind::Branch(children) => {
                for child in children {
                    self.collect_leaves(*child, out);
                }
            }
        }
    }

    /// `(min, max)` extent of `id` along `along`. `orientation` is the split
    /// axis `id` has if it is a branch.
    pub fn range(&self, id: NodeId, orientation: Orientation, along: Orientation) -> (u32, u32) {
        match &self.nodes[id].kind {
            NodeKind::Leaf(view) => view.constraints().range(along),
            NodeKind::Branch(children) if children.is_empty() => (0, u32::MAX),
            NodeKind::Branch(children) => {
                let ranges = children
                    .iter()
                    .map(|c| self.range(*c, orientation.orthogonal(), along));
                if along == orientation {
                    let (min, max) = ranges.fold((0u64, 0u64), |(min, max), (lo, hi)| {
                        (min + u64::from(lo), max + u64::from(hi))
                    });
                    (saturate(min), saturate(max))
                } else {
                    let (min, max) = ranges.fold((0, u32::MAX), |(min, max), (lo, hi)| {
                        (min.max(lo), max.min(hi))
                    });
                    (min, max.max(min))
                }
            }
        }
    }

    fn slots(&self, branch: NodeId, orientation: Orientation) -> Vec<Slot> {
        self.children(branch)
            .iter()
            .map(|child| {
                let (min, max) = self.range(*child, orientation.orthogonal(), orientation);
                Slot::new(self.nodes[*child].size, min, max)
            })
            .collect()
    }

    fn apply_slots(&mut self, branch: NodeId, slots: &[Slot]) {
        let children = self.children(branch).to_vec();
        for (child, slot) in children.into_iter().zip(slots) {
            self.nodes[child].size = slot.size;
        }
    }

    /// Attach a detached node at `index`, asking for `size` along the branch axis.
    pub fn insert_child(&mut self, branch: NodeId, index: usize, child: NodeId, size: u32) {
        self.nodes[child].parent = Some(branch);
        self.nodes[child].size = size;
        if let NodeKind::Branch(children) = &mut self.nodes[branch].kind {
            children.insert(index, child);
        }

        let orientation = self.orientation_of(branch);
        let mut slots = self.slots(branch, orientation);
        distribute::insert(&mut slots, index, self.axis_size(branch));
        self.apply_slots(branch, &slots);
    }

    /// Append a detached node without redistributing; the next layout sizes it.
    pub fn push_child(&mut self, branch: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(branch);
        if let NodeKind::Branch(children) = &mut self.nodes[branch].kind {
            children.push(child);
        }
    }

    /// Detach the child at `index` and give its space to its siblings.
    ///
    /// Returns the detached node and the branch that now holds the siblings,
    /// which differs from `branch` when `branch` collapsed.
    pub fn remove_child(&mut self, branch: NodeId, index: usize) -> Option<(NodeId, NodeId)> {
        let child = match &mut self.nodes[branch].kind {
            NodeKind::Branch(children) if index < children.len() => children.remove(index),
            _ => return None,
        };
        self.nodes[child].parent = None;

        let orientation = self.orientation_of(branch);
        let mut slots = self.slots(branch, orientation);
        distribute::distribute(&mut slots, self.axis_size(branch), Policy::Proportional);
        self.apply_slots(branch, &slots);

        let survivor_parent = self.collapse(branch);
        Some((child, survivor_parent))
    }

    /// Turn the attached leaf `leaf` into a branch holding it as its only child.
    pub fn wrap_in_branch(&mut self, leaf: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(leaf)?;
        let branch = self.new_branch();
        self.nodes[branch].parent = Some(parent);
        self.nodes[branch].size = self.nodes[leaf].size;
        if let NodeKind::Branch(children) = &mut self.nodes[parent].kind {
            children[index] = branch;
        }

        let axis = self.axis_size(branch);
        self.nodes[leaf].parent = Some(branch);
        self.nodes[leaf].size = axis;
        if let NodeKind::Branch(children) = &mut self.nodes[branch].kind {
            children.push(leaf);
        }
        Some(branch)
    }

    /// Replace a non-root branch holding a single child by that child.
    ///
    /// A surviving leaf takes the branch's slot. A surviving branch splits along
    /// the same axis as the grandparent, so its children are spliced into the
    /// grandparent directly; they move up two levels and keep their
    /// orientation. Returns the branch now holding the survivors.
    fn collapse(&mut self, branch: NodeId) -> NodeId {
        if branch == self.root || self.children(branch).len() != 1 {
            return branch;
        }
        let Some((parent, index)) = self.index_in_parent(branch) else {
            return branch;
        };

        let survivor = self.children(branch)[0];
        let size = self.nodes[branch].size;
        let replacement = match &self.nodes[survivor].kind {
            NodeKind::Leaf(_) => vec![survivor],
            NodeKind::Branch(grandchildren) => grandchildren.clone(),
        };
        if !self.is_branch(survivor) {
            self.nodes[survivor].size = size;
        }
        for node in &replacement {
            self.nodes[*node].parent = Some(parent);
        }
        if let NodeKind::Branch(children) = &mut self.nodes[parent].kind {
            children.splice(index..=index, replacement);
        }

        if self.is_branch(survivor) {
            self.nodes.remove(survivor);
        }
        self.nodes.remove(branch);
        tracing::trace!(?branch, ?parent, "collapsed single-child branch");
        parent
    }

    /// Move the sash next to child `index` of `branch` by `delta`.
    pub fn resize_child(&mut self, branch: NodeId, index: usize, delta: i64) -> bool {
        let orientation = self.orientation_of(branch);
        let mut slots = self.slots(branch, orientation);
        if !distribute::resize(&mut slots, index, delta) {
            return false;
        }
        self.apply_slots(branch, &slots);
        true
    }

    pub fn layout(&mut self) {
        self.layout_node(self.root);
    }

    /// Lay out the subtree rooted at `branch` within its current box.
    pub fn layout_node(&mut self, branch: NodeId) {
        let orientation = self.orientation_of(branch);
        let axis = self.axis_size(branch);
        let cross = self.cross_size(branch);
        tracing::trace!(?branch, ?orientation, axis, cross, "layout");
        self.layout_branch(branch, orientation, axis, cross);
    }

    /// Closest of `branch` and its ancestors whose box holds the minimums of
    /// its subtree on both axes; the root when none does.
    pub fn fitting_ancestor(&self, branch: NodeId) -> NodeId {
        let mut current = branch;
        while let Some(parent) = self.parent(current) {
            let orientation = self.orientation_of(current);
            let (axis_min, _) = self.range(current, orientation, orientation);
            let (cross_min, _) = self.range(current, orientation, orientation.orthogonal());
            if axis_min <= self.axis_size(current) && cross_min <= self.cross_size(current) {
                break;
            }
            current = parent;
        }
        current
    }

    fn layout_branch(&mut self, branch: NodeId, orientation: Orientation, axis: u32, cross: u32) {
        let mut slots = self.slots(branch, orientation);
        distribute::distribute(&mut slots, axis, self.policy);
        self.apply_slots(branch, &slots);

        for child in self.children(branch).to_vec() {
            let size = self.nodes[child].size;
            if self.is_branch(child) {
                self.layout_branch(child, orientation.orthogonal(), cross, size);
            } else if let Some(view) = self.view_mut(child) {
                let assigned = Size::from_axes(orientation, size, cross);
                view.layout(assigned.width, assigned.height);
            }
        }
    }

    /// The first axis along which the container cannot hold every minimum.
    pub fn overflow(&self) -> Option<ConstraintOverflow> {
        [self.orientation, self.orientation.orthogonal()]
            .into_iter()
            .find_map(|along| {
                let (required, _) = self.range(self.root, self.orientation, along);
                let available = self.container.along(along);
                (required > available).then_some(ConstraintOverflow {
                    orientation: along,
                    required,
                    available,
                })
            })
    }

    /// Box of `id` in container coordinates.
    pub fn rect(&self, id: NodeId) -> Rect {
        let Some((parent, index)) = self.index_in_parent(id) else {
            return Rect {
                x: 0,
                y: 0,
                width: self.container.width,
                height: self.container.height,
            };
        };
        let parent_rect = self.rect(parent);
        let orientation = self.orientation_of(parent);
        let offset: u32 = self.children(parent)[..index]
            .iter()
            .map(|c| self.nodes[*c].size)
            .fold(0, u32::saturating_add);
        parent_rect.slice(orientation, offset, self.nodes[id].size)
    }

    /// Rectangles of every leaf, computed top-down in one pass.
    pub fn leaf_rects(&self) -> Vec<(NodeId, Rect)> {
        let mut out = Vec::new();
        let full = Rect {
            x: 0,
            y: 0,
            width: self.container.width,
            height: self.container.height,
        };
        self.collect_rects(self.root, self.orientation, full, &mut out);
        out
    }

    fn collect_rects(&self, id: NodeId, orientation: Orientation, rect: Rect, out: &mut Vec<(NodeId, Rect)>) {
        match &self.nodes[id].kind {
            NodeKind::Leaf(_) => out.push((id, rect)),
            NodeKind::Branch(children) => {
                let mut offset = 0u32;
                for child in children {
                    let size = self.nodes[*child].size;
                    let child_rect = rect.slice(orientation, offset, size);
                    self.collect_rects(*child, orientation.orthogonal(), child_rect, out);
                    offset = offset.saturating_add(size);
                }
            }
        }
    }

    /// Drop every node, returning the views in visual order.
    pub fn into_views(mut self) -> Vec<V> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| self.take_leaf(leaf))
            .collect()
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
