// ABOUTME: Persisted form of a grid and conversion to and from it.
// ABOUTME: Views describe themselves as JSON; a factory rebuilds them on restore.

use serde::{Deserialize, Serialize};

use sash_core::{Orientation, Size};

use crate::error::GridError;
use crate::grid::{Grid, GridOptions};
use crate::node::NodeId;
use crate::view::{SerializableView, View, ViewDeserializer};

/// `{ "orientation": 0|1, "root": { "type": "branch", "data": [...] } }`
///
/// Only the tree shape and view data are stored; sizes are recomputed on
/// restore. Changing this layout breaks saved grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedGrid {
    pub orientation: Orientation,
    pub root: SerializedNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SerializedNode {
    Branch(Vec<SerializedNode>),
    Leaf(serde_json::Value),
}

impl<V: SerializableView> Grid<V> {
    pub fn serialize(&self) -> SerializedGrid {
        SerializedGrid {
            orientation: self.orientation(),
            root: self.serialize_node(self.tree.root()),
        }
    }

    fn serialize_node(&self, id: NodeId) -> SerializedNode {
        match self.tree.view(id) {
            Some(view) => SerializedNode::Leaf(view.to_json()),
            None => SerializedNode::Branch(
                self.tree
                    .children(id)
                    .iter()
                    .map(|child| self.serialize_node(*child))
                    .collect(),
            ),
        }
    }
}

impl<V: View> Grid<V> {
    /// Rebuild a grid and lay it out in `container`.
    ///
    /// The whole structure is checked before the factory is called; any error
    /// leaves nothing behind.
    pub fn deserialize<D>(container: Size, state: &SerializedGrid, factory: &mut D) -> Result<Self, GridError>
    where
        D: ViewDeserializer<View = V>,
    {
        let options = GridOptions {
            size: container,
            ..GridOptions::default()
        };
        Self::deserialize_with_options(options, state, factory)
    }

    /// Like [`Grid::deserialize`] but starting from raw JSON.
    pub fn deserialize_value<D>(container: Size, value: serde_json::Value, factory: &mut D) -> Result<Self, GridError>
    where
        D: ViewDeserializer<View = V>,
    {
        let state: SerializedGrid =
            serde_json::from_value(value).map_err(|e| GridError::MalformedState(e.to_string()))?;
        Self::deserialize(container, &state, factory)
    }

    /// Rebuild a grid; the persisted orientation overrides `options.orientation`.
    pub fn deserialize_with_options<D>(
        options: GridOptions,
        state: &SerializedGrid,
        factory: &mut D,
    ) -> Result<Self, GridError>
    where
        D: ViewDeserializer<View = V>,
    {
        validate(&state.root, true)?;

        let mut grid = Self::empty(GridOptions {
            orientation: state.orientation,
            ..options
        });
        let SerializedNode::Branch(children) = &state.root else {
            return Err(GridError::MalformedState("root must be a branch".into()));
        };
        let root = grid.tree.root();
        grid.build_children(root, children, factory)?;
        grid.tree.layout();

        tracing::debug!(
            views = grid.view_count(),
            orientation = ?state.orientation,
            "restored grid"
        );
        Ok(grid)
    }

    fn build_children<D>(&mut self, parent: NodeId, children: &[SerializedNode], factory: &mut D) -> Result<(), GridError>
    where
        D: ViewDeserializer<View = V>,
    {
        for child in children {
            match child {
                SerializedNode::Leaf(data) => {
                    let view = factory.from_json(data).map_err(GridError::ViewDeserialize)?;
                    let id = view.id();
                    if self.contains(&id) {
                        return Err(GridError::DuplicateView(format!("{id:?}")));
                    }
                    let leaf = self.tree.new_leaf(view);
                    self.tree.push_child(parent, leaf);
                    self.index.insert(id, leaf);
                }
                SerializedNode::Branch(grandchildren) => {
                    let branch = self.tree.new_branch();
                    self.tree.push_child(parent, branch);
                    self.build_children(branch, grandchildren, factory)?;
                }
            }
        }
        Ok(())
    }
}

/// The root is a non-empty branch; nested branches hold at least two children.
fn validate(node: &SerializedNode, is_root: bool) -> Result<(), GridError> {
    match node {
        SerializedNode::Leaf(_) if is_root => Err(GridError::MalformedState("root must be a branch".into())),
        SerializedNode::Leaf(_) => Ok(()),
        SerializedNode::Branch(children) if children.is_empty() => {
            Err(GridError::MalformedState("branch without children".into()))
        }
        SerializedNode::Branch(children) if children.len() < 2 && !is_root => Err(GridError::MalformedState(
            "nested branch with a single child".into(),
        )),
        SerializedNode::Branch(children) => children.iter().try_for_each(|c| validate(c, false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridNode;
    use crate::view::BoxError;
    use pretty_assertions::assert_eq;
    use sash_core::{Constraints, Direction};
    use serde_json::json;

    struct TestSerializableView {
        name: String,
        size: Size,
    }

    impl TestSerializableView {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                size: Size::default(),
            }
        }
    }

    impl View for TestSerializableView {
        type Id = String;

        fn id(&self) -> String {
            self.name.clone()
        }

        fn constraints(&self) -> Constraints {
            Constraints::at_least(50, 50)
        }

        fn layout(&mut self, width: u32, height: u32) {
            self.size = Size::new(width, height);
        }
    }

    impl SerializableView for TestSerializableView {
        fn to_json(&self) -> serde_json::Value {
            json!({ "name": self.name })
        }
    }

    struct TestViewDeserializer;

    impl ViewDeserializer for TestViewDeserializer {
        type View = TestSerializableView;

        fn from_json(&mut self, data: &serde_json::Value) -> Result<TestSerializableView, BoxError> {
            let name = data["name"].as_str().ok_or("view data without a name")?;
            Ok(TestSerializableView::new(name))
        }
    }

    fn nodes_to_names(node: &GridNode<String>) -> serde_json::Value {
        match node {
            GridNode::Leaf { id, .. } => json!(id),
            GridNode::Branch { children, .. } => {
                serde_json::Value::Array(children.iter().map(nodes_to_names).collect())
            }
        }
    }

    fn simple_layout() -> Grid<TestSerializableView> {
        let mut grid = Grid::new(TestSerializableView::new("view1"));
        grid.layout(800, 600);
        let view1 = "view1".to_string();
        let view2 = "view2".to_string();
        grid.add_view(TestSerializableView::new("view2"), 200, &view1, Direction::Up).unwrap();
        grid.add_view(TestSerializableView::new("view3"), 200, &view1, Direction::Right).unwrap();
        grid.add_view(TestSerializableView::new("view4"), 200, &view2, Direction::Left).unwrap();
        grid.add_view(TestSerializableView::new("view5"), 100, &view1, Direction::Down).unwrap();
        grid
    }

    fn container() -> Size {
        Size::new(800, 600)
    }

    #[test]
    fn serialize_single_view() {
        let grid = Grid::new(TestSerializableView::new("view1"));
        let json = serde_json::to_value(grid.serialize()).unwrap();

        assert_eq!(
            json,
            json!({
                "orientation": 0,
                "root": {
                    "type": "branch",
                    "data": [
                        { "type": "leaf", "data": { "name": "view1" } }
                    ]
                }
            })
        );
    }

    #[test]
    fn serialize_simple_layout() {
        let grid = simple_layout();
        let json = serde_json::to_value(grid.serialize()).unwrap();

        assert_eq!(
            json,
            json!({
                "orientation": 0,
                "root": {
                    "type": "branch",
                    "data": [
                        {
                            "type": "branch",
                            "data": [
                                { "type": "leaf", "data": { "name": "view4" } },
                                { "type": "leaf", "data": { "name": "view2" } }
                            ]
                        },
                        {
                            "type": "branch",
                            "data": [
                                {
                                    "type": "branch",
                                    "data": [
                                        { "type": "leaf", "data": { "name": "view1" } },
                                        { "type": "leaf", "data": { "name": "view5" } }
                                    ]
                                },
                                { "type": "leaf", "data": { "name": "view3" } }
                            ]
                        }
                    ]
                }
            })
        );
    }

    #[test]
    fn deserialize_single_view() {
        let state = Grid::new(TestSerializableView::new("view1")).serialize();
        let grid = Grid::deserialize(container(), &state, &mut TestViewDeserializer).unwrap();

        assert_eq!(nodes_to_names(&grid.get_views()), json!(["view1"]));
        assert_eq!(grid.view(&"view1".to_string()).unwrap().size, container());
    }

    #[test]
    fn deserialize_simple_layout() {
        let state = simple_layout().serialize();
        let grid = Grid::deserialize(container(), &state, &mut TestViewDeserializer).unwrap();

        assert_eq!(
            nodes_to_names(&grid.get_views()),
            json!([["view4", "view2"], [["view1", "view5"], "view3"]])
        );
        assert_eq!(grid.serialize(), state);

        // Sizes are not persisted: siblings share space evenly after restore.
        assert_eq!(grid.view(&"view1".to_string()).unwrap().size, Size::new(400, 150));
        assert_eq!(grid.view(&"view3".to_string()).unwrap().size, Size::new(400, 300));
        assert_eq!(grid.view(&"view4".to_string()).unwrap().size, Size::new(400, 300));
    }

    #[test]
    fn deserialize_keeps_orientation_per_depth() {
        let state = SerializedGrid {
            orientation: Orientation::Horizontal,
            root: SerializedNode::Branch(vec![
                SerializedNode::Leaf(json!({ "name": "a" })),
                SerializedNode::Branch(vec![
                    SerializedNode::Leaf(json!({ "name": "b" })),
                    SerializedNode::Leaf(json!({ "name": "c" })),
                ]),
            ]),
        };
        let grid = Grid::deserialize(container(), &state, &mut TestViewDeserializer).unwrap();

        assert_eq!(grid.orientation(), Orientation::Horizontal);
        let GridNode::Branch { children, .. } = grid.get_views() else {
            panic!("root must be a branch");
        };
        let GridNode::Branch { orientation, .. } = &children[1] else {
            panic!("expected nested branch");
        };
        assert_eq!(*orientation, Orientation::Vertical);
        assert_eq!(grid.view(&"a".to_string()).unwrap().size, Size::new(400, 600));
        assert_eq!(grid.view(&"b".to_string()).unwrap().size, Size::new(400, 300));
    }

    #[test]
    fn deserialize_from_raw_json() {
        let value = serde_json::to_value(simple_layout().serialize()).unwrap();
        let grid = Grid::deserialize_value(container(), value, &mut TestViewDeserializer).unwrap();
        assert_eq!(grid.view_count(), 5);
    }

    #[test]
    fn malformed_states_are_rejected() {
        let cases = [
            json!({ "orientation": 0, "root": { "data": [] } }),
            json!({ "orientation": 0, "root": { "type": "split", "data": [] } }),
            json!({ "orientation": 0, "root": { "type": "branch", "data": [] } }),
            json!({ "orientation": 0, "root": { "type": "branch", "data": {} } }),
            json!({ "orientation": 0, "root": { "type": "leaf", "data": { "name": "a" } } }),
            json!({ "orientation": 2, "root": { "type": "branch", "data": [
                { "type": "leaf", "data": { "name": "a" } }
            ] } }),
            json!({ "orientation": 0, "root": { "type": "branch", "data": [
                { "type": "leaf", "data": { "name": "a" } },
                { "type": "branch", "data": [] }
            ] } }),
            json!({ "orientation": 0, "root": { "type": "branch", "data": [
                { "type": "leaf", "data": { "name": "a" } },
                { "type": "branch", "data": [ { "type": "leaf", "data": { "name": "b" } } ] }
            ] } }),
        ];

        for value in cases {
            let result = Grid::deserialize_value(container(), value.clone(), &mut TestViewDeserializer);
            assert!(
                matches!(result, Err(GridError::MalformedState(_))),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn factory_errors_abort_restore() {
        let value = json!({ "orientation": 0, "root": { "type": "branch", "data": [
            { "type": "leaf", "data": { "name": "a" } },
            { "type": "leaf", "data": { "title": "no name" } }
        ] } });
        let result = Grid::deserialize_value(container(), value, &mut TestViewDeserializer);
        assert!(matches!(result, Err(GridError::ViewDeserialize(_))));
    }

    #[test]
    fn duplicate_views_abort_restore() {
        let value = json!({ "orientation": 0, "root": { "type": "branch", "data": [
            { "type": "leaf", "data": { "name": "a" } },
            { "type": "leaf", "data": { "name": "a" } }
        ] } });
        let result = Grid::deserialize_value(container(), value, &mut TestViewDeserializer);
        assert!(matches!(result, Err(GridError::DuplicateView(_))));
    }
}
