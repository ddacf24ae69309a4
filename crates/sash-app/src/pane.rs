// ABOUTME: Named placeholder panes arranged by the CLI, and the split commands that place them.
// ABOUTME: Panes persist as `{ "name": ... }` and are rebuilt by `PaneFactory`.

use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use sash_core::{Constraints, Direction, Size};
use sash_layout::{BoxError, SerializableView, View, ViewDeserializer};

#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    pub name: String,
    pub constraints: Constraints,
    pub size: Size,
}

impl Pane {
    pub fn new(name: impl Into<String>, minimum: u32) -> Self {
        Self {
            name: name.into(),
            constraints: Constraints::at_least(minimum, minimum),
            size: Size::default(),
        }
    }
}

impl View for Pane {
    type Id = String;

    fn id(&self) -> String {
        self.name.clone()
    }

    fn constraints(&self) -> Constraints {
        self.constraints
    }

    fn layout(&mut self, width: u32, height: u32) {
        self.size = Size::new(width, height);
    }
}

impl SerializableView for Pane {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "name": self.name })
    }
}

/// Restores panes with a uniform minimum size.
pub struct PaneFactory {
    pub minimum: u32,
}

impl ViewDeserializer for PaneFactory {
    type View = Pane;

    fn from_json(&mut self, data: &serde_json::Value) -> Result<Pane, BoxError> {
        let name = data
            .get("name")
            .and_then(serde_json::Value::as_str)
            .ok_or("pane entry without a \"name\" string")?;
        Ok(Pane::new(name, self.minimum))
    }
}

/// `REF:DIR:NAME:SIZE`, e.g. `main:right:sidebar:200`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub reference: String,
    pub direction: Direction,
    pub name: String,
    pub size: u32,
}

impl FromStr for Split {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let [reference, direction, name, size] = parts.as_slice() else {
            bail!("expected REF:DIR:NAME:SIZE, got {s:?}");
        };
        if reference.is_empty() || name.is_empty() {
            bail!("pane names cannot be empty in {s:?}");
        }
        Ok(Self {
            reference: reference.to_string(),
            direction: parse_direction(direction)?,
            name: name.to_string(),
            size: size.parse().with_context(|| format!("invalid size {size:?}"))?,
        })
    }
}

fn parse_direction(s: &str) -> anyhow::Result<Direction> {
    match s.to_ascii_lowercase().as_str() {
        "up" | "u" => Ok(Direction::Up),
        "down" | "d" => Ok(Direction::Down),
        "left" | "l" => Ok(Direction::Left),
        "right" | "r" => Ok(Direction::Right),
        _ => Err(anyhow!("unknown direction {s:?} (use up, down, left or right)")),
    }
}
