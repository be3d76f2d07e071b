//! Canvas elements - the building blocks of a canvas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Style map from CSS-like property name to value.
pub type StyleMap = BTreeMap<String, String>;

/// Content given to freshly dropped text elements.
pub const DEFAULT_TEXT_CONTENT: &str = "Text Element";

/// Unique identifier for an element.
///
/// Opaque text; new ids are UUID v4 strings, but any id read back from
/// storage is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of element dropped on the canvas.
///
/// Serialized as its display name (`"Button"`, `"Grid"`, ...). Names the
/// palette does not know survive a round-trip as [`ElementKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    /// Clickable button.
    Button,
    /// Single-line text input.
    Input,
    /// Bordered card.
    Card,
    /// Free text.
    Text,
    /// Image placeholder.
    Image,
    /// Layout container.
    Container,
    /// Grid layout.
    Grid,
    /// Vertical stack.
    Column,
    /// Horizontal stack.
    Row,
    /// Any other kind name.
    Custom(String),
}

impl ElementKind {
    /// All kinds offered by the component and layout palettes.
    pub const PALETTE: [ElementKind; 9] = [
        ElementKind::Button,
        ElementKind::Input,
        ElementKind::Card,
        ElementKind::Text,
        ElementKind::Image,
        ElementKind::Container,
        ElementKind::Grid,
        ElementKind::Column,
        ElementKind::Row,
    ];

    /// Display name, also used as the persisted `type` field.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Button => "Button",
            Self::Input => "Input",
            Self::Card => "Card",
            Self::Text => "Text",
            Self::Image => "Image",
            Self::Container => "Container",
            Self::Grid => "Grid",
            Self::Column => "Column",
            Self::Row => "Row",
            Self::Custom(name) => name,
        }
    }

    /// Parse a palette name. Matching is case-insensitive since drag payloads
    /// carry either the label (`Button`) or the palette id (`button`).
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "button" => Self::Button,
            "input" => Self::Input,
            "card" => Self::Card,
            "text" => Self::Text,
            "image" => Self::Image,
            "container" => Self::Container,
            "grid" => Self::Grid,
            "column" => Self::Column,
            "row" => Self::Row,
            _ => Self::Custom(name.to_string()),
        }
    }
}

impl From<String> for ElementKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.name().to_string()
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A point in unscaled canvas space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Pixels from the left edge.
    pub x: f64,
    /// Pixels from the top edge.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Element dimensions. Both fields are always positive once inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Geometry and style a kind starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDefaults {
    /// Initial size.
    pub size: Size,
    /// Initial style properties.
    pub style: StyleMap,
}

fn style(pairs: &[(&str, &str)]) -> StyleMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Default geometry and style for an element kind.
#[must_use]
pub fn defaults_for(kind: &ElementKind) -> ElementDefaults {
    let (width, height, style) = match kind {
        ElementKind::Button => (
            100.0,
            40.0,
            style(&[
                ("backgroundColor", "#3b82f6"),
                ("color", "#ffffff"),
                ("borderRadius", "4px"),
            ]),
        ),
        ElementKind::Input => (
            200.0,
            40.0,
            style(&[("border", "1px solid #d1d5db"), ("borderRadius", "4px")]),
        ),
        ElementKind::Card => (
            150.0,
            100.0,
            style(&[
                ("border", "1px solid #e5e7eb"),
                ("padding", "16px"),
                ("backgroundColor", "#ffffff"),
            ]),
        ),
        ElementKind::Text => (
            150.0,
            100.0,
            style(&[("fontFamily", "sans-serif"), ("color", "#333333")]),
        ),
        ElementKind::Image => (150.0, 100.0, style(&[("border", "1px dashed #9ca3af")])),
        _ => (150.0, 100.0, StyleMap::new()),
    };
    ElementDefaults {
        size: Size::new(width, height),
        style,
    }
}

/// An absolutely positioned element on the canvas.
///
/// The serialized form is the flat `{id, type, x, y, width, height, content?,
/// style?}` object the editor keeps in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    /// Unique identifier, immutable after creation.
    pub id: ElementId,
    /// Element kind.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Top-left corner.
    #[serde(flatten)]
    pub position: Point,
    /// Width and height.
    #[serde(flatten)]
    pub size: Size,
    /// Display text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Style properties.
    #[serde(default, skip_serializing_if = "StyleMap::is_empty")]
    pub style: StyleMap,
}

impl CanvasElement {
    /// Create an element of `kind` at `position` using the kind's defaults.
    #[must_use]
    pub fn new(kind: ElementKind, position: Point) -> Self {
        let ElementDefaults { size, style } = defaults_for(&kind);
        let content = (kind == ElementKind::Text).then(|| DEFAULT_TEXT_CONTENT.to_string());
        Self {
            id: ElementId::new(),
            kind,
            position,
            size,
            content,
            style,
        }
    }

    /// Set the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Check if a point (in canvas coordinates) is within this element.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.position.x
            && x <= self.position.x + self.size.width
            && y >= self.position.y
            && y <= self.position.y + self.size.height
    }
}
