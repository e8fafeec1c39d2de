//! Abstract visual tree produced by the changelog builder.
//!
//! Nodes describe structure and semantic styling only. Turning them into
//! host objects (and picking colors, paddings, concrete fonts) is the host's
//! job; see [`crate::host::HostDocument::insert`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::NoteTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Background treatment of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tag")]
pub enum Fill {
    /// Card surface of a whole changelog
    Surface,
    /// Status badge tinted by tag
    Badge(NoteTag),
}

/// Semantic text role; each role maps to exactly one font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Title,
    SprintLabel,
    BadgeLabel,
    Body,
    Emphasis,
    Bullet,
    Placeholder,
}

impl TextStyle {
    pub fn font(&self) -> FontSpec {
        let style = match self {
            Self::Title | Self::Bullet => "Medium",
            Self::SprintLabel => "Bold",
            Self::BadgeLabel | Self::Emphasis => "Semi Bold",
            Self::Body | Self::Placeholder => "Regular",
        };
        FontSpec::new("Inter", style)
    }
}

/// A font the host has to load before text using it can be created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub style: String,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Marker at the head of a timeline column
    Diamond,
    /// Vertical connector running down a timeline column
    TimelineLine,
    /// Brand mark at the foot of a changelog
    Logo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    /// Fixed width; `None` hugs the content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Stretch along the parent's cross axis
    #[serde(default)]
    pub stretch: bool,
    #[serde(default)]
    pub children: Vec<DocumentNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentNode {
    Container(Container),
    Text(Text),
    Shape(Shape),
}

impl DocumentNode {
    pub fn container(name: impl Into<String>, direction: Direction) -> Container {
        Container {
            name: name.into(),
            direction,
            fill: None,
            width: None,
            stretch: false,
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>, style: TextStyle) -> Self {
        DocumentNode::Text(Text {
            content: content.into(),
            style,
        })
    }

    pub fn shape(name: impl Into<String>, kind: ShapeKind) -> Self {
        DocumentNode::Shape(Shape {
            name: name.into(),
            kind,
        })
    }

    /// Node name; text nodes are named by their content.
    pub fn name(&self) -> &str {
        match self {
            DocumentNode::Container(c) => &c.name,
            DocumentNode::Text(t) => &t.content,
            DocumentNode::Shape(s) => &s.name,
        }
    }

    pub fn children(&self) -> &[DocumentNode] {
        match self {
            DocumentNode::Container(c) => &c.children,
            DocumentNode::Text(_) | DocumentNode::Shape(_) => &[],
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            DocumentNode::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Fixed width of the node, if it declares one.
    pub fn width(&self) -> Option<f64> {
        self.as_container().and_then(|c| c.width)
    }

    /// Direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&DocumentNode> {
        self.children().iter().find(|child| child.name() == name)
    }

    /// Pre-order walk over the node and its descendants.
    pub fn walk(&self) -> Vec<&DocumentNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in node.children().iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Every node named `name`, in pre-order.
    pub fn find_all(&self, name: &str) -> Vec<&DocumentNode> {
        self.walk()
            .into_iter()
            .filter(|node| node.name() == name)
            .collect()
    }

    /// Text content of every text node, in pre-order.
    pub fn texts(&self) -> Vec<&str> {
        self.walk()
            .into_iter()
            .filter_map(|node| match node {
                DocumentNode::Text(t) => Some(t.content.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Fonts needed to materialize this tree.
    pub fn fonts(&self) -> BTreeSet<FontSpec> {
        self.walk()
            .into_iter()
            .filter_map(|node| match node {
                DocumentNode::Text(t) => Some(t.style.font()),
                _ => None,
            })
            .collect()
    }
}

impl From<Container> for DocumentNode {
    fn from(container: Container) -> Self {
        DocumentNode::Container(container)
    }
}

impl Container {
    pub fn with_child(mut self, child: impl Into<DocumentNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn push(&mut self, child: impl Into<DocumentNode>) {
        self.children.push(child.into());
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn stretched(mut self) -> Self {
        self.stretch = true;
        self
    }
}
