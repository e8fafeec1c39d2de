//! Host document abstraction.
//!
//! The publish pipeline only needs a handful of capabilities from the design
//! tool: look nodes up, walk parents, create pages, insert built trees,
//! remove nodes, and position them. [`HostDocument`] captures those;
//! [`MemoryDocument`] is a serializable implementation used by tests and by
//! the CLI.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::document::{DocumentNode, FontSpec};
use crate::error::{Error, Result};
use crate::model::{Author, ComponentSetInfo};

pub type NodeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Document,
    Page,
    Frame,
    ComponentSet,
    Text,
    Shape,
}

/// Snapshot of a host node's identity and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
}

/// A node narrowed to the role it plays for publishing.
///
/// Built by [`resolve`], which matches every [`NodeKind`]; adding a kind
/// forces a decision here.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedNode {
    Document(NodeInfo),
    Page(NodeInfo),
    Frame(NodeInfo),
    ComponentSet(NodeInfo),
    Leaf(NodeInfo),
}

pub fn resolve(info: NodeInfo) -> ResolvedNode {
    match info.kind {
        NodeKind::Document => ResolvedNode::Document(info),
        NodeKind::Page => ResolvedNode::Page(info),
        NodeKind::Frame => ResolvedNode::Frame(info),
        NodeKind::ComponentSet => ResolvedNode::ComponentSet(info),
        NodeKind::Text | NodeKind::Shape => ResolvedNode::Leaf(info),
    }
}

/// Capabilities the core needs from the live document.
pub trait HostDocument {
    fn root_id(&self) -> NodeId;

    fn node(&self, id: &str) -> Option<NodeInfo>;

    /// Child ids in order; empty for unknown or leaf nodes.
    fn children(&self, id: &str) -> Vec<NodeId>;

    /// Append a new page to the document root.
    fn create_page(&mut self, name: &str) -> Result<NodeId>;

    /// Materialize `tree` under `parent` at `index` (append when `None`).
    fn insert(&mut self, parent: &str, index: Option<usize>, tree: &DocumentNode) -> Result<NodeId>;

    /// Remove a node and its subtree.
    fn remove(&mut self, id: &str) -> Result<()>;

    fn set_position(&mut self, id: &str, x: f64, y: f64) -> Result<()>;

    /// Every component set in the document.
    fn component_sets(&self) -> Vec<ComponentSetInfo>;

    /// The user editing the document, if the host knows.
    fn current_user(&self) -> Option<Author>;

    fn set_current_page(&mut self, page: &str) -> Result<()>;

    fn scroll_into_view(&mut self, ids: &[NodeId]) -> Result<()>;
}

/// Look a node up and narrow it by kind.
pub fn resolve_node<D: HostDocument + ?Sized>(document: &D, id: &str) -> Option<ResolvedNode> {
    document.node(id).map(resolve)
}

/// Nearest node of `kind` starting at `start` itself and walking parents.
///
/// Stops on a repeated node so a malformed parent chain cannot loop.
pub fn find_ancestor<D: HostDocument + ?Sized>(
    document: &D,
    start: &str,
    kind: NodeKind,
) -> Option<NodeInfo> {
    let mut visited = HashSet::new();
    let mut current = document.node(start);
    while let Some(node) = current {
        if !visited.insert(node.id.clone()) {
            return None;
        }
        if node.kind == kind {
            return Some(node);
        }
        current = node.parent.as_deref().and_then(|parent| document.node(parent));
    }
    None
}

/// Direct children of `parent` with the given kind and name.
pub fn find_children<D: HostDocument + ?Sized>(
    document: &D,
    parent: &str,
    kind: NodeKind,
    name: &str,
) -> Vec<NodeInfo> {
    document
        .children(parent)
        .iter()
        .filter_map(|id| document.node(id))
        .filter(|node| node.kind == kind && node.name == name)
        .collect()
}

/// Suspension point for resources the host must load before drawing.
#[allow(async_fn_in_trait)]
pub trait ResourceLoader {
    async fn load_font(&self, font: &FontSpec) -> Result<()>;
}

/// Loader for hosts that need nothing loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

impl ResourceLoader for NoopLoader {
    async fn load_font(&self, _font: &FontSpec) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredNode {
    #[serde(flatten)]
    info: NodeInfo,
    #[serde(default)]
    children: Vec<NodeId>,
    /// Built content this node was materialized from, for inspection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// In-memory document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryDocument {
    root: NodeId,
    next_id: u64,
    nodes: BTreeMap<NodeId, StoredNode>,
    #[serde(default)]
    current_page: Option<NodeId>,
    #[serde(default)]
    viewport: Vec<NodeId>,
    #[serde(default)]
    user: Option<Author>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let root = "0:0".to_string();
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root.clone(),
            StoredNode {
                info: NodeInfo {
                    id: root.clone(),
                    name: "Document".to_string(),
                    kind: NodeKind::Document,
                    parent: None,
                    x: 0.0,
                    y: 0.0,
                    width: 0.0,
                },
                children: Vec::new(),
                text: None,
            },
        );
        Self {
            root,
            next_id: 1,
            nodes,
            current_page: None,
            viewport: Vec::new(),
            user: None,
        }
    }

    pub fn with_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.set_user(Some(Author {
            id: id.into(),
            name: name.into(),
        }));
        self
    }

    pub fn set_user(&mut self, user: Option<Author>) {
        self.user = user;
    }

    fn allocate(&mut self) -> NodeId {
        let id = format!("1:{}", self.next_id);
        self.next_id += 1;
        id
    }

    fn attach(
        &mut self,
        parent: &str,
        index: Option<usize>,
        name: &str,
        kind: NodeKind,
        text: Option<String>,
    ) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent.to_string()));
        }
        let id = self.allocate();
        self.nodes.insert(
            id.clone(),
            StoredNode {
                info: NodeInfo {
                    id: id.clone(),
                    name: name.to_string(),
                    kind,
                    parent: Some(parent.to_string()),
                    x: 0.0,
                    y: 0.0,
                    width: 0.0,
                },
                children: Vec::new(),
                text,
            },
        );
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            let at = index
                .unwrap_or(parent_node.children.len())
                .min(parent_node.children.len());
            parent_node.children.insert(at, id.clone());
        }
        Ok(id)
    }

    /// Append a page to the root.
    pub fn add_page(&mut self, name: &str) -> NodeId {
        let root = self.root.clone();
        self.attach(&root, None, name, NodeKind::Page, None)
            .unwrap_or_default()
    }

    /// Add a component set to a page at a position.
    pub fn add_component_set(&mut self, page: &str, name: &str, x: f64, y: f64) -> NodeId {
        let Ok(id) = self.attach(page, None, name, NodeKind::ComponentSet, None) else {
            return NodeId::new();
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.info.x = x;
            node.info.y = y;
            node.info.width = 320.0;
        }
        id
    }

    /// Rename a node, as a user editing the document would.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        node.info.name = name.to_string();
        Ok(())
    }

    /// Component sets as catalog entries.
    pub fn component_set_infos(&self) -> Vec<ComponentSetInfo> {
        self.component_sets()
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    pub fn viewport(&self) -> &[NodeId] {
        &self.viewport
    }

    /// Materialized text of a node, for text nodes.
    pub fn text_of(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|node| node.text.as_deref())
    }

    /// All nodes of a kind, in id order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeInfo> {
        self.nodes
            .values()
            .filter(|node| node.info.kind == kind)
            .map(|node| node.info.clone())
            .collect()
    }

    /// Text content of every text node under `id`, in tree order.
    pub fn texts_under(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if let Some(text) = &node.text {
                out.push(text.clone());
            }
            for child in node.children.iter().rev() {
                stack.push(child.clone());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn materialize(&mut self, parent: &str, index: Option<usize>, tree: &DocumentNode) -> Result<NodeId> {
        let id = match tree {
            DocumentNode::Container(container) => {
                let id = self.attach(parent, index, &container.name, NodeKind::Frame, None)?;
                if let (Some(width), Some(node)) = (container.width, self.nodes.get_mut(&id)) {
                    node.info.width = width;
                }
                id
            }
            DocumentNode::Text(text) => self.attach(
                parent,
                index,
                &text.content,
                NodeKind::Text,
                Some(text.content.clone()),
            )?,
            DocumentNode::Shape(shape) => {
                self.attach(parent, index, &shape.name, NodeKind::Shape, None)?
            }
        };
        for child in tree.children() {
            self.materialize(&id, None, child)?;
        }
        Ok(id)
    }
}

impl HostDocument for MemoryDocument {
    fn root_id(&self) -> NodeId {
        self.root.clone()
    }

    fn node(&self, id: &str) -> Option<NodeInfo> {
        self.nodes.get(id).map(|node| node.info.clone())
    }

    fn children(&self, id: &str) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    fn create_page(&mut self, name: &str) -> Result<NodeId> {
        let root = self.root.clone();
        self.attach(&root, None, name, NodeKind::Page, None)
    }

    fn insert(&mut self, parent: &str, index: Option<usize>, tree: &DocumentNode) -> Result<NodeId> {
        self.materialize(parent, index, tree)
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        if id == self.root {
            return Err(Error::InvalidArgument("cannot remove the document root".to_string()));
        }
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        if let Some(parent) = node.info.parent.as_deref().and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|child| child != id);
        }
        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                stack.extend(removed.children);
            }
        }
        self.viewport.retain(|v| self.nodes.contains_key(v));
        if self
            .current_page
            .as_deref()
            .is_some_and(|page| !self.nodes.contains_key(page))
        {
            self.current_page = None;
        }
        Ok(())
    }

    fn set_position(&mut self, id: &str, x: f64, y: f64) -> Result<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        node.info.x = x;
        node.info.y = y;
        Ok(())
    }

    fn component_sets(&self) -> Vec<ComponentSetInfo> {
        // Document order, not id order.
        let mut out = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            if node.info.kind == NodeKind::ComponentSet {
                out.push(ComponentSetInfo {
                    id: node.info.id.clone(),
                    name: node.info.name.clone(),
                });
            }
            for child in node.children.iter().rev() {
                stack.push(child.clone());
            }
        }
        out
    }

    fn current_user(&self) -> Option<Author> {
        self.user.clone()
    }

    fn set_current_page(&mut self, page: &str) -> Result<()> {
        match self.node(page).map(|node| node.kind) {
            Some(NodeKind::Page) => {
                self.current_page = Some(page.to_string());
                Ok(())
            }
            Some(_) => Err(Error::InvalidArgument(format!("{page} is not a page"))),
            None => Err(Error::NodeNotFound(page.to_string())),
        }
    }

    fn scroll_into_view(&mut self, ids: &[NodeId]) -> Result<()> {
        if let Some(missing) = ids.iter().find(|id| !self.nodes.contains_key(*id)) {
            return Err(Error::NodeNotFound(missing.clone()));
        }
        self.viewport = ids.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Direction, ShapeKind, TextStyle};

    #[test]
    fn find_ancestor_walks_to_page() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("Buttons");
        let set = doc.add_component_set(&page, "Button", 10.0, 20.0);

        let found = find_ancestor(&doc, &set, NodeKind::Page).unwrap();
        assert_eq!(found.id, page);
        assert!(find_ancestor(&doc, &set, NodeKind::Frame).is_none());
        assert!(find_ancestor(&doc, "missing", NodeKind::Page).is_none());
    }

    #[test]
    fn find_ancestor_stops_on_cycles() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("Loop");
        let set = doc.add_component_set(&page, "Button", 0.0, 0.0);
        // Corrupt the parent chain: page -> set -> page.
        if let Some(node) = doc.nodes.get_mut(&page) {
            node.info.parent = Some(set.clone());
        }
        assert!(find_ancestor(&doc, &set, NodeKind::Document).is_none());
    }

    #[test]
    fn insert_materializes_tree_at_index() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("P");
        let first = DocumentNode::from(
            DocumentNode::container("first", Direction::Vertical)
                .with_width(560.0)
                .with_child(DocumentNode::text("hello", TextStyle::Body))
                .with_child(DocumentNode::shape("diamond", ShapeKind::Diamond)),
        );
        let second = DocumentNode::from(DocumentNode::container("second", Direction::Vertical));

        let a = doc.insert(&page, None, &first).unwrap();
        let b = doc.insert(&page, Some(0), &second).unwrap();

        assert_eq!(doc.children(&page), vec![b, a.clone()]);
        assert_eq!(doc.node(&a).unwrap().width, 560.0);
        assert_eq!(doc.texts_under(&a), vec!["hello".to_string()]);
    }

    #[test]
    fn remove_drops_subtree() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("P");
        let tree = DocumentNode::from(
            DocumentNode::container("frame", Direction::Vertical)
                .with_child(DocumentNode::text("x", TextStyle::Body)),
        );
        let frame = doc.insert(&page, None, &tree).unwrap();
        let before = doc.len();

        doc.remove(&frame).unwrap();
        assert_eq!(doc.len(), before - 2);
        assert!(doc.children(&page).is_empty());
        assert!(doc.remove(&frame).is_err());
    }

    #[test]
    fn resolve_narrows_by_kind() {
        let mut doc = MemoryDocument::new();
        let page = doc.add_page("P");
        let set = doc.add_component_set(&page, "Button", 0.0, 0.0);
        assert!(matches!(
            resolve_node(&doc, &set),
            Some(ResolvedNode::ComponentSet(_))
        ));
        assert!(matches!(resolve_node(&doc, &page), Some(ResolvedNode::Page(_))));
        assert!(resolve_node(&doc, "nope").is_none());
    }

    #[test]
    fn component_sets_follow_document_order() {
        let mut doc = MemoryDocument::new();
        let p1 = doc.add_page("One");
        let p2 = doc.add_page("Two");
        doc.add_component_set(&p2, "Card", 0.0, 0.0);
        doc.add_component_set(&p1, "Button", 0.0, 0.0);
        let names: Vec<_> = doc.component_sets().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Button", "Card"]);
    }
}
