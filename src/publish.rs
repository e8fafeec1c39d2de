//! Reconciles built changelogs with the live host document.
//!
//! The aggregated table is additive: every publish prepends a new table to
//! the release-notes frame and earlier ones stay. Per-component artifacts are
//! replaced: every frame carrying the artifact name on the component's page
//! is removed before the fresh one is inserted.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::builder::{ChangelogBuilder, CARD_WIDTH};
use crate::config::PublishConfig;
use crate::document::{Direction, DocumentNode};
use crate::error::Result;
use crate::host::{
    find_ancestor, find_children, resolve_node, HostDocument, NodeId, NodeInfo, NodeKind,
    ResolvedNode, ResourceLoader,
};
use crate::model::{ComponentSetInfo, Sprint};

/// Per-component result of a publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentArtifact {
    pub component_set_id: String,
    pub component_set_name: String,
    /// Inserted frame; `None` when the builder had nothing to show
    pub node_id: Option<NodeId>,
    /// Stale frames removed before inserting
    pub removed: usize,
}

/// A component set that could not be published to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedComponent {
    pub component_set_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub sprint_id: String,
    pub page_id: NodeId,
    pub frame_id: NodeId,
    pub table_id: NodeId,
    pub components: Vec<ComponentArtifact>,
    pub skipped: Vec<SkippedComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Sprint missing or without notes; the document was not touched
    NoOp { sprint_id: String },
    Published(PublishReport),
}

impl PublishOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, PublishOutcome::NoOp { .. })
    }

    pub fn report(&self) -> Option<&PublishReport> {
        match self {
            PublishOutcome::Published(report) => Some(report),
            PublishOutcome::NoOp { .. } => None,
        }
    }
}

/// Result of publishing one component set's changelog.
enum ComponentPublish {
    Placed(ComponentArtifact),
    Skipped(String),
}

impl ComponentPublish {
    fn skipped(reason: &str) -> Self {
        ComponentPublish::Skipped(reason.to_string())
    }
}

pub struct Publisher<'a, D: HostDocument + ?Sized, L: ResourceLoader + ?Sized> {
    document: &'a mut D,
    loader: &'a L,
    config: &'a PublishConfig,
}

impl<'a, D: HostDocument + ?Sized, L: ResourceLoader + ?Sized> Publisher<'a, D, L> {
    pub fn new(document: &'a mut D, loader: &'a L, config: &'a PublishConfig) -> Self {
        Self {
            document,
            loader,
            config,
        }
    }

    /// Publish `sprint_id` given every known sprint.
    pub async fn publish(&mut self, sprint_id: &str, sprints: &[Sprint]) -> Result<PublishOutcome> {
        let Some(sprint) = sprints.iter().find(|sprint| sprint.id == sprint_id) else {
            debug!(sprint_id, "publish skipped: sprint not found");
            return Ok(PublishOutcome::NoOp {
                sprint_id: sprint_id.to_string(),
            });
        };
        if sprint.notes.is_empty() {
            debug!(sprint_id, "publish skipped: sprint has no notes");
            return Ok(PublishOutcome::NoOp {
                sprint_id: sprint_id.to_string(),
            });
        }

        let builder = ChangelogBuilder::new(self.config);

        let page_id = self.find_or_create_page()?;
        let frame_id = self.find_or_create_frame(&page_id)?;
        let table = builder.sprint_changelog(sprint, &sprint.notes, true);
        self.load_fonts(&table).await?;
        let table_id = self.document.insert(&frame_id, Some(0), &table)?;

        let mut components = Vec::new();
        let mut skipped = Vec::new();
        for component_set_id in sprint.component_set_ids() {
            match self
                .publish_component(&builder, &component_set_id, sprints)
                .await?
            {
                ComponentPublish::Placed(artifact) => components.push(artifact),
                ComponentPublish::Skipped(reason) => {
                    warn!(component_set_id = %component_set_id, reason = %reason, "skipping component set");
                    skipped.push(SkippedComponent {
                        component_set_id,
                        reason,
                    });
                }
            }
        }

        self.document.set_current_page(&page_id)?;
        self.document.scroll_into_view(std::slice::from_ref(&frame_id))?;

        info!(
            sprint_id,
            components = components.len(),
            skipped = skipped.len(),
            "published release notes"
        );
        Ok(PublishOutcome::Published(PublishReport {
            sprint_id: sprint_id.to_string(),
            page_id,
            frame_id,
            table_id,
            components,
            skipped,
        }))
    }

    /// Remove every published artifact, keeping the release-notes frame.
    ///
    /// Returns the number of removed nodes.
    pub fn clear_from_canvas(&mut self) -> Result<usize> {
        let mut removed = 0;
        for page in self.pages() {
            if page.name == self.config.page_name {
                for frame in find_children(&*self.document, &page.id, NodeKind::Frame, &self.config.frame_name) {
                    for child in self.document.children(&frame.id) {
                        self.document.remove(&child)?;
                        removed += 1;
                    }
                }
            }
            let artifacts: Vec<NodeInfo> = self
                .document
                .children(&page.id)
                .iter()
                .filter_map(|id| self.document.node(id))
                .filter(|node| {
                    node.kind == NodeKind::Frame && node.name.ends_with(&self.config.artifact_suffix)
                })
                .collect();
            for artifact in artifacts {
                self.document.remove(&artifact.id)?;
                removed += 1;
            }
        }
        info!(removed, "cleared release notes from canvas");
        Ok(removed)
    }

    async fn publish_component(
        &mut self,
        builder: &ChangelogBuilder<'_>,
        component_set_id: &str,
        sprints: &[Sprint],
    ) -> Result<ComponentPublish> {
        let info = match resolve_node(&*self.document, component_set_id) {
            Some(ResolvedNode::ComponentSet(info)) => info,
            Some(_) => return Ok(ComponentPublish::skipped("node is not a component set")),
            None => return Ok(ComponentPublish::skipped("node not found")),
        };
        let Some(page) = find_ancestor(&*self.document, &info.id, NodeKind::Page) else {
            return Ok(ComponentPublish::skipped("component set is not on a page"));
        };

        let component = ComponentSetInfo {
            id: info.id.clone(),
            name: info.name.clone(),
        };
        let artifact_name = self.config.artifact_name(&component.name);
        let stale = find_children(&*self.document, &page.id, NodeKind::Frame, &artifact_name);
        for node in &stale {
            self.document.remove(&node.id)?;
        }

        let node_id = match builder.component_changelog(&component, sprints) {
            Some(tree) => {
                self.load_fonts(&tree).await?;
                let id = self.document.insert(&page.id, None, &tree)?;
                let width = tree.width().unwrap_or(CARD_WIDTH);
                self.document
                    .set_position(&id, info.x - width - self.config.gap, info.y)?;
                Some(id)
            }
            None => None,
        };

        Ok(ComponentPublish::Placed(ComponentArtifact {
            component_set_id: component.id,
            component_set_name: component.name,
            node_id,
            removed: stale.len(),
        }))
    }

    fn pages(&self) -> Vec<NodeInfo> {
        let root = self.document.root_id();
        self.document
            .children(&root)
            .iter()
            .filter_map(|id| self.document.node(id))
            .filter(|node| node.kind == NodeKind::Page)
            .collect()
    }

    fn find_or_create_page(&mut self) -> Result<NodeId> {
        if let Some(page) = self
            .pages()
            .into_iter()
            .find(|page| page.name == self.config.page_name)
        {
            return Ok(page.id);
        }
        self.document.create_page(&self.config.page_name)
    }

    fn find_or_create_frame(&mut self, page_id: &str) -> Result<NodeId> {
        let existing = find_children(&*self.document, page_id, NodeKind::Frame, &self.config.frame_name);
        if let Some(frame) = existing.into_iter().next() {
            return Ok(frame.id);
        }
        let frame: DocumentNode =
            DocumentNode::container(self.config.frame_name.clone(), Direction::Vertical).into();
        self.document.insert(page_id, None, &frame)
    }

    async fn load_fonts(&self, tree: &DocumentNode) -> Result<()> {
        for font in tree.fonts() {
            self.loader.load_font(&font).await?;
        }
        Ok(())
    }
}
