//! Changelog tree builder.
//!
//! Two flavors share the same entry layout:
//!
//! - aggregated: one sprint, every component set mixed together
//! - per-component: one component set across every sprint that touched it,
//!   newest sprint first
//!
//! ```text
//! <root>                       surface card
//!   Changelog
//!     Title | Sprint version
//!     Log                      one per sprint
//!       timeline               diamond (+ line unless last)
//!       main
//!         [Sprint version]     per-component flavor only
//!         who + when           badge, "By", author, "on", date
//!         Description          one bullet-item per note
//!   Logo
//! ```

use std::cmp::Ordering;

use crate::aggregate::{group_notes, NoteGroup};
use crate::config::PublishConfig;
use crate::document::{Container, Direction, DocumentNode, Fill, ShapeKind, TextStyle};
use crate::model::{ComponentSetInfo, NoteTimestamp, ReleaseNote, Sprint};

/// Width of a changelog card.
pub const CARD_WIDTH: f64 = 560.0;

const BULLET: &str = "•";
const EMPTY_PLACEHOLDER: &str = "No entries";

/// Builds changelog trees with names and titles taken from publish config.
#[derive(Debug, Clone)]
pub struct ChangelogBuilder<'a> {
    config: &'a PublishConfig,
}

impl<'a> ChangelogBuilder<'a> {
    pub fn new(config: &'a PublishConfig) -> Self {
        Self { config }
    }

    /// Name of the aggregated table for a sprint.
    pub fn sprint_table_name(sprint: &Sprint) -> String {
        format!("Changelog – {}", sprint.name)
    }

    /// Aggregated changelog of `notes` for `sprint`.
    ///
    /// With `include_header` the section opens with the title row; without
    /// it, with the sprint name. An empty note list renders a placeholder.
    pub fn sprint_changelog(
        &self,
        sprint: &Sprint,
        notes: &[ReleaseNote],
        include_header: bool,
    ) -> DocumentNode {
        let mut section = changelog_section();
        if include_header {
            section.push(self.title_row());
        } else {
            section.push(sprint_version_row(&sprint.name));
        }

        let groups = group_notes(notes);
        if groups.is_empty() {
            section.push(DocumentNode::text(EMPTY_PLACEHOLDER, TextStyle::Placeholder));
        } else {
            let mut main = main_column();
            for group in &groups {
                push_entry(&mut main, group);
            }
            section.push(log_row(main, false));
        }

        card(Self::sprint_table_name(sprint), section)
    }

    /// Changelog of one component set across `sprints`.
    ///
    /// Only sprints with at least one note for the component contribute, and
    /// only those notes are shown. Returns `None` when no sprint does.
    pub fn component_changelog(
        &self,
        component: &ComponentSetInfo,
        sprints: &[Sprint],
    ) -> Option<DocumentNode> {
        let mut touching: Vec<&Sprint> = sprints
            .iter()
            .filter(|sprint| sprint.touches(&component.id))
            .collect();
        if touching.is_empty() {
            return None;
        }
        touching.sort_by(|a, b| newest_sprint_first(a, b));

        let mut section = changelog_section();
        section.push(self.title_row());

        let last = touching.len() - 1;
        for (index, sprint) in touching.iter().enumerate() {
            let groups = group_notes(&sprint.notes_for(&component.id));
            let mut main = main_column();
            main.push(sprint_version_row(&sprint.name));
            for group in &groups {
                push_entry(&mut main, group);
            }
            section.push(log_row(main, index == last));
        }

        Some(card(self.config.artifact_name(&component.name), section))
    }

    fn title_row(&self) -> Container {
        DocumentNode::container("Title", Direction::Horizontal)
            .stretched()
            .with_child(DocumentNode::text(&self.config.title, TextStyle::Title))
    }
}

/// Sprint ids are creation timestamps: compare numerically, newest first.
/// Non-numeric ids go after numeric ones, by string, descending.
fn newest_sprint_first(a: &Sprint, b: &Sprint) -> Ordering {
    match (a.numeric_id(), b.numeric_id()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    }
}

/// `Jan 02, 2024`, from the literal date of the timestamp.
pub fn format_note_date(timestamp: &NoteTimestamp) -> String {
    match timestamp.calendar_date() {
        Some(date) => date.format("%b %d, %Y").to_string(),
        None => timestamp.date_part().to_string(),
    }
}

fn card(name: String, section: Container) -> DocumentNode {
    DocumentNode::container(name, Direction::Vertical)
        .with_fill(Fill::Surface)
        .with_width(CARD_WIDTH)
        .with_child(section)
        .with_child(
            DocumentNode::container("Logo", Direction::Vertical)
                .stretched()
                .with_child(DocumentNode::shape("Logo", ShapeKind::Logo)),
        )
        .into()
}

fn changelog_section() -> Container {
    DocumentNode::container("Changelog", Direction::Vertical).stretched()
}

fn sprint_version_row(name: &str) -> Container {
    DocumentNode::container("Sprint version", Direction::Horizontal)
        .with_child(DocumentNode::text(name, TextStyle::SprintLabel))
}

fn main_column() -> Container {
    DocumentNode::container("main", Direction::Vertical)
}

fn log_row(main: Container, is_last: bool) -> Container {
    DocumentNode::container("Log", Direction::Horizontal)
        .stretched()
        .with_child(timeline_column(is_last))
        .with_child(main)
}

fn timeline_column(is_last: bool) -> Container {
    let mut timeline = DocumentNode::container("timeline", Direction::Vertical)
        .stretched()
        .with_child(DocumentNode::shape("diamond", ShapeKind::Diamond));
    if !is_last {
        timeline.push(DocumentNode::shape("timeline-line", ShapeKind::TimelineLine));
    }
    timeline
}

fn status_badge(group: &NoteGroup) -> Container {
    let tag = group.tag();
    DocumentNode::container("Status Badge", Direction::Horizontal)
        .with_fill(Fill::Badge(tag))
        .with_child(DocumentNode::text(tag.emoji(), TextStyle::BadgeLabel))
        .with_child(DocumentNode::text(tag.label(), TextStyle::BadgeLabel))
}

fn push_entry(main: &mut Container, group: &NoteGroup) {
    let lead = group.lead();
    main.push(
        DocumentNode::container("who + when", Direction::Horizontal)
            .with_child(status_badge(group))
            .with_child(DocumentNode::text("By", TextStyle::Body))
            .with_child(DocumentNode::text(&lead.author_name, TextStyle::Emphasis))
            .with_child(DocumentNode::text("on", TextStyle::Body))
            .with_child(DocumentNode::text(
                format_note_date(&lead.created_at),
                TextStyle::Body,
            )),
    );

    let mut description = DocumentNode::container("Description", Direction::Vertical).stretched();
    for note in group.notes() {
        description.push(
            DocumentNode::container("bullet-item", Direction::Horizontal)
                .with_child(DocumentNode::text(BULLET, TextStyle::Bullet))
                .with_child(DocumentNode::text(&note.description, TextStyle::Bullet)),
        );
    }
    main.push(description);
}
