//! relnotes publish, clear and render command implementations

use std::path::PathBuf;

use crate::builder::ChangelogBuilder;
use crate::cli::session::{block_on, Session};
use crate::document::DocumentNode;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::protocol::ClearedPayload;
use crate::publish::PublishOutcome;

pub fn run_publish(dir: Option<PathBuf>, sprint_id: &str, output: OutputOptions) -> Result<()> {
    let mut session = Session::open(dir)?;
    let outcome = block_on(session.core_mut().publish(sprint_id))??;

    let human = match &outcome {
        PublishOutcome::NoOp { .. } => {
            let mut human = HumanOutput::new(format!("relnotes publish: nothing to publish for {sprint_id}"));
            human.push_warning("sprint is missing or has no notes");
            human.push_next_step("relnotes sprint list");
            human
        }
        PublishOutcome::Published(report) => {
            session.save_document()?;
            let mut human = HumanOutput::new(format!("relnotes publish: {sprint_id}"));
            human.push_summary("table", report.table_id.clone());
            human.push_summary("components", report.components.len().to_string());
            for artifact in &report.components {
                let placed = artifact.node_id.as_deref().unwrap_or("nothing to show");
                human.push_detail(format!(
                    "{} {} -> {placed} (replaced {})",
                    artifact.component_set_id, artifact.component_set_name, artifact.removed
                ));
            }
            for skipped in &report.skipped {
                human.push_warning(format!(
                    "skipped {}: {}",
                    skipped.component_set_id, skipped.reason
                ));
            }
            human
        }
    };

    emit_success(output, "publish", &outcome, Some(&human))
}

pub fn run_clear(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let mut session = Session::open(dir)?;
    let removed = session.core_mut().clear_from_canvas()?;
    session.save_document()?;

    let mut human = HumanOutput::new("relnotes clear: done");
    human.push_summary("removed", removed.to_string());
    emit_success(output, "clear", &ClearedPayload { removed }, Some(&human))
}

pub fn run_render(dir: Option<PathBuf>, sprint_id: &str, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let sprint = session
        .core()
        .find_sprint(sprint_id)?
        .ok_or_else(|| Error::SprintNotFound(sprint_id.to_string()))?;

    let builder = ChangelogBuilder::new(&session.core().config().publish);
    let tree = builder.sprint_changelog(&sprint, &sprint.notes, true);

    let mut human = HumanOutput::new(format!("relnotes render: {}", sprint.name));
    outline(&tree, 0, &mut human);
    emit_success(output, "render", &tree, Some(&human))
}

fn outline(node: &DocumentNode, depth: usize, human: &mut HumanOutput) {
    let indent = "  ".repeat(depth);
    match node {
        DocumentNode::Text(text) => human.push_detail(format!("{indent}\"{}\"", text.content)),
        DocumentNode::Shape(shape) => human.push_detail(format!("{indent}<{}>", shape.name)),
        DocumentNode::Container(container) => {
            human.push_detail(format!("{indent}{}", container.name));
            for child in &container.children {
                outline(child, depth + 1, human);
            }
        }
    }
}
