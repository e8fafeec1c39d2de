//! relnotes sprint command implementation

use std::path::PathBuf;

use crate::cli::session::Session;
use crate::error::{Error, Result};
use crate::model::{RenameSprintPayload, SprintsPayload};
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(serde::Serialize)]
struct SelectReport {
    last_selected_sprint_id: Option<String>,
}

pub fn run_list(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let payload = session.core().load_sprints()?;
    let human = sprints_human(
        format!("relnotes sprint list: {} sprint(s)", payload.sprints.len()),
        &payload,
    );
    emit_success(output, "sprint list", &payload, Some(&human))
}

pub fn run_create(dir: Option<PathBuf>, name: &str, output: OutputOptions) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument("sprint name cannot be empty".to_string()));
    }
    let mut session = Session::open(dir)?;
    let payload = session.core_mut().create_sprint(name)?;

    let mut human = sprints_human(
        format!("relnotes sprint create: {}", name.trim()),
        &payload,
    );
    if let Some(id) = &payload.last_selected_sprint_id {
        human.push_next_step(format!(
            "relnotes note add {id} --component <id> --tag <tag> \"...\""
        ));
    }
    emit_success(output, "sprint create", &payload, Some(&human))
}

pub fn run_rename(dir: Option<PathBuf>, id: String, name: String, output: OutputOptions) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument("sprint name cannot be empty".to_string()));
    }
    let session = Session::open(dir)?;
    if session.core().find_sprint(&id)?.is_none() {
        return Err(Error::SprintNotFound(id));
    }
    let payload = session
        .core()
        .rename_sprint(&RenameSprintPayload { id: id.clone(), name })?;

    let human = sprints_human(format!("relnotes sprint rename: {id}"), &payload);
    emit_success(output, "sprint rename", &payload, Some(&human))
}

pub fn run_delete(dir: Option<PathBuf>, id: &str, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    if !session.core().has_sprint_record(id)? {
        return Err(Error::SprintNotFound(id.to_string()));
    }
    let payload = session.core().delete_sprint(id)?;

    let human = sprints_human(format!("relnotes sprint delete: {id}"), &payload);
    emit_success(output, "sprint delete", &payload, Some(&human))
}

pub fn run_select(dir: Option<PathBuf>, id: Option<String>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    if let Some(id) = id.as_deref() {
        if session.core().find_sprint(id)?.is_none() {
            return Err(Error::SprintNotFound(id.to_string()));
        }
    }
    session.core().select_sprint(id.as_deref())?;

    let header = match &id {
        Some(id) => format!("relnotes sprint select: {id}"),
        None => "relnotes sprint select: cleared".to_string(),
    };
    emit_success(
        output,
        "sprint select",
        &SelectReport {
            last_selected_sprint_id: id,
        },
        Some(&HumanOutput::new(header)),
    )
}

fn sprints_human(header: String, payload: &SprintsPayload) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    for sprint in &payload.sprints {
        let marker = if payload.last_selected_sprint_id.as_deref() == Some(sprint.id.as_str()) {
            "*"
        } else {
            " "
        };
        human.push_detail(format!(
            "{marker} {} {} ({} note(s))",
            sprint.id,
            sprint.name,
            sprint.notes.len()
        ));
    }
    if payload.sprints.is_empty() {
        human.push_next_step("relnotes sprint create <name>");
    }
    human
}
