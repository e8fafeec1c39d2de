//! relnotes note command implementation

use std::path::PathBuf;

use crate::builder::format_note_date;
use crate::cli::session::Session;
use crate::error::{Error, Result};
use crate::host::{resolve_node, ResolvedNode};
use crate::model::{
    AddNotePayload, DeleteNotePayload, EditNotePayload, NoteTag, ReleaseNote, Sprint,
};
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for `relnotes note add`
pub struct AddOptions {
    pub sprint: String,
    pub component: String,
    pub tag: String,
    pub description: String,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Options for `relnotes note edit`
pub struct EditOptions {
    pub sprint: String,
    pub note: String,
    pub description: Option<String>,
    pub tag: Option<String>,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct NoteReport {
    sprint_id: String,
    note: ReleaseNote,
}

#[derive(serde::Serialize)]
struct DeleteReport {
    sprint_id: String,
    note_id: String,
}

#[derive(serde::Serialize)]
struct ListReport {
    sprint: Sprint,
}

fn require_sprint(session: &Session, id: &str) -> Result<Sprint> {
    session
        .core()
        .find_sprint(id)?
        .ok_or_else(|| Error::SprintNotFound(id.to_string()))
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let tag: NoteTag = options.tag.parse()?;
    let description = options.description.trim().to_string();
    if description.is_empty() {
        return Err(Error::InvalidArgument("note description cannot be empty".to_string()));
    }

    let mut session = Session::open(options.dir)?;
    let before = require_sprint(&session, &options.sprint)?;
    let component = match resolve_node(session.core().document(), &options.component) {
        Some(ResolvedNode::ComponentSet(info)) => info,
        _ => return Err(Error::ComponentSetNotFound(options.component)),
    };

    let payload = session.core_mut().add_note(&AddNotePayload {
        sprint_id: options.sprint.clone(),
        description,
        tag,
        component_set_id: component.id,
        component_set_name: component.name,
    })?;

    let note = payload
        .sprints
        .iter()
        .find(|sprint| sprint.id == options.sprint)
        .and_then(|sprint| {
            sprint
                .notes
                .iter()
                .find(|note| before.note(&note.id).is_none())
        })
        .cloned()
        .ok_or_else(|| Error::OperationFailed("note was not stored".to_string()))?;

    let mut human = HumanOutput::new(format!("relnotes note add: {}", note.id));
    human.push_summary("sprint", options.sprint.clone());
    human.push_summary("component", note.component_set_name.clone());
    human.push_summary("tag", note.tag.label());
    human.push_summary("author", note.author_name.clone());
    human.push_next_step(format!("relnotes publish {}", options.sprint));

    emit_success(
        options.output,
        "note add",
        &NoteReport {
            sprint_id: options.sprint,
            note,
        },
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let session = Session::open(options.dir)?;
    let sprint = require_sprint(&session, &options.sprint)?;
    let current = sprint
        .note(&options.note)
        .ok_or_else(|| Error::NoteNotFound {
            sprint_id: options.sprint.clone(),
            note_id: options.note.clone(),
        })?;

    let tag = match options.tag.as_deref() {
        Some(raw) => raw.parse()?,
        None => current.tag,
    };
    let description = match options.description {
        Some(text) if text.trim().is_empty() => {
            return Err(Error::InvalidArgument("note description cannot be empty".to_string()));
        }
        Some(text) => text.trim().to_string(),
        None => current.description.clone(),
    };

    let payload = session.core().edit_note(&EditNotePayload {
        sprint_id: options.sprint.clone(),
        note_id: options.note.clone(),
        description,
        tag,
    })?;
    let note = payload
        .sprints
        .iter()
        .find(|s| s.id == options.sprint)
        .and_then(|s| s.note(&options.note))
        .cloned()
        .ok_or_else(|| Error::NoteNotFound {
            sprint_id: options.sprint.clone(),
            note_id: options.note.clone(),
        })?;

    let mut human = HumanOutput::new(format!("relnotes note edit: {}", note.id));
    human.push_summary("tag", note.tag.label());
    human.push_summary("description", note.description.clone());

    emit_success(
        options.output,
        "note edit",
        &NoteReport {
            sprint_id: options.sprint,
            note,
        },
        Some(&human),
    )
}

pub fn run_delete(
    dir: Option<PathBuf>,
    sprint_id: String,
    note_id: String,
    output: OutputOptions,
) -> Result<()> {
    let session = Session::open(dir)?;
    let sprint = require_sprint(&session, &sprint_id)?;
    if sprint.note(&note_id).is_none() {
        return Err(Error::NoteNotFound { sprint_id, note_id });
    }
    session.core().delete_note(&DeleteNotePayload {
        sprint_id: sprint_id.clone(),
        note_id: note_id.clone(),
    })?;

    let human = HumanOutput::new(format!("relnotes note delete: {note_id}"));
    emit_success(
        output,
        "note delete",
        &DeleteReport { sprint_id, note_id },
        Some(&human),
    )
}

pub fn run_list(dir: Option<PathBuf>, sprint_id: &str, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let sprint = require_sprint(&session, sprint_id)?;

    let mut human = HumanOutput::new(format!(
        "relnotes note list: {} ({} note(s))",
        sprint.name,
        sprint.notes.len()
    ));
    for note in &sprint.notes {
        human.push_detail(format!(
            "{} {} {} [{}] {} ({}, {})",
            note.id,
            note.tag.emoji(),
            note.tag.label(),
            note.component_set_name,
            note.description,
            note.author_name,
            format_note_date(&note.created_at)
        ));
    }

    emit_success(output, "note list", &ListReport { sprint }, Some(&human))
}
