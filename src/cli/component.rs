//! relnotes component command implementation
//!
//! The CLI stands in for the design tool: `add` places a component set in
//! the document file, the rest go through the core like any client would.

use std::path::PathBuf;

use crate::cli::session::Session;
use crate::error::{Error, Result};
use crate::host::{HostDocument, NodeKind};
use crate::model::ComponentSetsPayload;
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for `relnotes component add`
pub struct AddOptions {
    pub name: String,
    pub page: String,
    pub x: f64,
    pub y: f64,
    pub dir: Option<PathBuf>,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct AddReport {
    id: String,
    name: String,
    page_id: String,
}

#[derive(serde::Serialize)]
struct SelectReport {
    last_selected_component_set_id: Option<String>,
}

#[derive(serde::Serialize)]
struct ViewReport {
    id: String,
    page_id: Option<String>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let name = options.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::InvalidArgument("component set name cannot be empty".to_string()));
    }

    let mut session = Session::open(options.dir)?;
    let document = session.core_mut().document_mut();
    let root = document.root_id();
    let existing_page = document
        .children(&root)
        .into_iter()
        .filter_map(|id| document.node(&id))
        .find(|node| node.kind == NodeKind::Page && node.name == options.page);
    let page_id = match existing_page {
        Some(page) => page.id,
        None => document.create_page(&options.page)?,
    };
    let id = document.add_component_set(&page_id, &name, options.x, options.y);
    session.save_document()?;

    let mut human = HumanOutput::new(format!("relnotes component add: {name}"));
    human.push_summary("id", id.clone());
    human.push_summary("page", options.page.clone());
    human.push_next_step("relnotes component find");

    emit_success(
        options.output,
        "component add",
        &AddReport { id, name, page_id },
        Some(&human),
    )
}

pub fn run_list(dir: Option<PathBuf>, output: OutputOptions, rescan: bool) -> Result<()> {
    let session = Session::open(dir)?;
    let payload = if rescan {
        session.core().find_component_sets()?
    } else {
        session.core().load_component_sets()?
    };

    let command = if rescan { "component find" } else { "component list" };
    let human = catalog_human(command, &payload);
    emit_success(output, command, &payload, Some(&human))
}

pub fn run_select(dir: Option<PathBuf>, id: Option<String>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    if let Some(id) = id.as_deref() {
        let cached = session.core().load_component_sets()?;
        if !cached.component_sets.iter().any(|set| set.id == id) {
            return Err(Error::ComponentSetNotFound(id.to_string()));
        }
    }
    session.core().select_component_set(id.as_deref())?;

    let header = match &id {
        Some(id) => format!("relnotes component select: {id}"),
        None => "relnotes component select: cleared".to_string(),
    };
    let human = HumanOutput::new(header);
    emit_success(
        output,
        "component select",
        &SelectReport {
            last_selected_component_set_id: id,
        },
        Some(&human),
    )
}

pub fn run_view(dir: Option<PathBuf>, id: &str, output: OutputOptions) -> Result<()> {
    let mut session = Session::open(dir)?;
    if !session.core_mut().view_component_set(id)? {
        return Err(Error::ComponentSetNotFound(id.to_string()));
    }
    session.save_document()?;

    let page_id = session.core().document().current_page().map(str::to_string);
    let mut human = HumanOutput::new(format!("relnotes component view: {id}"));
    if let Some(page) = &page_id {
        human.push_summary("page", page.clone());
    }
    emit_success(
        output,
        "component view",
        &ViewReport {
            id: id.to_string(),
            page_id,
        },
        Some(&human),
    )
}

fn catalog_human(command: &str, payload: &ComponentSetsPayload) -> HumanOutput {
    let mut human = HumanOutput::new(format!(
        "relnotes {command}: {} component set(s)",
        payload.component_sets.len()
    ));
    for set in &payload.component_sets {
        let marker = if payload.last_selected_component_set_id.as_deref() == Some(set.id.as_str()) {
            "*"
        } else {
            " "
        };
        human.push_detail(format!("{marker} {} {}", set.id, set.name));
    }
    if payload.component_sets.is_empty() {
        human.push_next_step("relnotes component add <name>");
    }
    human
}
