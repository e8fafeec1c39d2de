//! Command-line interface for relnotes
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::output::OutputOptions;

mod component;
mod init;
mod note;
mod publish;
mod session;
mod sprint;
mod transfer;

/// relnotes - sprint release notes for component sets
///
/// Records change notes against component sets, groups them into sprints,
/// and publishes formatted changelogs into the document.
#[derive(Parser, Debug)]
#[command(name = "relnotes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace directory holding `.relnotes/` (defaults to current directory)
    #[arg(long, global = true, env = "RELNOTES_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize relnotes state in a directory
    Init,

    /// Component set catalog
    #[command(subcommand)]
    Component(ComponentCommands),

    /// Sprint management
    #[command(subcommand)]
    Sprint(SprintCommands),

    /// Release note management
    #[command(subcommand)]
    Note(NoteCommands),

    /// Publish a sprint's release notes into the document
    Publish {
        /// Sprint id
        sprint: String,
    },

    /// Remove every published changelog from the document, keeping notes
    Clear,

    /// Export all sprints to a JSON backup
    Export {
        /// Output file (defaults to release-notes-backup-<date>.json in the workspace)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Replace all sprints with the contents of a JSON backup
    Import {
        /// Backup file to read
        file: PathBuf,
    },

    /// Print the changelog tree of a sprint without touching the document
    Render {
        /// Sprint id
        sprint: String,
    },
}

/// Component set subcommands
#[derive(Subcommand, Debug)]
pub enum ComponentCommands {
    /// Add a component set to the document
    Add {
        /// Component set name
        name: String,

        /// Page to place it on (created when missing)
        #[arg(long, default_value = "Components")]
        page: String,

        /// Horizontal position on the page
        #[arg(long, default_value_t = 0.0)]
        x: f64,

        /// Vertical position on the page
        #[arg(long, default_value_t = 0.0)]
        y: f64,
    },

    /// Show the cached component set catalog
    List,

    /// Rescan the document for component sets
    Find,

    /// Select a component set (omit the id to clear the selection)
    Select {
        /// Component set id
        id: Option<String>,
    },

    /// Bring a component set into view
    View {
        /// Component set id
        id: String,
    },
}

/// Sprint subcommands
#[derive(Subcommand, Debug)]
pub enum SprintCommands {
    /// List sprints and the current selection
    List,

    /// Create a sprint and select it
    Create {
        /// Sprint name
        name: String,
    },

    /// Rename a sprint
    Rename {
        /// Sprint id
        id: String,

        /// New name
        name: String,
    },

    /// Delete a sprint and its notes
    Delete {
        /// Sprint id
        id: String,
    },

    /// Select a sprint (omit the id to clear the selection)
    Select {
        /// Sprint id
        id: Option<String>,
    },
}

/// Note subcommands
#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Add a note to a sprint
    Add {
        /// Sprint id
        sprint: String,

        /// Component set id the note is about
        #[arg(short, long)]
        component: String,

        /// Tag: bug_fix, enhancement, new_component, deprecation, deleted
        #[arg(short, long)]
        tag: String,

        /// What changed
        description: String,
    },

    /// Edit a note's description or tag
    Edit {
        /// Sprint id
        sprint: String,

        /// Note id
        note: String,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Delete a note
    Delete {
        /// Sprint id
        sprint: String,

        /// Note id
        note: String,
    },

    /// List the notes of a sprint
    List {
        /// Sprint id
        sprint: String,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };
        let dir = self.dir;
        match self.command {
            Commands::Init => init::run(dir, output),
            Commands::Component(cmd) => match cmd {
                ComponentCommands::Add { name, page, x, y } => {
                    component::run_add(component::AddOptions {
                        name,
                        page,
                        x,
                        y,
                        dir,
                        output,
                    })
                }
                ComponentCommands::List => component::run_list(dir, output, false),
                ComponentCommands::Find => component::run_list(dir, output, true),
                ComponentCommands::Select { id } => component::run_select(dir, id, output),
                ComponentCommands::View { id } => component::run_view(dir, &id, output),
            },
            Commands::Sprint(cmd) => match cmd {
                SprintCommands::List => sprint::run_list(dir, output),
                SprintCommands::Create { name } => sprint::run_create(dir, &name, output),
                SprintCommands::Rename { id, name } => sprint::run_rename(dir, id, name, output),
                SprintCommands::Delete { id } => sprint::run_delete(dir, &id, output),
                SprintCommands::Select { id } => sprint::run_select(dir, id, output),
            },
            Commands::Note(cmd) => match cmd {
                NoteCommands::Add {
                    sprint,
                    component,
                    tag,
                    description,
                } => note::run_add(note::AddOptions {
                    sprint,
                    component,
                    tag,
                    description,
                    dir,
                    output,
                }),
                NoteCommands::Edit {
                    sprint,
                    note,
                    description,
                    tag,
                } => note::run_edit(note::EditOptions {
                    sprint,
                    note,
                    description,
                    tag,
                    dir,
                    output,
                }),
                NoteCommands::Delete { sprint, note } => {
                    note::run_delete(dir, sprint, note, output)
                }
                NoteCommands::List { sprint } => note::run_list(dir, &sprint, output),
            },
            Commands::Publish { sprint } => publish::run_publish(dir, &sprint, output),
            Commands::Clear => publish::run_clear(dir, output),
            Commands::Export { out } => transfer::run_export(dir, out, output),
            Commands::Import { file } => transfer::run_import(dir, &file, output),
            Commands::Render { sprint } => publish::run_render(dir, &sprint, output),
        }
    }
}
