//! relnotes export and import command implementations

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::cli::session::Session;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::transfer::{backup_file_name, ImportResult};

#[derive(serde::Serialize)]
struct ExportReport {
    path: PathBuf,
    sprints: usize,
}

pub fn run_export(dir: Option<PathBuf>, out: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let data = session.core().export()?;
    let path = out.unwrap_or_else(|| session.storage().root().join(backup_file_name(&Utc::now())));
    session.storage().write_json(&path, &data)?;

    let mut human = HumanOutput::new("relnotes export: done");
    human.push_summary("path", path.display().to_string());
    human.push_summary("sprints", data.sprints.len().to_string());
    emit_success(
        output,
        "export",
        &ExportReport {
            path,
            sprints: data.sprints.len(),
        },
        Some(&human),
    )
}

pub fn run_import(dir: Option<PathBuf>, file: &Path, output: OutputOptions) -> Result<()> {
    let session = Session::open(dir)?;
    let content = std::fs::read_to_string(file)?;
    let data: serde_json::Value = serde_json::from_str(&content)
        .map_err(|err| Error::InvalidImport(format!("{}: {err}", file.display())))?;

    let result: ImportResult = session.core().import(&data)?;
    if !result.success {
        return Err(Error::InvalidImport(result.message));
    }

    let mut human = HumanOutput::new("relnotes import: done");
    human.push_summary("message", result.message.clone());
    human.push_next_step("relnotes sprint list");
    emit_success(output, "import", &result, Some(&human))
}
