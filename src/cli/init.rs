//! relnotes init command implementation
//!
//! Creates the state directory, an empty store, an empty document and a
//! default `.relnotes.toml`.

use std::path::PathBuf;

use crate::cli::session::resolve_dir;
use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::Storage;

#[derive(serde::Serialize)]
struct InitReport {
    dir: PathBuf,
    created: Vec<PathBuf>,
}

pub fn run(dir: Option<PathBuf>, output: OutputOptions) -> Result<()> {
    let storage = Storage::new(resolve_dir(dir)?);
    let mut created = storage.init()?;

    let config_file = storage.config_file();
    if !config_file.exists() {
        Config::default().save(&config_file)?;
        created.push(config_file);
    }

    let header = if created.is_empty() {
        "relnotes init: nothing to do".to_string()
    } else {
        "relnotes init: initialized".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("dir", storage.root().display().to_string());
    human.push_summary(
        "created",
        if created.is_empty() {
            "none".to_string()
        } else {
            created
                .iter()
                .map(|path| {
                    path.strip_prefix(storage.root())
                        .unwrap_or(path)
                        .display()
                        .to_string()
                })
                .collect::<Vec<_>>()
                .join(", ")
        },
    );
    human.push_next_step("relnotes component add <name>");
    human.push_next_step("relnotes sprint create <name>");

    let report = InitReport {
        dir: storage.root().to_path_buf(),
        created,
    };
    emit_success(output, "init", &report, Some(&human))
}
