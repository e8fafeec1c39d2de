//! Shared output formatting for relnotes CLI commands.
//!
//! Every command reports through [`emit_success`] or [`emit_error`]: a JSON
//! envelope with `--json`, a short human summary otherwise.

use serde::Serialize;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "relnotes.v1";

/// Global flags that take a value and must not be read as a command name.
const VALUE_FLAGS: &[&str] = &["--dir"];

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Details,
    Warnings,
    NextSteps,
}

impl Section {
    const ORDER: [Section; 4] = [
        Section::Summary,
        Section::Details,
        Section::Warnings,
        Section::NextSteps,
    ];

    fn title(self) -> &'static str {
        match self {
            Section::Summary => "Summary",
            Section::Details => "Details",
            Section::Warnings => "Warnings",
            Section::NextSteps => "Next steps",
        }
    }
}

/// Human-readable report: a header line and bulleted sections.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    entries: Vec<(Section, String)>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            entries: Vec::new(),
        }
    }

    /// `key: value`, or just `key` when the value is empty.
    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        let line = if value.is_empty() { key } else { format!("{key}: {value}") };
        self.entries.push((Section::Summary, line));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.entries.push((Section::Details, value.into()));
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.entries.push((Section::Warnings, value.into()));
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.entries.push((Section::NextSteps, value.into()));
    }

    fn section(&self, section: Section) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(s, _)| *s == section)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Body<'a, T: Serialize> {
    Data(&'a T),
    Error(ErrorBody),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

/// `{schema_version, command, status, data | error, warnings?, next_steps?}`
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(flatten)]
    body: Body<'a, T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

fn print_json<T: Serialize>(envelope: &Envelope<'_, T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        return print_json(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            body: Body::Data(data),
            warnings: human.map(|h| h.section(Section::Warnings)).unwrap_or_default(),
            next_steps: human.map(|h| h.section(Section::NextSteps)).unwrap_or_default(),
        });
    }
    if let (false, Some(human)) = (options.quiet, human) {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        return print_json(&Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            body: Body::Error(ErrorBody {
                message: err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
                details: err.details(),
            }),
            warnings: Vec::new(),
            next_steps,
        });
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = vec![output.header.clone()];
    for section in Section::ORDER {
        let items = output.section(section);
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{}:", section.title()));
        lines.extend(items.into_iter().map(|item| format!("- {item}")));
    }
    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    infer_command_name(std::env::args().skip(1))
}

/// Command name (plus subcommand for command groups) from raw arguments.
pub fn infer_command_name(args: impl IntoIterator<Item = String>) -> String {
    let mut positionals = Vec::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        positionals.push(arg);
        if positionals.len() == 2 {
            break;
        }
    }

    let mut positionals = positionals.into_iter();
    let command = match positionals.next() {
        Some(cmd) => cmd,
        None => return "relnotes".to_string(),
    };

    match positionals.next() {
        Some(sub) if matches!(command.as_str(), "component" | "sprint" | "note") => {
            format!("{command} {sub}")
        }
        _ => command,
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        exit_codes::USER_ERROR => "user_error",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::NotInitialized(_) => vec!["relnotes init".to_string()],
        Error::SprintNotFound(_) => vec!["relnotes sprint list".to_string()],
        Error::NoteNotFound { sprint_id, .. } => {
            vec![format!("relnotes note list {sprint_id}")]
        }
        Error::ComponentSetNotFound(_) => vec!["relnotes component find".to_string()],
        Error::InvalidConfig(_) => vec!["fix .relnotes.toml then retry".to_string()],
        Error::LockFailed(_) => vec!["retry once other relnotes processes finish".to_string()],
        _ => Vec::new(),
    }
}
