//! Sprint and release-note records.
//!
//! Field names follow the camelCase wire format the records are stored and
//! exchanged in, so a stored sprint is readable by any client of the same
//! namespace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reference to a component set living in the host document.
///
/// `id` is the host's node id; this crate never owns the component set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSetInfo {
    pub id: String,
    pub name: String,
}

/// Kind of change a note records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteTag {
    BugFix,
    Enhancement,
    NewComponent,
    Deprecation,
    Deleted,
}

impl NoteTag {
    pub const ALL: [NoteTag; 5] = [
        NoteTag::BugFix,
        NoteTag::Enhancement,
        NoteTag::NewComponent,
        NoteTag::Deprecation,
        NoteTag::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BugFix => "bug_fix",
            Self::Enhancement => "enhancement",
            Self::NewComponent => "new_component",
            Self::Deprecation => "deprecation",
            Self::Deleted => "deleted",
        }
    }

    /// Badge label shown in published changelogs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NewComponent => "Added",
            Self::Enhancement => "Changed",
            Self::BugFix => "Fixed",
            Self::Deprecation => "Deprecated",
            Self::Deleted => "Deleted",
        }
    }

    /// Badge emoji shown next to the label.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::NewComponent => "✅",
            Self::Enhancement => "🎾",
            Self::BugFix => "🔨",
            Self::Deprecation => "📦",
            Self::Deleted => "🗑️",
        }
    }
}

impl fmt::Display for NoteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NoteTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s.trim())
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown tag '{s}' (expected bug_fix|enhancement|new_component|deprecation|deleted)"
                ))
            })
    }
}

/// ISO-8601 creation instant, kept as the literal string it was written with.
///
/// Ordering uses the parsed instant; grouping and display use the literal
/// date portion, so a note written at `2024-01-02T23:30:00-05:00` belongs to
/// January 2nd no matter where it is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteTimestamp(String);

impl NoteTimestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_datetime(at: &DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parsed instant, or `None` if the string is not RFC 3339.
    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.0).ok()
    }

    /// Text before the `T` separator.
    pub fn date_part(&self) -> &str {
        self.0.split('T').next().unwrap_or_default()
    }

    /// Calendar date of [`Self::date_part`], if it is a valid date.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date_part(), "%Y-%m-%d").ok()
    }
}

impl fmt::Display for NoteTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single change entry, owned by exactly one sprint.
///
/// `component_set_name` and `author_name` are captured when the note is
/// written and are never re-synced with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNote {
    pub id: String,
    pub description: String,
    pub tag: NoteTag,
    pub component_set_id: String,
    pub component_set_name: String,
    pub created_at: NoteTimestamp,
    pub author_id: String,
    pub author_name: String,
}

/// Named bucket of notes; the unit of persistence and of publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    /// Creation time in epoch milliseconds, as a string
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub notes: Vec<ReleaseNote>,
}

impl Sprint {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            notes: Vec::new(),
        }
    }

    pub fn note(&self, note_id: &str) -> Option<&ReleaseNote> {
        self.notes.iter().find(|note| note.id == note_id)
    }

    pub fn note_mut(&mut self, note_id: &str) -> Option<&mut ReleaseNote> {
        self.notes.iter_mut().find(|note| note.id == note_id)
    }

    /// Whether any note in this sprint targets `component_set_id`.
    pub fn touches(&self, component_set_id: &str) -> bool {
        self.notes
            .iter()
            .any(|note| note.component_set_id == component_set_id)
    }

    /// Notes targeting `component_set_id`, in stored order.
    pub fn notes_for(&self, component_set_id: &str) -> Vec<ReleaseNote> {
        self.notes
            .iter()
            .filter(|note| note.component_set_id == component_set_id)
            .cloned()
            .collect()
    }

    /// Distinct component set ids referenced by the notes, first-seen order.
    pub fn component_set_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for note in &self.notes {
            if !ids.contains(&note.component_set_id) {
                ids.push(note.component_set_id.clone());
            }
        }
        ids
    }

    /// Numeric value of the id, when it is one.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

/// Anything a "last selected" pointer can refer to.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Sprint {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for ComponentSetInfo {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Sprint list as observed by a client, with a valid selection pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintsPayload {
    pub sprints: Vec<Sprint>,
    pub last_selected_sprint_id: Option<String>,
}

/// Component set catalog as observed by a client, with a valid selection pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSetsPayload {
    pub component_sets: Vec<ComponentSetInfo>,
    pub last_selected_component_set_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSprintPayload {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNotePayload {
    pub sprint_id: String,
    pub description: String,
    pub tag: NoteTag,
    pub component_set_id: String,
    pub component_set_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditNotePayload {
    pub sprint_id: String,
    pub note_id: String,
    pub description: String,
    pub tag: NoteTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNotePayload {
    pub sprint_id: String,
    pub note_id: String,
}

/// Who is writing a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
}
