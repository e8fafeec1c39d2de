//! Export and import of the full sprint set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{NoteTimestamp, Sprint};
use crate::repository::SprintRepository;
use crate::store::KeyValueStore;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub version: String,
    pub exported_at: NoteTimestamp,
    pub sprints: Vec<Sprint>,
}

/// Result of an import, as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
}

impl ImportResult {
    fn failed(err: &Error) -> Self {
        let message = match err {
            Error::InvalidImport(reason) => reason.clone(),
            other => other.to_string(),
        };
        Self {
            success: false,
            message,
        }
    }
}

/// Snapshot every stored sprint.
pub fn export<S: KeyValueStore + ?Sized>(
    repository: &SprintRepository<'_, S>,
    at: &DateTime<Utc>,
) -> Result<ExportData> {
    Ok(ExportData {
        version: EXPORT_VERSION.to_string(),
        exported_at: NoteTimestamp::from_datetime(at),
        sprints: repository.load_all()?,
    })
}

/// Check an import document without touching any store.
///
/// `sprints` must be present and an array, and every element must be a
/// valid sprint. Other fields are not checked.
pub fn validate_import(data: &Value) -> Result<Vec<Sprint>> {
    let sprints = data
        .get("sprints")
        .ok_or_else(|| Error::InvalidImport("missing sprints".to_string()))?;
    let items = sprints
        .as_array()
        .ok_or_else(|| Error::InvalidImport("sprints must be an array".to_string()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            Sprint::deserialize(item)
                .map_err(|err| Error::InvalidImport(format!("sprint at index {index}: {err}")))
        })
        .collect()
}

/// Replace every stored sprint with the ones in `data`.
///
/// Invalid input leaves the store untouched and reports `success: false`.
/// Store failures during the replacement are returned as errors.
pub fn import<S: KeyValueStore + ?Sized>(
    repository: &SprintRepository<'_, S>,
    data: &Value,
) -> Result<ImportResult> {
    let sprints = match validate_import(data) {
        Ok(sprints) => sprints,
        Err(err) => return Ok(ImportResult::failed(&err)),
    };
    repository.replace_all(&sprints)?;
    Ok(ImportResult {
        success: true,
        message: format!("Imported {} sprint(s)", sprints.len()),
    })
}

/// Default export file name for a day.
pub fn backup_file_name(at: &DateTime<Utc>) -> String {
    format!("release-notes-backup-{}.json", at.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    const NS: &str = "ns";

    #[test]
    fn export_stamps_version_and_time() {
        let store = MemoryStore::new();
        let repo = SprintRepository::new(&store, NS);
        repo.save(&Sprint::new("1", "v1")).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

        let data = export(&repo, &at).unwrap();
        assert_eq!(data.version, "1.0");
        assert_eq!(data.exported_at.as_str(), "2024-05-06T07:08:09.000Z");
        assert_eq!(data.sprints.len(), 1);

        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("exportedAt").is_some());
    }

    #[test]
    fn invalid_imports_leave_store_untouched() {
        let store = MemoryStore::new();
        let repo = SprintRepository::new(&store, NS);
        repo.save(&Sprint::new("1", "keep")).unwrap();
        let before = store.snapshot(NS).unwrap();

        for bad in [
            json!({}),
            json!({ "sprints": "nope" }),
            json!({ "sprints": [{ "id": "2", "name": "ok" }, { "id": 3 }] }),
        ] {
            let result = import(&repo, &bad).unwrap();
            assert!(!result.success, "{bad} should be rejected");
        }
        assert_eq!(store.snapshot(NS).unwrap(), before);
    }

    #[test]
    fn import_replaces_all_sprints() {
        let store = MemoryStore::new();
        let repo = SprintRepository::new(&store, NS);
        repo.save(&Sprint::new("1", "old")).unwrap();

        let result = import(
            &repo,
            &json!({ "version": "1.0", "sprints": [{ "id": "7", "name": "new", "notes": [] }] }),
        )
        .unwrap();
        assert!(result.success);
        let ids: Vec<_> = repo.load_all().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["7"]);
    }

    #[test]
    fn import_clears_unreadable_sprint_records() {
        let store = MemoryStore::new();
        let repo = SprintRepository::new(&store, NS);
        repo.save(&Sprint::new("1", "old")).unwrap();
        let future = r#"{"id":"2","name":"future","notes":[{"id":"n","tag":"security"}]}"#;
        store.set(NS, "sprint_2", future).unwrap();

        let result = import(
            &repo,
            &json!({ "version": "1.0", "sprints": [{ "id": "7", "name": "new", "notes": [] }] }),
        )
        .unwrap();
        assert!(result.success);
        assert_eq!(store.get(NS, "sprint_1").unwrap().as_deref(), Some(""));
        assert_eq!(store.get(NS, "sprint_2").unwrap().as_deref(), Some(""));
        let ids: Vec<_> = repo.load_all().unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["7"]);
    }

    #[test]
    fn backup_name_uses_calendar_day() {
        let at = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
        assert_eq!(backup_file_name(&at), "release-notes-backup-2024-12-31.json");
    }
}
