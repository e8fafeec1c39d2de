//! Command messages and the core that handles them.
//!
//! Messages are adjacently tagged JSON:
//!
//! ```json
//! {"type": "CREATE_SPRINT", "payload": "Sprint 12"}
//! {"type": "SPRINTS_UPDATED", "payload": {"sprints": [], "lastSelectedSprintId": null}}
//! ```
//!
//! [`Core`] owns everything a command can touch and takes `&mut self` per
//! command, so commands never interleave. State is re-read from the store
//! at the start of every command.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::clock::{Clock, IdSource};
use crate::config::Config;
use crate::error::Result;
use crate::host::{find_ancestor, resolve_node, HostDocument, NodeKind, ResolvedNode, ResourceLoader};
use crate::model::{
    AddNotePayload, Author, ComponentSetsPayload, DeleteNotePayload, EditNotePayload,
    NoteTimestamp, ReleaseNote, RenameSprintPayload, Sprint, SprintsPayload,
};
use crate::publish::{PublishOutcome, Publisher};
use crate::repository::{ComponentSetCatalog, SprintRepository};
use crate::store::KeyValueStore;
use crate::transfer::{self, ExportData, ImportResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    FindComponentSets,
    LoadComponentSets,
    SelectComponentSet(Option<String>),
    LoadSprints,
    CreateSprint(String),
    RenameSprint(RenameSprintPayload),
    DeleteSprint(String),
    SelectSprint(Option<String>),
    AddNote(AddNotePayload),
    EditNote(EditNotePayload),
    DeleteNote(DeleteNotePayload),
    PublishSprintReleaseNotes(String),
    ViewComponentSet(String),
    ExportReleaseNotes,
    ImportReleaseNotes(Value),
    ClearReleaseNotesFromCanvas,
}

impl Command {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::FindComponentSets => "FIND_COMPONENT_SETS",
            Command::LoadComponentSets => "LOAD_COMPONENT_SETS",
            Command::SelectComponentSet(_) => "SELECT_COMPONENT_SET",
            Command::LoadSprints => "LOAD_SPRINTS",
            Command::CreateSprint(_) => "CREATE_SPRINT",
            Command::RenameSprint(_) => "RENAME_SPRINT",
            Command::DeleteSprint(_) => "DELETE_SPRINT",
            Command::SelectSprint(_) => "SELECT_SPRINT",
            Command::AddNote(_) => "ADD_NOTE",
            Command::EditNote(_) => "EDIT_NOTE",
            Command::DeleteNote(_) => "DELETE_NOTE",
            Command::PublishSprintReleaseNotes(_) => "PUBLISH_SPRINT_RELEASE_NOTES",
            Command::ViewComponentSet(_) => "VIEW_COMPONENT_SET",
            Command::ExportReleaseNotes => "EXPORT_RELEASE_NOTES",
            Command::ImportReleaseNotes(_) => "IMPORT_RELEASE_NOTES",
            Command::ClearReleaseNotesFromCanvas => "CLEAR_RELEASE_NOTES_FROM_CANVAS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearedPayload {
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    ComponentSetsFound(ComponentSetsPayload),
    ComponentSetsLoaded(ComponentSetsPayload),
    SprintsLoaded(SprintsPayload),
    SprintsUpdated(SprintsPayload),
    SprintReleaseNotesPublished(PublishOutcome),
    ReleaseNotesExported(ExportData),
    ReleaseNotesImported(ImportResult),
    ReleaseNotesFromCanvasCleared(ClearedPayload),
}

/// Command handler owning the store, the host document and its services.
pub struct Core<S, D, L, C> {
    store: S,
    document: D,
    loader: L,
    clock: C,
    config: Config,
    ids: IdSource,
}

impl<S, D, L, C> Core<S, D, L, C>
where
    S: KeyValueStore,
    D: HostDocument,
    L: ResourceLoader,
    C: Clock,
{
    pub fn new(store: S, document: D, loader: L, clock: C, config: Config) -> Self {
        Self {
            store,
            document,
            loader,
            clock,
            config,
            ids: IdSource::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    fn sprints(&self) -> SprintRepository<'_, S> {
        SprintRepository::new(&self.store, &self.config.store.namespace)
    }

    fn catalog(&self) -> ComponentSetCatalog<'_, S> {
        ComponentSetCatalog::new(&self.store, &self.config.store.namespace)
    }

    /// Handle one command; returns the paired response, if the command has one.
    pub async fn dispatch(&mut self, command: Command) -> Result<Option<Response>> {
        debug!(command = command.name(), "dispatch");
        let response = match command {
            Command::FindComponentSets => Some(Response::ComponentSetsFound(self.find_component_sets()?)),
            Command::LoadComponentSets => Some(Response::ComponentSetsLoaded(self.load_component_sets()?)),
            Command::SelectComponentSet(id) => {
                self.select_component_set(id.as_deref())?;
                None
            }
            Command::LoadSprints => Some(Response::SprintsLoaded(self.load_sprints()?)),
            Command::CreateSprint(name) => Some(Response::SprintsUpdated(self.create_sprint(&name)?)),
            Command::RenameSprint(payload) => Some(Response::SprintsUpdated(self.rename_sprint(&payload)?)),
            Command::DeleteSprint(id) => Some(Response::SprintsUpdated(self.delete_sprint(&id)?)),
            Command::SelectSprint(id) => {
                self.select_sprint(id.as_deref())?;
                None
            }
            Command::AddNote(payload) => Some(Response::SprintsUpdated(self.add_note(&payload)?)),
            Command::EditNote(payload) => Some(Response::SprintsUpdated(self.edit_note(&payload)?)),
            Command::DeleteNote(payload) => Some(Response::SprintsUpdated(self.delete_note(&payload)?)),
            Command::PublishSprintReleaseNotes(sprint_id) => Some(
                Response::SprintReleaseNotesPublished(self.publish(&sprint_id).await?),
            ),
            Command::ViewComponentSet(id) => {
                self.view_component_set(&id)?;
                None
            }
            Command::ExportReleaseNotes => Some(Response::ReleaseNotesExported(self.export()?)),
            Command::ImportReleaseNotes(data) => Some(Response::ReleaseNotesImported(self.import(&data)?)),
            Command::ClearReleaseNotesFromCanvas => Some(Response::ReleaseNotesFromCanvasCleared(
                ClearedPayload {
                    removed: self.clear_from_canvas()?,
                },
            )),
        };
        Ok(response)
    }

    // =========================================================================
    // Component sets
    // =========================================================================

    pub fn find_component_sets(&self) -> Result<ComponentSetsPayload> {
        self.catalog().find(&self.document)
    }

    pub fn load_component_sets(&self) -> Result<ComponentSetsPayload> {
        self.catalog().load()
    }

    pub fn select_component_set(&self, id: Option<&str>) -> Result<()> {
        self.catalog().select(id)
    }

    /// Switch to the component set's page and bring it into view.
    ///
    /// Returns `false` when the id does not name a component set on a page.
    pub fn view_component_set(&mut self, id: &str) -> Result<bool> {
        let Some(ResolvedNode::ComponentSet(info)) = resolve_node(&self.document, id) else {
            debug!(id, "view skipped: not a component set");
            return Ok(false);
        };
        let Some(page) = find_ancestor(&self.document, &info.id, NodeKind::Page) else {
            debug!(id, "view skipped: component set has no page");
            return Ok(false);
        };
        self.document.set_current_page(&page.id)?;
        self.document.scroll_into_view(&[info.id])?;
        Ok(true)
    }

    // =========================================================================
    // Sprints
    // =========================================================================

    pub fn load_sprints(&self) -> Result<SprintsPayload> {
        self.sprints().payload()
    }

    pub fn find_sprint(&self, id: &str) -> Result<Option<Sprint>> {
        self.sprints().find(id)
    }

    /// Whether a sprint record is stored under `id`, readable or not.
    pub fn has_sprint_record(&self, id: &str) -> Result<bool> {
        self.sprints().has_record(id)
    }

    /// Store an empty sprint and select it.
    pub fn create_sprint(&mut self, name: &str) -> Result<SprintsPayload> {
        let name = name.trim();
        if name.is_empty() {
            debug!("create skipped: blank sprint name");
            return self.load_sprints();
        }
        let existing = self.sprints().load_all()?;
        let id = self
            .ids
            .next(&self.clock.now(), |candidate| existing.iter().any(|s| s.id == candidate));
        let repo = self.sprints();
        repo.save(&Sprint::new(id.clone(), name))?;
        repo.select(Some(&id))?;
        repo.payload()
    }

    pub fn rename_sprint(&self, payload: &RenameSprintPayload) -> Result<SprintsPayload> {
        let repo = self.sprints();
        let name = payload.name.trim();
        if name.is_empty() {
            debug!(id = %payload.id, "rename skipped: blank sprint name");
            return repo.payload();
        }
        match repo.find(&payload.id)? {
            Some(mut sprint) => {
                sprint.name = name.to_string();
                repo.save(&sprint)?;
            }
            None => debug!(id = %payload.id, "rename skipped: sprint not found"),
        }
        repo.payload()
    }

    /// Delete a sprint; a selection pointing at it heals on the next payload.
    pub fn delete_sprint(&self, id: &str) -> Result<SprintsPayload> {
        let repo = self.sprints();
        if repo.has_record(id)? {
            repo.delete(id)?;
        } else {
            debug!(id, "delete skipped: sprint not found");
        }
        repo.payload()
    }

    pub fn select_sprint(&self, id: Option<&str>) -> Result<()> {
        self.sprints().select(id)
    }

    // =========================================================================
    // Notes
    // =========================================================================

    fn author(&self) -> Author {
        self.document.current_user().unwrap_or_else(|| Author {
            id: self.config.author.id.clone(),
            name: self.config.author.name.clone(),
        })
    }

    pub fn add_note(&mut self, payload: &AddNotePayload) -> Result<SprintsPayload> {
        let Some(mut sprint) = self.sprints().find(&payload.sprint_id)? else {
            debug!(sprint_id = %payload.sprint_id, "add skipped: sprint not found");
            return self.load_sprints();
        };
        let now = self.clock.now();
        let id = self
            .ids
            .next(&now, |candidate| sprint.note(candidate).is_some());
        let author = self.author();
        sprint.notes.push(ReleaseNote {
            id,
            description: payload.description.clone(),
            tag: payload.tag,
            component_set_id: payload.component_set_id.clone(),
            component_set_name: payload.component_set_name.clone(),
            created_at: NoteTimestamp::from_datetime(&now),
            author_id: author.id,
            author_name: author.name,
        });
        let repo = self.sprints();
        repo.save(&sprint)?;
        repo.payload()
    }

    pub fn edit_note(&self, payload: &EditNotePayload) -> Result<SprintsPayload> {
        let repo = self.sprints();
        let Some(mut sprint) = repo.find(&payload.sprint_id)? else {
            debug!(sprint_id = %payload.sprint_id, "edit skipped: sprint not found");
            return repo.payload();
        };
        match sprint.note_mut(&payload.note_id) {
            Some(note) => {
                note.description = payload.description.clone();
                note.tag = payload.tag;
                repo.save(&sprint)?;
            }
            None => debug!(note_id = %payload.note_id, "edit skipped: note not found"),
        }
        repo.payload()
    }

    pub fn delete_note(&self, payload: &DeleteNotePayload) -> Result<SprintsPayload> {
        let repo = self.sprints();
        let Some(mut sprint) = repo.find(&payload.sprint_id)? else {
            debug!(sprint_id = %payload.sprint_id, "delete skipped: sprint not found");
            return repo.payload();
        };
        let before = sprint.notes.len();
        sprint.notes.retain(|note| note.id != payload.note_id);
        if sprint.notes.len() == before {
            debug!(note_id = %payload.note_id, "delete skipped: note not found");
        } else {
            repo.save(&sprint)?;
        }
        repo.payload()
    }

    // =========================================================================
    // Publishing and transfer
    // =========================================================================

    pub async fn publish(&mut self, sprint_id: &str) -> Result<PublishOutcome> {
        let sprints = self.sprints().load_all()?;
        Publisher::new(&mut self.document, &self.loader, &self.config.publish)
            .publish(sprint_id, &sprints)
            .await
    }

    pub fn clear_from_canvas(&mut self) -> Result<usize> {
        Publisher::new(&mut self.document, &self.loader, &self.config.publish).clear_from_canvas()
    }

    pub fn export(&self) -> Result<ExportData> {
        transfer::export(&self.sprints(), &self.clock.now())
    }

    pub fn import(&self, data: &Value) -> Result<ImportResult> {
        let result = transfer::import(&self.sprints(), data)?;
        if result.success {
            self.sprints().payload()?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::NoteTag;

    #[test]
    fn commands_use_adjacent_tagging() {
        let command: Command =
            serde_json::from_value(json!({ "type": "CREATE_SPRINT", "payload": "v1" })).unwrap();
        assert_eq!(command, Command::CreateSprint("v1".to_string()));

        let command: Command = serde_json::from_value(json!({ "type": "LOAD_SPRINTS" })).unwrap();
        assert_eq!(command, Command::LoadSprints);

        let command: Command =
            serde_json::from_value(json!({ "type": "SELECT_SPRINT", "payload": null })).unwrap();
        assert_eq!(command, Command::SelectSprint(None));

        let command: Command = serde_json::from_value(json!({
            "type": "EDIT_NOTE",
            "payload": { "sprintId": "1", "noteId": "2", "description": "d", "tag": "bug_fix" }
        }))
        .unwrap();
        assert_eq!(command.name(), "EDIT_NOTE");
        match command {
            Command::EditNote(payload) => assert_eq!(payload.tag, NoteTag::BugFix),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn clear_command_round_trips() {
        let json = serde_json::to_value(Command::ClearReleaseNotesFromCanvas).unwrap();
        assert_eq!(json["type"], "CLEAR_RELEASE_NOTES_FROM_CANVAS");
    }

    #[test]
    fn responses_serialize_with_payload() {
        let response = Response::SprintsUpdated(SprintsPayload {
            sprints: vec![Sprint::new("1", "v1")],
            last_selected_sprint_id: Some("1".to_string()),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "SPRINTS_UPDATED");
        assert_eq!(json["payload"]["lastSelectedSprintId"], "1");
    }
}
