//! Sprint and component-set persistence over a namespaced key/value store.
//!
//! # Layout
//!
//! ```text
//! componentSets            JSON list of ComponentSetInfo (last host scan)
//! last_component_set_id    selected component set id, "" for none
//! last_sprint_id           selected sprint id, "" for none
//! sprint_<id>              JSON Sprint, "" once deleted
//! ```
//!
//! Nothing here caches state between calls: every read goes back to the
//! store, and every payload is rebuilt from what the store holds right now.

use tracing::error;

use crate::error::Result;
use crate::host::HostDocument;
use crate::model::{ComponentSetInfo, ComponentSetsPayload, Identified, Sprint, SprintsPayload};
use crate::store::KeyValueStore;

pub const COMPONENT_SETS_KEY: &str = "componentSets";
pub const LAST_COMPONENT_SET_ID_KEY: &str = "last_component_set_id";
pub const LAST_SPRINT_ID_KEY: &str = "last_sprint_id";
pub const SPRINT_KEY_PREFIX: &str = "sprint_";

/// Store key of a sprint record.
pub fn sprint_key(id: &str) -> String {
    format!("{SPRINT_KEY_PREFIX}{id}")
}

/// Validate a selection pointer against the current items.
///
/// A pointer naming a missing item falls back to the first item, or `None`
/// when there are no items. Returns the pointer to expose and whether it
/// changed (and must be written back).
pub fn heal_selection<T: Identified>(items: &[T], pointer: Option<String>) -> (Option<String>, bool) {
    match pointer {
        Some(id) if !items.iter().any(|item| item.id() == id) => {
            (items.first().map(|item| item.id().to_string()), true)
        }
        other => (other, false),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Read/write access to sprint records and selection pointers.
pub struct SprintRepository<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    namespace: &'a str,
}

impl<'a, S: KeyValueStore + ?Sized> SprintRepository<'a, S> {
    pub fn new(store: &'a S, namespace: &'a str) -> Self {
        Self { store, namespace }
    }

    /// Every stored sprint, in key-enumeration order.
    ///
    /// Records that fail to parse are logged and skipped.
    pub fn load_all(&self) -> Result<Vec<Sprint>> {
        let mut sprints = Vec::new();
        for key in self.store.keys(self.namespace)? {
            if !key.starts_with(SPRINT_KEY_PREFIX) {
                continue;
            }
            let Some(data) = non_empty(self.store.get(self.namespace, &key)?) else {
                continue;
            };
            match serde_json::from_str::<Sprint>(&data) {
                Ok(sprint) => sprints.push(sprint),
                Err(err) => {
                    error!(key = %key, error = %err, "skipping malformed sprint record");
                }
            }
        }
        Ok(sprints)
    }

    pub fn find(&self, id: &str) -> Result<Option<Sprint>> {
        Ok(self.load_all()?.into_iter().find(|sprint| sprint.id == id))
    }

    pub fn save(&self, sprint: &Sprint) -> Result<()> {
        let json = serde_json::to_string(sprint)?;
        self.store.set(self.namespace, &sprint_key(&sprint.id), &json)
    }

    /// Logical delete: the key stays, its value becomes empty.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.set(self.namespace, &sprint_key(id), "")
    }

    /// Whether a live record exists under the sprint's key, parseable or not.
    pub fn has_record(&self, id: &str) -> Result<bool> {
        Ok(non_empty(self.store.get(self.namespace, &sprint_key(id))?).is_some())
    }

    /// Delete every stored sprint record and write `sprints` in their place.
    ///
    /// Records that no longer parse are cleared as well.
    pub fn replace_all(&self, sprints: &[Sprint]) -> Result<()> {
        for key in self.store.keys(self.namespace)? {
            if !key.starts_with(SPRINT_KEY_PREFIX) {
                continue;
            }
            if non_empty(self.store.get(self.namespace, &key)?).is_some() {
                self.store.set(self.namespace, &key, "")?;
            }
        }
        for sprint in sprints {
            self.save(sprint)?;
        }
        Ok(())
    }

    pub fn last_selected(&self) -> Result<Option<String>> {
        Ok(non_empty(self.store.get(self.namespace, LAST_SPRINT_ID_KEY)?))
    }

    pub fn select(&self, id: Option<&str>) -> Result<()> {
        self.store
            .set(self.namespace, LAST_SPRINT_ID_KEY, id.unwrap_or_default())
    }

    /// Current sprints plus a selection pointer that is guaranteed valid.
    pub fn payload(&self) -> Result<SprintsPayload> {
        let sprints = self.load_all()?;
        let (last_selected_sprint_id, healed) = heal_selection(&sprints, self.last_selected()?);
        if healed {
            self.select(last_selected_sprint_id.as_deref())?;
        }
        Ok(SprintsPayload {
            sprints,
            last_selected_sprint_id,
        })
    }
}

/// Cached catalog of the host's component sets.
pub struct ComponentSetCatalog<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    namespace: &'a str,
}

impl<'a, S: KeyValueStore + ?Sized> ComponentSetCatalog<'a, S> {
    pub fn new(store: &'a S, namespace: &'a str) -> Self {
        Self { store, namespace }
    }

    /// Scan the host for component sets, cache the result, return the payload.
    pub fn find<D: HostDocument + ?Sized>(&self, document: &D) -> Result<ComponentSetsPayload> {
        let component_sets = document.component_sets();
        let json = serde_json::to_string(&component_sets)?;
        self.store.set(self.namespace, COMPONENT_SETS_KEY, &json)?;
        self.payload(component_sets)
    }

    /// Payload built from the last cached scan.
    pub fn load(&self) -> Result<ComponentSetsPayload> {
        let component_sets = self.cached()?;
        self.payload(component_sets)
    }

    /// The last cached scan; a corrupted cache reads as empty.
    pub fn cached(&self) -> Result<Vec<ComponentSetInfo>> {
        let Some(data) = non_empty(self.store.get(self.namespace, COMPONENT_SETS_KEY)?) else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&data) {
            Ok(component_sets) => Ok(component_sets),
            Err(err) => {
                error!(error = %err, "failed to parse cached component sets");
                Ok(Vec::new())
            }
        }
    }

    pub fn last_selected(&self) -> Result<Option<String>> {
        Ok(non_empty(
            self.store.get(self.namespace, LAST_COMPONENT_SET_ID_KEY)?,
        ))
    }

    pub fn select(&self, id: Option<&str>) -> Result<()> {
        self.store
            .set(self.namespace, LAST_COMPONENT_SET_ID_KEY, id.unwrap_or_default())
    }

    fn payload(&self, component_sets: Vec<ComponentSetInfo>) -> Result<ComponentSetsPayload> {
        let (last_selected_component_set_id, healed) =
            heal_selection(&component_sets, self.last_selected()?);
        if healed {
            self.select(last_selected_component_set_id.as_deref())?;
        }
        Ok(ComponentSetsPayload {
            component_sets,
            last_selected_component_set_id,
        })
    }
}
