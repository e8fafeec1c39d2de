mod support;

use serde_json::Value;

use support::TestWorkspace;

fn nodes_named<'a>(document: &'a Value, name: &str) -> Vec<&'a Value> {
    document["nodes"]
        .as_object()
        .expect("nodes")
        .values()
        .filter(|node| node["name"] == name)
        .collect()
}

#[test]
fn sprint_lifecycle_heals_selection() {
    let ws = TestWorkspace::initialized();
    let first = ws.create_sprint("Sprint 1");
    let second = ws.create_sprint("Sprint 2");
    assert!(second.parse::<u64>().unwrap() > first.parse::<u64>().unwrap());

    let listed = ws.json(&["sprint", "list"]);
    assert_eq!(listed["sprints"].as_array().unwrap().len(), 2);
    assert_eq!(listed["lastSelectedSprintId"], second.as_str());

    let renamed = ws.json(&["sprint", "rename", &first, "  Sprint One  "]);
    let names: Vec<_> = renamed["sprints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&"Sprint One".to_string()));

    let after_delete = ws.json(&["sprint", "delete", &second]);
    assert_eq!(after_delete["sprints"].as_array().unwrap().len(), 1);
    assert_eq!(after_delete["lastSelectedSprintId"], first.as_str());

    ws.json(&["sprint", "select"]);
    let cleared = ws.json(&["sprint", "list"]);
    assert_eq!(cleared["lastSelectedSprintId"], Value::Null);
}

#[test]
fn sprint_delete_clears_unreadable_record() {
    let ws = TestWorkspace::initialized();
    let store = ws.state_dir().join("store.json");
    std::fs::write(&store, r#"{"tidy_release_notes":{"sprint_9":"{broken"}}"#).unwrap();

    let after = ws.json(&["sprint", "delete", "9"]);
    assert_eq!(after["sprints"].as_array().unwrap().len(), 0);

    let raw: Value = serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(raw["tidy_release_notes"]["sprint_9"], "");
}

#[test]
fn unknown_ids_are_user_errors() {
    let ws = TestWorkspace::initialized();
    let sprint = ws.create_sprint("v1");

    let (code, envelope) = ws.json_err(&["sprint", "delete", "404"]);
    assert_eq!(code, 2);
    assert_eq!(envelope["error"]["kind"], "user_error");
    assert_eq!(envelope["command"], "sprint delete");

    let (code, _) = ws.json_err(&["note", "delete", &sprint, "404"]);
    assert_eq!(code, 2);

    let (code, _) = ws.json_err(&["note", "add", &sprint, "--component", "9:9", "--tag", "bug_fix", "x"]);
    assert_eq!(code, 2);

    let (code, envelope) = ws.json_err(&["sprint", "create", "   "]);
    assert_eq!(code, 2);
    assert!(envelope["error"]["message"].as_str().unwrap().contains("empty"));
}

#[test]
fn notes_are_added_edited_and_deleted() {
    let ws = TestWorkspace::initialized();
    let button = ws.add_component("Button", 0.0, 0.0);
    let sprint = ws.create_sprint("v1");

    let note = ws.add_note(&sprint, &button, "bug_fix", "Fixed focus ring");
    let listed = ws.json(&["note", "list", &sprint]);
    let notes = listed["sprint"]["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["componentSetName"], "Button");
    assert_eq!(notes[0]["authorName"], "Unknown User");

    let edited = ws.json(&["note", "edit", &sprint, &note, "--tag", "enhancement"]);
    assert_eq!(edited["note"]["tag"], "enhancement");
    assert_eq!(edited["note"]["description"], "Fixed focus ring");

    let (code, _) = ws.json_err(&["note", "edit", &sprint, &note, "--tag", "feature"]);
    assert_eq!(code, 2);

    ws.json(&["note", "delete", &sprint, &note]);
    let listed = ws.json(&["note", "list", &sprint]);
    assert!(listed["sprint"]["notes"].as_array().unwrap().is_empty());
}

#[test]
fn component_catalog_is_cached_until_rescan() {
    let ws = TestWorkspace::initialized();
    let listed = ws.json(&["component", "list"]);
    assert!(listed["componentSets"].as_array().unwrap().is_empty());

    let button = ws.add_component("Button", 0.0, 0.0);
    assert!(ws.json(&["component", "list"])["componentSets"]
        .as_array()
        .unwrap()
        .is_empty());

    let found = ws.json(&["component", "find"]);
    assert_eq!(found["componentSets"][0]["id"], button.as_str());

    ws.json(&["component", "select", &button]);
    let listed = ws.json(&["component", "list"]);
    assert_eq!(listed["lastSelectedComponentSetId"], button.as_str());

    let viewed = ws.json(&["component", "view", &button]);
    assert!(viewed["page_id"].is_string());
}

#[test]
fn publish_writes_tables_and_component_artifacts() {
    let ws = TestWorkspace::initialized();
    let button = ws.add_component("Button", 1000.0, 200.0);
    let sprint = ws.create_sprint("v1");
    ws.add_note(&sprint, &button, "new_component", "Added Button");

    let outcome = ws.json(&["publish", &sprint]);
    assert_eq!(outcome["status"], "published");
    assert_eq!(outcome["components"].as_array().unwrap().len(), 1);

    ws.json(&["publish", &sprint]);
    let document = ws.document();
    assert_eq!(nodes_named(&document, "Changelog – v1").len(), 2);
    let artifacts = nodes_named(&document, "Button-release-notes");
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0]["x"], 340.0);
    assert_eq!(artifacts[0]["y"], 200.0);

    let cleared = ws.json(&["clear"]);
    assert_eq!(cleared["removed"], 3);
    let document = ws.document();
    assert!(nodes_named(&document, "Changelog – v1").is_empty());
    assert_eq!(nodes_named(&document, "release-notes-frame").len(), 1);

    let listed = ws.json(&["note", "list", &sprint]);
    assert_eq!(listed["sprint"]["notes"].as_array().unwrap().len(), 1);
}

#[test]
fn publish_of_empty_sprint_is_noop() {
    let ws = TestWorkspace::initialized();
    let sprint = ws.create_sprint("empty");
    let before = ws.document();

    let outcome = ws.json(&["publish", &sprint]);
    assert_eq!(outcome["status"], "no_op");
    assert_eq!(ws.document(), before);
}

#[test]
fn render_prints_tree_without_touching_document() {
    let ws = TestWorkspace::initialized();
    let button = ws.add_component("Button", 0.0, 0.0);
    let sprint = ws.create_sprint("v2");
    ws.add_note(&sprint, &button, "deprecation", "Deprecated ghost variant");
    let before = ws.document();

    let tree = ws.json(&["render", &sprint]);
    assert_eq!(tree["type"], "container");
    assert_eq!(tree["name"], "Changelog – v2");
    assert_eq!(ws.document(), before);

    ws.cmd()
        .args(["render", &sprint])
        .assert()
        .success()
        .stdout(predicates::str::contains("Deprecated ghost variant"));
}

#[test]
fn export_then_import_restores_sprints() {
    let ws = TestWorkspace::initialized();
    let button = ws.add_component("Button", 0.0, 0.0);
    let sprint = ws.create_sprint("v1");
    ws.add_note(&sprint, &button, "bug_fix", "Fixed hover");

    let backup = ws.path().join("backup.json");
    let exported = ws.json(&["export", "--out", backup.to_str().unwrap()]);
    assert_eq!(exported["sprints"], 1);
    let data: Value = serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(data["version"], "1.0");

    ws.json(&["sprint", "delete", &sprint]);
    ws.create_sprint("scratch");

    let imported = ws.json(&["import", backup.to_str().unwrap()]);
    assert_eq!(imported["success"], true);
    let listed = ws.json(&["sprint", "list"]);
    let sprints = listed["sprints"].as_array().unwrap();
    assert_eq!(sprints.len(), 1);
    assert_eq!(sprints[0]["id"], sprint.as_str());
    assert_eq!(sprints[0]["notes"].as_array().unwrap().len(), 1);
}

#[test]
fn export_defaults_to_dated_backup_file() {
    let ws = TestWorkspace::initialized();
    let exported = ws.json(&["export"]);
    let path = exported["path"].as_str().unwrap();
    assert!(path.contains("release-notes-backup-"));
    assert!(std::path::Path::new(path).exists());
}

#[test]
fn invalid_import_leaves_sprints_untouched() {
    let ws = TestWorkspace::initialized();
    let sprint = ws.create_sprint("keep");

    let bad = ws.path().join("bad.json");
    std::fs::write(&bad, r#"{"sprints": [{"id": 1}]}"#).unwrap();
    let (code, envelope) = ws.json_err(&["import", bad.to_str().unwrap()]);
    assert_eq!(code, 2);
    assert!(envelope["error"]["message"]
        .as_str()
        .unwrap()
        .contains("index 0"));

    let listed = ws.json(&["sprint", "list"]);
    assert_eq!(listed["sprints"][0]["id"], sprint.as_str());
}
