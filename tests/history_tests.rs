//! Integration tests for the undo history and its persistence

mod common;
use common::*;

use segment_sequencer::{
    DesignerConfig, FileStore, HistoryStack, Project, ProjectDocument, Segment, SegmentName,
    Timestamp, UndoState,
};
use tempfile::TempDir;

fn text(s: &str) -> String {
    s.to_string()
}

#[test]
fn undo_redo_walks_a_linear_stack() {
    let mut history = HistoryStack::<String>::new();
    history.save(&text("A"));
    history.save(&text("B"));
    history.save(&text("C"));

    assert_eq!(history.undo(), Some(&text("B")));
    assert_eq!(history.undo(), Some(&text("A")));
    assert_eq!(history.undo(), None);
    assert_eq!(history.redo(), Some(&text("B")));

    history.save(&text("D"));
    assert_eq!(history.redo(), None);
    assert_eq!(history.len(), 3);
    assert_eq!(history.retrieve(), Some(&text("D")));
    assert_eq!(
        history.has_undo(),
        UndoState {
            can_undo: true,
            can_redo: false
        }
    );
}

#[test]
fn overwrite_replaces_without_adding_undo_step() {
    let mut history = HistoryStack::<String>::new();
    history.overwrite(&text("first"));
    assert_eq!(history.cursor(), Some(0));

    history.save(&text("A"));
    history.overwrite(&text("A selected"));
    assert_eq!(history.len(), 2);
    assert_eq!(history.undo(), Some(&text("first")));
    assert_eq!(history.redo(), Some(&text("A selected")));
}

#[test]
fn snapshots_do_not_follow_later_edits() {
    let mut project = new_project();
    let (seq, step) = current_ids(&project);
    let snapshot = project.history().retrieve().unwrap().clone();

    project
        .toggle_segment(seq, step, Segment::digit(9, SegmentName::G))
        .unwrap();
    project.rename_sequence(seq, "Changed").unwrap();

    project.undo(Timestamp(0));
    project.undo(Timestamp(0));
    assert_eq!(project.history().retrieve(), Some(&snapshot));
    assert_eq!(project.sequence(seq).unwrap().name(), "Sequence 1");
}

#[test]
fn persisted_history_survives_restart() {
    init_logging();
    let store = SharedStore::new();
    let config = DesignerConfig::default();

    let exported = {
        let history = HistoryStack::persistent(Box::new(store.clone()), &config.history_key);
        let mut project = Project::with_history(config.clone(), history);
        let (seq, _) = current_ids(&project);
        project.rename_sequence(seq, "Saved").unwrap();
        project.add_sequence();
        project.undo(Timestamp(0));
        project.export_json()
    };
    assert!(store.raw("history").is_some());

    let history = HistoryStack::persistent(Box::new(store.clone()), &config.history_key);
    let mut project = Project::with_history(config, history);
    assert_eq!(project.export_json(), exported);
    assert_eq!(project.sequences()[0].name(), "Saved");
    assert_eq!(
        project.has_undo(),
        UndoState {
            can_undo: true,
            can_redo: true
        }
    );

    assert!(project.redo(Timestamp(0)));
    assert_eq!(project.sequences().len(), 2);
}

#[test]
fn restored_history_never_reuses_indices() {
    init_logging();
    let store = SharedStore::new();
    let config = DesignerConfig::default();

    let highest = {
        let history = HistoryStack::persistent(Box::new(store.clone()), &config.history_key);
        let mut project = Project::with_history(config.clone(), history);
        project.add_sequence();
        project.add_sequence();
        project.undo(Timestamp(0));
        project.undo(Timestamp(0));
        // The undone sequences only exist in the redo branch
        assert_eq!(project.history().len(), 3);
        all_indices(&project).into_iter().max().unwrap()
    };
    assert_eq!(highest, 1);

    let history = HistoryStack::persistent(Box::new(store), &config.history_key);
    let mut project = Project::with_history(config, history);
    assert!(project.redo(Timestamp(0)));
    assert!(project.redo(Timestamp(0)));
    let restored = all_indices(&project);

    let fresh = project.add_sequence();
    assert!(!restored.contains(&fresh.0));
}

#[test]
fn corrupt_storage_starts_blank() {
    init_logging();
    let store = SharedStore::new();
    store.put_raw("history", "{not json");

    let history = HistoryStack::<ProjectDocument>::persistent(Box::new(store.clone()), "history");
    assert!(history.is_empty());

    let project = Project::with_history(DesignerConfig::default(), history);
    assert_eq!(project.sequences().len(), 1);
    assert_eq!(project.history().len(), 1);
    assert_ne!(store.raw("history").as_deref(), Some("{not json"));
}

#[test]
fn inconsistent_cursor_is_discarded() {
    init_logging();
    let store = SharedStore::new();
    store.put_raw("history", r#"{"stack": ["A"], "cursor": 4}"#);

    let history = HistoryStack::<String>::persistent(Box::new(store), "history");
    assert!(history.is_empty());
    assert_eq!(history.cursor(), None);
}

#[test]
fn failed_writes_do_not_stop_editing() {
    init_logging();
    let store = SharedStore::new();
    let history = HistoryStack::persistent(Box::new(store.clone()), "history");
    let mut project = Project::with_history(DesignerConfig::default(), history);
    let stored = store.raw("history");

    store.fail_writes();
    project.add_sequence();
    assert_eq!(project.sequences().len(), 2);
    assert_eq!(project.history().len(), 2);
    assert_eq!(store.raw("history"), stored);
}

#[test]
fn file_store_keeps_history_on_disk() {
    init_logging();
    let dir = TempDir::new().unwrap();

    {
        let mut history =
            HistoryStack::persistent(Box::new(FileStore::new(dir.path())), "history");
        history.save(&text("one"));
        history.save(&text("two"));
        history.undo();
    }

    let mut history =
        HistoryStack::<String>::persistent(Box::new(FileStore::new(dir.path())), "history");
    assert_eq!(history.retrieve(), Some(&text("one")));
    assert_eq!(history.redo(), Some(&text("two")));
    assert!(dir.path().join("history.json").is_file());
}

#[test]
fn rejected_snapshot_leaves_the_cursor_in_place() {
    init_logging();
    let good = new_project().get_state();
    let mut bad = good.clone();
    bad.sequences[0].steps[0].duration = 0;
    let raw = serde_json::json!({"stack": [bad, good], "cursor": 1}).to_string();

    let store = SharedStore::new();
    store.put_raw("history", &raw);
    let history = HistoryStack::persistent(Box::new(store.clone()), "history");
    let mut project = Project::with_history(DesignerConfig::default(), history);
    assert_eq!(project.get_state().sequences, good.sequences);

    assert!(!project.undo(Timestamp(0)));
    assert_eq!(project.history().cursor(), Some(1));
    assert_eq!(
        project.has_undo(),
        UndoState {
            can_undo: true,
            can_redo: false
        }
    );
    assert_eq!(project.get_state().sequences, good.sequences);
    assert_eq!(store.raw("history").as_deref(), Some(raw.as_str()));
}

#[test]
fn rejected_redo_target_keeps_the_current_snapshot() {
    init_logging();
    let good = new_project().get_state();
    let mut bad = good.clone();
    bad.sequences.clear();
    let raw = serde_json::json!({"stack": [good, bad], "cursor": 0}).to_string();

    let store = SharedStore::new();
    store.put_raw("history", &raw);
    let history = HistoryStack::persistent(Box::new(store), "history");
    let mut project = Project::with_history(DesignerConfig::default(), history);

    assert!(!project.redo(Timestamp(0)));
    assert_eq!(project.history().cursor(), Some(0));
    assert!(project.has_undo().can_redo);
    assert_eq!(project.sequences().len(), 1);
}

#[test]
fn history_depth_follows_config() {
    let config = DesignerConfig {
        history_limit: 3,
        ..DesignerConfig::default()
    };
    let mut project = Project::new(config);
    for _ in 0..5 {
        project.add_sequence();
    }
    assert_eq!(project.history().len(), 3);

    assert!(project.undo(Timestamp(0)));
    assert!(project.undo(Timestamp(0)));
    assert!(!project.undo(Timestamp(0)));
    assert_eq!(project.sequences().len(), 4);
}

#[test]
fn stored_history_deeper_than_the_limit_is_trimmed() {
    let store = SharedStore::new();
    {
        let history = HistoryStack::persistent(Box::new(store.clone()), "history");
        let mut project = Project::with_history(DesignerConfig::default(), history);
        for _ in 0..4 {
            project.add_sequence();
        }
        assert_eq!(project.history().len(), 5);
    }

    let config = DesignerConfig {
        history_limit: 2,
        ..DesignerConfig::default()
    };
    let history = HistoryStack::persistent(Box::new(store.clone()), "history");
    let project = Project::with_history(config, history);
    assert_eq!(project.history().len(), 2);
    assert_eq!(project.sequences().len(), 5);

    let stored: serde_json::Value = serde_json::from_str(&store.raw("history").unwrap()).unwrap();
    assert_eq!(stored["stack"].as_array().unwrap().len(), 2);
    assert_eq!(stored["cursor"], 1);
}
