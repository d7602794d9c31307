// Task list persistence, ordering and cross-list aggregation.
use paradesk::model::TaskProgress;
use paradesk::storage::{SCHEMA_VERSION, Storage};

fn store() -> Storage {
    Storage::open_in_memory().expect("in-memory database")
}

#[test]
fn test_new_lists_append_to_order() {
    let db = store();
    let a = db.create_task_list("Inbox").unwrap();
    let b = db.create_task_list("Project A").unwrap();

    assert_eq!(a.display_order, 1);
    assert_eq!(b.display_order, 2);
    assert_eq!(a.content, "");

    let names: Vec<String> = db.task_lists().unwrap().into_iter().map(|l| l.name).collect();
    assert_eq!(names, vec!["Inbox", "Project A"]);
}

#[test]
fn test_reorder_uses_position_index() {
    let db = store();
    let a = db.create_task_list("a").unwrap();
    let b = db.create_task_list("b").unwrap();
    let c = db.create_task_list("c").unwrap();

    db.reorder_task_lists(&[c.id, a.id, b.id]).unwrap();

    let lists = db.task_lists().unwrap();
    let order: Vec<(String, i64)> = lists.into_iter().map(|l| (l.name, l.display_order)).collect();
    assert_eq!(
        order,
        vec![("c".into(), 0), ("a".into(), 1), ("b".into(), 2)]
    );

    // New lists still land after the current maximum.
    let d = db.create_task_list("d").unwrap();
    assert_eq!(d.display_order, 3);
}

#[test]
fn test_reorder_skips_unknown_ids() {
    let db = store();
    let a = db.create_task_list("a").unwrap();
    db.reorder_task_lists(&[4242, a.id]).unwrap();
    assert_eq!(db.task_list(a.id).unwrap().unwrap().display_order, 1);
}

#[test]
fn test_update_content_and_missing_ids() {
    let db = store();
    let list = db.create_task_list("Errands").unwrap();

    let updated = db
        .update_task_list_content(list.id, "- [ ] Post office\n")
        .unwrap()
        .expect("list exists");
    assert_eq!(updated.content, "- [ ] Post office\n");
    assert_eq!(updated.name, "Errands");

    assert!(db.update_task_list_content(999, "x").unwrap().is_none());
    assert!(db.task_list(999).unwrap().is_none());
}

#[test]
fn test_delete_reports_whether_removed() {
    let db = store();
    let list = db.create_task_list("Temp").unwrap();
    assert!(db.delete_task_list(list.id).unwrap());
    assert!(!db.delete_task_list(list.id).unwrap());
    assert!(db.task_lists().unwrap().is_empty());
}

#[test]
fn test_pinned_tasks_across_lists() {
    let db = store();
    let work = db.create_task_list("Work").unwrap();
    let home = db.create_task_list("Home").unwrap();
    db.create_task_list("Empty").unwrap();

    db.update_task_list_content(
        work.id,
        "- [ ] Ship release [pinned]\n  - [x] Tag build [pinned]\n- [ ] Triage\n",
    )
    .unwrap();
    db.update_task_list_content(home.id, "- [x] Pay rent [pinned] [截止:2025-09-01]\n")
        .unwrap();

    let pinned = db.pinned_tasks().unwrap();
    let summary: Vec<(&str, &str, i64)> = pinned
        .iter()
        .map(|p| (p.task.content.as_str(), p.source_list.as_str(), p.source_list_id))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Ship release", "Work", work.id),
            ("Tag build", "Work", work.id),
            ("Pay rent", "Home", home.id),
        ]
    );
    assert_eq!(pinned[2].task.due_date.as_deref(), Some("2025-09-01"));

    let progress = TaskProgress::of_pinned(&pinned);
    assert_eq!(progress.total, 3);
    assert_eq!(progress.completed, 2);

    let json = serde_json::to_value(&pinned[2]).unwrap();
    assert_eq!(json["sourceList"], "Home");
    assert_eq!(json["isPinned"], true);
}

#[test]
fn test_list_progress_counts_every_depth() {
    let db = store();
    let list = db.create_task_list("Trip").unwrap();
    db.update_task_list_content(
        list.id,
        "- [x] Book flights\n  - [x] Pick seats\n  - [ ] Add luggage\n- [ ] Pack\n",
    )
    .unwrap();

    let progress = db.task_list_progress(list.id).unwrap().unwrap();
    assert_eq!(progress, TaskProgress { total: 4, completed: 2 });
    assert!((progress.ratio() - 0.5).abs() < f64::EPSILON);
    assert!(db.task_list_progress(999).unwrap().is_none());
}

#[test]
fn test_file_database_survives_reopen() {
    let ctx = paradesk::context::TestContext::new();
    let path = ctx.root.join("reopen.db");
    {
        let db = Storage::open(&path).unwrap();
        db.create_task_list("Persisted").unwrap();
        db.set_mit("Write the report").unwrap();
    }
    let db = Storage::open(&path).unwrap();
    assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    assert_eq!(db.task_lists().unwrap()[0].name, "Persisted");
    assert_eq!(db.mit().unwrap().as_deref(), Some("Write the report"));
}
