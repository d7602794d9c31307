// Channel dispatch and the JSON-lines server loop.
use paradesk::bridge::{self, Bridge, Request};
use paradesk::config::Config;
use paradesk::context::TestContext;
use paradesk::storage::Storage;
use serde_json::{Value, json};
use std::sync::Arc;

fn bridge() -> Bridge {
    Bridge::new(Storage::open_in_memory().unwrap(), Config::default())
}

fn call(b: &Bridge, channel: &str, args: Value) -> Value {
    let args = match args {
        Value::Array(a) => a,
        other => vec![other],
    };
    b.dispatch(channel, &args)
        .unwrap_or_else(|e| panic!("{} failed: {:#}", channel, e))
}

#[test]
fn test_parse_markdown_channel() {
    let b = bridge();
    let out = call(
        &b,
        "parse-markdown-tasks",
        json!([{ "content": "- [ ] Parent\n  - [x] Child\n" }]),
    );
    assert_eq!(out[0]["content"], "Parent");
    assert_eq!(out[0]["children"][0]["id"], "task-1");
    assert_eq!(out[0]["children"][0]["isCompleted"], true);

    assert_eq!(call(&b, "parse-markdown-tasks", json!([""])), json!([]));
}

#[test]
fn test_theme_defaults_then_persists() {
    let b = bridge();
    assert_eq!(call(&b, "get-theme", json!([])), "dark");
    call(&b, "set-theme", json!(["light"]));
    assert_eq!(call(&b, "get-theme", json!([])), "light");
    assert!(b.dispatch("set-theme", &[json!("sepia")]).is_err());
}

#[test]
fn test_kv_channels() {
    let b = bridge();
    assert_eq!(call(&b, "get-mit", json!([])), Value::Null);
    call(&b, "set-mit", json!(["Finish taxes"]));
    assert_eq!(call(&b, "get-mit", json!([])), "Finish taxes");

    call(
        &b,
        "set-last-path-for-mode",
        json!([{ "mode": "projects", "path": "/home/me/P" }]),
    );
    assert_eq!(
        call(&b, "get-last-path-for-mode", json!(["projects"])),
        "/home/me/P"
    );
}

#[test]
fn test_task_list_channels_and_pinned_view() {
    let b = bridge();
    let list = call(&b, "create-task-list", json!(["Weekly"]));
    let id = list["id"].as_i64().unwrap();
    assert_eq!(list["display_order"], 1);

    let updated = call(
        &b,
        "update-task-list-content",
        json!([id, "- [ ] Review goals [pinned]\n- [x] Inbox zero\n"]),
    );
    assert_eq!(updated["content"], "- [ ] Review goals [pinned]\n- [x] Inbox zero\n");

    let pinned = call(&b, "get-pinned-tasks", json!([]));
    assert_eq!(pinned["total"], 1);
    assert_eq!(pinned["completed"], 0);
    assert_eq!(pinned["tasks"][0]["sourceList"], "Weekly");
    assert_eq!(pinned["tasks"][0]["sourceListId"], id);

    let progress = call(&b, "get-task-list-progress", json!([id]));
    assert_eq!(progress, json!({ "total": 2, "completed": 1 }));

    assert_eq!(call(&b, "update-task-lists-order", json!([[id]])), true);
    assert_eq!(call(&b, "delete-task-list", json!([id])), true);
    assert_eq!(call(&b, "get-task-list", json!([id])), Value::Null);
}

#[test]
fn test_scratchpad_channels() {
    let b = bridge();
    let note = call(&b, "add-scratchpad-note", json!(["idea"]));
    let id = note["id"].clone();
    call(&b, "update-scratchpad-note", json!([id, "better idea"]));
    let notes = call(&b, "get-scratchpad-notes", json!([]));
    assert_eq!(notes[0]["content"], "better idea");
    assert_eq!(call(&b, "delete-scratchpad-note", json!([id])), true);
}

#[test]
fn test_calendar_channels() {
    let b = bridge();
    let ev = call(
        &b,
        "create-calendar-event",
        json!([{ "date": "2025-08-25", "title": "Review", "is_future_reminder_pin": true }]),
    );
    assert_eq!(ev["content"], "");
    let id = ev["id"].clone();

    let in_range = call(
        &b,
        "get-calendar-events",
        json!([{ "start": "2025-08-01", "end": "2025-08-31" }]),
    );
    assert_eq!(in_range.as_array().unwrap().len(), 1);

    let pinned = call(&b, "get-pinned-calendar-events", json!([]));
    assert_eq!(pinned[0]["title"], "Review");

    let moved = call(&b, "update-calendar-event", json!([id, { "date": "2025-09-02" }]));
    assert_eq!(moved["date"], "2025-09-02");
    assert_eq!(moved["title"], "Review");
}

#[test]
fn test_file_channels_fail_softly() {
    let ctx = TestContext::new();
    let root = ctx.workspace();
    let b = bridge();
    let root_str = root.to_string_lossy().to_string();

    assert_eq!(call(&b, "get-files", json!([])), Value::Null);
    assert_eq!(
        call(&b, "read-file", json!([root.join("nope.md").to_string_lossy()])),
        Value::Null
    );

    let created = call(&b, "create-file", json!([root_str, "inbox.md", root_str]));
    assert_eq!(created["files"][0]["name"], "inbox.md");
    assert_eq!(created["files"][0]["isDirectory"], false);

    let path = created["newPath"].clone();
    assert_eq!(call(&b, "save-file", json!([path, "- [ ] a\n"])), true);
    assert_eq!(call(&b, "read-file", json!([path]))["content"], "- [ ] a\n");

    let listing = call(&b, "get-files", json!([root_str]));
    assert_eq!(listing["folderName"], "workspace");

    assert_eq!(call(&b, "delete-entry", json!([path])), true);
}

#[test]
fn test_unknown_channel_and_bad_args() {
    let b = bridge();
    assert!(b.dispatch("launch-rockets", &[]).is_err());
    assert!(b.dispatch("get-task-list", &[json!("seven")]).is_err());
    assert!(b.dispatch("create-task-list", &[]).is_err());

    let resp = b.handle(Request {
        id: json!(3),
        channel: "nope".into(),
        args: vec![],
    });
    assert_eq!(resp.id, json!(3));
    assert!(resp.result.is_none());
    assert!(resp.error.unwrap().contains("Unknown channel"));
}

#[tokio::test]
async fn test_serve_answers_each_line_in_order() {
    let b = Arc::new(bridge());
    let input = concat!(
        r#"{"id":1,"channel":"create-task-list","args":["Inbox"]}"#,
        "\n",
        "\n",
        "this is not json\n",
        r#"{"id":2,"channel":"parse-markdown-tasks","args":["- [x] done"]}"#,
        "\n"
    );
    let mut output: Vec<u8> = Vec::new();

    bridge::serve(b, input.as_bytes(), &mut output).await.unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[0]["result"]["name"], "Inbox");
    assert!(lines[1]["error"].as_str().unwrap().starts_with("Malformed request"));
    assert_eq!(lines[2]["id"], 2);
    assert_eq!(lines[2]["result"][0]["isCompleted"], true);
}
