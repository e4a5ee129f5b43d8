mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestEnv;

fn view_titles(list: &Value, index: usize) -> Vec<String> {
    list["data"]["views"][index]["tasks"]
        .as_array()
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(|task| task["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn add_persists_task_with_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;

    let value = env.json(&["add", "Buy milk", "--description", "2 liters"])?;
    assert_eq!(value["schema_version"], "tasklist.v1");
    assert_eq!(value["command"], "add");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["task"]["priority"], "medium");
    assert_eq!(value["data"]["task"]["completed"], false);

    let stored = env.read_tasks()?;
    let records = stored.as_array().ok_or("expected array")?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["title"], "Buy milk");
    assert_eq!(records[0]["description"], "2 liters");
    assert!(records[0]["createdAt"].is_string());
    Ok(())
}

#[test]
fn add_rejects_blank_title_without_writing() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;

    env.cmd()
        .args(["add", "   "])
        .assert()
        .code(2)
        .stderr(contains("title cannot be empty"));

    env.cmd()
        .args(["add", "Real", "--priority", "urgent"])
        .assert()
        .code(2)
        .stderr(contains("unknown priority"));

    assert!(!env.tasks_file().exists());
    Ok(())
}

#[test]
fn list_sorts_views_and_toggle_moves_between_them() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;
    let a = env.add("A", "low")?;
    env.add("B", "high")?;

    // Default: datetime, newest first.
    let list = env.json(&["list"])?;
    assert_eq!(view_titles(&list, 0), vec!["B", "A"]);
    assert_eq!(list["data"]["views"][0]["config"]["sortType"], "datetime");

    env.json(&["view", "direction", "active"])?;
    let list = env.json(&["list"])?;
    assert_eq!(view_titles(&list, 0), vec!["A", "B"]);

    let toggled = env.json(&["toggle", a.as_str()])?;
    assert_eq!(toggled["data"]["matched"], true);
    assert_eq!(toggled["data"]["completed"], true);

    let list = env.json(&["list"])?;
    assert_eq!(view_titles(&list, 0), vec!["B"]);
    assert_eq!(view_titles(&list, 1), vec!["A"]);

    let cleared = env.json(&["clear", "completed"])?;
    assert_eq!(cleared["data"]["removed"], 1);
    let list = env.json(&["list"])?;
    assert_eq!(view_titles(&list, 0), vec!["B"]);
    assert!(view_titles(&list, 1).is_empty());
    Ok(())
}

#[test]
fn list_can_show_a_single_view() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;
    env.add("Only", "low")?;

    let list = env.json(&["list", "--view", "completed"])?;
    let views = list["data"]["views"].as_array().ok_or("views")?;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0]["view"], "completed");
    assert_eq!(views[0]["total"], 0);
    Ok(())
}

#[test]
fn edit_changes_fields_but_not_creation_time() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;
    let id = env.add("Draft", "low")?;
    let before = env.read_tasks()?[0]["createdAt"].clone();

    let edited = env.json(&["edit", &id[..8], "--title", "Final", "--priority", "high"])?;
    assert_eq!(edited["data"]["matched"], true);
    assert_eq!(edited["data"]["id"], Value::String(id.clone()));

    let stored = env.read_tasks()?;
    assert_eq!(stored[0]["title"], "Final");
    assert_eq!(stored[0]["priority"], "high");
    assert_eq!(stored[0]["createdAt"], before);

    env.cmd()
        .args(["edit", id.as_str(), "--title", " "])
        .assert()
        .code(2);
    env.cmd()
        .args(["edit", id.as_str()])
        .assert()
        .code(2)
        .stderr(contains("nothing to change"));
    Ok(())
}

#[test]
fn unknown_id_is_a_warning_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;
    env.add("Keep", "medium")?;
    let before = std::fs::read_to_string(env.tasks_file())?;

    for args in [
        vec!["toggle", "does-not-exist"],
        vec!["rm", "does-not-exist"],
        vec!["edit", "does-not-exist", "--title", "x"],
    ] {
        env.cmd()
            .args(&args)
            .assert()
            .success()
            .stdout(contains("No change"))
            .stdout(contains("no task matches 'does-not-exist'"));
    }

    let value = env.json(&["rm", "does-not-exist"])?;
    assert_eq!(value["data"]["matched"], false);
    assert_eq!(value["warnings"][0], "no task matches 'does-not-exist'");

    assert_eq!(std::fs::read_to_string(env.tasks_file())?, before);
    Ok(())
}

#[test]
fn rm_deletes_and_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;
    let id = env.add("Temporary", "low")?;

    assert_eq!(env.json(&["rm", id.as_str()])?["data"]["matched"], true);
    assert_eq!(env.json(&["rm", id.as_str()])?["data"]["matched"], false);
    assert_eq!(env.read_tasks()?, Value::Array(Vec::new()));
    Ok(())
}

#[test]
fn show_requires_existing_task() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;
    let id = env.add("Visible", "high")?;

    let shown = env.json(&["show", id.as_str()])?;
    assert_eq!(shown["data"]["task"]["title"], "Visible");

    env.cmd()
        .args(["--json", "show", "missing"])
        .assert()
        .code(2)
        .stdout(contains("\"status\": \"error\""))
        .stdout(contains("\"kind\": \"user_error\""));
    Ok(())
}

#[test]
fn corrupt_data_fails_then_resets_with_config() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::init()?;
    std::fs::create_dir_all(env.data_dir())?;
    std::fs::write(env.tasks_file(), "{ definitely not tasks")?;

    env.cmd()
        .arg("list")
        .assert()
        .code(4)
        .stderr(contains("unreadable"))
        .stderr(contains("hint:"));

    let config = env.write_config("[storage]\non_corrupt = \"reset\"\n")?;
    env.cmd()
        .arg("--config")
        .arg(&config)
        .args(["add", "Fresh start"])
        .assert()
        .success();

    assert!(env.data_dir().join("todos.json.corrupt").exists());
    assert_eq!(env.read_tasks()?[0]["title"], "Fresh start");
    Ok(())
}
