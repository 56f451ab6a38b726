//! Black-box tests of the `weekboard` binary.

use predicates::prelude::*;

mod helpers;
use helpers::{assertions, find_todo, CliTestHarness};

#[test]
fn test_cli_help_and_version() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["--help"])
        .stdout(predicate::str::contains("weekly todo planner"));

    harness
        .run_success(&["--version"])
        .stdout(predicate::str::contains("weekboard"));

    harness
        .run_failure(&["invalid-command"])
        .stderr(assertions::has_error());
}

#[test]
fn test_seed_and_list_categories() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["category", "list"])
        .stdout(predicate::str::contains("No categories found"));

    harness
        .run_success(&["category", "seed"])
        .stdout(predicate::str::contains("Work Daily"))
        .stdout(predicate::str::contains("Personal Daily"));

    harness
        .run_success(&["category", "seed"])
        .stdout(predicate::str::contains("already exist"));

    harness
        .run_success(&["category", "list"])
        .stdout(predicate::str::contains("#DC2626"))
        .stdout(predicate::str::contains("personal"));
}

#[test]
fn test_category_add_edit_delete() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["category", "add", "Side Projects", "--color", "#10B981"])
        .stdout(predicate::str::contains("Created category"))
        .stdout(predicate::str::contains("52 weeks ready"));

    harness
        .run_success(&["category", "edit", "side projects", "--name", "Hobbies"])
        .stdout(predicate::str::contains("Updated category: 'Hobbies'"));

    // Without a terminal the confirmation prompt declines.
    harness
        .run_success(&["category", "delete", "Hobbies"])
        .stdout(predicate::str::contains("Deletion cancelled"));

    harness
        .run_success(&["category", "delete", "Hobbies", "--force"])
        .stdout(predicate::str::contains("Deleted category"));

    harness
        .run_success(&["category", "list"])
        .stdout(predicate::str::contains("Hobbies").not());
}

#[test]
fn test_default_categories_cannot_be_deleted() {
    let harness = CliTestHarness::new();
    harness.run_success(&["category", "seed"]);

    harness
        .run_failure(&["category", "delete", "Work Daily", "--force"])
        .stderr(predicate::str::contains("Cannot delete default categories"));
}

#[test]
fn test_commands_need_a_category() {
    let harness = CliTestHarness::new();

    harness
        .run_failure(&["view"])
        .stderr(predicate::str::contains("weekboard category seed"));
}

#[test]
fn test_todo_lifecycle() {
    let harness = CliTestHarness::new();
    let id = harness.seeded_with_todo("Water plants");
    let simple = id.replace('-', "");
    let short = &simple[..8];

    harness
        .run_success(&["todo", "do", short])
        .stdout(predicate::str::contains("Completed todo: 'Water plants'"));

    let view = harness.view_json(&["-c", "Personal Daily"]);
    let todo = find_todo(&view, "Water plants").unwrap();
    assert_eq!(todo["completed"], true);
    assert!(todo["completedAt"].is_string());
    assert_eq!(todo["categoryName"], "Personal");
    assert_eq!(view["stats"]["completed"], 1);
    assert_eq!(view["readOnly"], false);

    harness
        .run_success(&["todo", "undo", short])
        .stdout(predicate::str::contains("Reopened todo"));

    harness
        .run_success(&["todo", "edit", short, "Water all plants"])
        .stdout(predicate::str::contains("Updated todo: 'Water all plants'"));

    harness
        .run_success(&["todo", "add", "Fill can", "-c", "Personal Daily", "--parent", short])
        .stdout(predicate::str::contains("Added subtask"));

    let view = harness.view_json(&["-c", "Personal Daily"]);
    let todo = find_todo(&view, "Water all plants").unwrap();
    assert_eq!(todo["subtasks"][0]["content"], "Fill can");

    harness
        .run_success(&["todo", "delete", short, "--force"])
        .stdout(predicate::str::contains("Deleted todo"));

    let view = harness.view_json(&["-c", "Personal Daily"]);
    assert!(find_todo(&view, "Water all plants").is_none());
}

#[test]
fn test_todo_move_reorders_siblings() {
    let harness = CliTestHarness::new();
    harness.run_success(&["category", "seed"]);
    for content in ["First", "Second", "Third"] {
        harness.run_success(&["todo", "add", content, "-c", "Personal Daily"]);
    }

    let view = harness.view_json(&["-c", "Personal Daily"]);
    let third = find_todo(&view, "Third").unwrap()["id"].as_str().unwrap().to_string();

    harness
        .run_success(&["todo", "move", &third, "1"])
        .stdout(predicate::str::contains("position 1 of 3"));

    let view = harness.view_json(&["-c", "Personal Daily"]);
    let day = view["days"]
        .as_array()
        .unwrap()
        .iter()
        .find(|day| !day["todos"].as_array().unwrap().is_empty())
        .unwrap();
    let order: Vec<&str> = day["todos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["content"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["Third", "First", "Second"]);
}

#[test]
fn test_unknown_todo_id_fails() {
    let harness = CliTestHarness::new();
    harness.run_success(&["category", "seed"]);

    harness
        .run_failure(&["todo", "do", "ffffffff"])
        .stderr(predicate::str::contains("No todo found"));

    harness
        .run_failure(&["todo", "do", "zz"])
        .stderr(assertions::has_error());
}

#[test]
fn test_combined_category_is_read_only() {
    let harness = CliTestHarness::new();
    harness.run_success(&["category", "seed"]);
    harness
        .run_success(&["category", "add", "Combined"])
        .stdout(predicate::str::contains("Combined view"));

    harness
        .run_failure(&["todo", "add", "Nope", "-c", "Combined"])
        .stderr(predicate::str::contains("combined view"));

    harness.run_success(&["todo", "add", "Gym", "-c", "Personal Daily"]);
    let view = harness.view_json(&["-c", "Combined"]);
    assert_eq!(view["readOnly"], true);
    let gym = find_todo(&view, "Gym").unwrap();
    assert_eq!(gym["categoryName"], "Personal");
    assert_eq!(gym["readOnly"], true);
}

#[test]
fn test_day_tags() {
    let harness = CliTestHarness::new();
    harness.run_success(&["category", "seed"]);

    harness
        .run_failure(&["tag", "set", "2025-02-05", "Holiday"])
        .stderr(predicate::str::contains("Weekend, Vacation, Sick"));

    harness
        .run_success(&["tag", "set", "2025-02-05", "vacation", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("Tagged 2025-02-05 as Vacation"));

    harness
        .run_success(&["tag", "list", "-c", "Personal Daily", "--from", "2025-02-01", "--to", "2025-02-28"])
        .stdout(predicate::str::contains("Vacation"));

    harness
        .run_success(&["tag", "clear", "2025-02-05", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("Removed the tag"));

    harness
        .run_success(&["tag", "clear", "2025-02-05", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("has no tag"));
}

#[test]
fn test_notes_and_reflection() {
    let harness = CliTestHarness::new();
    harness.run_success(&["category", "seed"]);

    harness
        .run_success(&["note", "set", "today", "Dentist at 10", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("Saved note"));

    harness
        .run_success(&["note", "list", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("Dentist at 10"));

    harness
        .run_success(&["reflect", "show", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("No reflection yet"));

    harness
        .run_success(&["reflect", "set", "Calm week", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("Saved reflection"));

    harness
        .run_success(&["reflect", "show", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("Calm week"));

    let view = harness.view_json(&["-c", "Personal Daily"]);
    assert_eq!(view["reflection"]["content"], "Calm week");
}

#[test]
fn test_weeks_generate_and_list() {
    let harness = CliTestHarness::new();
    harness.run_success(&["category", "seed"]);

    harness
        .run_success(&["week", "generate", "-c", "Work Daily", "-n", "4"])
        .stdout(predicate::str::contains("Generated 4 weeks for 'Work Daily'"));

    harness
        .run_success(&["week", "list", "-c", "Work Daily", "--all", "--limit", "5"])
        .stdout(predicate::str::contains("Showing 1 to 5 of 56"))
        .stdout(predicate::str::contains("--offset 5"));

    harness
        .run_success(&["week", "generate", "-c", "Work Daily", "-n", "0"])
        .stdout(predicate::str::contains("No new weeks for 'Work Daily'"));

    harness
        .run_failure(&["week", "generate", "-c", "Work Daily", "-n", "20000000"])
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn test_stats_and_view_rendering() {
    let harness = CliTestHarness::new();
    harness.seeded_with_todo("Read a chapter");

    harness
        .run_success(&["view", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("Personal Daily | Week"))
        .stdout(predicate::str::contains("Read a chapter"))
        .stdout(predicate::str::contains("Rate"));

    harness
        .run_success(&["stats", "-c", "Personal Daily"])
        .stdout(predicate::str::contains("0/1"))
        .stdout(predicate::str::contains("Mon"));
}
