use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

/// Runs the binary against a fresh database inside a temporary directory,
/// so no `weekboard.toml` from the developer's checkout is picked up.
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");

        Self { temp_dir, db_path }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("weekboard").expect("Failed to find weekboard binary");
        cmd.current_dir(self.temp_dir.path())
            .env("WEEKBOARD_DATABASE_PATH", &self.db_path)
            .env_remove("WEEKBOARD_LOG")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Runs `view --json` with the given selector arguments.
    pub fn view_json(&self, args: &[&str]) -> Value {
        let mut full = vec!["view", "--json"];
        full.extend_from_slice(args);
        let output = self.run_success(&full).get_output().stdout.clone();
        serde_json::from_slice(&output).expect("view --json should print JSON")
    }

    /// Seeds the default categories and adds one todo for today to
    /// "Personal Daily", returning its ID.
    pub fn seeded_with_todo(&self, content: &str) -> String {
        self.run_success(&["category", "seed"]);
        self.run_success(&["todo", "add", content, "-c", "Personal Daily"]);

        let view = self.view_json(&["-c", "Personal Daily"]);
        find_todo(&view, content)
            .and_then(|todo| todo["id"].as_str().map(str::to_string))
            .expect("todo should appear in this week's view")
    }
}

/// Looks up a top-level todo by content in a week view.
pub fn find_todo<'a>(view: &'a Value, content: &str) -> Option<&'a Value> {
    view["days"]
        .as_array()?
        .iter()
        .flat_map(|day| day["todos"].as_array().into_iter().flatten())
        .find(|todo| todo["content"] == content)
}

pub mod assertions {
    use super::*;

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
