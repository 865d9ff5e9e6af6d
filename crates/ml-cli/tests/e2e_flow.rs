//! End-to-end tests driving the `mlog` binary.
//!
//! Tests the full pipeline: console input → recorded match → exported files.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn mlog_binary() -> String {
    env!("CARGO_BIN_EXE_mlog").to_string()
}

fn base_command(temp: &Path) -> Command {
    let mut command = Command::new(mlog_binary());
    command
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env("MLOG_EXPORT_DIR", temp.join("exports"))
        .env_remove("MLOG_HOME_TEAM")
        .env_remove("RUST_LOG");
    command
}

/// Runs the console with `input` on stdin and waits for it to exit.
fn run_console(temp: &Path, input: &str) -> Output {
    let mut child = base_command(temp)
        .arg("record")
        .arg("--home")
        .arg("Lions")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn mlog record");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait for mlog")
}

fn exported_files(temp: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(temp.join("exports")) else {
        return Vec::new();
    };
    let mut files: Vec<_> = entries.map(|e| e.unwrap().path()).collect();
    files.sort();
    files
}

fn file_named(files: &[PathBuf], prefix: &str, extension: &str) -> PathBuf {
    files
        .iter()
        .find(|path| {
            let name = path.file_name().unwrap().to_string_lossy();
            name.starts_with(prefix) && name.ends_with(extension)
        })
        .unwrap_or_else(|| panic!("no {prefix}*{extension} in {files:?}"))
        .clone()
}

/// Test a full match exports both artifacts in both formats.
#[test]
fn test_record_and_export_all() {
    let temp = TempDir::new().unwrap();
    let output = run_console(
        temp.path(),
        "start  Wildcats\n\
         record goal away\n\
         record red_card home -p Ada\n\
         stop\n\
         export all\n\
         quit\n",
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "mlog record should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Kick-off: Lions vs Wildcats"));
    assert!(stdout.contains("Full time at"));

    let files = exported_files(temp.path());
    assert_eq!(files.len(), 4, "expected four exported files: {files:?}");

    let totals = file_named(&files, "Lions-vs-wildcats-totals-", ".csv");
    let totals = std::fs::read_to_string(totals).unwrap();
    assert!(totals.starts_with("\"Action Type\",\"Home\",\"Opponent\",\"Total\"\n"));
    assert!(totals.contains("\"goal\",\"0\",\"1\",\"1\"\n"));
    assert!(totals.contains("\"red_card\",\"1\",\"0\",\"1\"\n"));

    let events = file_named(&files, "Lions-vs-wildcats-events-", ".json");
    let events: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(events).unwrap()).unwrap();
    assert_eq!(events["gameInfo"]["teams"]["opponent"], "Wildcats");
    assert_eq!(events["gameInfo"]["finalScore"]["opponent"], 1);
    let actions = events["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0]["kind"], "goal");
    assert_eq!(actions[1]["player"], "Ada");
}

/// Test a blank opponent leaves the match in setup with a warning.
#[test]
fn test_blank_opponent_is_rejected() {
    let temp = TempDir::new().unwrap();
    let output = run_console(temp.path(), "start   \nrecord goal home\nquit\n");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("warning: enter an opponent name before starting the match"));
    assert!(stdout.contains("ignored: cannot record events while the match is setup"));
}

/// Test exporting with no events writes nothing.
#[test]
fn test_export_without_events_is_rejected() {
    let temp = TempDir::new().unwrap();
    let output = run_console(temp.path(), "start Wildcats\nexport csv\n");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "end of input should exit cleanly");
    assert!(stdout.contains("error: nothing to export: no events recorded"));
    assert!(exported_files(temp.path()).is_empty());
}

/// Test undo removes the event from the exported timeline.
#[test]
fn test_undo_before_export() {
    let temp = TempDir::new().unwrap();
    let output = run_console(
        temp.path(),
        "start Wildcats\nrecord goal home\nrecord goal away\nundo\nexport csv\nquit\n",
    );
    assert!(output.status.success());

    let files = exported_files(temp.path());
    let events = file_named(&files, "Lions-vs-wildcats-events-", ".csv");
    let events = std::fs::read_to_string(events).unwrap();
    assert_eq!(events.lines().count(), 2, "header plus one event: {events}");
    assert!(events.contains("\"goal\",\"Unknown\",\"Lions\",\"Goal\""));
}

/// Test the kinds listing.
#[test]
fn test_kinds_lists_all_kinds() {
    let temp = TempDir::new().unwrap();
    let output = base_command(temp.path()).arg("kinds").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 12);
    assert!(stdout.contains("pass_into_seam_3"));
}
