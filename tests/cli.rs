use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn gridplan(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gridplan").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn write_map(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn test_schema_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    gridplan(dir.path())
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pressure\""))
        .stdout(predicate::str::contains("\"tracker\""));
}

#[test]
fn test_init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();

    gridplan(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("gridplan.yaml"));
    let written = fs::read_to_string(dir.path().join("gridplan.yaml")).unwrap();
    assert!(written.contains("max_expansions"));

    gridplan(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    gridplan(dir.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn test_plan_renders_path() {
    let dir = tempfile::tempdir().unwrap();
    let map = write_map(dir.path(), "arena.txt", "S...\n.##.\n...G\n");

    gridplan(dir.path())
        .args(["plan", "--map", &map])
        .assert()
        .success()
        .stdout(predicate::str::contains("success: 5 steps"))
        .stdout(predicate::str::contains(".##"));
}

#[test]
fn test_plan_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let map = write_map(dir.path(), "arena.txt", "....\n.##.\n....\n");

    let output = gridplan(dir.path())
        .args(["plan", "--map", &map, "--start", "0,0", "--goal", "3,2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "success");
    assert_eq!(report["path"].as_array().unwrap().len(), 5);
    assert_eq!(report["goal"]["x"], 3);
    // first request from the plan's subscriber
    assert_eq!(report["sequence"], 1);
    assert!(report["origin"].as_u64().unwrap() >= 1);
}

#[test]
fn test_plan_reports_no_path() {
    let dir = tempfile::tempdir().unwrap();
    let map = write_map(dir.path(), "walled.txt", "S#G\n");

    gridplan(dir.path())
        .args(["plan", "--map", &map])
        .assert()
        .success()
        .stdout(predicate::str::contains("no_path"));
}

#[test]
fn test_plan_rejects_bad_map() {
    let dir = tempfile::tempdir().unwrap();
    let map = write_map(dir.path(), "bad.txt", "S.X\n");

    gridplan(dir.path())
        .args(["plan", "--map", &map])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown map glyph 'X'"));
}

#[test]
fn test_plan_requires_goal() {
    let dir = tempfile::tempdir().unwrap();
    let map = write_map(dir.path(), "nogoal.txt", "S..\n");

    gridplan(dir.path())
        .args(["plan", "--map", &map])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No goal"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let map = write_map(dir.path(), "arena.txt", "S.G\n");
    fs::write(
        dir.path().join("gridplan.yaml"),
        "planner:\n  heuristic_weight: 0.5\n",
    )
    .unwrap();

    gridplan(dir.path())
        .args(["plan", "--map", &map])
        .assert()
        .failure()
        .stderr(predicate::str::contains("heuristic_weight"));
}

#[test]
fn test_simulate_writes_summary() {
    let dir = tempfile::tempdir().unwrap();
    let map = write_map(dir.path(), "arena.txt", "......\n..#...\n......\n");
    let reports = dir.path().join("reports");

    gridplan(dir.path())
        .args([
            "simulate",
            "--map",
            &map,
            "--agents",
            "3",
            "--rounds",
            "2",
            "--threads",
            "2",
            "--seed",
            "11",
            "--report-dir",
            &reports.display().to_string(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 agents, 2 rounds"))
        .stdout(predicate::str::contains("success"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(reports.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["requests"], 6);
    assert_eq!(summary["seed"], 11);
    assert!(fs::read_to_string(reports.join("summary.md"))
        .unwrap()
        .contains("## Outcomes"));
}
