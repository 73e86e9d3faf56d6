use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_bfrpg-sim")
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("command should emit json")
}

#[test]
fn simulate_without_db_writes_csv_and_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("results.csv");

    let output = Command::new(bin())
        .args(["simulate", "40", "--seed", "3", "--no-db", "--csv"])
        .arg(&csv_path)
        .output()
        .expect("simulate should run");

    assert_eq!(output.status.code(), Some(0));
    let payload = stdout_json(&output);
    assert_eq!(payload["trials"], 40);
    assert_eq!(payload["base_seed"], 3);

    let csv = std::fs::read_to_string(&csv_path).expect("csv written");
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("winner,rounds,pcs,pchp,pcdam,monsters,monsterhp,monsterdam")
    );
    assert_eq!(lines.count(), 40);
    assert!(!dir.path().join("sim.db").exists());
}

#[test]
fn simulate_then_summarize_reads_the_same_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("sim.db");

    let simulate = Command::new(bin())
        .args(["simulate", "120", "--seed", "17", "--parallel", "--db"])
        .arg(&db)
        .output()
        .expect("simulate should run");
    assert_eq!(simulate.status.code(), Some(0));
    let ran = stdout_json(&simulate);

    let summarize = Command::new(bin())
        .args(["summarize", "--db"])
        .arg(&db)
        .output()
        .expect("summarize should run");
    assert_eq!(summarize.status.code(), Some(0));
    let stored = stdout_json(&summarize);

    assert_eq!(stored["trials"], 120);
    assert_eq!(stored["pcs_wins"], ran["pcs_wins"]);
    assert_eq!(stored["mean_rounds"], ran["mean_rounds"]);
    assert!(stored["base_seed"].is_null());
}

#[test]
fn encounter_emits_seeded_event_trace() {
    let output = Command::new(bin())
        .args(["encounter", "--seed", "11"])
        .output()
        .expect("encounter should run");

    assert_eq!(output.status.code(), Some(0));
    let payload = stdout_json(&output);
    assert_eq!(payload["seed"], 11);
    assert!(payload["result"]["winner"].is_string());
    let events = payload["events"].as_array().expect("events array");
    assert_eq!(events[0]["event"], "round_started");
}

#[test]
fn rules_file_is_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let rules = dir.path().join("rules.json");
    std::fs::write(&rules, r#"{ "max_rounds": 1 }"#).expect("write rules");

    let output = Command::new(bin())
        .args(["simulate", "30", "--seed", "5", "--no-db", "--rules"])
        .arg(&rules)
        .output()
        .expect("simulate should run");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_json(&output)["max_rounds"], 1);
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let output = Command::new(bin()).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn summarize_missing_database_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = Command::new(bin())
        .args(["summarize", "--db"])
        .arg(dir.path().join("absent.db"))
        .output()
        .expect("summarize should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no results database"));
}
