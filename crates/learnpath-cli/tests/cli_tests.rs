//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn learnpath() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("learnpath").unwrap();
    cmd.env_remove("LEARNPATH_MODULES_DIR")
        .env_remove("LEARNPATH_RECORDS")
        .env_remove("LEARNPATH_ROUNDING");
    cmd
}

fn initialized_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    learnpath()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

const CAPITALS_JSON: &str = r#"{
    "_id": "e1",
    "title": "Capitals",
    "exercise_type": "text_with_input",
    "exercise_content": [
        {"question": "Capital of France?", "answerType": "input"},
        {"question": "Capital of England?", "answerType": "input"}
    ],
    "correct_answers": [" paris ", "london"],
    "max_score": 10,
    "is_instant_scored": true
}"#;

fn write_grade_inputs(dir: &Path, exercise: &str, answers: &str) {
    std::fs::write(dir.join("exercise.json"), exercise).unwrap();
    std::fs::write(dir.join("answers.json"), answers).unwrap();
}

fn grade(dir: &Path, format: &str) -> Command {
    let mut cmd = learnpath();
    cmd.current_dir(dir)
        .arg("grade")
        .arg("--exercise")
        .arg("exercise.json")
        .arg("--answers")
        .arg("answers.json")
        .arg("--format")
        .arg(format);
    cmd
}

#[test]
fn help_lists_commands() {
    learnpath()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("grade"))
        .stdout(predicate::str::contains("progress"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn version_flag() {
    learnpath()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("learnpath"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    learnpath()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created learnpath.toml"))
        .stdout(predicate::str::contains("Created modules/example.toml"))
        .stdout(predicate::str::contains("Created records.json"));

    assert!(dir.path().join("learnpath.toml").exists());
    assert!(dir.path().join("modules/example.toml").exists());
    assert!(dir.path().join("records.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = initialized_dir();

    learnpath()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_example_module() {
    let dir = initialized_dir();

    learnpath()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--modules")
        .arg("modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("0001 Around the City (2 lessons, 2 exercises)"))
        .stdout(predicate::str::contains("All modules valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(
        &path,
        r#"
[module]
code = "0009"
name = "Broken"

[[exercises]]
id = "0009E0001"
exercise_type = "essay"
order = 1
"#,
    )
    .unwrap();

    learnpath()
        .arg("validate")
        .arg("--modules")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[0009E0001] WARNING: unknown exercise type: essay"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    learnpath()
        .arg("validate")
        .arg("--modules")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn progress_for_classroom() {
    let dir = initialized_dir();

    // 1 of 4 tasks done in the example module.
    learnpath()
        .current_dir(dir.path())
        .arg("progress")
        .arg("--student")
        .arg("demo")
        .arg("--classroom")
        .arg("100001")
        .assert()
        .success()
        .stdout(predicate::str::contains("Around the City"))
        .stdout(predicate::str::contains("1/4"))
        .stdout(predicate::str::contains("25%"))
        .stdout(predicate::str::contains("Continue"))
        .stdout(predicate::str::contains("Today: 0001 (25%)"));
}

#[test]
fn progress_json_for_student_without_record() {
    let dir = initialized_dir();

    let output = learnpath()
        .current_dir(dir.path())
        .arg("progress")
        .arg("--student")
        .arg("newcomer")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["studentId"], "newcomer");
    let record = &json["progress"][0];
    assert_eq!(record["moduleCode"], "0001");
    assert_eq!(record["totalTasks"], 0);
    assert_eq!(record["progressPercentage"], 0);
    assert_eq!(json["summary"]["modulesStarted"], 0);
}

#[test]
fn progress_unlisted_module_without_record_is_zero_state() {
    let dir = initialized_dir();

    learnpath()
        .current_dir(dir.path())
        .arg("progress")
        .arg("--student")
        .arg("demo")
        .arg("--modules")
        .arg("0001,0404")
        .assert()
        .success()
        .stdout(predicate::str::contains("0404"))
        .stdout(predicate::str::contains("0/0"))
        .stdout(predicate::str::contains("2 module(s), 1 started, 0 completed"));
}

#[test]
fn progress_unknown_module_with_record_fails() {
    let dir = initialized_dir();
    std::fs::write(
        dir.path().join("records.json"),
        r#"{"students": {"demo": {"0404": {"completedLessons": ["x"]}}}}"#,
    )
    .unwrap();

    learnpath()
        .current_dir(dir.path())
        .arg("progress")
        .arg("--student")
        .arg("demo")
        .arg("--modules")
        .arg("0404")
        .assert()
        .failure()
        .stderr(predicate::str::contains("module not found: 0404"));
}

#[test]
fn progress_unknown_classroom_fails() {
    let dir = initialized_dir();

    learnpath()
        .current_dir(dir.path())
        .arg("progress")
        .arg("--student")
        .arg("demo")
        .arg("--classroom")
        .arg("999999")
        .assert()
        .failure()
        .stderr(predicate::str::contains("classroom not found: 999999"));
}

#[test]
fn grade_text() {
    let dir = TempDir::new().unwrap();
    write_grade_inputs(dir.path(), CAPITALS_JSON, r#"{"0": "Paris", "1": "madrid"}"#);

    grade(dir.path(), "text")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 5/10"))
        .stdout(predicate::str::contains("1. [correct] Capital of France?"))
        .stdout(predicate::str::contains("2. [incorrect] Capital of England?"));
}

#[test]
fn grade_json() {
    let dir = TempDir::new().unwrap();
    write_grade_inputs(dir.path(), CAPITALS_JSON, r#"["PARIS", " London "]"#);

    let output = grade(dir.path(), "json").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["finalScore"], 10);
    assert_eq!(json["maxScore"], 10);
    assert_eq!(json["perItemCorrectness"], serde_json::json!([true, true]));
    assert_eq!(json["status"], "scored");
}

#[test]
fn grade_json_withholds_score_pending_review() {
    let dir = TempDir::new().unwrap();
    let exercise = CAPITALS_JSON.replace(
        r#""is_instant_scored": true"#,
        r#""is_instant_scored": false"#,
    );
    write_grade_inputs(dir.path(), &exercise, r#"{"0": "Paris", "1": "London"}"#);

    let output = grade(dir.path(), "json").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({"status": "pending_review"}));
}

#[test]
fn grade_markdown_transcript() {
    let dir = TempDir::new().unwrap();
    write_grade_inputs(dir.path(), CAPITALS_JSON, r#"{"0": "Paris"}"#);

    grade(dir.path(), "markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("**Question**: Capital of France?"))
        .stdout(predicate::str::contains("**Is Correct**: true"))
        .stdout(predicate::str::contains("**Score**: 5/10"));
}

#[test]
fn grade_withholds_score_pending_review() {
    let dir = TempDir::new().unwrap();
    let exercise = CAPITALS_JSON.replace(
        r#""is_instant_scored": true"#,
        r#""is_instant_scored": false"#,
    );
    write_grade_inputs(dir.path(), &exercise, r#"{"0": "Paris", "1": "London"}"#);

    grade(dir.path(), "text")
        .assert()
        .success()
        .stdout(predicate::str::contains("reviewed by the teacher"))
        .stdout(predicate::str::contains("Score:").not());
}

#[test]
fn grade_unknown_type_fails() {
    let dir = TempDir::new().unwrap();
    let exercise = CAPITALS_JSON.replace("text_with_input", "essay");
    write_grade_inputs(dir.path(), &exercise, "{}");

    grade(dir.path(), "text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown exercise type: essay"));
}

#[test]
fn grade_toml_exercise() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("exercise.toml"),
        r#"
id = "e2"
exercise_type = "fill_in_the_blanks"
max_score = 4
is_instant_scored = true
correct_answers = ["is", "are", "", "am"]

[[exercise_content]]
question = "She ___ happy."

[[exercise_content]]
question = "They ___ late."

[[exercise_content]]
question = "Any word works here: ___"

[[exercise_content]]
question = "I ___ ready."
"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("answers.json"), r#"{"0": "is", "1": "is", "2": "x"}"#).unwrap();

    // 2 of 4 correct (the blank key accepts anything, the last is missing).
    learnpath()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--exercise")
        .arg("exercise.toml")
        .arg("--answers")
        .arg("answers.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 2/4"));
}

#[test]
fn grade_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    write_grade_inputs(dir.path(), CAPITALS_JSON, "{}");

    grade(dir.path(), "text")
        .arg("--config")
        .arg("missing.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
