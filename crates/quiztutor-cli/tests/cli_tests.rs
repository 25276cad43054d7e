//! CLI integration tests using assert_cmd.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn quiztutor() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quiztutor").unwrap()
}

fn question(n: u32, answer: char) -> String {
    format!(
        "Question number {n}?\nA. alpha\nB. beta\nC. gamma\nD. delta\nAnswer: {answer}\nExplanation: because {n}"
    )
}

/// Write a mock-provider config answering B, C, A, D, B.
fn mock_config(dir: &TempDir) -> PathBuf {
    let responses: Vec<String> = [(1, 'B'), (2, 'C'), (3, 'A'), (4, 'D'), (5, 'B')]
        .iter()
        .map(|&(n, answer)| question(n, answer))
        .collect();

    let config = format!(
        r#"default_provider = "mock"

[providers.mock]
type = "mock"
responses = {}

[[providers.mock.rules]]
needle = "hint for this quiz question"
replies = ["Greek letters come in order."]

[[providers.mock.rules]]
needle = "A student asked"
replies = ["Think about the second letter."]
"#,
        serde_json::to_string(&responses).unwrap()
    );

    let path = dir.path().join("quiztutor.toml");
    std::fs::write(&path, config).unwrap();
    path
}

#[test]
fn play_perfect_score() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Greek letters", "--config"])
        .arg(&config)
        .write_stdin("B\nC\nA\nD\nB\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1/5: Question number 1?"))
        .stdout(predicate::str::contains("  B) beta"))
        .stdout(predicate::str::contains("Correct! Here's why: because 5"))
        .stdout(predicate::str::contains("100.0%"))
        .stdout(predicate::str::contains("Perfect score! You're a quiz master!"));
}

#[test]
fn play_hint_unlocks_after_wrong_answer() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Greek letters", "--config"])
        .arg(&config)
        .write_stdin("hint\nA\nhint\nB\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hints unlock after one wrong answer."))
        .stdout(predicate::str::contains(
            "Not quite. Here's why that's not correct: because 1 Please try again!",
        ))
        .stdout(predicate::str::contains("Hint: Greek letters come in order."))
        .stdout(predicate::str::contains("Question 2/5"));
}

#[test]
fn play_locks_after_three_wrong_answers() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Greek letters", "--config"])
        .arg(&config)
        .write_stdin("A\nC\nD\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Out of attempts. The answer was B) beta"))
        .stdout(predicate::str::contains("Question 2/5"));
}

#[test]
fn play_follow_up_and_answer_seeking() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Greek letters", "--config"])
        .arg(&config)
        .write_stdin("ask why is beta here?\nask just tell me the answer\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Think about the second letter."))
        .stdout(predicate::str::contains("Question 2/5").not());
}

#[test]
fn play_writes_summary_json() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);
    let summary_path = dir.path().join("summary.json");

    quiztutor()
        .args(["play", "--topic", "Greek letters", "--difficulty", "hard"])
        .arg("--config")
        .arg(&config)
        .arg("--summary-json")
        .arg(&summary_path)
        .write_stdin("B\nA\nA\nA\nA\nD\nB\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Summary saved to"));

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["topic"], "Greek letters");
    assert_eq!(summary["difficulty"], "hard");
    assert_eq!(summary["questions_answered"], 5);
    assert_eq!(summary["correct"], 4);
    assert_eq!(summary["percentage"], 80.0);
    assert_eq!(summary["band"], "great_job");
}

#[test]
fn play_quit_immediately() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Greek letters", "--config"])
        .arg(&config)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0%"))
        .stdout(predicate::str::contains("Keep studying!"));
}

#[test]
fn play_rejects_empty_topic() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "   ", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "topic is required to generate a quiz question",
        ));
}

#[test]
fn play_unknown_provider() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Rust", "--provider", "nope", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("provider 'nope' not found"));
}

#[test]
fn play_unknown_difficulty_falls_back_to_easy() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Rust", "--difficulty", "expert", "--config"])
        .arg(&config)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("5 questions on Rust (easy)"))
        .stderr(predicate::str::contains("unknown difficulty 'expert'"));
}

#[test]
fn play_difficulty_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Rust", "--difficulty", "HARD", "--config"])
        .arg(&config)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(hard)"))
        .stderr(predicate::str::contains("unknown difficulty").not());
}

fn broken_provider_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("quiztutor.toml");
    std::fs::write(
        &path,
        "default_provider = \"mock\"\n\n[providers.mock]\ntype = \"mock\"\nresponses = [\"no structure here\"]\n",
    )
    .unwrap();
    path
}

#[test]
fn play_failing_provider_shows_error_question() {
    let dir = TempDir::new().unwrap();
    let path = broken_provider_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Rust", "--config"])
        .arg(&path)
        .write_stdin("\n\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Error generating question."))
        .stdout(predicate::str::contains("Failed to generate a unique question.").not())
        .stdout(predicate::str::contains("Press Enter to try the next question"))
        .stdout(predicate::str::contains("Question 5/5"));
}

#[test]
fn play_quit_after_error_question() {
    let dir = TempDir::new().unwrap();
    let path = broken_provider_config(&dir);

    quiztutor()
        .args(["play", "--topic", "Rust", "--config"])
        .arg(&path)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1/5"))
        .stdout(predicate::str::contains("Question 2/5").not())
        .stdout(predicate::str::contains("0.0%"));
}

#[test]
fn missing_config_file() {
    quiztutor()
        .args(["play", "--topic", "Rust", "--config", "no_such_config.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn list_models_for_mock() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir);

    quiztutor()
        .args(["list-models", "--provider", "mock", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: mock"))
        .stdout(predicate::str::contains("mock-model"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    quiztutor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quiztutor.toml"));

    assert!(dir.path().join("quiztutor.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    // First init
    quiztutor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    // Second init should skip
    quiztutor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_then_play_with_mock() {
    let dir = TempDir::new().unwrap();

    quiztutor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    quiztutor()
        .current_dir(dir.path())
        .args(["play", "--topic", "Science", "--provider", "mock"])
        .write_stdin("B\nC\nA\nB\nD\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Perfect score!"));
}

#[test]
fn help_output() {
    quiztutor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("LLM-backed multiple-choice quiz tutor"));
}

#[test]
fn version_output() {
    quiztutor()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quiztutor"));
}
