//! Integration tests for the local execution environment
//!
//! These run real snippets through `sh`.

use rlm_engine::repl::{ExecOutcome, FailureKind, LocalRepl};

#[tokio::test]
async fn test_captures_stdout() {
    let mut repl = LocalRepl::default();

    let outcome = repl.execute("echo hello; echo world").await;

    assert_eq!(outcome, ExecOutcome::Output("hello\nworld\n".to_string()));
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_silent_snippet_returns_empty_output() {
    let mut repl = LocalRepl::default();

    assert_eq!(repl.execute("true").await, ExecOutcome::Output(String::new()));
}

#[tokio::test]
async fn test_exported_variables_persist() {
    let mut repl = LocalRepl::default();

    repl.execute("export GREETING=hello").await;
    assert_eq!(repl.get_var("GREETING"), Some("hello"));

    let outcome = repl.execute("echo \"$GREETING, again\"").await;
    assert_eq!(outcome, ExecOutcome::Output("hello, again\n".to_string()));

    repl.execute("unset GREETING").await;
    assert_eq!(repl.get_var("GREETING"), None);
}

#[tokio::test]
async fn test_multiline_values_round_trip() {
    let mut repl = LocalRepl::default();

    repl.execute("export NOTE='line one\nINJECTED=oops'").await;

    assert_eq!(repl.get_var("NOTE"), Some("line one\nINJECTED=oops"));
    assert_eq!(repl.get_var("INJECTED"), None);

    let outcome = repl.execute("printf '%s' \"$NOTE\"").await;
    assert_eq!(
        outcome,
        ExecOutcome::Output("line one\nINJECTED=oops".to_string())
    );
}

#[tokio::test]
async fn test_set_var_is_visible_to_snippets() {
    let mut repl = LocalRepl::default();
    repl.set_var("COUNT", "41");

    let outcome = repl.execute("echo $((COUNT + 1))").await;

    assert_eq!(outcome, ExecOutcome::Output("42\n".to_string()));
    assert_eq!(repl.get_var("COUNT"), Some("41"));
}

#[tokio::test]
async fn test_failure_is_typed_and_rendered() {
    let mut repl = LocalRepl::default();

    let outcome = repl.execute("echo 'bad thing' >&2; exit 3").await;

    match &outcome {
        ExecOutcome::Failure { kind, message } => {
            assert_eq!(*kind, FailureKind::ExitStatus);
            assert_eq!(message, "bad thing");
        }
        other => panic!("Expected Failure, got: {:?}", other),
    }
    assert_eq!(outcome.to_string(), "[ERROR] ExitStatus: bad thing");
}

#[tokio::test]
async fn test_failing_last_command_without_stderr() {
    let mut repl = LocalRepl::default();

    let outcome = repl.execute("false").await;

    assert_eq!(outcome.to_string(), "[ERROR] ExitStatus: exit status 1");
}

#[tokio::test]
async fn test_failure_leaves_namespace_untouched() {
    let mut repl = LocalRepl::default();
    repl.set_var("KEEP", "yes");

    repl.execute("export KEEP=no; export OTHER=1; false").await;

    assert_eq!(repl.get_var("KEEP"), Some("yes"));
    assert_eq!(repl.get_var("OTHER"), None);
}

#[tokio::test]
async fn test_transcript_accumulates_until_clear() {
    let mut repl = LocalRepl::default();

    repl.execute("echo one").await;
    repl.execute("exit 1").await;
    repl.execute("echo two").await;
    assert_eq!(repl.transcript(), "one\ntwo\n");

    repl.clear();
    assert_eq!(repl.transcript(), "");

    repl.execute("echo three").await;
    assert_eq!(repl.transcript(), "three\n");
}

#[tokio::test]
async fn test_missing_interpreter() {
    let mut repl = LocalRepl::new("/nonexistent/interpreter");

    let outcome = repl.execute("echo hi").await;

    assert!(matches!(
        outcome,
        ExecOutcome::Failure {
            kind: FailureKind::SpawnError,
            ..
        }
    ));
    assert!(outcome.to_string().starts_with("[ERROR] SpawnError: "));
}
