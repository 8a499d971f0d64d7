//! CLI Tests
//!
//! Runs the built binary in a scratch working directory.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn sentdb(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sentdb"))
        .current_dir(cwd)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_missing_sentence_exits_nonzero_without_touching_the_store() {
    let dir = tempdir().unwrap();

    let output = sentdb(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    assert!(output.stdout.is_empty());
    assert!(!dir.path().join("database.db").exists());
}

#[test]
fn test_help_exits_zero() {
    let dir = tempdir().unwrap();

    let output = sentdb(dir.path(), &["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--format"));
}

#[test]
fn test_unknown_format_is_a_usage_error() {
    let dir = tempdir().unwrap();

    let output = sentdb(dir.path(), &["--format", "xml", "Cats chase mice."]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("database.db").exists());
}

#[test]
fn test_missing_interpreter_is_fatal() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("sentdb.toml"),
        "[pipeline]\npython = \"/nonexistent/sentdb-python\"\n",
    )
    .unwrap();

    let output = sentdb(dir.path(), &["Cats chase mice."]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("interpreter not found"));

    let store = sentdb::repository::SentenceStore::open(&dir.path().join("database.db")).unwrap();
    assert_eq!(store.count_texts().unwrap(), 0);
}

#[test]
fn test_unreadable_settings_file_is_fatal() {
    let dir = tempdir().unwrap();

    let output = sentdb(
        dir.path(),
        &["--config", "absent.toml", "Cats chase mice."],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("database.db").exists());
}

#[test]
fn test_sentence_starting_with_hyphen_reaches_the_model() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("sentdb.toml"),
        "[pipeline]\npython = \"/nonexistent/sentdb-python\"\n",
    )
    .unwrap();

    let output = sentdb(dir.path(), &["-hello world"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("interpreter not found"));
}

/// Install an executable standing in for the Python interpreter.
///
/// It ignores its arguments, announces readiness and answers each request
/// line with `reply`.
#[cfg(unix)]
fn install_interpreter(dir: &Path, reply: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-python");
    let script = format!(
        "#!/bin/sh\necho '{{\"ready\": true, \"model\": \"en_stub\", \"version\": \"0.0.1\"}}'\nwhile read -r line; do\n  echo '{}'\ndone\n",
        reply
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(
        dir.join("sentdb.toml"),
        format!("[pipeline]\npython = \"{}\"\n", path.display()),
    )
    .unwrap();
}

#[cfg(unix)]
const CATS_REPLY: &str = concat!(
    r#"{"tokens": ["#,
    r#"{"index": 0, "text": "Cats", "start": 0, "end": 4, "tag": "NNS", "pos": "NOUN", "morph": "Number=Plur", "lemma": "cat", "dep": "nsubj", "head": 1}, "#,
    r#"{"index": 1, "text": "chase", "start": 5, "end": 10, "tag": "VBP", "pos": "VERB", "morph": "", "lemma": "chase", "dep": "ROOT", "head": 1}, "#,
    r#"{"index": 2, "text": "mice", "start": 11, "end": 15, "tag": "NNS", "pos": "NOUN", "morph": "Number=Plur", "lemma": "mouse", "dep": "dobj", "head": 1}, "#,
    r#"{"index": 3, "text": ".", "start": 15, "end": 16, "tag": ".", "pos": "PUNCT", "morph": "", "lemma": ".", "dep": "punct", "head": 1}"#,
    r#"]}"#
);

#[cfg(unix)]
#[test]
fn test_index_output_and_stored_rows() {
    let dir = tempdir().unwrap();
    install_interpreter(dir.path(), CATS_REPLY);

    let output = sentdb(dir.path(), &["Cats chase mice."]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0\n1\n2\n3\n");

    let store = sentdb::repository::SentenceStore::open(&dir.path().join("database.db")).unwrap();
    assert_eq!(store.count_texts().unwrap(), 1);
    let stored = store.load_sentence(1).unwrap().unwrap();
    assert_eq!(stored.text, "Cats chase mice.");
    assert_eq!(stored.tokens.len(), 4);
    assert_eq!(stored.root(), Some(1));
}

#[cfg(unix)]
#[test]
fn test_full_output_ends_with_saved_notice() {
    let dir = tempdir().unwrap();
    install_interpreter(dir.path(), CATS_REPLY);

    let output = sentdb(dir.path(), &["--format", "full", "Cats chase mice."]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Cats: NOUN, nsubj\nchase: VERB, ROOT\nmice: NOUN, dobj\n.: PUNCT, punct\n\
         Analysis results saved to the database.\n"
    );
}

#[cfg(unix)]
#[test]
fn test_analysis_failure_prints_sentinel_and_exits_zero() {
    let dir = tempdir().unwrap();
    install_interpreter(dir.path(), r#"{"error": "ValueError: text too long"}"#);

    let output = sentdb(dir.path(), &["Cats chase mice."]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "-1\n");

    let store = sentdb::repository::SentenceStore::open(&dir.path().join("database.db")).unwrap();
    assert_eq!(store.count_texts().unwrap(), 0);
}
