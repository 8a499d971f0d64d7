//! spaCy annotation backend.
//!
//! Runs the pipeline inside a Python helper process and exchanges one JSON
//! line per request over the helper's stdin/stdout.

use std::borrow::Cow;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{validate_tokens, TokenAnnotation};

use super::annotator::Annotator;
use super::model_path::{executable_dir, resolve_model, ModelSource};
use super::types::{AnnotationError, ModelLoadError};

const HELPER_SCRIPT: &str = include_str!("spacy_helper.py");

/// Settings for hosting the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Interpreter used to run the helper, looked up in PATH.
    pub python: String,
    /// Model name or path; unset uses the bundled/installed default.
    pub model: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            model: None,
        }
    }
}

#[derive(Serialize)]
struct Request<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Handshake {
    Ready {
        ready: bool,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        version: Option<String>,
    },
    Failed {
        error: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Response {
    Tokens { tokens: Vec<TokenAnnotation> },
    Failed { error: String },
}

/// Annotator backed by a spaCy pipeline.
///
/// The helper is started on the first `annotate` call and lives until the
/// annotator is dropped.
pub struct SpacyAnnotator {
    config: PipelineConfig,
    script: Cow<'static, str>,
    exe_dir: Option<PathBuf>,
    session: Option<HelperSession>,
}

impl SpacyAnnotator {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            script: Cow::Borrowed(HELPER_SCRIPT),
            exe_dir: executable_dir(),
            session: None,
        }
    }

    /// Use a different helper program, run as `<python> -c <script> <model>`.
    #[cfg(test)]
    pub(crate) fn with_script(config: PipelineConfig, script: &str) -> Self {
        Self {
            script: Cow::Owned(script.to_string()),
            ..Self::new(config)
        }
    }

    /// The model this annotator will load.
    pub fn model_source(&self) -> ModelSource {
        resolve_model(self.config.model.as_deref(), self.exe_dir.as_deref())
    }

    /// Whether the pipeline has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    fn start(&self) -> Result<HelperSession, ModelLoadError> {
        let model = self.model_source();
        let python = which::which(&self.config.python)
            .map_err(|_| ModelLoadError::InterpreterNotFound(self.config.python.clone()))?;

        info!("Loading spaCy model {} with {}", model, python.display());

        let mut child = Command::new(&python)
            .arg("-c")
            .arg(&*self.script)
            .arg(model.load_arg())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    ModelLoadError::InterpreterNotFound(python.display().to_string())
                }
                _ => ModelLoadError::Io(e),
            })?;

        let stdin = child.stdin.take();
        let stdout = match child.stdout.take() {
            Some(stdout) => BufReader::new(stdout),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ModelLoadError::Handshake("helper stdout unavailable".into()));
            }
        };

        let mut session = HelperSession {
            child,
            stdin,
            stdout,
        };

        let line = match session.read_line() {
            Ok(Some(line)) => line,
            Ok(None) => {
                let status = session.finish();
                return Err(ModelLoadError::LoadFailed {
                    model: model.load_arg(),
                    message: format!("helper exited before loading ({})", status),
                });
            }
            Err(e) => return Err(ModelLoadError::Io(e)),
        };

        match serde_json::from_str::<Handshake>(&line) {
            Ok(Handshake::Ready {
                ready: true,
                model: name,
                version,
            }) => {
                info!(
                    "spaCy model ready: {} {}",
                    name.as_deref().unwrap_or("unknown"),
                    version.as_deref().unwrap_or("")
                );
                Ok(session)
            }
            Ok(Handshake::Failed { error }) => Err(ModelLoadError::LoadFailed {
                model: model.load_arg(),
                message: error,
            }),
            Ok(Handshake::Ready { ready: false, .. }) | Err(_) => {
                Err(ModelLoadError::Handshake(line.trim().to_string()))
            }
        }
    }
}

impl Annotator for SpacyAnnotator {
    fn backend_id(&self) -> &str {
        "spacy"
    }

    fn annotate(&mut self, text: &str) -> Result<Vec<TokenAnnotation>, AnnotationError> {
        if self.session.is_none() {
            let session = self.start()?;
            self.session = Some(session);
        }
        let Some(session) = self.session.as_mut() else {
            return Err(AnnotationError::PipelineExited);
        };

        let result = session.request(text);
        if matches!(result, Err(AnnotationError::PipelineExited)) {
            warn!("spaCy helper exited; it will be restarted on the next request");
            self.session = None;
        }
        result
    }
}

/// A running helper process.
struct HelperSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl HelperSession {
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        match self.stdout.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }

    fn request(&mut self, text: &str) -> Result<Vec<TokenAnnotation>, AnnotationError> {
        let stdin = self.stdin.as_mut().ok_or(AnnotationError::PipelineExited)?;

        let mut payload = serde_json::to_string(&Request { text })?;
        payload.push('\n');
        if let Err(e) = stdin.write_all(payload.as_bytes()).and_then(|_| stdin.flush()) {
            return Err(match e.kind() {
                ErrorKind::BrokenPipe => AnnotationError::PipelineExited,
                _ => AnnotationError::Io(e),
            });
        }

        let line = self.read_line()?.ok_or(AnnotationError::PipelineExited)?;

        match serde_json::from_str::<Response>(&line)? {
            Response::Tokens { tokens } => {
                validate_tokens(&tokens)?;
                debug!("spaCy returned {} tokens", tokens.len());
                Ok(tokens)
            }
            Response::Failed { error } => Err(AnnotationError::Failed(error)),
        }
    }

    /// Close stdin and reap the helper, describing how it exited.
    fn finish(&mut self) -> String {
        self.stdin.take();
        match self.child.wait() {
            Ok(status) => status.to_string(),
            Err(e) => e.to_string(),
        }
    }
}

impl Drop for HelperSession {
    fn drop(&mut self) {
        let status = self.finish();
        debug!("spaCy helper stopped: {}", status);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Stand-in helper answering every request with a fixed analysis.
    const CATS_SCRIPT: &str = r#"
echo '{"ready": true, "model": "en_stub", "version": "0.0.1"}'
while read -r line; do
  echo '{"tokens": [
{"index": 0, "text": "Cats", "start": 0, "end": 4, "tag": "NNS", "pos": "NOUN", "morph": "Number=Plur", "lemma": "cat", "dep": "nsubj", "head": 1},
{"index": 1, "text": "chase", "start": 5, "end": 10, "tag": "VBP", "pos": "VERB", "morph": "Tense=Pres|VerbForm=Fin", "lemma": "chase", "dep": "ROOT", "head": 1},
{"index": 2, "text": "mice", "start": 11, "end": 15, "tag": "NNS", "pos": "NOUN", "morph": "Number=Plur", "lemma": "mouse", "dep": "dobj", "head": 1},
{"index": 3, "text": ".", "start": 15, "end": 16, "tag": ".", "pos": "PUNCT", "morph": "PunctType=Peri", "lemma": ".", "dep": "punct", "head": 1}]}' | tr -d '\n'
  echo
done
"#;

    fn stub(script: &str) -> SpacyAnnotator {
        let config = PipelineConfig {
            python: "sh".to_string(),
            model: Some("en_stub".to_string()),
        };
        SpacyAnnotator::with_script(config, script)
    }

    #[test]
    fn test_annotate_decodes_helper_tokens() {
        let mut annotator = stub(CATS_SCRIPT);
        assert!(!annotator.is_loaded());

        let tokens = annotator.annotate("Cats chase mice.").unwrap();

        assert!(annotator.is_loaded());
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].index, 0);
        assert_eq!(tokens[0].text, "Cats");
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[2].lemma, "mouse");
        assert_eq!(tokens[3].pos, "PUNCT");
        assert!(tokens[1].is_root());
    }

    #[test]
    fn test_helper_is_reused_across_requests() {
        let mut annotator = stub(CATS_SCRIPT);
        let first = annotator.annotate("Cats chase mice.").unwrap();
        let second = annotator.annotate("Cats chase mice.").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_failure_reports_helper_error() {
        let mut annotator = stub(r#"echo '{"error": "OSError: [E050] model not found"}'; exit 3"#);

        let err = annotator.annotate("Cats chase mice.").unwrap_err();

        match err {
            AnnotationError::ModelLoad(ModelLoadError::LoadFailed { model, message }) => {
                assert_eq!(model, "en_stub");
                assert!(message.contains("E050"));
            }
            other => panic!("expected load failure, got {:?}", other),
        }
        assert!(!annotator.is_loaded());
    }

    #[test]
    fn test_silent_exit_is_load_failure() {
        let mut annotator = stub("exit 1");
        let err = annotator.annotate("Cats").unwrap_err();
        assert!(matches!(
            err,
            AnnotationError::ModelLoad(ModelLoadError::LoadFailed { .. })
        ));
    }

    #[test]
    fn test_missing_interpreter() {
        let config = PipelineConfig {
            python: "/nonexistent/sentdb-python".to_string(),
            model: None,
        };
        let mut annotator = SpacyAnnotator::new(config);

        let err = annotator.annotate("Cats").unwrap_err();

        assert!(matches!(
            err,
            AnnotationError::ModelLoad(ModelLoadError::InterpreterNotFound(_))
        ));
    }

    #[test]
    fn test_helper_error_response() {
        let mut annotator = stub(
            r#"echo '{"ready": true}'
while read -r line; do echo '{"error": "ValueError: text too long"}'; done"#,
        );

        let err = annotator.annotate("Cats").unwrap_err();

        assert!(matches!(err, AnnotationError::Failed(msg) if msg.contains("too long")));
        assert!(annotator.is_loaded());
    }

    #[test]
    fn test_rejects_head_outside_sentence() {
        let mut annotator = stub(
            r#"echo '{"ready": true}'
while read -r line; do
  echo '{"tokens": [{"index": 0, "text": "Cats", "start": 0, "end": 4, "tag": "NNS", "pos": "NOUN", "morph": "", "lemma": "cat", "dep": "ROOT", "head": 3}]}'
done"#,
        );

        let err = annotator.annotate("Cats").unwrap_err();

        assert!(matches!(err, AnnotationError::InvalidOutput(_)));
    }

    #[test]
    fn test_helper_exit_after_handshake() {
        let mut annotator = stub(r#"echo '{"ready": true}'"#);

        let err = annotator.annotate("Cats").unwrap_err();

        assert!(matches!(err, AnnotationError::PipelineExited));
        assert!(!annotator.is_loaded());
    }

    #[test]
    #[ignore = "requires python3 with spaCy and en_core_web_sm installed"]
    fn test_cats_chase_mice_with_real_model() {
        let mut annotator = SpacyAnnotator::new(PipelineConfig::default());

        let tokens = annotator.annotate("Cats chase mice.").unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].text, "Cats");
        assert_eq!(tokens[0].start, 0);
        assert_eq!(tokens[3].text, ".");
    }
}
