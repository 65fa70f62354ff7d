use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use fgen_reconcile::{FeatureScanner, FeatureSet, ScanOutcome, ScanRequest};

use crate::wire::decode_response;

/// Everything that can go wrong running the scanner. All of it collapses to
/// [`ScanOutcome::Unavailable`].
#[derive(Debug)]
pub enum ScannerError {
    /// The executable does not exist.
    NotFound(PathBuf),
    /// The process could not be started.
    Spawn(std::io::Error),
    /// The request could not be encoded or delivered.
    Request(String),
    /// The process ran but exited unsuccessfully.
    Exit { code: Option<i32>, stderr: String },
    /// stdout was not a feature list.
    Decode(String),
}

impl fmt::Display for ScannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScannerError::NotFound(p) => {
                write!(f, "unable to find the binary scanner at '{}'", p.display())
            }
            ScannerError::Spawn(e) => write!(f, "failed to start binary scanner: {e}"),
            ScannerError::Request(msg) => write!(f, "failed to send scan request: {msg}"),
            ScannerError::Exit {
                code: Some(c),
                stderr,
            } => write!(f, "binary scanner exited with code {c}: {}", stderr.trim()),
            ScannerError::Exit { code: None, stderr } => {
                write!(f, "binary scanner was terminated: {}", stderr.trim())
            }
            ScannerError::Decode(msg) => write!(f, "binary scanner output not understood: {msg}"),
        }
    }
}

impl std::error::Error for ScannerError {}

/// Runs an external scanner executable once per request.
#[derive(Debug, Clone)]
pub struct ProcessScanner {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessScanner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// Run the scanner and return its recommendations.
    pub fn run(&self, request: &ScanRequest) -> Result<FeatureSet, ScannerError> {
        let payload =
            serde_json::to_vec(request).map_err(|e| ScannerError::Request(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ScannerError::NotFound(self.program.clone())
                } else {
                    ScannerError::Spawn(e)
                }
            })?;

        // Fed from its own thread so a scanner that writes before it reads
        // cannot block on a full stdout pipe.
        let feeder = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&payload)));

        let output = child
            .wait_with_output()
            .map_err(|e| ScannerError::Request(e.to_string()))?;

        if let Some(handle) = feeder {
            match handle.join() {
                Ok(Ok(())) => {}
                // A scanner that ignores stdin may close it early.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(ScannerError::Request(e.to_string())),
                Err(_) => {
                    return Err(ScannerError::Request(
                        "stdin writer thread panicked".to_string(),
                    ))
                }
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "fgen_scanner::messages", "{line}");
        }

        if !output.status.success() {
            return Err(ScannerError::Exit {
                code: output.status.code(),
                stderr,
            });
        }

        decode_response(&output.stdout).map_err(|e| ScannerError::Decode(e.to_string()))
    }
}

impl FeatureScanner for ProcessScanner {
    fn scan(&self, request: &ScanRequest) -> ScanOutcome {
        debug!(
            program = %self.program.display(),
            dirs = request.classes_dirs.len(),
            ee = ?request.ee_level,
            mp = %request.mp_level,
            "invoking binary scanner"
        );
        match self.run(request) {
            Ok(features) => ScanOutcome::Recommended(features),
            Err(e) => {
                warn!(error = %e, "binary scanner failed");
                ScanOutcome::unavailable(e.to_string())
            }
        }
    }
}
