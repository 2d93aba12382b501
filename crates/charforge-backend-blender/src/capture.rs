//! Child process output capture and line classification.

use std::io::{BufRead, BufReader, Read};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::BlenderErrorCode;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line of child output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

/// Receives every output line as it arrives. Called from reader threads.
pub type OutputSink = Arc<dyn Fn(&OutputLine) + Send + Sync>;

/// Severity of a single output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Info,
    Warning,
    Error(BlenderErrorCode),
}

/// Classifies one line of Blender output.
pub fn classify_output_line(line: &str) -> LineClass {
    let lower = line.to_ascii_lowercase();
    if lower.contains("permission denied") || lower.contains("access is denied") {
        LineClass::Error(BlenderErrorCode::PermissionDenied)
    } else if lower.contains("can't open file")
        || lower.contains("cannot open file")
        || lower.contains("no such file")
    {
        LineClass::Error(BlenderErrorCode::ScriptNotFound)
    } else if lower.starts_with("traceback")
        || lower.contains("error:")
        || lower.starts_with("error")
    {
        LineClass::Error(BlenderErrorCode::Unknown)
    } else if lower.contains("warning") {
        LineClass::Warning
    } else {
        LineClass::Info
    }
}

/// Lines collected from both pipes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CapturedOutput {
    pub fn stdout_text(&self) -> String {
        self.stdout.join("\n")
    }

    pub fn stderr_text(&self) -> String {
        self.stderr.join("\n")
    }

    /// True if any stdout line contains `needle`.
    pub fn stdout_contains(&self, needle: &str) -> bool {
        self.stdout.iter().any(|line| line.contains(needle))
    }
}

pub(crate) type SharedOutput = Arc<Mutex<CapturedOutput>>;

pub(crate) fn take_output(shared: &SharedOutput) -> CapturedOutput {
    let mut guard = shared.lock().unwrap_or_else(|e| e.into_inner());
    std::mem::take(&mut *guard)
}

/// Reads `reader` line by line on a new thread until EOF.
pub(crate) fn spawn_reader<R>(
    reader: R,
    stream: OutputStream,
    sink: Option<OutputSink>,
    captured: SharedOutput,
) -> std::io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let name = match stream {
        OutputStream::Stdout => "blender-stdout",
        OutputStream::Stderr => "blender-stderr",
    };
    std::thread::Builder::new().name(name.to_string()).spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Stopped reading {}: {}", name, e);
                    break;
                }
            }
            let text = String::from_utf8_lossy(&buf)
                .trim_end_matches(['\r', '\n'])
                .to_string();

            match classify_output_line(&text) {
                LineClass::Error(code) => tracing::warn!(target: "blender", "[{}] {}", code, text),
                LineClass::Warning => tracing::info!(target: "blender", "{}", text),
                LineClass::Info => tracing::debug!(target: "blender", "{}", text),
            }

            let line = OutputLine { stream, text };
            if let Some(sink) = &sink {
                sink(&line);
            }

            let mut out = captured.lock().unwrap_or_else(|e| e.into_inner());
            match stream {
                OutputStream::Stdout => out.stdout.push(line.text),
                OutputStream::Stderr => out.stderr.push(line.text),
            }
        }
    })
}
