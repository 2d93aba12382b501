//! Blender subprocess orchestrator.
//!
//! Every launch walks `Idle → Launching → Running → {Completed |
//! FailedToStart | ExitedUnexpectedly}`. A supervisor thread owns the child
//! and two reader threads forward its output line by line, so the caller is
//! never blocked until it asks for the verdict.
//!
//! Interactive launches are expected to stay open: exiting inside the grace
//! window is a failure whatever the exit code. Batch launches run with
//! `--background` and must exit zero (or with the benign `-1`).

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::capture::{
    spawn_reader, take_output, CapturedOutput, OutputSink, OutputStream, SharedOutput,
};
use crate::error::{BlenderError, BlenderResult};
use crate::locate::{Resolution, ToolLocator};

/// Default timeout for batch runs (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// An interactive session closing sooner than this is a failure.
pub const INTERACTIVE_GRACE_SECS: u64 = 5;

/// Exit code treated as success.
pub const BENIGN_EXIT_CODE: i32 = -1;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How the tool is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Visible session that must stay open.
    Interactive,
    /// `--background` run that must exit cleanly.
    Batch,
}

/// Lifecycle of one launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Launching,
    Running,
    Completed,
    FailedToStart,
    ExitedUnexpectedly,
}

impl LaunchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchState::Idle => "idle",
            LaunchState::Launching => "launching",
            LaunchState::Running => "running",
            LaunchState::Completed => "completed",
            LaunchState::FailedToStart => "failed_to_start",
            LaunchState::ExitedUnexpectedly => "exited_unexpectedly",
        }
    }

    /// True for the three end states.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LaunchState::Completed | LaunchState::FailedToStart | LaunchState::ExitedUnexpectedly
        )
    }
}

/// Shared view of a launch's current state.
#[derive(Debug, Clone)]
pub struct StateCell(Arc<Mutex<LaunchState>>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(LaunchState::Idle)))
    }

    pub fn get(&self) -> LaunchState {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set(&self, state: LaunchState) {
        let mut guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        tracing::debug!("Launch state {} -> {}", guard.as_str(), state.as_str());
        *guard = state;
    }
}

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Python script passed with `--python`. Relative paths resolve against
    /// the working directory.
    pub script: PathBuf,
    /// Arguments passed after `--`.
    pub args: Vec<String>,
    pub mode: LaunchMode,
}

impl LaunchRequest {
    pub fn interactive(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            args: Vec::new(),
            mode: LaunchMode::Interactive,
        }
    }

    pub fn batch(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            args: Vec::new(),
            mode: LaunchMode::Batch,
        }
    }

    /// Adds a script argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Result of a launch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// An interactive session survived the grace window.
    Running,
    /// A batch run finished.
    Completed {
        exit_code: Option<i32>,
        output: CapturedOutput,
    },
}

/// Configuration for the Blender orchestrator.
#[derive(Clone)]
pub struct OrchestratorConfig {
    /// How to find the executable.
    pub locator: ToolLocator,
    /// Working directory for the child; relative script paths resolve here.
    pub working_dir: PathBuf,
    /// Timeout for batch runs.
    pub timeout: Duration,
    /// Minimum lifetime of an interactive session.
    pub grace_period: Duration,
    /// Receives every output line.
    pub output_sink: Option<OutputSink>,
}

impl std::fmt::Debug for OrchestratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorConfig")
            .field("locator", &self.locator)
            .field("working_dir", &self.working_dir)
            .field("timeout", &self.timeout)
            .field("grace_period", &self.grace_period)
            .field("output_sink", &self.output_sink.is_some())
            .finish()
    }
}

impl OrchestratorConfig {
    /// Creates a config rooted at `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            locator: ToolLocator::new(),
            working_dir: working_dir.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            grace_period: Duration::from_secs(INTERACTIVE_GRACE_SECS),
            output_sink: None,
        }
    }

    /// Sets the executable locator.
    pub fn locator(mut self, locator: ToolLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Sets the batch timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the batch timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Sets the interactive grace window.
    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Sets the output line callback.
    pub fn output_sink(mut self, sink: OutputSink) -> Self {
        self.output_sink = Some(sink);
        self
    }
}

/// A running or finished launch.
pub struct LaunchHandle {
    state: StateCell,
    verdict: Receiver<BlenderResult<LaunchOutcome>>,
    tool: PathBuf,
    pid: u32,
}

impl LaunchHandle {
    pub fn state(&self) -> LaunchState {
        self.state.get()
    }

    /// A clone of the state cell that outlives the handle.
    pub fn state_cell(&self) -> StateCell {
        self.state.clone()
    }

    /// Executable that was started.
    pub fn tool(&self) -> &Path {
        &self.tool
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Blocks until the launch is decided: the grace window elapsed for
    /// interactive sessions, the process exited for batch runs.
    pub fn verdict(self) -> BlenderResult<LaunchOutcome> {
        self.verdict.recv().unwrap_or(Err(BlenderError::SupervisorLost))
    }
}

/// The Blender subprocess orchestrator.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Creates a new orchestrator with the given configuration.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Finds the executable the next launch would use.
    pub fn resolve_tool(&self) -> Resolution {
        self.config.locator.resolve()
    }

    /// Resolves a script path against the working directory.
    pub fn script_path(&self, script: &Path) -> PathBuf {
        if script.is_absolute() {
            script.to_path_buf()
        } else {
            self.config.working_dir.join(script)
        }
    }

    /// Starts the tool and returns immediately.
    ///
    /// # Command line
    ///
    /// `<tool> [--background] --python <script> [-- <args>]`
    pub fn launch(&self, request: LaunchRequest) -> BlenderResult<LaunchHandle> {
        let script = self.script_path(&request.script);
        if !script.is_file() {
            return Err(BlenderError::ScriptNotFound { path: script });
        }

        let tool = self.resolve_tool();
        let state = StateCell::new();
        state.set(LaunchState::Launching);

        let mut cmd = Command::new(&tool.path);
        if request.mode == LaunchMode::Batch {
            cmd.arg("--background");
        }
        cmd.arg("--python").arg(&script);
        if !request.args.is_empty() {
            cmd.arg("--").args(&request.args);
        }
        cmd.current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::info!(
            "Launching Blender ({:?}) from {} [{}] with {}",
            request.mode,
            tool.path.display(),
            tool.source.as_str(),
            script.display()
        );

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                state.set(LaunchState::FailedToStart);
                return Err(spawn_error(&tool, e));
            }
        };
        let pid = child.id();
        state.set(LaunchState::Running);

        let captured = SharedOutput::default();
        let readers = match start_readers(&mut child, self.config.output_sink.clone(), &captured)
        {
            Ok(readers) => readers,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                state.set(LaunchState::FailedToStart);
                return Err(BlenderError::Io(e));
            }
        };

        let (tx, rx) = mpsc::channel();
        let supervisor = Supervisor {
            child,
            mode: request.mode,
            timeout: self.config.timeout,
            grace: self.config.grace_period,
            state: state.clone(),
            readers,
            captured,
            verdict: tx,
        };
        std::thread::Builder::new()
            .name("blender-supervisor".to_string())
            .spawn(move || supervisor.run())?;

        Ok(LaunchHandle {
            state,
            verdict: rx,
            tool: tool.path,
            pid,
        })
    }

    /// Launches and waits for the verdict.
    pub fn run(&self, request: LaunchRequest) -> BlenderResult<LaunchOutcome> {
        self.launch(request)?.verdict()
    }
}

/// Maps a spawn failure to the error taxonomy.
pub(crate) fn spawn_error(tool: &Resolution, source: std::io::Error) -> BlenderError {
    match source.kind() {
        std::io::ErrorKind::NotFound if tool.is_fallback() => BlenderError::NotInstalled,
        std::io::ErrorKind::NotFound => BlenderError::PathInvalid {
            path: tool.path.clone(),
        },
        std::io::ErrorKind::PermissionDenied => BlenderError::PermissionDenied {
            path: tool.path.clone(),
            source,
        },
        _ => BlenderError::SpawnFailed {
            path: tool.path.clone(),
            source,
        },
    }
}

pub(crate) fn start_readers(
    child: &mut Child,
    sink: Option<OutputSink>,
    captured: &SharedOutput,
) -> std::io::Result<Vec<JoinHandle<()>>> {
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_reader(
            stdout,
            OutputStream::Stdout,
            sink.clone(),
            Arc::clone(captured),
        )?);
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_reader(
            stderr,
            OutputStream::Stderr,
            sink,
            Arc::clone(captured),
        )?);
    }
    Ok(readers)
}

pub(crate) fn join_readers(readers: Vec<JoinHandle<()>>) {
    for reader in readers {
        if reader.join().is_err() {
            tracing::warn!("Output reader thread panicked");
        }
    }
}

/// Polls until the child exits or `timeout` elapses. On timeout the child
/// is killed and reaped.
pub(crate) fn wait_with_timeout(child: &mut Child, timeout: Duration) -> BlenderResult<ExitStatus> {
    let start = Instant::now();
    loop {
        match child.try_wait()? {
            Some(status) => return Ok(status),
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BlenderError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        }
    }
}

/// Returns true for exit statuses treated as success.
pub(crate) fn is_clean_exit(status: &ExitStatus) -> bool {
    status.success() || status.code() == Some(BENIGN_EXIT_CODE)
}

struct Supervisor {
    child: Child,
    mode: LaunchMode,
    timeout: Duration,
    grace: Duration,
    state: StateCell,
    readers: Vec<JoinHandle<()>>,
    captured: SharedOutput,
    verdict: Sender<BlenderResult<LaunchOutcome>>,
}

impl Supervisor {
    fn run(self) {
        match self.mode {
            LaunchMode::Interactive => self.run_interactive(),
            LaunchMode::Batch => self.run_batch(),
        }
    }

    fn run_interactive(mut self) {
        let early = match wait_with_deadline(&mut self.child, self.grace) {
            Ok(early) => early,
            Err(e) => {
                self.state.set(LaunchState::ExitedUnexpectedly);
                let _ = self.verdict.send(Err(BlenderError::Io(e)));
                return;
            }
        };

        if let Some(status) = early {
            join_readers(self.readers);
            let output = take_output(&self.captured);
            tracing::warn!("Interactive Blender session exited early: {}", status);
            self.state.set(LaunchState::ExitedUnexpectedly);
            let _ = self.verdict.send(Err(BlenderError::ExitedEarly {
                exit_code: status.code(),
                grace_secs: self.grace.as_secs(),
                stderr: output.stderr_text(),
            }));
            return;
        }

        let _ = self.verdict.send(Ok(LaunchOutcome::Running));

        match self.child.wait() {
            Ok(status) => {
                join_readers(self.readers);
                tracing::info!("Blender session closed: {}", status);
                self.state.set(LaunchState::Completed);
            }
            Err(e) => {
                tracing::error!("Lost track of Blender session: {}", e);
                self.state.set(LaunchState::ExitedUnexpectedly);
            }
        }
    }

    fn run_batch(mut self) {
        let result = wait_with_timeout(&mut self.child, self.timeout);
        join_readers(self.readers);
        let output = take_output(&self.captured);

        let verdict = match result {
            Ok(status) if is_clean_exit(&status) => {
                self.state.set(LaunchState::Completed);
                Ok(LaunchOutcome::Completed {
                    exit_code: status.code(),
                    output,
                })
            }
            Ok(status) => {
                self.state.set(LaunchState::ExitedUnexpectedly);
                Err(BlenderError::exited_unexpectedly(
                    status.code(),
                    output.stderr_text(),
                ))
            }
            Err(e) => {
                self.state.set(LaunchState::ExitedUnexpectedly);
                Err(e)
            }
        };
        let _ = self.verdict.send(verdict);
    }
}

/// Waits up to `deadline` for the child to exit. `Ok(None)` means it is
/// still running.
fn wait_with_deadline(child: &mut Child, deadline: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= deadline {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
