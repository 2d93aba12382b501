//! charforge Blender Bridge
//!
//! This crate drives Blender as an external subprocess for the operations
//! the character editor cannot do itself: interactive sculpting, FBX export
//! and a runtime smoke test.
//!
//! # Architecture
//!
//! 1. **Locator** - finds the executable (configured path, install roots,
//!    `PATH`, bare command)
//! 2. **Orchestrator** - spawns the process, supervises it on a background
//!    thread and classifies failures
//! 3. **Python scripts** - run inside Blender and read the hand-off file
//!
//! Parameters travel one way through a JSON hand-off file written before
//! every launch that needs it.
//!
//! # Failures
//!
//! Every [`BlenderError`] has a stable code (`BLENDER_001`…) and converts to
//! a [`BlenderErrorInfo`] with a user-facing category, the captured output
//! as detail and a suggested fix.

pub mod bridge;
pub mod capture;
pub mod error;
pub mod handoff;
pub mod locate;
pub mod orchestrator;
pub mod probe;

pub use bridge::{BlenderBridge, ScriptPaths, RUNTIME_SENTINEL};
pub use capture::{classify_output_line, CapturedOutput, LineClass, OutputLine, OutputSink, OutputStream};
pub use error::{BlenderError, BlenderErrorCode, BlenderErrorInfo, BlenderResult};
pub use handoff::{HandoffFile, HandoffPayload, HandoffSink};
pub use locate::{platform_install_roots, InstallRoot, Resolution, ResolutionSource, ToolLocator};
pub use orchestrator::{
    LaunchHandle, LaunchMode, LaunchOutcome, LaunchRequest, LaunchState, Orchestrator,
    OrchestratorConfig, StateCell, DEFAULT_TIMEOUT_SECS, INTERACTIVE_GRACE_SECS,
};
pub use probe::{parse_version, probe_version, ToolVersion, PROBE_TIMEOUT_SECS};
