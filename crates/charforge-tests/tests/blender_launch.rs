//! Blender launch tests driven through the character system.
//!
//! Stand-in tools are small shell scripts, so these tests only run on Unix.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p charforge-tests --test blender_launch
//! ```

#![cfg(unix)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use charforge_backend_blender::{
    BlenderBridge, BlenderErrorCode, LaunchOutcome, LaunchRequest, Orchestrator,
    OrchestratorConfig, ToolLocator,
};
use charforge_core::{CharacterSystem, CoreError};
use charforge_tests::fixtures::{Calls, HostCall, ProjectFixture, RecordingSink, FAKE_BLENDER};
use pretty_assertions::assert_eq;

const GRACE: Duration = Duration::from_millis(300);

/// Orchestrator settings that only ever run `tool`.
fn pinned_config(fixture: &ProjectFixture, tool: PathBuf) -> OrchestratorConfig {
    OrchestratorConfig::new(fixture.path())
        .locator(
            ToolLocator::new()
                .install_roots(Vec::new())
                .search_path(None)
                .configured(Some(tool)),
        )
        .grace_period(GRACE)
        .timeout(Duration::from_secs(20))
}

fn pinned_bridge(fixture: &ProjectFixture, tool: PathBuf) -> BlenderBridge {
    BlenderBridge::new(
        pinned_config(fixture, tool),
        fixture.paths.scripts(),
        fixture.paths.exports_dir(),
    )
}

fn system_with_tool(
    fixture: &ProjectFixture,
    body: &str,
) -> (CharacterSystem, Calls, Arc<RecordingSink>) {
    let tool = fixture.install_fake_blender(body);
    let sink = RecordingSink::new();
    let services = fixture
        .services()
        .handoff(sink.clone())
        .with_bridge(pinned_bridge(fixture, tool));
    let (system, calls) = fixture.system(services);
    (system, calls, sink)
}

fn tool_errors(calls: &Calls) -> Vec<BlenderErrorCode> {
    calls
        .borrow()
        .iter()
        .filter_map(|call| match call {
            HostCall::ToolError(info) => Some(info.code),
            _ => None,
        })
        .collect()
}

#[test]
fn sculpt_session_closing_inside_grace_window_is_reported() {
    let fixture = ProjectFixture::populated();
    let (mut system, calls, sink) = system_with_tool(&fixture, "exit 0");
    system.update_sculpt_value("height", 70);

    let handle = system.sculpt().expect("tool starts");
    assert!(!system.await_launch(handle));

    assert_eq!(
        tool_errors(&calls),
        vec![BlenderErrorCode::ProcessExitedUnexpectedly]
    );
    // The hand-off is written before the launch, not left to the debounce.
    let writes = sink.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].params.get("height"), Some(&70));
}

#[test]
fn sculpt_session_that_stays_open_is_accepted() {
    let fixture = ProjectFixture::populated();
    let (mut system, calls, _) = system_with_tool(&fixture, "exec sleep 2");

    let handle = system.create_auto_rig().expect("tool starts");
    assert!(system.await_launch(handle));
    assert!(tool_errors(&calls).is_empty());
}

#[test]
fn sculpt_without_script_reports_script_not_found() {
    let fixture = ProjectFixture::new();
    let (mut system, calls, sink) = system_with_tool(&fixture, "exec sleep 2");

    assert!(system.sculpt().is_none());
    assert_eq!(tool_errors(&calls), vec![BlenderErrorCode::ScriptNotFound]);
    assert_eq!(sink.writes().len(), 1);
}

#[test]
fn export_writes_fbx_and_saves_preset() {
    let fixture = ProjectFixture::populated();
    let (mut system, calls, _) = system_with_tool(&fixture, FAKE_BLENDER);
    system.update_sculpt_value("leg_length", 81);

    let path = system.export_model("hero").expect("export succeeds");
    assert_eq!(path, fixture.paths.exports_dir().join("hero.fbx"));
    assert!(path.is_file());
    assert!(tool_errors(&calls).is_empty());

    let preset = fixture.services().presets.try_load("hero").expect("preset saved");
    assert_eq!(preset.sculpt_data.get("leg_length"), Some(&81));

    let dest = tempfile::tempdir().expect("temp dir");
    let copied = system.copy_export("hero", dest.path()).expect("copy succeeds");
    assert_eq!(copied, dest.path().join("hero.fbx"));
    assert!(copied.is_file());
}

#[test]
fn failing_export_reports_error_and_keeps_preset() {
    let fixture = ProjectFixture::populated();
    let (mut system, calls, _) =
        system_with_tool(&fixture, "echo 'Error: bpy exploded' >&2\nexit 3");

    let err = system.export_model("broken").expect_err("export fails");
    assert!(matches!(err, CoreError::Blender(_)));
    assert_eq!(
        tool_errors(&calls),
        vec![BlenderErrorCode::ProcessExitedUnexpectedly]
    );
    assert!(fixture.services().presets.exists("broken"));
    assert!(!fixture.paths.exports_dir().join("broken.fbx").exists());
}

#[test]
fn export_that_writes_nothing_is_an_error() {
    let fixture = ProjectFixture::populated();
    let (mut system, _, _) = system_with_tool(&fixture, "exit 0");

    let err = system.export_model("ghost").expect_err("no output");
    assert!(err.to_string().contains("ghost.fbx"));
}

#[test]
fn copy_to_missing_directory_is_path_invalid() {
    let fixture = ProjectFixture::populated();
    let (mut system, calls, _) = system_with_tool(&fixture, FAKE_BLENDER);
    system.export_model("hero").expect("export succeeds");

    let missing = fixture.path().join("no").join("such").join("dir");
    assert!(system.copy_export("hero", &missing).is_err());
    assert_eq!(tool_errors(&calls), vec![BlenderErrorCode::PathInvalid]);
}

#[test]
fn batch_run_exiting_zero_completes() {
    let fixture = ProjectFixture::populated();
    let tool = fixture.install_fake_blender("echo \"args: $*\"\nexit 0");
    let orchestrator = Orchestrator::with_config(pinned_config(&fixture, tool));

    let outcome = orchestrator
        .run(LaunchRequest::batch(fixture.paths.scripts().export).arg("hero"))
        .expect("batch run succeeds");
    match outcome {
        LaunchOutcome::Completed { exit_code, output } => {
            assert_eq!(exit_code, Some(0));
            assert!(output.stdout_text().contains("--background"));
            assert!(output.stdout_text().contains("-- hero"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn configured_tool_output_reaches_session_log() {
    let fixture = ProjectFixture::populated();
    fixture.add_runtime_test();
    fixture.install_fake_blender(FAKE_BLENDER);
    let services = fixture.services();

    services
        .blender()
        .run_runtime_test()
        .expect("runtime test passes");

    let lines = services.log.session_lines();
    assert!(
        lines.iter().any(|l| l.contains("[blender] BLENDER_RUNTIME_OK")),
        "log was {:?}",
        lines
    );
}
