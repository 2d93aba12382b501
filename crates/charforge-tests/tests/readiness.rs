//! Readiness checks against scratch projects with a stand-in Blender.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p charforge-tests --test readiness
//! ```

#![cfg(unix)]

use std::time::Duration;

use charforge_core::{CheckStatus, ReadinessEngine, ReadinessReport};
use charforge_tests::fixtures::{ProjectFixture, FAKE_BLENDER};
use pretty_assertions::assert_eq;

fn run(fixture: &ProjectFixture) -> ReadinessReport {
    let services = fixture.services();
    ReadinessEngine::new(fixture.paths.clone(), services.log.clone(), services.blender())
        .probe_timeout(Duration::from_secs(10))
        .run()
}

fn status(report: &ReadinessReport, name: &str) -> CheckStatus {
    report
        .check(name)
        .unwrap_or_else(|| panic!("no check named {}", name))
        .result
        .status
}

#[test]
fn installed_tool_with_missing_runtime_script_is_advisory() {
    let fixture = ProjectFixture::populated();
    fixture.install_fake_blender(FAKE_BLENDER);

    let report = run(&fixture);

    assert_eq!(status(&report, "Blender installed"), CheckStatus::Pass);
    assert_eq!(status(&report, "Blender runtime"), CheckStatus::Fail);
    assert!(report.all_critical_passed);
    assert_eq!(report.summary_lines[2], "Step 3: Blender installed [OK]");
    assert_eq!(report.summary_lines[3], "Step 4: Blender runtime [FAIL]");
    let runtime = report.check("Blender runtime").expect("runtime check");
    assert!(runtime.result.message.contains("blender_runtime_test.py"));
}

#[test]
fn fully_provisioned_project_passes_everything() {
    let fixture = ProjectFixture::populated();
    fixture.add_runtime_test();
    fixture.install_fake_blender(FAKE_BLENDER);

    let report = run(&fixture);

    assert!(report.all_critical_passed);
    assert_eq!(report.failures().count(), 0);
    assert_eq!(
        report.summary_lines,
        vec![
            "Step 1: Runtime [OK]",
            "Step 2: Libraries [OK]",
            "Step 3: Blender installed [OK]",
            "Step 4: Blender runtime [OK]",
            "Step 5: Project assets [OK]",
            "Step 6: Blender scripts [OK]",
            "Step 7: Access permissions [OK]",
            "Step 8: AI companion [SKIP]",
        ]
    );
    let installed = report.check("Blender installed").expect("installed check");
    assert!(installed.result.message.contains("4.1.0"));
}

#[test]
fn tool_that_cannot_run_the_script_fails_runtime_only() {
    let fixture = ProjectFixture::populated();
    fixture.add_runtime_test();
    fixture.install_fake_blender(
        "case \"$1\" in --version) echo 'Blender 3.6.2'; exit 0 ;; esac\necho 'no sentinel here'\nexit 0",
    );

    let report = run(&fixture);

    assert_eq!(status(&report, "Blender installed"), CheckStatus::Pass);
    assert_eq!(status(&report, "Blender runtime"), CheckStatus::Fail);
    assert!(report.all_critical_passed);
}

#[test]
fn missing_script_fails_critical_step() {
    let fixture = ProjectFixture::populated();
    std::fs::remove_file(fixture.paths.scripts().export).expect("remove export script");

    let report = run(&fixture);

    assert!(!report.all_critical_passed);
    let scripts = report.check("Blender scripts").expect("scripts check");
    assert_eq!(scripts.result.status, CheckStatus::Fail);
    assert!(scripts.result.message.contains("export_fbx.py"));
    assert!(scripts.result.suggested_fix.is_some());
}

#[test]
fn readiness_steps_are_written_to_the_session_log() {
    let fixture = ProjectFixture::populated();
    let services = fixture.services();
    ReadinessEngine::new(fixture.paths.clone(), services.log.clone(), services.blender())
        .probe_timeout(Duration::from_secs(10))
        .run();

    let lines = services.log.session_lines();
    assert!(lines.iter().any(|l| l.contains("Step 1: Runtime")));
    assert!(lines.iter().any(|l| l.contains("Step 8: AI companion")));
}
