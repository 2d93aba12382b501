//! Startup readiness checks.
//!
//! Eight ordered checks, each written to the session log as a step line.
//! Only the checks marked critical decide `all_critical_passed`; Blender,
//! permissions and the AI companion are advisory.

use std::path::PathBuf;
use std::time::Duration;

use charforge_backend_blender::{BlenderBridge, BlenderError, PROBE_TIMEOUT_SECS};
use charforge_scene::{minimal_triangle_glb, parse_scene_slice};
use serde::Serialize;

use crate::paths::AppPaths;
use crate::session_log::SessionLog;

/// Timeout for the optional companion probe.
pub const COMPANION_TIMEOUT_SECS: u64 = 2;

/// Conventional address of the local AI companion.
pub const DEFAULT_COMPANION_URL: &str = "http://localhost:5000/";

const PERMISSION_PROBE_FILE: &str = ".perm_test";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Skip,
}

impl CheckStatus {
    /// Tag used in summary lines.
    pub fn tag(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "OK",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
            CheckStatus::Skip => "SKIP",
        }
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

impl CheckResult {
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            message: message.into(),
            suggested_fix: None,
        }
    }

    pub fn fail(message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            message: message.into(),
            suggested_fix: Some(fix.into()),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warn,
            message: message.into(),
            suggested_fix: None,
        }
    }

    pub fn skip(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Skip,
            message: message.into(),
            suggested_fix: None,
        }
    }

    pub fn success(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    fn from_blender_error(err: &BlenderError) -> Self {
        let info = err.info();
        let message = match &info.detail {
            Some(detail) if !detail.is_empty() => format!("{} ({})", info.message, detail),
            _ => info.message.clone(),
        };
        Self {
            status: CheckStatus::Fail,
            message,
            suggested_fix: info.suggested_fix.clone(),
        }
    }
}

/// A check with its position and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCheck {
    pub step: usize,
    pub name: &'static str,
    pub critical: bool,
    #[serde(flatten)]
    pub result: CheckResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    pub all_critical_passed: bool,
    pub checks: Vec<NamedCheck>,
    pub summary_lines: Vec<String>,
    pub log_path: Option<PathBuf>,
}

impl ReadinessReport {
    pub fn check(&self, name: &str) -> Option<&NamedCheck> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &NamedCheck> {
        self.checks
            .iter()
            .filter(|c| c.result.status == CheckStatus::Fail)
    }
}

pub struct ReadinessEngine {
    paths: AppPaths,
    log: SessionLog,
    bridge: BlenderBridge,
    probe_timeout: Duration,
    companion_url: Option<String>,
}

impl ReadinessEngine {
    pub fn new(paths: AppPaths, log: SessionLog, bridge: BlenderBridge) -> Self {
        Self {
            paths,
            log,
            bridge,
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            companion_url: None,
        }
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Enables the AI companion check against `url`.
    pub fn companion_url(mut self, url: impl Into<String>) -> Self {
        self.companion_url = Some(url.into());
        self
    }

    /// Runs every check. Never fails; results are also logged.
    pub fn run(&self) -> ReadinessReport {
        self.log.info("Readiness check started");
        let mut checks = Vec::new();

        let mut record = |name: &'static str, critical: bool, result: CheckResult| {
            let step = checks.len() + 1;
            self.log_step(step, name, &result);
            checks.push(NamedCheck {
                step,
                name,
                critical,
                result,
            });
        };

        record("Runtime", true, check_runtime());
        record("Libraries", true, check_libraries());

        let installed = self.check_blender_installed();
        let runtime = if installed.success() {
            self.check_blender_runtime()
        } else {
            CheckResult::skip("Blender not available")
        };
        record("Blender installed", false, installed);
        record("Blender runtime", false, runtime);

        record(
            "Project assets",
            true,
            self.check_files(self.paths.required_assets(), "Restore the missing files under assets/"),
        );
        record(
            "Blender scripts",
            true,
            self.check_files(self.paths.required_scripts(), "Restore the scripts under tool_embed/"),
        );
        record("Access permissions", false, self.check_permissions());
        record("AI companion", false, self.check_companion());

        let all_critical_passed = checks
            .iter()
            .filter(|c| c.critical)
            .all(|c| c.result.success());
        let summary_lines = checks
            .iter()
            .map(|c| format!("Step {}: {} [{}]", c.step, c.name, c.result.status.tag()))
            .collect();

        if all_critical_passed {
            self.log.info("Readiness: all critical checks passed");
        } else {
            self.log.error("Readiness: critical checks failed");
        }
        tracing::info!("Readiness complete, critical passed: {}", all_critical_passed);

        ReadinessReport {
            all_critical_passed,
            checks,
            summary_lines,
            log_path: self.log.path(),
        }
    }

    fn log_step(&self, step: usize, name: &str, result: &CheckResult) {
        match result.status {
            CheckStatus::Pass => self.log.step_ok(step, name, Some(&result.message)),
            CheckStatus::Fail => {
                self.log
                    .step_fail(step, name, &result.message, result.suggested_fix.as_deref())
            }
            CheckStatus::Warn => self.log.step_warn(step, name, &result.message),
            CheckStatus::Skip => self.log.step_skip(step, name, &result.message),
        }
    }

    fn check_blender_installed(&self) -> CheckResult {
        match self.bridge.probe(self.probe_timeout) {
            Ok((tool, version)) => CheckResult::pass(format!(
                "Blender {} at {} ({})",
                version,
                tool.path.display(),
                tool.source.as_str()
            )),
            Err(e) => CheckResult::from_blender_error(&e),
        }
    }

    fn check_blender_runtime(&self) -> CheckResult {
        let script = &self.bridge.scripts().runtime_test;
        if !script.is_file() {
            return CheckResult::fail(
                format!("Runtime test script not found: {}", script.display()),
                "Restore tool_embed/blender_runtime_test.py",
            );
        }
        match self.bridge.run_runtime_test() {
            Ok(()) => CheckResult::pass("Blender ran the test script"),
            Err(e) => CheckResult::from_blender_error(&e),
        }
    }

    fn check_files(&self, files: Vec<PathBuf>, fix: &str) -> CheckResult {
        let missing: Vec<String> = files
            .iter()
            .filter(|p| !p.is_file())
            .map(|p| {
                p.strip_prefix(self.paths.base())
                    .unwrap_or(p)
                    .display()
                    .to_string()
            })
            .collect();
        if missing.is_empty() {
            CheckResult::pass(format!("{} files present", files.len()))
        } else {
            CheckResult::fail(format!("Missing: {}", missing.join(", ")), fix)
        }
    }

    fn check_permissions(&self) -> CheckResult {
        let probe = self.paths.base().join(PERMISSION_PROBE_FILE);
        let result = std::fs::write(&probe, b"ok")
            .and_then(|_| std::fs::read(&probe))
            .and_then(|_| std::fs::remove_file(&probe));
        match result {
            Ok(()) => CheckResult::pass(format!("Read/write in {}", self.paths.base().display())),
            Err(e) => CheckResult::warn(format!(
                "Cannot write in {}: {}",
                self.paths.base().display(),
                e
            )),
        }
    }

    fn check_companion(&self) -> CheckResult {
        let Some(url) = &self.companion_url else {
            return CheckResult::skip("Not configured");
        };
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(COMPANION_TIMEOUT_SECS))
            .build();
        match agent.get(url).call() {
            Ok(response) => CheckResult::pass(format!("{} responded {}", url, response.status())),
            Err(ureq::Error::Status(code, _)) => {
                CheckResult::pass(format!("{} responded {}", url, code))
            }
            Err(e) => CheckResult::warn(format!("{} not reachable (optional): {}", url, e)),
        }
    }
}

fn check_runtime() -> CheckResult {
    CheckResult::pass(format!(
        "charforge {} on {}/{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    ))
}

fn check_libraries() -> CheckResult {
    if let Err(e) = parse_scene_slice(&minimal_triangle_glb()) {
        return CheckResult::fail(
            format!("glTF parser failed on a known-good file: {}", e),
            "Reinstall charforge",
        );
    }
    if let Err(e) = serde_json::from_str::<serde_json::Value>(r#"{"probe": [1, true, null]}"#) {
        return CheckResult::fail(format!("JSON codec failed: {}", e), "Reinstall charforge");
    }
    CheckResult::pass("glTF and JSON available")
}

#[cfg(test)]
mod tests {
    use super::*;
    use charforge_backend_blender::{OrchestratorConfig, ToolLocator};
    use pretty_assertions::assert_eq;

    fn missing_tool_bridge(paths: &AppPaths) -> BlenderBridge {
        let locator = ToolLocator::new()
            .install_roots(Vec::new())
            .search_path(None)
            .command("charforge-test-missing-tool");
        BlenderBridge::new(
            OrchestratorConfig::new(paths.base()).locator(locator),
            paths.scripts(),
            paths.exports_dir(),
        )
    }

    fn populate(paths: &AppPaths) {
        for file in paths.required_assets().into_iter().chain(paths.required_scripts()) {
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, b"x").unwrap();
        }
    }

    #[test]
    fn test_missing_tool_is_advisory() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        populate(&paths);
        let log = SessionLog::in_memory();

        let report =
            ReadinessEngine::new(paths.clone(), log.clone(), missing_tool_bridge(&paths)).run();

        assert!(report.all_critical_passed);
        assert_eq!(
            report.summary_lines,
            vec![
                "Step 1: Runtime [OK]",
                "Step 2: Libraries [OK]",
                "Step 3: Blender installed [FAIL]",
                "Step 4: Blender runtime [SKIP]",
                "Step 5: Project assets [OK]",
                "Step 6: Blender scripts [OK]",
                "Step 7: Access permissions [OK]",
                "Step 8: AI companion [SKIP]",
            ]
        );
        let installed = report.check("Blender installed").unwrap();
        assert!(installed.result.suggested_fix.is_some());
        assert!(!dir.path().join(PERMISSION_PROBE_FILE).exists());

        let lines = log.session_lines();
        assert!(lines
            .iter()
            .any(|l| l.ends_with("Step 4: Blender runtime SKIP - Blender not available")));
        assert!(lines.iter().any(|l| l.starts_with("    -> ")));
    }

    #[test]
    fn test_missing_assets_are_critical() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        populate(&paths);
        std::fs::remove_file(paths.preview_image("skin")).unwrap();

        let bridge = missing_tool_bridge(&paths);
        let report = ReadinessEngine::new(paths.clone(), SessionLog::in_memory(), bridge).run();
        assert!(!report.all_critical_passed);

        let assets = report.check("Project assets").unwrap();
        assert_eq!(assets.result.status, CheckStatus::Fail);
        assert!(assets.result.message.contains("skin.png"));
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn test_unreachable_companion_warns() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(dir.path());
        populate(&paths);

        // nothing listens on port 9 locally
        let bridge = missing_tool_bridge(&paths);
        let report = ReadinessEngine::new(paths.clone(), SessionLog::in_memory(), bridge)
            .companion_url("http://127.0.0.1:9/")
            .run();
        let companion = report.check("AI companion").unwrap();
        assert_eq!(companion.result.status, CheckStatus::Warn);
        assert!(report.all_critical_passed);
    }

    #[test]
    fn test_libraries_probe() {
        assert!(check_libraries().success());
    }
}
