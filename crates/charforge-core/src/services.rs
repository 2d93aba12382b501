//! Long-lived collaborators shared by the character system and diagnostics.

use std::sync::Arc;
use std::time::Duration;

use charforge_backend_blender::{
    classify_output_line, BlenderBridge, HandoffFile, HandoffSink, LineClass, OrchestratorConfig,
    OutputLine, OutputSink, OutputStream, ToolLocator,
};

use crate::config_store::ConfigStore;
use crate::debounce::HANDOFF_DEBOUNCE_MS;
use crate::paths::AppPaths;
use crate::preset_store::PresetStore;
use crate::session_log::SessionLog;
use crate::transform::TransformPolicy;

/// Services constructed once at startup and passed down.
#[derive(Clone)]
pub struct Services {
    pub paths: AppPaths,
    pub config: ConfigStore,
    pub presets: PresetStore,
    pub log: SessionLog,
    handoff: Arc<dyn HandoffSink>,
    bridge: Option<BlenderBridge>,
    policy: TransformPolicy,
    debounce: Duration,
}

impl Services {
    /// Standard services for `paths`, logging to `log`.
    pub fn new(paths: AppPaths, log: SessionLog) -> Self {
        Self {
            config: ConfigStore::new(paths.config_file()),
            presets: PresetStore::new(paths.presets_dir()),
            handoff: Arc::new(HandoffFile::new(paths.handoff_file())),
            bridge: None,
            policy: TransformPolicy::default(),
            debounce: Duration::from_millis(HANDOFF_DEBOUNCE_MS),
            paths,
            log,
        }
    }

    /// Standard services with the session log at `error_log.txt`.
    pub fn open(paths: AppPaths) -> Self {
        let log = SessionLog::open(&paths.session_log());
        Self::new(paths, log)
    }

    pub fn handoff(mut self, sink: Arc<dyn HandoffSink>) -> Self {
        self.handoff = sink;
        self
    }

    /// Uses `bridge` instead of building one from the config.
    pub fn with_bridge(mut self, bridge: BlenderBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn transform_policy(mut self, policy: TransformPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    pub fn handoff_sink(&self) -> &Arc<dyn HandoffSink> {
        &self.handoff
    }

    pub fn policy(&self) -> TransformPolicy {
        self.policy
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debounce
    }

    /// The bridge to use for the next operation.
    ///
    /// Built from the current config on each call so a changed tool path
    /// takes effect without a restart.
    pub fn blender(&self) -> BlenderBridge {
        if let Some(bridge) = &self.bridge {
            return bridge.clone();
        }
        let config = self.config.load();
        let orchestrator = OrchestratorConfig::new(self.paths.base())
            .locator(ToolLocator::new().configured(config.tool_path()))
            .output_sink(session_output_sink(self.log.clone()));
        BlenderBridge::new(orchestrator, self.paths.scripts(), self.paths.exports_dir())
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("paths", &self.paths)
            .field("policy", &self.policy)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

/// Forwards tool output into the session log, flagging error lines.
pub fn session_output_sink(log: SessionLog) -> OutputSink {
    Arc::new(move |line: &OutputLine| {
        let prefix = match line.stream {
            OutputStream::Stdout => "[blender]",
            OutputStream::Stderr => "[blender:stderr]",
        };
        match classify_output_line(&line.text) {
            LineClass::Error(code) => log.error(format!("{} {} ({})", prefix, line.text, code)),
            LineClass::Warning | LineClass::Info => log.info(format!("{} {}", prefix, line.text)),
        }
    })
}
