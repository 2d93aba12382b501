//! Character system: owns the state and fans every change out to the
//! viewport and the hand-off file.
//!
//! Every mutating call updates [`CharacterState`], refreshes the viewport
//! immediately and schedules a debounced hand-off write. No call lets an
//! error escape except [`CharacterSystem::export_model`] and
//! [`CharacterSystem::copy_export`]; everything else logs and degrades.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use charforge_backend_blender::{BlenderError, BlenderResult, HandoffPayload, LaunchHandle};
use charforge_scene::{load_scene, validate_model};
use charforge_spec::{CharacterState, Gender, MaterialData, ParamSchema};
use glam::Vec3;

use crate::debounce::DebounceTimer;
use crate::error::CoreResult;
use crate::policy::{classify_load, LoadDecision};
use crate::preview::{image_plan, PreviewPlan};
use crate::services::Services;
use crate::transform::SculptTransform;
use crate::viewport::{Notifier, Viewport};

/// Preset loaded at startup when present.
pub const DEFAULT_PRESET: &str = "default";

#[derive(Debug, Clone)]
struct ActiveModel {
    path: PathBuf,
    pivot: Vec3,
    decision: LoadDecision,
}

pub struct CharacterSystem {
    services: Services,
    state: CharacterState,
    viewport: Box<dyn Viewport>,
    notifier: Box<dyn Notifier>,
    debounce: DebounceTimer,
    model: Option<ActiveModel>,
}

impl CharacterSystem {
    pub fn new(services: Services, viewport: Box<dyn Viewport>, notifier: Box<dyn Notifier>) -> Self {
        let schema = ParamSchema::load_or_builtin(&services.paths.body_parameters());
        let mut state = CharacterState::new(schema);
        state.set_nsfw(services.config.load().nsfw_enabled);
        let debounce = DebounceTimer::new(services.debounce_delay());
        Self {
            services,
            state,
            viewport,
            notifier,
            debounce,
            model: None,
        }
    }

    /// Loads the `default` preset if one exists, else the configured base model.
    pub fn startup(&mut self) {
        self.services.log.info("Character system started");
        if self.services.presets.exists(DEFAULT_PRESET) {
            self.load_preset(DEFAULT_PRESET);
        } else {
            let gender = self.services.config.load().gender;
            if !self.load_base_model(gender) {
                self.show_fallback();
            }
        }
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Path of the model currently shown, if any.
    pub fn active_model_path(&self) -> Option<&Path> {
        self.model.as_ref().map(|m| m.path.as_path())
    }

    /// Load decision for the active model.
    pub fn load_decision(&self) -> Option<&LoadDecision> {
        self.model.as_ref().map(|m| &m.decision)
    }

    /// `assets/characters/{gender}_base.glb` for the configured gender.
    pub fn current_model_path(&self) -> PathBuf {
        self.services
            .paths
            .base_model(self.services.config.load().gender)
    }

    /// True when the active model passed validation with a rig.
    pub fn is_current_model_rigged(&self) -> bool {
        self.model
            .as_ref()
            .is_some_and(|m| m.decision.allows_deformation())
    }

    // =====================================================================
    // Sculpt
    // =====================================================================

    /// Sets a sculpt value and returns the stored (clamped) value.
    pub fn update_sculpt_value(&mut self, key: &str, value: i32) -> i32 {
        let stored = self.state.set_sculpt(key, value);
        tracing::debug!("Sculpt {} = {}", key, stored);
        self.apply_transform();
        self.schedule_handoff();
        stored
    }

    /// Whole-model transform for the active model. Rigged or not, any model
    /// that was not blocked gets one.
    pub fn current_transform(&self) -> Option<SculptTransform> {
        let model = self.model.as_ref()?;
        if !model.decision.allows_transform() {
            return None;
        }
        Some(
            self.services
                .policy()
                .compute(self.state.sculpt(), model.pivot),
        )
    }

    fn apply_transform(&mut self) {
        match self.current_transform() {
            Some(transform) => self
                .viewport
                .apply_sculpt_transform(self.state.sculpt(), &transform),
            None => self.viewport.refresh_view(),
        }
    }

    // =====================================================================
    // Models
    // =====================================================================

    /// Persists the gender and loads its base model.
    pub fn set_gender(&mut self, gender: Gender) -> bool {
        if let Err(e) = self.services.config.update(|c| c.gender = gender) {
            self.services.log.log_error("Saving gender", &e);
        }
        self.load_base_model(gender)
    }

    /// Loads the base model for `gender`. A missing file is a logged no-op.
    pub fn load_base_model(&mut self, gender: Gender) -> bool {
        let path = self.services.paths.base_model(gender);
        if !path.is_file() {
            self.services
                .log
                .info(format!("Base model not found: {}", path.display()));
            return false;
        }
        self.load_model(&path)
    }

    /// Validates and shows a model file.
    ///
    /// Validation never prevents display. Its outcome decides which warning
    /// the notifier gets and whether the model counts as rigged. If
    /// the file cannot be parsed the viewport falls back to an anatomy
    /// illustration.
    pub fn load_model(&mut self, path: &Path) -> bool {
        let validation = validate_model(path);
        let decision = classify_load(&validation);
        match &decision {
            LoadDecision::ProceedSilently => {}
            LoadDecision::ProceedWithWarning(msg) => {
                self.services
                    .log
                    .info(format!("Model warning for {}: {}", path.display(), msg));
                self.notifier.model_warning(msg);
            }
            LoadDecision::Block(msg) => {
                self.services
                    .log
                    .error(format!("Model rejected {}: {}", path.display(), msg));
                self.notifier.model_warning(msg);
            }
        }

        let Some(scene) = load_scene(path) else {
            self.services
                .log
                .error(format!("GLB load failed: {}", path.display()));
            self.model = None;
            self.show_fallback();
            return false;
        };

        let pivot = scene
            .world_bounds()
            .map(|b| b.center())
            .unwrap_or(Vec3::ZERO);
        self.viewport.load_preview(path);
        self.model = Some(ActiveModel {
            path: path.to_path_buf(),
            pivot,
            decision,
        });
        self.services
            .log
            .info(format!("Loaded model {}", path.display()));
        self.apply_transform();
        true
    }

    /// Reloads the active model, or the configured base model if none.
    fn reload_model(&mut self) {
        let path = self
            .model
            .as_ref()
            .map(|m| m.path.clone())
            .unwrap_or_else(|| self.current_model_path());
        if path.is_file() {
            self.load_model(&path);
        } else {
            self.model = None;
            self.show_fallback();
        }
    }

    /// What the viewport should currently show.
    pub fn preview_plan(&self) -> PreviewPlan {
        match &self.model {
            Some(model) => PreviewPlan::Model {
                path: model.path.clone(),
                transform: self.current_transform(),
            },
            None => image_plan(&self.services.paths, self.state.anatomy()),
        }
    }

    fn show_fallback(&mut self) {
        match image_plan(&self.services.paths, self.state.anatomy()) {
            PreviewPlan::Image { path } => self.viewport.load_preview(&path),
            PreviewPlan::Placeholder { reason } => {
                self.services.log.info(reason);
                self.viewport.refresh_view();
            }
            PreviewPlan::Model { .. } => {}
        }
    }

    // =====================================================================
    // Layers and materials
    // =====================================================================

    fn refresh_layers(&mut self) {
        self.viewport
            .update_preview(self.state.anatomy(), self.state.assets());
        if self.model.is_none() {
            self.show_fallback();
        }
        self.schedule_handoff();
    }

    /// Toggles an anatomy layer. Unknown layers are ignored.
    pub fn update_anatomy_layer(&mut self, layer: &str, enabled: bool) -> bool {
        if !self.state.set_anatomy(layer, enabled) {
            tracing::debug!("Ignoring unknown anatomy layer '{}'", layer);
            return false;
        }
        self.refresh_layers();
        true
    }

    /// Adds an asset. `None` adds the category's demo asset.
    pub fn add_asset(&mut self, category: &str, path: Option<&str>) -> bool {
        if !self.state.add_asset(category, path) {
            tracing::debug!("Ignoring unknown asset category '{}'", category);
            return false;
        }
        self.refresh_layers();
        true
    }

    pub fn set_material_color(&mut self, key: &str, hex: &str) -> bool {
        match self.state.set_material_color(key, hex) {
            Ok(true) => {
                self.refresh_layers();
                true
            }
            Ok(false) => {
                tracing::debug!("Ignoring unknown material '{}'", key);
                false
            }
            Err(e) => {
                self.services.log.info(format!("Material {}: {}", key, e));
                false
            }
        }
    }

    pub fn set_material(&mut self, key: &str, material: MaterialData) -> bool {
        if !self.state.set_material(key, material) {
            tracing::debug!("Ignoring unknown material '{}'", key);
            return false;
        }
        self.refresh_layers();
        true
    }

    /// Sets the explicit-content flag and persists it.
    pub fn set_nsfw(&mut self, enabled: bool) {
        self.state.set_nsfw(enabled);
        if let Err(e) = self.services.config.update(|c| c.nsfw_enabled = enabled) {
            self.services.log.log_error("Saving NSFW setting", &e);
        }
        self.refresh_layers();
    }

    pub fn set_physics_flag(&mut self, key: &str, enabled: bool) -> bool {
        if !self.state.set_physics(key, enabled) {
            tracing::debug!("Ignoring unknown physics flag '{}'", key);
            return false;
        }
        self.viewport.refresh_view();
        self.schedule_handoff();
        true
    }

    // =====================================================================
    // Presets
    // =====================================================================

    pub fn save_preset(&mut self, name: &str) -> bool {
        match self.services.presets.save(name, &self.state.snapshot()) {
            Ok(path) => {
                self.services.log.info(format!(
                    "Saved preset '{}' to {}",
                    name,
                    path.display()
                ));
                true
            }
            Err(e) => {
                self.services.log.log_error("Saving preset", &e);
                false
            }
        }
    }

    /// Merges a saved preset into the state. Returns false, leaving the
    /// state untouched, if the preset cannot be read.
    pub fn load_preset(&mut self, name: &str) -> bool {
        let preset = match self.services.presets.try_load(name) {
            Ok(preset) => preset,
            Err(e) => {
                self.services.log.log_error("Loading preset", &e);
                return false;
            }
        };

        for warning in self.state.apply_preset(&preset) {
            self.services
                .log
                .info(format!("Preset '{}': {}", name, warning));
        }
        self.services.log.info(format!("Loaded preset '{}'", name));

        self.notifier.sync_sliders();
        self.notifier.sync_anatomy();
        self.reload_model();
        self.viewport
            .update_preview(self.state.anatomy(), self.state.assets());
        self.schedule_handoff();
        true
    }

    // =====================================================================
    // External tool
    // =====================================================================

    /// Current hand-off contents.
    pub fn handoff_payload(&self) -> HandoffPayload {
        let character = match &self.model {
            Some(model) => Some(model.path.clone()),
            None => Some(self.current_model_path()).filter(|p| p.is_file()),
        };
        HandoffPayload::new(self.state.sculpt().to_flat(), character.as_deref())
    }

    fn schedule_handoff(&self) {
        let payload = self.handoff_payload();
        let sink = Arc::clone(self.services.handoff_sink());
        let log = self.services.log.clone();
        self.debounce.schedule(move || {
            if let Err(e) = sink.write(&payload) {
                tracing::error!("Hand-off write failed: {}", e);
                log.log_error("Hand-off write failed", &e);
            }
        });
    }

    /// Writes the hand-off now, replacing any pending debounced write.
    ///
    /// A debounced write already in progress finishes first, so this one
    /// always lands last.
    pub fn write_handoff_now(&self) -> BlenderResult<()> {
        let payload = self.handoff_payload();
        let sink = self.services.handoff_sink();
        self.debounce.run_now(|| sink.write(&payload))
    }

    /// Runs a pending debounced write immediately.
    pub fn flush_handoff(&self) -> bool {
        self.debounce.flush()
    }

    fn report_tool_error(&mut self, err: &BlenderError) {
        let info = err.info();
        tracing::error!("{}: {}", err.code(), err);
        self.services.log.log_error(err.code(), err);
        if let Some(fix) = &info.suggested_fix {
            self.services.log.raw(format!("    -> {}", fix));
        }
        self.notifier.tool_error(&info);
    }

    /// Writes the hand-off and opens an interactive sculpt session.
    ///
    /// Launch failures go to the notifier. A session that exits during its
    /// grace window is only detected by [`CharacterSystem::await_launch`].
    pub fn sculpt(&mut self) -> Option<LaunchHandle> {
        if let Err(e) = self.write_handoff_now() {
            self.report_tool_error(&e);
            return None;
        }
        match self.services.blender().launch_sculpt() {
            Ok(handle) => {
                self.services.log.info(format!(
                    "Sculpt session started: {} (pid {})",
                    handle.tool().display(),
                    handle.pid()
                ));
                Some(handle)
            }
            Err(e) => {
                self.report_tool_error(&e);
                None
            }
        }
    }

    /// Auto-rigging happens inside the sculpt session.
    pub fn create_auto_rig(&mut self) -> Option<LaunchHandle> {
        self.sculpt()
    }

    /// Waits for a launch verdict and reports a failure to the notifier.
    pub fn await_launch(&mut self, handle: LaunchHandle) -> bool {
        match handle.verdict() {
            Ok(_) => true,
            Err(e) => {
                self.report_tool_error(&e);
                false
            }
        }
    }

    /// Saves a preset named `name`, then exports `exports/<name>.fbx`.
    pub fn export_model(&mut self, name: &str) -> CoreResult<PathBuf> {
        if let Err(e) = self.services.presets.save(name, &self.state.snapshot()) {
            self.services.log.log_error("Saving preset before export", &e);
            return Err(e);
        }
        if let Err(e) = self.write_handoff_now() {
            self.report_tool_error(&e);
            return Err(e.into());
        }
        match self.services.blender().export_fbx(name) {
            Ok(path) => {
                self.services
                    .log
                    .info(format!("Exported {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                self.report_tool_error(&e);
                Err(e.into())
            }
        }
    }

    /// Copies `exports/<name>.fbx` into `dest_dir`.
    pub fn copy_export(&mut self, name: &str, dest_dir: &Path) -> CoreResult<PathBuf> {
        match self.services.blender().copy_export(name, dest_dir) {
            Ok(path) => {
                self.services
                    .log
                    .info(format!("Copied export to {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                self.report_tool_error(&e);
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for CharacterSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterSystem")
            .field("services", &self.services)
            .field("state", &self.state)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::time::Duration;

    use charforge_backend_blender::{
        BlenderBridge, BlenderErrorInfo, HandoffSink, OrchestratorConfig, ToolLocator,
    };
    use charforge_scene::GlbFixture;
    use charforge_spec::KeyedMap;
    use pretty_assertions::assert_eq;

    use crate::paths::AppPaths;
    use crate::session_log::SessionLog;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Load(PathBuf),
        Refresh,
        Update,
        Transform(f32),
        SyncSliders,
        SyncAnatomy,
        ToolError(String),
        Warning(String),
    }

    type Calls = Rc<RefCell<Vec<Call>>>;

    struct FakeViewport(Calls);

    impl Viewport for FakeViewport {
        fn load_preview(&mut self, path: &Path) {
            self.0.borrow_mut().push(Call::Load(path.to_path_buf()));
        }
        fn refresh_view(&mut self) {
            self.0.borrow_mut().push(Call::Refresh);
        }
        fn update_preview(&mut self, _: &KeyedMap<bool>, _: &KeyedMap<Vec<String>>) {
            self.0.borrow_mut().push(Call::Update);
        }
        fn apply_sculpt_transform(&mut self, _: &KeyedMap<i32>, t: &SculptTransform) {
            self.0.borrow_mut().push(Call::Transform(t.scale));
        }
    }

    struct FakeNotifier(Calls);

    impl Notifier for FakeNotifier {
        fn sync_sliders(&mut self) {
            self.0.borrow_mut().push(Call::SyncSliders);
        }
        fn sync_anatomy(&mut self) {
            self.0.borrow_mut().push(Call::SyncAnatomy);
        }
        fn tool_error(&mut self, info: &BlenderErrorInfo) {
            self.0.borrow_mut().push(Call::ToolError(info.code.to_string()));
        }
        fn model_warning(&mut self, message: &str) {
            self.0.borrow_mut().push(Call::Warning(message.to_string()));
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<HandoffPayload>>);

    impl HandoffSink for RecordingSink {
        fn write(&self, payload: &HandoffPayload) -> BlenderResult<()> {
            self.0.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        calls: Calls,
        sink: Arc<RecordingSink>,
        system: CharacterSystem,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let calls: Calls = Rc::default();
        let sink = Arc::new(RecordingSink::default());
        let services = Services::new(AppPaths::new(dir.path()), SessionLog::in_memory())
            .handoff(sink.clone())
            .debounce(Duration::from_secs(60));
        let system = CharacterSystem::new(
            services,
            Box::new(FakeViewport(calls.clone())),
            Box::new(FakeNotifier(calls.clone())),
        );
        Harness {
            dir,
            calls,
            sink,
            system,
        }
    }

    fn write_model(paths: &AppPaths, gender: Gender, fixture: GlbFixture) -> PathBuf {
        let path = paths.base_model(gender);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, fixture.build()).unwrap();
        path
    }

    fn writes(h: &Harness) -> Vec<HandoffPayload> {
        h.sink.0.lock().unwrap().clone()
    }

    #[test]
    fn test_sculpt_update_is_debounced() {
        let mut h = harness();
        for v in [10, 20, 30] {
            h.system.update_sculpt_value("height", v);
        }
        assert!(writes(&h).is_empty());
        assert!(h.system.flush_handoff());

        let written = writes(&h);
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].params.get("height"), Some(&30));
        assert_eq!(written[0].character_path, None);
    }

    #[test]
    fn test_sculpt_without_model_refreshes() {
        let mut h = harness();
        assert_eq!(h.system.update_sculpt_value("height", 150), 100);
        assert_eq!(*h.calls.borrow(), vec![Call::Refresh]);
    }

    #[test]
    fn test_rigged_model_gets_transform() {
        let mut h = harness();
        let paths = h.system.services().paths.clone();
        let model = write_model(&paths, Gender::Male, GlbFixture::triangle().skinned());

        assert!(h.system.load_base_model(Gender::Male));
        assert!(h.system.is_current_model_rigged());
        h.system.update_sculpt_value("height", 80);

        let calls = h.calls.borrow().clone();
        assert_eq!(calls[0], Call::Load(model.clone()));
        match calls.last() {
            Some(Call::Transform(scale)) => assert!((scale - 1.24).abs() < 1e-5),
            other => panic!("expected transform, got {:?}", other),
        }

        h.system.flush_handoff();
        let written = writes(&h);
        let character = written[0].character_path.as_deref().unwrap();
        assert!(character.ends_with("male_base.glb"));
    }

    #[test]
    fn test_unrigged_model_warns_and_still_scales() {
        let mut h = harness();
        let paths = h.system.services().paths.clone();
        write_model(&paths, Gender::Male, GlbFixture::triangle());

        assert!(h.system.load_base_model(Gender::Male));
        assert!(!h.system.is_current_model_rigged());
        h.system.update_sculpt_value("height", 80);

        let calls = h.calls.borrow().clone();
        assert!(matches!(calls[0], Call::Warning(_)));
        match calls.last() {
            Some(Call::Transform(scale)) => assert!((scale - 1.24).abs() < 1e-5),
            other => panic!("expected transform, got {:?}", other),
        }
        assert!(matches!(
            h.system.preview_plan(),
            PreviewPlan::Model { transform: Some(_), .. }
        ));
    }

    #[test]
    fn test_missing_base_model_is_noop() {
        let mut h = harness();
        assert!(!h.system.load_base_model(Gender::Female));
        assert!(h.calls.borrow().is_empty());
        assert_eq!(h.system.active_model_path(), None);
    }

    #[test]
    fn test_corrupt_model_falls_back_to_image() {
        let mut h = harness();
        let paths = h.system.services().paths.clone();
        let model = paths.base_model(Gender::Male);
        std::fs::create_dir_all(model.parent().unwrap()).unwrap();
        std::fs::write(&model, b"not a glb").unwrap();
        let image = paths.preview_image("skin_fat");
        std::fs::create_dir_all(image.parent().unwrap()).unwrap();
        std::fs::write(&image, b"png").unwrap();

        assert!(!h.system.load_base_model(Gender::Male));
        let calls = h.calls.borrow().clone();
        assert_eq!(
            calls,
            vec![
                Call::Warning(charforge_scene::MSG_LOAD_FAILED.to_string()),
                Call::Load(image),
            ]
        );
    }

    #[test]
    fn test_set_gender_persists() {
        let mut h = harness();
        h.system.set_gender(Gender::Female);
        assert_eq!(h.system.services().config.load().gender, Gender::Female);
        assert!(h.system.current_model_path().ends_with("female_base.glb"));
    }

    #[test]
    fn test_layer_changes() {
        let mut h = harness();
        assert!(h.system.update_anatomy_layer("muscle", true));
        assert!(!h.system.update_anatomy_layer("wings", true));
        assert!(h.system.add_asset("clothes", None));
        assert!(!h.system.add_asset("hats", Some("top_hat")));
        assert!(h.system.set_material_color("skin", "#112233"));
        assert!(!h.system.set_material_color("skin", "red"));
        assert!(!h.system.set_material_color("chrome", "#112233"));

        let updates = h
            .calls
            .borrow()
            .iter()
            .filter(|c| **c == Call::Update)
            .count();
        assert_eq!(updates, 3);
        assert_eq!(
            h.system.state().assets().get("clothes"),
            Some(&vec!["clothes_demo_asset".to_string()])
        );
        assert_eq!(h.system.state().materials().get("skin").unwrap().color, "#112233");
    }

    #[test]
    fn test_preset_round_trip_notifies() {
        let mut h = harness();
        h.system.update_sculpt_value("hip_width", 12);
        h.system.update_anatomy_layer("organs", true);
        assert!(h.system.save_preset("mine"));

        h.system.update_sculpt_value("hip_width", 90);
        h.calls.borrow_mut().clear();
        assert!(h.system.load_preset("mine"));

        assert_eq!(h.system.state().sculpt_value("hip_width"), Some(12));
        let calls = h.calls.borrow().clone();
        assert_eq!(&calls[..2], &[Call::SyncSliders, Call::SyncAnatomy]);
    }

    #[test]
    fn test_missing_preset_leaves_state() {
        let mut h = harness();
        h.system.update_sculpt_value("height", 77);
        let before = h.system.state().clone();
        assert!(!h.system.load_preset("nope"));
        assert_eq!(h.system.state(), &before);
    }

    #[test]
    fn test_startup_prefers_default_preset() {
        let mut h = harness();
        let mut state = CharacterState::default();
        state.set_sculpt("height", 80);
        state.set_anatomy("organs", true);
        h.system
            .services()
            .presets
            .save(DEFAULT_PRESET, &state.snapshot())
            .unwrap();

        h.system.startup();
        assert_eq!(h.system.state().sculpt_value("height"), Some(80));
        assert!(h.system.state().anatomy_enabled("organs"));
    }

    #[test]
    fn test_sculpt_writes_handoff_then_reports_missing_tool() {
        let mut h = harness();
        let locator = ToolLocator::new()
            .configured(Some(h.dir.path().join("no-blender")))
            .install_roots(Vec::new())
            .search_path(None)
            .command("charforge-test-missing-tool");
        let bridge = BlenderBridge::new(
            OrchestratorConfig::new(h.dir.path()).locator(locator),
            h.system.services().paths.scripts(),
            h.system.services().paths.exports_dir(),
        );
        h.system.services = h.system.services.clone().with_bridge(bridge);
        let script = h.system.services().paths.scripts().sculpt;
        std::fs::create_dir_all(script.parent().unwrap()).unwrap();
        std::fs::write(&script, "# sculpt\n").unwrap();

        h.system.update_sculpt_value("height", 65);
        assert!(h.system.sculpt().is_none());

        let written = writes(&h);
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].params.get("height"), Some(&65));
        assert!(!h.system.flush_handoff());
        assert_eq!(
            h.calls.borrow().last(),
            Some(&Call::ToolError("not_installed".to_string()))
        );
    }

    #[test]
    fn test_export_failure_is_returned() {
        let mut h = harness();
        let locator = ToolLocator::new()
            .install_roots(Vec::new())
            .search_path(None)
            .command("charforge-test-missing-tool");
        let bridge = BlenderBridge::new(
            OrchestratorConfig::new(h.dir.path()).locator(locator),
            h.system.services().paths.scripts(),
            h.system.services().paths.exports_dir(),
        );
        h.system.services = h.system.services.clone().with_bridge(bridge);

        assert!(h.system.export_model("hero").is_err());
        // the preset is saved before the tool runs
        assert!(h.system.services().presets.exists("hero"));
        assert!(matches!(h.calls.borrow().last(), Some(Call::ToolError(_))));
    }
}
