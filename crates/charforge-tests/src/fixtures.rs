//! Test fixtures: scratch projects and recording hosts.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use charforge_backend_blender::{BlenderErrorInfo, BlenderResult, HandoffPayload, HandoffSink};
use charforge_core::{
    AppPaths, CharacterSystem, Notifier, SculptTransform, Services, SessionLog, Viewport,
};
use charforge_scene::GlbFixture;
use charforge_spec::{Gender, KeyedMap};
use tempfile::TempDir;

/// Shell body for a stand-in Blender: answers `--version`, prints the
/// runtime sentinel for batch runs and writes `exports/<name>.fbx` when
/// given a name after `--`.
pub const FAKE_BLENDER: &str = r#"case "$1" in
  --version) echo "Blender 4.1.0"; echo "build hash: test"; exit 0 ;;
esac
name=""
seen=""
for a in "$@"; do
  if [ -n "$seen" ]; then name="$a"; fi
  if [ "$a" = "--" ]; then seen=1; fi
done
echo BLENDER_RUNTIME_OK
if [ -n "$name" ]; then mkdir -p exports; echo fbx > "exports/$name.fbx"; fi
exit 0
"#;

/// The shipped parameter schema.
pub const BODY_PARAMETERS: &str = include_str!("../../../assets/body_parameters.json");

/// A scratch application base directory.
pub struct ProjectFixture {
    pub root: TempDir,
    pub paths: AppPaths,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    /// Empty base directory.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let paths = AppPaths::new(root.path());
        Self { root, paths }
    }

    /// Base directory with every required asset and script in place.
    pub fn populated() -> Self {
        let fixture = Self::new();
        for gender in Gender::all() {
            fixture.add_model(gender, GlbFixture::triangle().skinned());
        }
        for image in [
            "skin",
            "skin_fat",
            "skin_fat_muscle",
            "skin_fat_muscle_bone",
            "skin_fat_muscle_bone_organs",
        ] {
            fixture.write(&fixture.paths.preview_image(image), b"png");
        }
        fixture.write(&fixture.paths.body_parameters(), BODY_PARAMETERS.as_bytes());
        for script in fixture.paths.required_scripts() {
            fixture.write(&script, b"# script\n");
        }
        fixture
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn write(&self, path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, contents).expect("Failed to write fixture file");
    }

    pub fn add_model(&self, gender: Gender, glb: GlbFixture) -> PathBuf {
        let path = self.paths.base_model(gender);
        self.write(&path, &glb.build());
        path
    }

    pub fn remove_model(&self, gender: Gender) {
        fs::remove_file(self.paths.base_model(gender)).expect("Failed to remove model");
    }

    /// Writes the runtime smoke-test script.
    pub fn add_runtime_test(&self) {
        self.write(&self.paths.scripts().runtime_test, b"print('BLENDER_RUNTIME_OK')\n");
    }

    /// Installs an executable shell script and points `config.json` at it.
    #[cfg(unix)]
    pub fn install_fake_blender(&self, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let tool = self.path().join("bin").join("blender");
        self.write(&tool, format!("#!/bin/sh\n{}\n", body).as_bytes());
        let mut perms = fs::metadata(&tool).expect("stat tool").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&tool, perms).expect("chmod tool");

        let config = Services::new(self.paths.clone(), SessionLog::in_memory()).config;
        config
            .update(|c| c.blender_path = tool.to_string_lossy().into_owned())
            .expect("Failed to save config");
        tool
    }

    /// Services logging in memory.
    pub fn services(&self) -> Services {
        Services::new(self.paths.clone(), SessionLog::in_memory())
    }

    /// A character system with recording hosts.
    pub fn system(&self, services: Services) -> (CharacterSystem, Calls) {
        let calls: Calls = Rc::default();
        let system = CharacterSystem::new(
            services,
            Box::new(RecordingViewport(calls.clone())),
            Box::new(RecordingNotifier(calls.clone())),
        );
        (system, calls)
    }
}

/// A call made by the core to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    LoadPreview(PathBuf),
    RefreshView,
    UpdatePreview,
    ApplyTransform(SculptTransform),
    SyncSliders,
    SyncAnatomy,
    ToolError(BlenderErrorInfo),
    ModelWarning(String),
}

pub type Calls = Rc<RefCell<Vec<HostCall>>>;

pub struct RecordingViewport(pub Calls);

impl Viewport for RecordingViewport {
    fn load_preview(&mut self, path: &Path) {
        self.0.borrow_mut().push(HostCall::LoadPreview(path.to_path_buf()));
    }

    fn refresh_view(&mut self) {
        self.0.borrow_mut().push(HostCall::RefreshView);
    }

    fn update_preview(&mut self, _anatomy: &KeyedMap<bool>, _assets: &KeyedMap<Vec<String>>) {
        self.0.borrow_mut().push(HostCall::UpdatePreview);
    }

    fn apply_sculpt_transform(&mut self, _params: &KeyedMap<i32>, transform: &SculptTransform) {
        self.0.borrow_mut().push(HostCall::ApplyTransform(*transform));
    }
}

pub struct RecordingNotifier(pub Calls);

impl Notifier for RecordingNotifier {
    fn sync_sliders(&mut self) {
        self.0.borrow_mut().push(HostCall::SyncSliders);
    }

    fn sync_anatomy(&mut self) {
        self.0.borrow_mut().push(HostCall::SyncAnatomy);
    }

    fn tool_error(&mut self, info: &BlenderErrorInfo) {
        self.0.borrow_mut().push(HostCall::ToolError(info.clone()));
    }

    fn model_warning(&mut self, message: &str) {
        self.0.borrow_mut().push(HostCall::ModelWarning(message.to_string()));
    }
}

/// Hand-off sink that counts writes and keeps each payload.
#[derive(Debug, Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<HandoffPayload>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self) -> Vec<HandoffPayload> {
        self.writes.lock().expect("sink lock").clone()
    }
}

impl HandoffSink for RecordingSink {
    fn write(&self, payload: &HandoffPayload) -> BlenderResult<()> {
        self.writes.lock().expect("sink lock").push(payload.clone());
        Ok(())
    }
}
