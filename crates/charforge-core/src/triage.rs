//! Session log triage and canned help answers.

use serde::Serialize;

/// Remedy a host can offer as a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixAction {
    OpenSettings,
}

/// Result of reading a session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub problem: String,
    pub cause: String,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixAction>,
}

impl Diagnosis {
    fn new(problem: &str, cause: &str, suggestion: &str) -> Self {
        Self {
            problem: problem.to_string(),
            cause: cause.to_string(),
            suggestion: suggestion.to_string(),
            fix: None,
        }
    }

    fn with_fix(mut self, fix: FixAction) -> Self {
        self.fix = Some(fix);
        self
    }

    /// True when no known pattern matched.
    pub fn is_generic(&self) -> bool {
        self.problem == GENERIC_PROBLEM
    }
}

const GENERIC_PROBLEM: &str = "No specific problem recognized";

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Matches the log against known failure patterns, most specific first.
pub fn analyze(log_text: &str) -> Diagnosis {
    let text = log_text.to_lowercase();
    let missing = contains_any(&text, &["not found", "missing", "no such file"]);

    if contains_any(
        &text,
        &[
            "blender executable not found",
            "blender not found",
            "not_installed",
            "blender path is not configured",
            "configured blender path does not exist",
        ],
    ) {
        return Diagnosis::new(
            "Blender could not be found",
            "No Blender path is configured, or the configured path no longer exists.",
            "Open Settings and point the Blender path at your blender executable.",
        )
        .with_fix(FixAction::OpenSettings);
    }

    if text.contains("export_fbx") && missing {
        return Diagnosis::new(
            "The export script is missing",
            "tool_embed/scripts/export_fbx.py is not where the exporter expects it.",
            "Restore the tool_embed folder from the charforge distribution.",
        );
    }

    if text.contains("apply_sculpt") && missing {
        return Diagnosis::new(
            "The sculpt script is missing",
            "tool_embed/apply_sculpt_standalone.py is not where the sculpt launcher expects it.",
            "Restore the tool_embed folder from the charforge distribution.",
        );
    }

    if contains_any(&text, &["glb load failed", "could not load model", "failed to parse glb"]) {
        return Diagnosis::new(
            "A 3D model could not be displayed",
            "The base model file is damaged or not a binary glTF 2.0 file.",
            "Re-export the base model from Blender as GLB (glTF 2.0 binary).",
        );
    }

    if contains_any(&text, &["path not found", "no such file", "does not exist"]) {
        return Diagnosis::new(
            "A file or folder is missing",
            "A path the editor needs does not exist.",
            "Check the paths in the log above and restore the missing files.",
        );
    }

    if contains_any(&text, &["fauxpilot", "localhost:5000", "ai companion"]) {
        return Diagnosis::new(
            "The AI companion is not reachable",
            "Nothing is listening on the companion port. It is optional.",
            "Start the companion service, or ignore this if you do not use it.",
        );
    }

    Diagnosis::new(
        GENERIC_PROBLEM,
        "The log does not contain a known failure pattern.",
        "Run `charforge doctor` and check each failing step.",
    )
}

const ANSWERS: [(&[&str], &str); 5] = [
    (
        &["upside down", "upside-down", "orientation", "flipped", "rotated"],
        "Models exported with a different up axis appear flipped. The viewer rotates \
         every model 180 degrees about X to compensate. If a model still looks wrong, \
         re-export it from Blender with +Y up.",
    ),
    (
        &["rotate", "zoom", "pan", "camera", "viewport", "controls"],
        "Left-drag orbits the camera, right-drag pans and the wheel zooms. The height \
         slider scales the model about its center.",
    ),
    (
        &["blender", "install", "tool path", "executable"],
        "charforge uses Blender for sculpting and FBX export. Install Blender, then set \
         its path with `charforge config set-tool-path <path>` or in Settings. \
         `charforge doctor` confirms it can be launched.",
    ),
    (
        &["preset", "save", "load"],
        "Presets store sliders, layers, assets, physics and materials as JSON under \
         presets/. A preset named `default` is loaded at startup.",
    ),
    (
        &["rig", "armature", "skin", "bone", "deform"],
        "Sliders only deform models with an armature or skin. Unrigged models still \
         display but show a warning. Use Create Auto-Rig to open the model in Blender \
         and rig it there.",
    ),
];

const HELP: &str = "I can help with model orientation, viewport controls, Blender setup, \
                    presets and rigging. Paste your error_log.txt into triage for a \
                    diagnosis of recent failures.";

/// Canned answer for a free-form question.
pub fn answer(question: &str) -> &'static str {
    let question = question.to_lowercase();
    ANSWERS
        .iter()
        .find(|(keywords, _)| contains_any(&question, keywords))
        .map(|(_, answer)| *answer)
        .unwrap_or(HELP)
}
