//! End-to-end flows: startup, preview selection, slider transform and export.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p charforge-tests --test e2e
//! ```

use std::time::Duration;

use charforge_core::{LoadDecision, PreviewPlan, TransformPolicy, DEFAULT_PRESET};
use charforge_spec::{Gender, PresetData};
use charforge_tests::fixtures::{HostCall, ProjectFixture};
use pretty_assertions::assert_eq;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

/// Saves a `default` preset with height 80 and organs visible.
fn save_default_preset(fixture: &ProjectFixture) {
    let mut preset = PresetData::default();
    preset.sculpt_data.insert("height".to_string(), 80);
    preset.anatomy.insert("organs".to_string(), true);
    fixture
        .services()
        .presets
        .save(DEFAULT_PRESET, &preset)
        .expect("default preset saves");
}

#[test]
fn startup_without_model_shows_highest_anatomy_illustration() {
    let fixture = ProjectFixture::populated();
    fixture.remove_model(Gender::Male);
    fixture.remove_model(Gender::Female);
    save_default_preset(&fixture);

    let (mut system, calls) =
        fixture.system(fixture.services().debounce(Duration::from_secs(60)));
    system.startup();

    assert_eq!(system.state().sculpt_value("height"), Some(80));
    assert!(system.active_model_path().is_none());
    let expected = fixture.paths.preview_image("skin_fat_muscle_bone_organs");
    assert_eq!(
        system.preview_plan(),
        PreviewPlan::Image {
            path: expected.clone()
        }
    );
    assert!(calls.borrow().contains(&HostCall::LoadPreview(expected)));

    // Hiding organs drops to the next layer down.
    assert!(system.update_anatomy_layer("organs", false));
    assert!(system.update_anatomy_layer("bone", false));
    assert!(system.update_anatomy_layer("muscle", false));
    assert_eq!(
        system.preview_plan(),
        PreviewPlan::Image {
            path: fixture.paths.preview_image("skin_fat")
        }
    );
}

#[test]
fn startup_with_rigged_model_scales_from_height() {
    let fixture = ProjectFixture::populated();
    save_default_preset(&fixture);

    let (mut system, calls) =
        fixture.system(fixture.services().debounce(Duration::from_secs(60)));
    system.startup();

    let model = fixture.paths.base_model(Gender::Male);
    assert_eq!(system.active_model_path(), Some(model.as_path()));
    assert_eq!(system.load_decision(), Some(&LoadDecision::ProceedSilently));
    assert!(system.is_current_model_rigged());

    let transform = system.current_transform().expect("transform applies");
    assert!(approx_eq(transform.scale, 1.24));
    assert_eq!(transform.offset, charforge_core::SculptTransform::identity().offset);

    let applied: Vec<f32> = calls
        .borrow()
        .iter()
        .filter_map(|call| match call {
            HostCall::ApplyTransform(t) => Some(t.scale),
            _ => None,
        })
        .collect();
    assert!(applied.iter().any(|&s| approx_eq(s, 1.24)));

    match system.preview_plan() {
        PreviewPlan::Model { path, transform } => {
            assert_eq!(path, model);
            assert!(transform.is_some());
        }
        other => panic!("expected model plan, got {:?}", other),
    }

    system.update_sculpt_value("height", 0);
    assert!(approx_eq(system.current_transform().expect("transform").scale, 0.6));
    system.update_sculpt_value("height", 100);
    assert!(approx_eq(system.current_transform().expect("transform").scale, 1.4));
}

#[test]
fn offset_policy_moves_model_along_weighted_axes() {
    let fixture = ProjectFixture::populated();
    save_default_preset(&fixture);

    let services = fixture
        .services()
        .debounce(Duration::from_secs(60))
        .transform_policy(TransformPolicy::ScaleAndOffset);
    let (mut system, _) = fixture.system(services);
    system.startup();
    system.update_sculpt_value("hip_width", 100);
    system.update_sculpt_value("breast_size", 0);

    let transform = system.current_transform().expect("transform applies");
    assert!(approx_eq(transform.scale, 1.24));
    assert!(approx_eq(transform.offset.y, 0.6));
    assert!(approx_eq(transform.offset.x, 0.5));
    assert!(approx_eq(transform.offset.z, -0.3));
}

#[test]
fn unrigged_model_warns_but_still_scales_from_height() {
    let fixture = ProjectFixture::populated();
    fixture.add_model(Gender::Male, charforge_scene::GlbFixture::triangle());

    let (mut system, calls) =
        fixture.system(fixture.services().debounce(Duration::from_secs(60)));
    system.startup();

    assert!(system.active_model_path().is_some());
    assert!(!system.is_current_model_rigged());
    assert!(matches!(
        system.load_decision(),
        Some(LoadDecision::ProceedWithWarning(_))
    ));
    assert!(calls
        .borrow()
        .iter()
        .any(|c| matches!(c, HostCall::ModelWarning(_))));
    calls.borrow_mut().clear();

    system.update_sculpt_value("height", 80);
    let transform = system.current_transform().expect("transform applies");
    assert!(approx_eq(transform.scale, 1.24));
    assert!(calls
        .borrow()
        .iter()
        .any(|c| matches!(c, HostCall::ApplyTransform(t) if approx_eq(t.scale, 1.24))));
}

#[test]
fn switching_gender_loads_other_model_and_persists() {
    let fixture = ProjectFixture::populated();
    let (mut system, _) = fixture.system(fixture.services().debounce(Duration::from_secs(60)));
    system.startup();
    assert!(system.set_gender(Gender::Female));

    assert_eq!(
        system.active_model_path(),
        Some(fixture.paths.base_model(Gender::Female).as_path())
    );
    assert_eq!(fixture.services().config.load().gender, Gender::Female);
    assert_eq!(
        system.current_model_path(),
        fixture.paths.base_model(Gender::Female)
    );
}

#[cfg(unix)]
#[test]
fn export_through_configured_tool_produces_fbx() {
    use charforge_tests::fixtures::FAKE_BLENDER;

    let fixture = ProjectFixture::populated();
    fixture.install_fake_blender(FAKE_BLENDER);
    save_default_preset(&fixture);

    let (mut system, calls) =
        fixture.system(fixture.services().debounce(Duration::from_secs(60)));
    system.startup();
    system.update_sculpt_value("arm_length", 42);

    let path = system.export_model("heroine").expect("export succeeds");
    assert!(path.is_file());
    assert!(!calls
        .borrow()
        .iter()
        .any(|c| matches!(c, HostCall::ToolError(_))));

    let handoff = std::fs::read_to_string(fixture.paths.handoff_file()).expect("hand-off written");
    let json: serde_json::Value = serde_json::from_str(&handoff).expect("hand-off is JSON");
    assert_eq!(json["arm_length"], 42);
    assert_eq!(json["height"], 80);

    let presets = fixture.services().presets.list();
    let names: Vec<&str> = presets.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["default", "heroine"]);
}
