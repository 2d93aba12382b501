//! charforge GLB Scene Loader
//!
//! Loads binary glTF character models into drawable geometry and classifies
//! whether they carry a rig.
//!
//! - [`loader`]: scene graph, drawables, upright correction and world bounds
//! - [`validator`]: mesh/node/skin counts and rig diagnostics
//! - [`bounds`]: axis-aligned boxes
//! - [`glb`]: GLB container encoding

pub mod bounds;
pub mod error;
pub mod glb;
pub mod loader;
pub mod validator;

pub use bounds::Bounds;
pub use error::{SceneError, SceneResult};
pub use glb::{encode_glb, is_glb, minimal_triangle_glb, GlbFixture};
pub use loader::{
    load_scene, parse_scene, parse_scene_slice, DisplayMaterial, Drawable, Scene, SceneMesh,
    SceneNode, SceneStats,
};
pub use validator::{
    validate_model, validate_scene, validate_slice, ValidationResult, MSG_LOAD_FAILED, MSG_NO_MESHES,
    MSG_NO_RIG,
};
