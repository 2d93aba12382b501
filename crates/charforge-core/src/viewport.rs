//! Boundary between the core and its host UI.
//!
//! The core calls these synchronously on the thread that owns the
//! [`CharacterSystem`](crate::CharacterSystem). Hosts that render on another
//! thread marshal inside their implementation.

use std::path::Path;

use charforge_backend_blender::BlenderErrorInfo;
use charforge_spec::KeyedMap;

use crate::transform::SculptTransform;

/// The four operations the core needs from a viewport.
pub trait Viewport {
    /// Show a model file or preview image.
    fn load_preview(&mut self, path: &Path);

    /// Redraw with the current state.
    fn refresh_view(&mut self);

    /// Update layer visibility without reloading geometry.
    fn update_preview(&mut self, anatomy: &KeyedMap<bool>, assets: &KeyedMap<Vec<String>>);

    /// Apply the slider-driven transform to the active model.
    fn apply_sculpt_transform(&mut self, params: &KeyedMap<i32>, transform: &SculptTransform);
}

/// Notifications for UI widgets. Every method defaults to a no-op.
pub trait Notifier {
    /// Sliders should re-read sculpt values.
    fn sync_sliders(&mut self) {}

    /// Anatomy toggles should re-read their flags.
    fn sync_anatomy(&mut self) {}

    /// An external tool operation failed.
    fn tool_error(&mut self, _info: &BlenderErrorInfo) {}

    /// A loaded model may not deform correctly, or could not be used.
    fn model_warning(&mut self, _message: &str) {}
}

/// Viewport that ignores every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullViewport;

impl Viewport for NullViewport {
    fn load_preview(&mut self, _path: &Path) {}
    fn refresh_view(&mut self) {}
    fn update_preview(&mut self, _anatomy: &KeyedMap<bool>, _assets: &KeyedMap<Vec<String>>) {}
    fn apply_sculpt_transform(&mut self, _params: &KeyedMap<i32>, _transform: &SculptTransform) {}
}

/// Notifier that ignores every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {}
