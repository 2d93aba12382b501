//! charforge Character Core
//!
//! This crate sits between a host UI and the rest of charforge. It owns the
//! character state and keeps the viewport, the hand-off file and the
//! persisted presets in step with it.
//!
//! # Modules
//!
//! - [`character`] - The [`CharacterSystem`] mediator
//! - [`viewport`] - Traits the host implements
//! - [`transform`] / [`preview`] / [`policy`] - How state maps onto the viewport
//! - [`debounce`] - Restartable timer for hand-off writes
//! - [`config_store`] / [`preset_store`] / [`paths`] - Persistence
//! - [`session_log`] - Append-only `error_log.txt`
//! - [`readiness`] - Startup diagnostics
//! - [`triage`] - Log analysis and help answers
//!
//! # Example
//!
//! ```no_run
//! use charforge_core::{AppPaths, CharacterSystem, NullNotifier, NullViewport, Services};
//!
//! let services = Services::open(AppPaths::new("."));
//! let mut system = CharacterSystem::new(services, Box::new(NullViewport), Box::new(NullNotifier));
//! system.startup();
//! system.update_sculpt_value("height", 80);
//! system.save_preset("tall");
//! ```

pub mod character;
pub mod config_store;
pub mod debounce;
pub mod error;
pub mod paths;
pub mod policy;
pub mod preset_store;
pub mod preview;
pub mod readiness;
pub mod services;
pub mod session_log;
pub mod transform;
pub mod triage;
pub mod viewport;

pub use character::{CharacterSystem, DEFAULT_PRESET};
pub use config_store::ConfigStore;
pub use debounce::{DebounceTimer, HANDOFF_DEBOUNCE_MS};
pub use error::{CoreError, CoreResult};
pub use paths::AppPaths;
pub use policy::{classify_load, LoadDecision};
pub use preset_store::{PresetStore, PresetSummary};
pub use preview::{image_plan, preview_image_name, PreviewPlan, DEFAULT_PREVIEW_IMAGE};
pub use readiness::{
    CheckResult, CheckStatus, NamedCheck, ReadinessEngine, ReadinessReport, DEFAULT_COMPANION_URL,
};
pub use services::{session_output_sink, Services};
pub use session_log::{SessionLog, MAX_SESSION_LINES};
pub use transform::{height_scale, SculptTransform, TransformPolicy};
pub use triage::{analyze, answer, Diagnosis, FixAction};
pub use viewport::{Notifier, NullNotifier, NullViewport, Viewport};
