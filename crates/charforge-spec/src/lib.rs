//! charforge Character Data Model
//!
//! This crate provides the types that describe a character: sculpt
//! parameters, anatomy layers, asset layers, physics flags and materials,
//! together with the persisted preset and config records.
//!
//! # Example
//!
//! ```
//! use charforge_spec::{CharacterState, PresetData};
//!
//! let mut state = CharacterState::default();
//! state.set_sculpt("height", 80);
//! state.set_anatomy("organs", true);
//!
//! let preset: PresetData = state.snapshot();
//! let json = preset.to_json_pretty().unwrap();
//!
//! let mut other = CharacterState::default();
//! let warnings = other.apply_preset(&PresetData::from_json(&json).unwrap());
//! assert!(warnings.is_empty());
//! assert_eq!(other.sculpt_value("height"), Some(80));
//! ```
//!
//! # Modules
//!
//! - [`config`]: Persisted application settings
//! - [`error`]: Error and warning types
//! - [`keyed_map`]: Maps with a fixed vocabulary and an unknown-key bag
//! - [`material`]: Material slots
//! - [`preset`]: Named character snapshots
//! - [`schema`]: Sculpt parameter declarations
//! - [`state`]: The mutable character model

pub mod config;
pub mod error;
pub mod keyed_map;
pub mod material;
pub mod preset;
pub mod schema;
pub mod state;

pub use config::{Config, Gender, Theme};
pub use error::{SpecError, SpecResult, ValidationWarning};
pub use keyed_map::KeyedMap;
pub use material::{is_hex_color, MaterialData};
pub use preset::PresetData;
pub use schema::{ParamSchema, ParamSpec, SCULPT_MAX, SCULPT_MIN};
pub use state::{
    default_materials, CharacterState, ANATOMY_LAYERS, ASSET_CATEGORIES, PHYSICS_FLAGS,
};
