//! CLI command implementations

pub mod config;
pub mod doctor;
pub mod export;
pub mod inspect;
pub mod preset;
pub mod preview;
pub mod sculpt;
pub mod triage;
pub mod validate;
