//! charforge Integration Test Infrastructure
//!
//! Shared fixtures for the cross-crate tests in `tests/`:
//!
//! - [`fixtures::ProjectFixture`] - a scratch base directory with assets,
//!   scripts and an optional stand-in Blender executable
//! - [`fixtures::RecordingViewport`] / [`fixtures::RecordingNotifier`] -
//!   hosts that record every call
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p charforge-tests
//! ```
//!
//! Tests that launch the stand-in executable are shell scripts and only
//! run on unix.

pub mod fixtures;
