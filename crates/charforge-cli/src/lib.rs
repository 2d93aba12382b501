//! charforge CLI library.
//!
//! Command implementations and the console host used by the `charforge`
//! binary.

pub mod commands;
pub mod console;
pub mod context;
