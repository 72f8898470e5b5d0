//! Game entities module.
//!
//! This module organizes ball serving logic.

pub mod ball;

pub use ball::*;
