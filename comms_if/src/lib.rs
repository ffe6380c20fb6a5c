//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Command and record definitions for equipment (the arm itself)
pub mod eqpt;

/// Network module
pub mod net;
