//! Gripper control module
//!
//! GripCtrl turns the logical grip signal (close requested or not) into a
//! gripper servo position demand, and tracks transitions between the open
//! and closed states so the dispatcher can send them immediately.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during GripCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum GripCtrlError {
    #[error("Gripper angle parameters are not finite: open {0}, closed {1}")]
    NonFiniteAngles(f64, f64),
}
