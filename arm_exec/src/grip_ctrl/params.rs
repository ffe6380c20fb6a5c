//! Parameters structure for GripCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Gripper control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Gripper servo position when the gripper is open.
    ///
    /// Units: degrees
    pub angle_open_deg: f64,

    /// Gripper servo position when the gripper is closed.
    ///
    /// Units: degrees
    pub angle_closed_deg: f64,
}
