//! Arm control module
//!
//! ArmCtrl converts target end effector poses into servo position demands
//! for the five arm joints (base, shoulder, elbow, wrist tilt, wrist
//! rotation) using a closed form inverse kinematics solution. The gripper
//! itself is handled by `grip_ctrl`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_ik;
mod geom;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use geom::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Neutral wrist tilt position used when horizontal hold is not active.
///
/// Units: degrees
pub const NEUTRAL_WRIST_TILT_DEG: f64 = 90.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Recieved a target pose containing non-finite values: {0:#?}")]
    NonFiniteTarget(comms_if::eqpt::arm::TargetPose),
}
