//! # Arm Equipment Commands
//!
//! Defines the demands produced by the control modules and the wire record
//! accepted by the arm's HTTP bridge.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Utc;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Gripper servo position for the open state, before any parameters are
/// loaded. Single source for the pre-first-cycle demand defaults.
///
/// Units: degrees
pub const GRIPPER_OPEN_DEG: f64 = 73.0;

/// Logical wire value for an open gripper.
pub const GRIP_LOGICAL_OPEN: u8 = 1;

/// Logical wire value for a closed gripper.
pub const GRIP_LOGICAL_CLOSED: u8 = 0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The pose the arm's end effector should reach.
///
/// Produced each cycle by the external target source (hand tracking feed or
/// pose script) and consumed by ArmCtrl.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TargetPose {
    /// Target position in the arm base frame.
    ///
    /// Units: meters.
    /// Frame: Arm base (origin at the base servo, Y up, Z forward).
    pub pos_m: Vector3<f64>,

    /// Desired end effector yaw, driving the wrist rotation servo.
    ///
    /// Units: degrees
    pub yaw_deg: f64,
}

/// Demands that are sent from the control modules to the arm.
///
/// All angles are servo positions in degrees, already clamped to the safe
/// range of each joint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ArmDems {
    /// Base (M1) servo position demand in degrees.
    pub base_deg: f64,

    /// Shoulder (M2) servo position demand in degrees.
    pub shoulder_deg: f64,

    /// Elbow (M3) servo position demand in degrees.
    pub elbow_deg: f64,

    /// Wrist tilt (M4) servo position demand in degrees.
    pub wrist_tilt_deg: f64,

    /// Wrist rotation (M5) servo position demand in degrees.
    pub wrist_rot_deg: f64,

    /// Gripper (M6) servo position demand in degrees.
    pub gripper_deg: f64,

    /// Logical gripper state, 1 = open, 0 = closed.
    pub grip_logical: u8,
}

/// A single record sent to the arm's HTTP bridge.
///
/// Angles are truncated to integer degrees as the bridge (and the servos
/// behind it) only accept whole-degree positions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BraccioFrame {
    /// Milliseconds since the Unix epoch at the time the frame was assembled.
    pub timestamp: i64,

    /// Base position in degrees.
    pub m1: i32,

    /// Shoulder position in degrees.
    pub m2: i32,

    /// Elbow position in degrees.
    pub m3: i32,

    /// Wrist tilt position in degrees.
    pub m4: i32,

    /// Wrist rotation position in degrees.
    pub m5: i32,

    /// Gripper position in degrees.
    pub m6: i32,

    /// Logical gripper state, 1 = open, 0 = closed.
    pub gripper_state: u8,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for TargetPose {
    fn default() -> Self {
        // Directly above the base, yaw centred. Held until the first TARGET
        // TC arrives.
        Self {
            pos_m: Vector3::new(0.0, 0.3, 0.2),
            yaw_deg: 90.0,
        }
    }
}

impl Default for ArmDems {
    fn default() -> Self {
        // Neutral pose, all joints centred, gripper open
        Self {
            base_deg: 90.0,
            shoulder_deg: 90.0,
            elbow_deg: 90.0,
            wrist_tilt_deg: 90.0,
            wrist_rot_deg: 90.0,
            gripper_deg: GRIPPER_OPEN_DEG,
            grip_logical: GRIP_LOGICAL_OPEN,
        }
    }
}

impl BraccioFrame {
    /// Assemble a wire frame from the current demands, stamping it with the
    /// current time.
    pub fn from_dems(dems: &ArmDems) -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            m1: dems.base_deg as i32,
            m2: dems.shoulder_deg as i32,
            m3: dems.elbow_deg as i32,
            m4: dems.wrist_tilt_deg as i32,
            m5: dems.wrist_rot_deg as i32,
            m6: dems.gripper_deg as i32,
            gripper_state: dems.grip_logical,
        }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_from_dems() {
        let dems = ArmDems {
            base_deg: 90.7,
            shoulder_deg: 45.2,
            elbow_deg: 120.0,
            wrist_tilt_deg: 90.0,
            wrist_rot_deg: 10.9,
            gripper_deg: 73.0,
            grip_logical: 1,
        };

        let frame = BraccioFrame::from_dems(&dems);

        assert_eq!(frame.m1, 90);
        assert_eq!(frame.m2, 45);
        assert_eq!(frame.m3, 120);
        assert_eq!(frame.m4, 90);
        assert_eq!(frame.m5, 10);
        assert_eq!(frame.m6, 73);
        assert_eq!(frame.gripper_state, 1);
        assert!(frame.timestamp > 0);
    }

    #[test]
    fn test_frame_wire_format() {
        // The bridge expects exactly these field names, a change here breaks
        // the receiving end.
        let frame = BraccioFrame {
            timestamp: 1000,
            m1: 90,
            m2: 45,
            m3: 120,
            m4: 90,
            m5: 10,
            m6: 73,
            gripper_state: 1,
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&frame).unwrap()).unwrap();

        assert_eq!(json["timestamp"], 1000);
        assert_eq!(json["m1"], 90);
        assert_eq!(json["m2"], 45);
        assert_eq!(json["m3"], 120);
        assert_eq!(json["m4"], 90);
        assert_eq!(json["m5"], 10);
        assert_eq!(json["m6"], 73);
        assert_eq!(json["gripper_state"], 1);
    }
}
