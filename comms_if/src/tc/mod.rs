//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface. Telecommands carry the external inputs of the control loop:
//! target pose updates, grip signal changes, and safe mode requests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use serde_json;
use thiserror::Error;

// Internal
use crate::eqpt::arm::TargetPose;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the control exec by an external
/// source (pose script or remote feed).
///
/// On the wire a TC is a JSON object of the shape
/// `{"type": "<TYPE>", "payload": ...}`, for example:
///
/// ```text
/// {"type": "TARGET", "payload": {"pos_m": [0.0, 0.1, 0.5], "yaw_deg": 90.0}}
/// {"type": "GRIP", "payload": {"closed": true}}
/// {"type": "SAFE"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// No operation
    #[serde(rename = "NONE")]
    None,

    /// Connection liveness check, no effect on the control loop
    #[serde(rename = "HEARTBEAT")]
    Heartbeat,

    /// Put the exec into safe mode, inhibiting dispatches to the arm
    #[serde(rename = "SAFE")]
    MakeSafe,

    /// Clear safe mode
    #[serde(rename = "UNSAFE")]
    MakeUnsafe,

    /// Update the arm's target pose
    #[serde(rename = "TARGET")]
    ArmTarget(TargetPose),

    /// Update the grip signal
    #[serde(rename = "GRIP")]
    Grip {
        /// True if the gripper should close
        closed: bool
    },
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_target_tc() {
        let tc = Tc::from_json(
            r#"{"type": "TARGET", "payload": {"pos_m": [0.0, 0.1, 0.5], "yaw_deg": 90.0}}"#
        ).unwrap();

        match tc {
            Tc::ArmTarget(t) => {
                assert_eq!(t.pos_m.x, 0.0);
                assert_eq!(t.pos_m.y, 0.1);
                assert_eq!(t.pos_m.z, 0.5);
                assert_eq!(t.yaw_deg, 90.0);
            },
            _ => panic!("Expected an ArmTarget TC")
        }
    }

    #[test]
    fn test_parse_grip_tc() {
        let tc = Tc::from_json(
            r#"{"type": "GRIP", "payload": {"closed": true}}"#
        ).unwrap();

        match tc {
            Tc::Grip { closed } => assert!(closed),
            _ => panic!("Expected a Grip TC")
        }
    }

    #[test]
    fn test_parse_safe_tc() {
        let tc = Tc::from_json(r#"{"type": "SAFE"}"#).unwrap();

        match tc {
            Tc::MakeSafe => (),
            _ => panic!("Expected a MakeSafe TC")
        }
    }

    #[test]
    fn test_parse_invalid_tc() {
        assert!(Tc::from_json(r#"{"type": "NOT_A_TC"}"#).is_err());
        assert!(Tc::from_json("not even json").is_err());
    }
}
