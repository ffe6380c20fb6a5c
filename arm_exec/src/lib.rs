//! # Arm control executable library
//!
//! This library provides the control modules used by the `arm_exec`
//! executable:
//!
//! - `arm_ctrl` - inverse kinematics, turning target poses into joint demands
//! - `grip_ctrl` - gripper open/close state machine
//! - `disp_ctrl` - stabilisation dispatcher, deciding when demands go out
//! - `braccio_client` - HTTP client for the arm's bridge endpoint

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm_ctrl;
pub mod braccio_client;
pub mod data_store;
pub mod disp_ctrl;
pub mod grip_ctrl;
