//! # Data Store

use comms_if::eqpt::arm::{ArmDems, TargetPose};
use log::{info, warn};

use crate::{arm_ctrl, disp_ctrl, grip_ctrl};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the exec has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Elapsed session time
    pub elapsed_time_s: f64,

    // Safe mode variables
    /// Determines if the exec is in safe mode. While safe the modules keep
    /// processing but no frames are dispatched to the arm.
    pub safe: bool,

    /// Gives the reason for the exec being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Held command state
    /// The current target pose, held between TARGET TCs.
    pub target_pose: TargetPose,

    /// The current grip signal, held between GRIP TCs.
    pub grip_closed: bool,

    // ArmCtrl
    pub arm_ctrl: arm_ctrl::ArmCtrl,
    pub arm_ctrl_input: arm_ctrl::InputData,
    pub arm_ctrl_output: arm_ctrl::OutputData,
    pub arm_ctrl_status_rpt: arm_ctrl::StatusReport,

    // GripCtrl
    pub grip_ctrl: grip_ctrl::GripCtrl,
    pub grip_ctrl_input: grip_ctrl::InputData,
    pub grip_ctrl_output: grip_ctrl::OutputData,
    pub grip_ctrl_status_rpt: grip_ctrl::StatusReport,

    // DispCtrl
    pub disp_ctrl: disp_ctrl::DispCtrl,
    pub disp_ctrl_input: disp_ctrl::InputData,
    pub disp_ctrl_output: disp_ctrl::Dispatch,
    pub disp_ctrl_status_rpt: disp_ctrl::StatusReport,

    /// Demands assembled from the control module outputs this cycle.
    pub arm_dems: ArmDems,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the exec into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        if self.num_cycles % (cycle_frequency_hz as u128) == 0 {
            self.is_1_hz_cycle = true;
        } else {
            self.is_1_hz_cycle = false;
        }

        self.arm_ctrl_input = arm_ctrl::InputData::default();
        self.arm_ctrl_status_rpt = arm_ctrl::StatusReport::default();
        self.grip_ctrl_input = grip_ctrl::InputData::default();
        self.grip_ctrl_status_rpt = grip_ctrl::StatusReport::default();
        self.disp_ctrl_input = disp_ctrl::InputData::default();
        self.disp_ctrl_status_rpt = disp_ctrl::StatusReport::default();

        self.elapsed_time_s = util::session::get_elapsed_seconds();
    }
}
