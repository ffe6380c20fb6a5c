//! Implementations for the GripCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::Params;
use comms_if::eqpt::arm::{GRIPPER_OPEN_DEG, GRIP_LOGICAL_CLOSED, GRIP_LOGICAL_OPEN};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gripper control module state
#[derive(Default)]
pub struct GripCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) state: GripperState,
}

/// Input data to Gripper Control.
#[derive(Default)]
pub struct InputData {
    /// True if the grip signal requests the gripper to close.
    pub close: bool,
}

/// Output demand from GripCtrl.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct OutputData {
    /// Gripper (M6) servo position demand.
    ///
    /// Units: degrees
    pub gripper_deg: f64,

    /// Logical gripper state, 1 = open, 0 = closed.
    pub grip_logical: u8,
}

/// Status report for GripCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The gripper state after this cycle's processing.
    pub state: GripperState,

    /// True if the state changed this cycle.
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The two positions the gripper can be demanded to.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub enum GripperState {
    Open,
    Closed,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for GripperState {
    fn default() -> Self {
        GripperState::Open
    }
}

impl GripperState {
    /// The logical value carried on the wire for this state, 1 = open,
    /// 0 = closed.
    pub fn logical(&self) -> u8 {
        match self {
            GripperState::Open => GRIP_LOGICAL_OPEN,
            GripperState::Closed => GRIP_LOGICAL_CLOSED,
        }
    }
}

impl Default for OutputData {
    fn default() -> Self {
        // Open, using the shared default so the pre-first-cycle demand
        // agrees with `ArmDems::default`
        OutputData {
            gripper_deg: GRIPPER_OPEN_DEG,
            grip_logical: GRIP_LOGICAL_OPEN,
        }
    }
}

impl State for GripCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = super::GripCtrlError;

    /// Initialise the GripCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e),
        };

        // Create the arch folder for grip_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("grip_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        self.arch_report = Archiver::from_path(session, "grip_ctrl/status_report.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Gripper Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        if !(self.params.angle_open_deg.is_finite() && self.params.angle_closed_deg.is_finite()) {
            return Err(super::GripCtrlError::NonFiniteAngles(
                self.params.angle_open_deg,
                self.params.angle_closed_deg,
            ));
        }

        let new_state = if input_data.close {
            GripperState::Closed
        } else {
            GripperState::Open
        };

        if new_state != self.state {
            debug!("Gripper transition: {:?} -> {:?}", self.state, new_state);
            self.state = new_state;
            self.report.changed = true;
        }

        self.report.state = self.state;

        let output = OutputData {
            gripper_deg: match self.state {
                GripperState::Open => self.params.angle_open_deg,
                GripperState::Closed => self.params.angle_closed_deg,
            },
            grip_logical: self.state.logical(),
        };

        Ok((output, self.report))
    }
}

impl Archived for GripCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_grip() -> GripCtrl {
        let mut ctrl = GripCtrl::default();
        ctrl.params = Params {
            angle_open_deg: 73.0,
            angle_closed_deg: 10.0,
        };
        ctrl
    }

    #[test]
    fn test_default_output_matches_dems_default() {
        // The pre-first-cycle output and the assembled demand defaults must
        // agree on the gripper, both come from the shared constants.
        let out = OutputData::default();
        let dems = comms_if::eqpt::arm::ArmDems::default();

        assert_eq!(out.gripper_deg, dems.gripper_deg);
        assert_eq!(out.grip_logical, dems.grip_logical);
    }

    #[test]
    fn test_starts_open() {
        let mut ctrl = test_grip();

        let (out, rpt) = ctrl.proc(&InputData { close: false }).unwrap();

        assert_eq!(rpt.state, GripperState::Open);
        assert!(!rpt.changed);
        assert_eq!(out.gripper_deg, 73.0);
        assert_eq!(out.grip_logical, 1);
    }

    #[test]
    fn test_close_open_cycle() {
        let mut ctrl = test_grip();

        // Close
        let (out, rpt) = ctrl.proc(&InputData { close: true }).unwrap();
        assert_eq!(rpt.state, GripperState::Closed);
        assert!(rpt.changed);
        assert_eq!(out.gripper_deg, 10.0);
        assert_eq!(out.grip_logical, 0);

        // Holding closed is not a transition
        let (_, rpt) = ctrl.proc(&InputData { close: true }).unwrap();
        assert!(!rpt.changed);

        // Reopen
        let (out, rpt) = ctrl.proc(&InputData { close: false }).unwrap();
        assert_eq!(rpt.state, GripperState::Open);
        assert!(rpt.changed);
        assert_eq!(out.gripper_deg, 73.0);
        assert_eq!(out.grip_logical, 1);
    }
}
