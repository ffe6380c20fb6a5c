//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{ArmGeometry, Params};
use comms_if::eqpt::arm::TargetPose;
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) params: Params,

    pub(crate) geom: ArmGeometry,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,
}

/// Input data to Arm Control.
#[derive(Default)]
pub struct InputData {
    /// The target pose the end effector should reach this cycle.
    pub target: TargetPose,
}

/// Output joint demands from ArmCtrl.
///
/// All values are servo positions already clamped to the safe range of each
/// joint.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct OutputData {
    /// Base (M1) servo position demand.
    ///
    /// Units: degrees
    pub base_deg: f64,

    /// Shoulder (M2) servo position demand.
    ///
    /// Units: degrees
    pub shoulder_deg: f64,

    /// Elbow (M3) servo position demand.
    ///
    /// Units: degrees
    pub elbow_deg: f64,

    /// Wrist tilt (M4) servo position demand.
    ///
    /// Units: degrees
    pub wrist_tilt_deg: f64,

    /// Wrist rotation (M5) servo position demand.
    ///
    /// Units: degrees
    pub wrist_rot_deg: f64,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Whether the solved pose reaches the target or stops at the edge of
    /// the arm's envelope.
    pub reachability: Reachability,

    /// True if the target lay behind the base and the reach-behind fold was
    /// applied.
    pub backwards: bool,

    /// True if the wrist tilt is actively holding the end effector level.
    pub horizontal_hold: bool,

    pub base_limited: bool,
    pub shoulder_limited: bool,
    pub elbow_limited: bool,
    pub wrist_tilt_limited: bool,
    pub wrist_rot_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Whether a target pose could be fully reached.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub enum Reachability {
    /// The target is inside the arm's envelope.
    Reachable,

    /// The target is outside the envelope, the demands point at the closest
    /// point on its boundary.
    AtLimit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for OutputData {
    fn default() -> Self {
        // All joints centred
        OutputData {
            base_deg: 90.0,
            shoulder_deg: 90.0,
            elbow_deg: 90.0,
            wrist_tilt_deg: 90.0,
            wrist_rot_deg: 90.0,
        }
    }
}

impl Default for Reachability {
    fn default() -> Self {
        Reachability::Reachable
    }
}

impl State for ArmCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = super::ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e),
        };

        // Build the calibrated geometry from the parameters
        self.geom = ArmGeometry::from_params(&self.params);

        // Create the arch folder for arm_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("arm_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(session, "arm_ctrl/status_report.csv").unwrap();
        self.arch_output = Archiver::from_path(session, "arm_ctrl/output.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Arm Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        // Reject targets containing non-finite values, holding the previous
        // output instead.
        let t = &input_data.target;
        if !(t.pos_m.x.is_finite()
            && t.pos_m.y.is_finite()
            && t.pos_m.z.is_finite()
            && t.yaw_deg.is_finite())
        {
            return Err(super::ArmCtrlError::NonFiniteTarget(*t));
        }

        let output = self.calc_ik(t);

        trace!(
            "ArmCtrl output: base {:.1}, shoulder {:.1}, elbow {:.1}, \
            wrist tilt {:.1}, wrist rot {:.1} ({:?})",
            output.base_deg,
            output.shoulder_deg,
            output.elbow_deg,
            output.wrist_tilt_deg,
            output.wrist_rot_deg,
            self.report.reachability
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for ArmCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Write each one individually
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output.unwrap_or_default())?;

        Ok(())
    }
}
