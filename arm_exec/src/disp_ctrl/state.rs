//! Implementations for the DispCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::Params;
use comms_if::eqpt::arm::GRIP_LOGICAL_OPEN;
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Dispatch control module state
pub struct DispCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// Reference position displacement is measured against. Tracks the
    /// target while it moves and is pinned at each dispatch.
    ref_target_pos_m: Option<Vector3<f64>>,

    /// Time the target has been stationary.
    stable_time_s: f64,

    /// Time since the last dispatch of any kind.
    time_since_send_s: f64,

    /// True once the current stable period has had its frame sent.
    already_sent: bool,

    /// Logical grip state carried by the last dispatched frame.
    last_sent_grip: u8,
}

/// Input data to Dispatch Control.
#[derive(Debug)]
pub struct InputData {
    /// The current target position.
    ///
    /// Units: meters,
    /// Frame: Arm base
    pub target_pos_m: Vector3<f64>,

    /// Time elapsed since the previous cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Logical grip state of the demands assembled this cycle.
    pub grip_logical: u8,

    /// True if the exec is in safe mode, inhibiting all dispatches.
    pub safe: bool,
}

/// Status report for DispCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Where the dispatcher is in its debounce cycle.
    pub motion_state: MotionState,

    /// Time the target has been stationary.
    ///
    /// Units: seconds
    pub stable_time_s: f64,

    /// Displacement of the target from the reference position this cycle.
    ///
    /// Units: meters
    pub displacement_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The dispatch decision for this cycle.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub enum Dispatch {
    /// Do not transmit this cycle.
    Hold,

    /// Transmit, the target has been stable for the full window.
    SendStable,

    /// Transmit immediately, the grip state changed.
    SendGripChange,
}

/// Where the dispatcher is in its debounce cycle.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub enum MotionState {
    /// The target is moving, no dispatch will occur.
    Moving,

    /// The target is stationary but the window has not yet elapsed.
    Stabilising,

    /// The stable period's frame has been sent.
    IdleSent,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DispCtrl {
    fn default() -> Self {
        DispCtrl {
            params: Params::default(),
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            ref_target_pos_m: None,
            stable_time_s: 0.0,
            time_since_send_s: 0.0,
            already_sent: false,
            // The arm starts open, so only a transition away from open
            // counts as a change.
            last_sent_grip: GRIP_LOGICAL_OPEN,
        }
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Dispatch::Hold
    }
}

impl Default for MotionState {
    fn default() -> Self {
        MotionState::Moving
    }
}

impl Default for InputData {
    fn default() -> Self {
        InputData {
            target_pos_m: Vector3::zeros(),
            dt_s: 0.0,
            grip_logical: GRIP_LOGICAL_OPEN,
            safe: false,
        }
    }
}

impl State for DispCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = Dispatch;
    type StatusReport = StatusReport;
    type ProcError = super::DispCtrlError;

    /// Initialise the DispCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e),
        };

        // Create the arch folder for disp_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("disp_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        self.arch_report = Archiver::from_path(session, "disp_ctrl/status_report.csv").unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Dispatch Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !(input_data.target_pos_m.x.is_finite()
            && input_data.target_pos_m.y.is_finite()
            && input_data.target_pos_m.z.is_finite())
        {
            return Err(super::DispCtrlError::NonFiniteTarget(input_data.target_pos_m));
        }

        // Clear the status report
        self.report = StatusReport::default();

        self.time_since_send_s += input_data.dt_s;

        // Grip changes pre-empt the stabilisation window
        if input_data.grip_logical != self.last_sent_grip && !input_data.safe {
            debug!(
                "Grip change ({} -> {}), dispatching immediately",
                self.last_sent_grip, input_data.grip_logical
            );
            self.record_dispatch(input_data);
            self.report.motion_state = MotionState::IdleSent;
            self.report.stable_time_s = self.stable_time_s;

            return Ok((Dispatch::SendGripChange, self.report));
        }

        // The first cycle pins the reference to the current target
        let displacement_m = match self.ref_target_pos_m {
            Some(r) => (input_data.target_pos_m - r).norm(),
            None => {
                self.ref_target_pos_m = Some(input_data.target_pos_m);
                0.0
            }
        };
        self.report.displacement_m = displacement_m;

        let decision = if displacement_m > self.params.movement_epsilon_m {
            // Moving: track the target and restart the window
            self.ref_target_pos_m = Some(input_data.target_pos_m);
            self.stable_time_s = 0.0;
            self.already_sent = false;
            self.report.motion_state = MotionState::Moving;

            Dispatch::Hold
        } else {
            self.stable_time_s += input_data.dt_s;

            if self.already_sent {
                self.report.motion_state = MotionState::IdleSent;

                Dispatch::Hold
            } else if self.stable_time_s >= self.params.stabilisation_window_s
                && self.time_since_send_s >= self.params.min_send_interval_s
                && !input_data.safe
            {
                debug!(
                    "Target stable for {:.2} s, dispatching",
                    self.stable_time_s
                );
                self.record_dispatch(input_data);
                self.report.motion_state = MotionState::IdleSent;

                Dispatch::SendStable
            } else {
                self.report.motion_state = MotionState::Stabilising;

                Dispatch::Hold
            }
        };

        self.report.stable_time_s = self.stable_time_s;

        Ok((decision, self.report))
    }
}

impl Archived for DispCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;

        Ok(())
    }
}

impl DispCtrl {
    /// Record that a frame is going out this cycle.
    fn record_dispatch(&mut self, input_data: &InputData) {
        self.ref_target_pos_m = Some(input_data.target_pos_m);
        self.last_sent_grip = input_data.grip_logical;
        self.time_since_send_s = 0.0;
        self.already_sent = true;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Cycle period used by the tests.
    const DT_S: f64 = 0.05;

    fn test_disp(window_s: f64, min_send_interval_s: f64) -> DispCtrl {
        let mut ctrl = DispCtrl::default();
        ctrl.params = Params {
            movement_epsilon_m: 0.001,
            stabilisation_window_s: window_s,
            min_send_interval_s,
        };
        ctrl
    }

    fn input(target_pos_m: Vector3<f64>, grip_logical: u8, safe: bool) -> InputData {
        InputData {
            target_pos_m,
            dt_s: DT_S,
            grip_logical,
            safe,
        }
    }

    #[test]
    fn test_single_dispatch_when_stable() {
        let mut ctrl = test_disp(0.5, 0.0);
        let pos = Vector3::new(0.0, 0.1, 0.5);

        let mut sends = 0;

        for _ in 0..20 {
            let (d, _) = ctrl.proc(&input(pos, 1, false)).unwrap();
            if d == Dispatch::SendStable {
                sends += 1;
            }
        }

        // Exactly one frame for the whole stable period
        assert_eq!(sends, 1);
        assert_eq!(ctrl.report.motion_state, MotionState::IdleSent);
    }

    #[test]
    fn test_no_dispatch_while_moving() {
        let mut ctrl = test_disp(0.5, 0.0);

        for i in 0..30 {
            // Move the target 1 cm per cycle
            let pos = Vector3::new(0.0, 0.1, 0.01 * i as f64);
            let (d, r) = ctrl.proc(&input(pos, 1, false)).unwrap();

            assert_eq!(d, Dispatch::Hold);
            if i > 0 {
                assert_eq!(r.motion_state, MotionState::Moving);
            }
        }
    }

    #[test]
    fn test_dispatch_after_motion_stops() {
        let mut ctrl = test_disp(0.3, 0.0);

        for i in 0..10 {
            let pos = Vector3::new(0.0, 0.1, 0.01 * i as f64);
            let (d, _) = ctrl.proc(&input(pos, 1, false)).unwrap();
            assert_eq!(d, Dispatch::Hold);
        }

        let rest = Vector3::new(0.0, 0.1, 0.09);
        let mut sends = 0;

        for _ in 0..10 {
            let (d, _) = ctrl.proc(&input(rest, 1, false)).unwrap();
            if d == Dispatch::SendStable {
                sends += 1;
            }
        }

        assert_eq!(sends, 1);
    }

    #[test]
    fn test_grip_preemption() {
        let mut ctrl = test_disp(0.5, 0.0);
        let pos = Vector3::new(0.0, 0.1, 0.5);

        // Part way into the window...
        for _ in 0..3 {
            let (d, _) = ctrl.proc(&input(pos, 1, false)).unwrap();
            assert_eq!(d, Dispatch::Hold);
        }

        // ...the grip closes and goes out immediately
        let (d, _) = ctrl.proc(&input(pos, 0, false)).unwrap();
        assert_eq!(d, Dispatch::SendGripChange);

        // The grip dispatch carried the pose too, so the stable period does
        // not produce a second frame
        for _ in 0..20 {
            let (d, _) = ctrl.proc(&input(pos, 0, false)).unwrap();
            assert_eq!(d, Dispatch::Hold);
        }
    }

    #[test]
    fn test_min_send_interval() {
        // Short window but a long interval between sends
        let mut ctrl = test_disp(0.1, 1.0);
        let pos = Vector3::new(0.0, 0.1, 0.5);

        let mut send_cycle = None;

        for i in 1..=30 {
            let (d, _) = ctrl.proc(&input(pos, 1, false)).unwrap();
            if d == Dispatch::SendStable {
                assert!(send_cycle.is_none());
                send_cycle = Some(i);
            }
        }

        // 20 cycles of 0.05 s to satisfy the 1 s interval
        assert_eq!(send_cycle, Some(20));
    }

    #[test]
    fn test_safe_mode_inhibits_dispatch() {
        let mut ctrl = test_disp(0.2, 0.0);
        let pos = Vector3::new(0.0, 0.1, 0.5);

        for _ in 0..30 {
            let (d, _) = ctrl.proc(&input(pos, 1, true)).unwrap();
            assert_eq!(d, Dispatch::Hold);
        }

        // Once safe mode clears the accumulated stable time releases a
        // single frame
        let (d, _) = ctrl.proc(&input(pos, 1, false)).unwrap();
        assert_eq!(d, Dispatch::SendStable);
    }

    #[test]
    fn test_safe_mode_holds_grip_change() {
        let mut ctrl = test_disp(10.0, 0.0);
        let pos = Vector3::new(0.0, 0.1, 0.5);

        // Grip change while safe must not go out
        let (d, _) = ctrl.proc(&input(pos, 0, true)).unwrap();
        assert_eq!(d, Dispatch::Hold);

        // It is dispatched as soon as safe mode clears
        let (d, _) = ctrl.proc(&input(pos, 0, false)).unwrap();
        assert_eq!(d, Dispatch::SendGripChange);
    }
}
