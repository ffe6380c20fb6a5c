//! Main arm-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing and handling
//!         - Arm control processing (inverse kinematics)
//!         - Gripper control processing
//!         - Demand assembly
//!         - Dispatch control processing
//!         - Frame transmission to the arm bridge
//!
//! # Modules
//!
//! All modules (e.g. `arm_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use arm_lib::{braccio_client::BraccioClient, data_store::DataStore, disp_ctrl::Dispatch};
use comms_if::{eqpt::arm::BraccioFrame, net::NetParams};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.05;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Braccio Arm Executable\n");
    info!(
        "Software root: {:?}",
        host::get_braccio_sw_root().wrap_err("Failed to get software root")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // A single argument giving the pose script path is required
    if args.len() != 2 {
        return Err(eyre!(
            "Expected a single pose script argument, found {} arguments",
            args.len() - 1
        ));
    }

    info!("Loading script from \"{}\"", &args[1]);

    // Load the script interpreter
    let mut script = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

    // Display some info
    info!(
        "Loaded script lasts {:.02} s and contains {} TCs\n",
        script.get_duration(),
        script.get_num_tcs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.arm_ctrl
        .init("arm_ctrl.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete");

    ds.grip_ctrl
        .init("grip_ctrl.toml", &session)
        .wrap_err("Failed to initialise GripCtrl")?;
    info!("GripCtrl init complete");

    ds.disp_ctrl
        .init("disp_ctrl.toml", &session)
        .wrap_err("Failed to initialise DispCtrl")?;
    info!("DispCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let braccio_client =
        BraccioClient::new(&net_params).wrap_err("Failed to initialise the BraccioClient")?;

    info!("BraccioClient initialised, endpoint {}", net_params.braccio_endpoint_url);

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, tc);
                }
            }
            // Exit if end of script reached
            PendingTcs::EndOfScript => {
                info!("End of TC script reached, stopping");
                break;
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // The held command state feeds the modules each cycle
        ds.arm_ctrl_input.target = ds.target_pose;
        ds.grip_ctrl_input.close = ds.grip_closed;

        // ArmCtrl processing
        match ds.arm_ctrl.proc(&ds.arm_ctrl_input) {
            Ok((o, r)) => {
                ds.arm_ctrl_output = o;
                ds.arm_ctrl_status_rpt = r;
            }
            Err(e) => {
                // A bad target shouldn't bring the exec down, hold the
                // previous demands and continue.
                warn!("Error during ArmCtrl processing: {}", e)
            }
        };

        // GripCtrl processing
        match ds.grip_ctrl.proc(&ds.grip_ctrl_input) {
            Ok((o, r)) => {
                ds.grip_ctrl_output = o;
                ds.grip_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during GripCtrl processing: {}", e),
        };

        // ---- DEMAND ASSEMBLY ----

        ds.arm_dems.base_deg = ds.arm_ctrl_output.base_deg;
        ds.arm_dems.shoulder_deg = ds.arm_ctrl_output.shoulder_deg;
        ds.arm_dems.elbow_deg = ds.arm_ctrl_output.elbow_deg;
        ds.arm_dems.wrist_tilt_deg = ds.arm_ctrl_output.wrist_tilt_deg;
        ds.arm_dems.wrist_rot_deg = ds.arm_ctrl_output.wrist_rot_deg;
        ds.arm_dems.gripper_deg = ds.grip_ctrl_output.gripper_deg;
        ds.arm_dems.grip_logical = ds.grip_ctrl_output.grip_logical;

        // ---- DISPATCH PROCESSING ----

        ds.disp_ctrl_input.target_pos_m = ds.target_pose.pos_m;
        ds.disp_ctrl_input.dt_s = CYCLE_PERIOD_S;
        ds.disp_ctrl_input.grip_logical = ds.arm_dems.grip_logical;
        ds.disp_ctrl_input.safe = ds.safe;

        match ds.disp_ctrl.proc(&ds.disp_ctrl_input) {
            Ok((o, r)) => {
                ds.disp_ctrl_output = o;
                ds.disp_ctrl_status_rpt = r;
            }
            Err(e) => {
                warn!("Error during DispCtrl processing: {}", e);
                ds.disp_ctrl_output = Dispatch::Hold;
            }
        };

        match ds.disp_ctrl_output {
            Dispatch::Hold => (),
            d => {
                let frame = BraccioFrame::from_dems(&ds.arm_dems);

                info!(
                    "Dispatching frame ({:?}): [{}, {}, {}, {}, {}, {}] grip {}",
                    d, frame.m1, frame.m2, frame.m3, frame.m4, frame.m5, frame.m6,
                    frame.gripper_state
                );

                braccio_client.send_frame(&frame);
            }
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.arm_ctrl.write() {
            warn!("Could not write ArmCtrl archives: {}", e);
        }
        if let Err(e) = ds.grip_ctrl.write() {
            warn!("Could not write GripCtrl archives: {}", e);
        }
        if let Err(e) = ds.disp_ctrl.write() {
            warn!("Could not write DispCtrl archives: {}", e);
        }

        // ---- STATUS ----

        if ds.is_1_hz_cycle {
            debug!(
                "[{:.2} s] dems: [{:.1}, {:.1}, {:.1}, {:.1}, {:.1}, {:.1}], {:?}, {:?}{}",
                ds.elapsed_time_s,
                ds.arm_dems.base_deg,
                ds.arm_dems.shoulder_deg,
                ds.arm_dems.elbow_deg,
                ds.arm_dems.wrist_tilt_deg,
                ds.arm_dems.wrist_rot_deg,
                ds.arm_dems.gripper_deg,
                ds.arm_ctrl_status_rpt.reachability,
                ds.disp_ctrl_status_rpt.motion_state,
                if ds.safe { " (SAFE)" } else { "" }
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    Ok(())
}
