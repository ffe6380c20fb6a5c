//! # Telecommand processor module
//!
//! The telecommand processor handles the TCs coming from the pose script,
//! updating the held command state in the data store.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use arm_lib::data_store::{DataStore, SafeModeCause};
use comms_if::tc::Tc;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) {
    // Handle different Tcs
    match tc {
        Tc::None | Tc::Heartbeat => (),
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        }
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        }
        Tc::ArmTarget(t) => {
            debug!("New target pose: {:?}", t);
            ds.target_pose = *t;
        }
        Tc::Grip { closed } => {
            debug!("New grip signal: closed = {}", closed);
            ds.grip_closed = *closed;
        }
    }
}
