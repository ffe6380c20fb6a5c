//! Parameters structure for DispCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Dispatch control.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Displacement of the target below which it is considered stationary.
    ///
    /// Units: meters
    pub movement_epsilon_m: f64,

    /// Time the target must remain stationary before a frame is dispatched.
    ///
    /// Units: seconds
    pub stabilisation_window_s: f64,

    /// Minimum time between consecutive stable dispatches. Does not apply
    /// to grip change dispatches.
    ///
    /// Units: seconds
    pub min_send_interval_s: f64,
}
