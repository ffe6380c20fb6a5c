//! Dispatch control module
//!
//! DispCtrl decides when the assembled demands are actually transmitted to
//! the arm. Position demands are debounced: a frame only goes out once the
//! target has stopped moving for a stabilisation window, and at most one
//! frame is sent per stable period. Grip state changes pre-empt the window
//! and go out immediately.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DispCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DispCtrlError {
    #[error("Recieved a non-finite target position: {0:#?}")]
    NonFiniteTarget(nalgebra::Vector3<f64>),
}
