//! # Network module
//!
//! Common network configuration for the software. The arm is commanded over
//! a single HTTP endpoint, so unlike a full socket stack this module only
//! carries the parameters the transport client needs.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters, loaded from `net.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// URL of the arm bridge endpoint which accepts posted `BraccioFrame`s.
    ///
    /// For example `http://127.0.0.1:5000/api/braccio_angles`.
    pub braccio_endpoint_url: String,

    /// Timeout applied to each request.
    ///
    /// Units: seconds
    pub request_timeout_s: f64,
}
