//! # Braccio bridge client
//!
//! Sends assembled frames to the arm's HTTP bridge. Sends are fire and
//! forget: the request is spawned onto a small runtime and the control loop
//! carries on without waiting for the response, which is only ever logged.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use std::time::Duration;
use thiserror::Error;

// Internal
use comms_if::eqpt::arm::BraccioFrame;
use comms_if::net::NetParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Client for the arm's HTTP bridge endpoint.
pub struct BraccioClient {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    endpoint_url: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur when creating the client.
#[derive(Debug, Error)]
pub enum BraccioClientError {
    #[error("Could not start the client runtime: {0}")]
    RuntimeInit(std::io::Error),

    #[error("Could not build the HTTP client: {0}")]
    HttpClientBuild(reqwest::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BraccioClient {
    /// Create a new client from the network parameters.
    pub fn new(params: &NetParams) -> Result<Self, BraccioClientError> {
        // A single worker is plenty, requests are tiny and infrequent
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(BraccioClientError::RuntimeInit)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(params.request_timeout_s))
            .build()
            .map_err(BraccioClientError::HttpClientBuild)?;

        Ok(Self {
            client,
            runtime,
            endpoint_url: params.braccio_endpoint_url.clone(),
        })
    }

    /// Send a frame to the bridge, returning immediately.
    ///
    /// The outcome of the request does not feed back into the control loop,
    /// failures are logged and the frame is simply lost.
    pub fn send_frame(&self, frame: &BraccioFrame) {
        let client = self.client.clone();
        let url = self.endpoint_url.clone();
        let frame = *frame;

        self.runtime.spawn(async move {
            match client.post(&url).json(&frame).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!("Frame {} acknowledged ({})", frame.timestamp, resp.status())
                }
                Ok(resp) => warn!(
                    "Bridge returned {} for frame {}",
                    resp.status(),
                    frame.timestamp
                ),
                Err(e) => warn!("Could not send frame {}: {}", frame.timestamp, e),
            }
        });
    }
}
