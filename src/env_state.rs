//! # karst environment state
//!
//! This module defines [`crate::env_state::KarstEnv`], the **shared
//! environment object** of the `karst` library. It owns the persistent
//! **HTTP client** used for declination lookups, configured with a bounded
//! global timeout so a slow geomagnetic service can never stall a caller.
//!
//! The object is cheaply cloneable and passed to the services that need
//! external data; the reconstruction engine itself never touches it.
//!
//! ## Structure
//!
//! ```text
//! KarstEnv
//! └── http_client (ureq::Agent)
//! ```

use std::time::Duration;

use ureq::Agent;

use crate::karst_errors::KarstError;

/// Timeout applied to every outgoing request, including the declination
/// lookup, which is best-effort and not retried.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared environment: the HTTP client used by external-data services.
#[derive(Debug, Clone)]
pub struct KarstEnv {
    pub http_client: Agent,
}

impl Default for KarstEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl KarstEnv {
    /// Create a new environment with a default-configured HTTP client.
    pub fn new() -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .build();
        KarstEnv {
            http_client: config.into(),
        }
    }

    /// Perform a GET request and return the response body as a string.
    ///
    /// Arguments
    /// ---------
    /// * `url`: the full request URL
    ///
    /// Return
    /// ------
    /// * the body, or the transport error — callers on best-effort paths
    ///   degrade it to "unavailable" instead of propagating
    pub(crate) fn get_from_url(&self, url: &str) -> Result<String, KarstError> {
        Ok(self
            .http_client
            .get(url)
            .call()?
            .body_mut()
            .read_to_string()?)
    }
}
