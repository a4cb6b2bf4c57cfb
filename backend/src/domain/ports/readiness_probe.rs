//! Port for checking that backing services can take traffic.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by readiness probes.
    pub enum ReadinessProbeError {
        /// The dependency did not answer.
        Unavailable { message: String } => "dependency unavailable: {message}",
    }
}

/// A dependency the readiness endpoint consults before reporting ready.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Return `Ok` when the dependency answers.
    async fn check(&self) -> Result<(), ReadinessProbeError>;
}
