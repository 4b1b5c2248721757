/// Health service
///
/// Reports whether the backing store answers.

use std::sync::Arc;
use tracing::warn;

use crate::store::HealthProbe;

#[derive(Debug, Clone)]
pub struct HealthService {
    probe: Arc<dyn HealthProbe>,
}

impl HealthService {
    pub fn new(probe: Arc<dyn HealthProbe>) -> Self {
        Self { probe }
    }

    /// Returns `true` when the store responds to a ping
    pub async fn check(&self) -> bool {
        match self.probe.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(trace = "service.health.check", error = %e, "Health check failed");
                false
            }
        }
    }
}
