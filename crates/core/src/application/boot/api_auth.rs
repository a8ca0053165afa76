// Token exchange with KabuStation's local API

use tracing::{info, warn};

use super::{ActionResult, BootOrchestrator};
use crate::domain::{BootFailure, BootReport};

impl BootOrchestrator {
    /// Exchange the configured API password for a session token and store it
    ///
    /// Touches no process. Each call overwrites the previous token on success;
    /// a failure leaves the stored token as it was.
    pub async fn authenticate_api(&self) -> ActionResult {
        let token = self
            .token_gateway
            .authenticate(&self.settings.api_password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Token exchange failed");
                BootFailure::new("Token exchange with KabuStation API failed", e)
            })?;

        self.token_store.set(token);
        info!("Session token stored");

        Ok(BootReport::new("KabuStation API token acquired"))
    }
}
