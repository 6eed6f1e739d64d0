//! Timeout guard for completion calls.
//!
//! A slow backend must not hold a request forever. The wrapped provider is
//! called exactly once; there are no retries.

use async_trait::async_trait;
use eduassist_core::error::ProviderError;
use eduassist_core::provider::CompletionRequest;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// A provider that bounds every completion call of an inner provider.
pub struct TimeoutProvider {
    inner: Arc<dyn eduassist_core::Provider>,
    timeout: Duration,
}

impl TimeoutProvider {
    pub fn new(inner: Arc<dyn eduassist_core::Provider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl eduassist_core::Provider for TimeoutProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<String, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    provider = %self.inner.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Completion timed out"
                );
                Err(ProviderError::Timeout(format!(
                    "Provider '{}' timed out after {}s",
                    self.inner.name(),
                    self.timeout.as_secs()
                )))
            }
        }
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.health_check()).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    }
}
