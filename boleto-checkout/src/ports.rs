use std::time::Duration;

use async_trait::async_trait;

/// Injectable delay source so the bounded payment-record poll can run with
/// zero wall-clock delay in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Navigation failed: {0}")]
pub struct NavigationError(pub String);

/// Sends the user to the provider's approve URL. The terminal app prints the
/// URL and tries to open a browser; tests record the call.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str) -> Result<(), NavigationError>;
}
