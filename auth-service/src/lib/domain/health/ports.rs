use async_trait::async_trait;

/// A dependency the service needs in order to be considered healthy.
#[async_trait]
pub trait HealthIndicator: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Probe the dependency, returning a human readable reason on failure.
    async fn check(&self) -> Result<(), String>;
}
