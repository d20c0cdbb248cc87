use std::future::Future;
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use crate::MvcApprovalsBuilder;

/// Health of a server during startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Ready to serve pages.
    Healthy,
    /// Not ready yet, check again later.
    Unhealthy,
    /// No custom check: wait until a TCP connection succeeds.
    Uncheckable,
}

/// A web application that can be started for approval tests.
///
/// # Example
///
/// ```rust,no_run
/// use std::net::TcpListener;
///
/// use mvc_approvals::harness::TestServer;
///
/// #[derive(Debug)]
/// struct MyApp;
///
/// impl TestServer for MyApp {
///     type Error = std::io::Error;
///
///     async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
///         listener.set_nonblocking(true)?;
///         let _listener = tokio::net::TcpListener::from_std(listener)?;
///         // axum::serve(listener, app).await
///         Ok(())
///     }
/// }
/// ```
pub trait TestServer {
    /// Error raised by the server.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serves the application on `listener` (bound to `127.0.0.1` on a free
    /// port) until the task is aborted.
    fn launch(&self, listener: TcpListener) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Reports whether the application at `addr` is ready.
    ///
    /// The default answers [`HealthStatus::Uncheckable`].
    fn is_healthy(
        &self,
        _addr: SocketAddr,
    ) -> impl Future<Output = Result<HealthStatus, Self::Error>> + Send {
        std::future::ready(Ok(HealthStatus::Uncheckable))
    }

    /// Harness configuration for this server.
    fn config(&self) -> TestServerConfig {
        TestServerConfig::default()
    }
}

/// Startup configuration of an [`MvcHarness`](super::MvcHarness).
#[derive(Debug, Clone)]
pub struct TestServerConfig {
    /// Base configuration of the approvals; the port is always overridden
    /// with the bound one.
    pub approvals: Option<MvcApprovalsBuilder>,

    /// First delay between health checks.
    pub min_backoff_delay: Duration,

    /// Upper bound of the delay between health checks.
    pub max_backoff_delay: Duration,

    /// Whether to add jitter to health-check delays.
    pub backoff_jitter: bool,

    /// Number of health checks before giving up.
    pub max_retry_attempts: usize,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            approvals: None,
            min_backoff_delay: Duration::from_millis(10),
            max_backoff_delay: Duration::from_secs(1),
            backoff_jitter: true,
            max_retry_attempts: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TestServerConfig::default();

        assert!(config.approvals.is_none());
        assert_eq!(config.min_backoff_delay, Duration::from_millis(10));
        assert_eq!(config.max_backoff_delay, Duration::from_secs(1));
        assert!(config.backoff_jitter);
        assert_eq!(config.max_retry_attempts, 10);
    }
}
