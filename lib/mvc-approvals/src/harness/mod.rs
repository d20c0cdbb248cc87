//! Test-harness bootstrap: starts the application under test on a free port
//! and hands out an [`MvcApprovals`] pointing at it.
//!
//! The harness owns the port for the lifetime of the test, and stops the
//! server when dropped.
//!
//! ```rust,no_run
//! use std::net::TcpListener;
//!
//! use mvc_approvals::ActionTarget;
//! use mvc_approvals::harness::{MvcHarness, TestServer};
//!
//! #[derive(Debug)]
//! struct MyApp;
//!
//! impl TestServer for MyApp {
//!     type Error = std::io::Error;
//!
//!     async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
//!         listener.set_nonblocking(true)?;
//!         let _listener = tokio::net::TcpListener::from_std(listener)?;
//!         // serve the application here
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::test]
//! async fn home_page() -> Result<(), Box<dyn std::error::Error>> {
//!     let harness = MvcHarness::start(MyApp).await?;
//!     harness.verify_page(&ActionTarget::new("Home", "Index")).await?;
//!     Ok(())
//! }
//! ```

use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::{debug, error};

use crate::{MvcApprovals, MvcError};

mod test_server;
pub use self::test_server::*;

/// Errors raised while starting the application under test.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum HarnessError {
    /// Binding the listener failed.
    #[display("I/O error: {_0}")]
    IoError(std::io::Error),

    /// The approvals configuration is invalid.
    #[display("Configuration error: {_0}")]
    ConfigError(MvcError),

    /// The server did not become healthy in time.
    #[from(skip)]
    #[display("Server failed to become healthy within {timeout:?}")]
    UnhealthyServer {
        /// The largest backoff delay used while waiting.
        timeout: Duration,
    },
}

/// A running application and the [`MvcApprovals`] targeting it.
///
/// Derefs to [`MvcApprovals`], so every `verify_*` operation is available
/// directly.
#[derive(Debug, derive_more::Deref)]
pub struct MvcHarness<T> {
    local_addr: SocketAddr,
    #[deref]
    approvals: MvcApprovals,
    handle: Option<tokio::task::JoinHandle<()>>,
    test_server: Arc<T>,
}

impl<T> MvcHarness<T>
where
    T: TestServer + Send + Sync + 'static,
{
    /// Starts `test_server` on `127.0.0.1` with a free port and waits until
    /// it is healthy.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    /// - no port can be bound
    /// - the configured approvals are invalid
    /// - the server does not become healthy within the retry budget
    pub async fn start(test_server: T) -> Result<Self, HarnessError> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
        let listener = TcpListener::bind(addr)?;
        let local_addr = listener.local_addr()?;

        let test_server = Arc::new(test_server);
        let handle = tokio::spawn({
            let server = Arc::clone(&test_server);
            async move {
                if let Err(error) = server.launch(listener).await {
                    error!(?error, "Server launch failed");
                }
            }
        });

        let TestServerConfig {
            approvals,
            min_backoff_delay,
            max_backoff_delay,
            backoff_jitter,
            max_retry_attempts,
        } = test_server.config();

        let approvals = approvals
            .unwrap_or_else(MvcApprovals::builder)
            .with_host(Ipv4Addr::LOCALHOST.to_string())
            .with_port(local_addr.port())
            .build()?;

        let mut backoff = ExponentialBuilder::default()
            .with_min_delay(min_backoff_delay)
            .with_max_delay(max_backoff_delay)
            .with_max_times(max_retry_attempts);
        if backoff_jitter {
            backoff = backoff.with_jitter();
        }

        if !Self::wait_for_health(&test_server, local_addr, backoff).await {
            handle.abort();
            return Err(HarnessError::UnhealthyServer {
                timeout: max_backoff_delay,
            });
        }

        Ok(Self {
            local_addr,
            approvals,
            handle: Some(handle),
            test_server,
        })
    }

    async fn wait_for_health(
        test_server: &Arc<T>,
        local_addr: SocketAddr,
        backoff: ExponentialBuilder,
    ) -> bool {
        let health_check = || {
            let server = Arc::clone(test_server);
            async move {
                match server.is_healthy(local_addr).await {
                    Ok(HealthStatus::Healthy) => {
                        debug!(%local_addr, "server healthy");
                        Ok(true)
                    }
                    Ok(HealthStatus::Unhealthy) => {
                        debug!(%local_addr, "server not yet healthy, retrying");
                        Err(std::io::Error::new(
                            std::io::ErrorKind::ConnectionRefused,
                            "Server not healthy yet",
                        ))
                    }
                    Ok(HealthStatus::Uncheckable) => {
                        tokio::net::TcpStream::connect(local_addr).await?;
                        debug!(%local_addr, "server accepts connections");
                        Ok(true)
                    }
                    Err(error) => {
                        error!(?error, "Health check error");
                        Ok(false)
                    }
                }
            }
        };

        health_check.retry(backoff).await.unwrap_or(false)
    }

    /// Address the server listens on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The application under test, shared with its server task.
    pub fn test_server(&self) -> &T {
        &self.test_server
    }
}

impl<T> Drop for MvcHarness<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
