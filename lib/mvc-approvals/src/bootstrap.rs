//! Host-side bootstrap for axum applications.
//!
//! Merge [`router`] into the application served during tests so that
//! [`MvcApprovals::verify_approval_bootstrap`](crate::MvcApprovals::verify_approval_bootstrap)
//! succeeds:
//!
//! ```rust
//! use axum::Router;
//! use axum::routing::get;
//!
//! let app: Router = Router::new()
//!     .route("/Home/Index", get(|| async { "<html></html>" }))
//!     .merge(mvc_approvals::bootstrap::router());
//! ```

use axum::Router;
use axum::extract::Path;
use axum::routing::get;
use tracing::debug;

use crate::route::BOOTSTRAP_ECHO_PREFIX;

/// Routes registered by the bootstrap: `GET /ApprovalTests/Echo/{text}`.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(&format!("{BOOTSTRAP_ECHO_PREFIX}/{{text}}"), get(echo))
}

async fn echo(Path(text): Path<String>) -> String {
    debug!(%text, "echo");
    text
}
