//! Starts a small axum application and approves its home page.
//!
//! ```sh
//! cargo run -p mvc-approvals --example verify_home --features axum
//! ```
//!
//! The first run writes `approvals/Home.Index.received.html`; rename it to
//! `Home.Index.approved.html` and the next run passes.

use std::net::TcpListener;

use axum::Router;
use axum::response::Html;
use axum::routing::get;
use mvc_approvals::harness::{MvcHarness, TestServer};
use mvc_approvals::{ActionTarget, Controller};
use tracing::{info, warn};

#[derive(Debug)]
struct HomeApp;

struct HomeController;
impl Controller for HomeController {}

impl TestServer for HomeApp {
    type Error = std::io::Error;

    async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
        listener.set_nonblocking(true)?;
        let listener = tokio::net::TcpListener::from_std(listener)?;
        let app = Router::new()
            .route("/Home/Index", get(index))
            .merge(mvc_approvals::bootstrap::router());
        axum::serve(listener, app).await
    }
}

async fn index() -> Html<&'static str> {
    Html(
        r#"<html>
<head><title>Welcome</title></head>
<body>
<form method="post"><input name="__RequestVerificationToken" type="hidden" value="random" /></form>
</body>
</html>"#,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let harness = MvcHarness::start(HomeApp).await?;
    info!(addr = %harness.local_addr(), "application started");

    harness.verify_approval_bootstrap().await?;

    match harness
        .verify_page(&ActionTarget::of::<HomeController>("Index"))
        .await
    {
        Ok(()) => info!("home page approved"),
        Err(error) => warn!(%error, "home page not approved"),
    }

    Ok(())
}
