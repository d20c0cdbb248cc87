#![allow(dead_code)]

use std::fs;
use std::net::TcpListener;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::{Form, RawQuery, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use mvc_approvals::harness::{MvcHarness, TestServer, TestServerConfig};
use mvc_approvals::{FileApprover, MvcApprovals};
use rstest::fixture;
use tempfile::TempDir;
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// A small MVC-like application rendering HTML with CRLF line endings and a
/// fresh anti-forgery token on every request.
#[derive(Debug)]
pub struct SampleApp {
    snapshot_dir: PathBuf,
    tokens: Arc<AtomicU64>,
}

impl SampleApp {
    fn router(&self) -> Router {
        Router::new()
            .route("/Home/Index", get(home_index))
            .route("/Home/About", get(home_about))
            .route("/Home/Boom", get(home_boom))
            .route("/Query/Echo", get(query_echo))
            .route("/Account/Register", post(account_register))
            .route("/Account/Echo", post(account_echo))
            .with_state(Arc::clone(&self.tokens))
    }
}

impl TestServer for SampleApp {
    type Error = std::io::Error;

    async fn launch(&self, listener: TcpListener) -> Result<(), Self::Error> {
        listener.set_nonblocking(true)?;
        let listener = tokio::net::TcpListener::from_std(listener)?;
        axum::serve(listener, self.router()).await
    }

    fn config(&self) -> TestServerConfig {
        TestServerConfig {
            approvals: Some(MvcApprovals::builder().with_snapshot_dir(&self.snapshot_dir)),
            ..TestServerConfig::default()
        }
    }
}

async fn home_index(State(tokens): State<Arc<AtomicU64>>) -> Html<String> {
    let token = tokens.fetch_add(1, Ordering::Relaxed);
    Html(
        [
            "<!DOCTYPE html>",
            "<html>",
            "<head>",
            "<title>Home</title>",
            "</head>",
            "<body>",
            r#"<form action="/Account/Register" method="post">"#,
            &format!(
                r#"<input name="__RequestVerificationToken" type="hidden" value="CfDJ8-{token}" />"#
            ),
            "</form>",
            "</body>",
            "</html>",
        ]
        .join("\r\n"),
    )
}

async fn home_about() -> Html<&'static str> {
    Html(r#"<html><head><base href="/"><title>About</title></head><body></body></html>"#)
}

async fn home_boom() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
}

async fn query_echo(RawQuery(query): RawQuery) -> Html<String> {
    let query = query.unwrap_or_default();
    Html(format!("<html><head></head><body><p>{query}</p></body></html>"))
}

async fn account_register(Form(fields): Form<Vec<(String, String)>>) -> Html<String> {
    let items = fields
        .iter()
        .map(|(name, value)| format!("<dt>{name}</dt><dd>{value}</dd>"))
        .collect::<Vec<_>>()
        .join("\n");
    Html(format!(
        "<html>\n<head>\n<title>Registered</title>\n</head>\n<body>\n<dl>\n{items}\n</dl>\n</body>\n</html>"
    ))
}

async fn account_echo(RawQuery(query): RawQuery) -> Html<String> {
    let query = query.unwrap_or_default();
    Html(format!("<html><head></head><body><p>{query}</p></body></html>"))
}

/// The running sample application and its snapshot directory.
#[derive(Debug)]
pub struct TestApp {
    harness: MvcHarness<SampleApp>,
    snapshots: TempDir,
}

impl TestApp {
    pub async fn start() -> anyhow::Result<Self> {
        let snapshots = tempfile::tempdir()?;
        let app = SampleApp {
            snapshot_dir: snapshots.path().to_path_buf(),
            tokens: Arc::default(),
        };
        let harness = MvcHarness::start(app).await?;
        Ok(Self { harness, snapshots })
    }

    pub fn files(&self) -> FileApprover {
        FileApprover::new(self.snapshots.path())
    }

    /// Received output of `name`, with the port replaced by `[port]`.
    pub fn received(&self, name: &str) -> anyhow::Result<String> {
        let content = fs::read_to_string(self.files().received_path(name))?;
        Ok(content.replace(&self.port().to_string(), "[port]"))
    }

    /// Accepts the current received output of `name`.
    pub fn approve_received(&self, name: &str) -> anyhow::Result<()> {
        let files = self.files();
        fs::rename(files.received_path(name), files.approved_path(name))?;
        Ok(())
    }

    pub fn write_approved(&self, name: &str, content: &str) -> anyhow::Result<()> {
        fs::write(self.files().approved_path(name), content)?;
        Ok(())
    }
}

impl Deref for TestApp {
    type Target = MvcHarness<SampleApp>;

    fn deref(&self) -> &Self::Target {
        &self.harness
    }
}

#[fixture]
pub async fn app() -> TestApp {
    init_tracing();
    match TestApp::start().await {
        Ok(app) => app,
        Err(error) => {
            panic!("fail to start test app: {error:?}");
        }
    }
}

/// A local port nothing listens on.
pub fn closed_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}
