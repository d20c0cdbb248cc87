use headers::{ContentType, HeaderMapExt};
use http::{Method, StatusCode};
use reqwest::{Body, Request};
use tracing::debug;
use url::Url;

use crate::MvcError;
use crate::fields::FormFields;

const BODY_MAX_LENGTH: usize = 1024;

/// Fetches HTML from the host under test.
///
/// One attempt per call, no retry: failures surface immediately as
/// [`MvcError`] with the connection and 404 cases already classified.
#[derive(Debug, Clone, Default)]
pub(crate) struct HtmlTransport {
    client: reqwest::Client,
}

impl HtmlTransport {
    pub(crate) fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub(crate) async fn get(&self, url: &str) -> Result<String, MvcError> {
        let request = Request::new(Method::GET, Url::parse(url)?);
        self.send(url, request).await
    }

    pub(crate) async fn post_form(&self, url: &str, fields: &FormFields) -> Result<String, MvcError> {
        let mut request = Request::new(Method::POST, Url::parse(url)?);
        request
            .headers_mut()
            .typed_insert(ContentType::form_url_encoded());
        *request.body_mut() = Some(Body::from(fields.to_form_body()?));
        self.send(url, request).await
    }

    async fn send(&self, url: &str, request: Request) -> Result<String, MvcError> {
        debug!(?request, "sending...");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|err| classify(url, err))?;
        debug!(?response, "...receiving");

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MvcError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map(|text| truncate(&text))
                .unwrap_or_else(|err| format!("<unable to read response body: {err}>"));
            return Err(MvcError::UnexpectedStatusCode {
                url: url.to_string(),
                status_code: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|err| classify(url, err))?;
        let html = String::from_utf8_lossy(&bytes).into_owned();
        inject_base_href(html, url)
    }
}

fn classify(url: &str, err: reqwest::Error) -> MvcError {
    if err.is_connect() {
        MvcError::Connect {
            url: url.to_string(),
            source: err,
        }
    } else {
        MvcError::Request(err)
    }
}

fn truncate(text: &str) -> String {
    if text.len() > BODY_MAX_LENGTH {
        let head = text.chars().take(BODY_MAX_LENGTH).collect::<String>();
        format!("{head}... (truncated)")
    } else {
        text.to_string()
    }
}

/// Adds `<base href="…">` right after the first `<head>` unless the document
/// already declares a base.
///
/// The href is the request URL without query and fragment, cut before its
/// last path segment: `http://host/Home/Index` gives `http://host/Home`.
/// A snapshot opened from disk then resolves relative links and assets
/// against the server it was captured from.
///
/// ```rust
/// use mvc_approvals::inject_base_href;
///
/// let html = inject_base_href("<html><head></head></html>".to_string(), "http://host/Home/Index")?;
/// assert_eq!(html, r#"<html><head><base href="http://host/Home"></head></html>"#);
/// # Ok::<(), mvc_approvals::MvcError>(())
/// ```
///
/// # Errors
///
/// Returns [`MvcError::Url`] if `url` cannot be parsed.
pub fn inject_base_href(html: String, url: &str) -> Result<String, MvcError> {
    if html.contains("<base") {
        return Ok(html);
    }

    let href = parent_href(url)?;
    Ok(html.replacen("<head>", &format!("<head><base href=\"{href}\">"), 1))
}

fn parent_href(url: &str) -> Result<String, MvcError> {
    let mut parent = Url::parse(url)?;
    parent.set_query(None);
    parent.set_fragment(None);
    if let Ok(mut segments) = parent.path_segments_mut() {
        segments.pop();
    }
    Ok(parent.as_str().trim_end_matches('/').to_string())
}
