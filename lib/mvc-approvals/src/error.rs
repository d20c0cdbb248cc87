use crate::approval::ApprovalError;

/// Errors raised while resolving, fetching or approving an MVC page.
///
/// The transport classifies failures itself: a refused connection and an
/// HTTP 404 have dedicated variants, so callers never need to inspect the
/// underlying `reqwest` error. See [`MvcError::kind`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum MvcError {
    /// HTTP client error from the underlying reqwest library.
    ///
    /// Used for request failures that are neither connection refusals nor
    /// status-code errors (body decoding, redirects, ...).
    Request(reqwest::Error),

    /// URL parsing error when building or reading a request URL.
    Url(url::ParseError),

    /// I/O error, e.g. when the running executable path cannot be resolved.
    Io(std::io::Error),

    /// The approval primitive rejected the received HTML.
    Approval(ApprovalError),

    /// The host could not be reached.
    #[display("Unable to reach {url}: {source}")]
    #[from(skip)]
    Connect {
        /// The URL of the attempted request.
        url: String,
        /// The underlying connection failure.
        source: reqwest::Error,
    },

    /// The host answered with HTTP 404.
    #[display("Page not found (404): {url}")]
    #[from(skip)]
    NotFound {
        /// The URL that was not found.
        url: String,
    },

    /// The host answered with a non-success status other than 404.
    #[display("Unexpected status code {status_code} for {url}: {body}")]
    #[from(skip)]
    UnexpectedStatusCode {
        /// The URL of the request.
        url: String,
        /// The HTTP status code received.
        status_code: u16,
        /// The (possibly truncated) response body.
        body: String,
    },

    /// The controller or action of a target is not usable.
    #[display("Invalid target: {message}")]
    #[from(skip)]
    InvalidTarget {
        /// Why the target was rejected.
        message: String,
    },

    /// A form field value cannot be flattened to a single string.
    #[display("Unsupported value for field '{name}': only scalar values are supported. Got: {value}")]
    #[from(skip)]
    UnsupportedFieldValue {
        /// The field name.
        name: String,
        /// The offending value.
        value: serde_json::Value,
    },

    /// Form or query data could not be serialized.
    #[display("Serialization error: {message}")]
    #[from(skip)]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// The bootstrap echo route answered with unexpected content.
    #[display("Unexpected answer from {url}: expected '{expected}', got '{body}'")]
    #[from(skip)]
    UnexpectedEcho {
        /// The echo URL.
        url: String,
        /// The text that should have been echoed.
        expected: String,
        /// The received body.
        body: String,
    },

    /// The builder received an unusable setting.
    #[display("Invalid configuration: {message}")]
    #[from(skip)]
    InvalidConfig {
        /// Description of the invalid setting.
        message: String,
    },
}

/// Coarse classification of an [`MvcError`], used by the error translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The host was not reachable.
    Connect,
    /// The host answered 404.
    NotFound,
    /// Anything else.
    Other,
}

impl MvcError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connect { .. } => ErrorKind::Connect,
            Self::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Other,
        }
    }
}
