//! Turns transport failures into setup guidance.
//!
//! A failed verification is usually a host setup problem, not a content
//! problem: the server is not running, or it runs without the approvals
//! bootstrap. [`translate`] maps those two cases to actionable messages and
//! keeps every other error as-is.

use crate::error::{ErrorKind, MvcError};

/// Message for an unreachable host.
pub const UNREACHABLE_MESSAGE: &str =
    "Unable to connect to the hosted/remote server. Please check your connection.";

/// Message for a 404 answer, with bootstrap guidance.
pub const PAGE_NOT_FOUND_MESSAGE: &str = r#"404 Error: Page not Found.

mvc-approvals needs a bootstrap to work.
Please verify that your application registers the approvals routes at startup,
for example with axum:

    let app = Router::new()
        // ...
        .merge(mvc_approvals::bootstrap::router());

You can check the bootstrap with `MvcApprovals::verify_approval_bootstrap`."#;

/// Error returned by every `verify_*` operation.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum VerifyError {
    /// The host could not be reached.
    #[display("{}\n\n{source}", UNREACHABLE_MESSAGE)]
    Unreachable {
        /// The transport failure.
        source: MvcError,
    },

    /// The host answered 404, most likely because the bootstrap is missing.
    #[display("{}\n\n{source}", PAGE_NOT_FOUND_MESSAGE)]
    PageNotFound {
        /// The transport failure.
        source: MvcError,
    },

    /// Any other failure, unchanged.
    #[display("{_0}")]
    Other(MvcError),
}

impl VerifyError {
    /// The underlying error.
    pub fn inner(&self) -> &MvcError {
        match self {
            Self::Unreachable { source } | Self::PageNotFound { source } => source,
            Self::Other(source) => source,
        }
    }

    /// Consumes the translation, returning the underlying error.
    pub fn into_inner(self) -> MvcError {
        match self {
            Self::Unreachable { source } | Self::PageNotFound { source } => source,
            Self::Other(source) => source,
        }
    }
}

/// Maps an error to its user-facing form, based on [`MvcError::kind`] only.
pub fn translate(error: MvcError) -> VerifyError {
    match error.kind() {
        ErrorKind::Connect => VerifyError::Unreachable { source: error },
        ErrorKind::NotFound => VerifyError::PageNotFound { source: error },
        ErrorKind::Other => VerifyError::Other(error),
    }
}

impl From<MvcError> for VerifyError {
    fn from(error: MvcError) -> Self {
        translate(error)
    }
}
