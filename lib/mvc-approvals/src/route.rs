use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::ActionTarget;
use crate::fields::FormFields;

/// Prefix of the echo route registered by the host-side bootstrap.
pub const BOOTSTRAP_ECHO_PREFIX: &str = "/ApprovalTests/Echo";

/// Text echoed back by the bootstrap route during
/// [`MvcApprovals::verify_approval_bootstrap`](crate::MvcApprovals::verify_approval_bootstrap).
pub const BOOTSTRAP_ECHO_TEXT: &str = "Testing123";

// RFC 3986 unreserved characters stay as-is
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// How query-string keys and values are written into action URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryEncoding {
    /// Percent-encode every reserved character.
    #[default]
    Encoded,
    /// Write keys and values verbatim.
    ///
    /// Only useful to keep URLs identical to those of snapshots approved
    /// before encoding was introduced: a value containing `&`, `=` or `#`
    /// produces a different query than intended.
    Raw,
}

/// Builds action URLs for a local host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActionUrl {
    host: String,
    port: u16,
    encoding: QueryEncoding,
}

impl ActionUrl {
    pub(crate) fn new(host: impl Into<String>, port: u16, encoding: QueryEncoding) -> Self {
        Self {
            host: host.into(),
            port,
            encoding,
        }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    /// `http://<host>:<port>/<controller>/<action>?<query>`, the `?` is always present.
    pub(crate) fn for_action(&self, target: &ActionTarget, query: &FormFields) -> String {
        let Self { host, port, .. } = self;
        let controller = target.controller();
        let action = target.action();
        let query = self.query_string(query);
        format!("http://{host}:{port}/{controller}/{action}?{query}")
    }

    pub(crate) fn for_bootstrap(&self) -> String {
        let Self { host, port, .. } = self;
        format!("http://{host}:{port}{BOOTSTRAP_ECHO_PREFIX}/{BOOTSTRAP_ECHO_TEXT}")
    }

    fn query_string(&self, query: &FormFields) -> String {
        query
            .iter()
            .map(|(key, value)| match self.encoding {
                QueryEncoding::Encoded => format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY_COMPONENT),
                    utf8_percent_encode(value, QUERY_COMPONENT)
                ),
                QueryEncoding::Raw => format!("{key}={value}"),
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
