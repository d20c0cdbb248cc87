use std::env::{self, VarError};
use std::path::PathBuf;

use tracing::debug;
use url::Url;

use crate::approval::FileApprover;
use crate::route::{ActionUrl, QueryEncoding};
use crate::transport::HtmlTransport;
use crate::{MvcApprovals, MvcError};

/// Environment variable read for the host port when none is set explicitly.
pub const PORT_ENV_VAR: &str = "MVC_APPROVALS_PORT";

/// Port used when neither [`MvcApprovalsBuilder::with_port`] nor
/// [`PORT_ENV_VAR`] provide one.
pub const DEFAULT_PORT: u16 = 80;

/// Directory of the default [`FileApprover`].
pub const DEFAULT_SNAPSHOT_DIR: &str = "approvals";

/// Builder for [`MvcApprovals`].
///
/// # Default Configuration
///
/// - **Host**: `localhost`
/// - **Port**: [`PORT_ENV_VAR`] if set, else `80`
/// - **Query encoding**: [`QueryEncoding::Encoded`]
/// - **Approver**: a [`FileApprover`] in [`DEFAULT_SNAPSHOT_DIR`]
///
/// # Example
///
/// ```rust
/// use mvc_approvals::{MvcApprovals, QueryEncoding};
///
/// # fn example() -> Result<(), mvc_approvals::MvcError> {
/// let approvals = MvcApprovals::builder()
///     .with_port(11625)
///     .with_query_encoding(QueryEncoding::Raw)
///     .with_snapshot_dir("tests/approvals")
///     .build()?;
///
/// assert_eq!(approvals.port(), 11625);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MvcApprovalsBuilder<A = FileApprover> {
    client: reqwest::Client,
    host: String,
    port: Option<u16>,
    query_encoding: QueryEncoding,
    approver: A,
}

impl Default for MvcApprovalsBuilder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            host: "localhost".to_string(),
            port: None,
            query_encoding: QueryEncoding::default(),
            approver: FileApprover::new(DEFAULT_SNAPSHOT_DIR),
        }
    }
}

impl MvcApprovalsBuilder {
    /// Stores snapshots of the default [`FileApprover`] in `dir`.
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.approver = FileApprover::new(dir);
        self
    }
}

impl<A> MvcApprovalsBuilder<A> {
    /// Builds the [`MvcApprovals`] instance.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    /// - the host is empty or does not form a valid URL
    /// - [`PORT_ENV_VAR`] is used and is not a valid port number
    pub fn build(self) -> Result<MvcApprovals<A>, MvcError> {
        let Self {
            client,
            host,
            port,
            query_encoding,
            approver,
        } = self;

        if host.trim().is_empty() {
            return Err(MvcError::InvalidConfig {
                message: "the host must not be empty".to_string(),
            });
        }

        let port = match port {
            Some(port) => port,
            None => port_from_env()?,
        };
        Url::parse(&format!("http://{host}:{port}/"))?;
        debug!(%host, %port, ?query_encoding, "building MVC approvals");

        Ok(MvcApprovals {
            transport: HtmlTransport::new(client),
            urls: ActionUrl::new(host, port, query_encoding),
            approver,
        })
    }

    /// Sets the host name, `localhost` by default.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port the host under test listens on.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets how query strings are encoded.
    pub fn with_query_encoding(mut self, query_encoding: QueryEncoding) -> Self {
        self.query_encoding = query_encoding;
        self
    }

    /// Uses a preconfigured `reqwest` client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Replaces the approval primitive.
    pub fn with_approver<B>(self, approver: B) -> MvcApprovalsBuilder<B> {
        let Self {
            client,
            host,
            port,
            query_encoding,
            ..
        } = self;
        MvcApprovalsBuilder {
            client,
            host,
            port,
            query_encoding,
            approver,
        }
    }
}

fn port_from_env() -> Result<u16, MvcError> {
    match env::var(PORT_ENV_VAR) {
        Ok(value) => parse_port(Some(&value)),
        Err(VarError::NotPresent) => parse_port(None),
        Err(VarError::NotUnicode(value)) => Err(MvcError::InvalidConfig {
            message: format!("{PORT_ENV_VAR}={value:?} is not valid unicode"),
        }),
    }
}

fn parse_port(value: Option<&str>) -> Result<u16, MvcError> {
    let Some(value) = value else {
        return Ok(DEFAULT_PORT);
    };
    value.trim().parse().map_err(|err| MvcError::InvalidConfig {
        message: format!("{PORT_ENV_VAR}={value:?} is not a valid port: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::ActionTarget;

    #[test]
    fn test_default_host_and_explicit_port() {
        let approvals = MvcApprovals::builder()
            .with_port(11625)
            .build()
            .expect("valid approvals");

        let url = approvals
            .action_url(&ActionTarget::new("Home", "Index"))
            .expect("url");

        insta::assert_snapshot!(url, @"http://localhost:11625/Home/Index?");
    }

    #[test]
    fn test_custom_host() {
        let approvals = MvcApprovals::builder()
            .with_host("127.0.0.1")
            .with_port(8080)
            .build()
            .expect("valid approvals");

        let url = approvals
            .action_url(&ActionTarget::new("Account", "LogOn"))
            .expect("url");

        insta::assert_snapshot!(url, @"http://127.0.0.1:8080/Account/LogOn?");
    }

    #[test]
    fn test_empty_host_is_rejected() {
        let result = MvcApprovals::builder().with_host(" ").with_port(80).build();

        assert!(matches!(result, Err(MvcError::InvalidConfig { .. })));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let result = MvcApprovals::builder()
            .with_host("local host")
            .with_port(80)
            .build();

        assert!(matches!(result, Err(MvcError::Url(_))));
    }

    #[test]
    fn test_unset_port_defaults_to_80() {
        assert_eq!(parse_port(None).expect("port"), DEFAULT_PORT);
    }

    #[test]
    fn test_port_value() {
        assert_eq!(parse_port(Some("11625")).expect("port"), 11625);
        assert_eq!(parse_port(Some(" 8080\n")).expect("port"), 8080);
    }

    #[test]
    fn test_invalid_port_value_is_rejected() {
        let not_a_number = parse_port(Some("eighty"));
        let out_of_range = parse_port(Some("70000"));

        assert!(matches!(not_a_number, Err(MvcError::InvalidConfig { .. })));
        assert!(matches!(out_of_range, Err(MvcError::InvalidConfig { .. })));
        let error = not_a_number.expect_err("not a number");
        assert!(error.to_string().contains(PORT_ENV_VAR));
    }

    #[test]
    fn test_snapshot_dir() {
        let approvals = MvcApprovals::builder()
            .with_port(80)
            .with_snapshot_dir("tests/approvals")
            .build()
            .expect("valid approvals");

        assert_eq!(approvals.approver().dir(), Path::new("tests/approvals"));
    }

    #[test]
    fn test_with_approver_keeps_settings() {
        let approvals = MvcApprovals::builder()
            .with_port(4242)
            .with_approver(FileApprover::new("elsewhere"))
            .build()
            .expect("valid approvals");

        assert_eq!(approvals.port(), 4242);
        assert_eq!(approvals.approver().dir(), Path::new("elsewhere"));
    }
}
