//! # MVC Approvals
//!
//! Approval tests for server-rendered pages: request a controller action of
//! a locally running application, scrub the volatile parts of the returned
//! HTML, and compare it with a previously approved snapshot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mvc_approvals::{ActionTarget, Controller, MvcApprovals};
//! use serde::Serialize;
//!
//! struct AccountController;
//! impl Controller for AccountController {}
//!
//! #[derive(Serialize)]
//! struct Register {
//!     email: String,
//!     newsletter: Option<bool>,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let approvals = MvcApprovals::builder()
//!     .with_port(11625)
//!     .with_snapshot_dir("tests/approvals")
//!     .build()?;
//!
//! // GET /Home/Index, approved as tests/approvals/Home.Index.approved.html
//! approvals
//!     .verify_page(&ActionTarget::new("Home", "Index"))
//!     .await?;
//!
//! // POST email=...&newsletter= to /Account/Register
//! let form = Register { email: "someone@example.com".into(), newsletter: None };
//! approvals
//!     .verify_via_post_value(&ActionTarget::of::<AccountController>("Register"), &form)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. The [`ActionTarget`] gives the `/<Controller>/<Action>` route.
//! 2. The page is requested once (GET, or form-encoded POST).
//! 3. A `<base href>` is injected when missing, see [`inject_base_href`].
//! 4. The [`ScrubberChain`] runs [`scrub_mvc`], [`scrub_verification_token`]
//!    then the optional caller scrubber.
//! 5. The [`Approver`] compares the result with the approved snapshot.
//!
//! Failures come back as [`VerifyError`]: an unreachable host or a 404 come
//! with guidance on fixing the host setup.
//!
//! ## Running the application
//!
//! The [`harness`] module starts the application on a free port and builds
//! the matching [`MvcApprovals`]. With the `axum` feature, [`bootstrap`]
//! provides the echo route checked by
//! [`MvcApprovals::verify_approval_bootstrap`].

#![cfg_attr(docsrs, feature(doc_cfg))]

mod approvals;
pub use self::approvals::MvcApprovals;

mod builder;
pub use self::builder::{DEFAULT_PORT, DEFAULT_SNAPSHOT_DIR, MvcApprovalsBuilder, PORT_ENV_VAR};

mod target;
pub use self::target::{ASSEMBLY_PATH_PARAM, ActionTarget, Controller, controller_name_of};

mod fields;
pub use self::fields::FormFields;

mod route;
pub use self::route::{BOOTSTRAP_ECHO_PREFIX, BOOTSTRAP_ECHO_TEXT, QueryEncoding};

mod transport;
pub use self::transport::inject_base_href;

mod scrubber;
pub use self::scrubber::{
    Scrubber, ScrubberChain, VERIFICATION_TOKEN_PLACEHOLDER, no_scrubber, scrub_mvc,
    scrub_verification_token,
};

mod approval;
pub use self::approval::{ApprovalError, Approver, FileApprover};

mod error;
pub use self::error::{ErrorKind, MvcError};

mod translate;
pub use self::translate::{PAGE_NOT_FOUND_MESSAGE, UNREACHABLE_MESSAGE, VerifyError, translate};

pub mod harness;

#[cfg(feature = "axum")]
#[cfg_attr(docsrs, doc(cfg(feature = "axum")))]
pub mod bootstrap;
