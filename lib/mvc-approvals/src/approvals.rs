use std::future::Future;

use serde::Serialize;
use tracing::debug;

use crate::approval::{Approver, FileApprover};
use crate::fields::FormFields;
use crate::route::{ActionUrl, BOOTSTRAP_ECHO_TEXT};
use crate::scrubber::{Scrubber, ScrubberChain};
use crate::transport::HtmlTransport;
use crate::translate::{VerifyError, translate};
use crate::{ActionTarget, MvcApprovalsBuilder, MvcError};

type NoScrubber = fn(&str) -> String;

/// Approval tests for the pages of an MVC application.
///
/// Each `verify_*` call performs one request against the host, scrubs the
/// returned HTML and hands it to the [`Approver`]. Failures are returned as
/// [`VerifyError`], with setup guidance when the host is unreachable or
/// answers 404.
///
/// # Example
///
/// ```rust,no_run
/// use mvc_approvals::{ActionTarget, Controller, FormFields, MvcApprovals};
///
/// struct HomeController;
/// impl Controller for HomeController {}
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let approvals = MvcApprovals::builder().with_port(11625).build()?;
///
/// // GET http://localhost:11625/Home/Index?assemblyPath=...
/// approvals
///     .verify_page(&ActionTarget::of::<HomeController>("Index"))
///     .await?;
///
/// // POST http://localhost:11625/Account/Register?assemblyPath=...
/// let form = FormFields::new().add("Email", "someone@example.com");
/// approvals
///     .verify_via_post(&ActionTarget::new("Account", "Register"), form)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MvcApprovals<A = FileApprover> {
    pub(crate) transport: HtmlTransport,
    pub(crate) urls: ActionUrl,
    pub(crate) approver: A,
}

// Create
impl MvcApprovals {
    /// Starts the configuration, see [`MvcApprovalsBuilder`].
    pub fn builder() -> MvcApprovalsBuilder {
        MvcApprovalsBuilder::default()
    }
}

// Accessors
impl<A> MvcApprovals<A> {
    /// The port of the host under test.
    pub fn port(&self) -> u16 {
        self.urls.port()
    }

    /// The approval primitive.
    pub fn approver(&self) -> &A {
        &self.approver
    }

    /// URL of a GET on `target`. Typed targets carry the `assemblyPath`
    /// context parameter, explicit ones have an empty query.
    ///
    /// # Errors
    ///
    /// Fails when the target is invalid or its context cannot be resolved.
    pub fn action_url(&self, target: &ActionTarget) -> Result<String, MvcError> {
        target.validate()?;
        let query = target.page_query()?;
        Ok(self.urls.for_action(target, &query))
    }

    /// URL of a form POST on `target`, always with the `assemblyPath`
    /// context parameter.
    ///
    /// # Errors
    ///
    /// Fails when the target is invalid or its context cannot be resolved.
    pub fn post_url(&self, target: &ActionTarget) -> Result<String, MvcError> {
        target.validate()?;
        let query = target.post_query()?;
        Ok(self.urls.for_action(target, &query))
    }

    /// Fetches `url` with a form-encoded POST and returns the HTML, with a
    /// `<base>` tag injected when missing. Nothing is scrubbed or approved.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_url_post_contents(
        &self,
        url: &str,
        fields: &FormFields,
    ) -> Result<String, MvcError> {
        self.transport.post_form(url, fields).await
    }
}

// Verify
impl<A> MvcApprovals<A>
where
    A: Approver,
{
    /// GETs the page of `target` and approves it.
    ///
    /// # Errors
    ///
    /// See [`VerifyError`].
    pub async fn verify_page(&self, target: &ActionTarget) -> Result<(), VerifyError> {
        self.verify_page_chain(target, ScrubberChain::mvc(None::<NoScrubber>))
            .await
    }

    /// Like [`verify_page`](Self::verify_page), running `scrubber` after the
    /// built-in scrubbers.
    ///
    /// # Errors
    ///
    /// See [`VerifyError`].
    pub async fn verify_page_with<S>(
        &self,
        target: &ActionTarget,
        scrubber: S,
    ) -> Result<(), VerifyError>
    where
        S: Scrubber + Send + Sync + 'static,
    {
        self.verify_page_chain(target, ScrubberChain::mvc(Some(scrubber)))
            .await
    }

    async fn verify_page_chain(
        &self,
        target: &ActionTarget,
        chain: ScrubberChain,
    ) -> Result<(), VerifyError> {
        with_guidance(async {
            let url = self.action_url(target)?;
            self.fetch_and_approve(&target.snapshot_name(), &url, &chain)
                .await
        })
        .await
    }

    /// POSTs `fields` to the action of `target` and approves the response.
    ///
    /// # Errors
    ///
    /// See [`VerifyError`].
    pub async fn verify_via_post(
        &self,
        target: &ActionTarget,
        fields: FormFields,
    ) -> Result<(), VerifyError> {
        with_guidance(async {
            let url = self.post_url(target)?;
            self.post_and_approve(&target.snapshot_name(), &url, &fields)
                .await
        })
        .await
    }

    /// POSTs the serialized fields of `value`, see
    /// [`FormFields::from_serialize`].
    ///
    /// # Errors
    ///
    /// See [`VerifyError`].
    pub async fn verify_via_post_value<T>(
        &self,
        target: &ActionTarget,
        value: &T,
    ) -> Result<(), VerifyError>
    where
        T: Serialize + ?Sized,
    {
        let fields = FormFields::from_serialize(value)?;
        self.verify_via_post(target, fields).await
    }

    /// GETs an arbitrary URL and approves it under the snapshot `name`.
    ///
    /// # Errors
    ///
    /// See [`VerifyError`].
    pub async fn verify_url(&self, name: &str, url: &str) -> Result<(), VerifyError> {
        let chain = ScrubberChain::mvc(None::<NoScrubber>);
        with_guidance(self.fetch_and_approve(name, url, &chain)).await
    }

    /// Like [`verify_url`](Self::verify_url), running `scrubber` after the
    /// built-in scrubbers.
    ///
    /// # Errors
    ///
    /// See [`VerifyError`].
    pub async fn verify_url_with<S>(
        &self,
        name: &str,
        url: &str,
        scrubber: S,
    ) -> Result<(), VerifyError>
    where
        S: Scrubber + Send + Sync + 'static,
    {
        let chain = ScrubberChain::mvc(Some(scrubber));
        with_guidance(self.fetch_and_approve(name, url, &chain)).await
    }

    /// POSTs `fields` to an arbitrary URL and approves the response under
    /// the snapshot `name`.
    ///
    /// # Errors
    ///
    /// See [`VerifyError`].
    pub async fn verify_url_via_post(
        &self,
        name: &str,
        url: &str,
        fields: &FormFields,
    ) -> Result<(), VerifyError> {
        with_guidance(self.post_and_approve(name, url, fields)).await
    }

    /// Checks that the host registered the approvals bootstrap, by calling its
    /// echo route with [`BOOTSTRAP_ECHO_TEXT`].
    ///
    /// # Errors
    ///
    /// A missing bootstrap yields [`VerifyError::PageNotFound`].
    pub async fn verify_approval_bootstrap(&self) -> Result<(), VerifyError> {
        with_guidance(async {
            let url = self.urls.for_bootstrap();
            let body = self.transport.get(&url).await?;
            if body.trim() == BOOTSTRAP_ECHO_TEXT {
                debug!(%url, "bootstrap registered");
                Ok(())
            } else {
                Err(MvcError::UnexpectedEcho {
                    url,
                    expected: BOOTSTRAP_ECHO_TEXT.to_string(),
                    body,
                })
            }
        })
        .await
    }

    async fn fetch_and_approve(
        &self,
        name: &str,
        url: &str,
        chain: &ScrubberChain,
    ) -> Result<(), MvcError> {
        debug!(%name, %url, "verifying page");
        let html = self.transport.get(url).await?;
        self.approve(name, &chain.apply(&html))
    }

    async fn post_and_approve(
        &self,
        name: &str,
        url: &str,
        fields: &FormFields,
    ) -> Result<(), MvcError> {
        debug!(%name, %url, fields = fields.len(), "verifying form post");
        let html = self.transport.post_form(url, fields).await?;
        let chain = ScrubberChain::mvc(None::<NoScrubber>);
        self.approve(name, &chain.apply(&html))
    }

    fn approve(&self, name: &str, html: &str) -> Result<(), MvcError> {
        self.approver.verify(name, html)?;
        Ok(())
    }
}

/// Runs `action`, translating its failure into a [`VerifyError`].
async fn with_guidance<F>(action: F) -> Result<(), VerifyError>
where
    F: Future<Output = Result<(), MvcError>>,
{
    action.await.map_err(translate)
}
