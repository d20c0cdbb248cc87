//! Text scrubbers applied to HTML before it is approved.
//!
//! A scrubber is a pure `&str -> String` function removing content that
//! changes from run to run (anti-forgery tokens, tooling injected markup, ...).
//! [`ScrubberChain`] applies scrubbers in order.
//!
//! ```rust
//! use mvc_approvals::{ScrubberChain, scrub_mvc};
//!
//! let chain = ScrubberChain::new()
//!     .then(scrub_mvc)
//!     .then(|html: &str| html.replace("2024-01-01", "[date]"));
//!
//! assert_eq!(chain.apply("<p>2024-01-01</p>\r\n"), "<p>[date]</p>\n");
//! ```

use std::fmt::{self, Debug};
use std::sync::Arc;

use tracing::debug;

mod html;
pub use self::html::scrub_mvc;

mod token;
pub use self::token::{VERIFICATION_TOKEN_PLACEHOLDER, scrub_verification_token};

/// A deterministic text transformation.
///
/// Implemented for every `Fn(&str) -> String`.
pub trait Scrubber {
    /// Returns the scrubbed text.
    fn scrub(&self, input: &str) -> String;
}

impl<F> Scrubber for F
where
    F: Fn(&str) -> String,
{
    fn scrub(&self, input: &str) -> String {
        self(input)
    }
}

/// The identity scrubber.
pub fn no_scrubber(input: &str) -> String {
    input.to_string()
}

type SharedScrubber = Arc<dyn Scrubber + Send + Sync>;

/// An ordered sequence of scrubbers.
#[derive(Clone, Default)]
pub struct ScrubberChain {
    scrubbers: Vec<SharedScrubber>,
}

impl ScrubberChain {
    /// An empty chain, equivalent to [`no_scrubber`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain used for MVC pages: [`scrub_mvc`], then
    /// [`scrub_verification_token`], then the caller scrubber if any.
    pub fn mvc<S>(caller: Option<S>) -> Self
    where
        S: Scrubber + Send + Sync + 'static,
    {
        let chain = Self::new()
            .then(scrub_mvc)
            .then(scrub_verification_token);
        match caller {
            Some(scrubber) => chain.then(scrubber),
            None => chain.then(no_scrubber),
        }
    }

    /// Appends a scrubber, run after the existing ones.
    #[must_use]
    pub fn then<S>(mut self, scrubber: S) -> Self
    where
        S: Scrubber + Send + Sync + 'static,
    {
        self.scrubbers.push(Arc::new(scrubber));
        self
    }

    /// Number of scrubbers in the chain.
    pub fn len(&self) -> usize {
        self.scrubbers.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.scrubbers.is_empty()
    }

    /// Runs every scrubber in order.
    pub fn apply(&self, input: &str) -> String {
        debug!(scrubbers = self.scrubbers.len(), "scrubbing");
        self.scrubbers
            .iter()
            .fold(input.to_string(), |text, scrubber| scrubber.scrub(&text))
    }
}

impl Scrubber for ScrubberChain {
    fn scrub(&self, input: &str) -> String {
        self.apply(input)
    }
}

impl Debug for ScrubberChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrubberChain")
            .field("len", &self.scrubbers.len())
            .finish()
    }
}
