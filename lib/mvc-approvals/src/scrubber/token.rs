use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Replacement for anti-forgery token values.
pub const VERIFICATION_TOKEN_PLACEHOLDER: &str = "[RequestVerificationToken]";

// an <input> carrying the token name, in any attribute order
static TOKEN_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input(?:\s[^>]*?)?\sname="__RequestVerificationToken"[^>]*>"#)
        .expect("a valid regex")
});

// `value` only, not `data-value` and the like
static VALUE_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\s)value="[^"]*""#).expect("a valid regex"));

/// Replaces the value of every `__RequestVerificationToken` hidden input
/// with [`VERIFICATION_TOKEN_PLACEHOLDER`].
///
/// ```rust
/// use mvc_approvals::scrub_verification_token;
///
/// let html = r#"<input name="__RequestVerificationToken" type="hidden" value="CfDJ8N" />"#;
/// assert_eq!(
///     scrub_verification_token(html),
///     r#"<input name="__RequestVerificationToken" type="hidden" value="[RequestVerificationToken]" />"#
/// );
/// ```
pub fn scrub_verification_token(html: &str) -> String {
    TOKEN_INPUT
        .replace_all(html, |caps: &Captures<'_>| {
            let input = caps.get(0).map_or("", |matched| matched.as_str());
            VALUE_ATTRIBUTE
                .replace(
                    input,
                    format!(r#"${{1}}value="{VERIFICATION_TOKEN_PLACEHOLDER}""#),
                )
                .into_owned()
        })
        .into_owned()
}
