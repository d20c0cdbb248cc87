use std::sync::LazyLock;

use regex::Regex;

static BROWSER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)[ \t]*<!-- Visual Studio Browser Link -->.*?<!-- End Browser Link -->[ \t]*\n?")
        .expect("a valid regex")
});

/// Generic scrubber for server-rendered MVC pages.
///
/// - normalizes `\r\n` line endings to `\n`
/// - removes Visual Studio Browser Link blocks, injected in development
///   with a per-run request id
///
/// ```rust
/// use mvc_approvals::scrub_mvc;
///
/// assert_eq!(scrub_mvc("<p>\r\nHello\r\n</p>"), "<p>\nHello\n</p>");
/// ```
pub fn scrub_mvc(html: &str) -> String {
    let html = html.replace("\r\n", "\n");
    BROWSER_LINK.replace_all(&html, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_link_block_is_removed() {
        let html = concat!(
            "<body>\r\n",
            "<h1>Home</h1>\r\n",
            "    <!-- Visual Studio Browser Link -->\r\n",
            "<script type=\"application/json\" id=\"__browserLink_initializationData\">\r\n",
            "    {\"requestId\":\"3bd3a0b1a4a54fa7a9c77eb27b1d7a1a\"}\r\n",
            "</script>\r\n",
            "<script src=\"http://localhost:53077/browserLink\" async></script>\r\n",
            "<!-- End Browser Link -->\r\n",
            "</body>"
        );

        let result = scrub_mvc(html);

        insta::assert_snapshot!(result, @r"
        <body>
        <h1>Home</h1>
        </body>
        ");
    }

    #[test]
    fn test_plain_html_is_unchanged() {
        let html = "<ul>\n<li>one</li>\n</ul>";

        assert_eq!(scrub_mvc(html), html);
    }
}
