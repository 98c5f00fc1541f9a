//! URL allow-list
//!
//! Only `http`, `https`, `mailto` and `tel` URLs and relative references reach the output.
//! A scheme is whatever precedes a `:` that comes before any `/`, `?` or `#`, compared
//! case-insensitively after trimming surrounding whitespace.

const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Href written in place of a rejected link target
pub const BLOCKED_HREF: &str = "#";

/// The trimmed url if its scheme is allowed or it has none, `None` otherwise
pub fn safe_url(url: &str) -> Option<&str> {
    let url = url.trim();
    let Some(end) = url.find([':', '/', '?', '#']) else {
        return Some(url);
    };
    if !url[end..].starts_with(':') {
        return Some(url);
    }
    let scheme = &url[..end];
    ALLOWED_SCHEMES
        .iter()
        .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
        .then_some(url)
}

/// Href for a link: the url itself when safe, [`BLOCKED_HREF`] when not
pub fn safe_href(url: &str) -> String {
    safe_url(url).unwrap_or(BLOCKED_HREF).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_schemes_pass() {
        for url in [
            "http://x.test/a",
            "https://x.test/a?b=c#d",
            "HTTPS://X.TEST/",
            "mailto:ann@x.test",
            "tel:+15551234",
        ] {
            assert_eq!(safe_url(url), Some(url), "{url}");
        }
    }

    #[test]
    fn relative_references_pass() {
        for url in ["docs/a.md", "/abs/path", "#section", "?q=1", "./a:b", "a/b:c", "pic.png"] {
            assert_eq!(safe_url(url), Some(url), "{url}");
        }
    }

    #[test]
    fn script_and_data_schemes_rejected() {
        for url in [
            "javascript:alert(1)",
            "JavaScript:alert(1)",
            "  javascript:alert(1)",
            "vbscript:msgbox(1)",
            "data:image/png;base64,AA",
            "file:///etc/passwd",
        ] {
            assert_eq!(safe_url(url), None, "{url}");
        }
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        assert_eq!(safe_url("  https://x.test/  "), Some("https://x.test/"));
    }

    #[test]
    fn blocked_href_replaces_rejected_url() {
        assert_eq!(safe_href("javascript:alert(1)"), "#");
        assert_eq!(safe_href("https://x.test/"), "https://x.test/");
    }
}
