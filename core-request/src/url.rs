//! Target URL normalization.

const SECURE_SCHEME: &str = "https://";

/// Rewrite `url` so it targets the `https://` scheme.
///
/// Any explicit scheme is replaced, protocol-relative URLs (`//host/path`)
/// get the scheme prepended, and bare `host/path` targets are prefixed.
///
/// ```
/// use core_request::url::secure_url;
///
/// assert_eq!(secure_url("http://api.example.com/v1"), "https://api.example.com/v1");
/// assert_eq!(secure_url("//api.example.com"), "https://api.example.com");
/// assert_eq!(secure_url("api.example.com"), "https://api.example.com");
/// ```
pub fn secure_url(url: &str) -> String {
    let url = url.trim();
    let rest = match scheme_end(url) {
        Some(end) => &url[end..],
        None => url.strip_prefix("//").unwrap_or(url),
    };
    format!("{SECURE_SCHEME}{rest}")
}

/// Byte offset just past `scheme://`, when `url` starts with one.
fn scheme_end(url: &str) -> Option<usize> {
    let colon = url.find("://")?;
    let scheme = &url[..colon];
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(colon + 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_any_scheme() {
        assert_eq!(secure_url("http://x.com/a"), "https://x.com/a");
        assert_eq!(secure_url("https://x.com/a"), "https://x.com/a");
        assert_eq!(secure_url("ws://x.com"), "https://x.com");
        assert_eq!(secure_url("HTTP://x.com"), "https://x.com");
    }

    #[test]
    fn test_protocol_relative_and_bare() {
        assert_eq!(secure_url("//x.com/a?b=1"), "https://x.com/a?b=1");
        assert_eq!(secure_url("x.com/a"), "https://x.com/a");
    }

    #[test]
    fn test_scheme_like_text_in_path_is_kept() {
        assert_eq!(
            secure_url("x.com/redirect?to=http://y.com"),
            "https://x.com/redirect?to=http://y.com"
        );
    }

    #[test]
    fn test_empty_url() {
        assert_eq!(secure_url(""), "https://");
    }
}
