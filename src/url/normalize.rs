/// Schemes that may be crawled
const CRAWLABLE_SCHEMES: &[&str] = &["http", "https"];

/// Normalizes a raw href into a canonical URL usable as a dedup key
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Strip the fragment (everything after `#`)
/// 3. Empty or fragment-only input yields the empty string (skip, not an error)
/// 4. Input with a non-crawlable scheme (`mailto:`, `javascript:`, ...) yields
///    the empty string
/// 5. Input with an authority but no scheme (`//host/path`) gets `base_scheme:` prefixed
/// 6. Path-relative input gets `base_scheme://base_host` prefixed, inserting a
///    `/` when the path does not start with one
///
/// Comparison of canonical URLs is case-sensitive. The function is pure and
/// idempotent: normalizing its own output returns the output unchanged.
///
/// # Arguments
///
/// * `raw` - The href as found in the document
/// * `base_scheme` - Scheme of the page the href was found on
/// * `base_host` - Host (with port, if any) of the page the href was found on
///
/// # Examples
///
/// ```
/// use depth_crawl::url::normalize;
///
/// assert_eq!(normalize("/a#top", "http", "example.test"), "http://example.test/a");
/// assert_eq!(normalize("//cdn.test/x", "https", "example.test"), "https://cdn.test/x");
/// assert_eq!(normalize("", "http", "example.test"), "");
/// ```
pub fn normalize(raw: &str, base_scheme: &str, base_host: &str) -> String {
    let href = strip_fragment(raw.trim());
    if href.is_empty() {
        return String::new();
    }

    match scheme_of(href) {
        Some(scheme) if is_crawlable(scheme) => href.to_string(),
        Some(_) => String::new(),
        None if href.starts_with("//") => format!("{}:{}", base_scheme, href),
        None if href.starts_with('/') => format!("{}://{}{}", base_scheme, base_host, href),
        None => format!("{}://{}/{}", base_scheme, base_host, href),
    }
}

/// Canonicalizes a URL that is expected to be absolute already
///
/// Seeds and queued tasks carry absolute URLs; this strips their fragment and
/// returns the empty string for anything that is not an absolute http(s) URL.
pub fn canonicalize(raw: &str) -> String {
    let href = strip_fragment(raw.trim());
    match scheme_of(href) {
        Some(scheme) if is_crawlable(scheme) && has_authority(href, scheme) => href.to_string(),
        _ => String::new(),
    }
}

fn strip_fragment(href: &str) -> &str {
    match href.find('#') {
        Some(idx) => &href[..idx],
        None => href,
    }
}

/// Returns the scheme of an href if it has one (RFC 3986 `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"`)
fn scheme_of(href: &str) -> Option<&str> {
    let colon = href.find(':')?;
    let candidate = &href[..colon];

    let mut chars = candidate.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.') {
        Some(candidate)
    } else {
        None
    }
}

fn is_crawlable(scheme: &str) -> bool {
    CRAWLABLE_SCHEMES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(scheme))
}

fn has_authority(href: &str, scheme: &str) -> bool {
    href[scheme.len() + 1..].starts_with("//")
}
