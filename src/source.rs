//! Seed URL generation from a listing template

/// Placeholder replaced by the page number
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Expands a URL template into one seed per page number in `start..=end`
///
/// A template without the `{page}` placeholder yields exactly one seed.
///
/// # Examples
///
/// ```
/// use depth_crawl::source::seed_urls;
///
/// let seeds = seed_urls("http://example.test/questions?page={page}", 1, 2);
/// assert_eq!(seeds, vec![
///     "http://example.test/questions?page=1",
///     "http://example.test/questions?page=2",
/// ]);
/// ```
pub fn seed_urls(template: &str, start: u32, end: u32) -> Vec<String> {
    if !template.contains(PAGE_PLACEHOLDER) {
        return vec![template.to_string()];
    }

    (start..=end)
        .map(|page| template.replace(PAGE_PLACEHOLDER, &page.to_string()))
        .collect()
}
