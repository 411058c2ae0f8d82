use hyper::HeaderMap;

/// Number of pages for `total_records` rows at `page_size` rows per page.
///
/// A page size of zero means one page holding everything. An empty result still has one
/// (empty) page.
#[must_use]
pub const fn total_pages(total_records: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    let pages = total_records.div_ceil(page_size);
    if pages == 0 { 1 } else { pages }
}

/// Offset of the first row of `page` (1-based).
#[must_use]
pub const fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect()
}

/// Build the `Content-Range` header for a page of rows.
///
/// `rows` is the number of rows actually returned. An empty page uses the
/// `{resource} */{total}` form.
#[must_use]
pub fn calculate_content_range(
    offset: u64,
    rows: u64,
    total_count: u64,
    resource_name: &str,
) -> HeaderMap {
    let safe_name = sanitize_resource_name(resource_name);
    let content_range = if rows == 0 {
        format!("{safe_name} */{total_count}")
    } else {
        format!("{safe_name} {offset}-{}/{total_count}", offset + rows - 1)
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = content_range.parse() {
        headers.insert("Content-Range", value);
    }
    headers
}
