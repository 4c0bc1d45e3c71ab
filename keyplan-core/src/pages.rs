// Page list parsing and merging

use std::collections::HashSet;

/// Split a comma or semicolon separated page string into trimmed names.
pub fn parse_pages_input(input: &str) -> Vec<String> {
    input
        .split([',', ';'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Merge manual pages with generated ones.
///
/// Manual pages come first. Names are trimmed and compared
/// case-insensitively; the first spelling seen wins. Blank names are dropped.
/// With `max_total`, the merge stops as soon as that many pages are collected.
pub fn merge_pages<M, G>(manual: &[M], generated: &[G], max_total: Option<usize>) -> Vec<String>
where
    M: AsRef<str>,
    G: AsRef<str>,
{
    let mut merged = Vec::new();
    let mut seen = HashSet::new();

    let candidates = manual
        .iter()
        .map(AsRef::as_ref)
        .chain(generated.iter().map(AsRef::as_ref));

    for page in candidates {
        if max_total.is_some_and(|max| merged.len() >= max) {
            break;
        }
        let page = page.trim();
        if page.is_empty() {
            continue;
        }
        if seen.insert(page.to_lowercase()) {
            merged.push(page.to_string());
        }
    }

    merged
}
