use super::model::{NormalizedPage, Page};
use once_cell::sync::Lazy;
use regex::Regex;

/// A line that is only a page number, optionally prefixed with "page"
static PAGE_NUMBER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(page\s*)?\d+$").expect("valid page number pattern"));

/// Lines containing any of these (lowercased) are treated as boilerplate
const BOILERPLATE_MARKERS: &[&str] = &["copyright", "all rights reserved", "www.", "http"];

/// Strip page numbers, copyright notices and URLs from one page of raw text.
///
/// Surviving lines are trimmed and joined with a single space in their
/// original order. Never fails; empty input gives empty output.
pub fn normalize(raw_text: &str) -> String {
    raw_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !is_page_number(line))
        .filter(|line| !is_boilerplate(line))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_page(page: &Page) -> NormalizedPage {
    NormalizedPage {
        index: page.index,
        text: normalize(&page.raw_text),
    }
}

fn is_page_number(line: &str) -> bool {
    PAGE_NUMBER_LINE.is_match(line)
}

fn is_boilerplate(line: &str) -> bool {
    let lowered = line.to_lowercase();
    BOILERPLATE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}
