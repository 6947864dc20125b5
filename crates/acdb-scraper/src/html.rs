//! Thin helpers over `scraper` used by every site extractor.
//!
//! Documents are parsed and traversed inside synchronous functions only;
//! `scraper::Html` is not `Send` and must never be held across an `.await`.

use scraper::{ElementRef, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("extractor selectors are static and valid")
}

pub(crate) fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    scope.select(&selector(css)).collect()
}

pub(crate) fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    scope.select(&selector(css)).next()
}

/// Element text with runs of whitespace collapsed to single spaces.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match, or `None` when absent or blank.
pub(crate) fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    select_first(scope, css)
        .map(text_of)
        .filter(|t| !t.is_empty())
}

pub(crate) fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolves a possibly relative `href` against a site origin.
pub(crate) fn absolutize(origin: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    let origin = origin.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

/// Largest numeric label among pagination links, defaulting to 1.
pub(crate) fn max_page_number(scope: ElementRef<'_>, css: &str) -> u32 {
    select_all(scope, css)
        .into_iter()
        .filter_map(|link| text_of(link).parse::<u32>().ok())
        .fold(1, u32::max)
}
