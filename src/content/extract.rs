use readability::extractor;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n+").unwrap());

const CONTENT_SELECTORS: [&str; 9] = [
    "article",
    "main",
    "[role='main']",
    ".content",
    ".post",
    ".article",
    "#content",
    "#main",
    ".entry-content",
];
const MIN_BLOCK_CHARS: usize = 100;

/// Extracts the readable body text of an article page. Returns `None` when the
/// page has no text worth keeping.
pub fn article_text(html: &str, url: &Url) -> Option<String> {
    let raw = match extractor::extract(&mut html.as_bytes(), url) {
        Ok(product) if !product.text.trim().is_empty() => product.text,
        _ => fallback_text(html)?,
    };

    let text = normalize_whitespace(&raw);
    if text.is_empty() { None } else { Some(text) }
}

fn fallback_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element.text().collect::<Vec<_>>().join(" ");
            if text.trim().len() > MIN_BLOCK_CHARS {
                return Some(text);
            }
        }
    }

    let body_selector = Selector::parse("body").ok()?;
    let body = document.select(&body_selector).next()?;
    let text = body.text().collect::<Vec<_>>().join(" ");
    if text.trim().is_empty() { None } else { Some(text) }
}

/// Collapses runs of spaces and blank lines while keeping paragraph breaks.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let spaced = SPACE_RUN.replace_all(text.trim(), " ");
    let paragraphs = BLANK_LINES.replace_all(&spaced, "\n\n");
    paragraphs
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
