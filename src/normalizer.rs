// Text normalizers: raw page text into ISBNs, prices and author names.
//
// Every function here is total over arbitrary input and reports "not found"
// as `None`. Digit classes are ASCII-only.
use regex::Regex;
use std::sync::LazyLock;

static ISBN13: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:978|979)[0-9]{10}").expect("valid ISBN-13 pattern"));

static DP_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/dp/([0-9]{10})").expect("valid /dp/ pattern"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit pattern"));

static TRAILING_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([A-Za-z\s.,]+)\)\s*$").expect("valid parenthetical pattern")
});

/// Binding and language annotations that Flipkart puts next to the author.
const FORMAT_TOKENS: &[&str] = &["Paperback", "Papeprback", "Hardcover", "English"];

static FORMAT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:{})\b", FORMAT_TOKENS.join("|")))
        .expect("valid format token pattern")
});

static LEADING_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s,]+").expect("valid separator pattern"));

/// First 978/979-prefixed 13 digit run in `text`.
pub fn extract_isbn(text: &str) -> Option<String> {
    ISBN13.find(text).map(|m| m.as_str().to_string())
}

/// Ten digit token following `/dp/` in an Amazon URL.
pub fn extract_isbn_from_url_path(url: &str) -> Option<String> {
    DP_SEGMENT
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Strips thousands separators and parses the first digit run.
///
/// A run too long for `u64` counts as not found.
pub fn clean_price(text: &str) -> Option<u64> {
    let compact = text.replace(',', "");
    DIGIT_RUN
        .find(&compact)
        .and_then(|m| m.as_str().parse().ok())
}

/// Author from a trailing `(<format>, <author>)` annotation on a product title.
///
/// Format and language words are removed, leading separators trimmed, and
/// when several names remain only the first one is kept.
pub fn extract_author_from_title(title: &str) -> Option<String> {
    let caps = TRAILING_PARENTHETICAL.captures(title)?;
    let inner = caps.get(1)?.as_str();

    let stripped = FORMAT_TOKEN.replace_all(inner, "");
    let residual = LEADING_SEPARATORS.replace(stripped.trim(), "");
    let author = match residual.split_once(',') {
        Some((first, _)) => first.trim(),
        None => residual.trim(),
    };

    (!author.is_empty()).then(|| author.to_string())
}
