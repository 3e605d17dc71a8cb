use std::sync::LazyLock;

use regex::Regex;

pub(crate) const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";
pub(crate) const MONTH_ABBREVIATIONS: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec";

fn compile(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
        .collect()
}

fn numeric_date() -> String {
    r"\b\d{1,2}[/\-.]\d{1,2}[/\-.]\d{2,4}\b".to_string()
}

fn day_month_year() -> String {
    format!(r"\b\d{{1,2}}\s+(?:{MONTHS})\s+\d{{4}}\b")
}

fn month_day_year() -> String {
    format!(r"\b(?:{MONTHS})\s+\d{{1,2}},?\s+\d{{4}}\b")
}

fn day_abbreviation_year() -> String {
    format!(r"\b\d{{1,2}}\s+(?:{MONTH_ABBREVIATIONS})\s+\d{{4}}\b")
}

/// Shapes accepted as "contains a date". The month-and-day form without a
/// year tolerates OCR that drops or garbles the year.
pub(crate) static DATE_LIKE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        numeric_date(),
        day_month_year(),
        month_day_year(),
        format!(r"\b(?:{MONTHS})\s+\d{{1,2}}\b"),
        day_abbreviation_year(),
    ])
});

/// Date shapes tried in order when pulling a date out of an entity's text.
/// The bare year is the last resort.
pub(crate) static EMBEDDED_DATE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        numeric_date(),
        day_month_year(),
        month_day_year(),
        day_abbreviation_year(),
        r"\b\d{4}\b".to_string(),
    ])
});

static FOUR_DIGIT_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").unwrap());

pub(crate) fn is_date_like(text: &str) -> bool {
    DATE_LIKE.iter().any(|re| re.is_match(text))
}

pub(crate) fn has_four_digits(text: &str) -> bool {
    FOUR_DIGIT_YEAR.is_match(text)
}

/// First date found by [`EMBEDDED_DATE`], in pattern order.
pub(crate) fn first_embedded_date(text: &str) -> Option<&str> {
    EMBEDDED_DATE
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str())
}
