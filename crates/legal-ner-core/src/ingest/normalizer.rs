use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::dates::MONTHS;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static MONTH_ABBREVIATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec)\b(?:\.( \d{1,2}\b))?")
        .unwrap()
});

/// Any-case abbreviation, only where a day or year number follows.
static MONTH_ABBREVIATION_BEFORE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\b\.?( \d)").unwrap()
});

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(\d{{1,2}}) ({MONTHS}) (\d{{4}})\b")).unwrap()
});

static AGREEMENT_NOUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:agreement|contract|pact)s?\b").unwrap());

static COMPANY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\w+) (?:(?:Pvt\.? Ltd|Private Limited|Limited|LLC|Incorporated|Inc)\b\.?|L\.L\.C\.)",
    )
    .unwrap()
});

static CORP_AMPERSAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+ Corp) & (\w+ Corp)\b").unwrap());

/// Upper bound on rewrite passes; normalization stops early at a fixpoint.
const MAX_PASSES: usize = 8;

/// Canonicalizes contract text so the pattern registry and the tagger see
/// one spelling of dates, agreement nouns and company suffixes.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut current = single_pass(text);
    for _ in 1..MAX_PASSES {
        let next = single_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn single_pass(text: &str) -> String {
    let text = collapse_whitespace(text);
    let text = expand_month_abbreviations(&text);
    let text = DAY_MONTH_YEAR.replace_all(&text, "$2 $1, $3");
    let text = AGREEMENT_NOUN.replace_all(&text, |caps: &Captures| caps[0].to_lowercase());
    let text = COMPANY_SUFFIX.replace_all(&text, "$1 Corp");
    CORP_AMPERSAND.replace_all(&text, "$1 and $2").into_owned()
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn expand_month_abbreviations(text: &str) -> String {
    let text = MONTH_ABBREVIATION.replace_all(text, |caps: &Captures| {
        let full = full_month(&caps[1]);
        match caps.get(2) {
            Some(day) => format!("{full}{}", day.as_str()),
            None => full.to_string(),
        }
    });
    MONTH_ABBREVIATION_BEFORE_NUMBER
        .replace_all(&text, |caps: &Captures| format!("{}{}", full_month(&caps[1]), &caps[2]))
        .into_owned()
}

fn full_month(abbreviation: &str) -> &'static str {
    match abbreviation.to_ascii_lowercase().as_str() {
        "jan" => "January",
        "feb" => "February",
        "mar" => "March",
        "apr" => "April",
        "jun" => "June",
        "jul" => "July",
        "aug" => "August",
        "sep" | "sept" => "September",
        "oct" => "October",
        "nov" => "November",
        _ => "December",
    }
}
