//! Reconciliation stages applied to the merged candidate list: cleaning,
//! type correction, quality validation, importance filtering and
//! expiration-date derivation. Every stage is a total function from an
//! input list to a new output list.

mod cleaner;
mod expiration;
mod importance;
mod reclassifier;
mod validator;

pub use cleaner::clean;
pub use expiration::extract_expirations;
pub use importance::{filter_important, is_important};
pub use reclassifier::{ReclassRule, Reclassifier, DEFAULT_RULES};
pub use validator::{accept, validate};

use std::sync::LazyLock;

use regex::Regex;

/// ", President", ", CEO", ", Esq" and similar signature-block titles.
pub(crate) static PERSON_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),\s*(?:President|Vice|CEO|Director|Manager|Attorney|Counsel|Esq)\b").unwrap()
});

/// "By John", "Manager Smith": a signatory line.
pub(crate) static SIGNATORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?i:manager|by)\s+[A-Z]").unwrap());

pub(crate) static ORGANIZATION_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:Ltd|Inc|Corp|LLC|Company|Laboratories|Pharma|Funding|Finance|Commercial|Acquisition|Recovery|Solutions)\b",
    )
    .unwrap()
});

pub(crate) static FINANCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:ACQUISITION|COMPUTER|ASTA|OPTION|PALISADES|RECOVERY)\s+[A-Z]+|(?i:\b(?:funding|finance|financial|commercial|acquisition)\b)",
    )
    .unwrap()
});

/// True for text that reads as a person or company rather than a place.
pub(crate) fn looks_like_party(text: &str) -> bool {
    PERSON_TITLE.is_match(text) || ORGANIZATION_SUFFIX.is_match(text) || SIGNATORY.is_match(text)
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_title() {
        assert!(PERSON_TITLE.is_match("Handley, President"));
        assert!(PERSON_TITLE.is_match("Gary Stern, CEO"));
        assert!(!PERSON_TITLE.is_match("President Handley"));
    }

    #[test]
    fn test_signatory_needs_capitalized_name() {
        assert!(SIGNATORY.is_match("By John Smith"));
        assert!(SIGNATORY.is_match("signed by Mary"));
        assert!(!SIGNATORY.is_match("by the parties"));
    }

    #[test]
    fn test_looks_like_party() {
        assert!(looks_like_party("ASTA Funding"));
        assert!(looks_like_party("Acme Laboratories"));
        assert!(!looks_like_party("Bay Shore, New York"));
    }

    #[test]
    fn test_finance_name() {
        assert!(FINANCE_NAME.is_match("PALISADES COLLECTION"));
        assert!(FINANCE_NAME.is_match("Commercial Capital"));
        assert!(!FINANCE_NAME.is_match("Brooklyn, NY"));
    }
}
