use std::sync::LazyLock;

use regex::Regex;

use crate::config::Lexicon;
use crate::dates::has_four_digits;
use crate::entity::{dedup_by_key, Entity, EntityType, KeyScope};

use super::{char_len, PERSON_TITLE, SIGNATORY};

static DOLLAR_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*\d[\d,]*(?:\.\d+)?").unwrap());

static WORDED_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d[\d,]*(?:\.\d+)?\s*(?:(?:million|billion|thousand)\s+)?(?:USD|dollars?)\b")
        .unwrap()
});

static TIME_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(?:days?|weeks?|months?|years?)\b").unwrap()
});

/// Keeps only the entities worth reporting.
#[must_use]
pub fn is_important(entity: &Entity, lexicon: &Lexicon) -> bool {
    let text = entity.text.as_str();
    let blacklisted = text
        .split_whitespace()
        .any(|token| Lexicon::is_listed(&token.to_lowercase(), &lexicon.importance_blacklist));
    if blacklisted {
        return false;
    }

    match entity.entity_type {
        EntityType::EffectiveDate => has_four_digits(text) && char_len(text) > 8,
        // Expiration dates in the final list come only from the expiration extractor.
        EntityType::ExpirationDate => false,
        EntityType::Party => important_party(text, lexicon),
        EntityType::AgreementType => {
            Lexicon::has_any_keyword(text, &lexicon.priority_agreement_keywords)
                && char_len(text) > 5
                && !Lexicon::is_listed(&text.to_lowercase(), &lexicon.generic_agreement_terms)
        }
        EntityType::Location => {
            Lexicon::has_any_term(text, &lexicon.important_location_indicators)
                && text.split_whitespace().count() <= 4
                && !Lexicon::has_any_keyword(text, &lexicon.important_location_generic_words)
        }
        EntityType::Amount => DOLLAR_AMOUNT.is_match(text) || WORDED_AMOUNT.is_match(text),
        EntityType::Duration => TIME_SPAN.is_match(text),
        EntityType::Percentage => true,
    }
}

fn important_party(text: &str, lexicon: &Lexicon) -> bool {
    if Lexicon::has_any_term(text, &lexicon.important_company_indicators)
        || PERSON_TITLE.is_match(text)
        || SIGNATORY.is_match(text)
    {
        return true;
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.len() <= 3 && !lexicon.starts_with_fragment(text) && tokens.iter().any(|t| is_proper_name(t))
}

/// A token of more than two characters with a capital after its first
/// letter, as in "McDonald" or "ACME".
fn is_proper_name(token: &str) -> bool {
    char_len(token) > 2 && token.chars().skip(1).any(char::is_uppercase)
}

#[must_use]
pub fn filter_important(entities: &[Entity], lexicon: &Lexicon) -> Vec<Entity> {
    let important = dedup_by_key(
        entities.iter().filter(|e| is_important(e, lexicon)).cloned(),
        KeyScope::TextAndType,
    );
    tracing::debug!(input = entities.len(), output = important.len(), "filtered important entities");
    important
}
