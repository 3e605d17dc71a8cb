use crate::config::Lexicon;
use crate::dates::is_date_like;
use crate::entity::{Entity, EntityType};

use super::{char_len, looks_like_party, PERSON_TITLE};

const MIN_CHARS: usize = 3;
const MAX_CHARS: usize = 200;

/// Per-type quality gate.
#[must_use]
pub fn accept(entity: &Entity, lexicon: &Lexicon) -> bool {
    let text = entity.text.as_str();
    let len = char_len(text);
    if !(MIN_CHARS..=MAX_CHARS).contains(&len) {
        return false;
    }

    match entity.entity_type {
        EntityType::EffectiveDate => is_date_like(text),
        EntityType::Party => accept_party(text, lexicon),
        EntityType::Location => accept_location(text, lexicon),
        EntityType::AgreementType => Lexicon::has_any_keyword(text, &lexicon.agreement_keywords),
        EntityType::Amount
        | EntityType::Duration
        | EntityType::ExpirationDate
        | EntityType::Percentage => true,
    }
}

fn accept_party(text: &str, lexicon: &Lexicon) -> bool {
    if Lexicon::has_any_term(text, &lexicon.company_indicators) || PERSON_TITLE.is_match(text) {
        return true;
    }
    // Short spans opening with a preposition are sentence fragments.
    !(text.split_whitespace().count() <= 3 && lexicon.starts_with_fragment(text))
}

fn accept_location(text: &str, lexicon: &Lexicon) -> bool {
    if Lexicon::has_any_keyword(text, &lexicon.location_generic_words) || looks_like_party(text) {
        return false;
    }
    Lexicon::has_any_term(text, &lexicon.location_indicators)
}

#[must_use]
pub fn validate(entities: &[Entity], lexicon: &Lexicon) -> Vec<Entity> {
    let kept: Vec<Entity> = entities
        .iter()
        .filter(|e| accept(e, lexicon))
        .cloned()
        .collect();
    tracing::debug!(input = entities.len(), output = kept.len(), "validated entities");
    kept
}
