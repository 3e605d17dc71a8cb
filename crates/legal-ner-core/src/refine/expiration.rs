use crate::config::Lexicon;
use crate::dates::first_embedded_date;
use crate::entity::{Entity, EntityType};

/// Derives EXPIRATION_DATE entities from validated entities that mention
/// expiry. Each source entity yields at most one date.
#[must_use]
pub fn extract_expirations(entities: &[Entity], lexicon: &Lexicon) -> Vec<Entity> {
    let found: Vec<Entity> = entities
        .iter()
        .filter(|e| Lexicon::has_any_keyword(&e.text, &lexicon.expiration_keywords))
        .filter_map(|e| first_embedded_date(&e.text))
        .map(|date| Entity::new(date, EntityType::ExpirationDate))
        .collect();
    if !found.is_empty() {
        tracing::debug!(count = found.len(), "derived expiration dates");
    }
    found
}
