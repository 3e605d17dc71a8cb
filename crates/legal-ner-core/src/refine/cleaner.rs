use crate::config::Lexicon;
use crate::entity::{dedup_by_key, Entity, EntityType, KeyScope};
use crate::ingest::collapse_whitespace;

use super::char_len;

/// Drops noise, stop-word spans and sentence fragments, then removes exact
/// `(text, type)` duplicates. Input order is preserved.
#[must_use]
pub fn clean(candidates: &[Entity], lexicon: &Lexicon) -> Vec<Entity> {
    let survivors = candidates.iter().filter_map(|candidate| {
        if char_len(candidate.text.trim()) < 3 {
            return None;
        }

        let text = collapse_whitespace(&candidate.text);
        let tokens: Vec<String> = text.split(' ').map(str::to_lowercase).collect();
        let is_stopword = |t: &String| Lexicon::is_listed(t, &lexicon.cleaner_stopwords);

        if tokens.len() == 1 && is_stopword(&tokens[0]) {
            return None;
        }
        if Lexicon::is_listed(&tokens[0], &lexicon.fragment_prefixes) {
            return None;
        }

        let generic_limit = match candidate.entity_type {
            EntityType::Party => Some(2),
            EntityType::Location => Some(3),
            _ => None,
        };
        if let Some(limit) = generic_limit {
            if tokens.len() <= limit && tokens.iter().all(is_stopword) {
                return None;
            }
        }

        Some(Entity::new(text, candidate.entity_type))
    });

    let cleaned = dedup_by_key(survivors, KeyScope::TextAndType);
    tracing::debug!(input = candidates.len(), output = cleaned.len(), "cleaned candidates");
    cleaned
}
