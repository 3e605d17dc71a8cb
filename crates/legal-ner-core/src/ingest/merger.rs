use crate::config::MergeKey;
use crate::entity::{dedup_by_key, Entity};

/// Combines tagger and rule candidates, tagger first.
///
/// With [`MergeKey::Text`] the first candidate for a given text wins and
/// any later candidate with the same text is dropped even when its type
/// differs, so the tagger's type takes precedence over the rule extractor's.
#[must_use]
pub fn merge_candidates(tagger: &[Entity], rules: &[Entity], key: MergeKey) -> Vec<Entity> {
    dedup_by_key(tagger.iter().chain(rules).cloned(), key.scope())
}

/// Joins the merged candidates of consecutive windows with the same key
/// the per-window merge used.
#[must_use]
pub fn merge_windows(windows: Vec<Vec<Entity>>, key: MergeKey) -> Vec<Entity> {
    dedup_by_key(windows.into_iter().flatten(), key.scope())
}
