use crate::config::Lexicon;
use crate::entity::{Entity, EntityType};

use super::{looks_like_party, FINANCE_NAME};

/// One type correction: entities of type `from` whose text satisfies
/// `predicate` become type `to`.
#[derive(Debug, Clone, Copy)]
pub struct ReclassRule {
    pub name: &'static str,
    pub from: EntityType,
    pub to: EntityType,
    pub predicate: fn(&str, &Lexicon) -> bool,
}

impl ReclassRule {
    fn applies(&self, entity: &Entity, lexicon: &Lexicon) -> bool {
        entity.entity_type == self.from && (self.predicate)(&entity.text, lexicon)
    }
}

fn party_shaped(text: &str, _: &Lexicon) -> bool {
    looks_like_party(text) || FINANCE_NAME.is_match(text)
}

fn names_agreement(text: &str, lexicon: &Lexicon) -> bool {
    Lexicon::has_any_keyword(text, &lexicon.agreement_keywords)
}

pub const DEFAULT_RULES: &[ReclassRule] = &[
    ReclassRule {
        name: "location_is_party",
        from: EntityType::Location,
        to: EntityType::Party,
        predicate: party_shaped,
    },
    ReclassRule {
        name: "party_is_agreement",
        from: EntityType::Party,
        to: EntityType::AgreementType,
        predicate: names_agreement,
    },
    ReclassRule {
        name: "location_is_agreement",
        from: EntityType::Location,
        to: EntityType::AgreementType,
        predicate: names_agreement,
    },
];

/// Applies an ordered rule table. Rules are tested against the entity's
/// original type and the first match wins, so an entity is retyped at most
/// once. The output has the same length and order as the input.
#[derive(Debug, Clone)]
pub struct Reclassifier {
    rules: Vec<ReclassRule>,
}

impl Default for Reclassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl Reclassifier {
    #[must_use]
    pub fn new(rules: Vec<ReclassRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[ReclassRule] {
        &self.rules
    }

    #[must_use]
    pub fn apply(&self, entities: &[Entity], lexicon: &Lexicon) -> Vec<Entity> {
        entities
            .iter()
            .map(|entity| match self.rules.iter().find(|r| r.applies(entity, lexicon)) {
                Some(rule) => {
                    tracing::trace!(text = %entity.text, rule = rule.name, to = %rule.to, "reclassified");
                    entity.retyped(rule.to)
                }
                None => entity.clone(),
            })
            .collect()
    }
}
