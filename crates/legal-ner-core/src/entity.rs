use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    AgreementType,
    Amount,
    Duration,
    EffectiveDate,
    ExpirationDate,
    Location,
    Party,
    Percentage,
}

impl EntityType {
    pub const ALL: [Self; 8] = [
        Self::AgreementType,
        Self::Amount,
        Self::Duration,
        Self::EffectiveDate,
        Self::ExpirationDate,
        Self::Location,
        Self::Party,
        Self::Percentage,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgreementType => "AGREEMENT_TYPE",
            Self::Amount => "AMOUNT",
            Self::Duration => "DURATION",
            Self::EffectiveDate => "EFFECTIVE_DATE",
            Self::ExpirationDate => "EXPIRATION_DATE",
            Self::Location => "LOCATION",
            Self::Party => "PARTY",
            Self::Percentage => "PERCENTAGE",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::Error::InvalidEntityType(s.to_string()))
    }
}

/// A typed span of contract text. On the wire this is a `[text, type]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, EntityType)", into = "(String, EntityType)")]
pub struct Entity {
    pub text: String,
    pub entity_type: EntityType,
}

impl Entity {
    #[must_use]
    pub fn new(text: impl Into<String>, entity_type: EntityType) -> Self {
        let text = text.into();
        Self {
            text: text.trim().to_string(),
            entity_type,
        }
    }

    /// Same text under a different type. Stages derive new entities rather
    /// than mutating their input.
    #[must_use]
    pub fn retyped(&self, entity_type: EntityType) -> Self {
        Self {
            text: self.text.clone(),
            entity_type,
        }
    }

    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    #[must_use]
    pub fn key(&self, scope: KeyScope) -> DedupKey {
        DedupKey::new(&self.text, scope.includes_type().then_some(self.entity_type))
    }
}

impl From<(String, EntityType)> for Entity {
    fn from((text, entity_type): (String, EntityType)) -> Self {
        Self::new(text, entity_type)
    }
}

impl From<Entity> for (String, EntityType) {
    fn from(entity: Entity) -> Self {
        (entity.text, entity.entity_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScope {
    Text,
    TextAndType,
}

impl KeyScope {
    const fn includes_type(self) -> bool {
        matches!(self, Self::TextAndType)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    text: String,
    entity_type: Option<EntityType>,
}

impl DedupKey {
    fn new(text: &str, entity_type: Option<EntityType>) -> Self {
        Self {
            text: text.trim().to_lowercase(),
            entity_type,
        }
    }
}

/// Keeps the first entity for every key, preserving input order.
pub fn dedup_by_key<I>(entities: I, scope: KeyScope) -> Vec<Entity>
where
    I: IntoIterator<Item = Entity>,
{
    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|e| seen.insert(e.key(scope)))
        .collect()
}
