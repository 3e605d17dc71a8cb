use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::entity::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaggerError {
    #[error("Tagger unavailable: {0}")]
    Unavailable(String),
    #[error("Tagger timed out after {0:?}")]
    Timeout(Duration),
    #[error("Tagging failed: {0}")]
    Failed(String),
}

pub type TaggerResult<T> = Result<T, TaggerError>;

/// Statistical sequence tagger. Implementations give no precision or
/// recall guarantee and may fail at any time.
#[async_trait::async_trait]
pub trait Tagger: Send + Sync {
    fn name(&self) -> &str;

    async fn tag(&self, text: &str) -> TaggerResult<Vec<Entity>>;
}

/// Runs the tagger, turning an elapsed deadline into [`TaggerError::Timeout`].
pub async fn tag_with_timeout(
    tagger: &dyn Tagger,
    text: &str,
    timeout: Duration,
) -> TaggerResult<Vec<Entity>> {
    match tokio::time::timeout(timeout, tagger.tag(text)).await {
        Ok(result) => result,
        Err(_) => Err(TaggerError::Timeout(timeout)),
    }
}

/// Replays a fixed candidate list. Only candidates whose text occurs in the
/// tagged text (ignoring case) are returned, so windows of a long document
/// each see their own share.
pub struct StaticTagger {
    name: String,
    entities: Vec<Entity>,
}

impl StaticTagger {
    #[must_use]
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            name: "static".into(),
            entities,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Loads a JSON array of `[text, TYPE]` pairs.
    pub fn from_json_file(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entities: Vec<Entity> = serde_json::from_str(&raw)?;
        Ok(Self::new(entities).with_name(path.display().to_string()))
    }
}

#[async_trait::async_trait]
impl Tagger for StaticTagger {
    fn name(&self) -> &str {
        &self.name
    }

    async fn tag(&self, text: &str) -> TaggerResult<Vec<Entity>> {
        let haystack = text.to_lowercase();
        Ok(self
            .entities
            .iter()
            .filter(|e| haystack.contains(&e.text.to_lowercase()))
            .cloned()
            .collect())
    }
}

/// A tagger that is always down.
pub struct UnavailableTagger {
    reason: String,
}

impl UnavailableTagger {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl Tagger for UnavailableTagger {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn tag(&self, _text: &str) -> TaggerResult<Vec<Entity>> {
        Err(TaggerError::Unavailable(self.reason.clone()))
    }
}
