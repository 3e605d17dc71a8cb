//! The externally visible result of processing a document.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::entity::{dedup_by_key, Entity, EntityType, KeyScope};

/// How the candidate list of a document was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    /// Tagger and rule candidates for every window.
    Hybrid,
    /// No tagger configured.
    RulesOnly,
    /// A tagger is configured but failed or timed out on at least one window.
    RulesOnlyFallback,
}

impl ProcessingMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::RulesOnly => "rules_only",
            Self::RulesOnlyFallback => "rules_only_fallback",
        }
    }
}

impl std::fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Important entities followed by derived expiration dates, deduplicated
/// on `(lowercase text, type)`.
#[must_use]
pub fn assemble(important: &[Entity], expiration: &[Entity]) -> Vec<Entity> {
    dedup_by_key(
        important.iter().chain(expiration).cloned(),
        KeyScope::TextAndType,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub source_identifier: String,
    pub total_entities: usize,
    pub raw_entities_count: usize,
    /// Raw minus final. Derived expiration dates can make this negative.
    pub removed_entities_count: i64,
    pub expiration_dates_found: usize,
    pub entity_types: Vec<EntityType>,
    pub entities: Vec<Entity>,
    pub processing_method: ProcessingMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagger_error: Option<String>,
    /// Seconds.
    pub processing_time: f64,
    pub success: bool,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ExtractionDetails>,
}

/// Intermediate stage lists, attached to a report on request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionDetails {
    pub normalized_text: String,
    pub tagger_entities: Vec<Entity>,
    pub rule_entities: Vec<Entity>,
    pub merged: Vec<Entity>,
    pub cleaned: Vec<Entity>,
    pub reclassified: Vec<Entity>,
    pub validated: Vec<Entity>,
    pub important: Vec<Entity>,
    pub expiration: Vec<Entity>,
}

impl ExtractionReport {
    #[must_use]
    pub fn new(
        source_identifier: impl Into<String>,
        raw_entities_count: usize,
        entities: Vec<Entity>,
        expiration_dates_found: usize,
        processing_method: ProcessingMethod,
        tagger_error: Option<String>,
        processing_time: Duration,
    ) -> Self {
        let entity_types: Vec<EntityType> = entities
            .iter()
            .map(|e| e.entity_type)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            source_identifier: source_identifier.into(),
            total_entities: entities.len(),
            raw_entities_count,
            removed_entities_count: count_as_i64(raw_entities_count) - count_as_i64(entities.len()),
            expiration_dates_found,
            entity_types,
            entities,
            processing_method,
            tagger_error,
            processing_time: processing_time.as_secs_f64(),
            success: true,
            timestamp: Utc::now().to_rfc3339(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: ExtractionDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn entities_of(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.entity_type == entity_type)
    }

    pub fn to_json(&self, pretty: bool) -> crate::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

fn count_as_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Outcome of one batch entry, reported at its position in the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchItem {
    Succeeded { index: usize, report: ExtractionReport },
    Failed { index: usize, error: String },
}

impl BatchItem {
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Succeeded { index, .. } | Self::Failed { index, .. } => *index,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_size: usize,
    pub results: Vec<BatchItem>,
    pub timestamp: String,
}

impl BatchReport {
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            results: Vec::with_capacity(batch_size),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn add_success(&mut self, index: usize, report: ExtractionReport) {
        self.results.push(BatchItem::Succeeded { index, report });
    }

    pub fn add_failure(&mut self, index: usize, error: impl std::fmt::Display) {
        self.results.push(BatchItem::Failed {
            index,
            error: error.to_string(),
        });
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }
}
