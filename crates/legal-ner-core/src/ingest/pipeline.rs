use std::time::Instant;

use super::extractor::RuleBasedExtractor;
use super::merger::{merge_candidates, merge_windows};
use super::normalizer::normalize;
use super::tagger::{tag_with_timeout, Tagger};
use crate::config::PipelineConfig;
use crate::entity::Entity;
use crate::refine::{clean, extract_expirations, filter_important, validate, Reclassifier};
use crate::error::InputError;
use crate::report::{assemble, BatchReport, ExtractionDetails, ExtractionReport, ProcessingMethod};

/// Every intermediate list produced while processing one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub source_id: String,
    pub text: String,
    pub normalized: String,
    pub windows: usize,
    pub tagger: Vec<Entity>,
    pub rules: Vec<Entity>,
    pub merged: Vec<Entity>,
    pub cleaned: Vec<Entity>,
    pub reclassified: Vec<Entity>,
    pub validated: Vec<Entity>,
    pub important: Vec<Entity>,
    pub expiration: Vec<Entity>,
    pub final_entities: Vec<Entity>,
    pub method: ProcessingMethod,
    pub tagger_error: Option<String>,
}

impl Document {
    #[must_use]
    pub fn into_report(self, elapsed: std::time::Duration) -> ExtractionReport {
        ExtractionReport::new(
            self.source_id,
            self.merged.len(),
            self.final_entities,
            self.expiration.len(),
            self.method,
            self.tagger_error,
            elapsed,
        )
    }

    /// Copies the stage lists a caller may want to inspect.
    #[must_use]
    pub fn details(&self) -> ExtractionDetails {
        ExtractionDetails {
            normalized_text: self.normalized.clone(),
            tagger_entities: self.tagger.clone(),
            rule_entities: self.rules.clone(),
            merged: self.merged.clone(),
            cleaned: self.cleaned.clone(),
            reclassified: self.reclassified.clone(),
            validated: self.validated.clone(),
            important: self.important.clone(),
            expiration: self.expiration.clone(),
        }
    }
}

/// One batch entry. An entry whose text could not be obtained is still
/// part of the batch and is reported as a failure at its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub source_id: String,
    pub content: Result<String, InputError>,
}

impl BatchInput {
    #[must_use]
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            content: Ok(text.into()),
        }
    }

    #[must_use]
    pub fn unreadable(source_id: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self {
            source_id: source_id.into(),
            content: Err(InputError::Unreadable(reason.to_string())),
        }
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    extractor: RuleBasedExtractor,
    reclassifier: Reclassifier,
    tagger: Option<Box<dyn Tagger>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let extractor = RuleBasedExtractor::from_lexicon(&config.lexicon);
        Self {
            config,
            extractor,
            reclassifier: Reclassifier::default(),
            tagger: None,
        }
    }

    #[must_use]
    pub fn with_tagger(mut self, tagger: Box<dyn Tagger>) -> Self {
        self.tagger = Some(tagger);
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: RuleBasedExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub fn with_reclassifier(mut self, reclassifier: Reclassifier) -> Self {
        self.reclassifier = reclassifier;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage over `text`. Never fails: a tagger error degrades
    /// the affected windows to rule candidates only.
    pub async fn process(&self, source_id: &str, text: &str) -> Document {
        let lexicon = &self.config.lexicon;
        let normalized = normalize(text);
        let windows = split_windows(&normalized, self.config.window_chars);

        let mut tagger_all = Vec::new();
        let mut rules_all = Vec::new();
        let mut per_window = Vec::with_capacity(windows.len());
        let mut tagger_error = None;

        for (index, window) in windows.iter().enumerate() {
            let tagged = match &self.tagger {
                Some(tagger) => {
                    match tag_with_timeout(tagger.as_ref(), window, self.config.tagger_timeout()).await
                    {
                        Ok(candidates) => candidates,
                        Err(e) => {
                            tracing::warn!(
                                source = source_id,
                                window = index,
                                tagger = tagger.name(),
                                "Tagger failed, using rule candidates only: {e}"
                            );
                            tagger_error.get_or_insert_with(|| e.to_string());
                            Vec::new()
                        }
                    }
                }
                None => Vec::new(),
            };
            let rules = self.extractor.extract(window);

            per_window.push(merge_candidates(&tagged, &rules, self.config.merge_key));
            tagger_all.extend(tagged);
            rules_all.extend(rules);
        }

        let merged = merge_windows(per_window, self.config.merge_key);
        let cleaned = clean(&merged, lexicon);
        let reclassified = self.reclassifier.apply(&cleaned, lexicon);
        let validated = validate(&reclassified, lexicon);
        let important = filter_important(&validated, lexicon);
        let expiration = extract_expirations(&validated, lexicon);
        let final_entities = assemble(&important, &expiration);

        let method = match (&self.tagger, &tagger_error) {
            (None, _) => ProcessingMethod::RulesOnly,
            (Some(_), None) => ProcessingMethod::Hybrid,
            (Some(_), Some(_)) => ProcessingMethod::RulesOnlyFallback,
        };

        tracing::info!(
            source = source_id,
            windows = windows.len(),
            raw = merged.len(),
            final_count = final_entities.len(),
            method = %method,
            "Processed document"
        );

        Document {
            source_id: source_id.to_string(),
            text: text.to_string(),
            windows: windows.len(),
            tagger: tagger_all,
            rules: rules_all,
            merged,
            cleaned,
            reclassified,
            validated,
            important,
            expiration,
            final_entities,
            method,
            tagger_error,
            normalized,
        }
    }

    /// Processes text of any length without boundary checks.
    pub async fn extract(&self, source_id: &str, text: &str) -> ExtractionReport {
        let start = Instant::now();
        let document = self.process(source_id, text).await;
        document.into_report(start.elapsed())
    }

    /// Like [`Pipeline::extract`], with the intermediate stage lists attached.
    pub async fn extract_detailed(&self, source_id: &str, text: &str) -> ExtractionReport {
        let start = Instant::now();
        let document = self.process(source_id, text).await;
        let details = document.details();
        document.into_report(start.elapsed()).with_details(details)
    }

    /// Boundary call: rejects empty or oversized input before processing.
    pub async fn run(&self, source_id: &str, text: &str) -> crate::Result<ExtractionReport> {
        self.config.limits.check_text(text)?;
        Ok(self.extract(source_id, text).await)
    }

    /// Processes every item independently. An item that fails is recorded
    /// at its index and the rest of the batch carries on.
    pub async fn run_batch(&self, items: &[BatchInput]) -> crate::Result<BatchReport> {
        self.config.limits.check_batch(items.len())?;

        let mut report = BatchReport::new(items.len());
        for (index, item) in items.iter().enumerate() {
            let outcome = match &item.content {
                Ok(text) => self.run(&item.source_id, text).await,
                Err(e) => Err(e.clone().into()),
            };
            match outcome {
                Ok(result) => report.add_success(index, result),
                Err(e) => {
                    tracing::warn!(index, source = %item.source_id, "Batch item rejected: {e}");
                    report.add_failure(index, e);
                }
            }
        }

        tracing::info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Processed batch"
        );
        Ok(report)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

/// Splits `text` into consecutive windows of at most `window_chars`
/// characters. Empty text has no windows.
fn split_windows(text: &str, window_chars: usize) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let size = window_chars.max(1);

    let mut windows = Vec::new();
    let mut start = 0;
    for (count, (offset, _)) in text.char_indices().enumerate() {
        if count > 0 && count % size == 0 {
            windows.push(&text[start..offset]);
            start = offset;
        }
    }
    windows.push(&text[start..]);
    windows
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::*;
    use crate::entity::{EntityType, KeyScope};
    use crate::error::{Error, InputError};
    use crate::ingest::tagger::{StaticTagger, TaggerResult, UnavailableTagger};
    use crate::report::BatchItem;
    use proptest::prelude::*;

    const LOAN: &str = "This loan agreement is made as of July 11, 2006 between ABC Corp and John Doe for $100,000.";

    struct StalledTagger;

    #[async_trait::async_trait]
    impl Tagger for StalledTagger {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn tag(&self, _text: &str) -> TaggerResult<Vec<Entity>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    fn has(entities: &[Entity], text: &str, entity_type: EntityType) -> bool {
        entities
            .iter()
            .any(|e| e.text == text && e.entity_type == entity_type)
    }

    #[tokio::test]
    async fn test_rules_only_loan_sentence() {
        let doc = Pipeline::default().process("loan", LOAN).await;

        assert_eq!(doc.method, ProcessingMethod::RulesOnly);
        assert!(doc.tagger.is_empty());
        assert_eq!(doc.windows, 1);
        assert!(has(&doc.final_entities, "$100,000", EntityType::Amount));
        assert!(has(&doc.final_entities, "July 11, 2006", EntityType::EffectiveDate));
        assert!(doc
            .final_entities
            .iter()
            .any(|e| e.entity_type == EntityType::AgreementType && e.text.contains("agreement")));
        assert!(doc
            .final_entities
            .iter()
            .any(|e| e.entity_type == EntityType::Party && e.text.contains("ABC Corp")));
        // "as of July 11, 2006" is a fragment and never survives cleaning.
        assert!(!doc.cleaned.iter().any(|e| e.text.starts_with("as of")));
    }

    #[tokio::test]
    async fn test_hybrid_tagger_type_wins_then_gets_corrected() {
        let tagger = StaticTagger::new(vec![Entity::new("ABC Corp", EntityType::Location)]);
        let doc = Pipeline::default()
            .with_tagger(Box::new(tagger))
            .process("loan", LOAN)
            .await;

        assert_eq!(doc.method, ProcessingMethod::Hybrid);
        assert_eq!(doc.merged[0], Entity::new("ABC Corp", EntityType::Location));
        assert!(has(&doc.reclassified, "ABC Corp", EntityType::Party));
        assert!(has(&doc.final_entities, "ABC Corp", EntityType::Party));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tagger_timeout_falls_back_to_rules() {
        let config = PipelineConfig {
            tagger_timeout_ms: 50,
            ..PipelineConfig::default()
        };
        let doc = Pipeline::new(config)
            .with_tagger(Box::new(StalledTagger))
            .process("loan", LOAN)
            .await;

        assert_eq!(doc.method, ProcessingMethod::RulesOnlyFallback);
        assert!(doc.tagger_error.as_deref().unwrap().contains("timed out"));
        assert!(has(&doc.final_entities, "$100,000", EntityType::Amount));
    }

    #[tokio::test]
    async fn test_unavailable_tagger_is_recorded_in_report() {
        let report = Pipeline::default()
            .with_tagger(Box::new(UnavailableTagger::new("model not loaded")))
            .run("loan", LOAN)
            .await
            .unwrap();

        assert!(report.success);
        assert_eq!(report.processing_method, ProcessingMethod::RulesOnlyFallback);
        assert_eq!(
            report.tagger_error.as_deref(),
            Some("Tagger unavailable: model not loaded")
        );
    }

    #[tokio::test]
    async fn test_report_counts_follow_document() {
        let pipeline = Pipeline::default();
        let doc = pipeline.process("loan", LOAN).await;
        let report = pipeline.extract("loan", LOAN).await;

        assert_eq!(report.raw_entities_count, doc.merged.len());
        assert_eq!(report.entities, doc.final_entities);
        assert_eq!(
            report.removed_entities_count,
            doc.merged.len() as i64 - doc.final_entities.len() as i64
        );
    }

    #[tokio::test]
    async fn test_expiration_clause_end_to_end() {
        let text = "The Warrant shall expire on December 31, 2015 and is payable in New York, NY.";
        let doc = Pipeline::default().process("warrant", text).await;
        assert!(doc
            .expiration
            .iter()
            .all(|e| e.entity_type == EntityType::ExpirationDate));
        assert!(has(&doc.final_entities, "December 31, 2015", EntityType::ExpirationDate));
    }

    #[tokio::test]
    async fn test_final_expiration_dates_are_derived_only() {
        let text = "The Warrant shall expire on December 31, 2015 and is payable in New York, NY.";
        let pipeline = Pipeline::default();
        let doc = pipeline.process("warrant", text).await;

        assert!(has(&doc.rules, "expire on December 31, 2015", EntityType::ExpirationDate));
        let expirations: Vec<&Entity> = doc
            .final_entities
            .iter()
            .filter(|e| e.entity_type == EntityType::ExpirationDate)
            .collect();
        assert_eq!(
            expirations,
            vec![&Entity::new("December 31, 2015", EntityType::ExpirationDate)]
        );

        let report = pipeline.extract("warrant", text).await;
        assert_eq!(report.expiration_dates_found, doc.expiration.len());
        assert!(report.expiration_dates_found >= 1);
    }

    #[tokio::test]
    async fn test_extract_detailed_attaches_stage_lists() {
        let pipeline = Pipeline::default();
        let doc = pipeline.process("loan", LOAN).await;
        let report = pipeline.extract_detailed("loan", LOAN).await;

        let details = report.details.as_ref().unwrap();
        assert_eq!(details.normalized_text, doc.normalized);
        assert_eq!(details.rule_entities, doc.rules);
        assert!(details.tagger_entities.is_empty());
        assert_eq!(details.validated, doc.validated);
        assert_eq!(report.entities, doc.final_entities);
        assert!(pipeline.extract("loan", LOAN).await.details.is_none());
    }

    #[tokio::test]
    async fn test_long_document_is_windowed_and_merged() {
        let sentence = "Fee $5,000 due in 30 days. ";
        let text = sentence.repeat(3);
        let config = PipelineConfig {
            window_chars: sentence.chars().count(),
            ..PipelineConfig::default()
        };
        let doc = Pipeline::new(config).process("fees", &text).await;

        assert_eq!(doc.windows, 3);
        assert_eq!(doc.final_entities.iter().filter(|e| e.text == "$5,000").count(), 1);
        assert!(has(&doc.final_entities, "30 days", EntityType::Duration));
    }

    #[tokio::test]
    async fn test_empty_text_yields_empty_document() {
        let doc = Pipeline::default().process("empty", "  \n ").await;
        assert_eq!(doc.windows, 0);
        assert!(doc.final_entities.is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_input_outside_limits() {
        let pipeline = Pipeline::default();

        let err = pipeline.run("blank", "   ").await.unwrap_err();
        assert!(matches!(err, Error::Input(InputError::Empty)));

        let err = pipeline.run("long", &"a".repeat(10_001)).await.unwrap_err();
        assert!(matches!(err, Error::Input(InputError::TooLong { len: 10_001, max: 10_000 })));
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let items = vec![
            BatchInput::new("a", LOAN),
            BatchInput::new("b", ""),
            BatchInput::new("c", "Interest accrues at 5% per annum."),
        ];
        let report = Pipeline::default().run_batch(&items).await.unwrap();

        assert_eq!(report.batch_size, 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert!(matches!(&report.results[1], BatchItem::Failed { index: 1, .. }));
        assert_eq!(report.results[2].index(), 2);
    }

    #[tokio::test]
    async fn test_batch_records_unreadable_items() {
        let items = vec![
            BatchInput::unreadable("missing.txt", "No such file or directory"),
            BatchInput::new("b", LOAN),
        ];
        let report = Pipeline::default().run_batch(&items).await.unwrap();

        assert_eq!(report.success_count(), 1);
        match &report.results[0] {
            BatchItem::Failed { index, error } => {
                assert_eq!(*index, 0);
                assert!(error.contains("No such file or directory"));
            }
            other => panic!("expected a failure, got {other:?}"),
        }
        assert!(report.results[1].is_success());
    }

    #[tokio::test]
    async fn test_batch_over_limit_rejected_up_front() {
        let items: Vec<BatchInput> = (0..11).map(|i| BatchInput::new(i.to_string(), LOAN)).collect();
        let err = Pipeline::default().run_batch(&items).await.unwrap_err();
        assert!(matches!(err, Error::Input(InputError::BatchTooLarge { len: 11, max: 10 })));
    }

    #[test]
    fn test_split_windows_counts_chars() {
        assert_eq!(split_windows("ééé", 2), vec!["éé", "é"]);
        assert_eq!(split_windows("abcd", 2), vec!["ab", "cd"]);
        assert_eq!(split_windows("abc", 10), vec!["abc"]);
        assert!(split_windows("", 10).is_empty());
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    fn contract_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop::sample::select(vec![
                "This", "loan", "agreement", "Security Agreement", "is", "made", "as of",
                "July 11, 2006", "12 Jan 2024", "between", "ABC Corp", "XYZ LLC", "and",
                "John Doe", "for", "$100,000", "5%", "30 days", "Brooklyn, NY", "shall",
                "expire on December 31, 2015", "Handley, President", "to", "that", "certain",
            ]),
            0..30,
        )
        .prop_map(|words| words.join(" "))
    }

    proptest! {
        #[test]
        fn processing_is_deterministic(text in contract_text()) {
            let pipeline = Pipeline::default();
            let first = block_on(pipeline.process("p", &text));
            let second = block_on(pipeline.process("p", &text));
            prop_assert_eq!(first.final_entities, second.final_entities);
        }

        #[test]
        fn final_entities_hold_invariants(text in contract_text()) {
            let doc = block_on(Pipeline::default().process("p", &text));
            let mut seen = HashSet::new();
            for entity in &doc.final_entities {
                prop_assert!(seen.insert(entity.key(KeyScope::TextAndType)));
                prop_assert!((3..=200).contains(&entity.char_len()));
                prop_assert!(EntityType::ALL.contains(&entity.entity_type));
            }
        }
    }
}
