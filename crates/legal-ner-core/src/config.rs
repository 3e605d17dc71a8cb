use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entity::KeyScope;
use crate::error::InputError;

/// Key used when combining tagger and rule candidates, and when joining
/// the candidates of consecutive windows of a long document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKey {
    /// Lowercased text only. The first candidate for a text wins whatever its type.
    #[default]
    Text,
    /// Lowercased text plus type, like every later stage.
    TextAndType,
}

impl MergeKey {
    #[must_use]
    pub const fn scope(self) -> KeyScope {
        match self {
            Self::Text => KeyScope::Text,
            Self::TextAndType => KeyScope::TextAndType,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextAndType => "text_and_type",
        }
    }
}

impl std::str::FromStr for MergeKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "text_and_type" | "text-and-type" | "text+type" => Ok(Self::TextAndType),
            other => Err(ConfigError::UnknownMergeKey(other.to_string())),
        }
    }
}

/// Bounds enforced at the boundary, before text reaches the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLimits {
    pub max_chars: usize,
    pub max_batch: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_chars: 10_000,
            max_batch: 10,
        }
    }
}

impl InputLimits {
    pub fn check_text(&self, text: &str) -> Result<(), InputError> {
        if text.trim().is_empty() {
            return Err(InputError::Empty);
        }
        let len = text.chars().count();
        if len > self.max_chars {
            return Err(InputError::TooLong {
                len,
                max: self.max_chars,
            });
        }
        Ok(())
    }

    pub fn check_batch(&self, len: usize) -> Result<(), InputError> {
        if len > self.max_batch {
            return Err(InputError::BatchTooLarge {
                len,
                max: self.max_batch,
            });
        }
        Ok(())
    }
}

/// Word lists consulted by the reconciliation stages.
///
/// Indicator lists are matched case-sensitively as whole terms; keyword
/// lists are matched as substrings of the lowercased text; blacklists are
/// matched against lowercased whitespace tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Single-token noise and short generic spans dropped by the cleaner.
    pub cleaner_stopwords: Vec<String>,
    /// Leading tokens that mark a span as a sentence fragment.
    pub fragment_prefixes: Vec<String>,
    /// Markers that make a raw PARTY match worth keeping in the extractor.
    pub party_markers: Vec<String>,
    /// Organizational markers accepted by the quality validator.
    pub company_indicators: Vec<String>,
    /// Organizational markers required by the importance filter.
    pub important_company_indicators: Vec<String>,
    pub agreement_keywords: Vec<String>,
    pub priority_agreement_keywords: Vec<String>,
    /// Exact strings too generic to be an agreement type.
    pub generic_agreement_terms: Vec<String>,
    /// Legal and process vocabulary that disqualifies a LOCATION.
    pub location_generic_words: Vec<String>,
    pub location_indicators: Vec<String>,
    pub important_location_indicators: Vec<String>,
    pub important_location_generic_words: Vec<String>,
    /// Any token in this list removes the entity in the importance filter.
    pub importance_blacklist: Vec<String>,
    pub expiration_keywords: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            cleaner_stopwords: words(&[
                "to", "of", "and", "in", "with", "as", "by", "for", "on", "at", "from", "the", "a",
                "an", "or", "but", "not", "be", "is", "are", "was", "were", "that", "this",
                "these", "those", "it", "they", "them", "their", "its", "certain", "add",
                "secure", "support", "facilitate", "production", "health", "necessary",
                "assistance", "testing", "evaluation", "acquisition", "drugs", "excipients",
                "components", "activities", "development", "agreement", "both", "parties",
            ]),
            fragment_prefixes: words(&["to", "of", "and", "in", "with", "as", "by", "for"]),
            party_markers: words(&[
                "Inc", "Corp", "LLC", "Ltd", "L.P", "PLC", "Group", "Holdings", "Company",
                "Corporation", "Trust", "Fund", "Foundation", "Endowment", "Jr", "Sr", "II",
                "III", "IV", "Esq",
            ]),
            company_indicators: words(&[
                "LLC", "Inc", "Corp", "Ltd", "Company", "Corporation", "Funding", "Finance",
                "Commercial", "Acquisition", "Recovery", "Solutions", "Trust", "Fund",
            ]),
            important_company_indicators: words(&[
                "LLC", "Inc", "Corp", "Ltd", "Company", "Corporation", "Group", "Brothers",
                "Funding", "Finance",
            ]),
            agreement_keywords: words(&[
                "agreement", "contract", "terms", "protocol", "memorandum", "letter",
                "commitment", "loan", "security",
            ]),
            priority_agreement_keywords: words(&[
                "agreement", "contract", "warrant", "security", "loan", "letter",
            ]),
            generic_agreement_terms: words(&["terms", "conditions", "provisions"]),
            location_generic_words: words(&[
                "assistance", "testing", "evaluation", "acquisition", "development", "terms",
                "conditions", "covenants", "rights", "duties", "obligations", "guaranties",
                "assurances", "promises",
            ]),
            location_indicators: words(&[
                "NY", "NJ", "USA", "New York", "California", "Texas", "Florida",
            ]),
            important_location_indicators: words(&[
                "NY", "NJ", "USA", "New York", "California", "Texas", "Florida", "Avenue",
                "Street", "Bay Shore",
            ]),
            important_location_generic_words: words(&[
                "terms", "conditions", "provisions", "pursuant", "accordance",
            ]),
            importance_blacklist: words(&[
                "representations", "warranties", "such", "letters", "numbers", "hypothecated",
                "assigned", "conveyed", "transferred", "lost", "stolen", "including", "without",
                "that", "whether", "upon", "shall", "not", "this", "foregoing", "than", "give",
                "if", "refusal", "which", "timely", "basis", "counter", "then", "partnership",
                "limited", "liability", "company", "joint", "venture", "trust", "organization",
                "business", "individual", "government", "requests", "waivers", "certified",
                "mail", "postage", "prepaid", "return", "receipt", "requested", "addressed",
                "supplements", "amendments", "related", "definitions", "all", "county", "any",
                "action", "suit", "contemplated", "herein", "except", "terms", "thereof",
                "hurdle", "or", "less", "offered", "shares", "fair", "otherwise", "requires",
                "comparable", "section", "pursuant", "hereto", "respect", "in",
                "unconditionally", "submits", "for", "itself", "its", "property", "to",
                "judgment", "each", "proceeding", "waives", "do", "so", "objection",
                "irrevocably", "accordance", "lexington", "evidenced", "hereby", "there",
                "transfer", "taxes", "authorization", "execution", "delivery", "violation",
                "constitute", "with", "lien", "charge", "impairment", "forfeiture", "material",
                "permit", "license", "accordingly", "purchased", "hereunder", "when", "issued",
                "sold", "expressed", "will", "offer", "sale", "change", "whatsoever", "must",
                "witness", "whereof", "parties", "security", "exemption", "from", "subject",
                "the", "registration", "effect", "substance", "certificate", "conditions", "of",
                "and", "may", "exercise", "price", "at", "surrendered", "value", "received",
                "warrant", "execute", "alteration",
            ]),
            expiration_keywords: words(&["expire", "expiration", "expired", "expiring", "expires"]),
        }
    }
}

/// True if `term` occurs in `text` with no alphanumeric character on either side.
pub(crate) fn contains_term(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    text.match_indices(term).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

impl Lexicon {
    pub(crate) fn has_any_term(text: &str, terms: &[String]) -> bool {
        terms.iter().any(|t| contains_term(text, t))
    }

    /// Substring test against the lowercased text.
    pub(crate) fn has_any_keyword(text: &str, keywords: &[String]) -> bool {
        let lower = text.to_lowercase();
        keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    pub(crate) fn is_listed(word: &str, list: &[String]) -> bool {
        list.iter().any(|w| w == word)
    }

    /// True when the first whitespace token of the lowercased text is a fragment prefix.
    pub(crate) fn starts_with_fragment(&self, text: &str) -> bool {
        text.split_whitespace()
            .next()
            .is_some_and(|first| Self::is_listed(&first.to_lowercase(), &self.fragment_prefixes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub merge_key: MergeKey,
    /// Documents longer than this many characters are processed in windows.
    pub window_chars: usize,
    pub tagger_timeout_ms: u64,
    pub limits: InputLimits,
    pub lexicon: Lexicon,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            merge_key: MergeKey::Text,
            window_chars: 10_000,
            tagger_timeout_ms: 30_000,
            limits: InputLimits::default(),
            lexicon: Lexicon::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `LEGAL_NER_*` environment overrides; malformed values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = env_value("LEGAL_NER_MERGE_KEY").and_then(|v| v.parse().ok()) {
            self.merge_key = key;
        }
        if let Some(ms) = env_value("LEGAL_NER_TAGGER_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.tagger_timeout_ms = ms;
        }
        if let Some(chars) = env_value("LEGAL_NER_WINDOW_CHARS").and_then(|v| v.parse().ok()) {
            self.window_chars = chars;
        }
        self
    }

    #[must_use]
    pub fn tagger_timeout(&self) -> Duration {
        Duration::from_millis(self.tagger_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_chars == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.tagger_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.limits.max_chars == 0 || self.limits.max_batch == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Window size must be at least one character")]
    ZeroWindow,
    #[error("Tagger timeout must be non-zero")]
    ZeroTimeout,
    #[error("Input limits must be non-zero")]
    ZeroLimit,
    #[error("Unknown merge key: {0} (expected text or text_and_type)")]
    UnknownMergeKey(String),
}
