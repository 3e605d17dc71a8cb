use regex::Regex;

use crate::config::Lexicon;
use crate::entity::{Entity, EntityType};

/// One row of the pattern table, before compilation.
#[derive(Debug, Clone, Copy)]
pub struct PatternDef {
    pub pattern: &'static str,
    /// PARTY patterns that anchor on `between`, `to` or `by`; their matches
    /// skip the marker check.
    pub anchored: bool,
    /// Matches immediately followed by this pattern are dropped.
    pub unless_followed_by: Option<&'static str>,
}

const fn def(pattern: &'static str) -> PatternDef {
    PatternDef {
        pattern,
        anchored: false,
        unless_followed_by: None,
    }
}

const fn anchored(pattern: &'static str) -> PatternDef {
    PatternDef {
        pattern,
        anchored: true,
        unless_followed_by: None,
    }
}

const fn not_age(pattern: &'static str) -> PatternDef {
    PatternDef {
        pattern,
        anchored: false,
        unless_followed_by: Some(r"^\s+of\s+age\b"),
    }
}

const AMOUNT: &[PatternDef] = &[
    def(r"\$\s*\d{1,3}(?:,\d{3})*(?:\.\d{2})?(?:\s*(?:billion|million|thousand|trillion|hundred))?"),
    def(r"\b\d{1,3}(?:,\d{3})*(?:\.\d{2})?\s*(?:billion|million|thousand|trillion|hundred)?\s*(?:USD|dollars?)\b"),
    def(r"(?:\bUSD|\$)\s*\d+(?:,\d{3})*(?:\.\d{2})?(?:\s*(?:billion|million|thousand|trillion|hundred))?"),
    def(r"\b\d+(?:\.\d+)?\s*(?:billion|million|thousand|trillion|hundred)\s+(?:USD|dollars?)\b"),
    def(r"(?:\bUSD|\$)\s*\d+(?:,\d{3})*(?:\.\d{2})?"),
    def(r"\$\s*\d+(?:,\d{3})*(?:\.\d{2})?"),
];

const EFFECTIVE_DATE: &[PatternDef] = &[
    def(r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s*\d{4}\b"),
    def(r"\b\d{1,2}\s+(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{4}\b"),
    def(r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2},?\s*\d{4}\b"),
    def(r"\b\d{1,2}/\d{1,2}/\d{4}\b"),
    def(r"\b\d{1,2}-\d{1,2}-\d{4}\b"),
    def(r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s*\d{4}\b(?:\s+and\s+|\s+until\s+|\s+terminate[sd]?\s+|\s+effective\s+)"),
    def(r"\b(?:as\s+of\s+)?(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s*\d{4}\b"),
];

const EXPIRATION_DATE: &[PatternDef] = &[
    def(r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s*\d{4}\b(?:\s+and\s+|\s+until\s+|\s+terminate[sd]?\s+)"),
    def(r"\b(?:expire[sd]?|terminate[sd]?|end[sd]?)\s+(?:on\s+)?(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s*\d{4}\b"),
    def(r"\b(?:expire[sd]?|expir(?:ing|ation)|terminat(?:es|ed|ion))\s+(?:date\s+)?(?:of\s+|on\s+)?\d{1,2}/\d{1,2}/\d{4}\b"),
];

const AGREEMENT_TYPE: &[PatternDef] = &[
    def(r"\b[A-Z]*[a-z]*\s*agreement\b"),
    def(r"\b[A-Z]*[a-z]*\s*contract\b"),
    def(r"\b[A-Z]*[a-z]*\s*pact\b"),
    def(r"\b[A-Z]*[a-z]*\s*understanding\b"),
    def(r"\b[A-Z]*[a-z]*\s*memorandum\b"),
    def(r"\b[A-Z]*[a-z]*\s*letter\s+(?:agreement|contract|understanding)\b"),
    def(r"\b[A-Z]*[a-z]*\s*protocol\b"),
    def(r"\b[A-Z]*[a-z]*\s*arrangement\b"),
    def(r"\b[A-Z]*[a-z]*\s*commitment\b"),
    def(r"\b[A-Z]*[a-z]*\s*instrument\b"),
    def(r"\b[A-Z]*[a-z]*\s*settlement\b"),
    def(r"\b[A-Z]*[a-z]*\s*accord\b"),
    def(r"\b[A-Z]*[a-z]*\s*covenant\b"),
    def(r"\b[A-Z]*[a-z]*\s*deed\b"),
    def(r"\b[A-Z]*[a-z]*\s*indenture\b"),
    def(r"\b[A-Z]*[a-z]*\s*prospectus\b"),
    def(r"\b[A-Z]*[a-z]*\s*statement(?:\s+of\s+additional\s+information)?\b"),
    def(r"\b[A-Z]*[a-z]*\s*policy\b"),
    def(r"\b[A-Z]*[a-z]*\s*terms(?:\s+and\s+conditions)?\b"),
];

const LOCATION: &[PatternDef] = &[
    def(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?,\s*[A-Z][A-Z]+\b"),
    def(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?,\s*[A-Z][a-z]+\s+[A-Z][a-z]+\b"),
    def(concat!(
        r"\b(?:New\s+York|Los\s+Angeles|Chicago|Houston|Phoenix|Philadelphia|San\s+Antonio|",
        r"San\s+Diego|Dallas|San\s+Jose|Austin|Jacksonville|Fort\s+Worth|Columbus|Charlotte|",
        r"San\s+Francisco|Indianapolis|Seattle|Denver|Washington|Boston|El\s+Paso|Nashville|",
        r"Detroit|Oklahoma\s+City|Portland|Las\s+Vegas|Baltimore|Memphis|Milwaukee|Tucson|",
        r"Fresno|Sacramento|Kansas\s+City|Mesa|Atlanta|Omaha|Colorado\s+Springs|Raleigh|",
        r"Long\s+Beach|Virginia\s+Beach|Miami|Oakland|Minneapolis|Tampa|Tulsa|Arlington|",
        r"Wichita|New\s+Orleans|Bakersfield|Honolulu|Anaheim|Santa\s+Ana|Riverside|Corona|",
        r"Lexington|Stockton|Cincinnati|Irvine|Greensboro|Lincoln|Toledo|St\.\s+Louis|",
        r"Rochester|Newark|Plano|Durham|St\.\s+Paul|Orlando|Laredo|Chula\s+Vista|Madison|",
        r"Gilbert|Buffalo|Chandler|Glendale|North\s+Las\s+Vegas|Scottsdale|Reno|Henderson|",
        r"Jersey\s+City|Chesapeake|Garland|Irving|Fremont|Norfolk|Boise|Richmond|Spokane|",
        r"Baton\s+Rouge)\b",
    )),
    def(concat!(
        r"\b(?:United\s+States|U\.S\.A\.|USA|Canada|UK|United\s+Kingdom|Germany|France|Japan|",
        r"China|India|Australia|Mexico|Brazil|Argentina|Spain|Italy|Netherlands|Switzerland|",
        r"Sweden|Norway|Denmark|Finland|Belgium|Austria|Poland|Czech\s+Republic|Hungary|",
        r"Romania|Bulgaria|Greece|Portugal|Turkey|Russia|Ukraine|Ireland|Northern\s+Ireland|",
        r"Scotland|Wales|England|Great\s+Britain|Luxembourg|Monaco|Iceland|Malta|Cyprus)\b",
    )),
];

const DURATION: &[PatternDef] = &[
    not_age(r"\b\d+(?:\.\d+)?\s*(?:years?|yrs?)\b"),
    not_age(r"\b\d+(?:\.\d+)?\s*(?:months?|mos?)\b"),
    not_age(r"\b\d+(?:\.\d+)?\s*(?:weeks?|wks?)\b"),
    not_age(r"\b\d+(?:\.\d+)?\s*days?\b"),
    def(r"\b(?:one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety|hundred)\s+(?:years?|yrs?)\b"),
    not_age(r"\b(?:per\s+annum|annually|yearly|monthly|quarterly|weekly|daily)\b"),
];

const PERCENTAGE: &[PatternDef] = &[
    def(r"\b\d+(?:\.\d+)?\s*%"),
    def(r"\b\d+(?:\.\d+)?\s*percent\b"),
    def(r"\b\d+(?:\.\d+)?\s*percentage\b"),
];

const PARTY: &[PatternDef] = &[
    def(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\s+(?:Inc\.?|Corp\.?|LLC|Ltd\.?|L\.P\.?|PLC|Group|Holdings|Company|Corporation|Trust|Fund)\b"),
    def(r"\b[A-Z][a-z]+\s+(?:Management|Advisors|Investments|Financial|Capital|Global|International|National|American|First|Second|Third)\s+(?:Inc\.?|Corp\.?|LLC|Ltd\.?)\b"),
    def(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\s+(?:Jr\.?|Sr\.?|II|III|IV|Esq\.?)\b"),
    def(r"\b[A-Z][a-z]+\s+[A-Z]\.\s+[A-Z][a-z]+\b"),
    def(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\s+(?:Trust|Fund|Foundation|Endowment)\b"),
    anchored(r"\bbetween\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\s+and\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?"),
    anchored(r"\bto\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?"),
    anchored(r"\bby\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?"),
];

/// Pattern tables in evaluation order.
pub const DEFAULT_TABLE: &[(EntityType, &[PatternDef])] = &[
    (EntityType::Amount, AMOUNT),
    (EntityType::EffectiveDate, EFFECTIVE_DATE),
    (EntityType::ExpirationDate, EXPIRATION_DATE),
    (EntityType::AgreementType, AGREEMENT_TYPE),
    (EntityType::Location, LOCATION),
    (EntityType::Duration, DURATION),
    (EntityType::Percentage, PERCENTAGE),
    (EntityType::Party, PARTY),
];

pub struct ExtractionPattern {
    pub regex: Regex,
    pub anchored: bool,
    pub unless_followed_by: Option<Regex>,
}

impl ExtractionPattern {
    /// Compiles a table row. Every pattern is case-insensitive.
    pub fn new(def: &PatternDef) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&format!("(?i){}", def.pattern))?,
            anchored: def.anchored,
            unless_followed_by: def
                .unless_followed_by
                .map(|p| Regex::new(&format!("(?i){p}")))
                .transpose()?,
        })
    }

    /// Trimmed, non-empty matches in left-to-right order.
    pub fn find_all<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        self.regex.find_iter(text).filter_map(move |m| {
            if let Some(guard) = &self.unless_followed_by {
                if guard.is_match(&text[m.end()..]) {
                    return None;
                }
            }
            let trimmed = m.as_str().trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
    }
}

pub struct PatternSet {
    pub entity_type: EntityType,
    pub patterns: Vec<ExtractionPattern>,
}

/// Ordered mapping from entity type to its ordered pattern list.
pub struct PatternRegistry {
    sets: Vec<PatternSet>,
}

impl PatternRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { sets: Vec::new() }
    }

    /// Builds a registry from a table; rows that fail to compile are logged and skipped.
    #[must_use]
    pub fn from_table(table: &[(EntityType, &[PatternDef])]) -> Self {
        let mut registry = Self::new();
        for (entity_type, defs) in table {
            let patterns = defs
                .iter()
                .filter_map(|d| match ExtractionPattern::new(d) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        tracing::warn!(%entity_type, pattern = d.pattern, "Skipping invalid pattern: {e}");
                        None
                    }
                })
                .collect();
            registry = registry.with_set(PatternSet {
                entity_type: *entity_type,
                patterns,
            });
        }
        registry
    }

    #[must_use]
    pub fn with_set(mut self, set: PatternSet) -> Self {
        self.sets.push(set);
        self
    }

    pub fn sets(&self) -> impl Iterator<Item = &PatternSet> {
        self.sets.iter()
    }

    #[must_use]
    pub fn set_for(&self, entity_type: EntityType) -> Option<&PatternSet> {
        self.sets.iter().find(|s| s.entity_type == entity_type)
    }

    pub fn pattern_count(&self) -> usize {
        self.sets.iter().map(|s| s.patterns.len()).sum()
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::from_table(DEFAULT_TABLE)
    }
}

/// Candidate generator driven by a [`PatternRegistry`].
///
/// Every pattern scans the whole text independently, so overlapping matches
/// from different patterns are all emitted. Output is type-major, then
/// pattern order, then position.
pub struct RuleBasedExtractor {
    registry: PatternRegistry,
    party_markers: Vec<String>,
}

impl RuleBasedExtractor {
    #[must_use]
    pub fn new(registry: PatternRegistry, party_markers: Vec<String>) -> Self {
        Self {
            registry,
            party_markers,
        }
    }

    #[must_use]
    pub fn from_lexicon(lexicon: &Lexicon) -> Self {
        Self::new(PatternRegistry::default(), lexicon.party_markers.clone())
    }

    #[must_use]
    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }

    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();

        for set in self.registry.sets() {
            for pattern in &set.patterns {
                for matched in pattern.find_all(text) {
                    if set.entity_type == EntityType::Party
                        && !pattern.anchored
                        && !self.has_party_marker(matched)
                    {
                        continue;
                    }
                    entities.push(Entity::new(matched, set.entity_type));
                }
            }
        }

        tracing::debug!(candidates = entities.len(), "rule extraction finished");
        entities
    }

    fn has_party_marker(&self, text: &str) -> bool {
        text.split_whitespace().any(|token| {
            let token = token.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '(' | ')'));
            self.party_markers
                .iter()
                .any(|m| m.trim_end_matches('.') == token)
        })
    }
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::from_lexicon(&Lexicon::default())
    }
}
