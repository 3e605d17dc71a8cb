mod extractor;
mod merger;
mod normalizer;
mod pipeline;
mod tagger;

pub use extractor::{
    ExtractionPattern, PatternDef, PatternRegistry, PatternSet, RuleBasedExtractor, DEFAULT_TABLE,
};
pub use merger::{merge_candidates, merge_windows};
pub use normalizer::normalize;
pub use pipeline::{BatchInput, Document, Pipeline};
pub use tagger::{
    tag_with_timeout, StaticTagger, Tagger, TaggerError, TaggerResult, UnavailableTagger,
};

pub(crate) use normalizer::collapse_whitespace;
