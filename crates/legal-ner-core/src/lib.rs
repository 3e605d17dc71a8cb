#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::module_name_repetitions
)]

pub mod config;
mod dates;
pub mod entity;
pub mod error;
pub mod ingest;
pub mod refine;
pub mod report;

pub use config::{ConfigError, InputLimits, Lexicon, MergeKey, PipelineConfig};
pub use entity::{dedup_by_key, DedupKey, Entity, EntityType, KeyScope};
pub use error::{Error, InputError, Result};
pub use ingest::{
    normalize, BatchInput, Document, Pipeline, RuleBasedExtractor, StaticTagger, Tagger,
    TaggerError, UnavailableTagger,
};
pub use report::{BatchItem, BatchReport, ExtractionDetails, ExtractionReport, ProcessingMethod};
