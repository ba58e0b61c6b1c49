//! Ingestion: source discovery, archive extraction, header normalization and the merged dataset.

pub mod dataset;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod record;
pub mod source;
pub mod sqlite;

pub use dataset::{Dataset, DatasetAssembler, SourceSummary};
pub use error::{ExtractError, IngestError};
pub use record::{CanonicalField, CanonicalRecord};
pub use source::{discover_sources, signature, SourceKey, SourceSignature, SourceSpec};
