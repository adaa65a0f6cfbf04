//! Question-to-result pipeline
//!
//! - [`prompt`] - column list + transcript into an instruction
//! - [`extractor`] - SQL statement out of the model reply
//! - [`executor`] - statement against the warehouse
//! - [`introspect`] - databases, schemas, tables, columns

pub mod executor;
pub mod extractor;
pub mod introspect;
pub mod prompt;

pub use executor::{QueryExecutor, QueryOutcome};
pub use extractor::{ExtractionResult, SqlExtractor};
pub use introspect::SchemaIntrospector;
pub use prompt::{Instruction, PromptBuilder, DEFAULT_SYSTEM_PROMPT};
