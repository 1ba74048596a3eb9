//! docxtree: round-trip .docx documents through an editable tree
//!
//! This library extracts Microsoft Word documents into an ordered tree of
//! sections, blocks and styled runs (with hyperlink targets resolved from the
//! package), and rebuilds documents from a possibly rewritten copy of that tree.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use document::{
    Block, BuildOptions, DocumentTemplate, ExtractOptions, Run, Section, build_document,
    extract_document,
};
pub use error::{Error, Result};
