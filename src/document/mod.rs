//! Document mapping and data structures module
//!
//! This module maps Microsoft Word (.docx) documents to the intermediate tree
//! and rebuilds documents from it.

pub mod builder;
pub mod io;
pub mod loader;
pub mod models;
pub mod package;
pub(crate) mod parsing;
pub mod query;
pub mod source;
pub mod writer;

// Re-export the models and the main entry points
pub use builder::{BuildOptions, build_document, build_into, build_to_file};
pub use io::{read_tree, tree_from_json, tree_to_json, validate_docx_file, write_tree};
pub use loader::{
    ExtractOptions, extract_document, extract_document_with, extract_documents, extract_structure,
};
pub use models::*;
pub use package::resolve_hyperlinks;
pub use query::*;
pub use source::{DocumentSource, DocxSource, MemorySource};
pub use writer::{DocumentSink, DocxSink};
