//! File I/O operations and validation
//!
//! This module handles source file validation and the text form of the tree
//! exchanged with external tools.

use std::fs::{self, File};
use std::path::Path;
use zip::ZipArchive;

use super::models::DocumentTemplate;
use super::package::DOCUMENT_PART;
use crate::error::{Error, Result};

/// Validates that the file is a word-processing package
///
/// The file name is not checked; only the ZIP structure decides.
pub fn validate_docx_file(file_path: &Path) -> Result<()> {
    // Check ZIP structure contains word/document.xml
    let file = File::open(file_path).map_err(|e| Error::unreadable(file_path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::unreadable(file_path, e))?;

    if archive.by_name(DOCUMENT_PART).is_err() {
        // Check if it might be an Excel file
        if archive.by_name("xl/workbook.xml").is_ok() {
            return Err(Error::unreadable(
                file_path,
                "this appears to be an Excel file (.xlsx), not a Word document",
            ));
        }

        return Err(Error::unreadable(
            file_path,
            format!("missing {DOCUMENT_PART}; the file may be corrupted"),
        ));
    }

    Ok(())
}

/// Decode a tree from its JSON text form
pub fn tree_from_json(json: &str) -> Result<DocumentTemplate> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a tree as JSON; optional fields at their defaults are omitted
pub fn tree_to_json(tree: &DocumentTemplate, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(tree)?
    } else {
        serde_json::to_string(tree)?
    };
    Ok(json)
}

pub fn read_tree(path: &Path) -> Result<DocumentTemplate> {
    let content = fs::read_to_string(path)?;
    tree_from_json(&content).map_err(|e| match e {
        Error::InvalidTree(reason) => Error::InvalidTree(format!("{}: {reason}", path.display())),
        other => other,
    })
}

pub fn write_tree(tree: &DocumentTemplate, path: &Path, pretty: bool) -> Result<()> {
    fs::write(path, tree_to_json(tree, pretty)?)?;
    Ok(())
}
