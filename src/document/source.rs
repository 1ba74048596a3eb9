//! Read access to a source document
//!
//! The structure walk only sees the engine-neutral models defined here, so it
//! can run over docx-rs output or over an in-memory document in tests.

use std::io::Cursor;
use std::path::Path;

use super::models::PageSettings;
use super::package::{read_media, with_empty_relationships};
use super::parsing::formatting::source_paragraph;
use super::parsing::table::source_table;
use crate::error::{Error, Result};

/// Numbering (list) membership of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    pub num_id: usize,
    pub level: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Engine-native size in half-points
    pub half_points: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceParagraph {
    pub style: String,
    pub numbering: Option<NumberingRef>,
    pub runs: Vec<SourceRun>,
}

impl SourceParagraph {
    /// Concatenation of all run texts
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Rows of cells of paragraphs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub rows: Vec<Vec<Vec<SourceParagraph>>>,
}

/// Read capability over an opened document
pub trait DocumentSource {
    /// Body paragraphs in reading order, table contents excluded
    fn paragraphs(&self) -> Vec<SourceParagraph>;

    fn tables(&self) -> Vec<SourceTable>;

    /// Embedded image payloads in source order; `None` when the data is unavailable
    fn images(&self) -> Vec<Option<Vec<u8>>>;

    fn page_settings(&self) -> Option<PageSettings>;
}

/// A .docx file opened through docx-rs
pub struct DocxSource {
    docx: docx_rs::Docx,
    images: Vec<Option<Vec<u8>>>,
    page_settings: Option<PageSettings>,
}

impl DocxSource {
    /// Open and parse the document; this is the only fatal step of extraction
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::unreadable(path, e))?;
        Self::from_bytes(&data).map_err(|e| match e {
            Error::SourceUnreadable { reason, .. } => Error::unreadable(path, reason),
            other => other,
        })
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let docx = match docx_rs::read_docx(data) {
            Ok(docx) => docx,
            Err(e) => match with_empty_relationships(data) {
                // docx-rs rejects a missing or broken relationship part
                Ok(Some(patched)) => {
                    log::warn!("Document relationships unusable ({e}); reading without them");
                    docx_rs::read_docx(&patched).map_err(|e| Error::unreadable("<memory>", e))?
                }
                _ => return Err(Error::unreadable("<memory>", e)),
            },
        };

        // Geometry and media are best effort: a package docx-rs accepted but we
        // cannot reopen simply contributes neither.
        let media = match read_media(Cursor::new(data)) {
            Ok(media) => media,
            Err(e) => {
                log::debug!("Package media unavailable: {e}");
                Default::default()
            }
        };

        Ok(Self {
            docx,
            images: media.images,
            page_settings: media.page_settings,
        })
    }
}

impl DocumentSource for DocxSource {
    fn paragraphs(&self) -> Vec<SourceParagraph> {
        self.docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Paragraph(para) => Some(source_paragraph(para)),
                _ => None,
            })
            .collect()
    }

    fn tables(&self) -> Vec<SourceTable> {
        self.docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                docx_rs::DocumentChild::Table(table) => Some(source_table(table)),
                _ => None,
            })
            .collect()
    }

    fn images(&self) -> Vec<Option<Vec<u8>>> {
        self.images.clone()
    }

    fn page_settings(&self) -> Option<PageSettings> {
        self.page_settings.clone()
    }
}

/// An already-decoded document, used where no package exists
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub paragraphs: Vec<SourceParagraph>,
    pub tables: Vec<SourceTable>,
    pub images: Vec<Option<Vec<u8>>>,
    pub page_settings: Option<PageSettings>,
}

impl DocumentSource for MemorySource {
    fn paragraphs(&self) -> Vec<SourceParagraph> {
        self.paragraphs.clone()
    }

    fn tables(&self) -> Vec<SourceTable> {
        self.tables.clone()
    }

    fn images(&self) -> Vec<Option<Vec<u8>>> {
        self.images.clone()
    }

    fn page_settings(&self) -> Option<PageSettings> {
        self.page_settings.clone()
    }
}
