//! Document loading and orchestration
//!
//! This module contains the extraction entry points that turn a .docx file
//! into the intermediate tree: open the document, resolve hyperlinks from the
//! package, then walk paragraphs into sections, followed by tables and images.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::io::validate_docx_file;
use super::models::*;
use super::package::resolve_hyperlinks;
use super::parsing::heading::{DEFAULT_HEADING_PREFIX, is_heading_style};
use super::parsing::list::ListState;
use super::parsing::runs::build_runs;
use super::parsing::table::table_block;
use super::source::{DocumentSource, DocxSource, SourceParagraph};
use crate::error::{Error, Result};

/// Options for the structure walk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractOptions {
    /// Paragraph style prefix that starts a new section
    pub heading_prefix: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            heading_prefix: DEFAULT_HEADING_PREFIX.to_string(),
        }
    }
}

/// Extract the tree from a .docx file with default options
pub fn extract_document(file_path: &Path) -> Result<DocumentTemplate> {
    extract_document_with(file_path, &ExtractOptions::default())
}

/// Main extraction function
///
/// Only an unreadable source is fatal. Failure to resolve hyperlinks is logged
/// and extraction continues with no hyperlinks attached.
pub fn extract_document_with(
    file_path: &Path,
    options: &ExtractOptions,
) -> Result<DocumentTemplate> {
    validate_docx_file(file_path)?;

    let source = DocxSource::open(file_path)?;

    let links = resolve_hyperlinks(file_path).unwrap_or_else(|e| {
        log::warn!(
            "Hyperlink targets unavailable for {}: {e}",
            file_path.display()
        );
        HyperlinkMap::new()
    });

    let template = extract_structure(&source, &links, options);
    log::debug!(
        "Extracted {}: {} sections, {} blocks",
        file_path.display(),
        template.sections.len(),
        template.block_count()
    );
    Ok(template)
}

/// Extract several documents concurrently on the blocking pool
///
/// Each document is independent; results come back in input order.
pub async fn extract_documents(
    paths: Vec<PathBuf>,
    options: ExtractOptions,
) -> Vec<Result<DocumentTemplate>> {
    let handles: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let options = options.clone();
            tokio::task::spawn_blocking(move || extract_document_with(&path, &options))
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(
            handle
                .await
                .unwrap_or_else(|e| Err(Error::Io(std::io::Error::other(e)))),
        );
    }
    results
}

/// Walk a source document into the intermediate tree
///
/// Paragraphs are visited in order; tables and then images are appended to the
/// last section afterwards. `links` is keyed by body paragraph index.
pub fn extract_structure(
    source: &dyn DocumentSource,
    links: &HyperlinkMap,
    options: &ExtractOptions,
) -> DocumentTemplate {
    let mut walk = StructureWalk::new(options);

    for (index, para) in source.paragraphs().iter().enumerate() {
        let para_links = links.get(&index).map(Vec::as_slice).unwrap_or(&[]);
        walk.visit(para, para_links);
    }

    for table in source.tables() {
        walk.push_block(table_block(&table));
    }

    let mut image_number = 1;
    for data in source.images() {
        walk.current_section();
        let Some(data) = data else {
            log::debug!("Skipping image without data");
            continue;
        };
        walk.push_block(Block::Image {
            image: ImageBlock {
                name: ImageBlock::sequential_name(image_number),
                data,
            },
        });
        image_number += 1;
    }

    DocumentTemplate {
        kind: DocumentKind::Word,
        sections: walk.finish(),
        page_settings: source.page_settings(),
    }
}

/// Per-extraction walk state: the sections built so far and the open list
struct StructureWalk<'a> {
    options: &'a ExtractOptions,
    sections: Vec<Section>,
    list: ListState,
}

impl<'a> StructureWalk<'a> {
    fn new(options: &'a ExtractOptions) -> Self {
        Self {
            options,
            sections: Vec::new(),
            list: ListState::default(),
        }
    }

    fn visit(&mut self, para: &SourceParagraph, links: &[HyperlinkRecord]) {
        if para.plain_text().trim().is_empty() {
            // Blank lines never start a section
            self.list.close();
            if let Some(section) = self.sections.last_mut() {
                section.body.push(Block::BlankLine);
            }
            return;
        }

        if is_heading_style(&para.style, &self.options.heading_prefix) {
            self.list.close();
            let title = Block::paragraph(para.style.clone(), build_runs(para, links));
            self.sections.push(Section::titled(title));
            return;
        }

        if let Some(numbering) = para.numbering {
            let item = build_runs(para, links);
            let continues = self.list.continues(numbering.num_id);
            let body = &mut self.current_section().body;

            let opened = match body.last_mut() {
                Some(Block::List { items, .. }) if continues => {
                    items.push(item);
                    false
                }
                _ => {
                    body.push(Block::List {
                        indent: numbering.level,
                        items: vec![item],
                    });
                    true
                }
            };
            if opened {
                self.list.open(numbering.num_id);
            }
            return;
        }

        self.list.close();
        self.push_block(Block::paragraph(para.style.clone(), build_runs(para, links)));
    }

    /// The last section, creating an untitled one when none exists yet
    fn current_section(&mut self) -> &mut Section {
        if self.sections.is_empty() {
            self.sections.push(Section::untitled());
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    fn push_block(&mut self, block: Block) {
        self.current_section().body.push(block);
    }

    fn finish(self) -> Vec<Section> {
        self.sections
    }
}
