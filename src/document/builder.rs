//! Document reconstruction
//!
//! Replays an intermediate tree into a new document. Every list in the tree
//! renders with one shared bullet definition; the block's `indent` selects the
//! level. Reconstruction is all-or-nothing: the first failure aborts the build
//! and nothing is written.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::models::*;
use super::writer::{
    BulletStyle, DocumentSink, DocxSink, Inline, NumberingBinding, ParagraphSpec, RunSpec,
};
use crate::error::{Error, Result};

/// Options for reconstruction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildOptions {
    pub bullet_glyph: String,
    /// Left indent of list level 0 in twips; level n indents n + 1 times this
    pub left_indent: i32,
    pub hanging_indent: i32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            bullet_glyph: "•".to_string(),
            left_indent: 720,
            hanging_indent: 360,
        }
    }
}

impl BuildOptions {
    fn bullet_style(&self) -> BulletStyle {
        BulletStyle {
            glyph: self.bullet_glyph.clone(),
            left_indent: self.left_indent,
            hanging_indent: self.hanging_indent,
        }
    }
}

/// Build a .docx from the tree and return its bytes
pub fn build_document(tree: &DocumentTemplate, options: &BuildOptions) -> Result<Vec<u8>> {
    let mut sink = DocxSink::new();
    build_into(tree, &mut sink, options)?;
    sink.finish()
}

/// Build a .docx and write it to `path`
///
/// The document is fully built in memory first; a failed write removes any
/// partially written file.
pub fn build_to_file(tree: &DocumentTemplate, path: &Path, options: &BuildOptions) -> Result<()> {
    let bytes = build_document(tree, options)?;

    if let Err(e) = fs::write(path, &bytes) {
        let _ = fs::remove_file(path);
        return Err(Error::Build(format!(
            "cannot write {}: {e}",
            path.display()
        )));
    }

    log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Replay the tree into any sink
pub fn build_into<S: DocumentSink>(
    tree: &DocumentTemplate,
    sink: &mut S,
    options: &BuildOptions,
) -> Result<()> {
    if let Some(settings) = &tree.page_settings {
        sink.set_page_settings(settings);
    }

    let bullets = sink.add_bullet_numbering(&options.bullet_style());

    for section in &tree.sections {
        if let Some(title) = &section.title {
            emit_block(sink, title, bullets)?;
        }
        for block in &section.body {
            emit_block(sink, block, bullets)?;
        }
    }

    Ok(())
}

fn emit_block<S: DocumentSink>(sink: &mut S, block: &Block, bullets: usize) -> Result<()> {
    match block {
        Block::BlankLine => sink.add_paragraph(ParagraphSpec::default()),
        Block::Paragraph { style, runs } => sink.add_paragraph(paragraph_spec(style, runs)),
        Block::List { indent, items } => {
            for item in items {
                sink.add_paragraph(ParagraphSpec {
                    style: None,
                    numbering: Some(NumberingBinding {
                        id: bullets,
                        level: *indent,
                    }),
                    content: inline_runs(item),
                })?;
            }
            Ok(())
        }
        Block::Table { rows, .. } => {
            let rows = rows
                .iter()
                .map(|row| row.iter().map(cell_spec).collect())
                .collect();
            sink.add_table(rows)
        }
        Block::Image { image } => sink.add_paragraph(ParagraphSpec {
            content: vec![Inline::Image(image.data.clone())],
            ..Default::default()
        }),
    }
}

fn paragraph_spec(style: &str, runs: &[Run]) -> ParagraphSpec {
    ParagraphSpec {
        style: (!style.is_empty()).then(|| style.to_string()),
        numbering: None,
        content: inline_runs(runs),
    }
}

/// A table cell holds one paragraph; non-paragraph cell blocks contribute their text
fn cell_spec(cell: &Block) -> ParagraphSpec {
    match cell {
        Block::Paragraph { style, runs } => paragraph_spec(style, runs),
        other => paragraph_spec("", &other.all_runs().cloned().collect::<Vec<_>>()),
    }
}

fn inline_runs(runs: &[Run]) -> Vec<Inline> {
    runs.iter()
        .map(|run| {
            let spec = RunSpec {
                text: run.text.clone(),
                bold: run.bold,
                italic: run.italic,
                half_points: run.half_points(),
            };
            match run.hyperlink_target() {
                Some(url) => Inline::Link {
                    url: url.to_string(),
                    run: spec,
                },
                None => Inline::Text(spec),
            }
        })
        .collect()
}
