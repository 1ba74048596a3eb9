//! Write access to a new document
//!
//! The builder emits engine-neutral paragraph specs into a [`DocumentSink`];
//! [`DocxSink`] turns them into a docx-rs document and packs it.

use docx_rs::{
    AbstractNumbering, Docx, Hyperlink, HyperlinkType, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, PageMargin, PageOrientationType, Paragraph, Pic, Run,
    SpecialIndentType, Start, Table, TableCell, TableRow,
};
use std::io::Cursor;

use super::models::{PageOrientation, PageSettings};
use crate::error::{Error, Result};

/// Number of levels declared on the shared bullet definition
pub const BULLET_LEVELS: usize = 9;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSpec {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub half_points: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(RunSpec),
    Link { url: String, run: RunSpec },
    Image(Vec<u8>),
}

/// A bound numbering definition and level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingBinding {
    pub id: usize,
    pub level: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphSpec {
    pub style: Option<String>,
    pub numbering: Option<NumberingBinding>,
    pub content: Vec<Inline>,
}

/// Bullet definition parameters (twips)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletStyle {
    pub glyph: String,
    pub left_indent: i32,
    pub hanging_indent: i32,
}

/// Write capability over a document under construction
pub trait DocumentSink {
    fn set_page_settings(&mut self, settings: &PageSettings);

    /// Register a bullet definition and return its numbering id
    fn add_bullet_numbering(&mut self, style: &BulletStyle) -> usize;

    fn add_paragraph(&mut self, paragraph: ParagraphSpec) -> Result<()>;

    /// Append a table; each row is a list of cells, one paragraph per cell
    fn add_table(&mut self, rows: Vec<Vec<ParagraphSpec>>) -> Result<()>;

    /// Serialize the finished document
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// [`DocumentSink`] backed by docx-rs
pub struct DocxSink {
    docx: Docx,
    next_numbering_id: usize,
}

impl Default for DocxSink {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxSink {
    pub fn new() -> Self {
        Self {
            docx: Docx::new(),
            next_numbering_id: 1,
        }
    }

    fn update(&mut self, f: impl FnOnce(Docx) -> Docx) {
        let docx = std::mem::take(&mut self.docx);
        self.docx = f(docx);
    }

    fn run(spec: &RunSpec) -> Run {
        let mut run = Run::new().add_text(&spec.text);
        if spec.bold {
            run = run.bold();
        }
        if spec.italic {
            run = run.italic();
        }
        if let Some(size) = spec.half_points {
            run = run.size(size);
        }
        run
    }

    fn paragraph(spec: ParagraphSpec) -> Result<Paragraph> {
        let mut paragraph = Paragraph::new();
        if let Some(style) = spec.style.as_deref().filter(|s| !s.is_empty()) {
            paragraph = paragraph.style(style);
        }
        if let Some(binding) = spec.numbering {
            paragraph = paragraph.numbering(
                NumberingId::new(binding.id),
                IndentLevel::new(binding.level),
            );
        }

        for inline in spec.content {
            paragraph = match inline {
                Inline::Text(run) => paragraph.add_run(Self::run(&run)),
                Inline::Link { url, run } => paragraph.add_hyperlink(
                    Hyperlink::new(&url, HyperlinkType::External).add_run(Self::run(&run)),
                ),
                Inline::Image(data) => paragraph.add_run(Run::new().add_image(picture(&data)?)),
            };
        }

        Ok(paragraph)
    }
}

/// Decode image bytes and re-encode them as PNG for embedding
///
/// Undecodable data is a build failure rather than a panic inside docx-rs.
fn picture(data: &[u8]) -> Result<Pic> {
    let decoded = image::load_from_memory(data)
        .map_err(|e| Error::Build(format!("image data cannot be decoded: {e}")))?;
    let (width, height) = (decoded.width(), decoded.height());

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| Error::Build(format!("image cannot be attached: {e}")))?;

    Ok(Pic::new_with_dimensions(png, width, height))
}

fn bullet_level(level: usize, style: &BulletStyle) -> Level {
    Level::new(
        level,
        Start::new(1),
        NumberFormat::new("bullet"),
        LevelText::new(&style.glyph),
        LevelJc::new("left"),
    )
    .indent(
        Some(style.left_indent * (level as i32 + 1)),
        Some(SpecialIndentType::Hanging(style.hanging_indent)),
        None,
        None,
    )
}

impl DocumentSink for DocxSink {
    fn set_page_settings(&mut self, settings: &PageSettings) {
        let settings = settings.clone();
        self.update(|mut docx| {
            if let (Some(width), Some(height)) = (settings.width, settings.height) {
                docx = docx.page_size(width, height);
            }
            if let Some(orientation) = settings.orientation {
                docx = docx.page_orient(match orientation {
                    PageOrientation::Portrait => PageOrientationType::Portrait,
                    PageOrientation::Landscape => PageOrientationType::Landscape,
                });
            }
            if let Some(m) = settings.margins {
                docx = docx.page_margin(
                    PageMargin::new()
                        .top(m.top)
                        .right(m.right)
                        .bottom(m.bottom)
                        .left(m.left)
                        .header(m.header)
                        .footer(m.footer)
                        .gutter(m.gutter),
                );
            }
            docx
        });
    }

    fn add_bullet_numbering(&mut self, style: &BulletStyle) -> usize {
        let id = self.next_numbering_id;
        self.next_numbering_id += 1;

        let mut abstract_numbering = AbstractNumbering::new(id);
        for level in 0..BULLET_LEVELS {
            abstract_numbering = abstract_numbering.add_level(bullet_level(level, style));
        }

        self.update(|docx| {
            docx.add_abstract_numbering(abstract_numbering)
                .add_numbering(Numbering::new(id, id))
        });
        id
    }

    fn add_paragraph(&mut self, paragraph: ParagraphSpec) -> Result<()> {
        let paragraph = Self::paragraph(paragraph)?;
        self.update(|docx| docx.add_paragraph(paragraph));
        Ok(())
    }

    fn add_table(&mut self, rows: Vec<Vec<ParagraphSpec>>) -> Result<()> {
        let mut table_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                cells.push(TableCell::new().add_paragraph(Self::paragraph(cell)?));
            }
            table_rows.push(TableRow::new(cells));
        }

        let table = Table::new(table_rows);
        self.update(|docx| docx.add_table(table));
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.docx
            .build()
            .pack(&mut Cursor::new(&mut buffer))
            .map_err(|e| Error::Build(format!("failed to pack document: {e}")))?;
        Ok(buffer)
    }
}
