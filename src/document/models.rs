//! Core data structures for the intermediate document tree
//!
//! This module defines the tree handed between extraction, external
//! rewriting and reconstruction: sections of blocks of styled runs, plus the
//! page geometry carried through untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hyperlinks found in one paragraph, keyed by zero-based body paragraph index
pub type HyperlinkMap = HashMap<usize, Vec<HyperlinkRecord>>;

/// One table row: a paragraph block per cell paragraph
pub type TableRow = Vec<Block>;

/// One list entry
pub type ListItem = Vec<Run>;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Word,
}

/// Root of the intermediate tree
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTemplate {
    #[serde(rename = "type", default)]
    pub kind: DocumentKind,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_settings: Option<PageSettings>,
}

impl DocumentTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of body blocks across all sections
    pub fn block_count(&self) -> usize {
        self.sections.iter().map(|s| s.body.len()).sum()
    }

    /// Iterate every run in reading order, including titles, list items and table cells
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.sections.iter().flat_map(|section| {
            section
                .title
                .iter()
                .chain(section.body.iter())
                .flat_map(Block::all_runs)
        })
    }
}

/// A heading-delimited region of the document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Block>,
    #[serde(default)]
    pub body: Vec<Block>,
}

impl Section {
    pub fn untitled() -> Self {
        Self::default()
    }

    pub fn titled(title: Block) -> Self {
        Self {
            title: Some(title),
            body: Vec::new(),
        }
    }

    /// Plain text of the title paragraph, if any
    pub fn title_text(&self) -> Option<String> {
        self.title.as_ref().map(Block::plain_text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        style: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        runs: Vec<Run>,
    },
    List {
        #[serde(default, skip_serializing_if = "is_zero")]
        indent: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        items: Vec<ListItem>,
    },
    Table {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        rows: Vec<TableRow>,
        /// Widest row, informational only
        #[serde(default, skip_serializing_if = "is_zero")]
        column: usize,
    },
    Image {
        image: ImageBlock,
    },
    BlankLine,
}

impl Block {
    pub fn paragraph(style: impl Into<String>, runs: Vec<Run>) -> Self {
        Block::Paragraph {
            style: style.into(),
            runs,
        }
    }

    pub fn list(indent: usize) -> Self {
        Block::List {
            indent,
            items: Vec::new(),
        }
    }

    /// Build a table block, computing the informational column count
    pub fn table(rows: Vec<TableRow>) -> Self {
        let column = rows.iter().map(Vec::len).max().unwrap_or(0);
        Block::Table { rows, column }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::List { .. } => "list",
            Block::Table { .. } => "table",
            Block::Image { .. } => "image",
            Block::BlankLine => "blank_line",
        }
    }

    /// Every run held by this block, nested table cells included
    pub fn all_runs(&self) -> Box<dyn Iterator<Item = &Run> + '_> {
        match self {
            Block::Paragraph { runs, .. } => Box::new(runs.iter()),
            Block::List { items, .. } => Box::new(items.iter().flatten()),
            Block::Table { rows, .. } => {
                Box::new(rows.iter().flatten().flat_map(|cell| cell.all_runs()))
            }
            Block::Image { .. } | Block::BlankLine => Box::new(std::iter::empty()),
        }
    }

    /// Concatenated run text; list items and table cells are not separated
    pub fn plain_text(&self) -> String {
        self.all_runs().map(|run| run.text.as_str()).collect()
    }
}

/// Smallest styled text unit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    /// Whole points; 0 means inherit
    #[serde(default, skip_serializing_if = "is_zero")]
    pub font_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn size(mut self, points: usize) -> Self {
        self.font_size = points;
        self
    }

    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.hyperlink = Some(url.into());
        self
    }

    /// Hyperlink target, treating an empty string as no link
    pub fn hyperlink_target(&self) -> Option<&str> {
        self.hyperlink.as_deref().filter(|url| !url.is_empty())
    }

    /// Convert the engine's half-point size to whole points (odd values round down)
    pub fn points_from_half_points(half_points: Option<usize>) -> usize {
        half_points.map(|hp| hp / 2).unwrap_or(0)
    }

    /// Half-point size to hand back to the engine, `None` when unset
    pub fn half_points(&self) -> Option<usize> {
        (self.font_size > 0).then(|| self.font_size * 2)
    }
}

/// Embedded image payload; the tree owns its own copy of the bytes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageBlock {
    pub name: String,
    #[serde(with = "base64_bytes", default)]
    pub data: Vec<u8>,
}

impl ImageBlock {
    /// Sequential name used for the n-th extracted image (1-based)
    pub fn sequential_name(n: usize) -> String {
        format!("image_{n}.png")
    }
}

/// A hyperlink found in the package XML, consumed while building runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlinkRecord {
    pub url: String,
    pub anchor_text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

/// Page geometry in twips, copied between documents without interpretation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<PageOrientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margins: Option<PageMargins>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
    #[serde(default)]
    pub header: i32,
    #[serde(default)]
    pub footer: i32,
    #[serde(default)]
    pub gutter: i32,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.trim())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_half_point_conversion() {
        let run = Run::new("x").size(11);
        assert_eq!(run.half_points(), Some(22));
        assert_eq!(Run::points_from_half_points(Some(22)), 11);
        // Odd half-points collapse to the lower whole point
        assert_eq!(Run::points_from_half_points(Some(23)), 11);
        assert_eq!(Run::points_from_half_points(None), 0);
        assert_eq!(Run::new("x").half_points(), None);
    }

    #[test]
    fn test_run_omits_default_fields() {
        let json = serde_json::to_string(&Run::new("plain")).unwrap();
        assert_eq!(json, r#"{"text":"plain"}"#);

        let run = Run::new("b").bold().size(12).link("https://x.test");
        let json = serde_json::to_string(&run).unwrap();
        assert_eq!(
            json,
            r#"{"text":"b","bold":true,"fontSize":12,"hyperlink":"https://x.test"}"#
        );
    }

    #[test]
    fn test_block_kind_tags() {
        let json = serde_json::to_value(Block::BlankLine).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "blank_line" }));

        let json = serde_json::to_value(Block::list(0)).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "list" }));

        let block: Block = serde_json::from_str(r#"{"kind":"list","indent":2}"#).unwrap();
        assert_eq!(
            block,
            Block::List {
                indent: 2,
                items: Vec::new()
            }
        );
    }

    #[test]
    fn test_absent_fields_read_as_zero_values() {
        let block: Block = serde_json::from_str(r#"{"kind":"paragraph"}"#).unwrap();
        assert_eq!(block, Block::paragraph("", Vec::new()));

        let tree: DocumentTemplate = serde_json::from_str(r#"{"type":"word"}"#).unwrap();
        assert!(tree.sections.is_empty());
        assert!(tree.page_settings.is_none());
    }

    #[test]
    fn test_image_data_is_base64_in_text_form() {
        let block = Block::Image {
            image: ImageBlock {
                name: ImageBlock::sequential_name(1),
                data: vec![0x89, b'P', b'N', b'G'],
            },
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["image"]["name"], "image_1.png");
        assert_eq!(json["image"]["data"], "iVBORw==");

        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn test_table_column_count() {
        let table = Block::table(vec![
            vec![Block::paragraph("", vec![Run::new("a")])],
            vec![
                Block::paragraph("", vec![Run::new("b")]),
                Block::paragraph("", vec![Run::new("c")]),
            ],
        ]);
        assert!(matches!(table, Block::Table { column: 2, .. }));
        assert_eq!(table.plain_text(), "abc");
    }

    #[test]
    fn test_empty_hyperlink_is_no_link() {
        let run = Run::new("x").link("");
        assert_eq!(run.hyperlink_target(), None);
    }
}
