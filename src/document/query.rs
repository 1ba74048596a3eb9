//! Tree inspection operations
//!
//! This module provides read-only views over an extracted tree: plain text,
//! a section outline and the hyperlinks attached to runs.

use super::models::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub title: String,
    pub section_index: usize,
    pub block_count: usize,
}

/// Render the tree as plain text, one line per paragraph, list item or table row
pub fn plain_text(tree: &DocumentTemplate) -> String {
    let mut lines = Vec::new();

    for section in &tree.sections {
        if let Some(title) = &section.title {
            lines.push(title.plain_text());
        }
        for block in &section.body {
            match block {
                Block::Paragraph { .. } => lines.push(block.plain_text()),
                Block::BlankLine => lines.push(String::new()),
                Block::List { indent, items } => {
                    let prefix = "  ".repeat(*indent);
                    for item in items {
                        let text: String = item.iter().map(|run| run.text.as_str()).collect();
                        lines.push(format!("{prefix}* {text}"));
                    }
                }
                Block::Table { rows, .. } => {
                    for row in rows {
                        let cells: Vec<String> = row.iter().map(Block::plain_text).collect();
                        lines.push(cells.join("\t"));
                    }
                }
                Block::Image { image } => lines.push(format!("[image: {}]", image.name)),
            }
        }
    }

    lines.join("\n")
}

pub fn outline(tree: &DocumentTemplate) -> Vec<OutlineItem> {
    tree.sections
        .iter()
        .enumerate()
        .map(|(section_index, section)| OutlineItem {
            title: section
                .title_text()
                .unwrap_or_else(|| "(untitled)".to_string()),
            section_index,
            block_count: section.body.len(),
        })
        .collect()
}

/// Every (run text, target) pair in reading order
pub fn hyperlinks(tree: &DocumentTemplate) -> Vec<(String, String)> {
    tree.runs()
        .filter_map(|run| {
            run.hyperlink_target()
                .map(|url| (run.text.clone(), url.to_string()))
        })
        .collect()
}
