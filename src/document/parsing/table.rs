//! Table extraction and processing
//!
//! Tables are read as rows of cells of paragraphs and flattened into table
//! blocks: each cell paragraph becomes one paragraph block in its row.

use super::super::models::{Block, TableRow};
use super::super::source::{SourceParagraph, SourceTable};
use super::formatting::source_paragraph;
use super::runs::build_runs;

/// Read a docx-rs table as rows → cells → paragraphs
pub(crate) fn source_table(table: &docx_rs::Table) -> SourceTable {
    let mut rows = Vec::new();

    for table_child in &table.rows {
        let docx_rs::TableChild::TableRow(row) = table_child;
        let mut cells = Vec::new();

        for row_child in &row.cells {
            let docx_rs::TableRowChild::TableCell(cell) = row_child;
            let paragraphs: Vec<SourceParagraph> = cell
                .children
                .iter()
                .filter_map(|content| match content {
                    docx_rs::TableCellContent::Paragraph(para) => Some(source_paragraph(para)),
                    // Nested tables and other content are not mapped
                    _ => None,
                })
                .collect();
            cells.push(paragraphs);
        }

        rows.push(cells);
    }

    SourceTable { rows }
}

/// Flatten a table into a table block; cell paragraphs never carry hyperlinks
pub(crate) fn table_block(table: &SourceTable) -> Block {
    let rows: Vec<TableRow> = table
        .rows
        .iter()
        .map(|cells| {
            cells
                .iter()
                .flatten()
                .map(|para| Block::paragraph(para.style.clone(), build_runs(para, &[])))
                .collect()
        })
        .collect();

    Block::table(rows)
}
