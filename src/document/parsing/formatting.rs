//! Text extraction and formatting utilities
//!
//! This module converts docx-rs paragraphs and runs into the engine-neutral
//! read models: run text, bold/italic, size and numbering membership.

use std::fmt::Debug;

use super::super::source::{NumberingRef, SourceParagraph, SourceRun};

/// Convert a docx-rs paragraph into its read model
pub(crate) fn source_paragraph(para: &docx_rs::Paragraph) -> SourceParagraph {
    SourceParagraph {
        style: paragraph_style(para),
        numbering: para
            .property
            .numbering_property
            .as_ref()
            .map(extract_numbering_info),
        runs: collect_runs(&para.children)
            .into_iter()
            .map(source_run)
            .collect(),
    }
}

/// Style id of a paragraph, empty when none is set
pub(crate) fn paragraph_style(para: &docx_rs::Paragraph) -> String {
    para.property
        .style
        .as_ref()
        .map(|style| style.val.clone())
        .unwrap_or_default()
}

/// Runs of a paragraph in order, including runs nested in hyperlinks and
/// tracked insertions; tracked deletions are skipped
pub(crate) fn collect_runs(children: &[docx_rs::ParagraphChild]) -> Vec<&docx_rs::Run> {
    let mut runs = Vec::new();

    for child in children {
        match child {
            docx_rs::ParagraphChild::Run(run) => runs.push(run.as_ref()),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                runs.extend(collect_runs(&link.children));
            }
            docx_rs::ParagraphChild::Insert(insert) => {
                for child in &insert.children {
                    if let docx_rs::InsertChild::Run(run) = child {
                        runs.push(run.as_ref());
                    }
                }
            }
            docx_rs::ParagraphChild::Delete(_) => {
                // Skip deletions (track changes)
            }
            _ => {}
        }
    }

    runs
}

pub(crate) fn source_run(run: &docx_rs::Run) -> SourceRun {
    let props = &run.run_property;
    SourceRun {
        text: extract_run_text(run),
        bold: toggle_is_on(props.bold.as_ref()),
        italic: toggle_is_on(props.italic.as_ref()),
        half_points: props
            .sz
            .as_ref()
            .and_then(|sz| debug_field(sz, "val"))
            .and_then(|val| val.parse().ok()),
    }
}

/// Extract text from a run
pub(crate) fn extract_run_text(run: &docx_rs::Run) -> String {
    let mut text = String::new();

    for child in &run.children {
        match child {
            docx_rs::RunChild::Text(text_elem) => {
                text.push_str(&text_elem.text);
            }
            docx_rs::RunChild::Tab(_) => {
                text.push('\t');
            }
            docx_rs::RunChild::Break(_) => {
                text.push('\n');
            }
            _ => {}
        }
    }

    text
}

/// Extract numbering information from docx-rs numbering properties
///
/// A missing id maps to 0 and a missing level to 0.
pub(crate) fn extract_numbering_info(num_pr: &docx_rs::NumberingProperty) -> NumberingRef {
    NumberingRef {
        num_id: num_pr.id.as_ref().map(|id| id.id).unwrap_or(0),
        level: num_pr.level.as_ref().map(|l| l.val).unwrap_or(0),
    }
}

/// `<w:b/>` is on; `<w:b w:val="false"/>` is off
fn toggle_is_on<T: Debug>(toggle: Option<&T>) -> bool {
    match toggle {
        Some(value) => debug_field(value, "val").as_deref() != Some("false"),
        None => false,
    }
}

/// Read a private field through the element's debug output
///
/// docx-rs keeps several property values private; the derived `Debug`
/// output is the stable way to get at them.
fn debug_field<T: Debug>(value: &T, field: &str) -> Option<String> {
    let debug = format!("{value:?}");
    let marker = format!("{field}: ");
    let start = debug.find(&marker)? + marker.len();
    let rest = &debug[start..];
    let end = rest
        .find(|c: char| c == ',' || c == ' ' || c == '}')
        .unwrap_or(rest.len());
    let raw = rest[..end].trim_matches('"');
    (!raw.is_empty()).then(|| raw.to_string())
}
