//! Run construction and hyperlink attachment
//!
//! docx-rs does not link a run to its resolved hyperlink target, so targets
//! found in the package are attached by anchor text: a run takes the URL of the
//! first hyperlink in its paragraph whose anchor text contains the run's text.
//! Runs with identical or overlapping text in one paragraph can therefore pick
//! up the wrong link; position is not used to disambiguate.

use super::super::models::{HyperlinkRecord, Run};
use super::super::source::{SourceParagraph, SourceRun};

/// Build tree runs for a paragraph, attaching hyperlinks from `links`
pub(crate) fn build_runs(para: &SourceParagraph, links: &[HyperlinkRecord]) -> Vec<Run> {
    para.runs.iter().map(|run| build_run(run, links)).collect()
}

fn build_run(source: &SourceRun, links: &[HyperlinkRecord]) -> Run {
    Run {
        text: source.text.clone(),
        bold: source.bold,
        italic: source.italic,
        font_size: Run::points_from_half_points(source.half_points),
        hyperlink: match_hyperlink(&source.text, links).map(str::to_string),
    }
}

/// First record whose anchor text contains `text`; empty text never matches
pub(crate) fn match_hyperlink<'a>(text: &str, links: &'a [HyperlinkRecord]) -> Option<&'a str> {
    if text.is_empty() {
        return None;
    }
    links
        .iter()
        .find(|link| link.anchor_text.contains(text))
        .map(|link| link.url.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str, anchor: &str) -> HyperlinkRecord {
        HyperlinkRecord {
            url: url.to_string(),
            anchor_text: anchor.to_string(),
        }
    }

    fn source_run(text: &str) -> SourceRun {
        SourceRun {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_matching_anchor_wins() {
        let links = [link("https://a.test", "click here"), link("https://b.test", "here")];
        assert_eq!(match_hyperlink("here", &links), Some("https://a.test"));
        assert_eq!(match_hyperlink("click", &links), Some("https://a.test"));
        assert_eq!(match_hyperlink("elsewhere", &links), None);
        assert_eq!(match_hyperlink("", &links), None);
    }

    #[test]
    fn test_build_runs_attaches_links_deterministically() {
        let para = SourceParagraph {
            style: String::new(),
            numbering: None,
            runs: vec![source_run("Visit "), source_run("our site"), source_run("")],
        };
        let links = [link("https://example.com", "our site")];

        for _ in 0..3 {
            let runs = build_runs(&para, &links);
            assert_eq!(runs.len(), 3);
            assert_eq!(runs[0].hyperlink, None);
            assert_eq!(runs[1].hyperlink.as_deref(), Some("https://example.com"));
            assert_eq!(runs[2].hyperlink, None);
        }
    }

    #[test]
    fn test_run_size_converted_to_points() {
        let para = SourceParagraph {
            runs: vec![
                SourceRun {
                    half_points: Some(23),
                    bold: true,
                    ..source_run("odd")
                },
                source_run("inherit"),
            ],
            ..Default::default()
        };
        let runs = build_runs(&para, &[]);
        assert_eq!(runs[0].font_size, 11);
        assert!(runs[0].bold);
        assert_eq!(runs[1].font_size, 0);
    }
}
