//! Direct access to the .docx package archive
//!
//! docx-rs exposes paragraph and run content but not the resolved target of a
//! hyperlink, nor raw media in relationship order. This module reads the main
//! document part and its relationship part straight from the ZIP archive and
//! cross-references them.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::models::{HyperlinkMap, HyperlinkRecord, PageMargins, PageOrientation, PageSettings};
use crate::error::{Error, Result};

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";
pub(crate) const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";

const EMPTY_RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

/// One entry of the relationship part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    pub fn is_hyperlink(&self) -> bool {
        self.rel_type.to_lowercase().contains("hyperlink")
    }

    pub fn is_image(&self) -> bool {
        !self.external && self.rel_type.to_lowercase().ends_with("/image")
    }

    /// Archive entry name for an internal target relative to `word/`
    pub fn part_name(&self) -> String {
        if let Some(absolute) = self.target.strip_prefix('/') {
            absolute.to_string()
        } else if let Some(parent) = self.target.strip_prefix("../") {
            parent.to_string()
        } else {
            format!("word/{}", self.target)
        }
    }
}

/// The two XML parts the hyperlink resolver needs
#[derive(Debug, Default)]
pub(crate) struct PackageParts {
    pub(crate) document_xml: Option<String>,
    pub(crate) relationships_xml: Option<String>,
}

/// Page geometry and embedded media read from the package
#[derive(Debug, Default)]
pub(crate) struct PackageMedia {
    pub(crate) page_settings: Option<PageSettings>,
    pub(crate) images: Vec<Option<Vec<u8>>>,
}

fn open_archive<R: Read + Seek>(reader: R) -> Result<ZipArchive<R>> {
    ZipArchive::new(reader)
        .map_err(|e| Error::Relationships(format!("not a readable package: {e}")))
}

/// Read an entry as UTF-8; absent or unreadable entries yield `None`
fn read_entry_string<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Option<String> {
    let mut entry = archive.by_name(name).ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).ok()?;
    Some(content).filter(|c| !c.is_empty())
}

fn read_entry_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Option<Vec<u8>> {
    let mut entry = archive.by_name(name).ok()?;
    let mut content = Vec::new();
    entry.read_to_end(&mut content).ok()?;
    Some(content)
}

/// Read the main document part and its relationships, releasing the archive on return
pub(crate) fn read_parts<R: Read + Seek>(reader: R) -> Result<PackageParts> {
    let mut archive = open_archive(reader)?;
    Ok(PackageParts {
        document_xml: read_entry_string(&mut archive, DOCUMENT_PART),
        relationships_xml: read_entry_string(&mut archive, RELATIONSHIPS_PART),
    })
}

/// Resolve hyperlink targets per body paragraph of the document at `path`
///
/// Missing parts are not an error: the result is simply empty.
pub fn resolve_hyperlinks(path: &Path) -> Result<HyperlinkMap> {
    let file = File::open(path).map_err(|e| Error::Relationships(e.to_string()))?;
    resolve_hyperlinks_from(file)
}

/// Same as [`resolve_hyperlinks`], over any seekable package reader
pub fn resolve_hyperlinks_from<R: Read + Seek>(reader: R) -> Result<HyperlinkMap> {
    let parts = read_parts(reader)?;

    let (Some(document_xml), Some(relationships_xml)) =
        (parts.document_xml, parts.relationships_xml)
    else {
        return Ok(HyperlinkMap::new());
    };

    let relationships = parse_relationships(&relationships_xml)?;
    parse_hyperlinks(&document_xml, &hyperlink_targets(&relationships))
}

/// Relationship id → target, hyperlink relationships only
pub fn hyperlink_targets(relationships: &[Relationship]) -> HashMap<String, String> {
    relationships
        .iter()
        .filter(|rel| rel.is_hyperlink())
        .map(|rel| (rel.id.clone(), rel.target.clone()))
        .collect()
}

fn attribute(element: &BytesStart, local_name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::Relationships(e.to_string()))?;
        if attr.key.local_name().as_ref() == local_name {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Relationships(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Parse the relationship part, in declaration order
pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut relationships = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"Relationships" => saw_root = true,
                b"Relationship" => {
                    let id = attribute(e, b"Id")?.unwrap_or_default();
                    let rel_type = attribute(e, b"Type")?.unwrap_or_default();
                    let target = attribute(e, b"Target")?.unwrap_or_default();
                    let external = attribute(e, b"TargetMode")?
                        .is_some_and(|mode| mode.eq_ignore_ascii_case("external"));
                    relationships.push(Relationship {
                        id,
                        rel_type,
                        target,
                        external,
                    });
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Relationships(format!(
                    "malformed relationship part at {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(Error::Relationships(
            "relationship part has no Relationships element".to_string(),
        ));
    }

    Ok(relationships)
}

/// A hyperlink element being collected inside a body paragraph
struct OpenLink {
    depth: usize,
    rid: String,
    anchor: String,
}

/// Collect hyperlinks per body-level paragraph of the main document part
///
/// Only direct `w:hyperlink` children of a body paragraph count, and the anchor
/// text is the `w:t` content of the runs directly inside the hyperlink.
/// Paragraphs inside tables are not body paragraphs and are not indexed.
pub fn parse_hyperlinks(xml: &str, targets: &HashMap<String, String>) -> Result<HyperlinkMap> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut links = HyperlinkMap::new();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut buf = Vec::new();

    let mut next_index = 0;
    // (paragraph index, depth of the paragraph element)
    let mut paragraph: Option<(usize, usize)> = None;
    let mut paragraph_links: Vec<HyperlinkRecord> = Vec::new();
    let mut open_link: Option<OpenLink> = None;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name().as_ref().to_vec();
                let depth = stack.len();
                let parent = stack.last().map(Vec::as_slice);

                match name.as_slice() {
                    b"p" if parent == Some(b"body".as_slice()) => {
                        paragraph = Some((next_index, depth));
                        next_index += 1;
                        paragraph_links.clear();
                    }
                    b"hyperlink" => {
                        if let Some((_, p_depth)) = paragraph {
                            if depth == p_depth + 1 && open_link.is_none() {
                                open_link = Some(OpenLink {
                                    depth,
                                    rid: attribute(e, b"id")?.unwrap_or_default(),
                                    anchor: String::new(),
                                });
                            }
                        }
                    }
                    b"t" => {
                        in_text = open_link.as_ref().is_some_and(|link| {
                            depth == link.depth + 2 && parent == Some(b"r".as_slice())
                        });
                    }
                    _ => {}
                }

                stack.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                if e.local_name().as_ref() == b"p"
                    && stack.last().map(Vec::as_slice) == Some(b"body".as_slice())
                {
                    // Self-closed paragraph: indexed, never holds links
                    next_index += 1;
                }
            }
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::Relationships(err.to_string()))?;
                if let Some(link) = open_link.as_mut() {
                    link.anchor.push_str(&text);
                }
            }
            Ok(Event::End(_)) => {
                let name = stack.pop().unwrap_or_default();
                let depth = stack.len();

                match name.as_slice() {
                    b"t" => in_text = false,
                    b"hyperlink" if open_link.as_ref().is_some_and(|l| l.depth == depth) => {
                        if let Some(link) = open_link.take() {
                            let url = targets.get(&link.rid).cloned().unwrap_or_default();
                            if !url.is_empty() && !link.anchor.is_empty() {
                                paragraph_links.push(HyperlinkRecord {
                                    url,
                                    anchor_text: link.anchor,
                                });
                            }
                        }
                    }
                    b"p" if paragraph.is_some_and(|(_, p_depth)| p_depth == depth) => {
                        if let Some((index, _)) = paragraph.take() {
                            if !paragraph_links.is_empty() {
                                links.insert(index, std::mem::take(&mut paragraph_links));
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Relationships(format!(
                    "malformed document part at {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(links)
}

fn parse_attr<T: std::str::FromStr>(element: &BytesStart, local_name: &[u8]) -> Result<Option<T>> {
    Ok(attribute(element, local_name)?.and_then(|v| v.trim().parse().ok()))
}

/// Tracks the body-level `w:sectPr` while scanning the document part
#[derive(Default)]
struct SectionScan {
    stack: Vec<Vec<u8>>,
    in_section: bool,
    settings: Option<PageSettings>,
}

impl SectionScan {
    fn element(&mut self, e: &BytesStart, is_empty: bool) -> Result<()> {
        let name = e.local_name().as_ref().to_vec();
        match name.as_slice() {
            b"sectPr" if self.stack.last().map(Vec::as_slice) == Some(b"body".as_slice()) => {
                self.in_section = !is_empty;
                self.settings = Some(PageSettings::default());
            }
            b"pgSz" if self.in_section => {
                if let Some(settings) = self.settings.as_mut() {
                    settings.width = parse_attr(e, b"w")?;
                    settings.height = parse_attr(e, b"h")?;
                    settings.orientation = attribute(e, b"orient")?.and_then(|o| match o.as_str() {
                        "landscape" => Some(PageOrientation::Landscape),
                        "portrait" => Some(PageOrientation::Portrait),
                        _ => None,
                    });
                }
            }
            b"pgMar" if self.in_section => {
                if let Some(settings) = self.settings.as_mut() {
                    settings.margins = Some(PageMargins {
                        top: parse_attr(e, b"top")?.unwrap_or_default(),
                        right: parse_attr(e, b"right")?.unwrap_or_default(),
                        bottom: parse_attr(e, b"bottom")?.unwrap_or_default(),
                        left: parse_attr(e, b"left")?.unwrap_or_default(),
                        header: parse_attr(e, b"header")?.unwrap_or_default(),
                        footer: parse_attr(e, b"footer")?.unwrap_or_default(),
                        gutter: parse_attr(e, b"gutter")?.unwrap_or_default(),
                    });
                }
            }
            _ => {}
        }
        if !is_empty {
            self.stack.push(name);
        }
        Ok(())
    }

    fn end(&mut self) {
        if self.stack.pop().as_deref() == Some(b"sectPr".as_slice()) {
            self.in_section = false;
        }
    }
}

/// Read the body-level section properties (page size, orientation, margins)
pub fn parse_page_settings(xml: &str) -> Result<Option<PageSettings>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut scan = SectionScan::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => scan.element(e, false)?,
            Ok(Event::Empty(ref e)) => scan.element(e, true)?,
            Ok(Event::End(_)) => scan.end(),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Relationships(format!(
                    "malformed document part at {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    Ok(scan.settings)
}

/// Read page geometry and image payloads in relationship order
///
/// Failures here are never fatal: unreadable parts leave the geometry unset and
/// unreadable media entries become `None`.
pub(crate) fn read_media<R: Read + Seek>(reader: R) -> Result<PackageMedia> {
    let mut archive = open_archive(reader)?;
    let mut media = PackageMedia::default();

    if let Some(document_xml) = read_entry_string(&mut archive, DOCUMENT_PART) {
        match parse_page_settings(&document_xml) {
            Ok(settings) => media.page_settings = settings,
            Err(e) => log::debug!("Page settings unavailable: {e}"),
        }
    }

    let relationships = match read_entry_string(&mut archive, RELATIONSHIPS_PART) {
        Some(xml) => parse_relationships(&xml).unwrap_or_else(|e| {
            log::debug!("Media relationships unavailable: {e}");
            Vec::new()
        }),
        None => Vec::new(),
    };

    for rel in relationships.iter().filter(|rel| rel.is_image()) {
        let data = read_entry_bytes(&mut archive, &rel.part_name());
        if data.is_none() {
            log::debug!("Image {} ({}) has no readable data", rel.id, rel.target);
        }
        media.images.push(data);
    }

    Ok(media)
}

/// Copy the package with an empty relationship part in place of a missing or
/// unparseable one
///
/// Returns `None` when the existing part parses, since the package is then
/// unreadable for some other reason.
pub(crate) fn with_empty_relationships(data: &[u8]) -> Result<Option<Vec<u8>>> {
    let mut archive = open_archive(Cursor::new(data))?;
    if let Some(xml) = read_entry_string(&mut archive, RELATIONSHIPS_PART) {
        if parse_relationships(&xml).is_ok() {
            return Ok(None);
        }
    }

    let zip_error = |e: ZipError| Error::Relationships(e.to_string());
    let options = SimpleFileOptions::default();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        let name = entry.name().to_string();
        if name == RELATIONSHIPS_PART {
            continue;
        }
        if entry.is_dir() {
            writer.add_directory(name, options).map_err(zip_error)?;
            continue;
        }

        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        writer.start_file(name, options).map_err(zip_error)?;
        writer.write_all(&content)?;
    }

    writer
        .start_file(RELATIONSHIPS_PART, options)
        .map_err(zip_error)?;
    writer.write_all(EMPTY_RELATIONSHIPS.as_bytes())?;

    let package = writer.finish().map_err(zip_error)?;
    Ok(Some(package.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a?x=1&amp;y=2" TargetMode="External"/>
  <Relationship Id="rId6" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/HYPERLINK" Target="https://example.org" TargetMode="External"/>
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:body>
    <w:p><w:r><w:t>No links here</w:t></w:r></w:p>
    <w:p/>
    <w:p>
      <w:r><w:t xml:space="preserve">See </w:t></w:r>
      <w:hyperlink r:id="rId5"><w:r><w:t>the </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>site</w:t></w:r></w:hyperlink>
      <w:hyperlink r:id="rId6"><w:r><w:t>other</w:t></w:r></w:hyperlink>
    </w:p>
    <w:tbl><w:tr><w:tc>
      <w:p><w:hyperlink r:id="rId5"><w:r><w:t>in table</w:t></w:r></w:hyperlink></w:p>
    </w:tc></w:tr></w:tbl>
    <w:p>
      <w:hyperlink r:id="rId1"><w:r><w:t>styles are not links</w:t></w:r></w:hyperlink>
      <w:hyperlink r:id="rId5"></w:hyperlink>
      <w:hyperlink w:anchor="_Toc1"><w:r><w:t>internal</w:t></w:r></w:hyperlink>
    </w:p>
    <w:p><w:hyperlink r:id="rId6"><w:r><w:t>fish &amp; chips</w:t></w:r></w:hyperlink></w:p>
    <w:sectPr>
      <w:pgSz w:w="16838" w:h="11906" w:orient="landscape"/>
      <w:pgMar w:top="1440" w:right="1080" w:bottom="1440" w:left="1080" w:header="708" w:footer="708" w:gutter="0"/>
    </w:sectPr>
  </w:body>
</w:document>"#;

    #[test]
    fn test_parse_relationships_in_order() {
        let rels = parse_relationships(RELS).unwrap();
        assert_eq!(rels.len(), 4);
        assert_eq!(rels[1].target, "https://example.com/a?x=1&y=2");
        assert!(rels[1].external);
        assert!(rels[3].is_image());
        assert_eq!(rels[3].part_name(), "word/media/image1.png");
    }

    #[test]
    fn test_hyperlink_targets_match_type_case_insensitively() {
        let targets = hyperlink_targets(&parse_relationships(RELS).unwrap());
        assert_eq!(targets.len(), 2);
        assert_eq!(targets["rId6"], "https://example.org");
        assert!(!targets.contains_key("rId1"));
    }

    #[test]
    fn test_parse_hyperlinks_by_body_paragraph_index() {
        let targets = hyperlink_targets(&parse_relationships(RELS).unwrap());
        let links = parse_hyperlinks(DOC, &targets).unwrap();

        // Paragraph 0 and the self-closed paragraph 1 have no links; the table
        // paragraph is not a body paragraph; paragraph 3 has no resolvable link.
        assert_eq!(links.len(), 2);
        assert_eq!(
            links[&2],
            vec![
                HyperlinkRecord {
                    url: "https://example.com/a?x=1&y=2".to_string(),
                    anchor_text: "the site".to_string(),
                },
                HyperlinkRecord {
                    url: "https://example.org".to_string(),
                    anchor_text: "other".to_string(),
                },
            ]
        );
        assert_eq!(links[&4][0].anchor_text, "fish & chips");
    }

    #[test]
    fn test_malformed_relationships_is_an_error() {
        assert!(matches!(
            parse_relationships("<Relationships><Relationship Id=\"a\"></Other></Relationships>"),
            Err(Error::Relationships(_))
        ));
        assert!(parse_relationships("<nothing/>").is_err());
    }

    #[test]
    fn test_parse_page_settings() {
        let settings = parse_page_settings(DOC).unwrap().unwrap();
        assert_eq!(settings.width, Some(16838));
        assert_eq!(settings.height, Some(11906));
        assert_eq!(settings.orientation, Some(PageOrientation::Landscape));
        let margins = settings.margins.unwrap();
        assert_eq!(margins.top, 1440);
        assert_eq!(margins.left, 1080);
        assert_eq!(margins.header, 708);
    }

    #[test]
    fn test_page_settings_absent() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p/></w:body></w:document>"#;
        assert_eq!(parse_page_settings(xml).unwrap(), None);
    }

    #[test]
    fn test_part_name_normalisation() {
        let rel = |target: &str| Relationship {
            id: "r".into(),
            rel_type: "image".into(),
            target: target.into(),
            external: false,
        };
        assert_eq!(rel("/word/media/a.png").part_name(), "word/media/a.png");
        assert_eq!(rel("../media/a.png").part_name(), "media/a.png");
    }

    fn package(relationships: Option<&str>) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(DOC.as_bytes()).unwrap();
        if let Some(xml) = relationships {
            writer.start_file(RELATIONSHIPS_PART, options).unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn relationships_of(data: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        read_entry_string(&mut archive, RELATIONSHIPS_PART).unwrap()
    }

    #[test]
    fn test_empty_relationships_replace_missing_part() {
        let patched = with_empty_relationships(&package(None)).unwrap().unwrap();
        assert!(parse_relationships(&relationships_of(&patched)).unwrap().is_empty());

        let mut archive = ZipArchive::new(Cursor::new(patched.as_slice())).unwrap();
        assert_eq!(read_entry_string(&mut archive, DOCUMENT_PART).as_deref(), Some(DOC));
    }

    #[test]
    fn test_empty_relationships_replace_broken_part() {
        let broken = r#"<Relationships><Relationship Id="x"></Other>"#;
        let patched = with_empty_relationships(&package(Some(broken))).unwrap().unwrap();
        assert!(parse_relationships(&relationships_of(&patched)).unwrap().is_empty());
    }

    #[test]
    fn test_usable_relationships_are_kept() {
        assert_eq!(with_empty_relationships(&package(Some(RELS))).unwrap(), None);
    }
}
