#![allow(dead_code)]

use docx_rs::{
    AbstractNumbering, Docx, Hyperlink, HyperlinkType, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, Pic, Run, Start, Table, TableCell, TableRow,
};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

/// Write a docx-rs document to `dir/name` and return the path
pub fn write_docx(dir: &Path, name: &str, docx: Docx) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    docx.build().pack(file).unwrap();
    path
}

pub fn text(s: &str) -> Run {
    Run::new().add_text(s)
}

pub fn heading(s: &str) -> Paragraph {
    Paragraph::new().style("Heading1").add_run(text(s))
}

pub fn bullet(s: &str, level: usize) -> Paragraph {
    Paragraph::new()
        .numbering(NumberingId::new(2), IndentLevel::new(level))
        .add_run(text(s))
}

pub fn with_bullets(docx: Docx) -> Docx {
    docx.add_abstract_numbering(AbstractNumbering::new(2).add_level(Level::new(
        0,
        Start::new(1),
        NumberFormat::new("bullet"),
        LevelText::new("•"),
        LevelJc::new("left"),
    )))
    .add_numbering(Numbering::new(2, 2))
}

pub fn link(url: &str, anchor: &str) -> Hyperlink {
    Hyperlink::new(url, HyperlinkType::External).add_run(text(anchor))
}

pub fn table(rows: &[&[&str]]) -> Table {
    Table::new(
        rows.iter()
            .map(|cells| {
                TableRow::new(
                    cells
                        .iter()
                        .map(|c| TableCell::new().add_paragraph(Paragraph::new().add_run(text(c))))
                        .collect(),
                )
            })
            .collect(),
    )
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn picture(width: u32, height: u32) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_image(Pic::new(&png(width, height))))
}

/// A zip that is not a document package: it has neither the main part nor relationships
pub fn write_bare_zip(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("notes.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"nothing here").unwrap();
    zip.finish().unwrap();
    path
}

/// Copy a package, replacing the main part's relationships (`None` drops the entry)
pub fn rewrite_relationships(source: &Path, target: &Path, relationships: Option<&str>) {
    const PART: &str = "word/_rels/document.xml.rels";
    let options = zip::write::SimpleFileOptions::default();

    let mut archive = zip::ZipArchive::new(std::fs::File::open(source).unwrap()).unwrap();
    let mut zip = zip::ZipWriter::new(std::fs::File::create(target).unwrap());
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let name = entry.name().to_string();
        if name == PART || entry.is_dir() {
            continue;
        }
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut entry, &mut content).unwrap();
        zip.start_file(name, options).unwrap();
        zip.write_all(&content).unwrap();
    }
    if let Some(xml) = relationships {
        zip.start_file(PART, options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
