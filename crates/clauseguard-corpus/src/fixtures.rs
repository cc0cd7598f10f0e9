//! WordprocessingML builders shared by the crate's tests.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::markup::W_NS;

pub fn document_xml(paragraphs: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{}</w:body></w:document>"#,
        paragraphs.concat()
    )
}

pub fn para(parts: &[String]) -> String {
    format!("<w:p><w:pPr><w:pStyle w:val=\"Normal\"/></w:pPr>{}</w:p>", parts.concat())
}

pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

pub fn ins(text: &str) -> String {
    format!(
        r#"<w:ins w:id="1" w:author="Counsel" w:date="2024-01-15T10:30:00Z"><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:ins>"#
    )
}

pub fn del(text: &str) -> String {
    format!(
        r#"<w:del w:id="2" w:author="Reviewer"><w:r><w:delText xml:space="preserve">{text}</w:delText></w:r></w:del>"#
    )
}

/// Write a minimal `.docx` package holding only `word/document.xml`.
pub fn write_docx(path: &Path, paragraphs: &[String]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(document_xml(paragraphs).as_bytes()).unwrap();
    zip.finish().unwrap();
}
