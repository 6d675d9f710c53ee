//! DOCX report assembly
//!
//! A DOCX file is a ZIP archive of Open XML parts. The report only needs
//! a handful of them: content types, package relationships, core properties,
//! a style sheet with the `Title` and `Heading1` styles, and the document
//! body itself.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ComparisonError;

pub const REPORT_FILE_NAME: &str = "research_comparison_kpi.docx";
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const REPORT_TITLE: &str = "Research Paper Comparison - KPI Report";

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:eastAsia="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="200" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:pBdr><w:bottom w:val="single" w:sz="8" w:space="4" w:color="4F81BD"/></w:pBdr><w:spacing w:after="300" w:line="240" w:lineRule="auto"/><w:contextualSpacing/></w:pPr><w:rPr><w:color w:val="17365D"/><w:spacing w:val="5"/><w:kern w:val="28"/><w:sz w:val="52"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="480" w:after="0"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="365F91"/><w:sz w:val="28"/></w:rPr></w:style></w:styles>"#;

/// The generated report, ready to be offered for download
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// One block of the document body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block<'a> {
    /// Heading at `level`; 0 is the document title
    Heading(&'a str, u8),
    Paragraph(&'a str),
}

/// Build the KPI report: title, KPI text, then one headed section per paper.
pub fn assemble_report(
    kpi: &str,
    highlights1: &str,
    highlights2: &str,
) -> Result<ReportDocument, ComparisonError> {
    let blocks = [
        Block::Heading(REPORT_TITLE, 0),
        Block::Paragraph(kpi),
        Block::Heading("Paper 1 Highlights", 1),
        Block::Paragraph(highlights1),
        Block::Heading("Paper 2 Highlights", 1),
        Block::Paragraph(highlights2),
    ];

    let document_xml = document_xml(&blocks)?;
    let core_xml = core_properties_xml(REPORT_TITLE)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS_XML.as_bytes()),
        ("docProps/core.xml", &core_xml),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes()),
        ("word/styles.xml", STYLES_XML.as_bytes()),
        ("word/document.xml", &document_xml),
    ];
    for (name, bytes) in parts {
        zip.start_file(name, options)?;
        zip.write_all(bytes).map_err(|e| {
            ComparisonError::Rendering(format!("Failed to write report part {}: {}", name, e))
        })?;
    }

    let data = zip.finish()?.into_inner();
    tracing::debug!("Assembled report ({} bytes)", data.len());

    Ok(ReportDocument {
        file_name: REPORT_FILE_NAME.to_string(),
        mime_type: DOCX_MIME_TYPE.to_string(),
        data,
    })
}

fn xml_error(err: impl std::fmt::Display) -> ComparisonError {
    ComparisonError::Rendering(format!("Failed to build report XML: {}", err))
}

fn document_xml(blocks: &[Block<'_>]) -> Result<Vec<u8>, ComparisonError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", W_NS));
    writer.write_event(Event::Start(root)).map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("w:body")))
        .map_err(xml_error)?;

    for block in blocks {
        match *block {
            Block::Heading(text, level) => {
                let style = if level == 0 {
                    "Title".to_string()
                } else {
                    format!("Heading{}", level)
                };
                write_paragraph(&mut writer, Some(&style), text)?;
            }
            Block::Paragraph(text) => write_paragraph(&mut writer, None, text)?,
        }
    }

    // US Letter with one-inch margins
    writer
        .write_event(Event::Start(BytesStart::new("w:sectPr")))
        .map_err(xml_error)?;
    writer
        .create_element("w:pgSz")
        .with_attributes([("w:w", "12240"), ("w:h", "15840")])
        .write_empty()
        .map_err(xml_error)?;
    writer
        .create_element("w:pgMar")
        .with_attributes([
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
        ])
        .write_empty()
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("w:sectPr")))
        .map_err(xml_error)?;

    writer
        .write_event(Event::End(BytesEnd::new("w:body")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("w:document")))
        .map_err(xml_error)?;

    Ok(writer.into_inner())
}

/// Write one `w:p`. Newlines become `w:br`, tabs become `w:tab`.
fn write_paragraph(
    writer: &mut Writer<Vec<u8>>,
    style: Option<&str>,
    text: &str,
) -> Result<(), ComparisonError> {
    writer
        .write_event(Event::Start(BytesStart::new("w:p")))
        .map_err(xml_error)?;

    if let Some(style) = style {
        writer
            .write_event(Event::Start(BytesStart::new("w:pPr")))
            .map_err(xml_error)?;
        writer
            .create_element("w:pStyle")
            .with_attribute(("w:val", style))
            .write_empty()
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("w:pPr")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::Start(BytesStart::new("w:r")))
        .map_err(xml_error)?;

    let cleaned = strip_invalid_xml_chars(text);
    let mut segment = String::new();
    for ch in cleaned.chars() {
        match ch {
            '\n' | '\r' | '\t' => {
                write_text(writer, &segment)?;
                segment.clear();
                let element = if ch == '\t' { "w:tab" } else { "w:br" };
                writer
                    .write_event(Event::Empty(BytesStart::new(element)))
                    .map_err(xml_error)?;
            }
            other => segment.push(other),
        }
    }
    write_text(writer, &segment)?;

    writer
        .write_event(Event::End(BytesEnd::new("w:r")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("w:p")))
        .map_err(xml_error)?;
    Ok(())
}

fn write_text(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<(), ComparisonError> {
    if text.is_empty() {
        return Ok(());
    }
    let mut start = BytesStart::new("w:t");
    start.push_attribute(("xml:space", "preserve"));
    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("w:t")))
        .map_err(xml_error)?;
    Ok(())
}

/// Drop characters XML 1.0 cannot carry. `\r\n` collapses to a single break.
fn strip_invalid_xml_chars(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || matches!(c as u32, 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF)
        })
        .collect()
}

fn core_properties_xml(title: &str) -> Result<Vec<u8>, ComparisonError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;
    let mut root = BytesStart::new("cp:coreProperties");
    root.push_attribute((
        "xmlns:cp",
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
    ));
    root.push_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"));
    writer.write_event(Event::Start(root)).map_err(xml_error)?;
    writer
        .create_element("dc:title")
        .write_text_content(BytesText::new(title))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("cp:coreProperties")))
        .map_err(xml_error)?;
    Ok(writer.into_inner())
}
