//! PDF text extraction and generation
//!
//! Drive PDFs are read page by page, and plain text written to a PDF file is
//! laid out on US Letter pages in 10pt Helvetica.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::{PdfError, Result};

/// Returned when a PDF parses but yields no text
pub const NO_PDF_TEXT: &str = "No text content could be extracted from this PDF.";

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;
const FONT_SIZE: i64 = 10;
const LEADING: i64 = 12;

/// Lines longer than this are reflowed
const LONG_LINE: usize = 100;
/// Target width of reflowed chunks
const WRAP_WIDTH: usize = 80;

/// Extract the text of every page
///
/// Never fails: parse errors and per-page errors are reported inline.
pub fn extract_pdf_text(bytes: &[u8]) -> String {
    let document = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => return format!("Error extracting PDF text: {}", e),
    };

    let mut sections = Vec::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) if text.trim().is_empty() => {}
            Ok(text) => sections.push(format!("--- Page {} ---\n{}", page_number, text)),
            Err(e) => sections.push(format!(
                "--- Page {} ---\n[Error extracting text: {}]",
                page_number, e
            )),
        }
    }

    if sections.is_empty() {
        return NO_PDF_TEXT.to_string();
    }
    sections.join("\n\n")
}

/// Split text into printable lines
///
/// Blank lines are kept as empty lines. Lines over 100 characters are
/// broken on spaces into chunks of at most 80 characters; a chunk holding
/// a single word may be longer.
pub fn reflow_text(text: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for line in text.split('\n') {
        if line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        if line.chars().count() <= LONG_LINE {
            lines.push(line.to_string());
            continue;
        }

        let mut current: Vec<&str> = Vec::new();
        for word in line.split(' ') {
            current.push(word);
            if current.join(" ").chars().count() > WRAP_WIDTH && current.len() > 1 {
                current.pop();
                lines.push(current.join(" "));
                current = vec![word];
            }
        }
        if !current.is_empty() {
            lines.push(current.join(" "));
        }
    }

    lines
}

/// Render text into a PDF document
pub fn create_pdf_from_text(text: &str) -> Result<Vec<u8>> {
    let lines = reflow_text(text);
    let lines_per_page = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    // reflow_text always yields at least one line, so there is at least one page
    let mut kids: Vec<Object> = Vec::new();
    for page_lines in lines.chunks(lines_per_page) {
        let page_id = add_page(&mut doc, pages_id, page_lines)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, lines: &[String]) -> Result<ObjectId> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new(
            "Td",
            vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()],
        ),
    ];

    for line in lines {
        if !line.is_empty() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(to_win_ansi(line))]));
        }
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let encoded = content.encode().map_err(PdfError::from)?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

/// Encode for a standard Type1 font; characters outside Latin-1 become `?`
fn to_win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| match c {
            '\t' => b' ',
            c if (c as u32) < 0x20 => b' ',
            c if (c as u32) <= 0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflow_keeps_short_lines() {
        let lines = reflow_text("first\n\nsecond");
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn test_reflow_splits_long_lines() {
        let line = vec!["word"; 40].join(" ");
        let lines = reflow_text(&line);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= WRAP_WIDTH));
        assert_eq!(lines.join(" "), line);
    }

    #[test]
    fn test_reflow_whitespace_only_line_is_blank() {
        assert_eq!(reflow_text("   \t"), vec![String::new()]);
    }

    #[test]
    fn test_create_pdf_round_trip() {
        let bytes = create_pdf_from_text("Hello PDF world\nSecond line (with parens)").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let text = extract_pdf_text(&bytes);
        assert!(text.starts_with("--- Page 1 ---"));
        assert!(text.contains("Hello PDF world"));
    }

    #[test]
    fn test_create_pdf_paginates() {
        let text = (0..200).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let bytes = create_pdf_from_text(&text).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 4);
    }

    #[test]
    fn test_create_pdf_empty_text() {
        let bytes = create_pdf_from_text("").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert_eq!(extract_pdf_text(&bytes), NO_PDF_TEXT);
    }

    #[test]
    fn test_extract_invalid_pdf() {
        let text = extract_pdf_text(b"not a pdf");
        assert!(text.starts_with("Error extracting PDF text: "));
    }
}
