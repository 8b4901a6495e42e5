use async_trait::async_trait;
use log::debug;
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::fs;

use super::{document_file_name, DocumentExporter};
use crate::error::RecipeError;
use crate::presenter::{Block, RecipeView};

// A4 portrait in points
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 56.0;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 11.0;

/// Helvetica averages about half an em per glyph
const WRAP_COLUMNS: usize = ((PAGE_WIDTH - 2.0 * MARGIN) / (BODY_SIZE * 0.5)) as usize;

/// Writes the recipe as an A4 PDF into `output_dir`
#[derive(Debug, Clone)]
pub struct PdfExporter {
    output_dir: PathBuf,
}

impl PdfExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl DocumentExporter for PdfExporter {
    fn format_name(&self) -> &str {
        "pdf"
    }

    async fn export(&self, view: &RecipeView) -> Result<PathBuf, RecipeError> {
        let bytes = render_pdf(view)?;
        let path = self.output_dir.join(document_file_name(&view.title));

        fs::create_dir_all(&self.output_dir).await.map_err(|e| {
            RecipeError::Export(format!("{}: {}", self.output_dir.display(), e))
        })?;
        fs::write(&path, &bytes)
            .await
            .map_err(|e| RecipeError::Export(format!("{}: {}", path.display(), e)))?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

struct Line {
    font: Font,
    size: f32,
    text: String,
}

fn layout(view: &RecipeView) -> Vec<Line> {
    let mut lines = Vec::new();
    for block in view.blocks() {
        let (font, size, text) = match block {
            Block::Title(text) => (Font::Bold, TITLE_SIZE, text),
            Block::Heading(text) => (Font::Bold, HEADING_SIZE, text),
            Block::Text(text) => (Font::Regular, BODY_SIZE, text),
            Block::Blank => (Font::Regular, BODY_SIZE, String::new()),
        };
        let columns = (WRAP_COLUMNS as f32 * BODY_SIZE / size) as usize;
        for text in wrap(&text, columns) {
            lines.push(Line { font, size, text });
        }
    }
    lines
}

/// Greedy word wrap; words longer than a line are split
fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > columns {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..columns).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > columns && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// WinAnsiEncoding code for characters outside Latin-1
fn win_ansi_extra(c: char) -> Option<u8> {
    let code = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

/// Escape a string for a PDF literal in WinAnsiEncoding
///
/// The built-in fonts have no glyphs beyond that encoding, so any other
/// character fails the export rather than being dropped from the document.
fn pdf_string(text: &str) -> Result<String, RecipeError> {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\t' => out.push(' '),
            '\u{00A0}'..='\u{00FF}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => match win_ansi_extra(c) {
                Some(code) => {
                    let _ = write!(out, "\\{:03o}", code);
                }
                None => {
                    return Err(RecipeError::Export(format!(
                        "'{}' (U+{:04X}) cannot be written with the built-in PDF fonts",
                        c, c as u32
                    )));
                }
            },
        }
    }
    Ok(out)
}

fn paginate(lines: Vec<Line>) -> Result<Vec<String>, RecipeError> {
    let mut pages = Vec::new();
    let mut content = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let leading = line.size * 1.4;
        if y - leading < MARGIN && !content.is_empty() {
            pages.push(std::mem::take(&mut content));
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= leading;
        if !line.text.is_empty() {
            let _ = writeln!(
                content,
                "BT /{} {} Tf {:.2} {:.2} Td ({}) Tj ET",
                line.font.resource(),
                line.size,
                MARGIN,
                y,
                pdf_string(&line.text)?
            );
        }
    }

    if !content.is_empty() || pages.is_empty() {
        pages.push(content);
    }
    Ok(pages)
}

/// Render the recipe as a complete PDF document
///
/// # Errors
/// `Export` when the recipe holds text the built-in fonts cannot show
pub fn render_pdf(view: &RecipeView) -> Result<Vec<u8>, RecipeError> {
    let pages = paginate(layout(view))?;

    // 1 catalog, 2 page tree, 3-4 fonts, then a page and its content per page
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 5 + 2 * i).collect();
    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            page_ids
                .iter()
                .map(|id| format!("{} 0 R", id))
                .collect::<Vec<_>>()
                .join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    for (content, page_id) in pages.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH,
            PAGE_HEIGHT,
            page_id + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, object);
    }

    let xref_start = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_start
    );

    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Recipe;

    fn view(title: &str, steps: usize) -> RecipeView {
        RecipeView::from_recipe(&Recipe {
            title: title.to_string(),
            description: "A test recipe".to_string(),
            steps: (1..=steps).map(|i| format!("Do step number {}", i)).collect(),
            ..Default::default()
        })
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_document_structure() {
        let pdf = as_text(&render_pdf(&view("Soup", 2)).unwrap());
        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert!(pdf.contains("/MediaBox [0 0 595.28 841.89]"));
        assert!(pdf.contains("(Soup) Tj"));
        assert!(pdf.contains("(1. Do step number 1) Tj"));
        assert!(pdf.contains("/Count 1"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = as_text(&render_pdf(&view("Soup", 2)).unwrap());
        let xref_start: usize = pdf
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(pdf[xref_start..].starts_with("xref\n"));

        let entries: Vec<usize> = pdf[xref_start..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        for (i, offset) in entries.iter().enumerate() {
            assert!(pdf[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn test_long_recipe_spans_pages() {
        let pdf = as_text(&render_pdf(&view("Feast", 120)).unwrap());
        assert!(!pdf.contains("/Count 1 "));
        assert!(pdf.contains("(120. Do step number 120) Tj"));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(pdf_string("a (b) \\ c").unwrap(), "a \\(b\\) \\\\ c");
        assert_eq!(pdf_string("200\u{00B0}C").unwrap(), "200\\260C");
        assert_eq!(
            pdf_string("\u{201C}hot\u{201D} \u{2013} 5\u{20AC}").unwrap(),
            "\\223hot\\224 \\226 5\\200"
        );
    }

    #[test]
    fn test_text_outside_win_ansi_is_rejected() {
        assert!(matches!(
            pdf_string("\u{1F373}"),
            Err(RecipeError::Export(_))
        ));
        assert!(matches!(
            render_pdf(&view("पनीर टिक्का", 1)),
            Err(RecipeError::Export(_))
        ));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("", 10), vec![String::new()]);
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[tokio::test]
    async fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = PdfExporter::new(dir.path().join("exports"));

        let path = exporter.export(&view("Dal Rice", 3)).await.unwrap();
        assert_eq!(path, dir.path().join("exports").join("Dal Rice-recipe.pdf"));

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_export_of_non_latin_title_fails_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = PdfExporter::new(dir.path());

        let result = exporter.export(&view("麻婆豆腐", 2)).await;
        assert!(matches!(result, Err(RecipeError::Export(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_export_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let exporter = PdfExporter::new(&blocker);
        let result = exporter.export(&view("Soup", 1)).await;
        assert!(matches!(result, Err(RecipeError::Export(_))));
    }
}
