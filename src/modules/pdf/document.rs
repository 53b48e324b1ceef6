//! Minimal PDF writer.
//!
//! Produces a valid single-font, text-only PDF 1.4 byte stream: A4
//! pages, Helvetica regular/bold, top-to-bottom line layout with
//! automatic page breaks. Enough for the inspection report templates,
//! which are line- and table-shaped text.

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

struct Line {
    text: String,
    size: f32,
    style: FontStyle,
    /// Extra vertical gap before the line
    gap_before: f32,
}

/// Line-oriented page builder. Call the `heading`/`section`/`text`
/// helpers top to bottom, then [`PdfBuilder::build`].
pub struct PdfBuilder {
    lines: Vec<Line>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.push(text, 18.0, FontStyle::Bold, 6.0)
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.push(text, 14.0, FontStyle::Bold, 10.0)
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.push(text, 10.0, FontStyle::Regular, 2.0)
    }

    pub fn labeled(&mut self, label: &str, value: &str) -> &mut Self {
        self.push(&format!("{}: {}", label, value), 10.0, FontStyle::Regular, 2.0)
    }

    pub fn spacer(&mut self) -> &mut Self {
        self.push("", 10.0, FontStyle::Regular, 8.0)
    }

    fn push(&mut self, text: &str, size: f32, style: FontStyle, gap_before: f32) -> &mut Self {
        self.lines.push(Line {
            text: text.to_string(),
            size,
            style,
            gap_before,
        });
        self
    }

    /// Serialize to PDF bytes.
    pub fn build(&self) -> Vec<u8> {
        // Lay lines out into page content streams
        let mut page_streams: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        for line in &self.lines {
            let advance = line.gap_before + line.size * 1.3;
            if y - advance < MARGIN {
                page_streams.push(std::mem::take(&mut current));
                y = PAGE_HEIGHT - MARGIN;
            }
            y -= advance;

            if !line.text.is_empty() {
                let font = match line.style {
                    FontStyle::Regular => "F1",
                    FontStyle::Bold => "F2",
                };
                current.push_str(&format!(
                    "BT /{} {} Tf 1 0 0 1 {} {} Tm ({}) Tj ET\n",
                    font,
                    line.size,
                    MARGIN,
                    y,
                    escape_pdf_text(&line.text)
                ));
            }
        }
        page_streams.push(current);

        // Object numbering: 1 catalog, 2 pages, 3 F1, 4 F2, then
        // (page, content) pairs.
        let page_count = page_streams.len();
        let mut objects: Vec<Vec<u8>> = Vec::new();

        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", 5 + i * 2))
            .collect();

        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());
        objects.push(
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                page_count
            )
            .into_bytes(),
        );
        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_vec(),
        );
        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold >>".to_vec(),
        );

        for (i, stream) in page_streams.iter().enumerate() {
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH,
                    PAGE_HEIGHT,
                    6 + i * 2
                )
                .into_bytes(),
            );
            let mut content = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            content.extend_from_slice(stream.as_bytes());
            content.extend_from_slice(b"endstream");
            objects.push(content);
        }

        // Assemble body with byte offsets for the xref table
        let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
        let mut offsets: Vec<usize> = Vec::with_capacity(objects.len());

        for (i, obj) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
            out.extend_from_slice(obj);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );

        out
    }
}

/// Escape characters with special meaning inside PDF string literals
fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            '\\' => escaped.push_str("\\\\"),
            '\n' | '\r' => escaped.push(' '),
            c if c.is_ascii() => escaped.push(c),
            // Non-ASCII falls back to '?' rather than juggling encodings
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_valid_pdf_skeleton() {
        let mut builder = PdfBuilder::new();
        builder
            .heading("Electrical & Smoke Safety Report")
            .labeled("Property Address", "1 Test St")
            .text("body line");
        let bytes = builder.build();

        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Type /Catalog"));
        assert!(text.contains("startxref"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("Property Address: 1 Test St"));
    }

    #[test]
    fn long_documents_break_into_pages() {
        let mut builder = PdfBuilder::new();
        for i in 0..200 {
            builder.text(&format!("line {}", i));
        }
        let bytes = builder.build();
        let text = String::from_utf8_lossy(&bytes);
        let pages = text.matches("/Type /Page ").count();
        assert!(pages >= 2, "expected multiple pages, got {}", pages);
    }

    #[test]
    fn escapes_parentheses_and_backslashes() {
        assert_eq!(escape_pdf_text("a(b)c\\d"), "a\\(b\\)c\\\\d");
        assert_eq!(escape_pdf_text("naïve"), "na?ve");
    }
}
