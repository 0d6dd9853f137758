use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::label::LabelPage;

const POINTS_PER_MM: f64 = 72.0 / 25.4;
const LINE_SPACING: f64 = 1.2;

fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        c if (c as u32) < 0x20 => b' ',
        _ => b'?',
    }
}

fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for c in text.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push(b'\\');
        }
        out.push(win_ansi_byte(c));
    }
    out.push(b')');
    out
}

fn content_stream(page: &LabelPage, page_height_mm: f64) -> Vec<u8> {
    let mut stream = Vec::new();
    for element in &page.elements {
        for (line_idx, line) in element.lines.iter().enumerate() {
            let x = mm_to_pt(element.x_mm);
            let y = mm_to_pt(page_height_mm - element.y_mm)
                - line_idx as f64 * element.font_size_pt * LINE_SPACING;
            stream.extend_from_slice(
                format!(
                    "BT /F1 {:.1} Tf {:.2} {:.2} Td ",
                    element.font_size_pt, x, y
                )
                .as_bytes(),
            );
            stream.extend_from_slice(&pdf_string(line));
            stream.extend_from_slice(b" Tj ET\n");
        }
    }
    stream
}

pub fn render_pdf(pages: &[LabelPage], page_width_mm: f64, page_height_mm: f64) -> Vec<u8> {
    // 1 catalog, 2 page tree, 3 font, then a (page, content) pair per page.
    let page_obj = |idx: usize| 4 + idx * 2;
    let kids = (0..pages.len())
        .map(|idx| format!("{} 0 R", page_obj(idx)))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];

    for (idx, page) in pages.iter().enumerate() {
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                mm_to_pt(page_width_mm),
                mm_to_pt(page_height_mm),
                page_obj(idx) + 1
            )
            .into_bytes(),
        );

        let stream = content_stream(page, page_height_mm);
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"\nendstream");
        objects.push(body);
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", idx + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

pub fn write_pdf(
    output_path: &Path,
    pages: &[LabelPage],
    page_width_mm: f64,
    page_height_mm: f64,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir: {}", parent.display()))?;
    }
    let bytes = render_pdf(pages, page_width_mm, page_height_mm);
    let mut file = std::fs::File::create(output_path)
        .with_context(|| format!("failed to create pdf: {}", output_path.display()))?;
    file.write_all(&bytes)
        .with_context(|| format!("failed to write pdf: {}", output_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::label::TextElement;

    fn page(text: &str) -> LabelPage {
        LabelPage {
            elements: vec![TextElement {
                x_mm: 10.0,
                y_mm: 10.0,
                font_size_pt: 12.0,
                max_width_mm: 80.0,
                lines: vec![text.to_string()],
            }],
        }
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle)
            .count()
    }

    #[test]
    fn escapes_delimiters_and_replaces_wide_chars() {
        assert_eq!(pdf_string("a(b)c\\"), b"(a\\(b\\)c\\\\)".to_vec());
        assert_eq!(pdf_string("café"), b"(caf\xe9)".to_vec());
        assert_eq!(pdf_string("倉庫"), b"(??)".to_vec());
    }

    #[test]
    fn text_is_encoded_as_win_ansi() {
        assert_eq!(pdf_string("€5"), b"(\x805)".to_vec());
        assert_eq!(
            pdf_string("\u{2018}A\u{2019} \u{2013} \u{2122}"),
            b"(\x91A\x92 \x96 \x99)".to_vec()
        );
        assert_eq!(pdf_string("\u{0080}\u{009F}"), b"(??)".to_vec());
        assert_eq!(pdf_string("a\tb"), b"(a b)".to_vec());
    }

    #[test]
    fn document_has_one_page_object_per_label() {
        let pages = vec![page("one"), page("two"), page("three")];

        let pdf = render_pdf(&pages, 101.6, 152.4);

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert_eq!(count(&pdf, b"/Type /Page /Parent"), 3);
        assert_eq!(count(&pdf, b"/Count 3"), 1);
        assert_eq!(count(&pdf, b"(two) Tj"), 1);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = render_pdf(&[page("x")], 101.6, 152.4);
        let text = String::from_utf8_lossy(&pdf).into_owned();

        let xref_start = text.find("xref\n").expect("xref table present");
        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().expect("offset is numeric"))
            .collect();

        assert_eq!(entries.len(), 5);
        for (idx, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", idx + 1);
            assert!(text[*offset..].starts_with(&expected), "object {} misplaced", idx + 1);
        }
    }
}
