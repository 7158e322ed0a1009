//! PDF loading using lopdf.
//!
//! Walks each page's content stream to recover positioned text spans with
//! font information, groups spans into lines and lines into blocks, and
//! converts everything to top-left page coordinates.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::{
    LayoutDocument, PageLayout, Rect, TextBlock, TextLine, TextSpan, FLAG_BOLD, FLAG_ITALIC,
};

/// Default page size when the MediaBox is missing (US Letter).
const DEFAULT_PAGE_WIDTH: f32 = 612.0;
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// TJ adjustment (thousandths of text space) treated as a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Load a PDF file into positioned layout.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LayoutDocument> {
    let doc = LopdfDocument::load(path)?;
    PdfLayoutReader::new(&doc).read()
}

/// Load a PDF from an in-memory byte slice.
pub fn load_bytes(data: &[u8]) -> Result<LayoutDocument> {
    let doc = LopdfDocument::load_mem(data)?;
    PdfLayoutReader::new(&doc).read()
}

/// A span as it comes out of the content stream, in PDF user space
/// (bottom-left origin, `y` at the baseline).
#[derive(Debug, Clone)]
struct RawSpan {
    text: String,
    x: f32,
    y: f32,
    width: f32,
    font_size: f32,
    font_name: String,
}

impl RawSpan {
    fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        // No glyph metrics: assume half an em per character.
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    fn flags(&self) -> u32 {
        let name = self.font_name.to_lowercase();
        let mut flags = 0;
        if name.contains("bold") || name.contains("black") || name.contains("heavy") {
            flags |= FLAG_BOLD;
        }
        if name.contains("italic") || name.contains("oblique") {
            flags |= FLAG_ITALIC;
        }
        flags
    }

    /// Convert to a top-left-origin span on a page of the given height.
    fn into_span(self, page_height: f32) -> TextSpan {
        let flags = self.flags();
        // Approximate ascender/descender at 80%/20% of the font size.
        let top = page_height - (self.y + self.font_size * 0.8);
        let bottom = page_height - (self.y - self.font_size * 0.2);
        let bbox = Rect::new(self.x, top, self.x + self.width, bottom);
        TextSpan::new(self.text, self.font_size, flags, bbox)
    }
}

/// Reads every page of a lopdf document into [`PageLayout`]s.
struct PdfLayoutReader<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> PdfLayoutReader<'a> {
    fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    fn read(&self) -> Result<LayoutDocument> {
        let mut layout = LayoutDocument::new();
        for (page_num, page_id) in self.doc.get_pages() {
            let (width, height) = self.page_dimensions(page_id);
            let mut page = PageLayout::new(page_num, width, height);

            match self.page_spans(page_id) {
                Ok(spans) => page.blocks = build_blocks(spans, height),
                Err(e) => {
                    // Unreadable content still yields an (empty) page.
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                }
            }
            layout.add_page(page);
        }
        Ok(layout)
    }

    fn page_dimensions(&self, page_id: ObjectId) -> (f32, f32) {
        if let Ok(page_dict) = self.doc.get_dictionary(page_id) {
            if let Ok(media_box) = page_dict.get(b"MediaBox") {
                if let Ok(array) = media_box.as_array() {
                    if array.len() >= 4 {
                        let width = array[2].as_float().unwrap_or(DEFAULT_PAGE_WIDTH);
                        let height = array[3].as_float().unwrap_or(DEFAULT_PAGE_HEIGHT);
                        return (width, height);
                    }
                }
            }
        }
        (DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT)
    }

    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = page_dict
            .get(b"Contents")
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => stream_bytes(s),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            match stream_bytes(s) {
                                Ok(data) => {
                                    content.extend_from_slice(&data);
                                    content.push(b' ');
                                }
                                Err(e) => log::debug!("Skipping content stream {:?}: {}", r, e),
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Walk the content stream, emitting one span per text-showing operator.
    fn page_spans(&self, page_id: ObjectId) -> Result<Vec<RawSpan>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        let content = self.page_content(page_id)?;
        let content = lopdf::content::Content::decode(&content)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let mut spans = Vec::new();
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_name = String::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(key) = &op.operands[0] {
                            font_key = key.clone();
                            font_name = base_font_name(&fonts, key);
                        }
                        font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let n = |i: usize, d: f32| get_number(&op.operands[i]).unwrap_or(d);
                        matrix.set(n(0, 1.0), n(1, 0.0), n(2, 0.0), n(3, 1.0), n(4, 0.0), n(5, 0.0));
                    }
                }
                "T*" => matrix.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        matrix.next_line();
                    }
                    if !in_text {
                        continue;
                    }
                    let text = self.decode_operands(&fonts, &font_key, &op.operator, &op.operands);
                    if !text.trim().is_empty() {
                        let (x, y) = matrix.position();
                        spans.push(RawSpan::new(
                            text,
                            x,
                            y,
                            font_size * matrix.scale(),
                            font_name.clone(),
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    fn decode_operands(
        &self,
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font_key: &[u8],
        operator: &str,
        operands: &[Object],
    ) -> String {
        let encoding = fonts
            .get(font_key)
            .and_then(|f| f.get_font_encoding(self.doc).ok());
        let decode = |bytes: &[u8]| match encoding {
            Some(ref enc) => LopdfDocument::decode_text(enc, bytes).unwrap_or_default(),
            None => decode_text_simple(bytes),
        };

        match operator {
            "TJ" => {
                let Some(Object::Array(items)) = operands.first() else {
                    return String::new();
                };
                let mut combined = String::new();
                for item in items {
                    match item {
                        Object::String(bytes, _) => combined.push_str(&decode(bytes)),
                        Object::Integer(_) | Object::Real(_) => {
                            // Large negative kerning advances the pen by roughly a word space.
                            let adjustment = -get_number(item).unwrap_or(0.0);
                            if adjustment > TJ_SPACE_THRESHOLD && needs_space(&combined) {
                                combined.push(' ');
                            }
                        }
                        _ => {}
                    }
                }
                combined
            }
            "\"" => match operands.get(2) {
                Some(Object::String(bytes, _)) => decode(bytes),
                _ => String::new(),
            },
            _ => match operands.first() {
                Some(Object::String(bytes, _)) => decode(bytes),
                _ => String::new(),
            },
        }
    }
}

/// Raw bytes of a content stream; only filtered streams are decoded.
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::PdfParse(e.to_string()))
}

fn base_font_name(fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>, key: &[u8]) -> String {
    fonts
        .get(key)
        .and_then(|font| font.get(b"BaseFont").ok())
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).to_string())
        .unwrap_or_else(|| String::from_utf8_lossy(key).to_string())
}

fn needs_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => c != ' ' && c != '\u{00A0}' && !is_spaceless_script_char(c),
        None => false,
    }
}

/// Group raw spans into blocks of lines in top-to-bottom reading order.
fn build_blocks(spans: Vec<RawSpan>, page_height: f32) -> Vec<TextBlock> {
    let lines = group_spans_into_lines(spans);
    if lines.is_empty() {
        return vec![];
    }

    let avg_spacing = average_line_spacing(&lines);
    let mut blocks = Vec::new();
    let mut current: Vec<Vec<RawSpan>> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(to_block(std::mem::take(&mut current), page_height));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(to_block(current, page_height));
    }
    blocks
}

fn to_block(lines: Vec<Vec<RawSpan>>, page_height: f32) -> TextBlock {
    let lines = lines
        .into_iter()
        .map(|spans| {
            TextLine::from_spans(spans.into_iter().map(|s| s.into_span(page_height)).collect())
        })
        .collect();
    TextBlock::from_lines(lines)
}

/// Y-based line grouping; spans within 30% of the font size share a line.
fn group_spans_into_lines(mut spans: Vec<RawSpan>) -> Vec<Vec<RawSpan>> {
    // Sort by Y descending (PDF Y is bottom-up), then X
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Vec<RawSpan>> = Vec::new();
    let mut current: Vec<RawSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(finish_line(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(finish_line(current));
    }
    lines
}

/// Order a line's spans left to right and insert word gaps between them.
fn finish_line(mut spans: Vec<RawSpan>) -> Vec<RawSpan> {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    for i in 1..spans.len() {
        let gap = spans[i].x - (spans[i - 1].x + spans[i - 1].width);
        let chars = spans[i].text.chars().count().max(1);
        let avg_char_width = spans[i].width / chars as f32;

        let prev_last = spans[i - 1].text.chars().last();
        let curr_first = spans[i].text.chars().next();
        let both_spaceless = prev_last.is_some_and(is_spaceless_script_char)
            && curr_first.is_some_and(is_spaceless_script_char);
        let has_space = prev_last.is_some_and(char::is_whitespace)
            || curr_first.is_some_and(char::is_whitespace);

        if gap > avg_char_width * 0.2 && !both_spaceless && !has_space {
            spans[i - 1].text.push(' ');
        }
    }
    spans
}

fn line_y(line: &[RawSpan]) -> f32 {
    line.first().map(|s| s.y).unwrap_or(0.0)
}

fn line_x(line: &[RawSpan]) -> f32 {
    line.first().map(|s| s.x).unwrap_or(0.0)
}

fn line_font_size(line: &[RawSpan]) -> f32 {
    let total: usize = line.iter().map(|s| s.text.len()).sum();
    if total == 0 {
        return line.first().map(|s| s.font_size).unwrap_or(0.0);
    }
    let weighted: f32 = line.iter().map(|s| s.font_size * s.text.len() as f32).sum();
    weighted / total as f32
}

fn average_line_spacing(lines: &[Vec<RawSpan>]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (line_y(&w[0]) - line_y(&w[1])).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &[RawSpan], curr: &[RawSpan], avg_spacing: f32) -> bool {
    // Large spacing indicates new paragraph
    if (line_y(prev) - line_y(curr)).abs() > avg_spacing * 1.5 {
        return true;
    }
    // Font size change usually separates headings from body
    if (line_font_size(prev) - line_font_size(curr)).abs() > 1.0 {
        return true;
    }
    // Indentation change
    (line_x(prev) - line_x(curr)).abs() > 20.0
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default leading; TL is not tracked
        self.f -= 12.0 * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
