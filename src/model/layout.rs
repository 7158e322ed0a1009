//! Positioned text types produced by the text-extraction layer.
//!
//! Coordinates use a top-left origin with `y` growing downward, so a
//! rectangle's `y0` is its top edge and `y1` its bottom edge.

use serde::{Deserialize, Serialize};

/// Span flag bit set when the font is bold.
pub const FLAG_BOLD: u32 = 1 << 4;

/// Span flag bit set when the font is italic.
pub const FLAG_ITALIC: u32 = 1 << 1;

/// An axis-aligned rectangle in layout units (points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from its edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal midpoint.
    pub fn center_x(&self) -> f32 {
        self.x0 + self.width() / 2.0
    }

    /// Vertical midpoint.
    pub fn center_y(&self) -> f32 {
        self.y0 + self.height() / 2.0
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether the two rectangles overlap horizontally.
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1
    }

    /// Whether the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}

/// A run of text sharing one font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Font size in points
    pub size: f32,
    /// Font flags (see [`FLAG_BOLD`], [`FLAG_ITALIC`])
    pub flags: u32,
    /// Bounding box
    pub bbox: Rect,
}

impl TextSpan {
    /// Create a new span.
    pub fn new(text: impl Into<String>, size: f32, flags: u32, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            size,
            flags,
            bbox,
        }
    }

    /// Check if the bold flag is set.
    pub fn is_bold(&self) -> bool {
        self.flags & FLAG_BOLD != 0
    }
}

/// A line of spans sharing a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Spans in reading order
    pub spans: Vec<TextSpan>,
    /// Bounding box of all spans
    pub bbox: Rect,
}

impl TextLine {
    /// Create a line, computing its box from the spans.
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        let bbox = union_all(spans.iter().map(|s| s.bbox));
        Self { spans, bbox }
    }

    /// Concatenated span text.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A contiguous run of lines sharing layout context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Lines in reading order
    pub lines: Vec<TextLine>,
    /// Bounding box of all lines
    pub bbox: Rect,
}

impl TextBlock {
    /// Create a block, computing its box from the lines.
    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        let bbox = union_all(lines.iter().map(|l| l.bbox));
        Self { lines, bbox }
    }

    /// Create a single-span, single-line block.
    pub fn single(text: impl Into<String>, size: f32, flags: u32, bbox: Rect) -> Self {
        let line = TextLine::from_spans(vec![TextSpan::new(text, size, flags, bbox)]);
        Self::from_lines(vec![line])
    }

    /// Iterate over every span in the block.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }

    /// Check if the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A single page of positioned text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text blocks in reading order
    pub blocks: Vec<TextBlock>,
}

impl PageLayout {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            blocks: Vec::new(),
        }
    }

    /// Create an empty page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: TextBlock) {
        self.blocks.push(block);
    }

    /// Builder-style variant of [`PageLayout::add_block`].
    pub fn with_block(mut self, block: TextBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// The full page rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// A document as an ordered sequence of laid-out pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Pages in order
    pub pages: Vec<PageLayout>,
}

impl LayoutDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from pages.
    pub fn from_pages(pages: Vec<PageLayout>) -> Self {
        Self { pages }
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: PageLayout) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn union_all(rects: impl Iterator<Item = Rect>) -> Rect {
    rects.reduce(|a, b| a.union(&b)).unwrap_or_default()
}
