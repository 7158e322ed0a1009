//! Text-extraction layer.
//!
//! Provides a trait-based interface over positioned document text,
//! isolating the concrete PDF library (lopdf) from outline detection and
//! section segmentation.

pub mod pdf;

use crate::error::{Error, Result};
use crate::model::{LayoutDocument, PageLayout, Rect, TextBlock};

/// Abstract interface for positioned document text.
///
/// Implementations expose laid-out pages; literal text search and clipped
/// text extraction are provided on top of them and may be overridden by
/// backends with native support.
pub trait TextSource {
    /// All pages in document order.
    fn pages(&self) -> &[PageLayout];

    /// Number of pages.
    fn page_count(&self) -> u32 {
        self.pages().len() as u32
    }

    /// Get a page by number (1-indexed).
    fn page(&self, number: u32) -> Option<&PageLayout> {
        if number == 0 {
            return None;
        }
        self.pages().get((number - 1) as usize)
    }

    /// Like [`TextSource::page`], but an unknown page is an error.
    fn page_checked(&self, number: u32) -> Result<&PageLayout> {
        self.page(number)
            .ok_or(Error::PageOutOfRange(number, self.page_count()))
    }

    /// Find the first occurrence of `needle` on a page.
    ///
    /// Matching is case-insensitive and whitespace-normalized, and may span
    /// the lines of one block; the returned rectangle covers every line
    /// touched by the match.
    fn search_for(&self, page: u32, needle: &str) -> Option<Rect> {
        let page = self.page(page)?;
        let needle = normalize_for_search(needle);
        if needle.is_empty() {
            return None;
        }
        page.blocks
            .iter()
            .find_map(|block| search_block(block, &needle))
    }

    /// Text of every line inside a clip rectangle, newline-joined.
    ///
    /// A line is inside when its vertical midpoint lies within the clip and
    /// it overlaps the clip horizontally.
    fn text_in_rect(&self, page: u32, clip: Rect) -> String {
        let Some(page) = self.page(page) else {
            return String::new();
        };

        let mut lines = Vec::new();
        for block in &page.blocks {
            for line in &block.lines {
                let mid = line.bbox.center_y();
                if mid >= clip.y0 && mid <= clip.y1 && line.bbox.overlaps_x(&clip) {
                    lines.push(line.text());
                }
            }
        }
        lines.join("\n")
    }
}

impl TextSource for LayoutDocument {
    fn pages(&self) -> &[PageLayout] {
        &self.pages
    }
}

fn normalize_for_search(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn search_block(block: &TextBlock, needle: &str) -> Option<Rect> {
    // (start, end, bbox) of each line inside the joined haystack
    let mut ranges: Vec<(usize, usize, Rect)> = Vec::with_capacity(block.lines.len());
    let mut haystack = String::new();

    for line in &block.lines {
        let text = normalize_for_search(&line.text());
        if text.is_empty() {
            continue;
        }
        if !haystack.is_empty() {
            haystack.push(' ');
        }
        let start = haystack.len();
        haystack.push_str(&text);
        ranges.push((start, haystack.len(), line.bbox));
    }

    let at = haystack.find(needle)?;
    let end = at + needle.len();
    ranges
        .iter()
        .filter(|(start, stop, _)| *start < end && at < *stop)
        .map(|(_, _, bbox)| *bbox)
        .reduce(|a, b| a.union(&b))
}
