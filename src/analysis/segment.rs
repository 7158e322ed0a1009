//! Outline-driven section segmentation.
//!
//! A section runs from just below its heading to just above the next
//! heading of the same or a higher level (or to the end of the document).
//! The title acts as a level-0 heading on page 1, above every H1.

use crate::model::{Outline, Rect, Section};
use crate::source::TextSource;

/// Rank of the synthetic title heading.
const TITLE_RANK: u8 = 0;

/// A heading used as a section anchor.
#[derive(Debug, Clone, Copy)]
struct Anchor<'a> {
    rank: u8,
    text: &'a str,
    page: u32,
}

/// Carves a document into sections using its outline.
#[derive(Debug, Clone)]
pub struct Segmenter {
    min_tokens: usize,
}

impl Segmenter {
    /// Sections need strictly more than `min_tokens` whitespace tokens.
    pub fn new(min_tokens: usize) -> Self {
        Self { min_tokens }
    }

    /// Segment one document.
    pub fn segment<S: TextSource + ?Sized>(
        &self,
        source: &S,
        document_id: &str,
        outline: &Outline,
    ) -> Vec<Section> {
        let anchors: Vec<Anchor<'_>> = anchors(outline)
            .into_iter()
            .filter(|a| match source.page_checked(a.page) {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("{}: skipping heading '{}': {}", document_id, a.text, e);
                    false
                }
            })
            .collect();

        let mut sections = Vec::new();
        for (i, anchor) in anchors.iter().enumerate() {
            let start_y = match source.search_for(anchor.page, anchor.text) {
                Some(rect) => rect.y1,
                None => {
                    log::debug!(
                        "{}: heading '{}' not found on page {}, starting at page top",
                        document_id,
                        anchor.text,
                        anchor.page
                    );
                    0.0
                }
            };

            let (end_page, end_y) = end_boundary(source, &anchors[i + 1..], anchor.rank);
            let body = clipped_text(source, anchor.page, start_y, end_page, end_y);

            if body.split_whitespace().count() > self.min_tokens {
                sections.push(Section::new(document_id, anchor.text, anchor.page, body));
            }
        }

        log::debug!("{}: {} sections kept", document_id, sections.len());
        sections
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(10)
    }
}

fn anchors(outline: &Outline) -> Vec<Anchor<'_>> {
    let title = (!outline.title.is_empty()).then(|| Anchor {
        rank: TITLE_RANK,
        text: &outline.title,
        page: 1,
    });
    title
        .into_iter()
        .chain(outline.outline.iter().map(|e| Anchor {
            rank: e.level.rank(),
            text: &e.text,
            page: e.page,
        }))
        .collect()
}

/// Page and y-position where a section of `rank` stops: the top of the
/// next same-or-higher heading, or the bottom of the last page.
fn end_boundary<S: TextSource + ?Sized>(source: &S, following: &[Anchor<'_>], rank: u8) -> (u32, f32) {
    let last_page = source.page_count();
    let last_height = page_height(source, last_page);

    match following.iter().find(|next| next.rank <= rank) {
        Some(next) => {
            let end_y = match source.search_for(next.page, next.text) {
                Some(rect) => rect.y0,
                None => {
                    log::debug!(
                        "Boundary heading '{}' not found on page {}, ending at page bottom",
                        next.text,
                        next.page
                    );
                    page_height(source, next.page)
                }
            };
            (next.page, end_y)
        }
        None => (last_page, last_height),
    }
}

fn page_height<S: TextSource + ?Sized>(source: &S, page: u32) -> f32 {
    source.page(page).map(|p| p.height).unwrap_or(0.0)
}

/// Text between (start_page, start_y) and (end_page, end_y), page by page,
/// whitespace-normalized.
fn clipped_text<S: TextSource + ?Sized>(
    source: &S,
    start_page: u32,
    start_y: f32,
    end_page: u32,
    end_y: f32,
) -> String {
    let mut pieces = Vec::new();
    for number in start_page..=end_page {
        let Some(page) = source.page(number) else {
            continue;
        };
        let mut clip: Rect = page.rect();
        if number == start_page {
            clip.y0 = start_y;
        }
        if number == end_page {
            clip.y1 = end_y;
        }
        pieces.push(source.text_in_rect(number, clip));
    }
    normalize_whitespace(&pieces.join(" "))
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
