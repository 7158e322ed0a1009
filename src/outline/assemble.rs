//! Title selection and outline assembly.

use crate::model::{HeadingCandidate, Outline, OutlineEntry};

/// Only candidates on these first pages may become the title.
pub const TITLE_MAX_PAGE: u32 = 2;
/// A title must score strictly above this.
pub const TITLE_MIN_SCORE: i32 = 20;
/// A title must be strictly longer than this many characters.
pub const TITLE_MIN_LEN: usize = 10;

/// Pick the document title from early-page candidates.
///
/// The candidate maximizing `(score, text length)` wins, the first one
/// encountered on ties. It is accepted only if it clears both the score
/// and the length minimum.
pub fn select_title(candidates: &[HeadingCandidate]) -> Option<&HeadingCandidate> {
    let mut best: Option<&HeadingCandidate> = None;
    for candidate in candidates.iter().filter(|c| c.page <= TITLE_MAX_PAGE) {
        let key = (candidate.score, candidate.text.chars().count());
        let replace = match best {
            Some(b) => key > (b.score, b.text.chars().count()),
            None => true,
        };
        if replace {
            best = Some(candidate);
        }
    }

    best.filter(|c| c.score > TITLE_MIN_SCORE && c.text.chars().count() > TITLE_MIN_LEN)
}

/// Build the outline: drop candidates matching the title text and order
/// the rest by page, keeping encounter order within a page.
pub fn assemble_outline(candidates: Vec<HeadingCandidate>) -> Outline {
    let title = select_title(&candidates)
        .map(|c| c.text.clone())
        .unwrap_or_default();

    let mut outline: Vec<OutlineEntry> = candidates
        .into_iter()
        .filter(|c| c.text != title)
        .map(OutlineEntry::from)
        .collect();
    // sort_by_key is stable
    outline.sort_by_key(|e| e.page);

    Outline { title, outline }
}
