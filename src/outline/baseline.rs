//! Body-text style detection.

use std::collections::HashMap;

use crate::model::PageLayout;

/// Body size assumed when a document has no text spans.
pub const FALLBACK_BODY_SIZE: f32 = 12.0;

/// The dominant (body-text) style of a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleBaseline {
    /// Font size of the most frequent (size, flags) pair
    pub body_size: f32,
}

impl Default for StyleBaseline {
    fn default() -> Self {
        Self {
            body_size: FALLBACK_BODY_SIZE,
        }
    }
}

impl StyleBaseline {
    /// Count every span by exact (size, flags) and take the modal size.
    ///
    /// Ties go to the pair encountered first.
    pub fn collect(pages: &[PageLayout]) -> Self {
        // (size bits, flags) -> (count, first seen)
        let mut histogram: HashMap<(u32, u32), (usize, usize)> = HashMap::new();
        let spans = pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .flat_map(|b| b.spans());

        for (order, span) in spans.enumerate() {
            histogram
                .entry((span.size.to_bits(), span.flags))
                .or_insert((0, order))
                .0 += 1;
        }

        let modal = histogram
            .into_iter()
            .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
                count_a.cmp(count_b).then(first_b.cmp(first_a))
            });

        match modal {
            Some(((size_bits, _), _)) => Self {
                body_size: f32::from_bits(size_bits),
            },
            None => {
                log::debug!("No text spans found, using fallback body size");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rect, TextBlock, TextLine, TextSpan, FLAG_BOLD};

    fn span(size: f32, flags: u32) -> TextSpan {
        TextSpan::new("x", size, flags, Rect::default())
    }

    fn page_with(spans: Vec<TextSpan>) -> PageLayout {
        PageLayout::letter(1).with_block(TextBlock::from_lines(vec![TextLine::from_spans(spans)]))
    }

    #[test]
    fn test_modal_size_wins() {
        let mut spans = vec![span(18.0, FLAG_BOLD); 3];
        spans.extend(vec![span(10.0, 0); 7]);
        let baseline = StyleBaseline::collect(&[page_with(spans)]);
        assert_eq!(baseline.body_size, 10.0);
    }

    #[test]
    fn test_pairs_counted_separately_by_flags() {
        // 11pt is the most common size overall, but split across two flag sets
        let mut spans = vec![span(11.0, 0); 3];
        spans.extend(vec![span(11.0, FLAG_BOLD); 3]);
        spans.extend(vec![span(9.0, 0); 4]);
        let baseline = StyleBaseline::collect(&[page_with(spans)]);
        assert_eq!(baseline.body_size, 9.0);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let mut spans = vec![span(14.0, 0); 2];
        spans.extend(vec![span(10.0, 0); 2]);
        let baseline = StyleBaseline::collect(&[page_with(spans)]);
        assert_eq!(baseline.body_size, 14.0);
    }

    #[test]
    fn test_empty_document_falls_back() {
        assert_eq!(StyleBaseline::collect(&[]).body_size, FALLBACK_BODY_SIZE);
        let blank = PageLayout::letter(1);
        assert_eq!(StyleBaseline::collect(&[blank]).body_size, 12.0);
    }
}
