//! Outline extraction: body-style baseline, heading classification,
//! title selection and outline assembly.

mod assemble;
mod baseline;
mod classifier;

pub use assemble::{assemble_outline, select_title, TITLE_MAX_PAGE, TITLE_MIN_LEN, TITLE_MIN_SCORE};
pub use baseline::{StyleBaseline, FALLBACK_BODY_SIZE};
pub use classifier::*;

use crate::model::{HeadingCandidate, Outline};
use crate::source::TextSource;

/// Runs the outline stage over a document.
///
/// # Example
///
/// ```
/// use docsift::model::{LayoutDocument, PageLayout, Rect, TextBlock, FLAG_BOLD};
/// use docsift::outline::OutlineExtractor;
///
/// let page = PageLayout::letter(1)
///     .with_block(TextBlock::single("Quarterly Results", 20.0, FLAG_BOLD, Rect::new(200.0, 60.0, 412.0, 80.0)))
///     .with_block(TextBlock::single("Revenue grew again.", 10.0, 0, Rect::new(72.0, 100.0, 540.0, 112.0)))
///     .with_block(TextBlock::single("Costs fell slightly.", 10.0, 0, Rect::new(72.0, 120.0, 540.0, 132.0)));
/// let doc = LayoutDocument::from_pages(vec![page]);
///
/// let outline = OutlineExtractor::new().extract(&doc);
/// assert_eq!(outline.title, "Quarterly Results");
/// assert!(outline.outline.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct OutlineExtractor {
    classifier: HeadingClassifier,
}

impl OutlineExtractor {
    /// Create an extractor with the default classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor around a specific classifier.
    pub fn with_classifier(classifier: HeadingClassifier) -> Self {
        Self { classifier }
    }

    /// Every heading candidate in document encounter order.
    pub fn candidates<S: TextSource + ?Sized>(&self, source: &S) -> Vec<HeadingCandidate> {
        let baseline = StyleBaseline::collect(source.pages());
        log::debug!("Body size baseline: {:.1}", baseline.body_size);
        let baseline = &baseline;

        source
            .pages()
            .iter()
            .flat_map(|page| {
                page.blocks
                    .iter()
                    .filter(|block| !block.is_empty())
                    .filter_map(move |block| self.classifier.classify(block, page, baseline))
            })
            .collect()
    }

    /// Extract the title and outline of a document.
    pub fn extract<S: TextSource + ?Sized>(&self, source: &S) -> Outline {
        let candidates = self.candidates(source);
        log::debug!("{} heading candidates", candidates.len());
        assemble_outline(candidates)
    }
}
