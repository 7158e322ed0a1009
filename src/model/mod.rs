//! Document model types for docsift.

mod analysis;
mod layout;
mod outline;
mod section;

pub use analysis::{AnalysisMetadata, AnalysisResult, ExtractedSection, SubsectionAnalysis};
pub use layout::{
    LayoutDocument, PageLayout, Rect, TextBlock, TextLine, TextSpan, FLAG_BOLD, FLAG_ITALIC,
};
pub use outline::{HeadingCandidate, HeadingLevel, Outline, OutlineEntry};
pub use section::{RankedSection, Section};
