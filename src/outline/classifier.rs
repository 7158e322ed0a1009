//! Heading candidate classification.
//!
//! Each text block is scored against the document's body style with a set
//! of independent additive bonuses. A leading section number (`2.1 Scope`)
//! overrides the score thresholds and fixes the level by its depth.

use regex::Regex;

use super::StyleBaseline;
use crate::model::{HeadingCandidate, HeadingLevel, PageLayout, TextBlock};

/// Blocks smaller than this multiple of the body size are never headings.
pub const MIN_SIZE_RATIO: f32 = 1.05;
/// Size ratio earning the large-font bonus.
pub const LARGE_SIZE_RATIO: f32 = 1.3;
/// Size ratio earning the medium-font bonus.
pub const MEDIUM_SIZE_RATIO: f32 = 1.2;

pub const LARGE_SIZE_BONUS: i32 = 30;
pub const MEDIUM_SIZE_BONUS: i32 = 20;
pub const SMALL_SIZE_BONUS: i32 = 10;
pub const BOLD_BONUS: i32 = 15;
pub const UPPERCASE_BONUS: i32 = 10;
pub const NUMBERING_BONUS: i32 = 25;
pub const CENTERED_BONUS: i32 = 15;
pub const LEFT_MARGIN_BONUS: i32 = 5;

/// Character-length window for the all-caps bonus.
pub const UPPERCASE_LEN: (usize, usize) = (5, 50);
/// Allowed heading length in characters, after trimming.
pub const HEADING_LEN: (usize, usize) = (3, 200);
/// Max distance of the block center from the page center, as a share of page width.
pub const CENTER_TOLERANCE: f32 = 0.15;
/// Left edges below this (layout units) earn the margin bonus.
pub const LEFT_MARGIN_LIMIT: f32 = 100.0;

pub const H1_THRESHOLD: i32 = 35;
pub const H2_THRESHOLD: i32 = 25;
pub const H3_THRESHOLD: i32 = 15;

/// Lines that look like headings by style but never are.
const NON_HEADING_PATTERNS: &[&str] = &[
    r"^version\s+\d+",
    r"^\d{4}$",
    r"^page\s+\d+",
    r"^copyright",
    r"^all rights reserved",
    r"^international\s+software\s+testing",
    r"^qualifications\s+board",
    r"^\s*\d+\s*$",
    r"^[^\w]*$",
    r"^(the|and|or|but|in|on|at|to|for|of|with|by)$",
];

const NUMBERING_PATTERN: &str = r"^(\d+(?:\.\d+)*)\s+(.+)";

/// Scores text blocks and assigns heading levels.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    non_heading: Vec<Regex>,
    numbering: Regex,
}

impl HeadingClassifier {
    /// Create a classifier with the built-in pattern set.
    pub fn new() -> Self {
        let non_heading = NON_HEADING_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
            .collect();
        Self {
            non_heading,
            numbering: Regex::new(NUMBERING_PATTERN).unwrap(),
        }
    }

    /// Whether the text passes the denylist and length filters.
    pub fn is_heading_text(&self, text: &str) -> bool {
        let clean = text.trim();
        if self.non_heading.iter().any(|re| re.is_match(clean)) {
            return false;
        }
        let len = clean.chars().count();
        (HEADING_LEN.0..=HEADING_LEN.1).contains(&len)
    }

    /// Level implied by a leading section number, if any.
    pub fn numbering_level(&self, text: &str) -> Option<HeadingLevel> {
        self.numbering.captures(text).map(|caps| {
            let dots = caps[1].matches('.').count();
            HeadingLevel::from_dot_count(dots)
        })
    }

    /// Classify one block on a page, or reject it.
    pub fn classify(
        &self,
        block: &TextBlock,
        page: &PageLayout,
        baseline: &StyleBaseline,
    ) -> Option<HeadingCandidate> {
        let (text, size, flags) = merge_spans(block)?;
        if text.is_empty() || !self.is_heading_text(&text) {
            return None;
        }

        let is_bold = flags & crate::model::FLAG_BOLD != 0;
        let size_ratio = size / baseline.body_size;
        log::trace!(
            "Analyzing '{}': flags={} bold={} ratio={:.2}",
            text,
            flags,
            is_bold,
            size_ratio
        );

        if size_ratio < MIN_SIZE_RATIO {
            log::trace!("Rejected '{}': size ratio {:.2} too small", text, size_ratio);
            return None;
        }

        let mut score = if size_ratio >= LARGE_SIZE_RATIO {
            LARGE_SIZE_BONUS
        } else if size_ratio >= MEDIUM_SIZE_RATIO {
            MEDIUM_SIZE_BONUS
        } else {
            SMALL_SIZE_BONUS
        };
        log::trace!("'{}': size bonus +{}", text, score);

        if is_bold {
            score += BOLD_BONUS;
            log::trace!("'{}': bold bonus +{}", text, BOLD_BONUS);
        }

        let len = text.chars().count();
        if is_upper(&text) && (UPPERCASE_LEN.0..=UPPERCASE_LEN.1).contains(&len) {
            score += UPPERCASE_BONUS;
            log::trace!("'{}': uppercase bonus +{}", text, UPPERCASE_BONUS);
        }

        if let Some(level) = self.numbering_level(&text) {
            score += NUMBERING_BONUS;
            log::trace!("'{}': numbering bonus +{}", text, NUMBERING_BONUS);
            log::debug!("Numbered heading '{}': score={} level={}", text, score, level);
            return Some(HeadingCandidate {
                level,
                text,
                score,
                page: page.number,
            });
        }

        let page_center = page.width / 2.0;
        if (block.bbox.center_x() - page_center).abs() < page.width * CENTER_TOLERANCE {
            score += CENTERED_BONUS;
            log::trace!("'{}': centered bonus +{}", text, CENTERED_BONUS);
        }

        if block.bbox.x0 < LEFT_MARGIN_LIMIT {
            score += LEFT_MARGIN_BONUS;
            log::trace!("'{}': left margin bonus +{}", text, LEFT_MARGIN_BONUS);
        }

        let level = if score >= H1_THRESHOLD {
            HeadingLevel::H1
        } else if score >= H2_THRESHOLD {
            HeadingLevel::H2
        } else if score >= H3_THRESHOLD {
            HeadingLevel::H3
        } else {
            log::trace!("Rejected '{}': score {} below {}", text, score, H3_THRESHOLD);
            return None;
        };

        log::debug!("Heading '{}': score={} level={}", text, score, level);
        Some(HeadingCandidate {
            level,
            text,
            score,
            page: page.number,
        })
    }
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Space-join the block's non-empty span texts; size and flags come from
/// the first span.
fn merge_spans(block: &TextBlock) -> Option<(String, f32, u32)> {
    let first = block.spans().next()?;
    let text = block
        .spans()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some((text, first.size, first.flags))
}

/// At least one cased character and no lowercase ones.
fn is_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}
