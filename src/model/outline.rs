//! Outline types: heading levels, candidates and the persisted outline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Heading level of an outline entry.
///
/// Variants are ordered from most to least significant, so `H1 < H2 < H3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Numeric rank used for structural comparisons. The document title
    /// ranks 0, one above every heading level.
    pub fn rank(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Level implied by the number of dots in a section number
    /// (`3` → H1, `2.1` → H2, `1.2.1` and deeper → H3).
    pub fn from_dot_count(dots: usize) -> Self {
        match dots {
            0 => HeadingLevel::H1,
            1 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A text block provisionally classified as a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCandidate {
    /// Assigned level
    pub level: HeadingLevel,
    /// Merged block text
    pub text: String,
    /// Additive heuristic score
    pub score: i32,
    /// Page number (1-indexed)
    pub page: u32,
}

/// One heading in the persisted outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

impl From<HeadingCandidate> for OutlineEntry {
    fn from(candidate: HeadingCandidate) -> Self {
        Self {
            level: candidate.level,
            text: candidate.text,
            page: candidate.page,
        }
    }
}

/// Title plus page-ordered headings of one document.
///
/// This is the hand-off artifact between the outline and analysis stages;
/// its JSON form is `{"title": ..., "outline": [{"level", "text", "page"}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Detected title, empty when none qualified
    pub title: String,
    /// Headings, non-decreasing by page
    pub outline: Vec<OutlineEntry>,
}

impl Outline {
    /// Check if the outline has neither a title nor headings.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.outline.is_empty()
    }

    /// Number of headings at the given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.outline.iter().filter(|e| e.level == level).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(HeadingLevel::H1 < HeadingLevel::H2);
        assert!(HeadingLevel::H2 < HeadingLevel::H3);
        assert_eq!(HeadingLevel::H3.rank(), 3);
    }

    #[test]
    fn test_level_from_dot_count() {
        assert_eq!(HeadingLevel::from_dot_count(0), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_dot_count(1), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_dot_count(2), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_dot_count(5), HeadingLevel::H3);
    }

    #[test]
    fn test_outline_json_shape() {
        let outline = Outline {
            title: "Annual Report 2024".to_string(),
            outline: vec![OutlineEntry {
                level: HeadingLevel::H2,
                text: "2.1 Scope".to_string(),
                page: 3,
            }],
        };
        let json = serde_json::to_value(&outline).unwrap();
        assert_eq!(json["title"], "Annual Report 2024");
        assert_eq!(json["outline"][0]["level"], "H2");
        assert_eq!(json["outline"][0]["page"], 3);

        let back: Outline = serde_json::from_value(json).unwrap();
        assert_eq!(back, outline);
    }
}
