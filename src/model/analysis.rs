//! Terminal output artifact of the analysis stage.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::RankedSection;

/// Run metadata recorded alongside the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Document identifiers that were submitted
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// ISO-8601 UTC timestamp with a `Z` suffix
    pub timestamp: String,
}

impl AnalysisMetadata {
    /// Create metadata stamped with the given time.
    pub fn new(
        input_documents: Vec<String>,
        persona: impl Into<String>,
        job_to_be_done: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            input_documents,
            persona: persona.into(),
            job_to_be_done: job_to_be_done.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// A ranked section as it appears in the output, without its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub page_number: u32,
    pub importance_rank: usize,
    /// Cosine similarity rounded to four decimal places
    pub similarity_score: f64,
}

impl From<&RankedSection> for ExtractedSection {
    fn from(ranked: &RankedSection) -> Self {
        Self {
            document: ranked.section.document_id.clone(),
            section_title: ranked.section.section_title.clone(),
            page_number: ranked.section.page_number,
            importance_rank: ranked.importance_rank,
            similarity_score: round4(ranked.similarity_score),
        }
    }
}

/// Extractive summary of one top-ranked section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub page_number: u32,
    pub refined_text: String,
}

/// Ranked sections and their summaries for one persona/job query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metadata: AnalysisMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

impl AnalysisResult {
    /// A result with metadata and no sections.
    pub fn empty(metadata: AnalysisMetadata) -> Self {
        Self {
            metadata,
            extracted_sections: Vec::new(),
            subsection_analysis: Vec::new(),
        }
    }

    /// Check if no section was selected.
    pub fn is_empty(&self) -> bool {
        self.extracted_sections.is_empty()
    }
}

fn round4(value: f32) -> f64 {
    (f64::from(value) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;
    use chrono::TimeZone;

    #[test]
    fn test_metadata_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let meta = AnalysisMetadata::new(vec!["a.pdf".into()], "Chef", "Plan a menu", at);
        assert_eq!(meta.timestamp, "2025-03-14T09:26:53.000000Z");
    }

    #[test]
    fn test_extracted_section_rounds_score() {
        let ranked = RankedSection {
            section: Section::new("a.pdf", "Dining", 2, "body"),
            importance_rank: 1,
            similarity_score: 0.123_456,
        };
        let extracted = ExtractedSection::from(&ranked);
        assert_eq!(extracted.similarity_score, 0.1235);
        assert_eq!(extracted.document, "a.pdf");
        assert_eq!(extracted.importance_rank, 1);
    }

    #[test]
    fn test_result_json_keys() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let result = AnalysisResult::empty(AnalysisMetadata::new(vec![], "P", "J", at));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["metadata"]["input_documents"].is_array());
        assert_eq!(json["metadata"]["job_to_be_done"], "J");
        assert_eq!(json["extracted_sections"].as_array().unwrap().len(), 0);
        assert_eq!(json["subsection_analysis"].as_array().unwrap().len(), 0);
        assert!(result.is_empty());
    }
}
