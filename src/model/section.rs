//! Section types carved from documents and ranked against a query.

/// A contiguous span of document text under one heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Heading-prefixed text submitted to the embedder
    pub text_for_embedding: String,
    /// Whitespace-normalized body text
    pub display_text: String,
    /// Source document identifier (file name)
    pub document_id: String,
    /// Heading text that opens the section
    pub section_title: String,
    /// Page of the opening heading (1-indexed)
    pub page_number: u32,
}

impl Section {
    /// Build a section, deriving the embedding text from title and body.
    pub fn new(
        document_id: impl Into<String>,
        section_title: impl Into<String>,
        page_number: u32,
        body: impl Into<String>,
    ) -> Self {
        let section_title = section_title.into();
        let display_text = body.into();
        Self {
            text_for_embedding: format!("Section: {}. Content: {}", section_title, display_text),
            display_text,
            document_id: document_id.into(),
            section_title,
            page_number,
        }
    }
}

/// A section selected by the ranker.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSection {
    pub section: Section,
    /// 1-based position in the final selection order
    pub importance_rank: usize,
    /// Raw cosine similarity to the query embedding
    pub similarity_score: f32,
}
