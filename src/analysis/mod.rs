//! Persona-driven analysis: segment a collection into sections, rank them
//! against a persona/job query and summarize the best ones.

mod query;
mod rank;
mod segment;
mod summarize;

pub use query::{
    expand_query, formulate_query, QueryPlan, ACTION_PHRASE, ACTION_REWRITE, GUIDE_QUALIFIER,
    PLAN_QUALIFIER,
};
pub use rank::{select_diverse, semantic_search, Ranker};
pub use segment::{normalize_whitespace, Segmenter};
pub use summarize::Summarizer;

use chrono::{DateTime, Utc};

use crate::embed::{BatchEmbedder, EmbedBackend, Embedder};
use crate::error::Result;
use crate::model::{
    AnalysisMetadata, AnalysisResult, ExtractedSection, Outline, Section, SubsectionAnalysis,
};
use crate::options::AnalysisOptions;
use crate::source::TextSource;

/// One document of a collection, paired with its outline if it has one.
pub struct CollectionDocument<'a> {
    /// Identifier reported in results (usually the PDF file name)
    pub id: String,
    pub source: &'a dyn TextSource,
    /// `None` when no outline could be found; the document is then skipped
    pub outline: Option<Outline>,
}

impl<'a> CollectionDocument<'a> {
    pub fn new(id: impl Into<String>, source: &'a dyn TextSource, outline: Option<Outline>) -> Self {
        Self {
            id: id.into(),
            source,
            outline,
        }
    }
}

/// The configured embedding backend behind a batcher.
pub type DefaultEmbedder = BatchEmbedder<EmbedBackend>;

/// Runs the analysis stage.
///
/// # Example
///
/// ```
/// use docsift::analysis::{Analyzer, CollectionDocument};
/// use docsift::model::{LayoutDocument, Outline};
/// use docsift::options::AnalysisOptions;
///
/// let analyzer = Analyzer::with_default_embedder(AnalysisOptions::default()).unwrap();
/// let doc = LayoutDocument::new();
/// let docs = [CollectionDocument::new("empty.pdf", &doc, Some(Outline::default()))];
///
/// let result = analyzer.analyze(&docs, "Travel Planner", "Plan a trip.").unwrap();
/// assert!(result.is_empty());
/// assert_eq!(result.metadata.input_documents, ["empty.pdf"]);
/// ```
pub struct Analyzer<E> {
    embedder: E,
    options: AnalysisOptions,
    segmenter: Segmenter,
    ranker: Ranker,
    summarizer: Summarizer,
}

impl Analyzer<DefaultEmbedder> {
    /// Create an analyzer backed by the embedder `options.embed` selects.
    pub fn with_default_embedder(options: AnalysisOptions) -> Result<Self> {
        options.validate()?;
        let inner = EmbedBackend::from_options(&options.embed)?;
        log::debug!("Embedding backend: {}", inner.name());
        let embedder = BatchEmbedder::new(inner, &options.embed);
        Self::new(embedder, options)
    }
}

impl<E: Embedder> Analyzer<E> {
    /// Create an analyzer around an embedding backend.
    pub fn new(embedder: E, options: AnalysisOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            segmenter: Segmenter::new(options.min_section_tokens),
            ranker: Ranker::new(options.top_k_sections, options.pool_size(), options.diversity),
            summarizer: Summarizer::new(options.summary_sentences, options.min_sentence_tokens),
            embedder,
            options,
        })
    }

    /// Options in effect.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Embedding backend in use.
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Analyze a collection, stamping the result with the current time.
    pub fn analyze(
        &self,
        documents: &[CollectionDocument<'_>],
        persona: &str,
        job: &str,
    ) -> Result<AnalysisResult> {
        self.analyze_at(documents, persona, job, Utc::now())
    }

    /// Analyze a collection with an explicit timestamp.
    pub fn analyze_at(
        &self,
        documents: &[CollectionDocument<'_>],
        persona: &str,
        job: &str,
        at: DateTime<Utc>,
    ) -> Result<AnalysisResult> {
        let plan = QueryPlan::new(persona, job);
        log::info!("Query: {}", plan.query);
        log::debug!("Expanded query: {}", plan.expanded);

        let metadata = AnalysisMetadata::new(
            documents.iter().map(|d| d.id.clone()).collect(),
            persona,
            job,
            at,
        );

        let query_embedding = self.embedder.embed_one(&plan.expanded)?;

        let sections = self.collect_sections(documents);
        if sections.is_empty() {
            log::warn!("No sections to rank in {} documents", documents.len());
            return Ok(AnalysisResult::empty(metadata));
        }
        log::info!("Ranking {} sections", sections.len());

        let texts: Vec<&str> = sections
            .iter()
            .map(|s| s.text_for_embedding.as_str())
            .collect();
        let embeddings = self.embedder.embed(&texts)?;
        let ranked = self.ranker.rank(&query_embedding, &sections, &embeddings)?;

        let extracted_sections = ranked.iter().map(ExtractedSection::from).collect();

        let mut subsection_analysis = Vec::new();
        for top in ranked.iter().take(self.options.top_k_subsections) {
            let refined_text = self.summarizer.summarize(
                &top.section.display_text,
                &query_embedding,
                &self.embedder,
            )?;
            subsection_analysis.push(SubsectionAnalysis {
                document: top.section.document_id.clone(),
                page_number: top.section.page_number,
                refined_text,
            });
        }

        Ok(AnalysisResult {
            metadata,
            extracted_sections,
            subsection_analysis,
        })
    }

    /// Sections of every document that has an outline, in collection order.
    pub fn collect_sections(&self, documents: &[CollectionDocument<'_>]) -> Vec<Section> {
        let mut sections = Vec::new();
        for doc in documents {
            match &doc.outline {
                Some(outline) => {
                    sections.extend(self.segmenter.segment(doc.source, &doc.id, outline));
                }
                None => log::warn!("{}: no outline, skipping", doc.id),
            }
        }
        sections
    }
}
