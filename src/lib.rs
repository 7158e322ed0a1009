//! # docsift
//!
//! Two-stage document intelligence for PDF collections.
//!
//! The first stage recovers a document's title and H1/H2/H3 outline from
//! typography alone (font size relative to body text, weight, case,
//! numbering and position). The second stage uses those outlines to carve
//! documents into sections, ranks the sections against a persona and a
//! job-to-be-done with diversity-aware selection, and writes extractive
//! summaries of the best ones.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docsift::{extract_outline_file, persist};
//!
//! fn main() -> docsift::Result<()> {
//!     let outline = extract_outline_file("guide.pdf")?;
//!     println!("{}", persist::to_json(&outline, persist::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Outline detection**: title and three heading levels without a PDF outline
//! - **Section segmentation**: heading-to-heading spans across pages
//! - **Diversity-aware ranking**: Maximal Marginal Relevance over a cosine pool
//! - **Extractive summaries**: query-relevant sentences in reading order
//! - **Pluggable embeddings**: implement [`Embedder`] for any vector model
//! - **Parallel processing**: Uses Rayon for documents and embedding batches

pub mod analysis;
pub mod batch;
pub mod embed;
pub mod error;
pub mod model;
pub mod options;
pub mod outline;
pub mod persist;
pub mod source;

// Re-export commonly used types
pub use analysis::{Analyzer, CollectionDocument, QueryPlan};
pub use batch::{analyze_collection, extract_outlines, BatchReport};
pub use embed::{cosine_similarity, BatchEmbedder, EmbedBackend, Embedder, HashEmbedder};
pub use error::{Error, Result};
pub use model::{
    AnalysisMetadata, AnalysisResult, ExtractedSection, HeadingLevel, LayoutDocument, Outline,
    OutlineEntry, PageLayout, Rect, Section, SubsectionAnalysis, TextBlock, TextLine, TextSpan,
};
pub use options::{AnalysisOptions, EmbedOptions, DEFAULT_JOB, DEFAULT_PERSONA};
pub use outline::OutlineExtractor;
pub use persist::JsonFormat;
pub use source::TextSource;

use std::io::Read;
use std::path::Path;

/// Load a PDF file into positioned layout.
///
/// # Example
///
/// ```no_run
/// use docsift::{load_file, TextSource};
///
/// let layout = load_file("guide.pdf").unwrap();
/// println!("Pages: {}", layout.page_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LayoutDocument> {
    source::pdf::load_file(path)
}

/// Load a PDF from bytes.
pub fn load_bytes(data: &[u8]) -> Result<LayoutDocument> {
    source::pdf::load_bytes(data)
}

/// Load a PDF from a reader.
pub fn load_reader<R: Read>(mut reader: R) -> Result<LayoutDocument> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    load_bytes(&data)
}

/// Extract the title and outline of a PDF file.
///
/// # Example
///
/// ```no_run
/// use docsift::extract_outline_file;
///
/// let outline = extract_outline_file("guide.pdf").unwrap();
/// for entry in &outline.outline {
///     println!("{} {} (p. {})", entry.level, entry.text, entry.page);
/// }
/// ```
pub fn extract_outline_file<P: AsRef<Path>>(path: P) -> Result<Outline> {
    let layout = load_file(path)?;
    Ok(OutlineExtractor::new().extract(&layout))
}

/// Extract the title and outline of a PDF held in memory.
pub fn extract_outline_bytes(data: &[u8]) -> Result<Outline> {
    let layout = load_bytes(data)?;
    Ok(OutlineExtractor::new().extract(&layout))
}

/// Builder for running the pipeline with one persona and job.
///
/// # Example
///
/// ```no_run
/// use docsift::Docsift;
///
/// let result = Docsift::new()
///     .with_persona("Food Critic")
///     .with_job("Find the best local restaurants")
///     .with_top_k(3)
///     .analyze_dir("input", "outlines")?;
/// println!("{} sections", result.extracted_sections.len());
/// # Ok::<(), docsift::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Docsift {
    persona: String,
    job: String,
    options: AnalysisOptions,
}

impl Docsift {
    /// Create a builder with the default persona, job and options.
    pub fn new() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            job: DEFAULT_JOB.to_string(),
            options: AnalysisOptions::default(),
        }
    }

    /// Set the persona.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Set the job-to-be-done.
    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = job.into();
        self
    }

    /// Replace the analysis options.
    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the number of sections to select.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.options = self.options.with_top_k_sections(k);
        self
    }

    /// Set the relevance weight λ.
    pub fn with_diversity(mut self, lambda: f32) -> Self {
        self.options = self.options.with_diversity(lambda);
        self
    }

    /// Disable parallel embedding batches.
    pub fn sequential(mut self) -> Self {
        self.options.embed = self.options.embed.sequential();
        self
    }

    /// Persona in effect.
    pub fn persona(&self) -> &str {
        &self.persona
    }

    /// Job in effect.
    pub fn job(&self) -> &str {
        &self.job
    }

    /// Options in effect.
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Run the outline stage over a directory of PDFs.
    pub fn outline_dir<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<BatchReport> {
        extract_outlines(input_dir, output_dir)
    }

    /// Run the analysis stage over a directory of PDFs and their outlines.
    pub fn analyze_dir<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        outline_dir: Q,
    ) -> Result<AnalysisResult> {
        analyze_collection(input_dir, outline_dir, &self.options, &self.persona, &self.job)
    }

    /// Analyze documents already in memory.
    pub fn analyze(&self, documents: &[CollectionDocument<'_>]) -> Result<AnalysisResult> {
        Analyzer::with_default_embedder(self.options.clone())?.analyze(
            documents,
            &self.persona,
            &self.job,
        )
    }
}

impl Default for Docsift {
    fn default() -> Self {
        Self::new()
    }
}
