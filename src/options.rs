//! Analysis and embedding configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Persona used when none is supplied.
pub const DEFAULT_PERSONA: &str = "Travel Planner";

/// Job-to-be-done used when none is supplied.
pub const DEFAULT_JOB: &str = "Plan a trip of 4 days for a group of 10 college friends.";

/// Options for the embedding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
    /// Texts submitted per embedding call
    pub batch_size: usize,

    /// Embed batches concurrently
    pub parallel: bool,

    /// Keep inference on the CPU even when an accelerator is visible
    pub force_cpu: bool,

    /// Vector dimension of the hashing embedder
    pub dimensions: usize,

    /// Hash seed of the hashing embedder
    pub seed: u64,

    /// Sentence-transformer model (HuggingFace ID or local directory);
    /// `None` selects the hashing embedder
    pub model: Option<String>,
}

impl EmbedOptions {
    /// Create embed options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable or disable parallel batches.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel batches.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set CPU-only execution.
    pub fn with_force_cpu(mut self, force_cpu: bool) -> Self {
        self.force_cpu = force_cpu;
        self
    }

    /// Set vector dimension.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Set hash seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Use a sentence-transformer model instead of the hashing embedder.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            parallel: true,
            force_cpu: true,
            dimensions: 384,
            seed: 0,
            model: None,
        }
    }
}

/// Options for section ranking and summarization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Relevance weight λ of diversity-aware selection (0 = diversity only, 1 = relevance only)
    pub diversity: f32,

    /// Sections to select
    pub top_k_sections: usize,

    /// Top-ranked sections to summarize
    pub top_k_subsections: usize,

    /// Candidate pool size as a multiple of `top_k_sections`
    pub pool_multiplier: usize,

    /// Sentences kept per summary
    pub summary_sentences: usize,

    /// Sections need strictly more tokens than this
    pub min_section_tokens: usize,

    /// Sentences need strictly more tokens than this
    pub min_sentence_tokens: usize,

    /// Embedding options
    pub embed: EmbedOptions,
}

impl AnalysisOptions {
    /// Create analysis options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&data)?;
        options.validate()?;
        Ok(options)
    }

    /// Set diversity weight λ.
    pub fn with_diversity(mut self, diversity: f32) -> Self {
        self.diversity = diversity;
        self
    }

    /// Set number of sections to select.
    pub fn with_top_k_sections(mut self, k: usize) -> Self {
        self.top_k_sections = k;
        self
    }

    /// Set number of sections to summarize.
    pub fn with_top_k_subsections(mut self, k: usize) -> Self {
        self.top_k_subsections = k;
        self
    }

    /// Set candidate pool multiplier.
    pub fn with_pool_multiplier(mut self, multiplier: usize) -> Self {
        self.pool_multiplier = multiplier;
        self
    }

    /// Set embedding options.
    pub fn with_embed(mut self, embed: EmbedOptions) -> Self {
        self.embed = embed;
        self
    }

    /// Size of the stage-one candidate pool.
    pub fn pool_size(&self) -> usize {
        self.top_k_sections.saturating_mul(self.pool_multiplier)
    }

    /// Reject values outside their accepted ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.diversity) {
            return Err(Error::InvalidConfig(format!(
                "diversity must be within [0, 1], got {}",
                self.diversity
            )));
        }
        if self.top_k_sections == 0 {
            return Err(Error::InvalidConfig(
                "top_k_sections must be at least 1".to_string(),
            ));
        }
        if self.summary_sentences == 0 {
            return Err(Error::InvalidConfig(
                "summary_sentences must be at least 1".to_string(),
            ));
        }
        if self.pool_multiplier == 0 {
            return Err(Error::InvalidConfig(
                "pool_multiplier must be at least 1".to_string(),
            ));
        }
        if self.embed.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.embed.dimensions == 0 {
            return Err(Error::InvalidConfig(
                "dimensions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            diversity: 0.5,
            top_k_sections: 5,
            top_k_subsections: 5,
            pool_multiplier: 5,
            summary_sentences: 4,
            min_section_tokens: 10,
            min_sentence_tokens: 5,
            embed: EmbedOptions::default(),
        }
    }
}
