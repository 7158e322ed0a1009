//! Embedding layer.
//!
//! Implement [`Embedder`] to plug in a different vector model. All
//! implementations return one vector per input, in input order; cosine
//! similarity between vectors is the only relevance primitive used
//! downstream.

mod hash;
#[cfg(feature = "minilm")]
mod minilm;

pub use hash::HashEmbedder;
#[cfg(feature = "minilm")]
pub use minilm::{select_device, MiniLmEmbedder, MINILM_MODEL_ID};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::options::EmbedOptions;

/// Trait for embedding backends.
pub trait Embedder {
    /// Embed a batch of texts, index-aligned with the input.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Vector dimension produced by this backend.
    fn dimensions(&self) -> usize;

    /// Embed a single text.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text])?
            .pop()
            .ok_or_else(|| Error::Embedding("backend returned no vector".to_string()))
    }
}

/// Cosine similarity; 0.0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

/// Backend chosen from [`EmbedOptions`]: a sentence-transformer model when
/// `model` is set, the hashing embedder otherwise.
pub enum EmbedBackend {
    Hash(HashEmbedder),
    #[cfg(feature = "minilm")]
    MiniLm(MiniLmEmbedder),
}

impl EmbedBackend {
    /// Build the backend described by `options`.
    pub fn from_options(options: &EmbedOptions) -> Result<Self> {
        match options.model.as_deref() {
            None => Ok(Self::Hash(HashEmbedder::new(options)?)),
            #[cfg(feature = "minilm")]
            Some(_) => Ok(Self::MiniLm(MiniLmEmbedder::new(options)?)),
            #[cfg(not(feature = "minilm"))]
            Some(model) => Err(Error::InvalidConfig(format!(
                "model '{}' requires docsift built with the `minilm` feature",
                model
            ))),
        }
    }

    /// Short backend name for logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hash(_) => "hash",
            #[cfg(feature = "minilm")]
            Self::MiniLm(_) => "minilm",
        }
    }
}

impl Embedder for EmbedBackend {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::Hash(e) => e.embed(texts),
            #[cfg(feature = "minilm")]
            Self::MiniLm(e) => e.embed(texts),
        }
    }

    fn dimensions(&self) -> usize {
        match self {
            Self::Hash(e) => e.dimensions(),
            #[cfg(feature = "minilm")]
            Self::MiniLm(e) => e.dimensions(),
        }
    }
}

/// Splits inputs into fixed-size batches for an inner [`Embedder`].
///
/// Batches may run concurrently; output order always matches input order.
#[derive(Debug, Clone)]
pub struct BatchEmbedder<E> {
    inner: E,
    batch_size: usize,
    parallel: bool,
}

impl<E: Embedder + Sync> BatchEmbedder<E> {
    /// Wrap an embedder with the batch settings from `options`.
    pub fn new(inner: E, options: &EmbedOptions) -> Self {
        Self {
            inner,
            batch_size: options.batch_size.max(1),
            parallel: options.parallel,
        }
    }

    /// Access the wrapped embedder.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn embed_batch(&self, batch: &[&str]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.inner.embed(batch)?;
        if vectors.len() != batch.len() {
            return Err(Error::Embedding(format!(
                "expected {} vectors, got {}",
                batch.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

impl<E: Embedder + Sync> Embedder for BatchEmbedder<E> {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let batches: Vec<Result<Vec<Vec<f32>>>> = if self.parallel {
            texts
                .par_chunks(self.batch_size)
                .map(|batch| self.embed_batch(batch))
                .collect()
        } else {
            texts
                .chunks(self.batch_size)
                .map(|batch| self.embed_batch(batch))
                .collect()
        };

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in batches {
            vectors.extend(batch?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Encodes each text's length; counts calls.
    struct LengthEmbedder {
        calls: AtomicUsize,
    }

    impl Embedder for LengthEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }

        fn dimensions(&self) -> usize {
            1
        }
    }

    struct DroppingEmbedder;

    impl Embedder for DroppingEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().skip(1).map(|_| vec![1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[3.0, 4.0], &[6.0, 8.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_batches_preserve_order() {
        let texts: Vec<String> = (1..=10).map(|n| "x".repeat(n)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        for parallel in [true, false] {
            let options = EmbedOptions::new().with_batch_size(3).with_parallel(parallel);
            let embedder = BatchEmbedder::new(
                LengthEmbedder {
                    calls: AtomicUsize::new(0),
                },
                &options,
            );
            let vectors = embedder.embed(&refs).unwrap();
            let lengths: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
            assert_eq!(lengths, (1..=10).map(|n| n as f32).collect::<Vec<_>>());
            assert_eq!(embedder.inner().calls.load(Ordering::SeqCst), 4);
        }
    }

    #[test]
    fn test_misaligned_backend_is_an_error() {
        let embedder = BatchEmbedder::new(DroppingEmbedder, &EmbedOptions::new());
        let result = embedder.embed(&["a", "b"]);
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[test]
    fn test_backend_defaults_to_hash() {
        let backend = EmbedBackend::from_options(&EmbedOptions::default()).unwrap();
        assert_eq!(backend.name(), "hash");
        assert_eq!(backend.dimensions(), 384);
    }

    #[cfg(not(feature = "minilm"))]
    #[test]
    fn test_model_requires_feature() {
        let options = EmbedOptions::new().with_model("sentence-transformers/all-MiniLM-L6-v2");
        let result = EmbedBackend::from_options(&options);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_input() {
        let embedder = BatchEmbedder::new(DroppingEmbedder, &EmbedOptions::new());
        assert!(embedder.embed(&[]).unwrap().is_empty());
    }
}
