//! Deterministic feature-hashing embedder.

use unicode_normalization::UnicodeNormalization;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use super::Embedder;
use crate::error::{Error, Result};
use crate::options::EmbedOptions;

const UNIGRAM_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;

/// Bag-of-words embedder hashing word unigrams and bigrams into a fixed
/// number of signed buckets. Vectors are L2-normalized.
///
/// Features are hashed with seeded XXH3, so vectors are identical across
/// platforms and compiler releases. Runs on the CPU with no model files.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
    seed: u64,
}

impl HashEmbedder {
    /// Create a hashing embedder from embed options.
    pub fn new(options: &EmbedOptions) -> Result<Self> {
        if options.dimensions == 0 {
            return Err(Error::InvalidConfig(
                "embedding dimensions must be at least 1".to_string(),
            ));
        }
        if !options.force_cpu {
            log::info!("Hash embedder has no accelerator backend, running on CPU");
        }
        Ok(Self {
            dimensions: options.dimensions,
            seed: options.seed,
        })
    }

    /// Embed one text.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let tokens = tokenize(text);

        for token in &tokens {
            self.accumulate(&mut vector, token, UNIGRAM_WEIGHT);
        }
        for pair in tokens.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.accumulate(&mut vector, &bigram, BIGRAM_WEIGHT);
        }

        normalize(&mut vector);
        vector
    }

    fn accumulate(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = xxh3_64_with_seed(feature.as_bytes(), self.seed);
        let index = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign * weight;
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// NFKC-normalized, lower-cased alphanumeric words of two or more characters.
fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text.nfkc().collect::<String>().to_lowercase();
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return;
    }
    for value in vector.iter_mut() {
        *value /= norm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::cosine_similarity;

    fn embedder() -> HashEmbedder {
        HashEmbedder::new(&EmbedOptions::default()).unwrap()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Hello, WORLD! A ﬁne-tuned plan"),
            ["hello", "world", "fine", "tuned", "plan"]
        );
    }

    #[test]
    fn test_vectors_are_unit_length_and_deterministic() {
        let e = embedder();
        let a = e.embed_text("beaches and coastal towns");
        let b = e.embed_text("beaches and coastal towns");
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_feature_bucket_follows_seeded_xxh3() {
        for seed in [0, 7] {
            let e = HashEmbedder::new(&EmbedOptions::new().with_seed(seed)).unwrap();
            let v = e.embed_text("Beach");

            let hash = xxh3_64_with_seed(b"beach", seed);
            let index = (hash % 384) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            assert_eq!(v[index], sign);
            assert_eq!(v.iter().filter(|x| **x != 0.0).count(), 1);
        }
    }

    #[test]
    fn test_seed_changes_vectors() {
        let a = HashEmbedder::new(&EmbedOptions::new().with_seed(1)).unwrap();
        let b = HashEmbedder::new(&EmbedOptions::new().with_seed(2)).unwrap();
        let text = "quiet beaches near the old harbour";
        assert_ne!(a.embed_text(text), b.embed_text(text));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let v = embedder().embed_text("  ... ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_lexical_overlap_scores_higher() {
        let e = embedder();
        let query = e.embed_text("nightlife bars and clubs in the city");
        let close = e.embed_text("The city has lively nightlife with bars and clubs");
        let far = e.embed_text("Recipe for a vegetarian lasagna with spinach");
        assert!(cosine_similarity(&query, &close) > cosine_similarity(&query, &far));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let options = EmbedOptions::new().with_dimensions(0);
        assert!(HashEmbedder::new(&options).is_err());
    }
}
