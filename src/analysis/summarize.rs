//! Extractive summaries: the sentences of a section closest to the query,
//! in their original order.

use regex::Regex;

use crate::embed::{cosine_similarity, Embedder};
use crate::error::Result;

/// Terminal punctuation followed by whitespace.
const SENTENCE_BOUNDARY: &str = r"[.!?]\s+";

/// Picks the query-relevant sentences of a text.
#[derive(Debug, Clone)]
pub struct Summarizer {
    max_sentences: usize,
    min_sentence_tokens: usize,
    boundary: Regex,
}

impl Summarizer {
    /// Keep up to `max_sentences` sentences that have strictly more than
    /// `min_sentence_tokens` whitespace tokens.
    pub fn new(max_sentences: usize, min_sentence_tokens: usize) -> Self {
        Self {
            max_sentences,
            min_sentence_tokens,
            boundary: Regex::new(SENTENCE_BOUNDARY).unwrap(),
        }
    }

    /// Split after `.`, `!` or `?` when followed by whitespace. The
    /// punctuation stays with its sentence; pieces are trimmed.
    pub fn split_sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut sentences = Vec::new();
        let mut last = 0;
        for m in self.boundary.find_iter(text) {
            sentences.push(text[last..m.start() + 1].trim());
            last = m.end();
        }
        sentences.push(text[last..].trim());
        sentences.retain(|s| !s.is_empty());
        sentences
    }

    /// Sentences long enough to be summary material.
    pub fn candidate_sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.split_sentences(text)
            .into_iter()
            .filter(|s| s.split_whitespace().count() > self.min_sentence_tokens)
            .collect()
    }

    /// Summarize `text` against a query embedding.
    ///
    /// Returns `text` unchanged when no sentence qualifies.
    pub fn summarize<E: Embedder + ?Sized>(
        &self,
        text: &str,
        query: &[f32],
        embedder: &E,
    ) -> Result<String> {
        let sentences = self.candidate_sentences(text);
        if sentences.is_empty() {
            return Ok(text.to_string());
        }

        let embeddings = embedder.embed(&sentences)?;
        let mut scored: Vec<(usize, f32)> = embeddings
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(query, v)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.max_sentences);

        let mut keep: Vec<usize> = scored.into_iter().map(|(i, _)| i).collect();
        keep.sort_unstable();

        Ok(keep
            .into_iter()
            .map(|i| sentences[i])
            .collect::<Vec<_>>()
            .join(" "))
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(4, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Scores a sentence by how many times it mentions "beach".
    struct KeywordEmbedder;

    impl Embedder for KeywordEmbedder {
        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let hits = t.to_lowercase().matches("beach").count() as f32;
                    vec![hits, 1.0]
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Embedding("offline".to_string()))
        }

        fn dimensions(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_split_sentences() {
        let s = Summarizer::default();
        assert_eq!(
            s.split_sentences("One two. Three four!  Five six? Seven"),
            ["One two.", "Three four!", "Five six?", "Seven"]
        );
        assert_eq!(s.split_sentences("Version 2.5 is out."), ["Version 2.5 is out."]);
        assert!(s.split_sentences("   ").is_empty());
    }

    #[test]
    fn test_short_sentences_filtered() {
        let s = Summarizer::default();
        let text = "Too short here. This sentence has exactly six tokens. Five tokens are not enough.";
        assert_eq!(
            s.candidate_sentences(text),
            ["This sentence has exactly six tokens."]
        );
    }

    #[test]
    fn test_few_sentences_returned_in_original_order() {
        let text = "The old town has narrow streets and cafes. \
                    The beach is a short walk from the station. \
                    Evening markets sell local food and crafts.";
        let summary = Summarizer::default()
            .summarize(text, &[1.0, 0.0], &KeywordEmbedder)
            .unwrap();
        assert_eq!(summary, text);
    }

    #[test]
    fn test_top_sentences_keep_document_order() {
        let text = "First we visit the museum in the morning. \
                    Then the beach club opens its doors at noon. \
                    Lunch is served on the terrace by the harbor. \
                    The beach beach volleyball courts fill up quickly. \
                    Dinner reservations should be made a week ahead. \
                    A quiet beach cove lies north of the town.";
        let summary = Summarizer::new(2, 5)
            .summarize(text, &[1.0, 0.0], &KeywordEmbedder)
            .unwrap();
        assert_eq!(
            summary,
            "Then the beach club opens its doors at noon. \
             The beach beach volleyball courts fill up quickly."
        );
    }

    #[test]
    fn test_no_candidates_returns_text() {
        let text = "Short one. Also short.";
        let summary = Summarizer::default()
            .summarize(text, &[1.0, 0.0], &FailingEmbedder)
            .unwrap();
        assert_eq!(summary, text);
    }

    #[test]
    fn test_embedder_failure_propagates() {
        let text = "This sentence is long enough to be embedded here.";
        let result = Summarizer::default().summarize(text, &[1.0], &FailingEmbedder);
        assert!(result.is_err());
    }
}
