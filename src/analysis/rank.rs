//! Two-stage ranking: cosine candidate pool, then Maximal Marginal
//! Relevance re-ranking.

use std::cmp::Ordering;

use crate::embed::cosine_similarity;
use crate::error::{Error, Result};
use crate::model::{RankedSection, Section};

/// Indices and scores of the `top_k` corpus vectors most similar to the
/// query, best first. Equal scores keep corpus order.
pub fn semantic_search(query: &[f32], corpus: &[Vec<f32>], top_k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = corpus
        .iter()
        .enumerate()
        .map(|(i, v)| (i, cosine_similarity(query, v)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

/// Greedy MMR selection over `candidates` (indices into `corpus`).
///
/// Each step picks the candidate maximizing
/// `lambda * sim(query, c) - (1 - lambda) * max sim(c, selected)`;
/// the first candidate reaching the maximum wins. Returns positions into
/// `candidates` in selection order.
pub fn select_diverse(
    query: &[f32],
    corpus: &[Vec<f32>],
    candidates: &[usize],
    top_k: usize,
    lambda: f32,
) -> Vec<usize> {
    let relevance: Vec<f32> = candidates
        .iter()
        .map(|&c| cosine_similarity(query, &corpus[c]))
        .collect();
    let target = top_k.min(candidates.len());

    let mut selected: Vec<usize> = Vec::with_capacity(target);
    let mut taken = vec![false; candidates.len()];

    while selected.len() < target {
        let mut best: Option<usize> = None;
        let mut best_score = f32::NEG_INFINITY;

        for (pos, &candidate) in candidates.iter().enumerate() {
            if taken[pos] {
                continue;
            }
            let redundancy = selected
                .iter()
                .map(|&s| cosine_similarity(&corpus[candidate], &corpus[candidates[s]]))
                .fold(None, |acc: Option<f32>, sim| Some(acc.map_or(sim, |m| m.max(sim))))
                .unwrap_or(0.0);
            let score = lambda * relevance[pos] - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best = Some(pos);
            }
        }

        let Some(pos) = best else {
            break;
        };
        taken[pos] = true;
        selected.push(pos);
    }

    selected
}

/// Selects a relevant, non-redundant subset of sections.
#[derive(Debug, Clone)]
pub struct Ranker {
    top_k: usize,
    pool_size: usize,
    lambda: f32,
}

impl Ranker {
    /// `lambda` weighs relevance against redundancy.
    pub fn new(top_k: usize, pool_size: usize, lambda: f32) -> Self {
        Self {
            top_k,
            pool_size: pool_size.max(top_k),
            lambda,
        }
    }

    /// Rank sections against a query embedding.
    ///
    /// `embeddings` must be index-aligned with `sections`.
    pub fn rank(
        &self,
        query: &[f32],
        sections: &[Section],
        embeddings: &[Vec<f32>],
    ) -> Result<Vec<RankedSection>> {
        if sections.len() != embeddings.len() {
            return Err(Error::Embedding(format!(
                "{} sections but {} embeddings",
                sections.len(),
                embeddings.len()
            )));
        }

        let pool = semantic_search(query, embeddings, self.pool_size);
        log::debug!("Candidate pool: {} of {} sections", pool.len(), sections.len());

        let candidates: Vec<usize> = pool.iter().map(|(i, _)| *i).collect();
        let picked = select_diverse(query, embeddings, &candidates, self.top_k, self.lambda);

        Ok(picked
            .into_iter()
            .enumerate()
            .map(|(rank, pos)| {
                let (index, score) = pool[pos];
                RankedSection {
                    section: sections[index].clone(),
                    importance_rank: rank + 1,
                    similarity_score: score,
                }
            })
            .collect())
    }
}
