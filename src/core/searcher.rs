/// Exhaustive neighbor search over the vocabulary
///
/// Provides nearest/farthest lookups and analogy composition.

use crate::error::{Result, WordArithError};
use crate::model::{Embedding, Vocabulary};
use std::sync::Arc;
use tracing::debug;

/// A vocabulary word returned by a search
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub word: String,
    pub vector: Embedding,
    pub score: f64,
}

/// Handles similarity searches against a shared vocabulary
pub struct Searcher {
    vocab: Arc<Vocabulary>,
}

impl Searcher {
    /// Create a new searcher instance
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Scan the whole vocabulary for the best or worst match
    ///
    /// `query` is normalized first, so each score is the cosine between the
    /// query and a candidate. Candidates equal to the raw `query`, present in
    /// `exclude`, with zero norm or with a non-finite score are skipped. On
    /// ties the first candidate in lexicographic word order wins.
    ///
    /// # Arguments
    /// * `query` - Query vector, any non-zero length
    /// * `exclude` - Vectors that may not be returned
    /// * `want_farthest` - Return the lowest score instead of the highest
    ///
    /// # Returns
    /// * `None` - If `query` has zero norm, is not finite, or every candidate
    ///   was skipped
    pub fn nearest_or_farthest(
        &self,
        query: &Embedding,
        exclude: &[Embedding],
        want_farthest: bool,
    ) -> Option<Neighbor> {
        let Ok(direction) = query.unit() else {
            return None;
        };
        if !direction.is_finite() {
            debug!("query is not finite");
            return None;
        }

        let mut best: Option<(&str, &Embedding, f64)> = None;
        let mut worst: Option<(&str, &Embedding, f64)> = None;

        for (word, candidate) in self.vocab.iter() {
            if candidate == query || exclude.contains(candidate) {
                continue;
            }
            let Ok(unit) = candidate.unit() else {
                continue;
            };
            let score = direction.dot(&unit);
            if !score.is_finite() {
                continue;
            }

            if best.map_or(true, |(_, _, s)| score > s) {
                best = Some((word, candidate, score));
            }
            if worst.map_or(true, |(_, _, s)| score < s) {
                worst = Some((word, candidate, score));
            }
        }

        let picked = if want_farthest { worst } else { best };
        picked.map(|(word, vector, score)| {
            debug!(word, score, want_farthest, "neighbor found");
            Neighbor {
                word: word.to_string(),
                vector: vector.clone(),
                score,
            }
        })
    }

    /// Analogy query: `sum(positive) - sum(negative)`
    ///
    /// The composite is averaged over all inputs, normalized, and searched
    /// with every input vector excluded from the answer.
    ///
    /// # Returns
    /// * `Ok(None)` - If the composite has zero norm, is not finite, or
    ///   nothing matched
    /// * `Err(WordArithError::InvalidArgument)` - If both lists are empty
    pub fn analogy(
        &self,
        positive: &[Embedding],
        negative: &[Embedding],
        want_farthest: bool,
    ) -> Result<Option<Neighbor>> {
        let count = positive.len() + negative.len();
        if count == 0 {
            return Err(WordArithError::InvalidArgument(
                "analogy needs at least one vector".to_string(),
            ));
        }

        let dimension = self.vocab.dimension();
        let composite = Embedding::sum(dimension, positive)
            .sub(&Embedding::sum(dimension, negative))
            .divide(count as f64);

        if composite.is_zero() || !composite.is_finite() {
            debug!("analogy composite has no usable direction");
            return Ok(None);
        }
        let query = composite.unit()?;

        let exclude: Vec<Embedding> = positive.iter().chain(negative).cloned().collect();

        Ok(self.nearest_or_farthest(&query, &exclude, want_farthest))
    }

    /// Nearest word to a vector, never the vector itself
    pub fn most_similar(&self, vector: &Embedding) -> Option<Neighbor> {
        self.analogy(std::slice::from_ref(vector), &[], false)
            .ok()
            .flatten()
    }

    /// Farthest word from a vector
    pub fn most_different(&self, vector: &Embedding) -> Option<Neighbor> {
        self.analogy(std::slice::from_ref(vector), &[], true)
            .ok()
            .flatten()
    }

    pub fn most_similar_word(&self, word: &str) -> Option<Neighbor> {
        self.most_similar(&self.vocab.lookup_word(word))
    }

    pub fn most_different_word(&self, word: &str) -> Option<Neighbor> {
        self.most_different(&self.vocab.lookup_word(word))
    }

    /// Cosine similarity of two words, `None` if either is unknown
    pub fn words_cosine_similarity(&self, first: &str, second: &str) -> Option<f64> {
        let a = self.vocab.lookup_word(first);
        let b = self.vocab.lookup_word(second);
        a.cosine(&b)
    }
}
