/// Immutable word -> vector store
///
/// Keys are lowercased on the way in. Entries are kept sorted by word so
/// every scan over the vocabulary visits words in the same order, and a
/// hash index gives O(1) point lookups.

use crate::model::Embedding;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Vocabulary {
    dimension: usize,
    entries: Vec<(String, Embedding)>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from `(word, vector)` pairs
    ///
    /// Words are lowercased. When two entries normalize to the same word the
    /// later one wins. Vectors whose dimension differs from `dimension` are
    /// dropped.
    pub fn from_entries<I, S>(dimension: usize, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Embedding)>,
        S: AsRef<str>,
    {
        let mut merged: HashMap<String, Embedding> = HashMap::new();

        for (word, vector) in entries {
            if vector.dimension() != dimension {
                debug!(
                    word = word.as_ref(),
                    got = vector.dimension(),
                    "dropping vector with wrong dimension"
                );
                continue;
            }
            merged.insert(word.as_ref().to_lowercase(), vector);
        }

        let mut entries: Vec<(String, Embedding)> = merged.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (word, _))| (word.clone(), i))
            .collect();

        Self {
            dimension,
            entries,
            index,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(&word.to_lowercase())
    }

    /// Entries in lexicographic order of the normalized word
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Embedding)> {
        self.entries.iter().map(|(w, v)| (w.as_str(), v))
    }

    fn get(&self, normalized: &str) -> Option<&Embedding> {
        self.index.get(normalized).map(|&i| &self.entries[i].1)
    }

    pub fn zero(&self) -> Embedding {
        Embedding::zeros(self.dimension)
    }

    /// Case-insensitive lookup of a single word
    ///
    /// Unknown words and inputs of one character or less give the zero
    /// vector rather than an error.
    pub fn lookup_word(&self, word: &str) -> Embedding {
        if word.chars().count() <= 1 {
            return self.zero();
        }

        self.get(&word.to_lowercase())
            .cloned()
            .unwrap_or_else(|| self.zero())
    }

    /// Average vector of a token sequence
    ///
    /// Empty tokens are dropped first. Repeated tokens count once per
    /// occurrence, both in the sum and in the divisor; unknown tokens add
    /// nothing but still count.
    pub fn lookup_phrase<S: AsRef<str>>(&self, tokens: &[S]) -> Embedding {
        let words: Vec<String> = tokens
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        if words.is_empty() {
            return self.zero();
        }

        let total = words
            .iter()
            .filter_map(|w| self.get(w))
            .fold(self.zero(), |acc, v| acc.add(v));

        total.divide(words.len() as f64)
    }

    /// Phrase lookup over a whitespace-separated sentence
    pub fn lookup_sentence(&self, sentence: &str) -> Embedding {
        let tokens: Vec<&str> = sentence.split_whitespace().collect();
        self.lookup_phrase(&tokens)
    }
}
