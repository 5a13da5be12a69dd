//! TF-IDF vector space over recipe ingredient sets.
//!
//! Each distinct ingredient of a recipe counts once (binary term frequency).
//! Terms are weighted by the smoothed inverse document frequency
//! `ln((1 + n) / (1 + df)) + 1` and every vector is L2-normalized, so a rare
//! ingredient carries more of a recipe's direction than a pantry staple.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::recommend::corpus::Corpus;
use crate::recommend::normalize::IngredientToken;

/// Sparse vector of `(term index, weight)` pairs sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_weights(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(index, _)| *index);
        entries.dedup_by_key(|(index, _)| *index);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, w)| *w == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalized(self) -> Self {
        let norm = self.norm();
        if norm == 0.0 {
            return self;
        }
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(index, w)| (index, w / norm))
                .collect(),
        }
    }
}

/// Cosine similarity, `0.0` when either side is the zero vector
pub fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (a.dot(b) / denominator).clamp(0.0, 1.0)
}

/// A TF-IDF model fitted on one corpus snapshot
#[derive(Debug, Clone)]
pub struct VectorModel {
    vocabulary: BTreeMap<IngredientToken, usize>,
    idf: Vec<f64>,
    document_vectors: HashMap<i64, SparseVector>,
}

impl VectorModel {
    pub fn fit(corpus: &Corpus) -> Self {
        let mut document_frequency: BTreeMap<&IngredientToken, usize> = BTreeMap::new();
        for doc in corpus {
            for token in doc.ingredient_set() {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let n = corpus.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (token, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(token.clone(), index);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        let mut model = Self {
            vocabulary,
            idf,
            document_vectors: HashMap::with_capacity(corpus.len()),
        };

        let document_vectors = corpus
            .iter()
            .map(|doc| (doc.recipe_id(), model.transform(doc.ingredient_set())))
            .collect();
        model.document_vectors = document_vectors;

        debug!(
            "Fitted TF-IDF model: {} documents, {} terms",
            corpus.len(),
            model.vocabulary.len()
        );

        model
    }

    /// Project a token set into the fitted space; unseen tokens weigh nothing
    pub fn transform(&self, tokens: &BTreeSet<IngredientToken>) -> SparseVector {
        let weights = tokens
            .iter()
            .filter_map(|token| self.vocabulary.get(token))
            .map(|&index| (index, self.idf[index]))
            .collect();
        SparseVector::from_weights(weights).normalized()
    }

    pub fn vector_for(&self, recipe_id: i64) -> Option<&SparseVector> {
        self.document_vectors.get(&recipe_id)
    }

    pub fn idf(&self, token: &str) -> Option<f64> {
        self.vocabulary.get(token).map(|&index| self.idf[index])
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn document_count(&self) -> usize {
        self.document_vectors.len()
    }
}
