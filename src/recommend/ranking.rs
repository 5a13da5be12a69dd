use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::recommend::corpus::Corpus;
use crate::recommend::normalize::IngredientToken;
use crate::recommend::vector::{cosine, VectorModel};

/// Match statistics of one recipe against one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecipe {
    pub recipe_id: i64,
    /// Query ingredients the recipe uses
    pub matched_count: usize,
    /// Recipe ingredients the user did not supply
    pub extra_count: usize,
    /// Query ingredients the recipe does not use
    pub missing_count: usize,
    pub similarity_score: f64,
}

/// Composite ordering: more matches, then fewer extras, then higher similarity
pub fn compare(a: &ScoredRecipe, b: &ScoredRecipe) -> Ordering {
    b.matched_count
        .cmp(&a.matched_count)
        .then_with(|| a.extra_count.cmp(&b.extra_count))
        .then_with(|| b.similarity_score.total_cmp(&a.similarity_score))
}

/// Score every recipe sharing at least one ingredient with the query
///
/// Ties on all keys keep corpus order.
pub fn rank(
    corpus: &Corpus,
    model: &VectorModel,
    query: &BTreeSet<IngredientToken>,
) -> Vec<ScoredRecipe> {
    if query.is_empty() || corpus.is_empty() {
        return Vec::new();
    }

    let query_vector = model.transform(query);

    let mut scored: Vec<ScoredRecipe> = corpus
        .iter()
        .filter_map(|doc| {
            let matched_count = doc.ingredient_set().intersection(query).count();
            if matched_count == 0 {
                return None;
            }

            let similarity_score = model
                .vector_for(doc.recipe_id())
                .map(|v| cosine(&query_vector, v))
                .unwrap_or(0.0);

            Some(ScoredRecipe {
                recipe_id: doc.recipe_id(),
                matched_count,
                extra_count: doc.len() - matched_count,
                missing_count: query.len() - matched_count,
                similarity_score,
            })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(compare);
    scored
}
