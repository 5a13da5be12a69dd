use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::error::{Error, Result};
use crate::recommend::normalize::{normalize, IngredientToken};
use crate::recommend::source::{DataSource, IngredientRow};

/// The normalized ingredient set of one recipe
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDocument {
    recipe_id: i64,
    ingredient_set: BTreeSet<IngredientToken>,
}

impl RecipeDocument {
    /// Returns `None` for an empty set; such recipes never enter a corpus
    pub fn new(recipe_id: i64, ingredient_set: BTreeSet<IngredientToken>) -> Option<Self> {
        if ingredient_set.is_empty() {
            return None;
        }
        Some(Self {
            recipe_id,
            ingredient_set,
        })
    }

    pub fn recipe_id(&self) -> i64 {
        self.recipe_id
    }

    pub fn ingredient_set(&self) -> &BTreeSet<IngredientToken> {
        &self.ingredient_set
    }

    pub fn len(&self) -> usize {
        self.ingredient_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredient_set.is_empty()
    }
}

/// Recipe documents in ascending `recipe_id` order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    documents: Vec<RecipeDocument>,
}

impl Corpus {
    /// Group association rows into one document per recipe
    pub fn from_rows(rows: impl IntoIterator<Item = IngredientRow>) -> Result<Self> {
        let mut groups: BTreeMap<i64, BTreeSet<IngredientToken>> = BTreeMap::new();

        for (index, row) in rows.into_iter().enumerate() {
            let recipe_id = row.recipe_id.ok_or_else(|| {
                Error::DataSource(format!("ingredient row {index} has no recipe_id"))
            })?;
            let name = row.ingredient_name.ok_or_else(|| {
                Error::DataSource(format!(
                    "ingredient row {index} (recipe {recipe_id}) has no ingredient reference"
                ))
            })?;

            let set = groups.entry(recipe_id).or_default();
            if let Some(token) = normalize(&name) {
                set.insert(token);
            }
        }

        let total = groups.len();
        let documents: Vec<RecipeDocument> = groups
            .into_iter()
            .filter_map(|(id, set)| RecipeDocument::new(id, set))
            .collect();

        if documents.len() < total {
            debug!(
                "Dropped {} recipes with no usable ingredients",
                total - documents.len()
            );
        }

        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[RecipeDocument] {
        &self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecipeDocument> {
        self.documents.iter()
    }

    pub fn get(&self, recipe_id: i64) -> Option<&RecipeDocument> {
        self.documents
            .binary_search_by_key(&recipe_id, RecipeDocument::recipe_id)
            .ok()
            .map(|i| &self.documents[i])
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a RecipeDocument;
    type IntoIter = std::slice::Iter<'a, RecipeDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Load and group the store's recipe/ingredient associations
pub async fn build_corpus(source: &(impl DataSource + ?Sized)) -> Result<Corpus> {
    let rows = source.list_recipe_ingredient_rows().await?;
    let row_count = rows.len();
    let corpus = Corpus::from_rows(rows)?;

    debug!(
        "Built corpus of {} recipes from {} ingredient rows",
        corpus.len(),
        row_count
    );

    Ok(corpus)
}
