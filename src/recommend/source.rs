use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};

/// One recipe/ingredient association as the store returns it.
///
/// Both columns are optional because a broken join can yield either side as
/// NULL; the corpus builder rejects such rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRow {
    pub recipe_id: Option<i64>,
    pub ingredient_name: Option<String>,
}

impl IngredientRow {
    pub fn new(recipe_id: i64, ingredient_name: impl Into<String>) -> Self {
        Self {
            recipe_id: Some(recipe_id),
            ingredient_name: Some(ingredient_name.into()),
        }
    }
}

/// Read-only access to the recipe store
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Every recipe/ingredient association in the store
    async fn list_recipe_ingredient_rows(&self) -> Result<Vec<IngredientRow>>;

    /// Calories per serving, `None` when the recipe has no nutrition data
    async fn get_calories(&self, recipe_id: i64) -> Result<Option<f64>>;

    /// Normalized tag names attached to a recipe
    async fn get_tags(&self, recipe_id: i64) -> Result<BTreeSet<String>>;

    /// Every tag name the store knows about
    async fn list_tag_names(&self) -> Result<BTreeSet<String>>;

    async fn get_calories_for_recipes(&self, recipe_ids: &[i64]) -> Result<HashMap<i64, f64>> {
        let mut calories = HashMap::with_capacity(recipe_ids.len());
        for &id in recipe_ids {
            if let Some(kcal) = self.get_calories(id).await? {
                calories.insert(id, kcal);
            }
        }
        Ok(calories)
    }

    async fn get_tags_for_recipes(
        &self,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, BTreeSet<String>>> {
        let mut tags = HashMap::with_capacity(recipe_ids.len());
        for &id in recipe_ids {
            tags.insert(id, self.get_tags(id).await?);
        }
        Ok(tags)
    }
}

/// In-memory store used by tests and local experiments
#[derive(Debug, Default)]
pub struct InMemorySource {
    rows: Vec<IngredientRow>,
    calories: HashMap<i64, f64>,
    tags: HashMap<i64, BTreeSet<String>>,
    unavailable: bool,
    row_fetches: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every call fails, as an unreachable store would
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_recipe(mut self, recipe_id: i64, ingredients: &[&str]) -> Self {
        self.rows.extend(
            ingredients
                .iter()
                .map(|name| IngredientRow::new(recipe_id, *name)),
        );
        self
    }

    pub fn with_row(mut self, row: IngredientRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_calories(mut self, recipe_id: i64, calories: f64) -> Self {
        self.calories.insert(recipe_id, calories);
        self
    }

    pub fn with_tags(mut self, recipe_id: i64, tags: &[&str]) -> Self {
        self.tags
            .entry(recipe_id)
            .or_default()
            .extend(tags.iter().map(|t| t.trim().to_lowercase()));
        self
    }

    /// How many times the association rows were read
    pub fn row_fetches(&self) -> usize {
        self.row_fetches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(Error::DataSource("in-memory store is unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataSource for InMemorySource {
    async fn list_recipe_ingredient_rows(&self) -> Result<Vec<IngredientRow>> {
        self.check_available()?;
        self.row_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.clone())
    }

    async fn get_calories(&self, recipe_id: i64) -> Result<Option<f64>> {
        self.check_available()?;
        Ok(self.calories.get(&recipe_id).copied())
    }

    async fn get_tags(&self, recipe_id: i64) -> Result<BTreeSet<String>> {
        self.check_available()?;
        Ok(self.tags.get(&recipe_id).cloned().unwrap_or_default())
    }

    async fn list_tag_names(&self) -> Result<BTreeSet<String>> {
        self.check_available()?;
        Ok(self.tags.values().flatten().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_lookups() {
        let source = InMemorySource::new()
            .with_recipe(1, &["egg", "flour"])
            .with_calories(1, 150.0)
            .with_tags(1, &["Vegetarian", " quick "]);

        let rows = source.list_recipe_ingredient_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(source.row_fetches(), 1);

        assert_eq!(source.get_calories(1).await.unwrap(), Some(150.0));
        assert_eq!(source.get_calories(2).await.unwrap(), None);

        let tags = source.get_tags(1).await.unwrap();
        assert!(tags.contains("vegetarian"));
        assert!(tags.contains("quick"));
        assert!(source.get_tags(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_defaults_skip_missing_calories() {
        let source = InMemorySource::new()
            .with_calories(1, 100.0)
            .with_tags(2, &["vegan"]);

        let calories = source.get_calories_for_recipes(&[1, 2]).await.unwrap();
        assert_eq!(calories.len(), 1);
        assert_eq!(calories[&1], 100.0);

        let tags = source.get_tags_for_recipes(&[1, 2]).await.unwrap();
        assert!(tags[&1].is_empty());
        assert!(tags[&2].contains("vegan"));
    }

    #[tokio::test]
    async fn test_unavailable_source_fails() {
        let source = InMemorySource::unavailable();
        assert!(matches!(
            source.list_recipe_ingredient_rows().await,
            Err(Error::DataSource(_))
        ));
    }
}
