use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

use crate::db::{ingredients, models::StoreCounts, recipes, tags, DbPool};
use crate::error::{Error, Result};
use crate::recommend::{DataSource, IngredientRow};

/// Recipe store backed by the SQLite database
#[derive(Debug, Clone)]
pub struct SqliteSource {
    pool: DbPool,
}

/// Store failures reach the recommender as data source errors
fn store_error(err: Error) -> Error {
    match err {
        Error::Database(e) => Error::DataSource(e.to_string()),
        other => other,
    }
}

impl SqliteSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            recipes: recipes::count_recipes(&self.pool).await?,
            ingredients: ingredients::count_ingredients(&self.pool).await?,
            tags: tags::count_tags(&self.pool).await?,
        })
    }
}

#[async_trait]
impl DataSource for SqliteSource {
    async fn list_recipe_ingredient_rows(&self) -> Result<Vec<IngredientRow>> {
        ingredients::list_recipe_ingredient_rows(&self.pool)
            .await
            .map_err(store_error)
    }

    async fn get_calories(&self, recipe_id: i64) -> Result<Option<f64>> {
        recipes::get_calories(&self.pool, recipe_id)
            .await
            .map_err(store_error)
    }

    async fn get_tags(&self, recipe_id: i64) -> Result<BTreeSet<String>> {
        tags::get_tag_names_for_recipe(&self.pool, recipe_id)
            .await
            .map_err(store_error)
    }

    async fn list_tag_names(&self) -> Result<BTreeSet<String>> {
        tags::list_tag_names(&self.pool).await.map_err(store_error)
    }

    async fn get_calories_for_recipes(&self, recipe_ids: &[i64]) -> Result<HashMap<i64, f64>> {
        recipes::get_calories_for_recipes(&self.pool, recipe_ids)
            .await
            .map_err(store_error)
    }

    async fn get_tags_for_recipes(
        &self,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, BTreeSet<String>>> {
        tags::get_tags_for_recipes(&self.pool, recipe_ids)
            .await
            .map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_recipe, memory_pool};

    #[tokio::test]
    async fn test_source_reads_store() {
        let pool = memory_pool().await;
        let id = insert_recipe(&pool, "Omelette", Some(250.0), &["Eggs"], &["Vegetarian"]).await;
        let source = SqliteSource::new(pool);

        let rows = source.list_recipe_ingredient_rows().await.unwrap();
        assert_eq!(rows, vec![IngredientRow::new(id, "eggs")]);
        assert_eq!(source.get_calories(id).await.unwrap(), Some(250.0));
        assert!(source.get_tags(id).await.unwrap().contains("vegetarian"));

        let counts = source.counts().await.unwrap();
        assert_eq!((counts.recipes, counts.ingredients, counts.tags), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_closed_pool_is_a_data_source_error() {
        let pool = memory_pool().await;
        pool.close().await;
        let source = SqliteSource::new(pool);

        assert!(matches!(
            source.list_recipe_ingredient_rows().await,
            Err(Error::DataSource(_))
        ));
    }
}
