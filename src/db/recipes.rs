use crate::db::{models::RecipeSummary, DbPool};
use crate::error::Result;
use std::collections::HashMap;

/// SQLite caps the number of bound parameters per statement
const MAX_BIND_PARAMS: usize = 500;

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Get calories for a recipe (None when unknown or the recipe is missing)
pub async fn get_calories(pool: &DbPool, recipe_id: i64) -> Result<Option<f64>> {
    let calories: Option<(Option<f64>,)> =
        sqlx::query_as("SELECT calories FROM recipes WHERE id = ?")
            .bind(recipe_id)
            .fetch_optional(pool)
            .await?;

    Ok(calories.and_then(|(kcal,)| kcal))
}

/// Get calories for multiple recipes in batched queries (avoids N+1)
pub async fn get_calories_for_recipes(
    pool: &DbPool,
    recipe_ids: &[i64],
) -> Result<HashMap<i64, f64>> {
    let mut calories = HashMap::with_capacity(recipe_ids.len());

    for chunk in recipe_ids.chunks(MAX_BIND_PARAMS) {
        let query_str = format!(
            "SELECT id, calories FROM recipes WHERE calories IS NOT NULL AND id IN ({})",
            placeholders(chunk.len())
        );

        let mut query = sqlx::query_as::<_, (i64, f64)>(&query_str);
        for id in chunk {
            query = query.bind(id);
        }

        calories.extend(query.fetch_all(pool).await?);
    }

    Ok(calories)
}

/// Get summaries for the given recipes, keyed by id
pub async fn get_recipe_summaries(
    pool: &DbPool,
    recipe_ids: &[i64],
) -> Result<HashMap<i64, RecipeSummary>> {
    let mut summaries = HashMap::with_capacity(recipe_ids.len());

    for chunk in recipe_ids.chunks(MAX_BIND_PARAMS) {
        let query_str = format!(
            "SELECT id, name, url, calories, servings FROM recipes WHERE id IN ({})",
            placeholders(chunk.len())
        );

        let mut query = sqlx::query_as::<_, RecipeSummary>(&query_str);
        for id in chunk {
            query = query.bind(id);
        }

        summaries.extend(query.fetch_all(pool).await?.into_iter().map(|r| (r.id, r)));
    }

    Ok(summaries)
}

/// Count total recipes
pub async fn count_recipes(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}
