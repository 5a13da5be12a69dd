use crate::db::DbPool;
use crate::error::Result;
use crate::recommend::IngredientRow;

/// Get every recipe/ingredient association
///
/// The ingredient side is LEFT JOINed so a dangling reference surfaces as a
/// NULL name instead of silently disappearing.
pub async fn list_recipe_ingredient_rows(pool: &DbPool) -> Result<Vec<IngredientRow>> {
    let rows: Vec<(Option<i64>, Option<String>)> = sqlx::query_as(
        r#"
        SELECT ri.recipe_id, COALESCE(i.name_norm, i.name) AS ingredient_name
        FROM recipe_ingredients ri
        LEFT JOIN ingredients i ON i.id = ri.ingredient_id
        ORDER BY ri.recipe_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(recipe_id, ingredient_name)| IngredientRow {
            recipe_id,
            ingredient_name,
        })
        .collect())
}

/// Count total ingredients
pub async fn count_ingredients(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ingredients")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_recipe, memory_pool};

    #[tokio::test]
    async fn test_list_rows() {
        let pool = memory_pool().await;
        let pancakes = insert_recipe(&pool, "Pancakes", Some(300.0), &["Eggs", "Flour"], &[]).await;
        let fish = insert_recipe(&pool, "Fish", None, &["Fish", "Lemon"], &[]).await;

        let rows = list_recipe_ingredient_rows(&pool).await.unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.contains(&IngredientRow::new(pancakes, "eggs")));
        assert!(rows.contains(&IngredientRow::new(fish, "lemon")));

        assert_eq!(count_ingredients(&pool).await.unwrap(), 4);
    }
}
