use crate::db::{models::Tag, DbPool};
use crate::error::Result;
use std::collections::{BTreeSet, HashMap};

/// Get tags for a recipe
pub async fn get_recipe_tags(pool: &DbPool, recipe_id: i64) -> Result<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.name_norm
        FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = ?
        ORDER BY t.name_norm
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Get normalized tag names for a recipe
pub async fn get_tag_names_for_recipe(pool: &DbPool, recipe_id: i64) -> Result<BTreeSet<String>> {
    let tags = get_recipe_tags(pool, recipe_id).await?;
    Ok(tags.into_iter().map(|t| t.name_norm).collect())
}

/// Get tags for multiple recipes in a single query (batch loading to avoid N+1)
pub async fn get_tags_for_recipes(
    pool: &DbPool,
    recipe_ids: &[i64],
) -> Result<HashMap<i64, BTreeSet<String>>> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut tags_map: HashMap<i64, BTreeSet<String>> = HashMap::new();

    for chunk in recipe_ids.chunks(500) {
        let placeholders = chunk
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(",");

        let query_str = format!(
            r#"
            SELECT rt.recipe_id, t.name_norm
            FROM recipe_tags rt
            JOIN tags t ON rt.tag_id = t.id
            WHERE rt.recipe_id IN ({placeholders})
            "#
        );

        let mut query = sqlx::query_as::<_, (i64, String)>(&query_str);
        for id in chunk {
            query = query.bind(id);
        }

        for (recipe_id, tag_name) in query.fetch_all(pool).await? {
            tags_map.entry(recipe_id).or_default().insert(tag_name);
        }
    }

    // Ensure all recipe_ids have an entry (even if empty)
    for &recipe_id in recipe_ids {
        tags_map.entry(recipe_id).or_default();
    }

    Ok(tags_map)
}

/// All normalized tag names in the store
pub async fn list_tag_names(pool: &DbPool) -> Result<BTreeSet<String>> {
    let names: Vec<String> = sqlx::query_scalar("SELECT name_norm FROM tags")
        .fetch_all(pool)
        .await?;
    Ok(names.into_iter().collect())
}

/// Get all tags with usage count
pub async fn get_tags_with_count(pool: &DbPool) -> Result<Vec<(String, i64)>> {
    let tags: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT t.name_norm, COUNT(rt.recipe_id) as count
        FROM tags t
        LEFT JOIN recipe_tags rt ON rt.tag_id = t.id
        GROUP BY t.id, t.name_norm
        ORDER BY count DESC, t.name_norm
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Count total tags
pub async fn count_tags(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}
