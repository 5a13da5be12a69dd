use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

use crate::{
    api::models::*,
    db::{self, SqliteSource},
    recommend::{Constraint, Recommender},
    utils::validation::{validate_ingredient_tokens, validate_tag_names},
    Result,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub recommender: Arc<Recommender<SqliteSource>>,
    pub settings: crate::config::Settings,
}

impl AppState {
    pub fn new(pool: sqlx::SqlitePool, settings: crate::config::Settings) -> Self {
        let recommender = Recommender::new(
            SqliteSource::new(pool.clone()),
            settings.recommender.options(),
        );
        Self {
            pool,
            recommender: Arc::new(recommender),
            settings,
        }
    }
}

/// POST /api/recommend - Rank recipes for the supplied ingredients
pub async fn recommend_recipes(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>> {
    debug!("Recommend request: {:?}", request);

    let tokens = request.ingredients.into_tokens();
    validate_ingredient_tokens(&tokens, &state.settings.limits)?;
    validate_tag_names(&request.health_labels, &state.settings.limits)?;

    let constraint = Constraint::new(
        &request.health_labels,
        request
            .min_calories
            .unwrap_or(state.settings.recommender.default_min_calories),
        request
            .max_calories
            .unwrap_or(state.settings.recommender.default_max_calories),
    )?;

    let mut scored = state
        .recommender
        .recommend_scored(tokens, &constraint)
        .await?;

    let total = scored.len();
    scored.truncate(state.settings.limits.max_results);

    let recipe_ids: Vec<i64> = scored.iter().map(|r| r.recipe_id).collect();
    let summaries = db::recipes::get_recipe_summaries(&state.pool, &recipe_ids).await?;

    let results = scored
        .into_iter()
        .map(|r| {
            let summary = summaries.get(&r.recipe_id);
            RecommendedRecipe {
                recipe_id: r.recipe_id,
                name: summary.map(|s| s.name.clone()),
                url: summary.and_then(|s| s.url.clone()),
                calories: summary.and_then(|s| s.calories),
                matched_count: r.matched_count,
                extra_count: r.extra_count,
                missing_count: r.missing_count,
                similarity_score: r.similarity_score,
            }
        })
        .collect();

    Ok(Json(RecommendResponse {
        recipe_ids,
        results,
        total,
    }))
}

/// GET /api/tags - List health labels with usage counts
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<TagsResponse>> {
    debug!("List tags request");

    let tags = db::tags::get_tags_with_count(&state.pool)
        .await?
        .into_iter()
        .map(|(name, recipe_count)| TagCount { name, recipe_count })
        .collect();

    Ok(Json(TagsResponse { tags }))
}

/// GET /api/stats - Get system statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>> {
    debug!("Get stats request");

    let counts = state.recommender.source().counts().await?;
    let snapshot = state
        .recommender
        .cached_snapshot()
        .await
        .map(|s| SnapshotInfo {
            recipes: s.corpus.len(),
            vocabulary: s.model.vocabulary_len(),
            built_at: s.built_at.to_rfc3339(),
        });

    Ok(Json(Stats {
        total_recipes: counts.recipes,
        total_ingredients: counts.ingredients,
        total_tags: counts.tags,
        snapshot,
    }))
}

/// POST /api/cache/invalidate - Reload the corpus on the next request
pub async fn invalidate_cache(State(state): State<AppState>) -> Result<Json<CacheInvalidated>> {
    state.recommender.invalidate().await;
    Ok(Json(CacheInvalidated { invalidated: true }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    Ok(Json(ReadinessResponse {
        ready: db_healthy,
        database: if db_healthy { "ok" } else { "error" }.to_string(),
    }))
}
