use serde::{Deserialize, Serialize};

/// Ingredients as a list or as one whitespace-separated string
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum IngredientsInput {
    List(Vec<String>),
    Text(String),
}

impl Default for IngredientsInput {
    fn default() -> Self {
        IngredientsInput::List(Vec::new())
    }
}

impl IngredientsInput {
    pub fn into_tokens(self) -> Vec<String> {
        match self {
            IngredientsInput::List(tokens) => tokens,
            IngredientsInput::Text(text) => text.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Recommendation request body
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub ingredients: IngredientsInput,
    #[serde(default)]
    pub health_labels: Vec<String>,
    pub min_calories: Option<f64>,
    pub max_calories: Option<f64>,
}

/// One ranked recipe with its match statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedRecipe {
    pub recipe_id: i64,
    pub name: Option<String>,
    pub url: Option<String>,
    pub calories: Option<f64>,
    pub matched_count: usize,
    pub extra_count: usize,
    pub missing_count: usize,
    pub similarity_score: f64,
}

/// Recommendation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recipe_ids: Vec<i64>,
    pub results: Vec<RecommendedRecipe>,
    /// Matches before the response was capped
    pub total: usize,
}

/// Tag with usage count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub recipe_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<TagCount>,
}

/// System statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total_recipes: i64,
    pub total_ingredients: i64,
    pub total_tags: i64,
    pub snapshot: Option<SnapshotInfo>,
}

/// The cached corpus snapshot, if one is loaded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub recipes: usize,
    pub vocabulary: usize,
    pub built_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheInvalidated {
    pub invalidated: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: String,
}
