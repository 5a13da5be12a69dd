use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Recipe summary columns used for presentation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub url: Option<String>,
    pub calories: Option<f64>,
    pub servings: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub name_norm: String,
}

/// Store totals reported by the stats endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreCounts {
    pub recipes: i64,
    pub ingredients: i64,
    pub tags: i64,
}
