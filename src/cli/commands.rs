use crate::api::models::{IngredientsInput, RecommendRequest, RecommendResponse};
use crate::{Error, Result};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Split a comma-separated tag list
pub fn parse_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Request recommendations from a running server
pub async fn fetch_recommendations(
    server_url: &str,
    request: &RecommendRequest,
) -> Result<RecommendResponse> {
    let client = Client::new();
    let url = format!("{}/api/recommend", server_url.trim_end_matches('/'));

    let response = client.post(&url).json(request).send().await?;

    if response.status().is_client_error() {
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.error)
            .unwrap_or_else(|_| "request rejected".to_string());
        return Err(Error::Validation(message));
    }

    let response = response.error_for_status()?;
    Ok(response.json().await?)
}

/// Print recommendations for the given ingredients
pub async fn recommend(
    server_url: &str,
    ingredients: Vec<String>,
    tags: Option<String>,
    min_calories: Option<f64>,
    max_calories: Option<f64>,
) -> Result<()> {
    let request = RecommendRequest {
        ingredients: IngredientsInput::List(ingredients),
        health_labels: parse_tags(tags.as_deref()),
        min_calories,
        max_calories,
    };

    let response = fetch_recommendations(server_url, &request).await?;
    print_recommendations(&response);

    Ok(())
}

fn print_recommendations(response: &RecommendResponse) {
    if response.results.is_empty() {
        println!("No recipes found");
        return;
    }

    println!("\nFound {} recipes:\n", response.total);

    for (position, recipe) in response.results.iter().enumerate() {
        let name = recipe.name.as_deref().unwrap_or("(unnamed)");
        println!("{:>3}. {} [ID: {}]", position + 1, name, recipe.recipe_id);

        let calories = recipe
            .calories
            .map(|kcal| format!("{kcal:.0} kcal"))
            .unwrap_or_else(|| "calories unknown".to_string());
        println!(
            "     {} matched, {} extra, similarity {:.3}, {}",
            recipe.matched_count, recipe.extra_count, recipe.similarity_score, calories
        );

        if let Some(url) = &recipe.url {
            println!("     {url}");
        }
    }

    if response.results.len() < response.total {
        println!(
            "\n(showing {} of {} matches)",
            response.results.len(),
            response.total
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags(Some("vegan, gluten_free,,")),
            vec!["vegan", "gluten_free"]
        );
        assert!(parse_tags(None).is_empty());
    }
}
