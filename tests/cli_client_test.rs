use foodscope::api::models::{IngredientsInput, RecommendRequest};
use foodscope::cli::commands::fetch_recommendations;
use foodscope::Error;

fn request() -> RecommendRequest {
    RecommendRequest {
        ingredients: IngredientsInput::List(vec!["egg".to_string(), "flour".to_string()]),
        health_labels: vec!["vegetarian".to_string()],
        min_calories: None,
        max_calories: Some(500.0),
    }
}

#[tokio::test]
async fn test_fetch_recommendations_parses_response() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/recommend")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "ingredients": ["egg", "flour"],
            "health_labels": ["vegetarian"],
            "max_calories": 500.0
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "recipe_ids": [7],
                "results": [{
                    "recipe_id": 7,
                    "name": "Crepes",
                    "url": null,
                    "calories": 150.0,
                    "matched_count": 2,
                    "extra_count": 1,
                    "missing_count": 0,
                    "similarity_score": 0.81
                }],
                "total": 1
            }"#,
        )
        .create_async()
        .await;

    let response = fetch_recommendations(&server.url(), &request())
        .await
        .expect("request failed");

    mock.assert_async().await;
    assert_eq!(response.recipe_ids, vec![7]);
    assert_eq!(response.results[0].name.as_deref(), Some("Crepes"));
    assert_eq!(response.total, 1);
}

#[tokio::test]
async fn test_client_errors_become_validation_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/recommend")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "No usable ingredients in query"}"#)
        .create_async()
        .await;

    let result = fetch_recommendations(&format!("{}/", server.url()), &request()).await;

    match result {
        Err(Error::Validation(message)) => assert_eq!(message, "No usable ingredients in query"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_errors_are_http_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/recommend")
        .with_status(503)
        .with_body(r#"{"error": "Recipe store unavailable"}"#)
        .create_async()
        .await;

    let result = fetch_recommendations(&server.url(), &request()).await;

    assert!(matches!(result, Err(Error::Http(_))));
}
