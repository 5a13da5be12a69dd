use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use foodscope::api::{handlers::AppState, routes::create_router};
use foodscope::config::{
    DatabaseConfig, LimitsConfig, RecommenderConfig, ServerConfig, Settings,
};
use foodscope::db;
use foodscope::recommend::{CachePolicy, UnknownTagPolicy};
use tower::ServiceExt;

fn settings() -> Settings {
    settings_with_rate(100)
}

fn settings_with_rate(api_rate_limit: u64) -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            external_url: None,
            api_rate_limit,
        },
        recommender: RecommenderConfig {
            cache_policy: CachePolicy::UntilInvalidated,
            unknown_tag_policy: UnknownTagPolicy::Reject,
            default_min_calories: 0.0,
            default_max_calories: 10000.0,
        },
        limits: LimitsConfig {
            max_query_tokens: 2,
            max_token_length: 64,
            max_results: 1,
            max_request_body_size: 65536,
        },
    }
}

async fn app() -> axum::Router {
    app_with(settings()).await
}

async fn app_with(settings: Settings) -> axum::Router {
    let pool = db::init_pool("sqlite::memory:").await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    sqlx::raw_sql(
        r#"
        INSERT INTO recipes (id, name, url, calories) VALUES
            (1, 'Crepes', 'https://recipes.test/crepes', 150.0),
            (2, 'Sponge cake', NULL, 250.0);
        INSERT INTO ingredients (id, name, name_norm) VALUES
            (1, 'Eggs', 'eggs'), (2, 'Flour', 'flour'), (3, 'Milk', 'milk'), (4, 'Sugar', 'sugar');
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES
            (1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 4);
        INSERT INTO tags (id, name, name_norm) VALUES (1, 'Vegetarian', 'vegetarian');
        INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (1, 1), (2, 1);
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    create_router(AppState::new(pool, settings.clone()), &settings).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_recommend_caps_results_but_reports_total() {
    let app = app().await;

    let response = app
        .oneshot(post_json(
            "/api/recommend",
            r#"{"ingredients": ["eggs", "flour"], "health_labels": ["Vegetarian"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );

    let body = json(response).await;
    assert_eq!(body["recipe_ids"], serde_json::json!([1]));
    assert_eq!(body["total"], 2);
    assert_eq!(body["results"][0]["url"], "https://recipes.test/crepes");
    assert_eq!(body["results"][0]["matched_count"], 2);
}

#[tokio::test]
async fn test_request_errors_are_json_400s() {
    let app = app().await;

    let too_many = app
        .clone()
        .oneshot(post_json(
            "/api/recommend",
            r#"{"ingredients": "eggs flour milk"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(too_many.status(), StatusCode::BAD_REQUEST);
    assert!(json(too_many).await["error"]
        .as_str()
        .unwrap()
        .contains("Too many ingredients"));

    let unknown_tag = app
        .oneshot(post_json(
            "/api/recommend",
            r#"{"ingredients": ["eggs"], "health_labels": ["paleo"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(unknown_tag.status(), StatusCode::BAD_REQUEST);
    assert!(json(unknown_tag).await["error"]
        .as_str()
        .unwrap()
        .contains("paleo"));
}

#[tokio::test]
async fn test_tags_stats_and_invalidation() {
    let app = app().await;

    let tags = json(
        app.clone()
            .oneshot(Request::builder().uri("/api/tags").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(tags["tags"][0]["name"], "vegetarian");
    assert_eq!(tags["tags"][0]["recipe_count"], 2);

    let before = json(
        app.clone()
            .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(before["total_recipes"], 2);
    assert!(before["snapshot"].is_null());

    app.clone()
        .oneshot(post_json("/api/recommend", r#"{"ingredients": ["eggs"]}"#))
        .await
        .unwrap();

    let after = json(
        app.clone()
            .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(after["snapshot"]["recipes"], 2);

    let invalidated = app
        .clone()
        .oneshot(post_json("/api/cache/invalidate", ""))
        .await
        .unwrap();
    assert_eq!(invalidated.status(), StatusCode::OK);

    let ready = json(
        app.oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(ready["ready"], true);
}

#[tokio::test]
async fn test_rate_limit_is_requests_per_second() {
    let app = app_with(settings_with_rate(2)).await;
    let stats = || Request::builder().uri("/api/stats").body(Body::empty()).unwrap();

    let mut statuses = Vec::new();
    for _ in 0..3 {
        statuses.push(app.clone().oneshot(stats()).await.unwrap().status());
    }
    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );

    // Two per second refills one request every 500ms
    tokio::time::sleep(std::time::Duration::from_millis(700)).await;
    assert_eq!(app.oneshot(stats()).await.unwrap().status(), StatusCode::OK);
}
