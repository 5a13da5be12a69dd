use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

#[cfg(not(test))]
use {
    crate::Error,
    axum::extract::ConnectInfo,
    std::net::IpAddr,
    std::sync::Arc,
    tower_governor::{governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorLayer},
};

use crate::api::handlers::{self as api_handlers, AppState};
use crate::config::Settings;
use crate::Result;

/// Milliseconds between quota refills for a limit of `rate` requests per second
#[cfg_attr(test, allow(dead_code))]
fn replenish_interval_ms(rate: u64) -> u64 {
    (1000 / rate.max(1)).max(1)
}

/// Burst allowance for a limit of `rate` requests per second
#[cfg_attr(test, allow(dead_code))]
fn burst_size(rate: u64) -> u32 {
    u32::try_from(rate.max(1)).unwrap_or(u32::MAX)
}

/// Create the router with all endpoints
#[cfg_attr(test, allow(unused_variables))]
pub fn create_router(state: AppState, settings: &Settings) -> Result<Router> {
    #[cfg_attr(test, allow(unused_mut))]
    let mut api_routes = Router::new()
        .route("/recommend", post(api_handlers::recommend_recipes))
        .route("/tags", get(api_handlers::list_tags))
        .route("/stats", get(api_handlers::get_stats))
        .route("/cache/invalidate", post(api_handlers::invalidate_cache))
        .with_state(state.clone());

    // Rate limiting only in non-test builds. The key extractor falls back to
    // 127.0.0.1 when the peer address is unavailable; behind a reverse proxy,
    // switch to a header-based extractor.
    #[cfg(not(test))]
    {
        #[derive(Clone, Copy, Debug)]
        struct FallbackIpKeyExtractor;

        impl KeyExtractor for FallbackIpKeyExtractor {
            type Key = IpAddr;

            fn extract<B>(
                &self,
                req: &axum::http::Request<B>,
            ) -> std::result::Result<Self::Key, tower_governor::GovernorError> {
                if let Some(ConnectInfo(addr)) = req
                    .extensions()
                    .get::<ConnectInfo<std::net::SocketAddr>>()
                {
                    return Ok(addr.ip());
                }

                Ok(IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)))
            }
        }

        let governor_conf = GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_millisecond(replenish_interval_ms(settings.server.api_rate_limit))
            .burst_size(burst_size(settings.server.api_rate_limit))
            .finish()
            .ok_or_else(|| Error::Config("Invalid API rate limit configuration".to_string()))?;
        let governor_layer = GovernorLayer {
            config: Arc::new(governor_conf),
        };
        api_routes = api_routes.layer(governor_layer);
    }

    let api_routes = api_routes;

    let health_routes = Router::new()
        .route("/health", get(api_handlers::health_check))
        .route("/ready", get(api_handlers::readiness_check))
        .with_state(state);

    Ok(Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(RequestBodyLimitLayer::new(
            settings.limits.max_request_body_size,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_origin(tower_http::cors::Any)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{insert_recipe, memory_pool};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn create_test_state() -> AppState {
        let pool = memory_pool().await;
        AppState::new(pool, crate::config::test_settings())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn recommend_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/recommend")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_rate_limit_quota() {
        assert_eq!(replenish_interval_ms(100), 10);
        assert_eq!(replenish_interval_ms(2), 500);
        assert_eq!(replenish_interval_ms(1), 1000);
        assert_eq!(replenish_interval_ms(5000), 1);
        assert_eq!(burst_size(100), 100);
        assert_eq!(burst_size(u64::MAX), u32::MAX);
    }

    #[tokio::test]
    async fn test_health_routes_exist() {
        let state = create_test_state().await;
        let app = create_router(state.clone(), &state.settings).unwrap();

        let response = app
            .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_recommend_endpoint() {
        let state = create_test_state().await;
        let r1 = insert_recipe(&state.pool, "Crepes", Some(150.0), &["egg", "flour", "milk"], &[]).await;
        let r2 = insert_recipe(&state.pool, "Cake", Some(250.0), &["egg", "flour", "sugar", "butter"], &[]).await;
        insert_recipe(&state.pool, "Fish", Some(180.0), &["fish", "lemon"], &[]).await;

        let app = create_router(state.clone(), &state.settings).unwrap();
        let response = app
            .oneshot(recommend_request(r#"{"ingredients": "eggs flour"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["recipe_ids"], serde_json::json!([r1, r2]));
        assert_eq!(body["results"][0]["name"], "Crepes");
        assert_eq!(body["total"], 2);
    }

    #[tokio::test]
    async fn test_recommend_rejects_bad_requests() {
        let state = create_test_state().await;
        let app = create_router(state.clone(), &state.settings).unwrap();

        let response = app
            .clone()
            .oneshot(recommend_request(r#"{"ingredients": []}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(recommend_request(
                r#"{"ingredients": ["egg"], "min_calories": 500, "max_calories": 100}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
