use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{category, health_check, snapshot, AppState};
use crate::config::{MonitorConfig, ServerSettings};
use crate::manager::{Manager, Scheduler};
use crate::registry::Registry;

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/services", get(snapshot))
        .route("/api/services/:category", get(category))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind the HTTP listener; `host` may be an IPv4/IPv6 literal or a hostname
pub async fn bind_listener(settings: &ServerSettings) -> std::io::Result<TcpListener> {
    TcpListener::bind((settings.host.as_str(), settings.port)).await
}

/// Build the manager, start probing and serve the snapshot until Ctrl+C
pub async fn run_server(
    config: MonitorConfig,
    registry: Registry,
) -> Result<(), Box<dyn std::error::Error>> {
    let manager = Arc::new(Manager::new(&config, &registry)?);

    let listener = bind_listener(&config.server).await?;
    tracing::info!("Starting Vigil server on {}", listener.local_addr()?);

    let mut scheduler = Scheduler::new(Arc::clone(&manager), config.interval())?;
    let scheduler_handle = scheduler.start();

    let state = Arc::new(AppState {
        manager: Arc::clone(&manager),
    });
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    scheduler_handle.await?;

    tracing::info!("Vigil server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, stopping scheduler...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProbeDeclaration, ProbeSettings};
    use crate::manager::mock::ScriptedProber;
    use crate::status::Status;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    fn create_test_manager() -> Arc<Manager> {
        let registry = Registry::new()
            .with_probe("scripted", || Box::new(ScriptedProber::new(vec![Status::Warning])));
        let config = MonitorConfig {
            probes: vec![ProbeDeclaration {
                kind: "scripted".to_string(),
                category: "web".to_string(),
                name: "api".to_string(),
                config: ProbeSettings {
                    target: "http://api.local".to_string(),
                    ..Default::default()
                },
            }],
            ..Default::default()
        };
        Arc::new(Manager::new(&config, &registry).unwrap())
    }

    fn create_test_app(manager: Arc<Manager>) -> Router {
        build_router(Arc::new(AppState { manager }))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_test_app(create_test_manager());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_snapshot_before_and_after_round() {
        let manager = create_test_manager();
        let app = create_test_app(Arc::clone(&manager));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/services")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["last_update"].is_null());
        assert_eq!(body["services"]["web"][0]["status"], "UNKNOWN");

        manager.probe_all().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/services")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert!(body["last_update"].is_string());
        let api = &body["services"]["web"][0];
        assert_eq!(api["name"], "api");
        assert_eq!(api["status"], "WARNING");
        assert_eq!(api["message"], "WARNING #1");
        assert_eq!(api["target"], "http://api.local");
    }

    #[tokio::test]
    async fn test_category_not_found() {
        let app = create_test_app(create_test_manager());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/services/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_category_listing() {
        let app = create_test_app(create_test_manager());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/services/web")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bind_listener_accepts_hostnames() {
        let listener = bind_listener(&ServerSettings {
            host: "localhost".to_string(),
            port: 0,
        })
        .await
        .unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());

        let listener = bind_listener(&ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        })
        .await
        .unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
