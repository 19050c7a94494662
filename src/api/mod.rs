pub mod clases;
pub mod cursos;
pub mod extract;
pub mod response;

use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde_json::{Value, json};
use tower_http::cors::{self, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::AllowedOrigins;
use crate::error::{AppError, ErrorResponse};
use crate::state::AppState;

const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn router(state: AppState, allowed_origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/api/cursos", get(cursos::list_cursos).post(cursos::create_curso))
        .route("/api/cursos/search", get(cursos::search_cursos))
        .route("/api/cursos/estadisticas/por-area", get(cursos::estadisticas_por_area))
        .route("/api/cursos/area/{area}", get(cursos::list_cursos_by_area))
        .route("/api/cursos/estado/{estado}", get(cursos::list_cursos_by_estado))
        .route("/api/cursos/codigo/{codigo}", get(cursos::get_curso_by_codigo))
        .route(
            "/api/cursos/{id}",
            get(cursos::get_curso)
                .put(cursos::update_curso)
                .delete(cursos::delete_curso),
        )
        .route("/api/cursos/{id}/clases", get(cursos::get_curso_with_clases))
        .route("/api/clases", get(clases::list_clases).post(clases::create_clase))
        .route("/api/clases/curso/{curso_id}", get(clases::list_clases_by_curso))
        .route(
            "/api/clases/{id}",
            get(clases::get_clase)
                .put(clases::update_clase)
                .delete(clases::delete_clase),
        )
        .route("/api/clases/{id}/curso", get(clases::get_clase_with_curso))
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &AllowedOrigins) -> CorsLayer {
    match allowed_origins {
        AllowedOrigins::Any => CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any),
        AllowedOrigins::List(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true)
        }
    }
}

async fn index() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Course management API",
        "version": SERVICE_VERSION,
        "endpoints": {
            "health": "/health",
            "cursos": "/api/cursos",
            "clases": "/api/clases",
        },
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Course management service is running",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "version": SERVICE_VERSION,
    }))
}

async fn ready(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1")
        .execute(&state.db)
        .await
        .map_err(AppError::Database)?;
    Ok(StatusCode::OK)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: StatusCode::NOT_FOUND.to_string(),
            message: format!("Route not found: {}", uri.path()),
            errors: Vec::new(),
        }),
    )
}
