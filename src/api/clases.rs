use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use crate::api::extract::{ApiPath, ValidatedJson};
use crate::api::response::ApiResponse;
use crate::db::{UpdateOutcome, clases, cursos};
use crate::error::{AppError, AppResult, CLASS_NOT_FOUND, COURSE_NOT_FOUND};
use crate::models::*;
use crate::state::AppState;

pub async fn list_clases(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Clase>>>> {
    let clases = clases::fetch_clases(&state.db).await?;
    Ok(Json(ApiResponse::list(clases)))
}

pub async fn list_clases_by_curso(
    State(state): State<AppState>,
    ApiPath(curso_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<Clase>>>> {
    let clases = clases::fetch_clases_by_curso(&state.db, curso_id).await?;
    Ok(Json(ApiResponse::list(clases)))
}

pub async fn get_clase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Clase>>> {
    let clase = clases::find_clase_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(CLASS_NOT_FOUND))?;
    Ok(Json(ApiResponse::ok(clase)))
}

pub async fn get_clase_with_curso(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<ClaseConCurso>>> {
    let clase = clases::find_clase_with_curso(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(CLASS_NOT_FOUND))?;
    Ok(Json(ApiResponse::ok(clase)))
}

pub async fn create_clase(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateClaseRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Clase>>)> {
    let new = req.into_new_clase();
    ensure_curso_exists(&state, new.curso_id).await?;

    let clase = clases::insert_clase(&state.db, new).await?;
    info!(id = clase.id_clases, curso_id = clase.curso_id, "class created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(clase).with_message("Class created")),
    ))
}

pub async fn update_clase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateClaseRequest>,
) -> AppResult<Json<ApiResponse<Clase>>> {
    if let Some(curso_id) = req.curso_id {
        ensure_curso_exists(&state, curso_id).await?;
    }

    match clases::update_clase(&state.db, id, req).await? {
        UpdateOutcome::Updated(clase) => Ok(Json(ApiResponse::ok(clase).with_message("Class updated"))),
        UpdateOutcome::NotFound => Err(AppError::NotFound(CLASS_NOT_FOUND)),
        UpdateOutcome::NoChanges => Err(AppError::BadRequest("No fields to update".to_string())),
    }
}

pub async fn delete_clase(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Clase>>> {
    let clase = clases::delete_clase(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(CLASS_NOT_FOUND))?;
    info!(id = clase.id_clases, "class deleted");
    Ok(Json(ApiResponse::ok(clase).with_message("Class deleted")))
}

async fn ensure_curso_exists(state: &AppState, curso_id: i64) -> AppResult<()> {
    if cursos::curso_exists(&state.db, curso_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(COURSE_NOT_FOUND))
    }
}
