use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::info;

use crate::api::extract::{ApiPath, ValidatedJson};
use crate::api::response::ApiResponse;
use crate::db::{UpdateOutcome, cursos};
use crate::error::{AppError, AppResult, COURSE_NOT_FOUND};
use crate::models::*;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    term: String,
}

pub async fn list_cursos(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Curso>>>> {
    let cursos = cursos::fetch_cursos(&state.db).await?;
    Ok(Json(ApiResponse::list(cursos)))
}

pub async fn search_cursos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ApiResponse<Vec<Curso>>>> {
    let cursos = cursos::search_cursos(&state.db, &params.term).await?;
    Ok(Json(ApiResponse::list(cursos)))
}

pub async fn estadisticas_por_area(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<AreaCount>>>> {
    let stats = cursos::count_cursos_by_area(&state.db).await?;
    Ok(Json(ApiResponse::list(stats)))
}

pub async fn list_cursos_by_area(
    State(state): State<AppState>,
    ApiPath(area): ApiPath<String>,
) -> AppResult<Json<ApiResponse<Vec<Curso>>>> {
    let cursos = cursos::fetch_cursos_by_area(&state.db, &area).await?;
    if cursos.is_empty() {
        return Err(AppError::NotFound("No courses found for area"));
    }
    Ok(Json(ApiResponse::list(cursos)))
}

pub async fn list_cursos_by_estado(
    State(state): State<AppState>,
    ApiPath(estado): ApiPath<EstadoCurso>,
) -> AppResult<Json<ApiResponse<Vec<Curso>>>> {
    let cursos = cursos::fetch_cursos_by_estado(&state.db, estado).await?;
    Ok(Json(ApiResponse::list(cursos)))
}

pub async fn get_curso_by_codigo(
    State(state): State<AppState>,
    ApiPath(codigo): ApiPath<String>,
) -> AppResult<Json<ApiResponse<Curso>>> {
    let curso = cursos::find_curso_by_codigo(&state.db, &codigo)
        .await?
        .ok_or(AppError::NotFound(COURSE_NOT_FOUND))?;
    Ok(Json(ApiResponse::ok(curso)))
}

pub async fn get_curso(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Curso>>> {
    let curso = cursos::find_curso_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(COURSE_NOT_FOUND))?;
    Ok(Json(ApiResponse::ok(curso)))
}

pub async fn get_curso_with_clases(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<CursoConClases>>> {
    let curso = cursos::fetch_curso_with_clases(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(COURSE_NOT_FOUND))?;
    Ok(Json(ApiResponse::ok(curso)))
}

pub async fn create_curso(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCursoRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Curso>>)> {
    let curso = cursos::insert_curso(&state.db, req.into_new_curso()).await?;
    info!(id = curso.id, codigo = %curso.codigo, "course created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(curso).with_message("Course created")),
    ))
}

pub async fn update_curso(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ValidatedJson(req): ValidatedJson<UpdateCursoRequest>,
) -> AppResult<Json<ApiResponse<Curso>>> {
    match cursos::update_curso(&state.db, id, req).await? {
        UpdateOutcome::Updated(curso) => Ok(Json(ApiResponse::ok(curso).with_message("Course updated"))),
        UpdateOutcome::NotFound => Err(AppError::NotFound(COURSE_NOT_FOUND)),
        UpdateOutcome::NoChanges => Err(AppError::BadRequest("No fields to update".to_string())),
    }
}

pub async fn delete_curso(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Curso>>> {
    let curso = cursos::delete_curso(&state.db, id)
        .await?
        .ok_or(AppError::NotFound(COURSE_NOT_FOUND))?;
    info!(id = curso.id, codigo = %curso.codigo, "course deleted");
    Ok(Json(ApiResponse::ok(curso).with_message("Course deleted")))
}
