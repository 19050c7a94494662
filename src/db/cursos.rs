use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::db::clases;
use crate::db::update::{PartialUpdate, UpdateOutcome};
use crate::models::{AreaCount, Curso, CursoConClases, EstadoCurso, NewCurso, UpdateCursoRequest};
use crate::validation::{trimmed, trimmed_opt};

pub async fn fetch_cursos(db: &SqlitePool) -> Result<Vec<Curso>, sqlx::Error> {
    sqlx::query_as::<_, Curso>("SELECT * FROM cursos ORDER BY codigo")
        .fetch_all(db)
        .await
}

pub async fn find_curso_by_id(db: &SqlitePool, id: i64) -> Result<Option<Curso>, sqlx::Error> {
    sqlx::query_as::<_, Curso>("SELECT * FROM cursos WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_curso_by_codigo(db: &SqlitePool, codigo: &str) -> Result<Option<Curso>, sqlx::Error> {
    sqlx::query_as::<_, Curso>("SELECT * FROM cursos WHERE codigo = ?")
        .bind(codigo)
        .fetch_optional(db)
        .await
}

pub async fn curso_exists(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM cursos WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

/// Exact area match ignoring case. SQLite's `LOWER` only folds ASCII, so
/// the comparison happens on the Rust side.
pub async fn fetch_cursos_by_area(db: &SqlitePool, area: &str) -> Result<Vec<Curso>, sqlx::Error> {
    let area = area.to_lowercase();
    let cursos = sqlx::query_as::<_, Curso>("SELECT * FROM cursos WHERE area IS NOT NULL ORDER BY codigo")
        .fetch_all(db)
        .await?;

    Ok(cursos
        .into_iter()
        .filter(|c| c.area.as_deref().is_some_and(|a| a.to_lowercase() == area))
        .collect())
}

pub async fn fetch_cursos_by_estado(
    db: &SqlitePool,
    estado: EstadoCurso,
) -> Result<Vec<Curso>, sqlx::Error> {
    sqlx::query_as::<_, Curso>("SELECT * FROM cursos WHERE estado = ? ORDER BY codigo")
        .bind(estado)
        .fetch_all(db)
        .await
}

/// Case-insensitive substring search over codigo, nombre, descripcion and area.
/// The term is matched literally; an empty term matches every course.
pub async fn search_cursos(db: &SqlitePool, term: &str) -> Result<Vec<Curso>, sqlx::Error> {
    let needle = term.to_lowercase();
    let cursos = fetch_cursos(db).await?;
    if needle.is_empty() {
        return Ok(cursos);
    }

    Ok(cursos.into_iter().filter(|c| matches_term(c, &needle)).collect())
}

fn matches_term(curso: &Curso, needle: &str) -> bool {
    [
        Some(curso.codigo.as_str()),
        Some(curso.nombre.as_str()),
        curso.descripcion.as_deref(),
        curso.area.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

pub async fn count_cursos_by_area(db: &SqlitePool) -> Result<Vec<AreaCount>, sqlx::Error> {
    sqlx::query_as::<_, AreaCount>(
        r#"
        SELECT area, COUNT(*) AS count
        FROM cursos
        WHERE area IS NOT NULL
        GROUP BY area
        ORDER BY count DESC, area ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn fetch_curso_with_clases(
    db: &SqlitePool,
    id: i64,
) -> Result<Option<CursoConClases>, sqlx::Error> {
    let Some(curso) = find_curso_by_id(db, id).await? else {
        return Ok(None);
    };
    let clases = clases::fetch_clases_by_curso(db, id).await?;

    Ok(Some(CursoConClases { curso, clases }))
}

pub async fn insert_curso(db: &SqlitePool, new: NewCurso) -> Result<Curso, sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    sqlx::query_as::<_, Curso>(
        r#"
        INSERT INTO cursos
            (codigo, nombre, descripcion, creditos, horas_semanales, nivel, area,
            estado, prerequisitos, capacidad_maxima, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
        RETURNING *
        "#,
    )
    .bind(new.codigo)
    .bind(new.nombre)
    .bind(new.descripcion)
    .bind(new.creditos)
    .bind(new.horas_semanales)
    .bind(new.nivel)
    .bind(new.area)
    .bind(EstadoCurso::Activo)
    .bind(Json(new.prerequisitos))
    .bind(new.capacidad_maxima)
    .bind(now)
    .fetch_one(db)
    .await
}

pub async fn update_curso(
    db: &SqlitePool,
    id: i64,
    req: UpdateCursoRequest,
) -> Result<UpdateOutcome<Curso>, sqlx::Error> {
    let mut update = PartialUpdate::new("cursos", "id");
    update
        .set("codigo", req.codigo.map(trimmed))
        .set("nombre", req.nombre.map(trimmed))
        .set("descripcion", req.descripcion.map(trimmed_opt))
        .set("creditos", req.creditos)
        .set("horas_semanales", req.horas_semanales)
        .set("nivel", req.nivel.map(trimmed_opt))
        .set("area", req.area.map(trimmed_opt))
        .set("estado", req.estado)
        .set("prerequisitos", req.prerequisitos.map(Json))
        .set("capacidad_maxima", req.capacidad_maxima)
        .touch("updated_at", Utc::now().to_rfc3339());

    update.execute(db, id).await
}

pub async fn delete_curso(db: &SqlitePool, id: i64) -> Result<Option<Curso>, sqlx::Error> {
    sqlx::query_as::<_, Curso>("DELETE FROM cursos WHERE id = ? RETURNING *")
        .bind(id)
        .fetch_optional(db)
        .await
}
