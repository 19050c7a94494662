use sqlx::SqlitePool;

use crate::db::update::{PartialUpdate, UpdateOutcome};
use crate::models::{Clase, ClaseConCurso, NewClase, UpdateClaseRequest};
use crate::validation::{trimmed, trimmed_opt};

pub async fn fetch_clases(db: &SqlitePool) -> Result<Vec<Clase>, sqlx::Error> {
    sqlx::query_as::<_, Clase>("SELECT * FROM clases ORDER BY id_clases")
        .fetch_all(db)
        .await
}

pub async fn fetch_clases_by_curso(db: &SqlitePool, curso_id: i64) -> Result<Vec<Clase>, sqlx::Error> {
    sqlx::query_as::<_, Clase>("SELECT * FROM clases WHERE curso_id = ? ORDER BY id_clases")
        .bind(curso_id)
        .fetch_all(db)
        .await
}

pub async fn find_clase_by_id(db: &SqlitePool, id: i64) -> Result<Option<Clase>, sqlx::Error> {
    sqlx::query_as::<_, Clase>("SELECT * FROM clases WHERE id_clases = ?")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_clase_with_curso(db: &SqlitePool, id: i64) -> Result<Option<ClaseConCurso>, sqlx::Error> {
    sqlx::query_as::<_, ClaseConCurso>(
        r#"
        SELECT
            c.id_clases,
            c.titulo,
            c.descripcion,
            c.duracion,
            c.curso_id,
            cu.nombre AS curso_nombre,
            cu.creditos
        FROM clases c
        JOIN cursos cu ON cu.id = c.curso_id
        WHERE c.id_clases = ?
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_clase(db: &SqlitePool, new: NewClase) -> Result<Clase, sqlx::Error> {
    sqlx::query_as::<_, Clase>(
        r#"
        INSERT INTO clases (titulo, descripcion, duracion, curso_id)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING *
        "#,
    )
    .bind(new.titulo)
    .bind(new.descripcion)
    .bind(new.duracion)
    .bind(new.curso_id)
    .fetch_one(db)
    .await
}

pub async fn update_clase(
    db: &SqlitePool,
    id: i64,
    req: UpdateClaseRequest,
) -> Result<UpdateOutcome<Clase>, sqlx::Error> {
    let mut update = PartialUpdate::new("clases", "id_clases");
    update
        .set("titulo", req.titulo.map(trimmed))
        .set("descripcion", req.descripcion.map(trimmed_opt))
        .set("duracion", req.duracion)
        .set("curso_id", req.curso_id);

    update.execute(db, id).await
}

pub async fn delete_clase(db: &SqlitePool, id: i64) -> Result<Option<Clase>, sqlx::Error> {
    sqlx::query_as::<_, Clase>("DELETE FROM clases WHERE id_clases = ? RETURNING *")
        .bind(id)
        .fetch_optional(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{cursos, setup_test_db};
    use crate::models::NewCurso;

    async fn seed_curso(pool: &SqlitePool, codigo: &str) -> i64 {
        let curso = cursos::insert_curso(
            pool,
            NewCurso {
                codigo: codigo.to_string(),
                nombre: "Programacion I".to_string(),
                descripcion: None,
                creditos: 5,
                horas_semanales: 4,
                nivel: None,
                area: None,
                prerequisitos: Vec::new(),
                capacidad_maxima: 30,
            },
        )
        .await
        .expect("Failed to insert curso");
        curso.id
    }

    fn new_clase(curso_id: i64, titulo: &str) -> NewClase {
        NewClase {
            titulo: titulo.to_string(),
            descripcion: Some("Primera sesion".to_string()),
            duracion: Some(90),
            curso_id,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_clase() {
        let pool = setup_test_db().await;
        let curso_id = seed_curso(&pool, "PR101").await;

        let clase = insert_clase(&pool, new_clase(curso_id, "Variables"))
            .await
            .expect("Failed to insert clase");
        assert_eq!(clase.titulo, "Variables");
        assert_eq!(clase.curso_id, curso_id);

        let found = find_clase_by_id(&pool, clase.id_clases).await.unwrap().unwrap();
        assert_eq!(found.duracion, Some(90));

        let by_curso = fetch_clases_by_curso(&pool, curso_id).await.unwrap();
        assert_eq!(by_curso.len(), 1);
        assert!(fetch_clases_by_curso(&pool, curso_id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clase_with_curso_joins_parent() {
        let pool = setup_test_db().await;
        let curso_id = seed_curso(&pool, "PR101").await;
        let clase = insert_clase(&pool, new_clase(curso_id, "Bucles")).await.unwrap();

        let joined = find_clase_with_curso(&pool, clase.id_clases).await.unwrap().unwrap();
        assert_eq!(joined.clase.titulo, "Bucles");
        assert_eq!(joined.curso_nombre, "Programacion I");
        assert_eq!(joined.creditos, 5);

        assert!(find_clase_with_curso(&pool, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_clase_with_missing_curso_is_rejected_by_store() {
        let pool = setup_test_db().await;

        let err = insert_clase(&pool, new_clase(42, "Huerfana"))
            .await
            .expect_err("foreign key should reject");
        assert!(err.as_database_error().unwrap().is_foreign_key_violation());
        assert!(fetch_clases(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_clase() {
        let pool = setup_test_db().await;
        let curso_id = seed_curso(&pool, "PR101").await;
        let clase = insert_clase(&pool, new_clase(curso_id, "Variables")).await.unwrap();

        let req = UpdateClaseRequest {
            duracion: Some(None),
            titulo: Some(" Tipos ".to_string()),
            descripcion: Some(Some("  Tipos basicos  ".to_string())),
            ..Default::default()
        };
        let updated = match update_clase(&pool, clase.id_clases, req).await.unwrap() {
            UpdateOutcome::Updated(c) => c,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(updated.titulo, "Tipos");
        assert_eq!(updated.duracion, None);
        assert_eq!(updated.descripcion.as_deref(), Some("Tipos basicos"));
        assert_eq!(updated.curso_id, curso_id);

        let req = UpdateClaseRequest {
            descripcion: Some(Some("   ".to_string())),
            ..Default::default()
        };
        match update_clase(&pool, clase.id_clases, req).await.unwrap() {
            UpdateOutcome::Updated(c) => assert_eq!(c.descripcion, None),
            other => panic!("unexpected outcome: {:?}", other),
        }

        let deleted = delete_clase(&pool, clase.id_clases).await.unwrap();
        assert!(deleted.is_some());
        assert!(delete_clase(&pool, clase.id_clases).await.unwrap().is_none());
    }
}
