use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

use crate::models::Clase;
use crate::validation::{present, trimmed, trimmed_opt};

pub const DEFAULT_CAPACIDAD_MAXIMA: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum EstadoCurso {
    Activo,
    Inactivo,
    Suspendido,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Curso {
    pub id: i64,
    pub codigo: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub creditos: i64,
    pub horas_semanales: i64,
    pub nivel: Option<String>,
    pub area: Option<String>,
    pub estado: EstadoCurso,
    pub prerequisitos: Json<Vec<String>>,
    pub capacidad_maxima: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A course together with its classes, serialized as one flat object.
#[derive(Debug, Clone, Serialize)]
pub struct CursoConClases {
    #[serde(flatten)]
    pub curso: Curso,
    pub clases: Vec<Clase>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AreaCount {
    pub area: String,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCursoRequest {
    #[validate(
        required(message = "codigo is required"),
        length(max = 20, message = "codigo cannot exceed 20 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub codigo: Option<String>,
    #[validate(
        required(message = "nombre is required"),
        length(max = 200, message = "nombre cannot exceed 200 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    #[validate(
        required(message = "creditos is required"),
        range(min = 1, max = 10, message = "creditos must be between 1 and 10")
    )]
    pub creditos: Option<i64>,
    #[validate(
        required(message = "horas_semanales is required"),
        range(min = 1, max = 20, message = "horas_semanales must be between 1 and 20")
    )]
    pub horas_semanales: Option<i64>,
    #[validate(length(max = 50, message = "nivel cannot exceed 50 characters"))]
    pub nivel: Option<String>,
    #[validate(length(max = 100, message = "area cannot exceed 100 characters"))]
    pub area: Option<String>,
    pub prerequisitos: Option<Vec<String>>,
    #[validate(range(min = 1, max = 200, message = "capacidad_maxima must be between 1 and 200"))]
    pub capacidad_maxima: Option<i64>,
}

impl CreateCursoRequest {
    /// Applies trimming and defaults. Call only on a validated request.
    pub fn into_new_curso(self) -> NewCurso {
        NewCurso {
            codigo: trimmed(self.codigo.unwrap_or_default()),
            nombre: trimmed(self.nombre.unwrap_or_default()),
            descripcion: trimmed_opt(self.descripcion),
            creditos: self.creditos.unwrap_or_default(),
            horas_semanales: self.horas_semanales.unwrap_or_default(),
            nivel: trimmed_opt(self.nivel),
            area: trimmed_opt(self.area),
            prerequisitos: self.prerequisitos.unwrap_or_default(),
            capacidad_maxima: self.capacidad_maxima.unwrap_or(DEFAULT_CAPACIDAD_MAXIMA),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCurso {
    pub codigo: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub creditos: i64,
    pub horas_semanales: i64,
    pub nivel: Option<String>,
    pub area: Option<String>,
    pub prerequisitos: Vec<String>,
    pub capacidad_maxima: i64,
}

/// Sparse course changes. `None` leaves the column untouched; `Some(None)`
/// on a nullable column clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCursoRequest {
    #[serde(default, deserialize_with = "present")]
    #[validate(
        length(max = 20, message = "codigo cannot exceed 20 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub codigo: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[validate(
        length(max = 200, message = "nombre cannot exceed 200 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub descripcion: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(range(min = 1, max = 10, message = "creditos must be between 1 and 10"))]
    pub creditos: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    #[validate(range(min = 1, max = 20, message = "horas_semanales must be between 1 and 20"))]
    pub horas_semanales: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 50, message = "nivel cannot exceed 50 characters"))]
    pub nivel: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 100, message = "area cannot exceed 100 characters"))]
    pub area: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub estado: Option<EstadoCurso>,
    #[serde(default, deserialize_with = "present")]
    pub prerequisitos: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(range(min = 1, max = 200, message = "capacidad_maxima must be between 1 and 200"))]
    pub capacidad_maxima: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reports_every_missing_field() {
        let req: CreateCursoRequest = serde_json::from_str(r#"{"creditos": 11}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = crate::validation::collect_field_errors(&errors);
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();

        assert_eq!(names, vec!["codigo", "creditos", "horas_semanales", "nombre"]);
    }

    #[test]
    fn into_new_curso_applies_defaults_and_trims() {
        let req: CreateCursoRequest = serde_json::from_str(
            r#"{"codigo": " CS101 ", "nombre": "Intro", "creditos": 4, "horas_semanales": 3, "area": "  "}"#,
        )
        .unwrap();
        req.validate().unwrap();
        let new = req.into_new_curso();

        assert_eq!(new.codigo, "CS101");
        assert_eq!(new.area, None);
        assert!(new.prerequisitos.is_empty());
        assert_eq!(new.capacidad_maxima, DEFAULT_CAPACIDAD_MAXIMA);
    }

    #[test]
    fn update_request_keeps_explicit_null_for_nullable_fields() {
        let req: UpdateCursoRequest =
            serde_json::from_str(r#"{"area": null, "estado": "INACTIVO"}"#).unwrap();

        assert_eq!(req.area, Some(None));
        assert_eq!(req.estado, Some(EstadoCurso::Inactivo));
        assert_eq!(req.nombre, None);
    }

    #[test]
    fn update_request_rejects_unknown_estado() {
        let result = serde_json::from_str::<UpdateCursoRequest>(r#"{"estado": "CERRADO"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_request_validates_nested_nullable_lengths() {
        let long = "x".repeat(101);
        let req: UpdateCursoRequest =
            serde_json::from_str(&format!(r#"{{"area": "{long}", "creditos": 0}}"#)).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = crate::validation::collect_field_errors(&errors);
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();

        assert_eq!(names, vec!["area", "creditos"]);
    }
}
