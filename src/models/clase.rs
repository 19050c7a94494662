use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validation::{present, trimmed, trimmed_opt};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Clase {
    pub id_clases: i64,
    pub titulo: String,
    pub descripcion: Option<String>,
    pub duracion: Option<i64>,
    pub curso_id: i64,
}

/// A class joined with the name and credits of its course.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClaseConCurso {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub clase: Clase,
    pub curso_nombre: String,
    pub creditos: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClaseRequest {
    #[validate(
        required(message = "titulo is required"),
        length(max = 200, message = "titulo cannot exceed 200 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub titulo: Option<String>,
    pub descripcion: Option<String>,
    #[validate(range(min = 1, message = "duracion must be a positive number"))]
    pub duracion: Option<i64>,
    #[validate(
        required(message = "curso_id is required"),
        range(min = 1, message = "curso_id must be a valid id")
    )]
    pub curso_id: Option<i64>,
}

impl CreateClaseRequest {
    /// Call only on a validated request.
    pub fn into_new_clase(self) -> NewClase {
        NewClase {
            titulo: trimmed(self.titulo.unwrap_or_default()),
            descripcion: trimmed_opt(self.descripcion),
            duracion: self.duracion,
            curso_id: self.curso_id.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClase {
    pub titulo: String,
    pub descripcion: Option<String>,
    pub duracion: Option<i64>,
    pub curso_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClaseRequest {
    #[serde(default, deserialize_with = "present")]
    #[validate(
        length(max = 200, message = "titulo cannot exceed 200 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub descripcion: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(range(min = 1, message = "duracion must be a positive number"))]
    pub duracion: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(range(min = 1, message = "curso_id must be a valid id"))]
    pub curso_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_requires_titulo_and_curso() {
        let req: CreateClaseRequest = serde_json::from_str(r#"{"duracion": 0}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = crate::validation::collect_field_errors(&errors);
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();

        assert_eq!(names, vec!["curso_id", "duracion", "titulo"]);
    }

    #[test]
    fn update_request_allows_clearing_duracion() {
        let req: UpdateClaseRequest = serde_json::from_str(r#"{"duracion": null}"#).unwrap();
        assert_eq!(req.duracion, Some(None));
        assert!(req.validate().is_ok());
    }
}
