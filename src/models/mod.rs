pub mod clase;
pub mod curso;

pub use clase::{Clase, ClaseConCurso, CreateClaseRequest, NewClase, UpdateClaseRequest};
pub use curso::{
    AreaCount, CreateCursoRequest, Curso, CursoConClases, EstadoCurso, NewCurso,
    UpdateCursoRequest,
};
