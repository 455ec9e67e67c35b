//! Repositories for database operations
//!
//! Every mutation takes the shared write gate before opening its
//! transaction, so at most one write transaction is in flight and a
//! validation lookup can never race the write it guards. Reads only take
//! a transaction, which gives them a consistent snapshot.

use chrono::{NaiveDateTime, SubsecRound, Utc};
use sqlx::{Row, sqlite::SqliteRow};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    models::{Cancion, FavoritoDetalle, Usuario},
    validation::format_duration,
};

pub mod cancion;
pub mod favorito;
pub mod usuario;

pub use cancion::CancionRepository;
pub use favorito::FavoritoRepository;
pub use usuario::UsuarioRepository;

/// Serialises writers across all repositories
pub type WriteGate = Arc<Mutex<()>>;

pub fn write_gate() -> WriteGate {
    Arc::new(Mutex::new(()))
}

/// Current UTC time at second precision, as stored in the catalog
pub(crate) fn ahora() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

fn col(prefix: &str, name: &str) -> String {
    format!("{}{}", prefix, name)
}

pub(crate) const USUARIO_COLUMNS: &str = "id, nombre, correo, fecha_registro";

pub(crate) const CANCION_COLUMNS: &str =
    "id, titulo, artista, album, duracion, anio, genero, fecha_creacion";

pub(crate) const FAVORITO_DETALLE_SELECT: &str = r#"
    SELECT f.id, f.id_usuario, f.id_cancion, f.fecha_marcado,
           u.id AS u_id, u.nombre AS u_nombre, u.correo AS u_correo,
           u.fecha_registro AS u_fecha_registro,
           c.id AS c_id, c.titulo AS c_titulo, c.artista AS c_artista, c.album AS c_album,
           c.duracion AS c_duracion, c.anio AS c_anio, c.genero AS c_genero,
           c.fecha_creacion AS c_fecha_creacion
    FROM favoritos f
    JOIN usuarios u ON u.id = f.id_usuario
    JOIN canciones c ON c.id = f.id_cancion
"#;

pub(crate) fn map_usuario(row: &SqliteRow, prefix: &str) -> Usuario {
    Usuario {
        id: row.get(col(prefix, "id").as_str()),
        nombre: row.get(col(prefix, "nombre").as_str()),
        correo: row.get(col(prefix, "correo").as_str()),
        fecha_registro: row.get(col(prefix, "fecha_registro").as_str()),
    }
}

pub(crate) fn map_cancion(row: &SqliteRow, prefix: &str) -> Cancion {
    let duracion: i64 = row.get(col(prefix, "duracion").as_str());

    Cancion {
        id: row.get(col(prefix, "id").as_str()),
        titulo: row.get(col(prefix, "titulo").as_str()),
        artista: row.get(col(prefix, "artista").as_str()),
        album: row.get(col(prefix, "album").as_str()),
        duracion,
        duracion_formateada: format_duration(duracion),
        anio: row.get(col(prefix, "anio").as_str()),
        genero: row.get(col(prefix, "genero").as_str()),
        fecha_creacion: row.get(col(prefix, "fecha_creacion").as_str()),
    }
}

pub(crate) fn map_favorito_detalle(row: &SqliteRow) -> FavoritoDetalle {
    FavoritoDetalle {
        id: row.get("id"),
        id_usuario: row.get("id_usuario"),
        id_cancion: row.get("id_cancion"),
        fecha_marcado: row.get("fecha_marcado"),
        usuario: map_usuario(row, "u_"),
        cancion: map_cancion(row, "c_"),
    }
}
