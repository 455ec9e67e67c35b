//! Favorito model: the join between a usuario and a cancion

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Cancion, Usuario};

/// Favorito entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorito {
    pub id: i64,
    pub id_usuario: i64,
    pub id_cancion: i64,
    pub fecha_marcado: NaiveDateTime,
}

/// Favorito with both ends of the relationship embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritoDetalle {
    pub id: i64,
    pub id_usuario: i64,
    pub id_cancion: i64,
    pub fecha_marcado: NaiveDateTime,
    pub usuario: Usuario,
    pub cancion: Cancion,
}

/// Payload for marking a cancion as favorite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuevoFavorito {
    pub id_usuario: i64,
    pub id_cancion: i64,
}
