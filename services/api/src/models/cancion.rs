//! Cancion model, payloads and search parameters

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Cancion entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancion {
    pub id: i64,
    pub titulo: String,
    pub artista: String,
    pub album: Option<String>,
    /// Duration in seconds
    pub duracion: i64,
    /// Duration as `M:SS`
    pub duracion_formateada: String,
    pub anio: i64,
    pub genero: Option<String>,
    pub fecha_creacion: NaiveDateTime,
}

/// Payload for creating or fully replacing a cancion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuevaCancion {
    pub titulo: String,
    pub artista: String,
    #[serde(default)]
    pub album: Option<String>,
    pub duracion: i64,
    #[serde(alias = "año")]
    pub anio: i64,
    #[serde(default)]
    pub genero: Option<String>,
}

/// Payload for a partial cancion update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActualizarCancion {
    pub titulo: Option<String>,
    pub artista: Option<String>,
    pub album: Option<String>,
    pub duracion: Option<i64>,
    #[serde(alias = "año")]
    pub anio: Option<i64>,
    pub genero: Option<String>,
}

impl From<NuevaCancion> for ActualizarCancion {
    fn from(cancion: NuevaCancion) -> Self {
        Self {
            titulo: Some(cancion.titulo),
            artista: Some(cancion.artista),
            album: cancion.album,
            duracion: Some(cancion.duracion),
            anio: Some(cancion.anio),
            genero: cancion.genero,
        }
    }
}

/// Sortable cancion columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampoOrden {
    Titulo,
    Artista,
    #[serde(alias = "año")]
    Anio,
    Duracion,
    FechaCreacion,
}

impl CampoOrden {
    pub fn columna(self) -> &'static str {
        match self {
            CampoOrden::Titulo => "titulo_busqueda",
            CampoOrden::Artista => "artista_busqueda",
            CampoOrden::Anio => "anio",
            CampoOrden::Duracion => "duracion",
            CampoOrden::FechaCreacion => "fecha_creacion",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orden {
    #[default]
    Asc,
    Desc,
}

impl Orden {
    pub fn sql(self) -> &'static str {
        match self {
            Orden::Asc => "ASC",
            Orden::Desc => "DESC",
        }
    }
}

/// Query parameters for cancion listing and advanced search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusquedaCanciones {
    /// Number of records to skip
    pub skip: Option<i64>,
    /// Page size
    pub limit: Option<i64>,
    /// Case-insensitive substring of the title
    pub titulo: Option<String>,
    /// Case-insensitive substring of the artist
    pub artista: Option<String>,
    /// Case-insensitive substring of the album
    pub album: Option<String>,
    /// Case-insensitive substring of the genre
    pub genero: Option<String>,
    /// Exact release year
    #[serde(alias = "año")]
    pub anio: Option<i64>,
    pub anio_min: Option<i64>,
    pub anio_max: Option<i64>,
    pub duracion_min: Option<i64>,
    pub duracion_max: Option<i64>,
    /// Sort field; insertion order when absent
    pub ordenar_por: Option<CampoOrden>,
    /// Sort direction, ascending by default
    pub orden: Option<Orden>,
}

impl BusquedaCanciones {
    /// Text filters that carry a non-blank needle, lowercased for matching
    pub fn filtros_texto(&self) -> Vec<(&'static str, String)> {
        [
            ("titulo_busqueda", &self.titulo),
            ("artista_busqueda", &self.artista),
            ("album_busqueda", &self.album),
            ("genero_busqueda", &self.genero),
        ]
        .into_iter()
        .filter_map(|(columna, valor)| {
            let valor = valor.as_deref()?.trim();
            (!valor.is_empty()).then(|| (columna, valor.to_lowercase()))
        })
        .collect()
    }

    /// Reject ranges that can never match
    pub fn validar_rangos(&self) -> Result<(), ApiError> {
        if let (Some(min), Some(max)) = (self.anio_min, self.anio_max) {
            if min > max {
                return Err(ApiError::BadRequest(
                    "anio_min must not be greater than anio_max".to_string(),
                ));
            }
        }

        if let (Some(min), Some(max)) = (self.duracion_min, self.duracion_max) {
            if min > max {
                return Err(ApiError::BadRequest(
                    "duracion_min must not be greater than duracion_max".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Inclusive year range after folding the exact-year filter in
    pub fn rango_anio(&self) -> (Option<i64>, Option<i64>) {
        match self.anio {
            Some(anio) => (
                Some(self.anio_min.map_or(anio, |min| min.max(anio))),
                Some(self.anio_max.map_or(anio, |max| max.min(anio))),
            ),
            None => (self.anio_min, self.anio_max),
        }
    }
}
