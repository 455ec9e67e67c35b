//! Input validation rules for the catalog entities
//!
//! Every check here is a pure function of its input (and, for years, of the
//! current calendar year). Uniqueness of `correo` needs a lookup and lives
//! in the usuario repository, inside the same transaction as the write.

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Serialize;
use std::{fmt, sync::OnceLock};

use crate::models::{
    cancion::{ActualizarCancion, NuevaCancion},
    usuario::{ActualizarUsuario, NuevoUsuario},
};

pub const NOMBRE_MAX: usize = 100;
pub const TITULO_MAX: usize = 200;
pub const ARTISTA_MAX: usize = 100;
pub const ALBUM_MAX: usize = 200;
pub const GENERO_MAX: usize = 50;
pub const CORREO_MAX: usize = 254;

pub const DURACION_MIN: i64 = 1;
pub const DURACION_MAX: i64 = 3600;
pub const ANIO_MIN: i64 = 1900;

pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// A field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Name of the offending field as it appears in the JSON payload
    pub campo: String,
    /// Human-readable reason
    pub motivo: String,
}

impl ValidationError {
    pub fn new(campo: impl Into<String>, motivo: impl Into<String>) -> Self {
        Self {
            campo: campo.into(),
            motivo: motivo.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.campo, self.motivo)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate email format
pub fn validate_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(EMAIL_PATTERN).expect("Failed to compile email regex"));

    email.len() <= CORREO_MAX && regex.is_match(email)
}

/// Validate song duration in seconds
pub fn validate_duration(seconds: i64) -> bool {
    (DURACION_MIN..=DURACION_MAX).contains(&seconds)
}

/// Validate a release year against the current calendar year
pub fn validate_year(year: i64) -> bool {
    validate_year_at(year, current_year())
}

/// Validate a release year against an explicit "current" year
pub fn validate_year_at(year: i64, current_year: i64) -> bool {
    (ANIO_MIN..=current_year).contains(&year)
}

pub fn current_year() -> i64 {
    i64::from(Utc::now().year())
}

/// Format a duration in seconds as `M:SS`
pub fn format_duration(seconds: i64) -> String {
    if seconds <= 0 {
        return "0:00".to_string();
    }

    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn required_text(campo: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::new(campo, "no puede estar vacío"));
    }

    if value.chars().count() > max {
        return Err(ValidationError::new(
            campo,
            format!("debe tener como máximo {} caracteres", max),
        ));
    }

    Ok(value.to_string())
}

fn optional_text(campo: &str, value: Option<&str>, max: usize) -> ValidationResult<Option<String>> {
    value.map(|v| required_text(campo, v, max)).transpose()
}

fn correo(value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if !validate_email(value) {
        return Err(ValidationError::new(
            "correo",
            "debe tener el formato usuario@dominio.tld",
        ));
    }

    Ok(value.to_string())
}

fn duracion(value: i64) -> ValidationResult<i64> {
    if !validate_duration(value) {
        return Err(ValidationError::new(
            "duracion",
            format!(
                "debe estar entre {} y {} segundos",
                DURACION_MIN, DURACION_MAX
            ),
        ));
    }

    Ok(value)
}

fn anio(value: i64, current_year: i64) -> ValidationResult<i64> {
    if !validate_year_at(value, current_year) {
        return Err(ValidationError::new(
            "anio",
            format!("debe estar entre {} y {}", ANIO_MIN, current_year),
        ));
    }

    Ok(value)
}

/// Validate the fields of a usuario, returning the normalised record
pub fn validate_usuario(nombre: &str, correo_input: &str) -> ValidationResult<NuevoUsuario> {
    Ok(NuevoUsuario {
        nombre: required_text("nombre", nombre, NOMBRE_MAX)?,
        correo: correo(correo_input)?,
    })
}

/// Validate a partial usuario update; absent fields stay untouched
pub fn validate_actualizar_usuario(cambios: &ActualizarUsuario) -> ValidationResult<ActualizarUsuario> {
    Ok(ActualizarUsuario {
        nombre: optional_text("nombre", cambios.nombre.as_deref(), NOMBRE_MAX)?,
        correo: cambios.correo.as_deref().map(correo).transpose()?,
    })
}

/// Validate the fields of a cancion, returning the normalised record
pub fn validate_cancion(
    titulo: &str,
    artista: &str,
    duracion_input: i64,
    anio_input: i64,
) -> ValidationResult<NuevaCancion> {
    validate_nueva_cancion(&NuevaCancion {
        titulo: titulo.to_string(),
        artista: artista.to_string(),
        album: None,
        duracion: duracion_input,
        anio: anio_input,
        genero: None,
    })
}

/// Validate a full cancion payload including the optional fields
pub fn validate_nueva_cancion(cancion: &NuevaCancion) -> ValidationResult<NuevaCancion> {
    validate_nueva_cancion_at(cancion, current_year())
}

fn validate_nueva_cancion_at(cancion: &NuevaCancion, current_year: i64) -> ValidationResult<NuevaCancion> {
    Ok(NuevaCancion {
        titulo: required_text("titulo", &cancion.titulo, TITULO_MAX)?,
        artista: required_text("artista", &cancion.artista, ARTISTA_MAX)?,
        album: optional_text("album", cancion.album.as_deref(), ALBUM_MAX)?,
        duracion: duracion(cancion.duracion)?,
        anio: anio(cancion.anio, current_year)?,
        genero: optional_text("genero", cancion.genero.as_deref(), GENERO_MAX)?,
    })
}

/// Validate a partial cancion update; absent fields stay untouched
pub fn validate_actualizar_cancion(cambios: &ActualizarCancion) -> ValidationResult<ActualizarCancion> {
    let year = current_year();

    Ok(ActualizarCancion {
        titulo: optional_text("titulo", cambios.titulo.as_deref(), TITULO_MAX)?,
        artista: optional_text("artista", cambios.artista.as_deref(), ARTISTA_MAX)?,
        album: optional_text("album", cambios.album.as_deref(), ALBUM_MAX)?,
        duracion: cambios.duracion.map(duracion).transpose()?,
        anio: cambios.anio.map(|a| anio(a, year)).transpose()?,
        genero: optional_text("genero", cambios.genero.as_deref(), GENERO_MAX)?,
    })
}
