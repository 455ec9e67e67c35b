//! Usuario model and related payloads

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Usuario entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    pub nombre: String,
    pub correo: String,
    pub fecha_registro: NaiveDateTime,
}

/// Payload for creating or fully replacing a usuario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NuevoUsuario {
    pub nombre: String,
    pub correo: String,
}

/// Payload for a partial usuario update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActualizarUsuario {
    pub nombre: Option<String>,
    pub correo: Option<String>,
}
