//! API documentation generated from the typed endpoint table
//!
//! The published documents are built from [`ENDPOINTS`] and the validation
//! constants. The router is declared separately in `routes`; the integration
//! tests request every [`ENDPOINTS`] entry to keep the two in step.
//! Two documents are produced: the full API documentation
//! (`documentacion_api_musica.json`) and the endpoints index consumed by the
//! frontend (`api_endpoints_para_v0.json`).

use anyhow::{Context, Result};
use serde::Serialize;
use std::{collections::BTreeMap, fs, path::Path};
use tracing::info;

use crate::{
    config::AppConfig,
    validation::{
        ALBUM_MAX, ANIO_MIN, ARTISTA_MAX, DURACION_MAX, DURACION_MIN, EMAIL_PATTERN, GENERO_MAX,
        NOMBRE_MAX, TITULO_MAX,
    },
};

pub const NOMBRE_API: &str = "API de Música";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPCION: &str = "Una API RESTful para gestionar usuarios, canciones y favoritos";

pub const DOCUMENTACION_FILE: &str = "documentacion_api_musica.json";
pub const ENDPOINTS_FILE: &str = "api_endpoints_para_v0.json";

/// HTTP method of a documented endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Metodo {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// One row of the endpoint table
#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    pub metodo: Metodo,
    /// Path relative to the base URL, parameters written as `{name}`
    pub ruta: &'static str,
    pub descripcion: &'static str,
    pub parametros_query: &'static [(&'static str, &'static str)],
    pub codigo_exito: u16,
    /// Listed in the endpoints index as well
    pub principal: bool,
}

const PAGINACION: &[(&str, &str)] = &[
    ("skip", "int (default: 0) - registros a saltar"),
    ("limit", "int (default: 100, max: 100) - máximo de registros"),
];

const BUSQUEDA: &[(&str, &str)] = &[
    ("titulo", "string (opcional) - subcadena del título, sin distinguir mayúsculas"),
    ("artista", "string (opcional) - subcadena del artista, sin distinguir mayúsculas"),
    ("album", "string (opcional) - subcadena del álbum, sin distinguir mayúsculas"),
    ("genero", "string (opcional) - subcadena del género, sin distinguir mayúsculas"),
    ("anio", "int (opcional) - año exacto"),
    ("anio_min", "int (opcional) - año mínimo, inclusive"),
    ("anio_max", "int (opcional) - año máximo, inclusive"),
    ("duracion_min", "int (opcional) - duración mínima en segundos, inclusive"),
    ("duracion_max", "int (opcional) - duración máxima en segundos, inclusive"),
    ("ordenar_por", "titulo | artista | anio | duracion | fecha_creacion (opcional)"),
    ("orden", "asc | desc (default: asc)"),
    ("skip", "int (default: 0) - registros a saltar"),
    ("limit", "int (default: 100, max: 100) - máximo de registros"),
];

const fn endpoint(
    metodo: Metodo,
    ruta: &'static str,
    descripcion: &'static str,
    codigo_exito: u16,
    principal: bool,
) -> EndpointSpec {
    EndpointSpec {
        metodo,
        ruta,
        descripcion,
        parametros_query: &[],
        codigo_exito,
        principal,
    }
}

const fn with_query(
    spec: EndpointSpec,
    parametros_query: &'static [(&'static str, &'static str)],
) -> EndpointSpec {
    EndpointSpec {
        parametros_query,
        ..spec
    }
}

/// Every endpoint the service exposes
pub const ENDPOINTS: &[EndpointSpec] = &[
    endpoint(Metodo::Get, "/api", "Información básica de la API", 200, false),
    endpoint(Metodo::Get, "/health", "Health check de la API", 200, true),
    endpoint(
        Metodo::Get,
        "/api/documentacion",
        "Documentación completa de la API",
        200,
        false,
    ),
    endpoint(
        Metodo::Get,
        "/api/documentacion/endpoints",
        "Índice de endpoints, validaciones y funcionalidades",
        200,
        false,
    ),
    with_query(
        endpoint(
            Metodo::Get,
            "/api/usuarios/",
            "Listar todos los usuarios con paginación",
            200,
            true,
        ),
        PAGINACION,
    ),
    endpoint(Metodo::Post, "/api/usuarios/", "Crear un nuevo usuario", 201, true),
    endpoint(
        Metodo::Get,
        "/api/usuarios/{usuario_id}",
        "Obtener un usuario por su ID",
        200,
        true,
    ),
    endpoint(
        Metodo::Put,
        "/api/usuarios/{usuario_id}",
        "Actualizar todos los campos de un usuario",
        200,
        true,
    ),
    endpoint(
        Metodo::Patch,
        "/api/usuarios/{usuario_id}",
        "Actualizar parcialmente un usuario",
        200,
        false,
    ),
    endpoint(
        Metodo::Delete,
        "/api/usuarios/{usuario_id}",
        "Eliminar un usuario y todos sus favoritos",
        204,
        true,
    ),
    endpoint(
        Metodo::Get,
        "/api/usuarios/{usuario_id}/favoritos",
        "Listar las canciones favoritas de un usuario",
        200,
        true,
    ),
    endpoint(
        Metodo::Delete,
        "/api/usuarios/{usuario_id}/favoritos/{cancion_id}",
        "Quitar una canción de los favoritos de un usuario",
        204,
        false,
    ),
    with_query(
        endpoint(
            Metodo::Get,
            "/api/canciones/",
            "Listar todas las canciones con paginación",
            200,
            true,
        ),
        BUSQUEDA,
    ),
    endpoint(Metodo::Post, "/api/canciones/", "Crear una nueva canción", 201, true),
    with_query(
        endpoint(
            Metodo::Get,
            "/api/canciones/buscar",
            "Buscar canciones por diferentes criterios",
            200,
            true,
        ),
        BUSQUEDA,
    ),
    endpoint(
        Metodo::Get,
        "/api/canciones/{cancion_id}",
        "Obtener una canción por su ID",
        200,
        true,
    ),
    endpoint(
        Metodo::Put,
        "/api/canciones/{cancion_id}",
        "Actualizar todos los campos de una canción",
        200,
        true,
    ),
    endpoint(
        Metodo::Patch,
        "/api/canciones/{cancion_id}",
        "Actualizar parcialmente una canción",
        200,
        false,
    ),
    endpoint(
        Metodo::Delete,
        "/api/canciones/{cancion_id}",
        "Eliminar una canción y todos sus favoritos",
        204,
        true,
    ),
    endpoint(
        Metodo::Get,
        "/api/canciones/{cancion_id}/favoritos",
        "Listar los favoritos que apuntan a una canción",
        200,
        false,
    ),
    with_query(
        endpoint(
            Metodo::Get,
            "/api/favoritos/",
            "Listar todos los favoritos con paginación",
            200,
            true,
        ),
        PAGINACION,
    ),
    endpoint(
        Metodo::Post,
        "/api/favoritos/",
        "Marcar una canción como favorita para un usuario",
        201,
        true,
    ),
    endpoint(
        Metodo::Get,
        "/api/favoritos/{favorito_id}",
        "Obtener un favorito por su ID",
        200,
        false,
    ),
    endpoint(
        Metodo::Delete,
        "/api/favoritos/{favorito_id}",
        "Eliminar un favorito (desmarcar como favorito)",
        204,
        true,
    ),
];

/// Status codes every endpoint maps its outcomes onto
pub const CODIGOS_ERROR: &[(u16, &str)] = &[
    (200, "OK - Solicitud exitosa, datos devueltos"),
    (201, "Created - Recurso creado exitosamente"),
    (204, "No Content - Recurso eliminado exitosamente"),
    (400, "Bad Request - JSON o parámetros mal formados"),
    (404, "Not Found - La entidad referenciada no existe"),
    (422, "Unprocessable Entity - Los datos no cumplen una regla de validación"),
    (500, "Internal Server Error - Error inesperado del servidor"),
];

#[derive(Debug, Clone, Serialize)]
pub struct EndpointDoc {
    pub endpoint: String,
    pub metodo: Metodo,
    pub descripcion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parametros_query: Option<BTreeMap<String, String>>,
    pub codigo_exito: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct InformacionGeneral {
    pub nombre: String,
    pub version: String,
    pub descripcion: String,
    pub puerto: u16,
    pub host: String,
    pub base_url: String,
    pub documentacion: String,
}

/// The full API documentation document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentacionApi {
    pub informacion_general: InformacionGeneral,
    pub estructura_entidades: BTreeMap<String, BTreeMap<String, String>>,
    pub endpoints: Vec<EndpointDoc>,
    pub codigos_error_comunes: BTreeMap<String, String>,
}

/// The endpoints index document
#[derive(Debug, Clone, Serialize)]
pub struct IndiceEndpoints {
    pub api_base_url: String,
    pub endpoints_principales: Vec<EndpointDoc>,
    pub validaciones_importantes: BTreeMap<String, BTreeMap<String, String>>,
    pub funcionalidades_especiales: BTreeMap<String, String>,
}

fn endpoint_doc(spec: &EndpointSpec, config: &AppConfig) -> EndpointDoc {
    let parametros_query = (!spec.parametros_query.is_empty()).then(|| {
        spec.parametros_query
            .iter()
            .map(|(nombre, descripcion)| {
                let descripcion = if *nombre == "limit" {
                    format!(
                        "int (default: {}, max: {}) - máximo de registros",
                        config.default_page_size, config.max_page_size
                    )
                } else {
                    descripcion.to_string()
                };
                (nombre.to_string(), descripcion)
            })
            .collect()
    });

    EndpointDoc {
        endpoint: format!("{}{}", config.base_url(), spec.ruta),
        metodo: spec.metodo,
        descripcion: spec.descripcion.to_string(),
        parametros_query,
        codigo_exito: spec.codigo_exito,
    }
}

fn tabla(entries: &[(&str, String)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn estructura_entidades() -> BTreeMap<String, BTreeMap<String, String>> {
    let usuario = tabla(&[
        ("id", "integer - asignado por el servidor, inmutable".to_string()),
        ("nombre", format!("string - 1 a {} caracteres", NOMBRE_MAX)),
        ("correo", "string - email válido, único".to_string()),
        (
            "fecha_registro",
            "datetime ISO-8601 - asignada al crear, inmutable".to_string(),
        ),
    ]);

    let cancion = tabla(&[
        ("id", "integer - asignado por el servidor, inmutable".to_string()),
        ("titulo", format!("string - 1 a {} caracteres", TITULO_MAX)),
        ("artista", format!("string - 1 a {} caracteres", ARTISTA_MAX)),
        ("album", format!("string opcional - 1 a {} caracteres", ALBUM_MAX)),
        (
            "duracion",
            format!("integer - {} a {} segundos", DURACION_MIN, DURACION_MAX),
        ),
        (
            "duracion_formateada",
            "string - duración como M:SS, solo lectura".to_string(),
        ),
        ("anio", format!("integer - {} hasta el año actual", ANIO_MIN)),
        ("genero", format!("string opcional - 1 a {} caracteres", GENERO_MAX)),
        (
            "fecha_creacion",
            "datetime ISO-8601 - asignada al crear, inmutable".to_string(),
        ),
    ]);

    let favorito = tabla(&[
        ("id", "integer - asignado por el servidor, inmutable".to_string()),
        ("id_usuario", "integer - usuario existente".to_string()),
        ("id_cancion", "integer - canción existente".to_string()),
        (
            "fecha_marcado",
            "datetime ISO-8601 - asignada al marcar".to_string(),
        ),
        (
            "usuario",
            "Usuario - incluido en los listados".to_string(),
        ),
        (
            "cancion",
            "Cancion - incluida en los listados".to_string(),
        ),
    ]);

    BTreeMap::from([
        ("Usuario".to_string(), usuario),
        ("Cancion".to_string(), cancion),
        ("Favorito".to_string(), favorito),
    ])
}

fn validaciones_importantes() -> BTreeMap<String, BTreeMap<String, String>> {
    let usuario = tabla(&[
        (
            "nombre",
            format!("obligatorio, no vacío, máximo {} caracteres", NOMBRE_MAX),
        ),
        (
            "correo",
            format!("obligatorio, formato {}, único entre usuarios", EMAIL_PATTERN),
        ),
    ]);

    let cancion = tabla(&[
        (
            "titulo",
            format!("obligatorio, no vacío, máximo {} caracteres", TITULO_MAX),
        ),
        (
            "artista",
            format!("obligatorio, no vacío, máximo {} caracteres", ARTISTA_MAX),
        ),
        (
            "album",
            format!("opcional, no vacío si se envía, máximo {} caracteres", ALBUM_MAX),
        ),
        (
            "duracion",
            format!("entero entre {} y {} segundos", DURACION_MIN, DURACION_MAX),
        ),
        (
            "anio",
            format!("entero entre {} y el año actual", ANIO_MIN),
        ),
        (
            "genero",
            format!("opcional, no vacío si se envía, máximo {} caracteres", GENERO_MAX),
        ),
    ]);

    let favorito = tabla(&[
        ("id_usuario", "debe existir (404 si no existe)".to_string()),
        (
            "id_cancion",
            "debe existir (404 si no existe); un usuario no puede marcar dos veces la misma canción"
                .to_string(),
        ),
    ]);

    BTreeMap::from([
        ("usuario".to_string(), usuario),
        ("cancion".to_string(), cancion),
        ("favorito".to_string(), favorito),
    ])
}

fn funcionalidades_especiales(config: &AppConfig) -> BTreeMap<String, String> {
    tabla(&[
        (
            "paginacion",
            format!(
                "Parámetros skip y limit (default {}, máximo {}); el total se devuelve en la cabecera X-Total-Count",
                config.default_page_size, config.max_page_size
            ),
        ),
        (
            "busqueda_avanzada",
            "GET /api/canciones/buscar: subcadenas sin distinguir mayúsculas en titulo, artista, album y genero; rangos inclusivos de anio y duracion".to_string(),
        ),
        (
            "eliminacion_cascada",
            "Eliminar un usuario o una canción elimina en la misma transacción todos sus favoritos".to_string(),
        ),
    ])
}

/// Build the full API documentation document
pub fn documentacion_api(config: &AppConfig) -> DocumentacionApi {
    let base_url = config.base_url();

    DocumentacionApi {
        informacion_general: InformacionGeneral {
            nombre: NOMBRE_API.to_string(),
            version: VERSION.to_string(),
            descripcion: DESCRIPCION.to_string(),
            puerto: config.port,
            host: config.host.clone(),
            documentacion: format!("{}/api/documentacion", base_url),
            base_url,
        },
        estructura_entidades: estructura_entidades(),
        endpoints: ENDPOINTS
            .iter()
            .map(|spec| endpoint_doc(spec, config))
            .collect(),
        codigos_error_comunes: CODIGOS_ERROR
            .iter()
            .map(|(codigo, significado)| (codigo.to_string(), significado.to_string()))
            .collect(),
    }
}

/// Build the endpoints index document
pub fn indice_endpoints(config: &AppConfig) -> IndiceEndpoints {
    IndiceEndpoints {
        api_base_url: config.base_url(),
        endpoints_principales: ENDPOINTS
            .iter()
            .filter(|spec| spec.principal)
            .map(|spec| endpoint_doc(spec, config))
            .collect(),
        validaciones_importantes: validaciones_importantes(),
        funcionalidades_especiales: funcionalidades_especiales(config),
    }
}

/// Write both documents into `dir` as pretty-printed JSON
pub fn write_documents(dir: &Path, config: &AppConfig) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let documentacion = serde_json::to_string_pretty(&documentacion_api(config))?;
    let path = dir.join(DOCUMENTACION_FILE);
    fs::write(&path, documentacion)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());

    let indice = serde_json::to_string_pretty(&indice_endpoints(config))?;
    let path = dir.join(ENDPOINTS_FILE);
    fs::write(&path, indice).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn documentacion() -> Value {
        serde_json::to_value(documentacion_api(&AppConfig::default())).unwrap()
    }

    fn indice() -> Value {
        serde_json::to_value(indice_endpoints(&AppConfig::default())).unwrap()
    }

    #[test]
    fn test_documentacion_tiene_campos_requeridos() {
        let data = documentacion();
        for campo in [
            "informacion_general",
            "estructura_entidades",
            "endpoints",
            "codigos_error_comunes",
        ] {
            assert!(data.get(campo).is_some(), "missing {}", campo);
        }
    }

    #[test]
    fn test_informacion_general() {
        let data = documentacion();
        let info = &data["informacion_general"];
        for campo in ["nombre", "version", "descripcion", "puerto", "host", "base_url"] {
            assert!(info.get(campo).is_some(), "missing {}", campo);
        }
        assert_eq!(info["puerto"], 8000);
        assert_eq!(info["host"], "127.0.0.1");
        assert_eq!(info["base_url"], "http://127.0.0.1:8000");
        assert_eq!(info["version"], "1.0.0");
    }

    #[test]
    fn test_estructura_entidades() {
        let data = documentacion();
        let entidades = &data["estructura_entidades"];
        for entidad in ["Usuario", "Cancion", "Favorito"] {
            assert!(entidades.get(entidad).is_some(), "missing {}", entidad);
        }
        for campo in ["id", "nombre", "correo", "fecha_registro"] {
            assert!(entidades["Usuario"].get(campo).is_some(), "missing {}", campo);
        }
    }

    #[test]
    fn test_endpoints_documentados() {
        let data = documentacion();
        let endpoints = data["endpoints"].as_array().unwrap();
        assert!(endpoints.len() >= 20);

        for endpoint in endpoints {
            for campo in ["endpoint", "metodo", "descripcion"] {
                assert!(endpoint.get(campo).is_some(), "missing {}", campo);
            }
            assert!(
                endpoint["endpoint"]
                    .as_str()
                    .unwrap()
                    .starts_with("http://127.0.0.1:8000/")
            );
        }
    }

    #[test]
    fn test_endpoint_pairs_are_unique() {
        let mut pares: Vec<_> = ENDPOINTS.iter().map(|e| (e.ruta, e.metodo as u8)).collect();
        let total = pares.len();
        pares.sort();
        pares.dedup();
        assert_eq!(pares.len(), total);
    }

    #[test]
    fn test_codigos_error() {
        let data = documentacion();
        let codigos = &data["codigos_error_comunes"];
        for codigo in ["200", "201", "400", "404", "422", "500"] {
            assert!(codigos.get(codigo).is_some(), "missing {}", codigo);
        }
    }

    #[test]
    fn test_indice_endpoints() {
        let data = indice();
        assert_eq!(data["api_base_url"], "http://127.0.0.1:8000");
        assert!(!data["endpoints_principales"].as_array().unwrap().is_empty());

        let usuario = &data["validaciones_importantes"]["usuario"];
        assert!(usuario.get("nombre").is_some());
        assert!(usuario.get("correo").is_some());

        let funcionalidades = &data["funcionalidades_especiales"];
        for funcionalidad in ["paginacion", "busqueda_avanzada", "eliminacion_cascada"] {
            assert!(funcionalidades.get(funcionalidad).is_some(), "missing {}", funcionalidad);
        }
    }

    #[test]
    fn test_limit_description_follows_config() {
        let config = AppConfig {
            max_page_size: 25,
            default_page_size: 10,
            ..AppConfig::default()
        };
        let data = serde_json::to_value(documentacion_api(&config)).unwrap();
        let usuarios = data["endpoints"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["endpoint"] == "http://127.0.0.1:8000/api/usuarios/" && e["metodo"] == "GET")
            .unwrap();

        assert_eq!(
            usuarios["parametros_query"]["limit"],
            "int (default: 10, max: 25) - máximo de registros"
        );
    }

    #[test]
    fn test_write_documents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_documents(dir.path(), &AppConfig::default())?;

        for file in [DOCUMENTACION_FILE, ENDPOINTS_FILE] {
            let contents = fs::read_to_string(dir.path().join(file))?;
            let value: Value = serde_json::from_str(&contents)?;
            assert!(value.is_object(), "{} must hold a JSON object", file);
        }

        Ok(())
    }
}
