//! Catalog service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tracing::{error, warn};

use crate::{
    AppState,
    docs::{self, DESCRIPCION, VERSION},
    error::{ApiError, ApiResult},
    middleware::log_requests,
    models::{
        ActualizarCancion, ActualizarUsuario, BusquedaCanciones, NuevaCancion, NuevoFavorito,
        NuevoUsuario, Paginacion,
    },
};

type JsonBody<T> = WithRejection<Json<T>, ApiError>;
type QueryParams<T> = WithRejection<Query<T>, ApiError>;
type PathParam<T> = WithRejection<Path<T>, ApiError>;

/// Create the router for the catalog service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api", get(api_info))
        .route("/api/documentacion", get(get_documentacion))
        .route("/api/documentacion/endpoints", get(get_indice_endpoints))
        .route("/api/usuarios", get(get_usuarios).post(create_usuario))
        .route("/api/usuarios/", get(get_usuarios).post(create_usuario))
        .route(
            "/api/usuarios/:id",
            get(get_usuario)
                .put(replace_usuario)
                .patch(update_usuario)
                .delete(delete_usuario),
        )
        .route("/api/usuarios/:id/favoritos", get(get_favoritos_usuario))
        .route(
            "/api/usuarios/:id/favoritos/:id_cancion",
            delete(delete_favorito_usuario),
        )
        .route("/api/canciones", get(get_canciones).post(create_cancion))
        .route("/api/canciones/", get(get_canciones).post(create_cancion))
        .route("/api/canciones/buscar", get(buscar_canciones))
        .route(
            "/api/canciones/:id",
            get(get_cancion)
                .put(replace_cancion)
                .patch(update_cancion)
                .delete(delete_cancion),
        )
        .route("/api/canciones/:id/favoritos", get(get_favoritos_cancion))
        .route("/api/favoritos", get(get_favoritos).post(create_favorito))
        .route("/api/favoritos/", get(get_favoritos).post(create_favorito))
        .route("/api/favoritos/:id", get(get_favorito).delete(delete_favorito))
        .fallback(not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Unknown routes still answer with a JSON body
async fn not_found() -> ApiError {
    ApiError::NotFound("Ruta no encontrada".to_string())
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match musica_common::health_check(&state.db_pool).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "version": VERSION,
            })),
        ),
        Ok(false) | Err(_) => {
            error!("Health check failed: database unreachable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                    "version": VERSION,
                })),
            )
        }
    }
}

/// Basic information about the API
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "message": format!("Bienvenido a {}", docs::NOMBRE_API),
        "version": VERSION,
        "description": DESCRIPCION,
    }))
}

/// Full API documentation
pub async fn get_documentacion(State(state): State<AppState>) -> impl IntoResponse {
    Json(docs::documentacion_api(&state.config))
}

/// Endpoints index
pub async fn get_indice_endpoints(State(state): State<AppState>) -> impl IntoResponse {
    Json(docs::indice_endpoints(&state.config))
}

/// Get usuarios with pagination
pub async fn get_usuarios(
    State(state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<Paginacion>,
) -> ApiResult<impl IntoResponse> {
    let ventana = state.ventana(query.skip, query.limit)?;
    state.usuario_repository.get_all(ventana).await
}

/// Create a new usuario
pub async fn create_usuario(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<NuevoUsuario>,
) -> ApiResult<impl IntoResponse> {
    let usuario = state
        .usuario_repository
        .create(&payload)
        .await
        .inspect_err(|e| warn!("Rejected usuario: {}", e))?;

    Ok((StatusCode::CREATED, Json(usuario)))
}

/// Get a usuario by ID
pub async fn get_usuario(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    let usuario = state
        .usuario_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Usuario", id))?;

    Ok(Json(usuario))
}

/// Replace every field of a usuario
pub async fn replace_usuario(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    WithRejection(Json(payload), _): JsonBody<NuevoUsuario>,
) -> ApiResult<impl IntoResponse> {
    let usuario = state.usuario_repository.replace(id, &payload).await?;
    Ok(Json(usuario))
}

/// Update some fields of a usuario
pub async fn update_usuario(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    WithRejection(Json(payload), _): JsonBody<ActualizarUsuario>,
) -> ApiResult<impl IntoResponse> {
    let usuario = state.usuario_repository.update(id, &payload).await?;
    Ok(Json(usuario))
}

/// Delete a usuario and its favoritos
pub async fn delete_usuario(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    state.usuario_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the favoritos of a usuario
pub async fn get_favoritos_usuario(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    let favoritos = state.favorito_repository.by_usuario(id).await?;
    Ok(Json(favoritos))
}

/// Remove a cancion from the favoritos of a usuario
pub async fn delete_favorito_usuario(
    State(state): State<AppState>,
    WithRejection(Path((id_usuario, id_cancion)), _): PathParam<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    state
        .favorito_repository
        .delete_par(id_usuario, id_cancion)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get canciones with pagination and optional filters
pub async fn get_canciones(
    State(state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<BusquedaCanciones>,
) -> ApiResult<impl IntoResponse> {
    let ventana = state.ventana(query.skip, query.limit)?;
    state.cancion_repository.search(&query, ventana).await
}

/// Advanced cancion search
pub async fn buscar_canciones(
    state: State<AppState>,
    query: QueryParams<BusquedaCanciones>,
) -> ApiResult<impl IntoResponse> {
    get_canciones(state, query).await
}

/// Create a new cancion
pub async fn create_cancion(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<NuevaCancion>,
) -> ApiResult<impl IntoResponse> {
    let cancion = state
        .cancion_repository
        .create(&payload)
        .await
        .inspect_err(|e| warn!("Rejected cancion: {}", e))?;

    Ok((StatusCode::CREATED, Json(cancion)))
}

/// Get a cancion by ID
pub async fn get_cancion(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    let cancion = state
        .cancion_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cancion", id))?;

    Ok(Json(cancion))
}

/// Replace every field of a cancion
pub async fn replace_cancion(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    WithRejection(Json(payload), _): JsonBody<NuevaCancion>,
) -> ApiResult<impl IntoResponse> {
    let cancion = state.cancion_repository.replace(id, &payload).await?;
    Ok(Json(cancion))
}

/// Update some fields of a cancion
pub async fn update_cancion(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    WithRejection(Json(payload), _): JsonBody<ActualizarCancion>,
) -> ApiResult<impl IntoResponse> {
    let cancion = state.cancion_repository.update(id, &payload).await?;
    Ok(Json(cancion))
}

/// Delete a cancion and its favoritos
pub async fn delete_cancion(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    state.cancion_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the favoritos pointing at a cancion
pub async fn get_favoritos_cancion(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    let favoritos = state.favorito_repository.by_cancion(id).await?;
    Ok(Json(favoritos))
}

/// Get favoritos with pagination
pub async fn get_favoritos(
    State(state): State<AppState>,
    WithRejection(Query(query), _): QueryParams<Paginacion>,
) -> ApiResult<impl IntoResponse> {
    let ventana = state.ventana(query.skip, query.limit)?;
    state.favorito_repository.get_all(ventana).await
}

/// Mark a cancion as favorite
pub async fn create_favorito(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): JsonBody<NuevoFavorito>,
) -> ApiResult<impl IntoResponse> {
    let favorito = state.favorito_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(favorito)))
}

/// Get a favorito by ID
pub async fn get_favorito(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    let favorito = state
        .favorito_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Favorito", id))?;

    Ok(Json(favorito))
}

/// Delete a single favorito
pub async fn delete_favorito(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<impl IntoResponse> {
    state.favorito_repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
