//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::{
    config::AppConfig,
    error::ApiResult,
    models::Ventana,
    repositories::{CancionRepository, FavoritoRepository, UsuarioRepository, write_gate},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: AppConfig,
    pub usuario_repository: UsuarioRepository,
    pub cancion_repository: CancionRepository,
    pub favorito_repository: FavoritoRepository,
}

impl AppState {
    /// Build the state over an already migrated pool
    pub fn new(db_pool: SqlitePool, config: AppConfig) -> Self {
        let gate = write_gate();

        Self {
            usuario_repository: UsuarioRepository::new(db_pool.clone(), gate.clone()),
            cancion_repository: CancionRepository::new(db_pool.clone(), gate.clone()),
            favorito_repository: FavoritoRepository::new(db_pool.clone(), gate),
            db_pool,
            config,
        }
    }

    /// Resolve raw pagination parameters against the configured bounds
    pub fn ventana(&self, skip: Option<i64>, limit: Option<i64>) -> ApiResult<Ventana> {
        Ventana::resolver(
            skip,
            limit,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }
}
