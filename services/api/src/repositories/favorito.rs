//! Favorito repository for database operations

use chrono::NaiveDateTime;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::{
    FAVORITO_DETALLE_SELECT, WriteGate, ahora, cancion::fetch_cancion, map_favorito_detalle,
    usuario::fetch_usuario,
};
use crate::{
    error::{ApiError, ApiResult},
    models::{Favorito, FavoritoDetalle, NuevoFavorito, Pagina, Ventana},
    validation::ValidationError,
};

/// Favorito repository
#[derive(Clone)]
pub struct FavoritoRepository {
    pool: SqlitePool,
    gate: WriteGate,
}

async fn detalles_where(
    conn: &mut SqliteConnection,
    condicion: &str,
    id: i64,
) -> ApiResult<Vec<FavoritoDetalle>> {
    let rows = sqlx::query(&format!(
        "{} WHERE {} = ? ORDER BY f.fecha_marcado ASC, f.id ASC",
        FAVORITO_DETALLE_SELECT, condicion
    ))
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(map_favorito_detalle).collect())
}

impl FavoritoRepository {
    /// Create a new favorito repository
    pub fn new(pool: SqlitePool, gate: WriteGate) -> Self {
        Self { pool, gate }
    }

    /// Mark a cancion as favorite for a usuario
    pub async fn create(&self, payload: &NuevoFavorito) -> ApiResult<Favorito> {
        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        if fetch_usuario(&mut tx, payload.id_usuario).await?.is_none() {
            return Err(ApiError::not_found("Usuario", payload.id_usuario));
        }

        if fetch_cancion(&mut tx, payload.id_cancion).await?.is_none() {
            return Err(ApiError::not_found("Cancion", payload.id_cancion));
        }

        let existente: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM favoritos WHERE id_usuario = ? AND id_cancion = ?",
        )
        .bind(payload.id_usuario)
        .bind(payload.id_cancion)
        .fetch_optional(&mut *tx)
        .await?;

        if existente.is_some() {
            return Err(ValidationError::new(
                "id_cancion",
                "la canción ya está en los favoritos del usuario",
            )
            .into());
        }

        let favorito: Favorito = {
            let (id, fecha_marcado): (i64, NaiveDateTime) = sqlx::query_as(
                r#"
                INSERT INTO favoritos (id_usuario, id_cancion, fecha_marcado)
                VALUES (?, ?, ?)
                RETURNING id, fecha_marcado
                "#,
            )
            .bind(payload.id_usuario)
            .bind(payload.id_cancion)
            .bind(ahora())
            .fetch_one(&mut *tx)
            .await?;

            Favorito {
                id,
                id_usuario: payload.id_usuario,
                id_cancion: payload.id_cancion,
                fecha_marcado,
            }
        };

        tx.commit().await?;

        info!(
            "Usuario {} marked cancion {} as favorito {}",
            favorito.id_usuario, favorito.id_cancion, favorito.id
        );
        Ok(favorito)
    }

    /// Get one page of favoritos in the order they were marked
    pub async fn get_all(&self, ventana: Ventana) -> ApiResult<Pagina<FavoritoDetalle>> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favoritos")
            .fetch_one(&mut *tx)
            .await?;

        let rows = sqlx::query(&format!(
            "{} ORDER BY f.fecha_marcado ASC, f.id ASC LIMIT ? OFFSET ?",
            FAVORITO_DETALLE_SELECT
        ))
        .bind(ventana.limit)
        .bind(ventana.offset)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Pagina {
            items: rows.iter().map(map_favorito_detalle).collect(),
            total,
        })
    }

    /// Find a favorito by ID
    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<FavoritoDetalle>> {
        let row = sqlx::query(&format!("{} WHERE f.id = ?", FAVORITO_DETALLE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_favorito_detalle))
    }

    /// All favoritos of one usuario
    pub async fn by_usuario(&self, id_usuario: i64) -> ApiResult<Vec<FavoritoDetalle>> {
        let mut tx = self.pool.begin().await?;

        if fetch_usuario(&mut tx, id_usuario).await?.is_none() {
            return Err(ApiError::not_found("Usuario", id_usuario));
        }

        let favoritos = detalles_where(&mut tx, "f.id_usuario", id_usuario).await?;
        tx.commit().await?;

        Ok(favoritos)
    }

    /// All favoritos pointing at one cancion
    pub async fn by_cancion(&self, id_cancion: i64) -> ApiResult<Vec<FavoritoDetalle>> {
        let mut tx = self.pool.begin().await?;

        if fetch_cancion(&mut tx, id_cancion).await?.is_none() {
            return Err(ApiError::not_found("Cancion", id_cancion));
        }

        let favoritos = detalles_where(&mut tx, "f.id_cancion", id_cancion).await?;
        tx.commit().await?;

        Ok(favoritos)
    }

    /// Delete a single favorito; parents are untouched
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let _guard = self.gate.lock().await;

        let result = sqlx::query("DELETE FROM favoritos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Favorito", id));
        }

        info!("Deleted favorito {}", id);
        Ok(())
    }

    /// Remove cancion `id_cancion` from the favoritos of usuario `id_usuario`
    pub async fn delete_par(&self, id_usuario: i64, id_cancion: i64) -> ApiResult<()> {
        let _guard = self.gate.lock().await;

        let result = sqlx::query("DELETE FROM favoritos WHERE id_usuario = ? AND id_cancion = ?")
            .bind(id_usuario)
            .bind(id_cancion)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "La canción {} no está en los favoritos del usuario {}",
                id_cancion, id_usuario
            )));
        }

        info!(
            "Usuario {} removed cancion {} from favoritos",
            id_usuario, id_cancion
        );
        Ok(())
    }
}
