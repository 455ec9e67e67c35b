//! Usuario repository for database operations

use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use super::{USUARIO_COLUMNS, WriteGate, ahora, map_usuario};
use crate::{
    error::{ApiError, ApiResult},
    models::{ActualizarUsuario, NuevoUsuario, Pagina, Usuario, Ventana},
    validation::{ValidationError, validate_actualizar_usuario, validate_usuario},
};

/// Usuario repository
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: SqlitePool,
    gate: WriteGate,
}

/// Fail when `correo` already belongs to a usuario other than `excluir`
async fn ensure_correo_disponible(
    conn: &mut SqliteConnection,
    correo: &str,
    excluir: Option<i64>,
) -> ApiResult<()> {
    let existente: Option<i64> =
        sqlx::query_scalar("SELECT id FROM usuarios WHERE correo = ? AND id IS NOT ?")
            .bind(correo)
            .bind(excluir)
            .fetch_optional(&mut *conn)
            .await?;

    match existente {
        Some(_) => Err(correo_duplicado().into()),
        None => Ok(()),
    }
}

fn correo_duplicado() -> ValidationError {
    ValidationError::new("correo", "ya está registrado por otro usuario")
}

/// Unique-index violations surface as the same correo error
fn map_write_error(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return correo_duplicado().into();
        }
    }

    e.into()
}

pub(crate) async fn fetch_usuario(
    conn: &mut SqliteConnection,
    id: i64,
) -> ApiResult<Option<Usuario>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM usuarios WHERE id = ?",
        USUARIO_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|row| map_usuario(&row, "")))
}

impl UsuarioRepository {
    /// Create a new usuario repository
    pub fn new(pool: SqlitePool, gate: WriteGate) -> Self {
        Self { pool, gate }
    }

    /// Create a new usuario
    pub async fn create(&self, payload: &NuevoUsuario) -> ApiResult<Usuario> {
        let nuevo = validate_usuario(&payload.nombre, &payload.correo)?;

        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        ensure_correo_disponible(&mut tx, &nuevo.correo, None).await?;

        let row = sqlx::query(&format!(
            "INSERT INTO usuarios (nombre, correo, fecha_registro) VALUES (?, ?, ?) RETURNING {}",
            USUARIO_COLUMNS
        ))
        .bind(&nuevo.nombre)
        .bind(&nuevo.correo)
        .bind(ahora())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;

        let usuario = map_usuario(&row, "");
        info!("Created usuario {}", usuario.id);
        Ok(usuario)
    }

    /// Get one page of usuarios in registration order
    pub async fn get_all(&self, ventana: Ventana) -> ApiResult<Pagina<Usuario>> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&mut *tx)
            .await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM usuarios ORDER BY fecha_registro ASC, id ASC LIMIT ? OFFSET ?",
            USUARIO_COLUMNS
        ))
        .bind(ventana.limit)
        .bind(ventana.offset)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Pagina {
            items: rows.iter().map(|row| map_usuario(row, "")).collect(),
            total,
        })
    }

    /// Find a usuario by ID
    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<Usuario>> {
        let mut conn = self.pool.acquire().await?;
        fetch_usuario(&mut conn, id).await
    }

    /// Replace every field of usuario `id`
    pub async fn replace(&self, id: i64, payload: &NuevoUsuario) -> ApiResult<Usuario> {
        let nuevo = validate_usuario(&payload.nombre, &payload.correo)?;

        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        if fetch_usuario(&mut tx, id).await?.is_none() {
            return Err(ApiError::not_found("Usuario", id));
        }

        ensure_correo_disponible(&mut tx, &nuevo.correo, Some(id)).await?;
        let usuario = Self::store(&mut tx, id, &nuevo).await?;
        tx.commit().await?;

        info!("Replaced usuario {}", id);
        Ok(usuario)
    }

    /// Apply the present fields of `cambios` to usuario `id`
    pub async fn update(&self, id: i64, cambios: &ActualizarUsuario) -> ApiResult<Usuario> {
        let cambios = validate_actualizar_usuario(cambios)?;

        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let actual = fetch_usuario(&mut tx, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Usuario", id))?;

        if let Some(correo) = &cambios.correo {
            ensure_correo_disponible(&mut tx, correo, Some(id)).await?;
        }

        let nuevo = NuevoUsuario {
            nombre: cambios.nombre.unwrap_or(actual.nombre),
            correo: cambios.correo.unwrap_or(actual.correo),
        };

        let usuario = Self::store(&mut tx, id, &nuevo).await?;
        tx.commit().await?;

        info!("Updated usuario {}", id);
        Ok(usuario)
    }

    async fn store(
        conn: &mut SqliteConnection,
        id: i64,
        usuario: &NuevoUsuario,
    ) -> ApiResult<Usuario> {
        let row = sqlx::query(&format!(
            "UPDATE usuarios SET nombre = ?, correo = ? WHERE id = ? RETURNING {}",
            USUARIO_COLUMNS
        ))
        .bind(&usuario.nombre)
        .bind(&usuario.correo)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_write_error)?;

        Ok(map_usuario(&row, ""))
    }

    /// Delete a usuario together with every favorito that references it
    ///
    /// Returns the number of favoritos removed by the cascade.
    pub async fn delete(&self, id: i64) -> ApiResult<u64> {
        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        if fetch_usuario(&mut tx, id).await?.is_none() {
            return Err(ApiError::not_found("Usuario", id));
        }

        let favoritos = sqlx::query("DELETE FROM favoritos WHERE id_usuario = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM usuarios WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted usuario {} and {} favoritos", id, favoritos);
        Ok(favoritos)
    }
}
