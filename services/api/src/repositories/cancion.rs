//! Cancion repository: CRUD, cascade deletion and advanced search

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::info;

use super::{CANCION_COLUMNS, WriteGate, ahora, map_cancion};
use crate::{
    error::{ApiError, ApiResult},
    models::{ActualizarCancion, BusquedaCanciones, Cancion, NuevaCancion, Pagina, Ventana},
    validation::{validate_actualizar_cancion, validate_nueva_cancion},
};

/// Cancion repository
#[derive(Clone)]
pub struct CancionRepository {
    pool: SqlitePool,
    gate: WriteGate,
}

/// Escape LIKE wildcards so the needle matches literally
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn busqueda(texto: &Option<String>) -> Option<String> {
    texto.as_ref().map(|t| t.to_lowercase())
}

fn push_filtros(builder: &mut QueryBuilder<'_, Sqlite>, filtros: &BusquedaCanciones) {
    builder.push(" WHERE 1 = 1");

    for (columna, needle) in filtros.filtros_texto() {
        builder
            .push(format!(" AND {} LIKE ", columna))
            .push_bind(format!("%{}%", escape_like(&needle)))
            .push(" ESCAPE '\\'");
    }

    let (anio_min, anio_max) = filtros.rango_anio();
    let rangos = [
        ("anio >= ", anio_min),
        ("anio <= ", anio_max),
        ("duracion >= ", filtros.duracion_min),
        ("duracion <= ", filtros.duracion_max),
    ];

    for (condicion, valor) in rangos {
        if let Some(valor) = valor {
            builder.push(" AND ").push(condicion).push_bind(valor);
        }
    }
}

fn push_orden(builder: &mut QueryBuilder<'_, Sqlite>, filtros: &BusquedaCanciones) {
    match filtros.ordenar_por {
        Some(campo) => {
            let orden = filtros.orden.unwrap_or_default().sql();
            builder.push(format!(
                " ORDER BY {} {}, id {}",
                campo.columna(),
                orden,
                orden
            ));
        }
        None => {
            builder.push(" ORDER BY fecha_creacion ASC, id ASC");
        }
    }
}

pub(crate) async fn fetch_cancion(
    conn: &mut SqliteConnection,
    id: i64,
) -> ApiResult<Option<Cancion>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM canciones WHERE id = ?",
        CANCION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|row| map_cancion(&row, "")))
}

impl CancionRepository {
    /// Create a new cancion repository
    pub fn new(pool: SqlitePool, gate: WriteGate) -> Self {
        Self { pool, gate }
    }

    /// Create a new cancion
    pub async fn create(&self, payload: &NuevaCancion) -> ApiResult<Cancion> {
        let nueva = validate_nueva_cancion(payload)?;

        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO canciones (
                titulo, artista, album, duracion, anio, genero, fecha_creacion,
                titulo_busqueda, artista_busqueda, album_busqueda, genero_busqueda
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            CANCION_COLUMNS
        ))
        .bind(&nueva.titulo)
        .bind(&nueva.artista)
        .bind(&nueva.album)
        .bind(nueva.duracion)
        .bind(nueva.anio)
        .bind(&nueva.genero)
        .bind(ahora())
        .bind(nueva.titulo.to_lowercase())
        .bind(nueva.artista.to_lowercase())
        .bind(busqueda(&nueva.album))
        .bind(busqueda(&nueva.genero))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let cancion = map_cancion(&row, "");
        info!("Created cancion {}", cancion.id);
        Ok(cancion)
    }

    /// Get one page of canciones matching `filtros`
    ///
    /// With no filters this is the plain listing.
    pub async fn search(
        &self,
        filtros: &BusquedaCanciones,
        ventana: Ventana,
    ) -> ApiResult<Pagina<Cancion>> {
        filtros.validar_rangos()?;

        let mut tx = self.pool.begin().await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM canciones");
        push_filtros(&mut count, filtros);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *tx).await?;

        let mut select =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM canciones", CANCION_COLUMNS));
        push_filtros(&mut select, filtros);
        push_orden(&mut select, filtros);
        select
            .push(" LIMIT ")
            .push_bind(ventana.limit)
            .push(" OFFSET ")
            .push_bind(ventana.offset);
        let rows = select.build().fetch_all(&mut *tx).await?;

        tx.commit().await?;

        Ok(Pagina {
            items: rows.iter().map(|row| map_cancion(row, "")).collect(),
            total,
        })
    }

    /// Find a cancion by ID
    pub async fn find_by_id(&self, id: i64) -> ApiResult<Option<Cancion>> {
        let mut conn = self.pool.acquire().await?;
        fetch_cancion(&mut conn, id).await
    }

    /// Replace every field of cancion `id`
    pub async fn replace(&self, id: i64, payload: &NuevaCancion) -> ApiResult<Cancion> {
        let nueva = validate_nueva_cancion(payload)?;

        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        if fetch_cancion(&mut tx, id).await?.is_none() {
            return Err(ApiError::not_found("Cancion", id));
        }

        let cancion = Self::store(&mut tx, id, &nueva).await?;
        tx.commit().await?;

        info!("Replaced cancion {}", id);
        Ok(cancion)
    }

    /// Apply the present fields of `cambios` to cancion `id`
    pub async fn update(&self, id: i64, cambios: &ActualizarCancion) -> ApiResult<Cancion> {
        let cambios = validate_actualizar_cancion(cambios)?;

        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        let actual = fetch_cancion(&mut tx, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Cancion", id))?;

        let nueva = NuevaCancion {
            titulo: cambios.titulo.unwrap_or(actual.titulo),
            artista: cambios.artista.unwrap_or(actual.artista),
            album: cambios.album.or(actual.album),
            duracion: cambios.duracion.unwrap_or(actual.duracion),
            anio: cambios.anio.unwrap_or(actual.anio),
            genero: cambios.genero.or(actual.genero),
        };

        let cancion = Self::store(&mut tx, id, &nueva).await?;
        tx.commit().await?;

        info!("Updated cancion {}", id);
        Ok(cancion)
    }

    async fn store(
        conn: &mut SqliteConnection,
        id: i64,
        cancion: &NuevaCancion,
    ) -> ApiResult<Cancion> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE canciones
            SET titulo = ?, artista = ?, album = ?, duracion = ?, anio = ?, genero = ?,
                titulo_busqueda = ?, artista_busqueda = ?, album_busqueda = ?, genero_busqueda = ?
            WHERE id = ?
            RETURNING {}
            "#,
            CANCION_COLUMNS
        ))
        .bind(&cancion.titulo)
        .bind(&cancion.artista)
        .bind(&cancion.album)
        .bind(cancion.duracion)
        .bind(cancion.anio)
        .bind(&cancion.genero)
        .bind(cancion.titulo.to_lowercase())
        .bind(cancion.artista.to_lowercase())
        .bind(busqueda(&cancion.album))
        .bind(busqueda(&cancion.genero))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(map_cancion(&row, ""))
    }

    /// Delete a cancion together with every favorito that references it
    ///
    /// Returns the number of favoritos removed by the cascade.
    pub async fn delete(&self, id: i64) -> ApiResult<u64> {
        let _guard = self.gate.lock().await;
        let mut tx = self.pool.begin().await?;

        if fetch_cancion(&mut tx, id).await?.is_none() {
            return Err(ApiError::not_found("Cancion", id));
        }

        let favoritos = sqlx::query("DELETE FROM favoritos WHERE id_cancion = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM canciones WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted cancion {} and {} favoritos", id, favoritos);
        Ok(favoritos)
    }
}
