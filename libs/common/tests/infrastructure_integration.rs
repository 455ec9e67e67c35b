//! Integration tests for the infrastructure components
//!
//! These tests verify that the SQLite database is properly configured:
//! the pool answers queries, the schema is created and the referential
//! rules between the catalog tables are enforced by the engine.

use musica_common::{
    DatabaseError,
    database::{health_check, init_memory_pool, run_migrations},
};
use sqlx::Row;

#[tokio::test]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_memory_pool().await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "SQLite simple query test failed");

    run_migrations(&pool).await?;

    let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await?;
    assert_eq!(foreign_keys, 1, "Foreign keys must be enforced");

    Ok(())
}

#[tokio::test]
async fn test_favorito_requires_existing_parents() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_memory_pool().await?;
    run_migrations(&pool).await?;

    let result = sqlx::query(
        "INSERT INTO favoritos (id_usuario, id_cancion, fecha_marcado) VALUES (41, 42, '2024-11-18T10:00:00')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Dangling favorito must be rejected");
    Ok(())
}

#[tokio::test]
async fn test_parent_with_favoritos_cannot_be_deleted_alone() -> Result<(), Box<dyn std::error::Error>>
{
    let pool = init_memory_pool().await?;
    run_migrations(&pool).await?;

    sqlx::query(
        "INSERT INTO usuarios (nombre, correo, fecha_registro) VALUES ('Ana', 'ana@example.com', '2024-11-18T10:00:00')",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        r#"
        INSERT INTO canciones (titulo, artista, duracion, anio, fecha_creacion, titulo_busqueda, artista_busqueda)
        VALUES ('Bohemian Rhapsody', 'Queen', 354, 1975, '2024-11-18T10:00:00', 'bohemian rhapsody', 'queen')
        "#,
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO favoritos (id_usuario, id_cancion, fecha_marcado) VALUES (1, 1, '2024-11-18T10:00:00')",
    )
    .execute(&pool)
    .await?;

    let result = sqlx::query("DELETE FROM usuarios WHERE id = 1")
        .execute(&pool)
        .await
        .map_err(DatabaseError::Query);
    assert!(result.is_err(), "Parent delete must not orphan favoritos");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favoritos")
        .fetch_one(&pool)
        .await?;
    assert_eq!(remaining, 1);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_correo_is_a_unique_violation() -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_memory_pool().await?;
    run_migrations(&pool).await?;

    let insert = "INSERT INTO usuarios (nombre, correo, fecha_registro) VALUES ('Ana', 'ana@example.com', '2024-11-18T10:00:00')";
    sqlx::query(insert).execute(&pool).await?;

    let error = sqlx::query(insert)
        .execute(&pool)
        .await
        .map_err(DatabaseError::Query)
        .expect_err("duplicate correo must fail");
    assert!(error.is_unique_violation());

    Ok(())
}
