//! Favorito endpoints and cascade deletion

mod support;

use musica_api::AppConfig;
use reqwest::StatusCode;
use serde_json::{Value, json};
use support::{TestServer, cancion, id, spawn, spawn_with_pool, total_count};

struct Catalogo {
    usuario: i64,
    otro_usuario: i64,
    canciones: Vec<i64>,
}

async fn catalogo(server: &TestServer) -> Catalogo {
    let usuario = id(&server.crear_usuario("Ana", "ana@example.com").await);
    let otro_usuario = id(&server.crear_usuario("Luis", "luis@example.com").await);

    let mut canciones = Vec::new();
    for (titulo, duracion) in [("Uno", 100), ("Dos", 200), ("Tres", 300)] {
        let creada = server
            .crear_cancion(cancion(titulo, "Banda", duracion, 2000))
            .await;
        canciones.push(id(&creada));
    }

    Catalogo {
        usuario,
        otro_usuario,
        canciones,
    }
}

async fn favoritos_de(server: &TestServer, usuario: i64) -> Vec<Value> {
    let response = server
        .get(&format!("/api/usuarios/{}/favoritos", usuario))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

async fn total_favoritos(server: &TestServer) -> i64 {
    let response = server.get("/api/favoritos/").await;
    assert_eq!(response.status(), StatusCode::OK);
    total_count(&response)
}

#[tokio::test]
async fn test_create_favorito() {
    let server = spawn().await;
    let c = catalogo(&server).await;

    let favorito = server.crear_favorito(c.usuario, c.canciones[0]).await;
    assert_eq!(favorito["id_usuario"], c.usuario);
    assert_eq!(favorito["id_cancion"], c.canciones[0]);
    assert!(favorito["fecha_marcado"].as_str().is_some());

    let response = server.get(&format!("/api/favoritos/{}", id(&favorito))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detalle: Value = response.json().await.unwrap();
    assert_eq!(detalle["usuario"]["correo"], "ana@example.com");
    assert_eq!(detalle["cancion"]["titulo"], "Uno");
    assert_eq!(detalle["cancion"]["duracion_formateada"], "1:40");
}

#[tokio::test]
async fn test_duplicate_favorito_is_unprocessable() {
    let server = spawn().await;
    let c = catalogo(&server).await;

    server.crear_favorito(c.usuario, c.canciones[0]).await;

    let response = server
        .post(
            "/api/favoritos/",
            &json!({"id_usuario": c.usuario, "id_cancion": c.canciones[0]}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["campo"], "id_cancion");

    // Same cancion, different usuario is fine
    server.crear_favorito(c.otro_usuario, c.canciones[0]).await;
    assert_eq!(total_favoritos(&server).await, 2);
}

#[tokio::test]
async fn test_favorito_requires_existing_parents() {
    let server = spawn().await;
    let c = catalogo(&server).await;

    let response = server
        .post(
            "/api/favoritos/",
            &json!({"id_usuario": 9999, "id_cancion": c.canciones[0]}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .post(
            "/api/favoritos/",
            &json!({"id_usuario": c.usuario, "id_cancion": 9999}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server
        .post("/api/favoritos/", &json!({"id_usuario": c.usuario}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(total_favoritos(&server).await, 0);

    let response = server.get("/api/usuarios/9999/favoritos").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.get("/api/canciones/9999/favoritos").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_favorito() {
    let server = spawn().await;
    let c = catalogo(&server).await;

    let favorito = server.crear_favorito(c.usuario, c.canciones[0]).await;
    let path = format!("/api/favoritos/{}", id(&favorito));

    let response = server.delete(&path).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server.delete(&path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.get(&path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_favorito_by_pair() {
    let server = spawn().await;
    let c = catalogo(&server).await;

    server.crear_favorito(c.usuario, c.canciones[0]).await;
    server.crear_favorito(c.usuario, c.canciones[1]).await;

    let path = format!("/api/usuarios/{}/favoritos/{}", c.usuario, c.canciones[0]);
    let response = server.delete(&path).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server.delete(&path).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let restantes = favoritos_de(&server, c.usuario).await;
    assert_eq!(restantes.len(), 1);
    assert_eq!(restantes[0]["id_cancion"], c.canciones[1]);
}

#[tokio::test]
async fn test_delete_usuario_cascades_to_favoritos() {
    let server = spawn().await;
    let c = catalogo(&server).await;

    server.crear_favorito(c.usuario, c.canciones[0]).await;
    server.crear_favorito(c.usuario, c.canciones[1]).await;
    let ajeno = server.crear_favorito(c.otro_usuario, c.canciones[0]).await;

    let response = server.delete(&format!("/api/usuarios/{}", c.usuario)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = server.get(&format!("/api/usuarios/{}", c.usuario)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = server.get("/api/favoritos/").await;
    let restantes: Vec<Value> = response.json().await.unwrap();
    assert_eq!(restantes.len(), 1);
    assert_eq!(restantes[0]["id"], ajeno["id"]);

    for cancion in &c.canciones[..2] {
        let response = server.get(&format!("/api/canciones/{}", cancion)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_failed_cascade_leaves_favoritos_in_place() {
    let (server, pool) = spawn_with_pool(AppConfig::default()).await;
    let c = catalogo(&server).await;

    server.crear_favorito(c.usuario, c.canciones[0]).await;
    server.crear_favorito(c.usuario, c.canciones[1]).await;

    sqlx::query(
        r#"
        CREATE TRIGGER bloquear_borrado_usuarios
        BEFORE DELETE ON usuarios
        BEGIN
            SELECT RAISE(ABORT, 'borrado bloqueado');
        END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let response = server.delete(&format!("/api/usuarios/{}", c.usuario)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");

    let favoritos: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM favoritos WHERE id_usuario = ?")
            .bind(c.usuario)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(favoritos, 2);

    let response = server.get(&format!("/api/usuarios/{}", c.usuario)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(favoritos_de(&server, c.usuario).await.len(), 2);
}

#[tokio::test]
async fn test_delete_cancion_cascades_to_favoritos() {
    let server = spawn().await;
    let c = catalogo(&server).await;

    server.crear_favorito(c.usuario, c.canciones[0]).await;
    server.crear_favorito(c.otro_usuario, c.canciones[0]).await;
    server.crear_favorito(c.usuario, c.canciones[2]).await;

    let response = server
        .delete(&format!("/api/canciones/{}", c.canciones[0]))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(total_favoritos(&server).await, 1);
    assert!(favoritos_de(&server, c.otro_usuario).await.is_empty());

    let response = server
        .get(&format!("/api/canciones/{}/favoritos", c.canciones[2]))
        .await;
    let favoritos: Vec<Value> = response.json().await.unwrap();
    assert_eq!(favoritos.len(), 1);
    assert_eq!(favoritos[0]["usuario"]["nombre"], "Ana");
}

#[tokio::test]
async fn test_favoritos_listing_is_paginated() {
    let server = spawn().await;
    let c = catalogo(&server).await;

    for cancion in &c.canciones {
        server.crear_favorito(c.usuario, *cancion).await;
    }

    let response = server.get("/api/favoritos/?skip=1&limit=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(total_count(&response), 3);
    let pagina: Vec<Value> = response.json().await.unwrap();
    assert_eq!(pagina.len(), 1);
    assert_eq!(pagina[0]["id_cancion"], c.canciones[1]);
}
