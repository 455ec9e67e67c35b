//! Shared helpers for the HTTP integration tests
//!
//! Each test spawns the full router over a fresh in-memory database on an
//! ephemeral port and talks to it with a real HTTP client.

#![allow(dead_code)]

use musica_api::{AppConfig, AppState, create_router};
use musica_common::database::{init_memory_pool, run_migrations};
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

pub async fn spawn() -> TestServer {
    spawn_with(AppConfig::default()).await
}

pub async fn spawn_with(config: AppConfig) -> TestServer {
    spawn_with_pool(config).await.0
}

/// Spawn a server and keep a handle on its database
pub async fn spawn_with_pool(config: AppConfig) -> (TestServer, SqlitePool) {
    let pool = init_memory_pool().await.expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");

    let app = create_router(AppState::new(pool.clone(), config));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    let server = TestServer {
        base_url: format!("http://{}", addr),
        client: Client::new(),
    };
    (server, pool)
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.expect("GET")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client.delete(self.url(path)).send().await.expect("DELETE")
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST")
    }

    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT")
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Response {
        self.client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PATCH")
    }

    pub async fn crear_usuario(&self, nombre: &str, correo: &str) -> Value {
        let response = self
            .post("/api/usuarios/", &json!({"nombre": nombre, "correo": correo}))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("usuario JSON")
    }

    pub async fn crear_cancion(&self, cancion: Value) -> Value {
        let response = self.post("/api/canciones/", &cancion).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("cancion JSON")
    }

    pub async fn crear_favorito(&self, id_usuario: i64, id_cancion: i64) -> Value {
        let response = self
            .post(
                "/api/favoritos/",
                &json!({"id_usuario": id_usuario, "id_cancion": id_cancion}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("favorito JSON")
    }
}

pub fn cancion(titulo: &str, artista: &str, duracion: i64, anio: i64) -> Value {
    json!({
        "titulo": titulo,
        "artista": artista,
        "duracion": duracion,
        "anio": anio,
    })
}

pub fn id(value: &Value) -> i64 {
    value["id"].as_i64().expect("id")
}

pub fn total_count(response: &Response) -> i64 {
    response
        .headers()
        .get("x-total-count")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .expect("X-Total-Count header")
}
