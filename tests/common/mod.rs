//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use lms::{
    config::Config,
    models::{profile::Profile, user::Role},
    routes,
    state::AppState,
    store::{MemoryStore, PgStore},
    utils::jwt::sign_jwt,
};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::{Mutex, MutexGuard};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";
pub const INSTRUCTOR_ID: i64 = 1;
pub const STUDENT_ID: i64 = 2;
pub const OTHER_STUDENT_ID: i64 = 3;
pub const TOKEN_TTL_SECS: u64 = 600;

/// Serializes tests that share the Postgres test database.
static PG_LOCK: Mutex<()> = Mutex::const_new(());

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

/// Connects to `TEST_DATABASE_URL`, applies migrations and empties every
/// table. Hold the returned guard for the whole test.
pub async fn setup_pg_store() -> (PgStore, sqlx::PgPool, MutexGuard<'static, ()>) {
    let guard = PG_LOCK.lock().await;

    let url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for Postgres tests");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    sqlx::query("TRUNCATE phases, profiles RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to reset tables");

    (PgStore::new(pool.clone()), pool, guard)
}

/// A running server plus authenticated clients for each role.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    pub instructor_token: String,
    pub student_token: String,
}

/// Spawns the app on a random port, backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: None,
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
    };

    let store = Arc::new(MemoryStore::new());
    for (user_id, role, name) in [
        (INSTRUCTOR_ID, Role::Instructor, "Ina Instructor"),
        (STUDENT_ID, Role::Student, "Sam Student"),
        (OTHER_STUDENT_ID, Role::Student, "Sol Student"),
    ] {
        store
            .insert_profile(Profile {
                user_id,
                full_name: Some(name.to_string()),
                email: None,
                role,
            })
            .await;
    }

    let state = AppState {
        store: store.clone(),
        config,
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        store,
        instructor_token: token_for(INSTRUCTOR_ID, Role::Instructor),
        student_token: token_for(STUDENT_ID, Role::Student),
    }
}

pub fn token_for(user_id: i64, role: Role) -> String {
    sign_jwt(user_id, role, JWT_SECRET, TOKEN_TTL_SECS).expect("Failed to sign test token")
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, token: &str, path: &str, confirm: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .query(&[("confirm", confirm)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Creates a phase as the instructor and returns its id.
    pub async fn create_phase(&self, title: &str) -> i64 {
        let resp = self
            .post(&self.instructor_token, "/phases", json!({ "title": title }))
            .await;
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    pub async fn create_section(&self, phase_id: i64, title: &str) -> i64 {
        let resp = self
            .post(
                &self.instructor_token,
                &format!("/phases/{}/sections", phase_id),
                json!({ "title": title, "description": "" }),
            )
            .await;
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<Value>().await.unwrap()["id"].as_i64().unwrap()
    }

    pub async fn create_module(&self, section_id: i64, body: Value) -> Value {
        let resp = self
            .post(
                &self.instructor_token,
                &format!("/sections/{}/modules", section_id),
                body,
            )
            .await;
        assert_eq!(resp.status().as_u16(), 201);
        resp.json::<Value>().await.unwrap()
    }

    /// Seeds one section with published modules titled `titles`, returning their ids.
    pub async fn seed_section(&self, titles: &[&str]) -> (i64, i64, Vec<i64>) {
        let phase_id = self.create_phase("Foundations").await;
        let section_id = self.create_section(phase_id, "Basics").await;
        let mut ids = Vec::new();
        for title in titles {
            let module = self.create_module(section_id, json!({ "title": title })).await;
            ids.push(module["id"].as_i64().unwrap());
        }
        (phase_id, section_id, ids)
    }
}

/// Module ids in display order from a `/curriculum` payload.
pub fn module_ids(curriculum: &Value) -> Vec<i64> {
    curriculum["phases"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|p| p["sections"].as_array().unwrap().iter())
        .flat_map(|s| s["modules"].as_array().unwrap().iter())
        .map(|m| m["id"].as_i64().unwrap())
        .collect()
}
