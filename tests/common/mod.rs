#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use chrono::NaiveDate;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use sart::server::{AppState, create_router};
use sart::store::{SqliteStore, Store, TicketPolicy};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

/// A freshly initialized database in a temp dir.
pub struct TestDb {
    pub temp_dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        let db = Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        };
        db.open().initialize().expect("initialize schema");
        db
    }

    pub fn path(&self) -> PathBuf {
        self.temp_dir.path().join("sart.db")
    }

    /// Opens another connection to the same database file.
    pub fn open(&self) -> SqliteStore {
        SqliteStore::new(self.path()).expect("open store")
    }

    pub fn count(&self, table: &str) -> i64 {
        let store = self.open();
        let conn = store.connection();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count rows")
    }
}

/// The HTTP router wired to a temp database, driven in-process.
pub struct TestApp {
    pub db: TestDb,
    pub router: Router,
}

impl TestApp {
    pub fn new(today: NaiveDate) -> Self {
        Self::with_policy(today, TicketPolicy::default())
    }

    pub fn with_policy(today: NaiveDate, policy: TicketPolicy) -> Self {
        let db = TestDb::new();
        let store = db.open().with_ticket_policy(policy);
        store.ensure_periods(today).expect("seed periods");
        let state = AppState::new(Arc::new(store)).with_today(today);
        let router = create_router(Arc::new(state));
        Self { db, router }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}
