#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;

use ziyara_catalog::{config::Config, db, routes, AppState};

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

/// Fresh in-memory database with the schema applied.
pub async fn spawn_app() -> TestApp {
    let config = Config::for_database("sqlite::memory:");
    let db = db::connect(&config).await.expect("connect");
    migration::Migrator::up(&db, None).await.expect("migrate");

    let state = AppState {
        db: db.clone(),
        config,
    };
    TestApp {
        router: routes::create_router(state),
        db,
    }
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        (status, json_body(response.into_body()).await)
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

    pub async fn put_empty(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates a city through the API and returns its id.
    pub async fn create_city(&self, name: &str, region: &str, latitude: f64, longitude: f64) -> i64 {
        let (status, body) = self
            .post(
                "/api/cities",
                json!({
                    "name": name,
                    "region": region,
                    "latitude": latitude,
                    "longitude": longitude,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_i64().expect("city id")
    }

    /// Creates a destination through the API from a partial body; `cityId`
    /// and the given fields are merged over sensible defaults.
    pub async fn create_destination(&self, city_id: i64, fields: Value) -> Value {
        let mut body = json!({
            "name": "Unnamed spot",
            "type": "CULTURAL",
            "cityId": city_id,
            "latitude": 0.0,
            "longitude": 0.0,
        });
        if let (Some(target), Some(extra)) = (body.as_object_mut(), fields.as_object()) {
            for (key, value) in extra {
                target.insert(key.clone(), value.clone());
            }
        }

        let (status, body) = self.post("/api/destinations", body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }
}

pub async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.expect("body").to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("array")
        .iter()
        .map(|item| item["name"].as_str().expect("name").to_string())
        .collect()
}
