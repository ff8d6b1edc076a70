#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

type Seen = Arc<Mutex<Vec<Value>>>;

/// Stand-in for the prediction service, recording every payload it receives.
pub struct Backend {
    pub addr: SocketAddr,
    received: Seen,
}

impl Backend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

async fn spawn(app: Router<Seen>, received: Seen) -> Backend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app.with_state(received.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Backend { addr, received }
}

/// Answers every `/predict` with `status` and the raw `body`.
pub async fn backend(status: StatusCode, body: &'static str) -> Backend {
    let app = Router::new().route(
        "/predict",
        post(
            move |State(seen): State<Seen>, Json(payload): Json<Value>| async move {
                seen.lock().unwrap().push(payload);
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            },
        ),
    );
    spawn(app, Arc::new(Mutex::new(Vec::new()))).await
}

/// Payloads with `households == 1` are answered slowly with 111, all others
/// immediately with 222.
pub async fn racing_backend(delay: Duration) -> Backend {
    let app = Router::new().route(
        "/predict",
        post(
            move |State(seen): State<Seen>, Json(payload): Json<Value>| async move {
                let slow = payload["households"] == 1.0;
                seen.lock().unwrap().push(payload);
                if slow {
                    tokio::time::sleep(delay).await;
                    Json(json!({ "prediction": 111.0 }))
                } else {
                    Json(json!({ "prediction": 222.0 }))
                }
            },
        ),
    );
    spawn(app, Arc::new(Mutex::new(Vec::new()))).await
}

/// A base URL nothing is listening on.
pub async fn offline_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
