//! In-process HTTP helpers: build the router around mock dependencies and
//! drive it with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use aadhaar_verify::domains::verification::{
    IdentityDirectory, PendingVerifications, SharedSlot,
};
use aadhaar_verify::kernel::test_dependencies::{MockDirectory, MockOtpProvider};
use aadhaar_verify::kernel::ServerDeps;
use aadhaar_verify::server::{build_app, middleware::cors_layer};
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub directory: MockDirectory,
    pub provider: MockOtpProvider,
    pub pending: Arc<dyn PendingVerifications>,
}

impl TestApp {
    pub fn new(directory: MockDirectory, provider: MockOtpProvider) -> Self {
        Self::with_pending(directory, provider, Arc::new(SharedSlot::new()))
    }

    pub fn with_pending(
        directory: MockDirectory,
        provider: MockOtpProvider,
        pending: Arc<dyn PendingVerifications>,
    ) -> Self {
        let deps = ServerDeps::new(
            IdentityDirectory::new(Arc::new(directory.clone()), "+91"),
            Arc::new(provider.clone()),
            pending.clone(),
        );
        let router = build_app(deps, cors_layer(&[], false));
        Self {
            router,
            directory,
            provider,
            pending,
        }
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(path, body.to_string()).await
    }

    pub async fn post_raw(&self, path: &str, body: String) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&self, path: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}
