#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use cookie::Key;
use movie_shelf::{
    AppState, build_router, config::Config, db, store::MovieStore, tmdb::MetadataProvider,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub store: MovieStore,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

pub async fn spawn_app(metadata: Arc<dyn MetadataProvider>, csrf_enabled: bool) -> TestApp {
    let dir = TempDir::new().unwrap();
    let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("movies.db").display());
    let store = MovieStore::new(db::connect_and_migrate(&database_url).await.unwrap());

    let config = Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        tmdb_api_key: "test-key".to_string(),
        tmdb_base_url: "http://127.0.0.1:9".to_string(),
        tmdb_image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
        tmdb_rps: 50,
        database_url,
        secret_key: None,
        csrf_enabled,
    };

    let state = AppState {
        config: Arc::new(config),
        store: store.clone(),
        metadata,
        cookie_key: Key::generate(),
    };

    TestApp { router: build_router(state), store, _dir: dir }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        TestResponse { status, headers, body: String::from_utf8(bytes.to_vec()).unwrap() }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str) -> TestResponse {
        self.send(form_request(uri, form, None)).await
    }
}

pub fn form_request(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::from(form.to_string())).unwrap()
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    /// `name=value` part of the first `Set-Cookie` header.
    pub fn cookie_pair(&self) -> Option<String> {
        let raw = self.headers.get(header::SET_COOKIE)?.to_str().ok()?;
        raw.split(';').next().map(str::to_string)
    }

    pub fn csrf_token(&self) -> Option<String> {
        let marker = r#"name="csrf_token" value=""#;
        let start = self.body.find(marker)? + marker.len();
        let len = self.body[start..].find('"')?;
        Some(self.body[start..start + len].to_string())
    }
}
