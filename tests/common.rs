use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use tower::ServiceExt;

use mediadesk::admin::auth::hash_password;
use mediadesk::config::{AdminUser, SiteConfig};
use mediadesk::state::AppState;
use mediadesk::storage::MemoryBackend;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password123";
pub const BOUNDARY: &str = "mediadesk-test-boundary";

/// 最小 PNG 文件头
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

pub async fn test_state() -> AppState {
    let mut config = SiteConfig::default();
    config.auth.jwt_secret = "test-secret".into();
    config.auth.users = vec![AdminUser {
        username: USERNAME.into(),
        password_hash: hash_password(PASSWORD).unwrap(),
    }];
    AppState::with_backend(config, Arc::new(MemoryBackend::new()))
        .await
        .unwrap()
}

pub async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    (mediadesk::app(state.clone()), state)
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::get(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn post_form(app: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(req.body(Body::from(body.to_owned())).unwrap())
        .await
        .unwrap()
}

pub async fn post_multipart(app: &Router, uri: &str, body: Vec<u8>, cookie: &str) -> Response<Body> {
    let req = Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

/// 登录并返回可直接放进 Cookie 头的会话值
pub async fn login(app: &Router) -> String {
    let resp = post_form(
        app,
        "/admin/login",
        &format!("username={USERNAME}&password={PASSWORD}"),
        None,
    )
    .await;
    assert_eq!(location(&resp), "/admin");
    let set_cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
