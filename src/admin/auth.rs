use crate::admin::layout;
use crate::config::AdminUser;
use crate::state::AppState;
use anyhow::{Context, Result};
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{Form, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 60 秒窗口内最多允许的登录尝试次数
const LOGIN_ATTEMPTS: usize = 5;
const LOGIN_WINDOW: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    jti: String,
}

// ── 密码工具 ──

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("密码哈希失败: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("解析密码哈希失败: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// 在配置的用户列表中校验凭据
pub fn check_credentials<'a>(users: &'a [AdminUser], username: &str, password: &str) -> Option<&'a AdminUser> {
    let user = users.iter().find(|u| u.username == username)?;
    match verify_password(password, &user.password_hash) {
        Ok(true) => Some(user),
        Ok(false) => None,
        Err(e) => {
            tracing::warn!(username, "用户密码哈希无效：{e}");
            None
        }
    }
}

// ── JWT 工具 ──

fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    anyhow::ensure!(s.len() >= 2, "无效的时间格式: {s}");
    let (num_str, unit) = s.split_at(s.len() - 1);
    let num: u64 = num_str.parse().context("无效的时间数值")?;
    let secs = match unit {
        "d" => num * 86400,
        "h" => num * 3600,
        "m" => num * 60,
        "s" => num,
        _ => anyhow::bail!("不支持的时间单位: {unit}"),
    };
    Ok(Duration::from_secs(secs))
}

fn create_jwt(username: &str, jwt_secret: &str, expires_in: &str) -> Result<String> {
    let duration = parse_duration(expires_in)?;
    let exp = chrono::Utc::now().timestamp() as usize + duration.as_secs() as usize;

    let claims = Claims {
        sub: username.to_owned(),
        exp,
        jti: ulid::Ulid::new().to_string(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .context("JWT 编码失败")
}

fn decode_jwt(token: &str, jwt_secret: &str) -> Result<Claims> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .context("JWT 解码失败")?;
    Ok(data.claims)
}

fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{name}={value}; HttpOnly; SameSite=Strict; Path=/admin; Max-Age={max_age_secs}{secure_flag}"
    )
}

fn with_cookie(mut resp: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            resp.headers_mut().insert(SET_COOKIE, value);
        }
        Err(e) => tracing::error!("无法写入会话 cookie：{e}"),
    }
    resp
}

// ── 路由处理 ──

pub async fn login_page(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Html<String> {
    Html(layout::login_page(&state.config.site.title, query.error.is_some()))
}

pub async fn login_submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let client_ip = client_ip(&headers);

    if !allow_attempt(&state, &client_ip) {
        tracing::warn!(%client_ip, "登录请求过于频繁");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many login attempts. Please try again later.",
        )
            .into_response();
    }

    let Some(user) = check_credentials(&state.config.auth.users, &form.username, &form.password) else {
        tracing::info!(username = %form.username, "登录失败");
        return Redirect::to("/admin/login?error=1").into_response();
    };

    let auth = &state.config.auth;
    match create_jwt(&user.username, &state.jwt_secret, &auth.jwt_expires_in) {
        Ok(token) => {
            let duration = parse_duration(&auth.jwt_expires_in).unwrap_or(Duration::from_secs(7 * 86400));
            let cookie = build_cookie(
                &auth.session_name,
                &token,
                duration.as_secs() as i64,
                state.is_https,
            );
            tracing::info!(username = %user.username, "登录成功");
            with_cookie(Redirect::to("/admin").into_response(), &cookie)
        }
        Err(e) => {
            tracing::error!("签发会话失败：{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Login failed.").into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>) -> Response {
    let clear_cookie = build_cookie(&state.config.auth.session_name, "", 0, state.is_https);
    with_cookie(Redirect::to("/admin/login").into_response(), &clear_cookie)
}

// ── 认证中间件 ──

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth = &state.config.auth;

    let Some(token) = extract_token(req.headers(), &auth.session_name) else {
        return redirect_to_login();
    };

    let claims = match decode_jwt(&token, &state.jwt_secret) {
        Ok(c) => c,
        Err(_) => return redirect_to_login(),
    };

    // 用户从配置中移除后旧会话立即失效
    if !auth.users.iter().any(|u| u.username == claims.sub) {
        return redirect_to_login();
    }

    req.extensions_mut().insert(AuthUser {
        username: claims.sub.clone(),
    });

    let mut resp = next.run(req).await;

    // 自动续期：剩余时间不足总有效期的 1/3 时签发新 token
    if let Ok(total_duration) = parse_duration(&auth.jwt_expires_in) {
        let now = chrono::Utc::now().timestamp() as usize;
        let remaining = claims.exp.saturating_sub(now);
        let threshold = total_duration.as_secs() as usize / 3;

        if remaining < threshold
            && let Ok(new_token) = create_jwt(&claims.sub, &state.jwt_secret, &auth.jwt_expires_in)
        {
            let cookie = build_cookie(
                &auth.session_name,
                &new_token,
                total_duration.as_secs() as i64,
                state.is_https,
            );
            if let Ok(val) = HeaderValue::from_str(&cookie) {
                resp.headers_mut().insert(SET_COOKIE, val);
            }
        }
    }

    resp
}

// ── 辅助函数 ──

/// 优先 x-forwarded-for，回退到 x-real-ip
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_owned())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_owned())
        })
        .unwrap_or_else(|| "unknown".to_owned())
}

fn allow_attempt(state: &AppState, client_ip: &str) -> bool {
    let mut limiter = state.login_limiter.lock().unwrap_or_else(|e| e.into_inner());
    record_attempt(&mut limiter, client_ip, Instant::now())
}

fn record_attempt(limiter: &mut HashMap<String, Vec<Instant>>, client_ip: &str, now: Instant) -> bool {
    // 清掉窗口外的记录，没有剩余尝试的 IP 整条移除
    limiter.retain(|_, attempts| {
        attempts.retain(|t| now.duration_since(*t) < LOGIN_WINDOW);
        !attempts.is_empty()
    });

    let attempts = limiter.entry(client_ip.to_owned()).or_default();
    if attempts.len() >= LOGIN_ATTEMPTS {
        return false;
    }
    attempts.push(now);
    true
}

fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let header_str = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for pair in header_str.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(cookie_name) {
            let value = value.strip_prefix('=')?;
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }
    None
}

fn redirect_to_login() -> Response {
    Redirect::to("/admin/login").into_response()
}
