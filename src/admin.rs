use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};

use crate::media::parse_max_size;
use crate::state::AppState;

pub mod auth;
pub mod content;
pub mod health;
pub mod layout;

/// 表单里最多同时携带两张图片，再留出正文的余量
const FORM_OVERHEAD: usize = 2 * 1024 * 1024;

pub fn router(state: AppState) -> Router<AppState> {
    // 无需认证的路由
    let public_routes = Router::new()
        .route("/admin/login", get(auth::login_page).post(auth::login_submit))
        .route("/health", get(health::health_check));

    let body_limit = parse_max_size(&state.config.media.max_file_size) * 2 + FORM_OVERHEAD;

    // 需要认证的路由
    let protected_routes = Router::new()
        .route("/admin", get(content::dashboard))
        .route("/admin/logout", post(auth::logout))
        // 内容管理
        .route("/admin/content", post(content::submit_content))
        .route("/admin/content/{id}/edit", get(content::edit_content))
        .route(
            "/admin/content/{id}/delete",
            get(content::confirm_delete_page).post(content::delete_content),
        )
        // 编辑器插图
        .route("/admin/api/editor/image", post(content::api_editor_image))
        .layer(DefaultBodyLimit::max(body_limit))
        // 应用认证中间件
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth));

    Router::new().merge(public_routes).merge(protected_routes)
}
