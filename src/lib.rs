pub mod admin;
pub mod backend;
pub mod browse;
pub mod config;
pub mod contact;
pub mod content;
pub mod editor;
pub mod error;
pub mod form;
pub mod listing;
pub mod media;
pub mod site;
pub mod state;
pub mod storage;
pub mod store;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// 前台与后台合并后的完整路由
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(site::router())
        .merge(admin::router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
