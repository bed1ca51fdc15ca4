use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::backend::BackendClient;
use crate::config::SiteConfig;
use crate::contact::ContactClient;
use crate::storage::{KeyValueBackend, SqliteBackend};
use crate::store::ContentStore;

const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";
const JWT_SECRET_KEY: &str = "jwtSecret";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    /// 原始键值存储，内容集合之外的少量键（如自动生成的 JWT 密钥）也放在这里
    pub kv: Arc<dyn KeyValueBackend>,
    pub store: ContentStore,
    pub contact: ContactClient,
    pub backend: BackendClient,
    /// 登录速率限制：IP -> 登录尝试时间戳列表
    pub login_limiter: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
    /// 实际使用的 JWT 密钥（优先配置文件，其次存储中持久化的自动生成值）
    pub jwt_secret: Arc<String>,
    /// 站点是否通过 HTTPS 提供服务（根据 site.url 判断）
    pub is_https: bool,
}

impl AppState {
    /// 打开项目根目录下的 SQLite 文件并执行迁移
    pub async fn open(project_root: &Path, config: SiteConfig) -> Result<Self> {
        let db_path = project_root.join(&config.storage.database);
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .connect(&db_url)
            .await
            .with_context(|| format!("打开数据库 {} 失败", db_path.display()))?;

        let backend = SqliteBackend::new(pool);
        backend
            .migrate()
            .await
            .map_err(|e| anyhow::anyhow!("数据库迁移失败：{}", e))?;

        Self::with_backend(config, Arc::new(backend)).await
    }

    pub async fn with_backend(config: SiteConfig, kv: Arc<dyn KeyValueBackend>) -> Result<Self> {
        let jwt_secret = resolve_jwt_secret(&config.auth.jwt_secret, kv.as_ref()).await?;
        let store = ContentStore::new(kv.clone(), config.storage.content_key.clone());
        let contact = ContactClient::new(&config.contact).context("创建联系表单客户端失败")?;
        let backend = BackendClient::new(&config.backend).context("创建后端客户端失败")?;

        if config.auth.users.is_empty() {
            tracing::warn!("未配置任何后台用户，可用 `mediadesk hash-password` 生成密码哈希");
        }

        let is_https = config.site.url.starts_with("https://");

        Ok(Self {
            config: Arc::new(config),
            kv,
            store,
            contact,
            backend,
            login_limiter: Arc::new(Mutex::new(HashMap::new())),
            jwt_secret: Arc::new(jwt_secret),
            is_https,
        })
    }
}

/// 配置文件显式设置 > 存储中持久化 > 自动生成新密钥
async fn resolve_jwt_secret(config_secret: &str, kv: &dyn KeyValueBackend) -> Result<String> {
    if config_secret != DEFAULT_JWT_SECRET && !config_secret.is_empty() {
        return Ok(config_secret.to_owned());
    }

    tracing::warn!("JWT secret 未配置或为默认值，将使用自动生成的安全密钥");

    if let Some(secret) = kv.get(JWT_SECRET_KEY).await? {
        return Ok(secret);
    }

    let secret = generate_random_secret();
    kv.set(JWT_SECRET_KEY, &secret).await?;

    tracing::info!("已自动生成 JWT secret 并持久化");
    Ok(secret)
}

fn generate_random_secret() -> String {
    use argon2::password_hash::rand_core::{OsRng, RngCore};

    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    #[tokio::test]
    async fn generated_secret_is_persisted_once() {
        let kv: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
        let first = AppState::with_backend(SiteConfig::default(), kv.clone()).await.unwrap();
        let second = AppState::with_backend(SiteConfig::default(), kv.clone()).await.unwrap();
        assert_eq!(first.jwt_secret.len(), 128);
        assert_eq!(first.jwt_secret, second.jwt_secret);
    }

    #[tokio::test]
    async fn configured_secret_wins() {
        let mut config = SiteConfig::default();
        config.auth.jwt_secret = "from-config".into();
        let state = AppState::with_backend(config, Arc::new(MemoryBackend::new())).await.unwrap();
        assert_eq!(state.jwt_secret.as_str(), "from-config");
        assert!(!state.is_https);
    }
}
