use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "mediadesk.toml";

#[derive(Debug, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteInfo,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Deserialize)]
pub struct SiteInfo {
    #[serde(default = "default_site_title")]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// SQLite 文件名，相对项目根目录
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_content_key")]
    pub content_key: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expires_in")]
    pub jwt_expires_in: String,
    #[serde(default = "default_session_name")]
    pub session_name: String,
    #[serde(default)]
    pub users: Vec<AdminUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub username: String,
    /// argon2 PHC 字符串，可用 `mediadesk hash-password` 生成
    pub password_hash: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: String,
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_latest_per_type")]
    pub latest_per_type: usize,
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactConfig {
    /// 未配置时联系表单只做本地模拟
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

impl SiteConfig {
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);
        if !config_path.exists() {
            tracing::warn!("未找到 {CONFIG_FILE}，使用默认配置");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("读取 {CONFIG_FILE} 失败：{}", e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("解析 {CONFIG_FILE} 失败：{}", e))
    }
}

// 默认值函数
fn default_site_title() -> String { "Media Desk".into() }
fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }
fn default_log_level() -> String { "info".into() }
fn default_database() -> String { "mediadesk.db".into() }
fn default_content_key() -> String { "mediaContent".into() }
fn default_jwt_secret() -> String { "CHANGE_ME_IN_PRODUCTION".into() }
fn default_jwt_expires_in() -> String { "7d".into() }
fn default_session_name() -> String { "mediadesk_session".into() }
fn default_max_file_size() -> String { "5MB".into() }
fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".into(),
        "image/png".into(),
        "image/gif".into(),
        "image/webp".into(),
    ]
}
fn default_page_size() -> usize { 24 }
fn default_latest_per_type() -> usize { 2 }
fn default_excerpt_length() -> usize { 120 }

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            url: String::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            content_key: default_content_key(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_expires_in: default_jwt_expires_in(),
            session_name: default_session_name(),
            users: Vec::new(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            latest_per_type: default_latest_per_type(),
            excerpt_length: default_excerpt_length(),
        }
    }
}
