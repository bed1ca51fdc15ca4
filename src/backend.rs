use crate::config::BackendConfig;

/// 第三方后端客户端
///
/// 启动时按配置创建并放进 [`AppState`](crate::state::AppState)，目前只在健康检查中
/// 报告是否已配置，内容读写仍走本地存储。
#[derive(Clone)]
pub struct BackendClient {
    url: String,
    anon_key: String,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        if config.url.is_empty() || config.anon_key.is_empty() {
            tracing::error!("后端地址与匿名密钥都需要配置，请检查 mediadesk.toml 的 [backend] 段");
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("mediadesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: config.url.trim_end_matches('/').to_owned(),
            anon_key: config.anon_key.clone(),
            http,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.anon_key.is_empty()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 带上匿名密钥的请求构造器
    ///
    /// 访问后端的唯一入口；内容读写迁到后端时从这里发请求，不要另建 `reqwest::Client`。
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.url, path.trim_start_matches('/')))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}
