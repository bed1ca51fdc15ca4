//! 联系表单：转发到外部脚本地址，未配置时只做本地模拟。

use serde::{Deserialize, Serialize};

use crate::config::ContactConfig;
use crate::error::ContactError;

pub const SUCCESS_MESSAGE: &str = "Thank you! Your message has been sent successfully.";
pub const SIMULATED_MESSAGE: &str =
    "This is a simulation. Set the contact endpoint in mediadesk.toml to enable live submissions.";
pub const FAILURE_MESSAGE: &str =
    "An error occurred while sending your message. Please try again later.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Sent,
    Simulated,
}

impl ContactOutcome {
    pub fn message(self) -> &'static str {
        match self {
            ContactOutcome::Sent => SUCCESS_MESSAGE,
            ContactOutcome::Simulated => SIMULATED_MESSAGE,
        }
    }
}

/// 远端返回 `{"result":"success"}` 或 `{"error":"..."}`
#[derive(Debug, Default, Deserialize)]
pub struct ContactResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ContactResponse {
    pub fn into_result(self) -> Result<(), ContactError> {
        if self.result.as_deref() == Some("success") {
            return Ok(());
        }
        Err(ContactError::Rejected(
            self.error
                .unwrap_or_else(|| "An unknown error occurred.".to_string()),
        ))
    }
}

#[derive(Clone)]
pub struct ContactClient {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl ContactClient {
    pub fn new(config: &ContactConfig) -> Result<Self, ContactError> {
        let endpoint = config.endpoint.clone().filter(|e| !e.trim().is_empty());
        if endpoint.is_none() {
            tracing::warn!("未配置联系表单地址，提交将只做模拟");
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("mediadesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, endpoint })
    }

    pub fn is_simulated(&self) -> bool {
        self.endpoint.is_none()
    }

    pub async fn submit(&self, message: &ContactMessage) -> Result<ContactOutcome, ContactError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::info!(email = %message.email, "模拟联系表单提交");
            return Ok(ContactOutcome::Simulated);
        };

        let response: ContactResponse = self
            .http
            .post(endpoint)
            .form(message)
            .send()
            .await?
            .json()
            .await?;

        response.into_result()?;
        Ok(ContactOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_contract() {
        let ok: ContactResponse = serde_json::from_str(r#"{"result":"success"}"#).unwrap();
        assert!(ok.into_result().is_ok());

        let rejected: ContactResponse = serde_json::from_str(r#"{"error":"quota"}"#).unwrap();
        assert!(matches!(rejected.into_result(), Err(ContactError::Rejected(e)) if e == "quota"));

        let unknown: ContactResponse = serde_json::from_str(r#"{"result":"error"}"#).unwrap();
        assert!(matches!(
            unknown.into_result(),
            Err(ContactError::Rejected(e)) if e == "An unknown error occurred."
        ));
    }

    #[tokio::test]
    async fn unconfigured_endpoint_is_simulated() {
        let client = ContactClient::new(&ContactConfig {
            endpoint: Some("  ".into()),
        })
        .unwrap();
        assert!(client.is_simulated());
        let outcome = client.submit(&ContactMessage::default()).await.unwrap();
        assert_eq!(outcome, ContactOutcome::Simulated);
        assert_eq!(outcome.message(), SIMULATED_MESSAGE);
    }
}
