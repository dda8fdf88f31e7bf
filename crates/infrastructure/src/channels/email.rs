use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use notifier_core::{EmailConfig, NotifierError, NotifierResult};
use notifier_domain::ports::{EmailMessage, EmailTransport};

/// 根据配置构造邮件传输实现
pub fn build_email_transport(config: &EmailConfig) -> NotifierResult<Arc<dyn EmailTransport>> {
    match config.mode.as_str() {
        "log" => Ok(Arc::new(LogEmailTransport::new(&config.from_address))),
        "http" => {
            let endpoint = config.relay_endpoint.as_deref().ok_or_else(|| {
                NotifierError::Configuration(
                    "email.mode 为 http 时必须配置 email.relay_endpoint".to_string(),
                )
            })?;
            Ok(Arc::new(HttpEmailTransport::new(
                endpoint,
                &config.from_address,
                Duration::from_secs(config.request_timeout_seconds),
            )?))
        }
        other => Err(NotifierError::Configuration(format!(
            "不支持的邮件发送方式: {other}"
        ))),
    }
}

/// 只记录日志的邮件传输，开发和测试环境使用
pub struct LogEmailTransport {
    from_address: String,
}

impl LogEmailTransport {
    pub fn new(from_address: &str) -> Self {
        Self {
            from_address: from_address.to_string(),
        }
    }
}

#[async_trait]
impl EmailTransport for LogEmailTransport {
    async fn send(&self, message: &EmailMessage) -> NotifierResult<()> {
        info!(
            "邮件(仅日志): {} -> {} [{}] {}",
            self.from_address,
            message.to,
            message.priority.as_str(),
            message.subject
        );
        Ok(())
    }
}

/// 通过HTTP中继服务发送邮件
pub struct HttpEmailTransport {
    client: reqwest::Client,
    endpoint: String,
    from_address: String,
}

impl HttpEmailTransport {
    pub fn new(endpoint: &str, from_address: &str, timeout: Duration) -> NotifierResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifierError::EmailTransport(format!("构造HTTP客户端失败: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            from_address: from_address.to_string(),
        })
    }
}

#[async_trait]
impl EmailTransport for HttpEmailTransport {
    async fn send(&self, message: &EmailMessage) -> NotifierResult<()> {
        let payload = json!({
            "from": self.from_address,
            "to": message.to,
            "subject": message.subject,
            "body": message.body,
            "priority": message.priority.as_str(),
            "action_url": message.action_url,
            "action_text": message.action_text,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifierError::EmailTransport(format!("请求邮件中继失败: {e}")))?;

        if !response.status().is_success() {
            return Err(NotifierError::EmailTransport(format!(
                "邮件中继返回错误状态: {}",
                response.status()
            )));
        }

        debug!("邮件已提交中继: {} -> {}", self.from_address, message.to);
        Ok(())
    }
}
