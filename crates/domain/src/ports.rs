//! 投递渠道端口
//!
//! 站内信和邮件是两条独立渠道：站内信写入成功即计入 sent，
//! 邮件只在收件人偏好允许时追加尝试，失败不影响站内信计数。

use async_trait::async_trait;
use notifier_core::NotifierResult;

use crate::values::{NotificationCategory, NotificationPriority};

/// 站内信收件箱
#[async_trait]
pub trait InboxSink: Send + Sync {
    /// 为收件人创建一条站内通知，返回通知记录ID
    async fn create_notification(
        &self,
        recipient: i64,
        title: &str,
        body: &str,
        category: NotificationCategory,
        link: Option<&str>,
    ) -> NotifierResult<i64>;
}

/// 外发邮件内容
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub priority: NotificationPriority,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
}

/// 邮件传输端口
///
/// 失败是收件人级别的可恢复错误，调用方逐个收件人捕获，
/// 绝不向整批投递传播。
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> NotifierResult<()>;
}
