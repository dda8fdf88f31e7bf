use thiserror::Error;

/// 通知引擎错误类型定义
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("触发器未找到: {id}")]
    TriggerNotFound { id: i64 },

    #[error("定时通知未找到: {id}")]
    NotificationNotFound { id: i64 },

    #[error("无效的CRON表达式: {expr} - {message}")]
    InvalidCron { expr: String, message: String },

    #[error("触发器 {id} 缺少CRON表达式")]
    MissingSchedule { id: i64 },

    #[error("消息模板未找到: {0}")]
    TemplateNotFound(String),

    #[error("未知的受众类别: {0}")]
    UnknownAudience(String),

    #[error("定时通知 {id} 已发送，不能再修改")]
    AlreadySent { id: i64 },

    #[error("计划发送时间必须晚于当前时间")]
    ScheduleInPast,

    #[error("邮件发送错误: {0}")]
    EmailTransport(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type NotifierResult<T> = std::result::Result<T, NotifierError>;
