use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 受众类别
///
/// 封闭枚举：新增类别必须同时补全解析器的分支，由编译器强制检查。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AudienceClass {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "top_performers")]
    TopPerformers,
    #[serde(rename = "new_students")]
    NewStudents,
    #[serde(rename = "inactive")]
    Inactive,
    #[serde(rename = "high_achievers")]
    HighAchievers,
}

impl AudienceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceClass::All => "all",
            AudienceClass::TopPerformers => "top_performers",
            AudienceClass::NewStudents => "new_students",
            AudienceClass::Inactive => "inactive",
            AudienceClass::HighAchievers => "high_achievers",
        }
    }
}

impl FromStr for AudienceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(AudienceClass::All),
            "top_performers" => Ok(AudienceClass::TopPerformers),
            "new_students" => Ok(AudienceClass::NewStudents),
            "inactive" => Ok(AudienceClass::Inactive),
            "high_achievers" => Ok(AudienceClass::HighAchievers),
            other => Err(format!("Invalid audience class: {other}")),
        }
    }
}

impl fmt::Display for AudienceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl sqlx::Type<sqlx::Sqlite> for AudienceClass {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for AudienceClass {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        AudienceClass::from_str(s).map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for AudienceClass {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 触发器类型，目前只有定时触发，保留扩展空间
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TriggerKind {
    #[serde(rename = "SCHEDULED")]
    Scheduled,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Scheduled => "SCHEDULED",
        }
    }
}

impl FromStr for TriggerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(TriggerKind::Scheduled),
            other => Err(format!("Invalid trigger kind: {other}")),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for TriggerKind {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for TriggerKind {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        TriggerKind::from_str(s).map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for TriggerKind {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 通知优先级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationPriority {
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "URGENT")]
    Urgent,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "LOW",
            NotificationPriority::Normal => "NORMAL",
            NotificationPriority::High => "HIGH",
            NotificationPriority::Urgent => "URGENT",
        }
    }
}

impl FromStr for NotificationPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(NotificationPriority::Low),
            "NORMAL" => Ok(NotificationPriority::Normal),
            "HIGH" => Ok(NotificationPriority::High),
            "URGENT" => Ok(NotificationPriority::Urgent),
            other => Err(format!("Invalid notification priority: {other}")),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for NotificationPriority {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for NotificationPriority {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        NotificationPriority::from_str(s).map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for NotificationPriority {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 通知类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationCategory {
    #[serde(rename = "ANNOUNCEMENT")]
    Announcement,
    #[serde(rename = "ACHIEVEMENT")]
    Achievement,
    #[serde(rename = "REMINDER")]
    Reminder,
    #[serde(rename = "DIGEST")]
    Digest,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Announcement => "ANNOUNCEMENT",
            NotificationCategory::Achievement => "ACHIEVEMENT",
            NotificationCategory::Reminder => "REMINDER",
            NotificationCategory::Digest => "DIGEST",
        }
    }
}

impl FromStr for NotificationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ANNOUNCEMENT" => Ok(NotificationCategory::Announcement),
            "ACHIEVEMENT" => Ok(NotificationCategory::Achievement),
            "REMINDER" => Ok(NotificationCategory::Reminder),
            "DIGEST" => Ok(NotificationCategory::Digest),
            other => Err(format!("Invalid notification category: {other}")),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for NotificationCategory {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for NotificationCategory {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        NotificationCategory::from_str(s).map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for NotificationCategory {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}

/// 收件人的邮件摘要频率偏好（外部用户记录，只读）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DigestFrequency {
    #[serde(rename = "INSTANT")]
    Instant,
    #[serde(rename = "DAILY")]
    Daily,
    #[serde(rename = "WEEKLY")]
    Weekly,
    #[serde(rename = "NEVER")]
    Never,
}

impl DigestFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestFrequency::Instant => "INSTANT",
            DigestFrequency::Daily => "DAILY",
            DigestFrequency::Weekly => "WEEKLY",
            DigestFrequency::Never => "NEVER",
        }
    }
}

impl FromStr for DigestFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSTANT" => Ok(DigestFrequency::Instant),
            "DAILY" => Ok(DigestFrequency::Daily),
            "WEEKLY" => Ok(DigestFrequency::Weekly),
            "NEVER" => Ok(DigestFrequency::Never),
            other => Err(format!("Invalid digest frequency: {other}")),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for DigestFrequency {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for DigestFrequency {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        DigestFrequency::from_str(s).map_err(Into::into)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for DigestFrequency {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), buf)
    }
}
