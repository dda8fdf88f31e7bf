//! 测试用内存仓储和记录型通道实现

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use notifier_core::{NotifierError, NotifierResult};
use notifier_domain::{
    ports::{EmailMessage, EmailTransport, InboxSink},
    repositories::{
        ScheduledNotificationRepository, StudentRepository, TriggerExecutionRepository,
        TriggerRepository,
    },
    AchievementStats, AudienceClass, DigestFrequency, NotificationCategory, ScheduledNotification,
    StudentProfile, Trigger, TriggerExecution,
};

// ---------- 触发器仓储 ----------

#[derive(Default)]
pub struct InMemoryTriggerRepo {
    triggers: Mutex<HashMap<i64, Trigger>>,
    next_id: AtomicI64,
}

impl InMemoryTriggerRepo {
    pub fn new() -> Self {
        Self {
            triggers: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn with_triggers(triggers: Vec<Trigger>) -> Self {
        let repo = Self::new();
        {
            let mut map = repo.triggers.lock().unwrap();
            for t in triggers {
                repo.next_id.fetch_max(t.id + 1, Ordering::SeqCst);
                map.insert(t.id, t);
            }
        }
        repo
    }

    pub fn snapshot(&self, id: i64) -> Option<Trigger> {
        self.triggers.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl TriggerRepository for InMemoryTriggerRepo {
    async fn create(&self, trigger: &Trigger) -> NotifierResult<Trigger> {
        let mut stored = trigger.clone();
        stored.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.triggers
            .lock()
            .unwrap()
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> NotifierResult<Option<Trigger>> {
        Ok(self.triggers.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> NotifierResult<Vec<Trigger>> {
        let mut all: Vec<Trigger> = self.triggers.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|t| t.id);
        Ok(all)
    }

    async fn list_evaluable(&self) -> NotifierResult<Vec<Trigger>> {
        let mut all: Vec<Trigger> = self
            .triggers
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.is_evaluable())
            .cloned()
            .collect();
        all.sort_by_key(|t| t.id);
        Ok(all)
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> NotifierResult<()> {
        let mut map = self.triggers.lock().unwrap();
        let t = map
            .get_mut(&id)
            .ok_or(NotifierError::TriggerNotFound { id })?;
        t.enabled = enabled;
        t.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: i64) -> NotifierResult<()> {
        self.triggers
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(NotifierError::TriggerNotFound { id })
    }

    async fn claim_due(
        &self,
        id: i64,
        now: DateTime<Utc>,
        window_start: DateTime<Utc>,
    ) -> NotifierResult<bool> {
        let mut map = self.triggers.lock().unwrap();
        let Some(t) = map.get_mut(&id) else {
            return Ok(false);
        };
        let due = t.enabled && t.last_run.map(|lr| lr <= window_start).unwrap_or(true);
        if due {
            t.last_run = Some(now);
            t.updated_at = now;
        }
        Ok(due)
    }

    async fn restore_last_run(
        &self,
        id: i64,
        previous: Option<DateTime<Utc>>,
    ) -> NotifierResult<()> {
        let mut map = self.triggers.lock().unwrap();
        let t = map
            .get_mut(&id)
            .ok_or(NotifierError::TriggerNotFound { id })?;
        t.last_run = previous;
        Ok(())
    }

    async fn record_run(
        &self,
        id: i64,
        last_run: DateTime<Utc>,
        next_run: Option<DateTime<Utc>>,
    ) -> NotifierResult<()> {
        let mut map = self.triggers.lock().unwrap();
        let t = map
            .get_mut(&id)
            .ok_or(NotifierError::TriggerNotFound { id })?;
        t.last_run = Some(last_run);
        t.next_run = next_run;
        t.updated_at = Utc::now();
        Ok(())
    }

    async fn update_next_run(
        &self,
        id: i64,
        next_run: Option<DateTime<Utc>>,
    ) -> NotifierResult<()> {
        let mut map = self.triggers.lock().unwrap();
        let t = map
            .get_mut(&id)
            .ok_or(NotifierError::TriggerNotFound { id })?;
        t.next_run = next_run;
        Ok(())
    }
}

// ---------- 定时通知仓储 ----------

#[derive(Default)]
pub struct InMemoryNotificationRepo {
    notifications: Mutex<HashMap<i64, ScheduledNotification>>,
    next_id: AtomicI64,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn snapshot(&self, id: i64) -> Option<ScheduledNotification> {
        self.notifications.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ScheduledNotificationRepository for InMemoryNotificationRepo {
    async fn create(
        &self,
        notification: &ScheduledNotification,
    ) -> NotifierResult<ScheduledNotification> {
        let mut stored = notification.clone();
        stored.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.notifications
            .lock()
            .unwrap()
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_by_id(&self, id: i64) -> NotifierResult<Option<ScheduledNotification>> {
        Ok(self.notifications.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> NotifierResult<Vec<ScheduledNotification>> {
        let mut all: Vec<ScheduledNotification> = self
            .notifications
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|n| n.id);
        Ok(all)
    }

    async fn list_due(&self, now: DateTime<Utc>) -> NotifierResult<Vec<ScheduledNotification>> {
        let mut due: Vec<ScheduledNotification> = self
            .notifications
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|n| n.id);
        Ok(due)
    }

    async fn mark_sent(&self, id: i64, sent_at: DateTime<Utc>) -> NotifierResult<bool> {
        let mut map = self.notifications.lock().unwrap();
        let Some(n) = map.get_mut(&id) else {
            return Ok(false);
        };
        if n.sent {
            return Ok(false);
        }
        n.sent = true;
        n.sent_at = Some(sent_at);
        Ok(true)
    }

    async fn revert_sent(&self, id: i64) -> NotifierResult<()> {
        let mut map = self.notifications.lock().unwrap();
        let n = map
            .get_mut(&id)
            .ok_or(NotifierError::NotificationNotFound { id })?;
        n.sent = false;
        n.sent_at = None;
        Ok(())
    }

    async fn reschedule(&self, id: i64, scheduled_for: DateTime<Utc>) -> NotifierResult<bool> {
        let mut map = self.notifications.lock().unwrap();
        let n = map
            .get_mut(&id)
            .ok_or(NotifierError::NotificationNotFound { id })?;
        if n.sent {
            return Ok(false);
        }
        n.scheduled_for = scheduled_for;
        Ok(true)
    }

    async fn delete_unsent(&self, id: i64) -> NotifierResult<bool> {
        let mut map = self.notifications.lock().unwrap();
        let Some(n) = map.get(&id) else {
            return Err(NotifierError::NotificationNotFound { id });
        };
        if n.sent {
            return Ok(false);
        }
        map.remove(&id);
        Ok(true)
    }
}

// ---------- 执行台账仓储 ----------

#[derive(Default)]
pub struct InMemoryExecutionRepo {
    executions: Mutex<Vec<TriggerExecution>>,
    next_id: AtomicI64,
}

impl InMemoryExecutionRepo {
    pub fn new() -> Self {
        Self {
            executions: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn all(&self) -> Vec<TriggerExecution> {
        self.executions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TriggerExecutionRepository for InMemoryExecutionRepo {
    async fn append(&self, execution: &TriggerExecution) -> NotifierResult<TriggerExecution> {
        let mut stored = execution.clone();
        stored.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.executions.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn list_by_trigger(
        &self,
        trigger_id: i64,
        limit: i64,
        offset: i64,
    ) -> NotifierResult<Vec<TriggerExecution>> {
        let mut matched: Vec<TriggerExecution> = self
            .executions
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.trigger_id == trigger_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.executed_at.cmp(&a.executed_at).then(b.id.cmp(&a.id)));
        Ok(matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// ---------- 学生读模型 ----------

pub struct InMemoryStudentRepo {
    students: Vec<StudentProfile>,
    stats: Vec<AchievementStats>,
}

impl InMemoryStudentRepo {
    pub fn new(students: Vec<StudentProfile>, stats: Vec<AchievementStats>) -> Self {
        Self { students, stats }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

#[async_trait]
impl StudentRepository for InMemoryStudentRepo {
    async fn list_students(&self) -> NotifierResult<Vec<StudentProfile>> {
        Ok(self.students.clone())
    }

    async fn achievement_stats(&self) -> NotifierResult<Vec<AchievementStats>> {
        Ok(self.stats.clone())
    }

    async fn total_approved_points(&self) -> NotifierResult<i64> {
        Ok(self.stats.iter().map(|s| s.approved_points).sum())
    }
}

// ---------- 记录型通道 ----------

#[derive(Debug, Clone)]
pub struct InboxRecord {
    pub recipient: i64,
    pub title: String,
    pub body: String,
    pub category: NotificationCategory,
    pub link: Option<String>,
}

#[derive(Default)]
pub struct RecordingInbox {
    records: Mutex<Vec<InboxRecord>>,
    fail_for: HashSet<i64>,
    hang_for: HashSet<i64>,
    next_id: AtomicI64,
}

impl RecordingInbox {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_for: HashSet::new(),
            hang_for: HashSet::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// 对指定收件人的写入返回错误
    pub fn failing_for(recipients: &[i64]) -> Self {
        Self {
            fail_for: recipients.iter().copied().collect(),
            ..Self::new()
        }
    }

    /// 对指定收件人的写入挂起不返回，用于触发投递超时
    pub fn hanging_for(recipients: &[i64]) -> Self {
        Self {
            hang_for: recipients.iter().copied().collect(),
            ..Self::new()
        }
    }

    pub fn records(&self) -> Vec<InboxRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl InboxSink for RecordingInbox {
    async fn create_notification(
        &self,
        recipient: i64,
        title: &str,
        body: &str,
        category: NotificationCategory,
        link: Option<&str>,
    ) -> NotifierResult<i64> {
        if self.hang_for.contains(&recipient) {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        }
        if self.fail_for.contains(&recipient) {
            return Err(NotifierError::Internal(format!(
                "站内信写入被测试拒绝: {recipient}"
            )));
        }
        self.records.lock().unwrap().push(InboxRecord {
            recipient,
            title: title.to_string(),
            body: body.to_string(),
            category,
            link: link.map(str::to_string),
        });
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct RecordingEmail {
    sent: Mutex<Vec<EmailMessage>>,
    fail_all: bool,
}

impl RecordingEmail {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_all: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_all: true,
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailTransport for RecordingEmail {
    async fn send(&self, message: &EmailMessage) -> NotifierResult<()> {
        if self.fail_all {
            return Err(NotifierError::EmailTransport(
                "邮件通道被测试拒绝".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ---------- 测试数据构造 ----------

pub fn student(id: i64, created_days_ago: i64) -> StudentProfile {
    StudentProfile {
        id,
        name: format!("学生{id}"),
        email: format!("student{id}@example.com"),
        created_at: Utc::now() - Duration::days(created_days_ago),
        email_enabled: true,
        digest: DigestFrequency::Instant,
    }
}

pub fn student_with_digest(
    id: i64,
    created_days_ago: i64,
    email_enabled: bool,
    digest: DigestFrequency,
) -> StudentProfile {
    StudentProfile {
        email_enabled,
        digest,
        ..student(id, created_days_ago)
    }
}

pub fn stats(user_id: i64, approved_count: i64, approved_points: i64) -> AchievementStats {
    AchievementStats {
        user_id,
        record_count: approved_count,
        approved_count,
        approved_points,
        last_submission: Some(Utc::now() - Duration::days(1)),
    }
}

pub fn stats_last_submitted(user_id: i64, days_ago: i64) -> AchievementStats {
    AchievementStats {
        user_id,
        record_count: 1,
        approved_count: 0,
        approved_points: 0,
        last_submission: Some(Utc::now() - Duration::days(days_ago)),
    }
}

pub fn trigger(id: i64, audience: AudienceClass, template_id: &str) -> Trigger {
    use notifier_domain::TriggerKind;
    let now = Utc::now();
    Trigger {
        id,
        name: format!("trigger-{id}"),
        kind: TriggerKind::Scheduled,
        schedule: Some("*/5 * * * *".to_string()),
        template_id: template_id.to_string(),
        audience,
        enabled: true,
        last_run: None,
        next_run: None,
        created_at: now,
        updated_at: now,
    }
}
