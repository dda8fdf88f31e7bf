use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

use notifier_core::{NotifierError, NotifierResult};

/// CRON表达式解析和计算工具
///
/// 操作界面使用标准5段表达式（分 时 日 月 周），
/// 内部补秒字段后交给cron crate解析。
pub struct CronScheduler {
    schedule: Schedule,
}

impl CronScheduler {
    pub fn new(cron_expr: &str) -> NotifierResult<Self> {
        let normalized = Self::normalize(cron_expr);
        let schedule = Schedule::from_str(&normalized).map_err(|e| NotifierError::InvalidCron {
            expr: cron_expr.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { schedule })
    }

    /// 5段表达式补上秒字段
    fn normalize(cron_expr: &str) -> String {
        let fields = cron_expr.split_whitespace().count();
        if fields == 5 {
            format!("0 {cron_expr}")
        } else {
            cron_expr.to_string()
        }
    }

    /// 验证CRON表达式是否有效（创建触发器时的快速失败检查）
    pub fn validate_cron_expression(cron_expr: &str) -> NotifierResult<()> {
        Self::new(cron_expr)?;
        Ok(())
    }

    /// 获取指定时间之后的下一次理论触发时间
    pub fn next_fire_time(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&from).next()
    }

    /// 获取从指定时间开始的多个触发时间
    pub fn upcoming_times(&self, from: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.schedule.after(&from).take(count).collect()
    }
}
