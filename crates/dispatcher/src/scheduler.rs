use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use notifier_core::{NotifierError, NotifierResult};
use notifier_domain::{
    repositories::{StudentRepository, TriggerExecutionRepository, TriggerRepository},
    NewTrigger, TemplateCatalog, Trigger, TriggerExecution,
};

use crate::cron_utils::CronScheduler;
use crate::delivery::{DeliveryDispatcher, DeliveryReport};
use crate::renderer::{render, ContentSource, RenderVars};

/// 一轮触发器评估的汇总
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TickReport {
    pub evaluated: i64,
    pub executed: i64,
    pub failed: i64,
}

/// 触发器调度器
///
/// 到期判定是一个粗粒度去重：last_run 为空或早于 now - 窗口即视为
/// 到期，而不是精确的CRON匹配。前提是外部调用方以小于窗口的间隔
/// 触发评估，任何一次CRON触发都会在窗口内被捕获且只发一次。
pub struct TriggerScheduler {
    triggers: Arc<dyn TriggerRepository>,
    executions: Arc<dyn TriggerExecutionRepository>,
    students: Arc<dyn StudentRepository>,
    catalog: Arc<TemplateCatalog>,
    dispatcher: Arc<DeliveryDispatcher>,
    dedup_window: Duration,
}

impl TriggerScheduler {
    pub fn new(
        triggers: Arc<dyn TriggerRepository>,
        executions: Arc<dyn TriggerExecutionRepository>,
        students: Arc<dyn StudentRepository>,
        catalog: Arc<TemplateCatalog>,
        dispatcher: Arc<DeliveryDispatcher>,
        dedup_window: Duration,
    ) -> Self {
        Self {
            triggers,
            executions,
            students,
            catalog,
            dispatcher,
            dedup_window,
        }
    }

    /// 创建触发器：CRON表达式和模板在这里快速失败，绝不带病入库
    pub async fn create_trigger(&self, new: NewTrigger) -> NotifierResult<Trigger> {
        let cron = CronScheduler::new(&new.schedule)?;
        if !self.catalog.contains(&new.template_id) {
            return Err(NotifierError::TemplateNotFound(new.template_id));
        }
        let next_run = cron.next_fire_time(Utc::now());
        let trigger = self.triggers.create(&new.into_trigger(next_run)).await?;
        info!("{} 已创建", trigger.entity_description());
        Ok(trigger)
    }

    /// 评估一轮所有可调度触发器
    ///
    /// 单个触发器的失败折算进汇总计数，绝不中断本轮其余触发器。
    pub async fn evaluate_triggers(&self) -> NotifierResult<TickReport> {
        info!("开始扫描到期的触发器");
        let triggers = self.triggers.list_evaluable().await?;
        let mut report = TickReport::default();

        for trigger in triggers {
            report.evaluated += 1;
            match self.evaluate_one(&trigger).await {
                Ok(true) => report.executed += 1,
                Ok(false) => {}
                Err(e) => {
                    error!("触发器 {} 执行失败: {}", trigger.id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "本轮评估完成: 检查={} 执行={} 失败={}",
            report.evaluated, report.executed, report.failed
        );
        Ok(report)
    }

    /// 评估单个触发器，返回是否执行
    async fn evaluate_one(&self, trigger: &Trigger) -> NotifierResult<bool> {
        let now = Utc::now();
        let window_start = now - self.dedup_window;

        // 到期检查和 last_run 推进是一次条件更新：两轮评估重叠时
        // 只有一个赢家，滚动窗口内至多一次成功执行
        if !self
            .triggers
            .claim_due(trigger.id, now, window_start)
            .await?
        {
            debug!("触发器 {} 未到期或已被认领，跳过", trigger.id);
            return Ok(false);
        }

        match self.execute(trigger).await {
            Ok(report) => {
                self.executions
                    .append(&TriggerExecution::succeeded(
                        trigger.id,
                        report.sent,
                        report.failed,
                    ))
                    .await?;
                self.triggers
                    .update_next_run(trigger.id, self.next_fire(trigger, now)?)
                    .await?;
                Ok(true)
            }
            Err(e) => {
                // 失败不推进 last_run，触发器在下一轮重新到期
                self.triggers
                    .restore_last_run(trigger.id, trigger.last_run)
                    .await?;
                self.executions
                    .append(&TriggerExecution::failed(trigger.id, e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    /// 手动立即执行：绕过 enabled 和到期检查，但照常写台账并推进簿记
    pub async fn run_now(&self, id: i64) -> NotifierResult<TriggerExecution> {
        let trigger = self
            .triggers
            .get_by_id(id)
            .await?
            .ok_or(NotifierError::TriggerNotFound { id })?;

        let now = Utc::now();
        let next_run = self.next_fire(&trigger, now)?;
        info!("手动执行 {}", trigger.entity_description());

        let execution = match self.execute(&trigger).await {
            Ok(report) => {
                self.triggers.record_run(id, now, next_run).await?;
                TriggerExecution::succeeded(id, report.sent, report.failed)
            }
            Err(e) => TriggerExecution::failed(id, e.to_string()),
        };

        self.executions.append(&execution).await
    }

    /// 渲染触发器的模板内容并派发
    async fn execute(&self, trigger: &Trigger) -> NotifierResult<DeliveryReport> {
        let template = self
            .catalog
            .get(&trigger.template_id)
            .ok_or_else(|| NotifierError::TemplateNotFound(trigger.template_id.clone()))?;

        let total_points = self.students.total_approved_points().await?;
        let message = render(
            ContentSource::Template(template),
            &RenderVars { total_points },
        );

        self.dispatcher
            .dispatch(
                &message,
                template.category,
                template.priority,
                trigger.audience,
                None,
            )
            .await
    }

    /// 由触发器存储的CRON表达式计算下一次触发时间
    ///
    /// 定时触发器必须带表达式，入库校验保证了这一点；缺失说明
    /// 数据被绕过接口改动过，按错误处理而不是静默跳过。
    fn next_fire(
        &self,
        trigger: &Trigger,
        from: DateTime<Utc>,
    ) -> NotifierResult<Option<DateTime<Utc>>> {
        let expr = trigger
            .schedule
            .as_deref()
            .ok_or(NotifierError::MissingSchedule { id: trigger.id })?;
        Ok(CronScheduler::new(expr)?.next_fire_time(from))
    }
}
