//! 消息模板目录
//!
//! 进程启动时构建一次的不可变查找表，运行期不再变更。
//! 正文中的 {total_points} 占位符由渲染器在派发时替换。

use std::collections::HashMap;

use crate::values::{NotificationCategory, NotificationPriority};

/// 社区积分总和的占位符token
pub const TOTAL_POINTS_TOKEN: &str = "{total_points}";

#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
}

#[derive(Debug)]
pub struct TemplateCatalog {
    templates: HashMap<&'static str, MessageTemplate>,
}

impl TemplateCatalog {
    /// 内置模板目录
    pub fn builtin() -> Self {
        let templates = [
            MessageTemplate {
                id: "weekly_digest",
                title: "本周社区成就速报",
                body: "过去一周社区又有新进展，目前全站累计获得 {total_points} 积分。\
                       快去看看排行榜上有没有你的名字！",
                category: NotificationCategory::Digest,
                priority: NotificationPriority::Normal,
            },
            MessageTemplate {
                id: "inactivity_nudge",
                title: "好久不见，回来看看吧",
                body: "你已经有一段时间没有提交新的成就了。\
                       社区累计积分已经达到 {total_points}，别掉队哦。",
                category: NotificationCategory::Reminder,
                priority: NotificationPriority::Low,
            },
            MessageTemplate {
                id: "top_performer_congrats",
                title: "恭喜！你进入了积分榜前20%",
                body: "你的已批准成就积分排进了全站前20%，继续保持！",
                category: NotificationCategory::Achievement,
                priority: NotificationPriority::High,
            },
            MessageTemplate {
                id: "welcome_new_student",
                title: "欢迎加入成就社区",
                body: "欢迎你！提交你的第一条成就记录，和全站 {total_points} \
                       积分的社区一起成长。",
                category: NotificationCategory::Announcement,
                priority: NotificationPriority::Normal,
            },
            MessageTemplate {
                id: "milestone_reminder",
                title: "里程碑提醒",
                body: "距离下一个成就里程碑只差几步，查看你的进度并继续冲刺。",
                category: NotificationCategory::Reminder,
                priority: NotificationPriority::Normal,
            },
        ]
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

        Self { templates }
    }

    pub fn get(&self, id: &str) -> Option<&MessageTemplate> {
        self.templates.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.templates.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
