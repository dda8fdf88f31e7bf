//! 内容渲染器
//!
//! 把模板或操作员自定义的标题/正文渲染为最终内容。
//! 目前唯一定义的运行时变量是全站已批准积分总和；
//! 未匹配的占位符原样保留，不报错。

use notifier_domain::templates::{MessageTemplate, TOTAL_POINTS_TOKEN};

/// 渲染输入：命名模板，或操作员提供的自定义内容（逐字使用）
pub enum ContentSource<'a> {
    Template(&'a MessageTemplate),
    Custom { title: &'a str, body: &'a str },
}

/// 渲染时可用的运行时变量
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderVars {
    pub total_points: i64,
}

/// 渲染结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub title: String,
    pub body: String,
}

/// 变量替换后产出最终标题和正文
pub fn render(source: ContentSource<'_>, vars: &RenderVars) -> RenderedMessage {
    let (title, body) = match source {
        ContentSource::Template(t) => (t.title, t.body),
        ContentSource::Custom { title, body } => (title, body),
    };

    RenderedMessage {
        title: substitute(title, vars),
        body: substitute(body, vars),
    }
}

fn substitute(text: &str, vars: &RenderVars) -> String {
    text.replace(TOTAL_POINTS_TOKEN, &vars.total_points.to_string())
}
