use crate::classifier::classify;
use crate::config::{MergeConfig, OutputMode};
use crate::envelope::RawEnvelope;
use crate::error::{WeMsgError, WeMsgResult};
use crate::normalizer::normalize;
use crate::{debug, error, info};

const TARGET: &str = "WeMsg/Pipeline";

/// 对宿主的最终结果：改写后的文本，或者按原消息继续处理
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Rewritten(String),
    NotApplicable,
}

impl Outcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            Outcome::Rewritten(t) => Some(t),
            Outcome::NotApplicable => None,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, Outcome::Rewritten(_))
    }
}

/// 分类 → 解析 → 渲染，保留具体的失败原因
pub fn rewrite(envelope: &RawEnvelope, mode: OutputMode) -> WeMsgResult<String> {
    let classified = classify(envelope)?;
    let normalized = normalize(&classified)?;
    Ok(normalized.into_text(mode))
}

/// 合并消息过滤器
///
/// 无内部可变状态，可在多个线程间共享。
#[derive(Debug, Clone, Default)]
pub struct MergeFilter {
    config: MergeConfig,
}

impl MergeFilter {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// 处理一条消息；任何失败都记录日志并返回 [`Outcome::NotApplicable`]
    pub fn transform(&self, envelope: &RawEnvelope) -> Outcome {
        if !self.config.enabled {
            return Outcome::NotApplicable;
        }

        match rewrite(envelope, self.config.output_mode) {
            Ok(text) => {
                info!(target: TARGET, "已处理合并消息：\n{}", text);
                Outcome::Rewritten(text)
            }
            Err(e) => {
                report(&e);
                Outcome::NotApplicable
            }
        }
    }
}

/// 内部函数只返回原因，日志统一在这里输出
fn report(e: &WeMsgError) {
    if e.is_malformed() {
        error!(target: TARGET, "处理合并消息时出错: {}", e);
    } else {
        debug!(target: TARGET, "跳过: {}", e);
    }
}
