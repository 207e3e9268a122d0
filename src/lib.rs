// lib.rs
//
// ================================================================================
// merge-wemsg - 微信合并消息 / 链接分享转换
//
// 流程：原始消息 -> 分类 (classifier) -> 解析 (normalizer) -> 编码 (encoder) -> 文本
// 全部为无状态同步函数，宿主框架只需要关心 Outcome。
// ================================================================================

pub mod log;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod envelope;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod xml;

pub use classifier::{Classified, XmlSubtype, classify};
pub use config::{AppConfig, MergeConfig, OutputMode};
pub use encoder::{encode_json_safe, try_encode};
pub use envelope::{Content, RawEnvelope};
pub use error::{Skip, WeMsgError, WeMsgResult, XmlStage};
pub use normalizer::{Normalized, normalize};
pub use pipeline::{MergeFilter, Outcome, rewrite};
