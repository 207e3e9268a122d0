use crate::xml::XmlError;
use std::fmt;
use thiserror::Error;

pub type WeMsgResult<T> = Result<T, WeMsgError>;

/// 消息不适用的具体原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// MsgType 不是整数 49
    WrongMsgType(Option<i64>),
    EmptyContent,
    /// 内容中没有 `<appmsg` 标记，未尝试解析
    NoAppMsgMarker,
    /// 缺少必需的 XML 元素
    MissingElement(&'static str),
    /// 元素存在但文本为空
    EmptyElement(&'static str),
    UnsupportedAppType(String),
    NoEntries,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::WrongMsgType(Some(t)) => write!(f, "不是 appmsg 消息类型(MsgType=49), 当前类型: {}", t),
            Skip::WrongMsgType(None) => write!(f, "MsgType 缺失或不是整数"),
            Skip::EmptyContent => write!(f, "Content 中没有内容"),
            Skip::NoAppMsgMarker => write!(f, "内容中没有 <appmsg 标记"),
            Skip::MissingElement(name) => write!(f, "找不到 <{}> 节点", name),
            Skip::EmptyElement(name) => write!(f, "<{}> 内容为空", name),
            Skip::UnsupportedAppType(t) => write!(f, "不支持的 appmsg 类型: {:?}", t),
            Skip::NoEntries => write!(f, "没有解析到任何消息"),
        }
    }
}

/// 解析阶段：外层消息 XML 或 recorditem 内嵌的聊天记录 XML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlStage {
    Outer,
    Record,
}

impl fmt::Display for XmlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlStage::Outer => write!(f, "消息"),
            XmlStage::Record => write!(f, "聊天记录"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WeMsgError {
    #[error("不适用: {0}")]
    NotApplicable(Skip),
    #[error("{stage} XML 解析失败: {source}")]
    Malformed {
        stage: XmlStage,
        #[source]
        source: XmlError,
    },
}

impl WeMsgError {
    pub fn malformed(stage: XmlStage, source: XmlError) -> Self {
        WeMsgError::Malformed { stage, source }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, WeMsgError::Malformed { .. })
    }

    pub fn skip(&self) -> Option<&Skip> {
        match self {
            WeMsgError::NotApplicable(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Skip> for WeMsgError {
    fn from(skip: Skip) -> Self {
        WeMsgError::NotApplicable(skip)
    }
}
