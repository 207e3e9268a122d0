use simd_json::{OwnedValue, StaticNode};

/// appmsg 类消息（合并转发、链接分享等）的 MsgType
pub const APPMSG_TYPE: i64 = 49;

/// 消息平台投递的原始消息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEnvelope {
    /// 只有 JSON 整数才会被记录
    pub msg_type: Option<i64>,
    pub content: Option<Content>,
}

/// Content 字段：`{"string": "..."}` 或者直接是字符串
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Map { string: Option<String> },
    Text(String),
}

impl Content {
    pub fn as_text(&self) -> &str {
        match self {
            Content::Map { string } => string.as_deref().unwrap_or(""),
            Content::Text(s) => s,
        }
    }
}

impl RawEnvelope {
    pub fn new(msg_type: i64, content: Content) -> Self {
        Self {
            msg_type: Some(msg_type),
            content: Some(content),
        }
    }

    /// 以 `{"string": ...}` 形式构建 appmsg 消息
    pub fn appmsg(xml: impl Into<String>) -> Self {
        Self::new(
            APPMSG_TYPE,
            Content::Map {
                string: Some(xml.into()),
            },
        )
    }

    /// 从已解析的 JSON 值构建，不做任何语义校验
    pub fn from_value(value: &OwnedValue) -> Self {
        let OwnedValue::Object(obj) = value else {
            return Self::default();
        };

        let msg_type = match obj.get("MsgType") {
            Some(OwnedValue::Static(StaticNode::I64(n))) => Some(*n),
            Some(OwnedValue::Static(StaticNode::U64(n))) => i64::try_from(*n).ok(),
            _ => None,
        };

        let content = match obj.get("Content") {
            None => None,
            Some(OwnedValue::Object(map)) => Some(Content::Map {
                string: map.get("string").and_then(coerce_text),
            }),
            Some(other) => coerce_text(other).map(Content::Text),
        };

        Self { msg_type, content }
    }

    /// 从 JSON 字节解析（simd_json 会原地修改缓冲区）
    pub fn from_json(bytes: &mut [u8]) -> simd_json::Result<Self> {
        let value = simd_json::to_owned_value(bytes)?;
        Ok(Self::from_value(&value))
    }

    /// 消息正文，缺失时为空串
    pub fn content_text(&self) -> &str {
        self.content.as_ref().map(Content::as_text).unwrap_or("")
    }
}

/// 字符串原样返回，其他值转为 JSON 文本，null 视为缺失
fn coerce_text(value: &OwnedValue) -> Option<String> {
    match value {
        OwnedValue::Static(StaticNode::Null) => None,
        OwnedValue::String(s) => Some(s.to_string()),
        other => Some(other.to_string()),
    }
}
