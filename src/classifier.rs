use crate::envelope::{APPMSG_TYPE, RawEnvelope};
use crate::error::{Skip, WeMsgError, WeMsgResult, XmlStage};
use crate::xml::{self, XmlElement};

/// `<appmsg><type>` 决定的子类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlSubtype {
    /// 聊天记录（合并转发），type = 19
    CombinedForward,
    /// 链接分享，type = 5
    LinkShare,
    Unrecognized(String),
}

impl XmlSubtype {
    pub fn from_type_text(text: Option<&str>) -> Self {
        match text {
            Some("19") => XmlSubtype::CombinedForward,
            Some("5") => XmlSubtype::LinkShare,
            Some(other) => XmlSubtype::Unrecognized(other.to_string()),
            None => XmlSubtype::Unrecognized(String::new()),
        }
    }
}

/// 分类结果，持有 `<appmsg>` 子树
#[derive(Debug, Clone)]
pub struct Classified {
    pub subtype: XmlSubtype,
    pub appmsg: XmlElement,
}

/// 判断原始消息是否为可识别的 appmsg，并提取其子树
///
/// 外层 XML 解析失败以 [`WeMsgError::Malformed`] 返回，由调用方决定如何处理。
pub fn classify(envelope: &RawEnvelope) -> WeMsgResult<Classified> {
    if envelope.msg_type != Some(APPMSG_TYPE) {
        return Err(Skip::WrongMsgType(envelope.msg_type).into());
    }

    let content = envelope.content_text();
    if content.is_empty() {
        return Err(Skip::EmptyContent.into());
    }

    // 先做字符串预检，避免对无关消息做 XML 解析
    if !content.contains("<appmsg") {
        return Err(Skip::NoAppMsgMarker.into());
    }

    let root = xml::parse_document(content)
        .map_err(|e| WeMsgError::malformed(XmlStage::Outer, e))?;

    let appmsg = root
        .take_child("appmsg")
        .ok_or(Skip::MissingElement("appmsg"))?;

    let subtype = XmlSubtype::from_type_text(appmsg.child_text("type"));
    if let XmlSubtype::Unrecognized(t) = &subtype {
        return Err(Skip::UnsupportedAppType(t.clone()).into());
    }

    Ok(Classified { subtype, appmsg })
}
