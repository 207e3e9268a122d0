use crate::classifier::{Classified, XmlSubtype};
use crate::config::OutputMode;
use crate::encoder;
use crate::error::{Skip, WeMsgResult};

pub mod forward;
pub mod link;

pub use forward::{ChatEntry, EntryKind, ForwardRecord};
pub use link::LinkShareRecord;

/// 按子类型解析出的结构化消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    CombinedForward(ForwardRecord),
    LinkShare(LinkShareRecord),
}

impl Normalized {
    /// 生成最终文本；只有聊天记录在 `JsonSafe` 模式下会被编码
    pub fn into_text(self, mode: OutputMode) -> String {
        match self {
            Normalized::CombinedForward(record) => {
                let text = record.render();
                match mode {
                    OutputMode::Raw => text,
                    OutputMode::JsonSafe => encoder::encode_json_safe(&text),
                }
            }
            Normalized::LinkShare(link) => link.url,
        }
    }
}

pub fn normalize(classified: &Classified) -> WeMsgResult<Normalized> {
    match &classified.subtype {
        XmlSubtype::CombinedForward => {
            forward::parse_record(&classified.appmsg).map(Normalized::CombinedForward)
        }
        XmlSubtype::LinkShare => link::parse_link(&classified.appmsg).map(Normalized::LinkShare),
        XmlSubtype::Unrecognized(t) => Err(Skip::UnsupportedAppType(t.clone()).into()),
    }
}
