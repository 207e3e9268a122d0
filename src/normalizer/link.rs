use crate::error::{Skip, WeMsgResult};
use crate::xml::XmlElement;

/// 链接分享卡片
///
/// 标题、描述、来源目前只解析不输出，最终文本只有 URL。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkShareRecord {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source_display_name: Option<String>,
}

/// `&amp;` 还原为 `&`，只做这一个替换
pub fn decode_url(raw: &str) -> String {
    raw.replace("&amp;", "&")
}

fn text_or<'a>(appmsg: &'a XmlElement, name: &str, fallback: &'a str) -> &'a str {
    match appmsg.child_text(name) {
        Some(t) if !t.is_empty() => t,
        _ => fallback,
    }
}

/// 解析 type=5 的 `<appmsg>`
pub fn parse_link(appmsg: &XmlElement) -> WeMsgResult<LinkShareRecord> {
    let raw_url = appmsg
        .child_text("url")
        .ok_or(Skip::MissingElement("url"))?;
    if raw_url.is_empty() {
        return Err(Skip::EmptyElement("url").into());
    }

    Ok(LinkShareRecord {
        title: text_or(appmsg, "title", "未知标题").to_string(),
        description: text_or(appmsg, "des", "无描述").to_string(),
        url: decode_url(raw_url),
        source_display_name: appmsg
            .child_text("sourcedisplayname")
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
    })
}
