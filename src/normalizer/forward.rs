use crate::error::{Skip, WeMsgError, WeMsgResult, XmlStage};
use crate::xml::{self, XmlElement};

const UNKNOWN_TIME: &str = "未知时间";
const UNKNOWN_DATE: &str = "未知日期";

// =============================
//          Types
// =============================

/// 聊天记录条目的内容类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Text(String),
    Image,
    Voice,
    Video,
    File,
    Unknown,
}

impl EntryKind {
    /// 按 datatype 构建；文本消息缺少内容时返回 None
    pub fn from_datatype(datatype: Option<&str>, desc: Option<&str>) -> Option<Self> {
        let kind = match datatype {
            Some("1") => match desc {
                Some(d) if !d.is_empty() => EntryKind::Text(d.to_string()),
                _ => return None,
            },
            Some("2") => EntryKind::Image,
            Some("3") => EntryKind::Voice,
            Some("4") => EntryKind::Video,
            Some("5") => EntryKind::File,
            _ => EntryKind::Unknown,
        };
        Some(kind)
    }

    pub fn body(&self) -> &str {
        match self {
            EntryKind::Text(s) => s,
            EntryKind::Image => "[图片]",
            EntryKind::Voice => "[语音]",
            EntryKind::Video => "[视频]",
            EntryKind::File => "[文件]",
            EntryKind::Unknown => "[未知类型消息]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub time: String,
    pub sender: String,
    pub kind: EntryKind,
}

impl ChatEntry {
    pub fn render(&self) -> String {
        format!("{} - {}：{}", self.time, self.sender, self.kind.body())
    }
}

/// 合并转发的聊天记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRecord {
    pub title: String,
    /// 取自最后一条有效条目的日期
    pub date: String,
    pub entries: Vec<ChatEntry>,
}

impl ForwardRecord {
    pub fn render(&self) -> String {
        let mut out = format!(
            "合并消息：{}\n消息日期：{}\n对话内容：\n",
            self.title, self.date
        );
        let lines: Vec<String> = self.entries.iter().map(ChatEntry::render).collect();
        out.push_str(&lines.join("\n"));
        out
    }
}

// =============================
//          Parsing
// =============================

/// 解析 type=19 的 `<appmsg>`，其 `<recorditem>` 内嵌另一份 XML 文档
pub fn parse_record(appmsg: &XmlElement) -> WeMsgResult<ForwardRecord> {
    // 外层标题只做存在性检查，输出使用 recordinfo 内的标题
    if appmsg.find("title").is_none() {
        return Err(Skip::MissingElement("title").into());
    }

    let record_text = appmsg
        .child_text("recorditem")
        .ok_or(Skip::MissingElement("recorditem"))?;
    if record_text.is_empty() {
        return Err(Skip::EmptyElement("recorditem").into());
    }

    let recordinfo =
        xml::parse_document(record_text).map_err(|e| WeMsgError::malformed(XmlStage::Record, e))?;

    let title = recordinfo
        .child_text("title")
        .ok_or(Skip::MissingElement("recordinfo/title"))?;
    let datalist = recordinfo
        .find("datalist")
        .ok_or(Skip::MissingElement("datalist"))?;

    let mut entries = Vec::new();
    let mut last_stamp: Option<&str> = None;

    for item in datalist.find_all("dataitem") {
        // 发送者为空与缺失同样处理，不计入日期
        let Some(sender) = item.child_text("sourcename").filter(|s| !s.is_empty()) else {
            continue;
        };
        let Some(stamp) = item.child_text("sourcetime") else {
            continue;
        };
        // 存在但没有文本的时间无法拆分，整条消息放弃
        if stamp.is_empty() {
            return Err(Skip::EmptyElement("sourcetime").into());
        }
        // 即使后面的文本条目因内容为空被丢弃，日期仍以它为准
        last_stamp = Some(stamp);

        let time = stamp.split_whitespace().nth(1).unwrap_or(UNKNOWN_TIME);
        let kind = EntryKind::from_datatype(item.attr("datatype"), item.child_text("datadesc"));
        if let Some(kind) = kind {
            entries.push(ChatEntry {
                time: time.to_string(),
                sender: sender.to_string(),
                kind,
            });
        }
    }

    if entries.is_empty() {
        return Err(Skip::NoEntries.into());
    }

    // TODO: 日期取自最后一条而非第一条，待产品确认后再决定是否改为首条
    let date = last_stamp
        .and_then(|s| s.split_whitespace().next())
        .unwrap_or(UNKNOWN_DATE);

    Ok(ForwardRecord {
        title: title.to_string(),
        date: date.to_string(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    fn appmsg(recordinfo: &str) -> XmlElement {
        let outer = format!(
            "<appmsg><type>19</type><title>群聊的聊天记录</title><recorditem>{}</recorditem></appmsg>",
            escape(recordinfo)
        );
        xml::parse_document(&outer).unwrap()
    }

    fn item(datatype: &str, name: Option<&str>, time: Option<&str>, desc: Option<&str>) -> String {
        let mut s = format!(r#"<dataitem datatype="{}">"#, datatype);
        if let Some(n) = name {
            s.push_str(&format!("<sourcename>{}</sourcename>", n));
        }
        if let Some(t) = time {
            s.push_str(&format!("<sourcetime>{}</sourcetime>", t));
        }
        if let Some(d) = desc {
            s.push_str(&format!("<datadesc>{}</datadesc>", d));
        }
        s.push_str("</dataitem>");
        s
    }

    fn record(items: &[String]) -> String {
        format!(
            "<recordinfo><title>项目群</title><datalist>{}</datalist></recordinfo>",
            items.concat()
        )
    }

    #[test]
    fn renders_text_entry() {
        let rec = parse_record(&appmsg(&record(&[item(
            "1",
            Some("Alice"),
            Some("2024-01-05 09:30:00"),
            Some("hello"),
        )])))
        .unwrap();
        assert_eq!(rec.entries[0].render(), "09:30:00 - Alice：hello");
        assert_eq!(rec.title, "项目群");
        assert_eq!(rec.date, "2024-01-05");
    }

    #[test]
    fn renders_placeholders_by_datatype() {
        let items: Vec<String> = ["2", "3", "4", "5", "17"]
            .iter()
            .map(|t| item(t, Some("Bob"), Some("2024-01-05 10:00:00"), None))
            .collect();
        let rec = parse_record(&appmsg(&record(&items))).unwrap();
        let lines: Vec<String> = rec.entries.iter().map(ChatEntry::render).collect();
        assert_eq!(
            lines,
            [
                "10:00:00 - Bob：[图片]",
                "10:00:00 - Bob：[语音]",
                "10:00:00 - Bob：[视频]",
                "10:00:00 - Bob：[文件]",
                "10:00:00 - Bob：[未知类型消息]",
            ]
        );
    }

    #[test]
    fn missing_datatype_is_unknown() {
        let rec = parse_record(&appmsg(
            "<recordinfo><title>t</title><datalist><dataitem><sourcename>C</sourcename><sourcetime>2024-01-05 11:00:00</sourcetime></dataitem></datalist></recordinfo>",
        ))
        .unwrap();
        assert_eq!(rec.entries[0].kind, EntryKind::Unknown);
    }

    #[test]
    fn items_without_sender_or_time_are_dropped() {
        let items = [
            item("1", Some("Alice"), Some("2024-01-05 09:30:00"), Some("hi")),
            item("1", None, Some("2024-02-01 08:00:00"), Some("ghost")),
            item("2", Some("Bob"), None, None),
        ];
        let rec = parse_record(&appmsg(&record(&items))).unwrap();
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.date, "2024-01-05");
    }

    #[test]
    fn empty_text_entries_are_dropped_but_still_set_the_date() {
        let items = [
            item("1", Some("Alice"), Some("2024-01-05 09:30:00"), Some("hi")),
            item("1", Some("Bob"), Some("2024-01-06 07:00:00"), Some("")),
            item("1", Some("Bob"), Some("2024-01-06 07:01:00"), None),
        ];
        let rec = parse_record(&appmsg(&record(&items))).unwrap();
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.date, "2024-01-06");
    }

    #[test]
    fn date_comes_from_the_last_item() {
        let items = [
            item("1", Some("A"), Some("2024-01-05 23:59:00"), Some("night")),
            item("2", Some("B"), Some("2024-01-06 00:01:00"), None),
        ];
        let rec = parse_record(&appmsg(&record(&items))).unwrap();
        assert_eq!(rec.date, "2024-01-06");
    }

    #[test]
    fn short_timestamps_use_fallbacks() {
        let items = [item("2", Some("A"), Some("2024-01-05"), None)];
        let rec = parse_record(&appmsg(&record(&items))).unwrap();
        assert_eq!(rec.entries[0].time, "未知时间");
        assert_eq!(rec.date, "2024-01-05");

        let items = [item("2", Some("A"), Some("   "), None)];
        let rec = parse_record(&appmsg(&record(&items))).unwrap();
        assert_eq!(rec.entries[0].time, "未知时间");
        assert_eq!(rec.date, "未知日期");
    }

    #[test]
    fn empty_sourcetime_rejects_the_whole_record() {
        let items = [
            item("1", Some("A"), Some("2024-01-05 09:00:00"), Some("hi")),
            item("2", Some("B"), Some(""), None),
        ];
        let err = parse_record(&appmsg(&record(&items))).unwrap_err();
        assert_eq!(err.skip(), Some(&Skip::EmptyElement("sourcetime")));
    }

    #[test]
    fn empty_sender_is_dropped_like_a_missing_one() {
        let items = [
            item("1", Some("A"), Some("2024-01-05 09:00:00"), Some("hi")),
            item("2", Some(""), Some("2024-01-09 10:00:00"), None),
        ];
        let rec = parse_record(&appmsg(&record(&items))).unwrap();
        assert_eq!(rec.entries.len(), 1);
        assert_eq!(rec.entries[0].render(), "09:00:00 - A：hi");
        assert_eq!(rec.date, "2024-01-05");
    }

    #[test]
    fn no_valid_items_is_not_applicable() {
        let items = [item("1", Some("A"), Some("2024-01-05 09:00:00"), None)];
        let err = parse_record(&appmsg(&record(&items))).unwrap_err();
        assert_eq!(err.skip(), Some(&Skip::NoEntries));

        let err = parse_record(&appmsg(&record(&[]))).unwrap_err();
        assert_eq!(err.skip(), Some(&Skip::NoEntries));
    }

    #[test]
    fn renders_header_and_lines_in_order() {
        let items = [
            item("1", Some("Alice"), Some("2024-01-05 09:30:00"), Some("hello")),
            item("2", Some("Bob"), Some("2024-01-05 10:00:00"), None),
        ];
        let rec = parse_record(&appmsg(&record(&items))).unwrap();
        assert_eq!(
            rec.render(),
            "合并消息：项目群\n消息日期：2024-01-05\n对话内容：\n09:30:00 - Alice：hello\n10:00:00 - Bob：[图片]"
        );
    }

    #[test]
    fn structural_requirements() {
        let no_title = xml::parse_document("<appmsg><recorditem>x</recorditem></appmsg>").unwrap();
        assert_eq!(
            parse_record(&no_title).unwrap_err().skip(),
            Some(&Skip::MissingElement("title"))
        );

        let no_item = xml::parse_document("<appmsg><title/></appmsg>").unwrap();
        assert_eq!(
            parse_record(&no_item).unwrap_err().skip(),
            Some(&Skip::MissingElement("recorditem"))
        );

        let empty_item = xml::parse_document("<appmsg><title/><recorditem/></appmsg>").unwrap();
        assert_eq!(
            parse_record(&empty_item).unwrap_err().skip(),
            Some(&Skip::EmptyElement("recorditem"))
        );

        let no_list = appmsg("<recordinfo><title>t</title></recordinfo>");
        assert_eq!(
            parse_record(&no_list).unwrap_err().skip(),
            Some(&Skip::MissingElement("datalist"))
        );

        let no_record_title = appmsg("<recordinfo><datalist/></recordinfo>");
        assert_eq!(
            parse_record(&no_record_title).unwrap_err().skip(),
            Some(&Skip::MissingElement("recordinfo/title"))
        );
    }

    #[test]
    fn inner_parse_failure_is_reported_as_record_stage() {
        let broken = xml::parse_document(
            "<appmsg><title/><recorditem>&lt;recordinfo&gt;&lt;title&gt;</recorditem></appmsg>",
        )
        .unwrap();
        match parse_record(&broken) {
            Err(WeMsgError::Malformed { stage, .. }) => assert_eq!(stage, XmlStage::Record),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cdata_record_item_is_accepted() {
        let outer = "<appmsg><title>x</title><recorditem><![CDATA[<recordinfo><title>t</title><datalist><dataitem datatype=\"2\"><sourcename>A</sourcename><sourcetime>2024-03-01 12:00:00</sourcetime></dataitem></datalist></recordinfo>]]></recorditem></appmsg>";
        let rec = parse_record(&xml::parse_document(outer).unwrap()).unwrap();
        assert_eq!(rec.entries[0].render(), "12:00:00 - A：[图片]");
    }
}
