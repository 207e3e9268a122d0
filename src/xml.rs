//! 基于 quick-xml 的最小元素树
//!
//! 只保留微信 appmsg 解析需要的部分：标签名、属性、首段文本与子元素。
//! 查找方法只看直接子元素，与微信 XML 的固定层级对应。

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::reader::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("属性解析失败: {0}")]
    Attribute(#[from] AttrError),
    #[error("文档在 <{0}> 闭合前结束")]
    UnexpectedEof(String),
    #[error("文档没有根元素")]
    NoRoot,
    #[error("根元素之外存在文本内容")]
    StrayText,
    #[error("根元素之后存在多余元素 <{0}>")]
    TrailingElement(String),
}

/// XML 元素节点
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    /// 第一个子元素之前的文本
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 第一个同名直接子元素
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// 所有同名直接子元素（文档顺序）
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 子元素文本，元素缺失时为 None
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.find(name).map(|e| e.text())
    }

    /// 取出第一个同名直接子元素的所有权
    pub fn take_child(self, name: &str) -> Option<XmlElement> {
        self.children.into_iter().find(|c| c.name == name)
    }

    fn push_text(&mut self, chunk: &str) {
        if self.children.is_empty() {
            self.text.push_str(chunk);
        }
    }
}

/// 将完整 XML 文档解析为元素树，返回根元素
pub fn parse_document(content: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false); // 保留空格

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            XmlEvent::Start(e) => {
                let element = start_element(&e)?;
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::TrailingElement(element.name));
                }
                stack.push(element);
            }
            XmlEvent::Empty(e) => {
                let element = start_element(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(XmlError::TrailingElement(element.name)),
                }
            }
            XmlEvent::End(_) => {
                // 标签名是否匹配由 quick-xml 负责检查
                let Some(element) = stack.pop() else {
                    return Err(XmlError::NoRoot);
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            XmlEvent::Text(e) => {
                let text = e.unescape()?;
                match stack.last_mut() {
                    Some(current) => current.push_text(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlError::StrayText),
                }
            }
            XmlEvent::CData(e) => {
                let raw = e.into_inner();
                let text = String::from_utf8_lossy(&raw);
                match stack.last_mut() {
                    Some(current) => current.push_text(&text),
                    None => return Err(XmlError::StrayText),
                }
            }
            XmlEvent::Eof => break,
            _ => {} // 忽略 Decl, Comment, PI, DocType
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::UnexpectedEof(open.name));
    }
    root.ok_or(XmlError::NoRoot)
}

fn start_element(e: &BytesStart) -> Result<XmlElement, XmlError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        element.attrs.push((key, value));
    }
    Ok(element)
}
