//! JSON 字符串安全编码
//!
//! 输出可以直接放进 JSON 字符串字面量的两个引号之间：控制字符、引号、反斜杠按
//! JSON 规则转义，所有非 ASCII 字符输出为 `\uXXXX`（超出 BMP 的字符用代理对）。
//! 编码是单次的，对已编码文本再次编码会再转义一层。

use crate::warn;
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io::{self, Write};
use thiserror::Error;

const TARGET: &str = "WeMsg/Encoder";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("序列化结果不是 UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("序列化结果缺少首尾引号")]
    MissingQuotes,
}

/// 只输出 ASCII 的 serde_json 格式化器
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// 编码为 JSON 字符串内容（不含首尾引号）
pub fn try_encode(text: &str) -> Result<String, EncodeError> {
    let mut out = Vec::with_capacity(text.len() + 2);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    text.serialize(&mut ser)?;

    let quoted = String::from_utf8(out)?;
    strip_quotes(&quoted)
        .map(str::to_owned)
        .ok_or(EncodeError::MissingQuotes)
}

fn strip_quotes(quoted: &str) -> Option<&str> {
    if quoted.len() < 2 {
        return None;
    }
    quoted.strip_prefix('"')?.strip_suffix('"')
}

/// 编码失败时记录警告并原样返回输入
pub fn encode_json_safe(text: &str) -> String {
    match try_encode(text) {
        Ok(encoded) => encoded,
        Err(e) => {
            warn!(target: TARGET, "编码失败，使用原始文本: {}", e);
            text.to_string()
        }
    }
}
