use crate::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

pub type ConfigError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    // 日志级别: error / warn / info / debug
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // 合并消息转换配置
    #[serde(default)]
    pub merge_wemsg: MergeConfig,
}

/// 聊天记录文本的输出方式
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// 原样输出
    Raw,
    /// 编码为可直接嵌入 JSON 字符串的 ASCII 文本
    #[default]
    JsonSafe,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MergeConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub output_mode: OutputMode,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_mode: OutputMode::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            merge_wemsg: MergeConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string).await?;
        Ok(())
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// 加载配置，如果文件不存在则写入默认配置
pub async fn load_or_init(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    if !fs::try_exists(path).await? {
        let default_cfg = AppConfig::default();
        default_cfg.save(path).await?;
        info!(target: "Config", "已生成默认配置: {}", path.display());
        return Ok(default_cfg);
    }

    let content = fs::read_to_string(path).await?;
    AppConfig::from_toml(&content)
}
