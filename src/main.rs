use anyhow::Context as _;
use merge_wemsg::config::{self, AppConfig};
use merge_wemsg::log::{self as wlog, Level};
use merge_wemsg::{MergeFilter, Outcome, RawEnvelope, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

/// 控制台模式：每行一条 JSON 消息，输出转换结果
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let cfg: AppConfig = config::load_or_init(&config_path)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("无法加载配置文件 {}", config_path))?;

    match cfg.log_level.parse::<Level>() {
        Ok(level) => wlog::set_max_level(level),
        Err(e) => warn!(target: "Config", "{}，使用 info", e),
    }

    let filter = MergeFilter::new(cfg.merge_wemsg);
    info!(target: "Console", "已启动控制台模式。请逐行输入消息 JSON，例如: {{\"MsgType\": 49, \"Content\": {{\"string\": \"<msg>...</msg>\"}}}}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("读取标准输入失败")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut bytes = line.as_bytes().to_vec();
        let envelope = match RawEnvelope::from_json(&mut bytes) {
            Ok(env) => env,
            Err(e) => {
                warn!(target: "Console", "消息 JSON 解析失败: {}", e);
                continue;
            }
        };

        match filter.transform(&envelope) {
            Outcome::Rewritten(text) => println!("{}", text),
            Outcome::NotApplicable => println!("\x1b[90m[Pass] 消息未改写\x1b[0m"),
        }
    }

    Ok(())
}
