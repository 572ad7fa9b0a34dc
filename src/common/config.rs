use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::parser::entity::DEFAULT_CONTENT_BASE_URL;

/// 未指定 `--config` 时在当前目录查找的文件名
pub const DEFAULT_CONFIG_FILE: &str = "ytmdl.toml";

/// 客户端配置，所有字段都有默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 后端 API 根地址
    pub api_base_url: String,
    /// 生成内容链接时使用的站点根地址
    pub content_base_url: String,
    pub request_timeout_secs: u64,
    /// 任务列表轮询间隔
    pub poll_interval_ms: u64,
    /// 日志缓冲区最多保留的条数
    pub log_buffer_cap: usize,
    /// 日志流断线重连的等待阶梯
    pub reconnect_delays_ms: Vec<u64>,
    pub preferences_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            content_base_url: DEFAULT_CONTENT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            poll_interval_ms: 2000,
            log_buffer_cap: 1000,
            reconnect_delays_ms: vec![1000, 2000, 4000, 8000, 16000],
            preferences_path: PathBuf::from("ytmdl-prefs.json"),
        }
    }
}

impl AppConfig {
    /// 读取配置。显式指定的文件必须存在；否则尝试当前目录的 `ytmdl.toml`，没有就用默认值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    tracing::debug!("未找到配置文件，使用默认配置");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let data = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let cfg = Self::from_toml(&data)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        tracing::info!("已加载配置文件 {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            bail!("api_base_url 不能为空");
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms 必须大于 0");
        }
        if self.log_buffer_cap == 0 {
            bail!("log_buffer_cap 必须大于 0");
        }
        if self.reconnect_delays_ms.is_empty() {
            bail!("reconnect_delays_ms 至少需要一个值");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reconnect_delays(&self) -> Vec<Duration> {
        self.reconnect_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.poll_interval(), Duration::from_millis(2000));
        assert_eq!(cfg.log_buffer_cap, 1000);
        assert_eq!(cfg.reconnect_delays().len(), 5);
        assert_eq!(cfg.reconnect_delays()[4], Duration::from_secs(16));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            api_base_url = "http://nas:9000/api"
            poll_interval_ms = 500
        "#,
        )
        .unwrap();
        assert_eq!(cfg.api_base_url, "http://nas:9000/api");
        assert_eq!(cfg.poll_interval(), Duration::from_millis(500));
        assert_eq!(cfg.content_base_url, DEFAULT_CONTENT_BASE_URL);
        assert_eq!(cfg.log_buffer_cap, 1000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(AppConfig::from_toml("poll_interval_ms = 0").is_err());
        assert!(AppConfig::from_toml("log_buffer_cap = 0").is_err());
        assert!(AppConfig::from_toml("reconnect_delays_ms = []").is_err());
        assert!(AppConfig::from_toml("poll_interval_ms = \"fast\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ytmdl.toml");
        fs::write(&path, "log_buffer_cap = 50\n").unwrap();
        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.log_buffer_cap, 50);
    }
}
