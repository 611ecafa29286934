use crate::flatpak::{Flatpak, OriginPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// flatpak 命令行前缀，沙箱内可设为 ["flatpak-spawn", "--host", "flatpak"]
    pub command: Vec<String>,
    pub debug: bool,
    pub install_origin: OriginPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: vec!["flatpak".to_string()],
            debug: false,
            install_origin: OriginPolicy::Unspecified,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config/flati/config.toml")
    }

    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// 文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        if config.command.is_empty() {
            anyhow::bail!("配置项 command 不能为空: {}", path.display());
        }
        Ok(config)
    }

    pub fn adapter(&self) -> Flatpak {
        Flatpak::new(self.command.clone())
            .with_debug(self.debug)
            .with_origin_policy(self.install_origin.clone())
    }
}
