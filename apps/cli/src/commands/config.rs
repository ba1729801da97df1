//! 配置管理命令
//!
//! 配置文件为 TOML，默认位于 `<config_dir>/ur-connect/config.toml`：
//!
//! ```toml
//! ip = "0.0.0.0"
//! port = 30010
//!
//! [session]
//! control_rate_hz = 125
//! disconnect_policy = "keep_session"
//! ```

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};
use ur_driver::SessionConfig;
use ur_protocol::DEFAULT_PORT;

/// 默认配置文件路径
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("ur-connect");
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 监听地址
    pub ip: String,
    /// 监听端口
    pub port: u16,
    /// 会话配置
    pub session: SessionConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ip: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            session: SessionConfig::default(),
        }
    }
}

impl CliConfig {
    /// 从文件加载
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        config
            .session
            .validate()
            .with_context(|| format!("配置无效: {}", path.display()))?;
        Ok(config)
    }

    /// 加载配置
    ///
    /// 显式指定的文件必须存在；未指定时使用默认路径，文件不存在则返回默认配置。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            },
        }
    }

    /// 保存到文件（自动创建父目录）
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, content).context("写入配置文件失败")?;
        Ok(())
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示当前生效的配置
    Show {
        /// 配置文件（默认使用标准路径）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 显示默认配置文件路径
    Path,

    /// 写入一份默认配置
    Init {
        /// 目标文件（默认使用标准路径）
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 覆盖已有文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Show { config } => {
                let config = CliConfig::load(config.as_deref())?;
                print!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            },

            ConfigCommand::Path => {
                println!("{}", default_config_path()?.display());
                Ok(())
            },

            ConfigCommand::Init { config, force } => {
                let path = match config {
                    Some(path) => path,
                    None => default_config_path()?,
                };
                if path.exists() && !force {
                    anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
                }
                CliConfig::default().save_to(&path)?;
                println!("✅ 已写入默认配置: {}", path.display());
                Ok(())
            },
        }
    }
}
