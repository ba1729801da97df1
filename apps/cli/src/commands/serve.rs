//! 服务器命令
//!
//! 启动关节位姿服务器，可选地保持一个目标位姿，周期性打印控制器反馈。
//! Ctrl+C 优雅退出（向控制器发送停止帧）。

use super::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::info;
use ur_driver::{DisconnectPolicy, UrServer};
use ur_protocol::{CMD_INACTIVE, JOINT_COUNT};

/// 服务器命令参数
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// 监听地址（覆盖配置）
    #[arg(long)]
    pub ip: Option<String>,

    /// 监听端口（覆盖配置）
    #[arg(short, long)]
    pub port: Option<u16>,

    /// 控制频率 Hz（覆盖配置）
    #[arg(long)]
    pub rate_hz: Option<u32>,

    /// 配置文件
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 客户端断开后等待下一个客户端
    #[arg(long)]
    pub accept_next: bool,

    /// 目标关节角度（弧度），逗号分隔 6 个值
    /// 例如：0,-1.57,1.57,-1.57,-1.57,0
    #[arg(long, allow_hyphen_values = true)]
    pub pose: Option<String>,

    /// 运动命令码（1 = 单次移动，255 = 不动）
    #[arg(long, default_value_t = CMD_INACTIVE)]
    pub command: u8,

    /// 反馈打印间隔（毫秒），0 表示不打印
    #[arg(long, default_value_t = 500)]
    pub print_interval_ms: u64,

    /// 运行时长（秒），不指定则运行到 Ctrl+C
    #[arg(long)]
    pub duration_secs: Option<u64>,
}

/// 解析逗号分隔的 6 个关节角度
pub fn parse_pose(text: &str) -> Result<[f64; JOINT_COUNT]> {
    let values: Vec<f64> = text
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .context("解析关节角度失败")?;

    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        anyhow::bail!("关节角度必须是有限值，得到 {}", bad);
    }

    <[f64; JOINT_COUNT]>::try_from(values.as_slice())
        .map_err(|_| anyhow::anyhow!("需要 {} 个关节角度，得到 {}", JOINT_COUNT, values.len()))
}

impl ServeCommand {
    /// 合并配置文件与命令行参数
    pub fn resolve_config(&self) -> Result<CliConfig> {
        let mut config = CliConfig::load(self.config.as_deref())?;

        if let Some(ip) = &self.ip {
            config.ip = ip.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(rate_hz) = self.rate_hz {
            config.session.control_rate_hz = rate_hz;
        }
        if self.accept_next {
            config.session.disconnect_policy = DisconnectPolicy::AcceptNext;
        }

        Ok(config)
    }

    pub fn execute(self) -> Result<()> {
        let config = self.resolve_config()?;
        let pose = self.pose.as_deref().map(parse_pose).transpose()?;

        let mut server = UrServer::builder()
            .ip(config.ip.as_str())
            .port(config.port)
            .session_config(config.session.clone())
            .start()
            .context("启动服务器失败")?;
        println!("✅ 服务器已启动: {}", server.local_addr());

        if let Some(pose) = pose {
            server.update_pose(&pose, self.command)?;
            info!("Holding pose {:?} with command {}", pose, self.command);
        }

        let stop_requested = Arc::new(AtomicBool::new(false));
        {
            let stop_requested = stop_requested.clone();
            ctrlc::set_handler(move || {
                eprintln!("\nReceived interrupt signal. Shutting down...");
                stop_requested.store(true, Ordering::Release);
            })
            .context("设置信号处理失败")?;
        }

        let deadline = self
            .duration_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let print_interval =
            (self.print_interval_ms > 0).then(|| Duration::from_millis(self.print_interval_ms));
        let mut last_print = Instant::now();

        while !stop_requested.load(Ordering::Acquire) {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            if !server.is_healthy() {
                break;
            }

            if let Some(interval) = print_interval
                && last_print.elapsed() >= interval
            {
                last_print = Instant::now();
                print_status(&server);
            }

            std::thread::sleep(Duration::from_millis(10));
        }

        let metrics = server.metrics();
        server.stop().context("服务器异常退出")?;
        println!(
            "已停止：发送 {} 帧，收到 {} 帧反馈（{:.1}%）",
            metrics.frames_sent,
            metrics.replies_received,
            metrics.reply_rate()
        );
        Ok(())
    }
}

fn print_status(server: &UrServer) {
    match server.get_pose() {
        Some(pose) => {
            let joints: Vec<String> = pose.iter().map(|j| format!("{:+.4}", j)).collect();
            println!("[{:?}] sensed: {}", server.state(), joints.join(", "));
        },
        None => println!("[{:?}] sensed: (none)", server.state()),
    }
}
