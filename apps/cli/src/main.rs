//! # ur-connect CLI
//!
//! UR 机器人关节位姿服务器命令行工具。
//!
//! ```bash
//! # 查看本机地址，选择与控制器同网段的地址
//! ur-connect addrs
//!
//! # 启动服务器并保持一个目标位姿（单次移动）
//! ur-connect serve --ip 192.168.1.10 --pose 0,-1.57,1.57,-1.57,-1.57,0 --command 1
//!
//! # 没有真实机器人时用模拟控制器联调
//! ur-connect sim-peer --addr 127.0.0.1:30010
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ConfigCommand, ServeCommand, SimPeerCommand};

/// ur-connect - UR 关节位姿服务器
#[derive(Parser, Debug)]
#[command(name = "ur-connect")]
#[command(about = "Stream joint poses to a Universal Robots controller over TCP", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 启动服务器
    Serve {
        #[command(flatten)]
        args: ServeCommand,
    },

    /// 模拟控制器（回显目标位姿）
    SimPeer {
        #[command(flatten)]
        args: SimPeerCommand,
    },

    /// 列出本机 IPv4 地址
    Addrs,

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ur_driver=info".parse()?)
                .add_directive("ur_connect=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { args } => args.execute(),
        Commands::SimPeer { args } => args.execute(),
        Commands::Addrs => commands::addrs::execute(),
        Commands::Config(cmd) => cmd.execute(),
    }
}
