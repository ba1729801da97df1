//! 模拟控制器
//!
//! 连接到服务器，解码每一帧目标位姿，并把目标位姿原样作为实际位姿回复。
//! 收到停止帧或连接关闭后退出。用于没有真实机器人时的联调。

use anyhow::{Context, Result};
use clap::Args;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;
use tracing::debug;
use ur_protocol::{COMMAND_FRAME_LEN, decode_command, encode_sensed, is_poison_pill};

/// 模拟控制器参数
#[derive(Args, Debug)]
pub struct SimPeerCommand {
    /// 服务器地址
    #[arg(short, long, default_value = "127.0.0.1:30010")]
    pub addr: String,

    /// 最多处理的帧数，不指定则运行到停止帧
    #[arg(long)]
    pub ticks: Option<u64>,

    /// 读超时（毫秒）
    #[arg(long, default_value_t = 2000)]
    pub timeout_ms: u64,
}

/// 模拟会话统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimReport {
    /// 处理的下发帧数
    pub frames: u64,
    /// 其中单次移动命令帧数
    pub one_shots: u64,
    /// 是否收到停止帧
    pub poison_pill: bool,
}

impl SimPeerCommand {
    pub fn execute(self) -> Result<()> {
        let report = self.run()?;
        println!(
            "处理 {} 帧（单次移动 {} 帧），{}",
            report.frames,
            report.one_shots,
            if report.poison_pill {
                "收到停止帧"
            } else {
                "未收到停止帧"
            }
        );
        Ok(())
    }

    pub fn run(&self) -> Result<SimReport> {
        let mut stream = TcpStream::connect(&self.addr)
            .with_context(|| format!("连接服务器失败: {}", self.addr))?;
        stream.set_read_timeout(Some(Duration::from_millis(self.timeout_ms.max(1))))?;
        stream.set_nodelay(true)?;
        println!("✅ 已连接: {}", self.addr);

        let mut report = SimReport::default();
        let mut frame = [0u8; COMMAND_FRAME_LEN];

        while self.ticks.is_none_or(|max| report.frames < max) {
            match stream.read_exact(&mut frame) {
                Ok(()) => {},
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e).context("读取下发帧失败"),
            }

            if is_poison_pill(&frame) {
                report.poison_pill = true;
                break;
            }

            let command = decode_command(&frame)?;
            report.frames += 1;
            if command.motion_command()?.is_one_shot() {
                report.one_shots += 1;
            }
            debug!("frame {}: {:?}", report.frames, command);

            stream
                .write_all(&encode_sensed(&command.pose))
                .context("发送反馈失败")?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ur_driver::UrServer;

    #[test]
    fn test_sim_peer_echoes_commanded_pose() {
        let mut server = UrServer::start("127.0.0.1", 0).unwrap();
        server.update_pose(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 1).unwrap();

        let cmd = SimPeerCommand {
            addr: server.local_addr().to_string(),
            ticks: Some(5),
            timeout_ms: 2000,
        };
        let report = cmd.run().unwrap();
        assert_eq!(report.frames, 5);
        assert_eq!(report.one_shots, 1);
        assert!(!report.poison_pill);

        let pose = server.wait_for_pose(Duration::from_secs(2)).unwrap();
        assert_eq!(pose, [0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        server.stop().unwrap();
    }

    #[test]
    fn test_sim_peer_exits_on_poison_pill() {
        let mut server = UrServer::start("127.0.0.1", 0).unwrap();
        let cmd = SimPeerCommand {
            addr: server.local_addr().to_string(),
            ticks: None,
            timeout_ms: 2000,
        };

        let peer = std::thread::spawn(move || cmd.run());
        server.wait_for_client(Duration::from_secs(2)).unwrap();
        server.stop().unwrap();

        let report = peer.join().unwrap().unwrap();
        assert!(report.poison_pill);
    }

    #[test]
    fn test_sim_peer_connect_failure() {
        let cmd = SimPeerCommand {
            addr: "127.0.0.1:1".to_string(),
            ticks: Some(1),
            timeout_ms: 100,
        };
        assert!(cmd.run().is_err());
    }
}
