//! 集成测试辅助
//!
//! `SimController` 用真实 TCP 连接模拟机器人控制器一侧。

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};
use ur_connect::protocol::{COMMAND_FRAME_LEN, CommandFrame, decode_command, encode_sensed};
use ur_connect::{JointPose, UrServer};

/// 单次读取的超时
pub const IO_TIMEOUT: Duration = Duration::from_secs(2);

/// 模拟控制器
pub struct SimController {
    stream: TcpStream,
}

impl SimController {
    pub fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("connect to server");
        stream.set_read_timeout(Some(IO_TIMEOUT)).unwrap();
        stream.set_nodelay(true).unwrap();
        Self { stream }
    }

    /// 读取一帧原始字节，连接关闭时返回 `None`
    pub fn read_raw(&mut self) -> Option<[u8; COMMAND_FRAME_LEN]> {
        let mut frame = [0u8; COMMAND_FRAME_LEN];
        match self.stream.read_exact(&mut frame) {
            Ok(()) => Some(frame),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => None,
            Err(e) => panic!("read failed: {e}"),
        }
    }

    pub fn read_frame(&mut self) -> CommandFrame {
        let raw = self.read_raw().expect("server closed the connection");
        decode_command(&raw).unwrap()
    }

    /// 读取直到 EOF，返回全部帧
    pub fn read_until_eof(&mut self) -> Vec<[u8; COMMAND_FRAME_LEN]> {
        let mut frames = Vec::new();
        while let Some(frame) = self.read_raw() {
            frames.push(frame);
        }
        frames
    }

    pub fn reply(&mut self, pose: &JointPose) {
        self.stream.write_all(&encode_sensed(pose)).unwrap();
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).unwrap();
    }

    /// 读一帧并把目标位姿原样作为反馈回复
    pub fn echo_once(&mut self) -> Option<CommandFrame> {
        let raw = self.read_raw()?;
        let frame = decode_command(&raw).unwrap();
        // 服务器关闭后写失败，交给调用方通过返回值判断
        self.stream.write_all(&encode_sensed(&frame.pose)).ok()?;
        Some(frame)
    }

    /// 持续回显直到连接关闭（EOF 或任何读写错误），返回回显帧数
    pub fn echo_until_closed(&mut self) -> usize {
        let mut echoed = 0;
        let mut raw = [0u8; COMMAND_FRAME_LEN];
        while self.stream.read_exact(&mut raw).is_ok() {
            let Ok(frame) = decode_command(&raw) else {
                break;
            };
            if self.stream.write_all(&encode_sensed(&frame.pose)).is_err() {
                break;
            }
            echoed += 1;
        }
        echoed
    }
}

/// 在回环地址的临时端口上启动服务器
pub fn loopback_server() -> UrServer {
    UrServer::start("127.0.0.1", 0).expect("start server")
}

/// 轮询等待条件成立
pub fn wait_for_condition(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}
