//! # UR Protocol
//!
//! 机械臂控制器 TCP 会话的线协议定义（无 IO 依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量（帧长度、缩放系数、命令码）
//! - `pose`: 六关节定点数位姿 `JointPose`
//! - `command`: 运动命令状态 `MotionCommand`
//! - `codec`: 帧编码/解码
//!
//! ## 字节序
//!
//! 所有字段均为 32 位有符号整数，网络字节序（大端）。
//!
//! ```text
//! server → peer  28 字节: base shoulder elbow wrist1 wrist2 wrist3 command
//! peer → server  24 字节: base shoulder elbow wrist1 wrist2 wrist3
//! ```

pub mod codec;
pub mod command;
pub mod constants;
pub mod pose;

// 重新导出常用类型
pub use codec::*;
pub use command::MotionCommand;
pub use constants::*;
pub use pose::{JointPose, from_fixed, to_fixed};

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid joint count: expected {expected}, got {actual}")]
    InvalidJointCount { expected: usize, actual: usize },

    #[error("Command code out of range: {0}")]
    InvalidCommandCode(i32),
}
