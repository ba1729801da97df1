//! 运动命令状态
//!
//! 控制器脚本根据帧尾的命令码决定动作。命令码本身对本库不透明，
//! 只有“是否为单次命令”会影响会话循环的行为：单次命令发送一次后
//! 自动回到 `Idle`，等待调用方再次明确下发。

use crate::constants::{CMD_INACTIVE, CMD_MOVE_ONCE};

/// 运动命令
///
/// # 状态转移（每次发送后）
///
/// | 当前 | 发送后 |
/// |---|---|
/// | `Idle` | `Idle` |
/// | `OneShot(c)` | `Idle` |
/// | `Continuous(c)` | `Continuous(c)` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionCommand {
    /// 无激活命令（线上为 `0xFF`）
    #[default]
    Idle,
    /// 单次命令：只发送一帧
    OneShot(u8),
    /// 持续命令：每个控制周期重复发送
    Continuous(u8),
}

impl MotionCommand {
    /// 从原始命令码分类
    ///
    /// - `0xFF` → `Idle`
    /// - `1`（movej）→ `OneShot(1)`
    /// - 其他 → `Continuous(code)`
    pub const fn from_code(code: u8) -> Self {
        match code {
            CMD_INACTIVE => Self::Idle,
            CMD_MOVE_ONCE => Self::OneShot(code),
            other => Self::Continuous(other),
        }
    }

    /// 线上命令码
    pub const fn code(self) -> u8 {
        match self {
            Self::Idle => CMD_INACTIVE,
            Self::OneShot(code) | Self::Continuous(code) => code,
        }
    }

    /// 发送一帧之后的下一状态
    pub const fn after_transmit(self) -> Self {
        match self {
            Self::OneShot(_) => Self::Idle,
            other => other,
        }
    }

    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    pub const fn is_one_shot(self) -> bool {
        matches!(self, Self::OneShot(_))
    }
}

impl From<u8> for MotionCommand {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}
