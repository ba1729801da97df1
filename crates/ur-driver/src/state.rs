//! 会话状态定义
//!
//! 会话线程的状态机：
//!
//! ```text
//! AwaitingClient ──accept──▶ Streaming ──stop──▶ ShuttingDown ──▶ Closed
//!       │  ▲                     │
//!       │  └──── 断线（AcceptNext）┘
//!       └──stop / 致命错误──────────────────────────────────────▶ Closed
//! ```
//!
//! 状态由会话线程写入，调用方线程通过 `AtomicSessionState` 无锁读取。

use std::sync::atomic::{AtomicU8, Ordering};

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SessionState {
    /// 等待客户端连接（非阻塞 accept 轮询）
    #[default]
    AwaitingClient = 0,
    /// 已连接，按控制频率收发
    Streaming = 1,
    /// 正在发送停止帧并关闭 socket
    ShuttingDown = 2,
    /// 终态，会话线程已返回或即将返回
    Closed = 3,
}

impl SessionState {
    /// 从 u8 转换
    ///
    /// 无效值视为 `Closed`。
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::AwaitingClient,
            1 => Self::Streaming,
            2 => Self::ShuttingDown,
            _ => Self::Closed,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_streaming(self) -> bool {
        self == Self::Streaming
    }

    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

/// 会话状态（原子版本，用于线程间共享）
#[derive(Debug, Default)]
pub struct AtomicSessionState {
    inner: AtomicU8,
}

impl AtomicSessionState {
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    /// 获取当前状态
    pub fn get(&self) -> SessionState {
        SessionState::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// 设置状态，返回旧状态
    pub fn set(&self, state: SessionState) -> SessionState {
        SessionState::from_u8(self.inner.swap(state.as_u8(), Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_conversions() {
        for state in [
            SessionState::AwaitingClient,
            SessionState::Streaming,
            SessionState::ShuttingDown,
            SessionState::Closed,
        ] {
            assert_eq!(SessionState::from_u8(state.as_u8()), state);
        }
        assert_eq!(SessionState::from_u8(200), SessionState::Closed); // 无效值
    }

    #[test]
    fn test_atomic_session_state() {
        let state = AtomicSessionState::default();
        assert_eq!(state.get(), SessionState::AwaitingClient);

        let old = state.set(SessionState::Streaming);
        assert_eq!(old, SessionState::AwaitingClient);
        assert!(state.get().is_streaming());

        state.set(SessionState::Closed);
        assert!(state.get().is_closed());
    }
}
