//! 驱动层错误类型定义

use std::net::SocketAddr;
use thiserror::Error;
use ur_protocol::ProtocolError;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 地址不是合法的 IPv4 字面量
    #[error("Invalid IPv4 address: {0:?}")]
    InvalidAddress(String),

    /// 位姿数组长度不是 6
    #[error("Expected 6 values, got {actual}")]
    InvalidPoseLength { actual: usize },

    /// 监听端口绑定失败
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// 等待客户端时 accept 出现不可恢复的错误
    #[error("Accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// Socket IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 会话线程创建失败
    #[error("Unable to start server thread: {0}")]
    StartFailed(#[source] std::io::Error),

    /// 会话线程 panic
    #[error("Server thread panicked")]
    WorkerPanicked,

    /// 协议错误
    #[error("Protocol error: {0}")]
    Protocol(#[source] ProtocolError),

    /// 配置无效
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,
}

impl From<ProtocolError> for DriverError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidJointCount { actual, .. } => Self::InvalidPoseLength { actual },
            other => Self::Protocol(other),
        }
    }
}
