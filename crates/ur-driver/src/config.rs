//! 会话配置
//!
//! 控制会话线程的节拍、accept 轮询间隔、读写超时和断线策略。

use crate::error::DriverError;
use std::time::Duration;
use ur_protocol::CONTROL_RATE_HZ;

/// 对端断线后的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DisconnectPolicy {
    /// 保持会话（默认）
    ///
    /// 不检测断线：写失败或读到 0 字节都不会结束会话，循环照常运行直到
    /// 显式停止。对端在服务器整个生命周期内只连接一次。断开后该服务器
    /// 实例不会再接受新的客户端。
    #[default]
    KeepSession,

    /// 断线后重新等待客户端
    ///
    /// 检测到 EOF / broken pipe / reset 后关闭当前客户端并回到
    /// `AwaitingClient`，同一时刻仍只服务一个客户端。
    AcceptNext,
}

/// 会话配置
///
/// # Example
///
/// ```
/// use ur_driver::{DisconnectPolicy, SessionConfig};
///
/// // 默认：125 Hz，1ms accept 轮询，读超时为一个控制周期
/// let config = SessionConfig::default();
/// assert_eq!(config.period().as_micros(), 8_000);
///
/// let config = SessionConfig {
///     control_rate_hz: 250,
///     disconnect_policy: DisconnectPolicy::AcceptNext,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// 控制频率（Hz）
    pub control_rate_hz: u32,
    /// 等待客户端时 accept 轮询间隔（毫秒）
    pub accept_poll_interval_ms: u64,
    /// 单次读取反馈的超时（毫秒），`None` 表示一个控制周期
    pub read_timeout_ms: Option<u64>,
    /// 瞬时写错误的最大重试次数
    pub max_write_retries: u32,
    /// 断线策略
    pub disconnect_policy: DisconnectPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            control_rate_hz: CONTROL_RATE_HZ,
            accept_poll_interval_ms: 1,
            read_timeout_ms: None,
            max_write_retries: 3,
            disconnect_policy: DisconnectPolicy::KeepSession,
        }
    }
}

impl SessionConfig {
    /// 允许的最高控制频率
    pub const MAX_CONTROL_RATE_HZ: u32 = 1000;

    /// 校验配置
    ///
    /// # 错误
    /// - `DriverError::Config`: 频率为 0 或超过 1 kHz，读超时为 0
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.control_rate_hz == 0 || self.control_rate_hz > Self::MAX_CONTROL_RATE_HZ {
            return Err(DriverError::Config(format!(
                "control_rate_hz must be in 1..={}, got {}",
                Self::MAX_CONTROL_RATE_HZ,
                self.control_rate_hz
            )));
        }
        if self.read_timeout_ms == Some(0) {
            return Err(DriverError::Config(
                "read_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 控制周期
    pub fn period(&self) -> Duration {
        Duration::from_secs(1) / self.control_rate_hz.max(1)
    }

    /// accept 轮询间隔
    pub fn accept_poll_interval(&self) -> Duration {
        Duration::from_millis(self.accept_poll_interval_ms)
    }

    /// 反馈读取超时（默认一个控制周期）
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.period())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.control_rate_hz, 125);
        assert_eq!(config.accept_poll_interval(), Duration::from_millis(1));
        assert_eq!(config.period(), Duration::from_millis(8));
        assert_eq!(config.read_timeout(), config.period());
        assert_eq!(config.disconnect_policy, DisconnectPolicy::KeepSession);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_config_read_timeout_override() {
        let config = SessionConfig {
            read_timeout_ms: Some(3),
            ..Default::default()
        };
        assert_eq!(config.read_timeout(), Duration::from_millis(3));
    }

    #[test]
    fn test_session_config_validate_rejects_bad_rate() {
        let zero = SessionConfig {
            control_rate_hz: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(DriverError::Config(_))));

        let too_fast = SessionConfig {
            control_rate_hz: 5000,
            ..Default::default()
        };
        assert!(too_fast.validate().is_err());

        let zero_timeout = SessionConfig {
            read_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_session_config_serde_partial() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"control_rate_hz": 250, "disconnect_policy": "accept_next"}"#)
                .unwrap();
        assert_eq!(config.control_rate_hz, 250);
        assert_eq!(config.disconnect_policy, DisconnectPolicy::AcceptNext);
        assert_eq!(config.max_write_retries, 3);
    }
}
