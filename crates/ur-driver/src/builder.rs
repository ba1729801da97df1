//! Builder 模式实现
//!
//! 提供链式构造 `UrServer` 实例的便捷方式。

use crate::config::SessionConfig;
use crate::error::DriverError;
use crate::server::UrServer;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use tracing::info;
use ur_protocol::DEFAULT_PORT;

/// 会话线程默认名称
const DEFAULT_THREAD_NAME: &str = "ur-session";

/// UrServer Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use ur_driver::{DisconnectPolicy, ServerBuilder, SessionConfig};
///
/// let server = ServerBuilder::new()
///     .ip("192.168.1.10")
///     .port(30010)
///     .session_config(SessionConfig {
///         disconnect_policy: DisconnectPolicy::AcceptNext,
///         ..Default::default()
///     })
///     .start()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ServerBuilder {
    /// 监听地址（点分十进制 IPv4）
    ip: Option<String>,
    /// 监听端口，0 表示由系统分配
    port: u16,
    session_config: Option<SessionConfig>,
    thread_name: Option<String>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            ip: None,
            port: DEFAULT_PORT,
            session_config: None,
            thread_name: None,
        }
    }

    /// 设置监听地址（可选，默认 `0.0.0.0`）
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// 设置监听端口（可选，默认 `DEFAULT_PORT`）
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 设置会话配置（可选）
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = Some(config);
        self
    }

    /// 设置会话线程名称（可选，默认 `ur-session`）
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    /// 绑定端口并启动会话线程
    ///
    /// 绑定在调用线程完成，绑定失败直接返回给调用方。
    ///
    /// # Errors
    /// - `DriverError::Config`: 会话配置无效
    /// - `DriverError::InvalidAddress`: `ip` 不是合法的 IPv4 地址
    /// - `DriverError::Bind`: 端口被占用或地址不可用
    /// - `DriverError::StartFailed`: 无法创建会话线程
    pub fn start(self) -> Result<UrServer, DriverError> {
        let config = self.session_config.unwrap_or_default();
        config.validate()?;

        let ip_text = self.ip.as_deref().unwrap_or("0.0.0.0");
        let ip: Ipv4Addr = ip_text
            .trim()
            .parse()
            .map_err(|_| DriverError::InvalidAddress(ip_text.to_string()))?;
        let addr = SocketAddr::from((ip, self.port));

        info!("Starting server at {}", addr);
        let listener =
            TcpListener::bind(addr).map_err(|source| DriverError::Bind { addr, source })?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        info!("Listening at {}", local_addr);

        let thread_name = self
            .thread_name
            .unwrap_or_else(|| DEFAULT_THREAD_NAME.to_string());
        UrServer::spawn(listener, local_addr, config, thread_name)
    }
}
