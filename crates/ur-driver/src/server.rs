//! UrServer 对外 API
//!
//! 持有会话线程句柄和共享状态。调用方线程写目标位姿、读反馈位姿，
//! 会话线程在后台按控制频率与机器人控制器收发。

use crate::builder::ServerBuilder;
use crate::config::SessionConfig;
use crate::error::DriverError;
use crate::metrics::MetricsSnapshot;
use crate::session::{Acceptor, SessionContext, session_loop};
use crate::state::SessionState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{error, info};
use ur_protocol::{JOINT_COUNT, JointPose, MotionCommand};

/// 等待类 API 的轮询间隔
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// 关节位姿 TCP 服务器
///
/// 同一时刻只服务一个控制器客户端。`Drop` 时自动停止并等待会话线程退出。
///
/// # Example
///
/// ```no_run
/// use ur_driver::UrServer;
///
/// let mut server = UrServer::start("0.0.0.0", 30010)?;
///
/// // 单次移动：发送一帧后自动回到 0xFF
/// server.update_pose(&[0.0, -1.57, 1.57, -1.57, -1.57, 0.0], 1)?;
///
/// if let Some(pose) = server.get_pose() {
///     println!("sensed: {:?}", pose);
/// }
///
/// server.stop()?;
/// # Ok::<(), ur_driver::DriverError>(())
/// ```
pub struct UrServer {
    ctx: Arc<SessionContext>,
    /// 运行标志（Release 写 / Acquire 读）
    is_running: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<(), DriverError>>>,
    local_addr: SocketAddr,
    config: SessionConfig,
}

impl UrServer {
    /// 在 `ip:port` 上启动服务器（默认会话配置）
    ///
    /// # Errors
    /// - `DriverError::InvalidAddress`: `ip` 不是合法的 IPv4 地址
    /// - `DriverError::Bind`: 端口被占用或地址不可用
    /// - `DriverError::StartFailed`: 无法创建会话线程
    pub fn start(ip: &str, port: u16) -> Result<Self, DriverError> {
        ServerBuilder::new().ip(ip).port(port).start()
    }

    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// 启动会话线程（监听 socket 已绑定且为非阻塞）
    pub(crate) fn spawn<A: Acceptor + Send + 'static>(
        listener: A,
        local_addr: SocketAddr,
        config: SessionConfig,
        thread_name: String,
    ) -> Result<Self, DriverError> {
        let ctx = Arc::new(SessionContext::new());
        let is_running = Arc::new(AtomicBool::new(true));

        let worker = {
            let ctx = ctx.clone();
            let is_running = is_running.clone();
            let config = config.clone();
            std::thread::Builder::new()
                .name(thread_name)
                .spawn(move || session_loop(listener, ctx, config, is_running))
                .map_err(DriverError::StartFailed)?
        };
        info!("Server thread started");

        Ok(Self {
            ctx,
            is_running,
            worker: Some(worker),
            local_addr,
            config,
        })
    }

    /// 停止服务器并等待会话线程退出
    ///
    /// 已连接时会先向控制器发送停止帧。未运行时为空操作。
    /// 停止后反馈位姿被清除，`get_pose()` 返回 `None`。
    ///
    /// # Errors
    /// - 会话线程因致命错误（如 `DriverError::Accept`）提前退出时返回该错误
    /// - `DriverError::WorkerPanicked`: 会话线程 panic
    pub fn stop(&mut self) -> Result<(), DriverError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        info!("Stopping server at {}", self.local_addr);
        self.is_running.store(false, Ordering::Release);
        let joined = worker.join();

        // 会话线程退出后才清除，之后不会再有提交
        self.ctx.sensed.clear();

        match joined {
            Ok(result) => result,
            Err(_) => Err(DriverError::WorkerPanicked),
        }
    }

    /// 设置目标位姿和命令码
    ///
    /// `command`: 1 为单次移动（发送一帧后复位为 0xFF），0xFF 为不动，
    /// 其他值每个周期重复发送。
    ///
    /// # Errors
    /// - `DriverError::InvalidPoseLength`: `pose` 不是 6 个值
    pub fn update_pose(&self, pose: &[f64], command: u8) -> Result<(), DriverError> {
        self.set_pose(pose, MotionCommand::from_code(command))
    }

    /// 设置目标位姿和命令
    pub fn set_pose(&self, pose: &[f64], command: MotionCommand) -> Result<(), DriverError> {
        self.ctx.commanded.set(pose, command)
    }

    /// 设置目标位姿（定点数）和命令
    pub fn set_pose_fixed(&self, pose: JointPose, command: MotionCommand) {
        self.ctx.commanded.set_fixed(pose, command);
    }

    /// 最近一次控制器反馈的关节角度
    ///
    /// 尚未收到完整反馈或服务器已停止时返回 `None`。
    pub fn get_pose(&self) -> Option<[f64; JOINT_COUNT]> {
        self.ctx.sensed.get()
    }

    /// 最近一次控制器反馈（定点数）
    pub fn sensed_pose(&self) -> Option<JointPose> {
        self.ctx.sensed.latest()
    }

    /// 当前命令
    pub fn command(&self) -> MotionCommand {
        self.ctx.commanded.command()
    }

    /// 实际监听地址（端口 0 时为系统分配的端口）
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> SessionState {
        self.ctx.state.get()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 是否已启动且未请求停止
    pub fn is_running(&self) -> bool {
        self.worker.is_some() && self.is_running.load(Ordering::Acquire)
    }

    /// 会话线程是否仍在运行
    ///
    /// 会话线程因致命错误退出后返回 `false`，可调用 `stop()` 取回错误。
    pub fn is_healthy(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 阻塞等待控制器连接
    ///
    /// # Errors
    /// - `DriverError::Timeout`: 超时前没有客户端连接
    pub fn wait_for_client(&self, timeout: Duration) -> Result<(), DriverError> {
        self.poll_until(timeout, || self.state().is_streaming().then_some(()))
    }

    /// 阻塞等待第一帧完整反馈
    ///
    /// # Errors
    /// - `DriverError::Timeout`: 超时前没有收到反馈
    pub fn wait_for_pose(&self, timeout: Duration) -> Result<[f64; JOINT_COUNT], DriverError> {
        self.poll_until(timeout, || self.get_pose())
    }

    fn poll_until<T>(
        &self,
        timeout: Duration,
        mut probe: impl FnMut() -> Option<T>,
    ) -> Result<T, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(value) = probe() {
                return Ok(value);
            }
            if Instant::now() >= deadline || !self.is_healthy() {
                return Err(DriverError::Timeout);
            }
            std::thread::sleep(WAIT_POLL_INTERVAL);
        }
    }
}

impl Drop for UrServer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!("Server stopped with error: {}", e);
        }
    }
}

impl std::fmt::Debug for UrServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrServer")
            .field("local_addr", &self.local_addr)
            .field("state", &self.state())
            .field("is_running", &self.is_running())
            .finish()
    }
}
