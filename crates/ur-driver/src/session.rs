//! 会话线程循环
//!
//! 负责监听 socket 的 accept 轮询、与控制器的周期性收发，以及会话结束时的
//! 停止帧发送。
//!
//! # 每个控制周期
//!
//! 1. 复制 `PoseStore` 的目标位姿和命令
//! 2. 编码并发送 28 字节下发帧
//! 3. 读取最多 24 字节反馈（读超时 = 一个控制周期）
//! 4. 恰好 24 字节时提交到 `SensedStore`，否则静默丢弃
//! 5. 推进命令状态（单次命令 → `Idle`）
//! 6. 休眠到下一个周期
//! 7. 检查运行标志

use crate::config::{DisconnectPolicy, SessionConfig};
use crate::error::DriverError;
use crate::metrics::SessionMetrics;
use crate::state::{AtomicSessionState, SessionState};
use crate::store::{PoseStore, SensedStore};
use spin_sleep::SpinSleeper;
use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};
use ur_protocol::{POISON_PILL, SENSED_FRAME_LEN, decode_sensed, encode_command};

/// 写重试的初始退避
const WRITE_RETRY_BACKOFF: Duration = Duration::from_micros(250);

/// 会话线程与调用方共享的上下文
#[derive(Debug, Default)]
pub struct SessionContext {
    /// 目标位姿（调用方写，会话线程读）
    pub commanded: PoseStore,
    /// 反馈位姿（会话线程写，调用方读）
    pub sensed: SensedStore,
    /// 会话状态
    pub state: AtomicSessionState,
    /// 性能指标
    pub metrics: SessionMetrics,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// 一次客户端会话的结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// 运行标志被清除
    StopRequested,
    /// 对端断开（仅 `DisconnectPolicy::AcceptNext`）
    PeerDisconnected,
}

/// 会话线程主循环
///
/// 监听 socket 必须已绑定并设置为非阻塞。函数返回时监听 socket 被关闭，
/// 状态为 `Closed`。
///
/// # 错误
/// - `DriverError::Accept`: accept 出现非瞬时错误（致命，线程退出）
pub fn session_loop<A: Acceptor>(
    listener: A,
    ctx: Arc<SessionContext>,
    config: SessionConfig,
    is_running: Arc<AtomicBool>,
) -> Result<(), DriverError> {
    let result = run_sessions(&listener, &ctx, &config, &is_running);
    if let Err(e) = &result {
        error!("Server thread exiting: {}", e);
        // 线程已退出，运行标志不能继续为 true
        is_running.store(false, Ordering::Release);
    }

    drop(listener);
    ctx.state.set(SessionState::Closed);
    info!("Server shut down");
    result
}

fn run_sessions<A: Acceptor>(
    listener: &A,
    ctx: &SessionContext,
    config: &SessionConfig,
    is_running: &AtomicBool,
) -> Result<(), DriverError> {
    loop {
        ctx.state.set(SessionState::AwaitingClient);

        let Some((mut stream, peer)) = await_client(listener, config, is_running)? else {
            // 等待期间收到停止请求，没有客户端，无需停止帧
            return Ok(());
        };

        ctx.metrics.clients_accepted.fetch_add(1, Ordering::Relaxed);
        info!("Connection from {}", peer);
        stream.configure(config);

        ctx.state.set(SessionState::Streaming);
        match stream_session(&mut stream, ctx, config, is_running) {
            SessionEnd::StopRequested => {
                ctx.state.set(SessionState::ShuttingDown);
                close_client(stream, config);
                return Ok(());
            },
            SessionEnd::PeerDisconnected => {
                info!("Client {} disconnected, waiting for next client", peer);
                let _ = stream.shutdown(Shutdown::Both);
            },
        }
    }
}

/// accept 错误是否可以重试
fn is_transient_accept_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::Interrupted | ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset
    )
}

/// 对端是否已断开
fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
            | ErrorKind::UnexpectedEof
    )
}

/// 写错误是否为瞬时错误（可退避重试）
fn is_transient_write_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
    )
}

/// 轮询等待一个客户端
///
/// 返回 `Ok(None)` 表示等待期间收到停止请求。
fn await_client<A: Acceptor>(
    listener: &A,
    config: &SessionConfig,
    is_running: &AtomicBool,
) -> Result<Option<(A::Stream, SocketAddr)>, DriverError> {
    let poll_interval = config.accept_poll_interval();

    loop {
        match listener.accept() {
            Ok(accepted) => return Ok(Some(accepted)),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {},
            Err(e) if is_transient_accept_error(&e) => {
                warn!("Transient accept error, retrying: {}", e);
            },
            Err(e) => return Err(DriverError::Accept(e)),
        }

        // Acquire: 看到 false 时必须能看到停止方之前的所有写入
        if !is_running.load(Ordering::Acquire) {
            trace!("Stop requested while awaiting client");
            return Ok(None);
        }

        std::thread::sleep(poll_interval);
    }
}

/// 会话线程使用的客户端连接
pub trait ClientStream: Read + Write {
    /// 连接建立后配置 socket（阻塞模式、读写超时、TCP_NODELAY）
    ///
    /// 失败只记录日志，不中断会话。
    fn configure(&self, config: &SessionConfig);

    fn shutdown(&self, how: Shutdown) -> io::Result<()>;

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

/// 会话线程使用的监听端（非阻塞 accept）
pub trait Acceptor {
    type Stream: ClientStream;

    /// 无连接时返回 `ErrorKind::WouldBlock`
    fn accept(&self) -> io::Result<(Self::Stream, SocketAddr)>;
}

impl ClientStream for TcpStream {
    fn configure(&self, config: &SessionConfig) {
        // BSD/macOS 上 accept 返回的 socket 会继承监听 socket 的非阻塞标志
        if let Err(e) = self.set_nonblocking(false) {
            warn!("Failed to set client socket blocking: {}", e);
        }
        if let Err(e) = TcpStream::set_read_timeout(self, Some(config.read_timeout())) {
            warn!("Failed to set read timeout: {}", e);
        }
        if let Err(e) = self.set_write_timeout(Some(config.period())) {
            warn!("Failed to set write timeout: {}", e);
        }
        if let Err(e) = self.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }
    }

    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        TcpStream::shutdown(self, how)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }
}

impl Acceptor for TcpListener {
    type Stream = TcpStream;

    fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self)
    }
}

/// 发送一帧，瞬时错误按指数退避重试
///
/// 重试次数不超过 `max_write_retries`，总耗时不超过一个控制周期。
/// 只从未写完的位置继续写，不会重复发送已写出的字节。
pub(crate) fn write_frame<W: Write>(
    stream: &mut W,
    frame: &[u8],
    config: &SessionConfig,
    metrics: &SessionMetrics,
) -> io::Result<()> {
    let deadline = Instant::now() + config.period();
    let mut backoff = WRITE_RETRY_BACKOFF;
    let mut retries = 0;
    let mut written = 0;

    while written < frame.len() {
        match stream.write(&frame[written..]) {
            Ok(0) => return Err(ErrorKind::WriteZero.into()),
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {},
            Err(e)
                if is_transient_write_error(&e)
                    && retries < config.max_write_retries
                    && Instant::now() + backoff < deadline =>
            {
                retries += 1;
                metrics.write_retries.fetch_add(1, Ordering::Relaxed);
                trace!("Transient write error ({}), retry {} in {:?}", e, retries, backoff);
                spin_sleep::sleep(backoff);
                backoff *= 2;
            },
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// 已连接状态的收发循环
pub(crate) fn stream_session<S: Read + Write>(
    stream: &mut S,
    ctx: &SessionContext,
    config: &SessionConfig,
    is_running: &AtomicBool,
) -> SessionEnd {
    let period = config.period();
    let accept_next = config.disconnect_policy == DisconnectPolicy::AcceptNext;
    let sleeper = SpinSleeper::default();
    let metrics = &ctx.metrics;

    let mut reply = [0u8; SENSED_FRAME_LEN];
    let mut write_failing = false;

    loop {
        if !is_running.load(Ordering::Acquire) {
            return SessionEnd::StopRequested;
        }

        let tick_start = Instant::now();

        // 1-2. 快照 + 发送
        let snapshot = ctx.commanded.snapshot();
        let frame = encode_command(&snapshot.pose, snapshot.command);
        let sent = match write_frame(stream, &frame, config, metrics) {
            Ok(()) => {
                metrics.frames_sent.fetch_add(1, Ordering::Relaxed);
                write_failing = false;
                true
            },
            Err(e) => {
                metrics.write_errors.fetch_add(1, Ordering::Relaxed);
                if accept_next && is_disconnect(&e) {
                    return SessionEnd::PeerDisconnected;
                }
                if !write_failing {
                    warn!("Failed to send command frame: {}", e);
                    write_failing = true;
                }
                false
            },
        };

        // 3-4. 读取反馈
        let mut read_timed_out = false;
        match stream.read(&mut reply) {
            Ok(0) => {
                if accept_next {
                    return SessionEnd::PeerDisconnected;
                }
            },
            Ok(n) => match decode_sensed(&reply[..n]) {
                Some(pose) => {
                    ctx.sensed.commit(pose);
                    metrics.replies_received.fetch_add(1, Ordering::Relaxed);
                },
                None => {
                    metrics.partial_replies.fetch_add(1, Ordering::Relaxed);
                    trace!("Discarding partial reply ({} bytes)", n);
                },
            },
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                metrics.read_timeouts.fetch_add(1, Ordering::Relaxed);
                read_timed_out = true;
            },
            Err(e) if e.kind() == ErrorKind::Interrupted => {},
            Err(e) => {
                if accept_next && is_disconnect(&e) {
                    return SessionEnd::PeerDisconnected;
                }
                trace!("Read error: {}", e);
            },
        }

        // 5. 单次命令发送后复位
        if sent && ctx.commanded.complete_transmit(snapshot.revision) {
            debug!(
                "One-shot command {} sent, command reset to inactive",
                snapshot.command.code()
            );
        }

        // 6. 节拍
        let elapsed = tick_start.elapsed();
        match period.checked_sub(elapsed) {
            Some(remaining) if !remaining.is_zero() => sleeper.sleep(remaining),
            _ if !read_timed_out => {
                metrics.overruns.fetch_add(1, Ordering::Relaxed);
                trace!("Control tick overran: {:?} > {:?}", elapsed, period);
            },
            _ => {},
        }
    }
}

/// 发送停止帧并关闭客户端
///
/// 先关闭写方向（对端读到停止帧后紧接着读到 EOF），再在一个控制周期内
/// 读空接收缓冲区，避免未读数据导致内核发送 RST。
fn close_client<S: ClientStream>(mut stream: S, config: &SessionConfig) {
    match stream.write_all(&POISON_PILL) {
        Ok(()) => debug!("Poison pill sent"),
        Err(e) => debug!("Failed to send poison pill: {}", e),
    }

    if stream.shutdown(Shutdown::Write).is_err() {
        return;
    }

    let deadline = Instant::now() + config.period();
    let mut sink = [0u8; 256];
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        if remaining.is_zero() || stream.set_read_timeout(Some(remaining)).is_err() {
            break;
        }
        match stream.read(&mut sink) {
            Ok(0) | Err(_) => break,
            Ok(_) => {},
        }
    }
}
