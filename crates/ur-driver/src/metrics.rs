//! 会话指标
//!
//! 原子计数器，会话线程写入，任意线程读取快照，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 会话实时指标
///
/// # 使用示例
///
/// ```rust
/// use ur_driver::SessionMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = SessionMetrics::new();
/// metrics.frames_sent.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.frames_sent, 1);
/// ```
#[derive(Debug, Default)]
pub struct SessionMetrics {
    /// 成功发送的下发帧数（不含停止帧）
    pub frames_sent: AtomicU64,
    /// 放弃重试后的写失败次数
    pub write_errors: AtomicU64,
    /// 瞬时写错误的重试次数
    pub write_retries: AtomicU64,
    /// 完整反馈帧数（24 字节）
    pub replies_received: AtomicU64,
    /// 被丢弃的不完整反馈
    pub partial_replies: AtomicU64,
    /// 读超时次数（对端本周期未回复）
    pub read_timeouts: AtomicU64,
    /// 已接受的客户端连接数
    pub clients_accepted: AtomicU64,
    /// 处理时间超过控制周期的次数
    pub overruns: AtomicU64,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    ///
    /// 各计数器分别原子读取，相互之间可能有微小的时间差。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            write_retries: self.write_retries.load(Ordering::Relaxed),
            replies_received: self.replies_received.load(Ordering::Relaxed),
            partial_replies: self.partial_replies.load(Ordering::Relaxed),
            read_timeouts: self.read_timeouts.load(Ordering::Relaxed),
            clients_accepted: self.clients_accepted.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub frames_sent: u64,
    pub write_errors: u64,
    pub write_retries: u64,
    pub replies_received: u64,
    pub partial_replies: u64,
    pub read_timeouts: u64,
    pub clients_accepted: u64,
    pub overruns: u64,
}

impl MetricsSnapshot {
    /// 反馈率（百分比）
    ///
    /// 完整反馈帧数 / 发送帧数。未发送过帧时返回 0.0。
    pub fn reply_rate(&self) -> f64 {
        if self.frames_sent == 0 {
            return 0.0;
        }
        (self.replies_received as f64 / self.frames_sent as f64) * 100.0
    }
}
