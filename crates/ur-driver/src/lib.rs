//! 驱动层模块
//!
//! 本模块提供与 UR 机器人控制器之间的关节位姿流服务，包括：
//! - 会话线程管理（accept 轮询、125 Hz 收发循环、停止帧）
//! - 共享位姿状态（目标位姿 / 反馈位姿，各一把锁）
//! - 会话状态机与性能指标
//! - 本机网卡地址枚举
//!
//! # 使用场景
//!
//! 机器人控制器上运行的 URScript 作为客户端连接本服务器，每个周期读取
//! 一帧目标关节角度和运动命令，并回复当前实际关节角度。

mod builder;
pub mod config;
mod error;
pub mod metrics;
pub mod net;
mod server;
pub mod session;
pub mod state;
pub mod store;

pub use builder::ServerBuilder;
pub use config::{DisconnectPolicy, SessionConfig};
pub use error::DriverError;
pub use metrics::{MetricsSnapshot, SessionMetrics};
pub use net::{LocalAddress, list_local_addresses, primary_address};
pub use server::UrServer;
pub use session::{Acceptor, ClientStream, SessionContext, session_loop};
pub use state::{AtomicSessionState, SessionState};
pub use store::{CommandSnapshot, PoseStore, SensedStore};
