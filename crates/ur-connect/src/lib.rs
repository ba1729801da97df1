//! ur-connect - UR 机器人关节位姿流服务
//!
//! 在主机上运行一个 TCP 服务器，机器人控制器上的 URScript 作为客户端连接，
//! 以 125 Hz 接收目标关节角度和运动命令，并回传实际关节角度。
//!
//! # 架构设计
//!
//! - **协议层** (`protocol`): 定点数换算、28/24 字节帧编解码
//! - **驱动层** (`driver`): 会话线程、共享位姿状态、生命周期管理
//!
//! # 快速开始
//!
//! ```no_run
//! use ur_connect::prelude::*;
//!
//! ur_connect::init_logger!();
//!
//! let mut server = UrServer::start("0.0.0.0", 30010)?;
//! server.wait_for_client(std::time::Duration::from_secs(30))?;
//! server.update_pose(&[0.0, -1.57, 1.57, -1.57, -1.57, 0.0], 1)?;
//! println!("{:?}", server.get_pose());
//! server.stop()?;
//! # Ok::<(), DriverError>(())
//! ```

pub use ur_driver as driver;
pub use ur_protocol as protocol;

pub mod prelude;

// 协议层
pub use protocol::{JointPose, MotionCommand, ProtocolError};

// 驱动层
pub use driver::{
    DisconnectPolicy, DriverError, LocalAddress, MetricsSnapshot, ServerBuilder, SessionConfig,
    SessionState, UrServer, list_local_addresses,
};

#[doc(hidden)]
pub mod __private {
    pub use tracing_log;
    pub use tracing_subscriber;
}

/// 初始化日志
///
/// 使用 `RUST_LOG` 环境变量过滤，默认 `ur_driver=info`。同时把 `log` crate 的
/// 日志转发到 tracing。重复调用无副作用。
///
/// ```no_run
/// ur_connect::init_logger!();
/// // 或指定默认级别
/// ur_connect::init_logger!("ur_driver=debug");
/// ```
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger!("ur_driver=info")
    };
    ($directive:expr) => {{
        use $crate::__private::tracing_subscriber::EnvFilter;

        let filter = match $directive.parse() {
            Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
            Err(_) => EnvFilter::from_default_env(),
        };
        let _ = $crate::__private::tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init();
        // fmt 默认已安装 LogTracer，这里只保证关闭该特性时 log 仍被转发
        let _ = $crate::__private::tracing_log::LogTracer::init();
    }};
}
