//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use ur_connect::prelude::*;
//! ```

pub use crate::driver::{DisconnectPolicy, ServerBuilder, SessionConfig, SessionState, UrServer};
pub use crate::protocol::{JointPose, MotionCommand};

// 错误类型
pub use crate::driver::DriverError;
pub use crate::protocol::ProtocolError;
