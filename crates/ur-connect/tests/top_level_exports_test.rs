//! 顶层导出测试
//!
//! 验证核心类型可以从 `ur_connect` 直接导入，日志宏可重复调用。

use std::time::Duration;
use ur_connect::prelude::*;

#[test]
fn test_top_level_exports() {
    let _builder: ServerBuilder = ServerBuilder::new();
    let _config: SessionConfig = SessionConfig::default();
    let _error: DriverError = DriverError::Timeout;
    let _protocol_error: ProtocolError = ProtocolError::InvalidCommandCode(-1);
    let _state: SessionState = SessionState::AwaitingClient;

    assert_eq!(MotionCommand::from_code(1), MotionCommand::OneShot(1));
    assert_eq!(JointPose::default(), JointPose::ZERO);
}

#[test]
fn test_init_logger_is_idempotent() {
    ur_connect::init_logger!();
    ur_connect::init_logger!("ur_driver=debug");

    // log crate 的日志经 LogTracer 转发
    log::info!("log record forwarded to tracing");
    tracing::info!("tracing event");

    let mut server = UrServer::start("127.0.0.1", 0).unwrap();
    assert!(server.wait_for_client(Duration::from_millis(5)).is_err());
    server.stop().unwrap();
}

#[cfg(unix)]
#[test]
fn test_list_local_addresses_exported() {
    let addrs = ur_connect::list_local_addresses().unwrap();
    assert!(addrs.iter().any(|a| a.is_loopback()));
}
