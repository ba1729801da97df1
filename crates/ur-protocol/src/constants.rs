//! 协议常量定义

/// 关节数量（base, shoulder, elbow, wrist1, wrist2, wrist3）
pub const JOINT_COUNT: usize = 6;

/// 关节角定点缩放系数（整数 = 角度 × 10⁶）
pub const JOINT_STATE_SCALE: f64 = 1_000_000.0;

/// 单个字段字节数（i32）
pub const FIELD_LEN: usize = 4;

/// 下发帧长度：6 个关节 + 1 个命令码
pub const COMMAND_FRAME_LEN: usize = (JOINT_COUNT + 1) * FIELD_LEN;

/// 反馈帧长度：6 个关节
pub const SENSED_FRAME_LEN: usize = JOINT_COUNT * FIELD_LEN;

/// 无激活命令
pub const CMD_INACTIVE: u8 = 0xFF;

/// 单次运动命令（movej），发送一次后自动复位为 `CMD_INACTIVE`
pub const CMD_MOVE_ONCE: u8 = 1;

/// 控制器内部伺服频率（Hz）
///
/// 控制器向关节伺服下发指令的频率为 125 Hz，会话循环与之对齐。
pub const CONTROL_RATE_HZ: u32 = 125;

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 30_010;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_lengths() {
        assert_eq!(COMMAND_FRAME_LEN, 28);
        assert_eq!(SENSED_FRAME_LEN, 24);
    }
}
