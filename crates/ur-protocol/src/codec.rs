//! 帧编码/解码
//!
//! 三种定长帧：
//! - 下发帧（28 字节）：6 个关节 + 命令码（u8 扩展为 i32）
//! - 反馈帧（24 字节）：6 个关节
//! - 停止帧（28 字节全零）：会话结束时发送一次，控制器脚本据此退出

use crate::ProtocolError;
use crate::command::MotionCommand;
use crate::constants::*;
use crate::pose::JointPose;

/// 停止帧（“毒丸”）
pub const POISON_PILL: [u8; COMMAND_FRAME_LEN] = [0; COMMAND_FRAME_LEN];

/// 解码后的下发帧（对端视角）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    pub pose: JointPose,
    /// 原始命令字（i32）；停止帧为 0
    pub command: i32,
}

impl CommandFrame {
    /// 命令字对应的运动命令
    ///
    /// # 错误
    /// - `ProtocolError::InvalidCommandCode`: 命令字超出 u8 范围
    pub fn motion_command(&self) -> Result<MotionCommand, ProtocolError> {
        u8::try_from(self.command)
            .map(MotionCommand::from_code)
            .map_err(|_| ProtocolError::InvalidCommandCode(self.command))
    }
}

fn write_fields(out: &mut [u8], fields: &[i32]) {
    for (chunk, value) in out.chunks_exact_mut(FIELD_LEN).zip(fields) {
        chunk.copy_from_slice(&value.to_be_bytes());
    }
}

fn read_field(buf: &[u8], index: usize) -> i32 {
    let start = index * FIELD_LEN;
    let mut bytes = [0u8; FIELD_LEN];
    bytes.copy_from_slice(&buf[start..start + FIELD_LEN]);
    i32::from_be_bytes(bytes)
}

fn read_pose(buf: &[u8]) -> JointPose {
    let mut values = [0i32; JOINT_COUNT];
    for (i, value) in values.iter_mut().enumerate() {
        *value = read_field(buf, i);
    }
    JointPose::from_fixed_array(values)
}

/// 编码下发帧
///
/// ```
/// use ur_protocol::{JointPose, MotionCommand, encode_command};
///
/// let pose = JointPose::from_angles([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
/// let frame = encode_command(&pose, MotionCommand::Idle);
/// assert_eq!(&frame[..4], &[0x00, 0x0F, 0x42, 0x40]);
/// assert_eq!(&frame[24..], &[0x00, 0x00, 0x00, 0xFF]);
/// ```
pub fn encode_command(pose: &JointPose, command: MotionCommand) -> [u8; COMMAND_FRAME_LEN] {
    let mut frame = [0u8; COMMAND_FRAME_LEN];
    write_fields(&mut frame[..SENSED_FRAME_LEN], &pose.to_fixed_array());
    write_fields(&mut frame[SENSED_FRAME_LEN..], &[i32::from(command.code())]);
    frame
}

/// 解码下发帧（对端/测试使用）
pub fn decode_command(buf: &[u8]) -> Result<CommandFrame, ProtocolError> {
    if buf.len() != COMMAND_FRAME_LEN {
        return Err(ProtocolError::InvalidLength {
            expected: COMMAND_FRAME_LEN,
            actual: buf.len(),
        });
    }
    Ok(CommandFrame {
        pose: read_pose(buf),
        command: read_field(buf, JOINT_COUNT),
    })
}

/// 编码反馈帧（对端/测试使用）
pub fn encode_sensed(pose: &JointPose) -> [u8; SENSED_FRAME_LEN] {
    let mut frame = [0u8; SENSED_FRAME_LEN];
    write_fields(&mut frame, &pose.to_fixed_array());
    frame
}

/// 严格解码反馈帧
///
/// # 错误
/// - `ProtocolError::InvalidLength`: 长度不等于 24
pub fn try_decode_sensed(buf: &[u8]) -> Result<JointPose, ProtocolError> {
    if buf.len() != SENSED_FRAME_LEN {
        return Err(ProtocolError::InvalidLength {
            expected: SENSED_FRAME_LEN,
            actual: buf.len(),
        });
    }
    Ok(read_pose(buf))
}

/// 解码反馈帧
///
/// 只有恰好 24 字节才返回 `Some`；短帧/半帧静默丢弃，不做部分更新。
pub fn decode_sensed(buf: &[u8]) -> Option<JointPose> {
    try_decode_sensed(buf).ok()
}

/// 是否为停止帧
pub fn is_poison_pill(buf: &[u8]) -> bool {
    buf == POISON_PILL
}
