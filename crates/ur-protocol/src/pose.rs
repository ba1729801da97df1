//! 关节位姿（定点数表示）

use crate::ProtocolError;
use crate::constants::{JOINT_COUNT, JOINT_STATE_SCALE};

/// 浮点角度转定点数
///
/// 乘以 10⁶ 后向零截断。超出 `i32` 范围的值饱和到边界，NaN 转为 0，
/// 不做关节范围校验。
pub fn to_fixed(angle: f64) -> i32 {
    (angle * JOINT_STATE_SCALE) as i32
}

/// 定点数转浮点角度
pub fn from_fixed(value: i32) -> f64 {
    value as f64 / JOINT_STATE_SCALE
}

/// 六关节位姿
///
/// 每个字段为 `角度 × 10⁶` 的定点整数。六个字段总是整体替换
/// （`Copy` 语义，无单字段 setter），读写双方不会看到半更新的位姿。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointPose {
    pub base: i32,
    pub shoulder: i32,
    pub elbow: i32,
    pub wrist1: i32,
    pub wrist2: i32,
    pub wrist3: i32,
}

impl JointPose {
    /// 全零位姿
    pub const ZERO: Self = Self::from_fixed_array([0; JOINT_COUNT]);

    /// 从定点数数组构造（顺序：base → wrist3）
    pub const fn from_fixed_array(values: [i32; JOINT_COUNT]) -> Self {
        Self {
            base: values[0],
            shoulder: values[1],
            elbow: values[2],
            wrist1: values[3],
            wrist2: values[4],
            wrist3: values[5],
        }
    }

    /// 转为定点数数组（顺序：base → wrist3）
    pub const fn to_fixed_array(&self) -> [i32; JOINT_COUNT] {
        [
            self.base,
            self.shoulder,
            self.elbow,
            self.wrist1,
            self.wrist2,
            self.wrist3,
        ]
    }

    /// 从浮点角度数组构造
    pub fn from_angles(angles: [f64; JOINT_COUNT]) -> Self {
        Self::from_fixed_array(angles.map(to_fixed))
    }

    /// 从浮点切片构造，要求恰好 6 个值
    ///
    /// # 错误
    /// - `ProtocolError::InvalidJointCount`: 值的数量不是 6
    pub fn try_from_angles(angles: &[f64]) -> Result<Self, ProtocolError> {
        let angles: [f64; JOINT_COUNT] =
            angles.try_into().map_err(|_| ProtocolError::InvalidJointCount {
                expected: JOINT_COUNT,
                actual: angles.len(),
            })?;
        Ok(Self::from_angles(angles))
    }

    /// 转为浮点角度数组
    pub fn to_angles(&self) -> [f64; JOINT_COUNT] {
        self.to_fixed_array().map(from_fixed)
    }
}

impl From<[i32; JOINT_COUNT]> for JointPose {
    fn from(values: [i32; JOINT_COUNT]) -> Self {
        Self::from_fixed_array(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_to_fixed_truncates_toward_zero() {
        assert_eq!(to_fixed(1.0), 1_000_000);
        assert_eq!(to_fixed(1.5), 1_500_000);
        assert_eq!(to_fixed(0.000_000_9), 0);
        assert_eq!(to_fixed(-0.000_000_9), 0);
        assert_eq!(to_fixed(-1.25), -1_250_000);
    }

    #[test]
    fn test_to_fixed_saturates() {
        // 不做范围校验，超限值饱和
        assert_eq!(to_fixed(1.0e6), i32::MAX);
        assert_eq!(to_fixed(-1.0e6), i32::MIN);
        assert_eq!(to_fixed(f64::NAN), 0);
    }

    #[test]
    fn test_from_angles_field_order() {
        let pose = JointPose::from_angles([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(pose.base, 1_000_000);
        assert_eq!(pose.shoulder, 2_000_000);
        assert_eq!(pose.elbow, 3_000_000);
        assert_eq!(pose.wrist1, 4_000_000);
        assert_eq!(pose.wrist2, 5_000_000);
        assert_eq!(pose.wrist3, 6_000_000);
    }

    #[test]
    fn test_try_from_angles_wrong_count() {
        let err = JointPose::try_from_angles(&[0.0; 5]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidJointCount {
                expected: 6,
                actual: 5
            }
        );
        assert!(JointPose::try_from_angles(&[0.0; 7]).is_err());
        assert!(JointPose::try_from_angles(&[]).is_err());
    }

    #[test]
    fn test_to_angles() {
        let pose = JointPose::from_fixed_array([-3_141_592, 0, 1, 2_000_000, 5, -7]);
        let angles = pose.to_angles();
        assert!((angles[0] + 3.141592).abs() < 1e-12);
        assert_eq!(angles[1], 0.0);
        assert!((angles[2] - 0.000_001).abs() < 1e-12);
        assert_eq!(angles[3], 2.0);
    }

    proptest! {
        /// 定点数往返误差不超过一个定点单位（10⁻⁶）
        #[test]
        fn prop_fixed_point_round_trip(angle in -2000.0f64..2000.0) {
            let decoded = from_fixed(to_fixed(angle));
            prop_assert!((decoded - angle).abs() <= 1.0e-6 + 1.0e-12,
                "angle={} decoded={}", angle, decoded);
        }
    }
}
