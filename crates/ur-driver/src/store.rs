//! 共享位姿状态
//!
//! - `PoseStore`: 调用方写入目标位姿和命令，会话线程每个周期读取
//! - `SensedStore`: 会话线程写入控制器反馈的位姿，调用方读取
//!
//! 两个 store 各自持有一把互斥锁，临界区只做拷贝（无 IO、无 sleep、
//! 无单位换算），位姿整体替换，不会读到半更新的数据。

use crate::error::DriverError;
use parking_lot::Mutex;
use tracing::debug;
use ur_protocol::{JOINT_COUNT, JointPose, MotionCommand};

/// 一次发送所需的快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSnapshot {
    pub pose: JointPose,
    pub command: MotionCommand,
    /// 调用方写入版本号，用于判断快照之后是否有新的写入
    pub revision: u64,
}

#[derive(Debug, Default)]
struct CommandedState {
    pose: JointPose,
    command: MotionCommand,
    revision: u64,
}

/// 目标位姿 + 运动命令
#[derive(Debug, Default)]
pub struct PoseStore {
    inner: Mutex<CommandedState>,
}

impl PoseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置目标位姿（浮点角度）和命令
    ///
    /// 角度乘以 10⁶ 向零截断为定点数，不做范围校验。
    ///
    /// # 错误
    /// - `DriverError::InvalidPoseLength`: `angles` 不是 6 个值
    pub fn set(&self, angles: &[f64], command: MotionCommand) -> Result<(), DriverError> {
        let pose = JointPose::try_from_angles(angles)?;
        self.set_fixed(pose, command);
        Ok(())
    }

    /// 设置目标位姿（定点数）和命令
    pub fn set_fixed(&self, pose: JointPose, command: MotionCommand) {
        let previous = {
            let mut state = self.inner.lock();
            let previous = state.command;
            state.pose = pose;
            state.command = command;
            state.revision = state.revision.wrapping_add(1);
            previous
        };

        if previous != command {
            debug!(
                "Active command changed to {} from {}",
                command.code(),
                previous.code()
            );
        }
    }

    /// 复制当前目标位姿、命令和版本号
    pub fn snapshot(&self) -> CommandSnapshot {
        let state = self.inner.lock();
        CommandSnapshot {
            pose: state.pose,
            command: state.command,
            revision: state.revision,
        }
    }

    /// 当前命令
    pub fn command(&self) -> MotionCommand {
        self.inner.lock().command
    }

    /// 一帧发送完成后推进命令状态
    ///
    /// 仅当快照之后没有新的调用方写入时才应用 `after_transmit`，
    /// 避免单次命令复位覆盖掉调用方刚写入的命令。
    ///
    /// 返回是否发生了状态转移。
    pub fn complete_transmit(&self, revision: u64) -> bool {
        let mut state = self.inner.lock();
        if state.revision != revision {
            return false;
        }
        let next = state.command.after_transmit();
        if next == state.command {
            return false;
        }
        state.command = next;
        true
    }
}

/// 控制器反馈的位姿
///
/// `None` 表示尚未收到过完整的反馈帧。
#[derive(Debug, Default)]
pub struct SensedStore {
    inner: Mutex<Option<JointPose>>,
}

impl SensedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交一帧完整反馈
    pub fn commit(&self, pose: JointPose) {
        *self.inner.lock() = Some(pose);
    }

    /// 最近一次反馈（定点数）
    pub fn latest(&self) -> Option<JointPose> {
        *self.inner.lock()
    }

    /// 最近一次反馈（浮点角度）
    pub fn get(&self) -> Option<[f64; JOINT_COUNT]> {
        self.latest().map(|pose| pose.to_angles())
    }

    pub fn has_value(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// 清除反馈（停止服务器时调用）
    pub fn clear(&self) {
        *self.inner.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_pose_store_set_converts_to_fixed() {
        let store = PoseStore::new();
        store
            .set(&[1.0, -2.0, 0.5, 0.0, 3.25, -0.000_001], MotionCommand::Continuous(2))
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(
            snapshot.pose.to_fixed_array(),
            [1_000_000, -2_000_000, 500_000, 0, 3_250_000, -1]
        );
        assert_eq!(snapshot.command, MotionCommand::Continuous(2));
    }

    #[test]
    fn test_pose_store_set_rejects_wrong_length() {
        let store = PoseStore::new();
        let err = store.set(&[0.0; 5], MotionCommand::Idle).unwrap_err();
        assert!(matches!(err, DriverError::InvalidPoseLength { actual: 5 }));

        // 失败时不修改状态
        assert_eq!(store.snapshot().revision, 0);
    }

    #[test]
    fn test_pose_store_default_is_idle() {
        let store = PoseStore::new();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.pose, JointPose::ZERO);
        assert_eq!(snapshot.command, MotionCommand::Idle);
    }

    #[test]
    fn test_complete_transmit_resets_one_shot() {
        let store = PoseStore::new();
        store.set(&[0.0; 6], MotionCommand::from_code(1)).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.command, MotionCommand::OneShot(1));
        assert!(store.complete_transmit(snapshot.revision));
        assert_eq!(store.command(), MotionCommand::Idle);

        // 再次调用无转移
        assert!(!store.complete_transmit(snapshot.revision));
    }

    #[test]
    fn test_complete_transmit_keeps_continuous() {
        let store = PoseStore::new();
        store.set(&[0.0; 6], MotionCommand::Continuous(2)).unwrap();
        let snapshot = store.snapshot();
        assert!(!store.complete_transmit(snapshot.revision));
        assert_eq!(store.command(), MotionCommand::Continuous(2));
    }

    #[test]
    fn test_complete_transmit_does_not_clobber_newer_write() {
        let store = PoseStore::new();
        store.set(&[0.0; 6], MotionCommand::OneShot(1)).unwrap();
        let sent = store.snapshot();

        // 发送之后、复位之前调用方写入了新的单次命令
        store.set(&[1.0; 6], MotionCommand::OneShot(1)).unwrap();
        assert!(!store.complete_transmit(sent.revision));
        assert_eq!(store.command(), MotionCommand::OneShot(1));
    }

    #[test]
    fn test_sensed_store_lifecycle() {
        let store = SensedStore::new();
        assert!(!store.has_value());
        assert_eq!(store.get(), None);

        store.commit(JointPose::from_fixed_array([1_000_000, 0, 0, 0, 0, -500_000]));
        assert!(store.has_value());
        assert_eq!(store.get(), Some([1.0, 0.0, 0.0, 0.0, 0.0, -0.5]));

        store.clear();
        assert_eq!(store.latest(), None);
    }

    #[test]
    fn test_pose_store_concurrent_no_torn_pose() {
        // 每次写入的六个字段相同，读到不同值即为半更新
        let store = Arc::new(PoseStore::new());

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..2_000 {
                        let v = (w * 10_000 + i) as f64 / 1000.0;
                        store.set(&[v; 6], MotionCommand::Continuous(2)).unwrap();
                    }
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    let fields = store.snapshot().pose.to_fixed_array();
                    assert!(fields.iter().all(|f| *f == fields[0]), "torn pose: {:?}", fields);
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();
    }
}
