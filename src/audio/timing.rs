//! 帧时长与写入节拍
//!
//! sink 自身的缓冲已经能限速，写入之间的睡眠只用于模拟实时生产者，
//! 避免以超过实时的速度灌满 sink

use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

/// 单调时钟起点（全局缓存，首次调用时初始化）
static EPOCH: OnceLock<Instant> = OnceLock::new();

/// 获取当前单调时间（纳秒）
#[inline]
pub fn now_ns() -> u64 {
    let epoch = *EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_nanos() as u64
}

/// `frames` 帧在 `sample_rate` 下的标称时长
///
/// 1152 帧 @ 48 kHz = 24 ms
#[inline]
pub fn frame_duration(frames: usize, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(frames as u64 * 1_000_000_000 / sample_rate as u64)
}

/// 写入节拍器
pub trait Pacer {
    /// 在两次写入之间等待一个帧周期
    fn pace(&mut self, period: Duration);
}

/// 线程睡眠节拍
#[derive(Clone, Copy, Debug, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pace(&mut self, period: Duration) {
        thread::sleep(period);
    }
}
