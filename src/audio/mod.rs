//! 音频核心模块
//!
//! 包含：
//! - Format: 样本格式、位模式转换与字节序归一
//! - Interleave: 单声道 → 交织多声道
//! - Ring Buffer: 只读样本环，按帧循环读取
//! - Timing: 帧时长与写入节拍
//! - Stats: 播放统计
//! - Output: 音频 sink 抽象
//! - Alsa: Linux ALSA sink（`alsa` feature）

pub mod format;
pub mod interleave;
pub mod output;
pub mod ring_buffer;
pub mod stats;
pub mod timing;

#[cfg(all(target_os = "linux", feature = "alsa"))]
pub mod alsa;

pub use format::{AudioFormat, ByteOrder, WireBuffer};
pub use output::{AudioSink, DeviceHint, SinkError, SinkParams};
pub use ring_buffer::FrameRing;
pub use stats::{PlaybackStats, StatsReport};
pub use timing::{Pacer, SleepPacer};

#[cfg(all(target_os = "linux", feature = "alsa"))]
pub use self::alsa::AlsaSink;
