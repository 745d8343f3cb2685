//! 播放配置
//!
//! 所有数值在启动时固定，之后不再修改

use std::time::Duration;

use thiserror::Error;

use crate::audio::interleave::tile_interleaved;
use crate::audio::output::SinkParams;
use crate::audio::timing::frame_duration;
use crate::audio::{AudioFormat, FrameRing, WireBuffer};
use crate::generate::{SineTable, TableSpan, ToneConfig, ToneError};

/// 配置错误（启动阶段检测）
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error(transparent)]
    Tone(#[from] ToneError),

    #[error("channel count must be non-zero")]
    ZeroChannels,

    #[error("frames per write must be non-zero")]
    ZeroFrameSize,

    #[error("playback duration must be non-zero")]
    ZeroDuration,

    #[error("tone sample rate {tone}Hz differs from playback sample rate {playback}Hz")]
    RateMismatch { tone: u32, playback: u32 },

    #[error("buffer of {buffer_frames} frames is not a whole number of {table_len}-sample tables")]
    PartialTable {
        buffer_frames: usize,
        table_len: usize,
    },
}

/// 播放配置
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackConfig {
    /// 回放设备名
    pub device: &'static str,
    /// 采样率、声道、sink 字节序
    pub format: AudioFormat,
    /// 每次写入的帧数
    pub frames_per_write: usize,
    /// 样本环长度（帧），必须是查找表长度的整数倍
    pub buffer_frames: usize,
    /// 每次写入后睡眠一个帧周期
    pub pacing: bool,
    /// 总播放时长（秒）
    pub duration_secs: u32,
    /// 设备缓冲时长（微秒）
    pub latency_us: u32,
    pub soft_resample: bool,
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.format.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        if self.format.sample_rate == 0 {
            return Err(ToneError::ZeroSampleRate.into());
        }
        if self.frames_per_write == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        if self.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.format.channels as usize
    }

    /// 单次写入的标称时长
    pub fn frame_duration(&self) -> Duration {
        frame_duration(self.frames_per_write, self.format.sample_rate)
    }

    /// 覆盖总时长所需的写入次数（向上取整）
    pub fn total_writes(&self) -> u64 {
        let total_frames = self.duration_secs as u64 * self.format.sample_rate as u64;
        total_frames.div_ceil(self.frames_per_write as u64)
    }

    /// 每秒的写入次数（至少 1），用于进度日志
    pub fn writes_per_second(&self) -> u64 {
        (self.format.sample_rate as u64 / self.frames_per_write as u64).max(1)
    }

    pub fn sink_params(&self) -> SinkParams {
        SinkParams {
            format: self.format,
            soft_resample: self.soft_resample,
            latency_us: self.latency_us,
        }
    }
}

/// 生成 → 交织平铺 → 字节序归一 → 样本环
pub fn prepare_ring(
    tone: &ToneConfig,
    span: TableSpan,
    playback: &PlaybackConfig,
) -> Result<FrameRing, ConfigError> {
    playback.validate()?;
    if tone.sample_rate != playback.format.sample_rate {
        return Err(ConfigError::RateMismatch {
            tone: tone.sample_rate,
            playback: playback.format.sample_rate,
        });
    }

    let table = SineTable::generate(*tone, span)?;
    if playback.buffer_frames == 0 || playback.buffer_frames % table.len() != 0 {
        return Err(ConfigError::PartialTable {
            buffer_frames: playback.buffer_frames,
            table_len: table.len(),
        });
    }

    let samples = tile_interleaved(table.samples(), playback.channels(), playback.buffer_frames);
    let mut buffer = WireBuffer::from_samples(&samples);
    if buffer.normalize(playback.format.order) {
        log::info!(
            "Byte-swapped {} samples: host {} → sink {}",
            buffer.len(),
            crate::audio::ByteOrder::host().name(),
            playback.format.order.name()
        );
    }

    Ok(FrameRing::new(buffer, playback.channels()))
}
