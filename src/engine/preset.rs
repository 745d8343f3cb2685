//! 固定播放预设
//!
//! 每个预设是一组编译期确定的参数，运行时只能选择，不能修改

use crate::audio::{AudioFormat, ByteOrder, FrameRing};
use crate::generate::{Damping, SineTable, TableSpan, ToneConfig, ToneError, THREE_DB_FACTOR};

use super::config::{prepare_ring, ConfigError, PlaybackConfig};

const DEVICE: &str = "default";
const SAMPLE_RATE: u32 = 48000;
const SINE_FREQ: u32 = 1000;
/// 单次写入 1152 帧 = 24 ms @ 48 kHz
const PROC_FRAME_SIZE: usize = 1152;
/// 设备缓冲时长
const LATENCY_US: u32 = 5_000_000;

/// 播放预设
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// 单声道，整秒缓冲，每次写入一整秒
    Mono,
    /// 同 Mono，但样本由 24-bit 截断到 16-bit，衰减 1 dB
    BitDepth,
    /// 立体声，衰减 3 dB，整秒缓冲，按 24 ms 帧写入
    Stereo,
    /// 立体声，单周期查找表平铺成一帧，按 24 ms 帧写入
    Lut,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Mono, Preset::BitDepth, Preset::Stereo, Preset::Lut];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Mono => "mono",
            Preset::BitDepth => "bit-depth",
            Preset::Stereo => "stereo",
            Preset::Lut => "lut",
        }
    }

    pub fn description(self) -> String {
        let playback = self.playback();
        let channels = match playback.format.channels {
            1 => "mono".to_string(),
            2 => "stereo".to_string(),
            n => format!("{}ch", n),
        };
        let detail = match self {
            Preset::Mono => "",
            Preset::BitDepth => ", 24-bit truncated to 16-bit, -1 dB",
            Preset::Stereo => ", -3 dB",
            Preset::Lut => ", -3 dB, single-period lookup table",
        };
        format!(
            "{} s of {} Hz {} sine at {} Hz{}",
            playback.duration_secs, SINE_FREQ, channels, SAMPLE_RATE, detail
        )
    }

    pub fn tone(self) -> ToneConfig {
        match self {
            Preset::Mono => ToneConfig::new(SAMPLE_RATE, SINE_FREQ, i16::MAX as f64),
            Preset::BitDepth => ToneConfig::truncated_24(SAMPLE_RATE, SINE_FREQ, Damping::ONE_DB),
            Preset::Stereo | Preset::Lut => {
                ToneConfig::new(SAMPLE_RATE, SINE_FREQ, i16::MAX as f64 * THREE_DB_FACTOR)
            }
        }
    }

    pub fn span(self) -> TableSpan {
        match self {
            Preset::Lut => TableSpan::Period,
            _ => TableSpan::Second,
        }
    }

    pub fn playback(self) -> PlaybackConfig {
        let base = PlaybackConfig {
            device: DEVICE,
            format: AudioFormat::new(SAMPLE_RATE, 1, ByteOrder::Big),
            frames_per_write: SAMPLE_RATE as usize,
            buffer_frames: SAMPLE_RATE as usize,
            pacing: false,
            duration_secs: 10,
            latency_us: LATENCY_US,
            soft_resample: true,
        };

        match self {
            Preset::Mono => base,
            Preset::BitDepth => PlaybackConfig {
                duration_secs: 20,
                ..base
            },
            Preset::Stereo => PlaybackConfig {
                format: AudioFormat::new(SAMPLE_RATE, 2, ByteOrder::Big),
                frames_per_write: PROC_FRAME_SIZE,
                pacing: true,
                duration_secs: 30,
                ..base
            },
            Preset::Lut => PlaybackConfig {
                format: AudioFormat::new(SAMPLE_RATE, 2, ByteOrder::Big),
                frames_per_write: PROC_FRAME_SIZE,
                buffer_frames: PROC_FRAME_SIZE,
                pacing: true,
                duration_secs: 40,
                ..base
            },
        }
    }

    /// 预设的单声道查找表
    pub fn table(self) -> Result<SineTable, ToneError> {
        SineTable::generate(self.tone(), self.span())
    }

    /// 构造预设的样本环
    pub fn prepare_ring(self) -> Result<FrameRing, ConfigError> {
        prepare_ring(&self.tone(), self.span(), &self.playback())
    }
}
