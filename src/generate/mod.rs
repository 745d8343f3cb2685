//! 波形生成模块
//!
//! 包含：
//! - Sine: 正弦查找表（单周期或整秒）
//! - Bit depth: 24-bit → 16-bit 截断与衰减

pub mod bit_depth;
pub mod sine;

pub use bit_depth::{truncate_24_to_16, Damping, INT24_MAX};
pub use sine::{SineTable, SourceDepth, TableSpan, ToneConfig, THREE_DB_FACTOR};

use thiserror::Error;

/// 波形参数错误
///
/// 全部在配置阶段检测，播放开始后不会再出现
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToneError {
    #[error("sample rate must be non-zero")]
    ZeroSampleRate,

    #[error("sine frequency must be non-zero")]
    ZeroFrequency,

    #[error("sine frequency {frequency}Hz is not below the Nyquist frequency {nyquist}Hz")]
    AboveNyquist { frequency: u32, nyquist: u32 },

    #[error("{sample_rate}Hz is not a whole multiple of {frequency}Hz, one period does not fit an integer number of samples")]
    FractionalPeriod { sample_rate: u32, frequency: u32 },

    #[error("amplitude {0} is not a finite non-negative value")]
    InvalidAmplitude(f64),
}
