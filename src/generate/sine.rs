//! 正弦查找表
//!
//! sample[i] = round(A · sin(2π·F·i/R))，钳位到 i16 范围
//!
//! 查找表始终覆盖整数个周期，首尾相接时相位连续

use std::f64::consts::PI;

use super::bit_depth::{truncate_24_to_16, Damping, INT24_MAX};
use super::ToneError;

/// 3 dB 衰减（浮点形式），用于直接按 16-bit 刻度生成的信号
pub const THREE_DB_FACTOR: f64 = 0.707_945_784_384_137_9;

/// 样本源位深
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SourceDepth {
    /// 直接按 16-bit 刻度计算
    Native16,
    /// 先按 24-bit 刻度计算，再截断到 16-bit 并衰减
    Truncated24 { damping: Damping },
}

/// 正弦波参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneConfig {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 正弦频率 (Hz)
    pub frequency: u32,
    /// 峰值幅度，刻度由 `depth` 决定
    pub amplitude: f64,
    pub depth: SourceDepth,
}

impl ToneConfig {
    /// 16-bit 刻度的正弦
    pub fn new(sample_rate: u32, frequency: u32, amplitude: f64) -> Self {
        Self {
            sample_rate,
            frequency,
            amplitude,
            depth: SourceDepth::Native16,
        }
    }

    /// 满幅 24-bit 正弦，截断到 16-bit
    pub fn truncated_24(sample_rate: u32, frequency: u32, damping: Damping) -> Self {
        Self {
            sample_rate,
            frequency,
            amplitude: INT24_MAX as f64,
            depth: SourceDepth::Truncated24 { damping },
        }
    }

    /// 检查参数，F 必须低于 Nyquist 频率 R/2
    pub fn validate(&self) -> Result<(), ToneError> {
        if self.sample_rate == 0 {
            return Err(ToneError::ZeroSampleRate);
        }
        if self.frequency == 0 {
            return Err(ToneError::ZeroFrequency);
        }
        if self.frequency as u64 * 2 >= self.sample_rate as u64 {
            return Err(ToneError::AboveNyquist {
                frequency: self.frequency,
                nyquist: self.sample_rate / 2,
            });
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(ToneError::InvalidAmplitude(self.amplitude));
        }
        Ok(())
    }

    /// 单个周期的样本数 R/F
    pub fn samples_per_period(&self) -> Result<usize, ToneError> {
        self.validate()?;
        if self.sample_rate % self.frequency != 0 {
            return Err(ToneError::FractionalPeriod {
                sample_rate: self.sample_rate,
                frequency: self.frequency,
            });
        }
        Ok((self.sample_rate / self.frequency) as usize)
    }

    /// 第 i 个样本的理想值（未量化）
    #[inline]
    pub fn ideal_at(&self, index: usize) -> f64 {
        // 先算周期比例再乘 2π，i·F/R 为整数比时相位精确
        let cycles = index as f64 * self.frequency as f64 / self.sample_rate as f64;
        self.amplitude * (2.0 * PI * cycles).sin()
    }

    /// 第 i 个样本的 16-bit 值
    #[inline]
    pub fn sample_at(&self, index: usize) -> i16 {
        let ideal = self.ideal_at(index).round();
        match self.depth {
            SourceDepth::Native16 => ideal.clamp(i16::MIN as f64, i16::MAX as f64) as i16,
            SourceDepth::Truncated24 { damping } => truncate_24_to_16(ideal as i32, damping),
        }
    }
}

/// 查找表长度
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableSpan {
    /// 恰好一个周期（R/F 个样本）
    Period,
    /// 一整秒（R 个样本，F 个周期）
    Second,
}

/// 单声道正弦查找表，构造后只读
#[derive(Clone, Debug)]
pub struct SineTable {
    samples: Box<[i16]>,
    config: ToneConfig,
    cycles: usize,
}

impl SineTable {
    pub fn generate(config: ToneConfig, span: TableSpan) -> Result<Self, ToneError> {
        config.validate()?;

        let (len, cycles) = match span {
            TableSpan::Period => (config.samples_per_period()?, 1),
            TableSpan::Second => (config.sample_rate as usize, config.frequency as usize),
        };

        let samples: Box<[i16]> = (0..len).map(|i| config.sample_at(i)).collect();

        log::debug!(
            "Sine table: {}Hz @ {}Hz, {} samples, {} cycle(s), {:?}",
            config.frequency,
            config.sample_rate,
            len,
            cycles,
            config.depth
        );

        Ok(Self {
            samples,
            config,
            cycles,
        })
    }

    #[inline]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 表内完整周期数
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn config(&self) -> &ToneConfig {
        &self.config
    }

    /// 最大绝对幅度
    pub fn peak(&self) -> i32 {
        self.samples
            .iter()
            .map(|&s| (s as i32).abs())
            .max()
            .unwrap_or(0)
    }

    /// 逗号分隔的样本列表，便于嵌入其他程序
    pub fn to_comma_separated(&self) -> String {
        self.samples
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
