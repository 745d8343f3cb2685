//! 音频 sink 抽象
//!
//! 播放循环只通过 `AudioSink` 与设备交互：
//! open → set_params → write_interleaved* (+ recover) → drain → close
//!
//! 只支持回放方向、交织读写访问

use thiserror::Error;

use super::format::AudioFormat;

/// 固定的 sink 参数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkParams {
    /// 采样率、声道数、样本字节序（16-bit 有符号）
    pub format: AudioFormat,
    /// 允许 sink 做软件重采样
    pub soft_resample: bool,
    /// 设备缓冲时长（微秒）
    pub latency_us: u32,
}

/// sink 错误
///
/// `code` 是设备返回的负错误码
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("playback open error on '{device}': {reason}")]
    Open {
        device: String,
        code: i32,
        reason: String,
    },

    #[error("playback parameter error: {reason}")]
    Params { code: i32, reason: String },

    #[error("write failed: {reason}")]
    Write { code: i32, reason: String },

    #[error("recovery failed: {reason}")]
    Recover { code: i32, reason: String },

    #[error("drain failed: {reason}")]
    Drain { code: i32, reason: String },

    #[error("cannot get device names: {reason}")]
    Enumerate { code: i32, reason: String },

    #[error("sink is not open")]
    NotOpen,
}

impl SinkError {
    /// 设备错误码（如果有）
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Open { code, .. }
            | Self::Params { code, .. }
            | Self::Write { code, .. }
            | Self::Recover { code, .. }
            | Self::Drain { code, .. }
            | Self::Enumerate { code, .. } => Some(*code),
            Self::NotOpen => None,
        }
    }
}

/// 阻塞式音频 sink
pub trait AudioSink {
    /// 以回放方向打开设备
    fn open(&mut self, device: &str) -> Result<(), SinkError>;

    /// 设置格式、访问方式、声道、采样率、重采样和缓冲时长
    fn set_params(&mut self, params: &SinkParams) -> Result<(), SinkError>;

    /// 写入 `frames` 帧交织样本，返回实际写入的帧数（可能少于请求）
    ///
    /// `words` 至少包含 `frames × channels` 个样本，已按 sink 字节序排列。
    /// 设备返回负值时得到 `SinkError::Write`
    fn write_interleaved(&mut self, words: &[u16], frames: usize) -> Result<usize, SinkError>;

    /// 从写入错误中恢复（underrun 等）
    fn recover(&mut self, code: i32, silent: bool) -> Result<(), SinkError>;

    /// 播放完已缓冲但未播放的数据
    fn drain(&mut self) -> Result<(), SinkError>;

    /// 释放设备，未打开时什么也不做
    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// 设备枚举结果
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceHint {
    pub name: Option<String>,
    pub description: Option<String>,
    /// I/O 方向（"Input" / "Output"，缺省表示双向）
    pub io: Option<String>,
}
