//! 音频格式和样本字节序
//!
//! 样本统一为 16-bit 有符号整数。写给 sink 之前，样本以 u16 位模式保存
//! （`WireBuffer`），并按 sink 要求的字节序排列。
//!
//! 有符号/无符号之间只做位模式重解释，数值不变：
//! - `sample_to_bits(-1) == 0xFFFF`
//! - `bits_to_sample(0x8000) == -32768`

use std::sync::OnceLock;

/// 字节序
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// 主机字节序（全局缓存，只探测一次）
static HOST_ORDER: OnceLock<ByteOrder> = OnceLock::new();

impl ByteOrder {
    /// 主机字节序
    pub fn host() -> Self {
        *HOST_ORDER.get_or_init(Self::probe)
    }

    /// 固定探测值转换为网络序（大端）后与原值比较，不同即为小端主机
    fn probe() -> Self {
        const PROBE: u32 = 23;
        if PROBE.to_be() != PROBE {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Little => "little endian",
            ByteOrder::Big => "big endian",
        }
    }
}

/// 音频格式（固定 16-bit 有符号整数，交织）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    /// sink 要求的样本字节序
    pub order: ByteOrder,
}

impl AudioFormat {
    pub const BITS_PER_SAMPLE: u16 = 16;

    pub const fn new(sample_rate: u32, channels: u16, order: ByteOrder) -> Self {
        Self {
            sample_rate,
            channels,
            order,
        }
    }

    /// 每帧的样本数（= 声道数）
    #[inline]
    pub fn samples_per_frame(&self) -> usize {
        self.channels as usize
    }

    /// 每样本的字节数
    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        Self::BITS_PER_SAMPLE as usize / 8
    }

    /// 每帧的字节数
    #[inline]
    pub fn bytes_per_frame(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }
}

/// i16 → u16，位模式不变
#[inline]
pub const fn sample_to_bits(sample: i16) -> u16 {
    u16::from_ne_bytes(sample.to_ne_bytes())
}

/// u16 → i16，位模式不变
#[inline]
pub const fn bits_to_sample(bits: u16) -> i16 {
    i16::from_ne_bytes(bits.to_ne_bytes())
}

/// 逐个交换 16-bit 字的高低字节，两次调用还原
pub fn swap_bytes_in_place(words: &mut [u16]) {
    for word in words.iter_mut() {
        *word = word.swap_bytes();
    }
}

/// 按某一字节序排列的 16-bit 样本
///
/// 记录当前字节序，`normalize` 只在字节序不同时交换，
/// 因此同一缓冲区不会被交换两次
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireBuffer {
    words: Box<[u16]>,
    order: ByteOrder,
}

impl WireBuffer {
    /// 从主机序样本构造
    pub fn from_samples(samples: &[i16]) -> Self {
        Self {
            words: samples.iter().map(|&s| sample_to_bits(s)).collect(),
            order: ByteOrder::host(),
        }
    }

    /// 转换到目标字节序，返回是否发生了交换
    pub fn normalize(&mut self, target: ByteOrder) -> bool {
        if self.order == target {
            return false;
        }
        swap_bytes_in_place(&mut self.words);
        self.order = target;
        true
    }

    #[inline]
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// 内存中的 16-bit 字，可直接交给 sink
    #[inline]
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// 按当前字节序解码第 i 个样本
    pub fn sample_at(&self, index: usize) -> i16 {
        let word = self.words[index];
        if self.order == ByteOrder::host() {
            bits_to_sample(word)
        } else {
            bits_to_sample(word.swap_bytes())
        }
    }
}
