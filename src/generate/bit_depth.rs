//! 位深截断
//!
//! 24-bit 样本降到 16-bit：
//! 1. 加舍入偏置 128
//! 2. 算术右移 8 位
//! 3. 钳位到 i16 范围
//! 4. 整数乘除衰减（留出 headroom，避免舍入后削波）

/// 24-bit 有符号最大值
pub const INT24_MAX: i32 = 8_388_607;

/// 24-bit 有符号最小值
pub const INT24_MIN: i32 = -8_388_608;

/// 24 → 16 需要丢弃的位数
const SHIFT_24_TO_16: u32 = 8;

/// 舍入偏置（被丢弃部分的一半）
const ROUNDING_BIAS: i32 = 1 << (SHIFT_24_TO_16 - 1);

/// 整数衰减系数：`value * numerator / denominator`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Damping {
    numerator: i32,
    denominator: i32,
}

impl Damping {
    /// 不衰减
    pub const NONE: Damping = Damping::new(1, 1);

    /// -1 dB：20·log10(29204/32768) ≈ -1.0
    pub const ONE_DB: Damping = Damping::new(29204, 32768);

    /// -3 dB：20·log10(23198/32768) ≈ -3.0
    pub const THREE_DB: Damping = Damping::new(23198, 32768);

    /// 只能衰减：0 <= numerator <= denominator，denominator 为正
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        assert!(denominator > 0, "damping denominator must be positive");
        assert!(
            numerator >= 0 && numerator <= denominator,
            "damping must not amplify"
        );
        Self {
            numerator,
            denominator,
        }
    }

    /// 先乘后除，除法向零截断
    #[inline]
    pub fn apply(self, value: i32) -> i32 {
        (value as i64 * self.numerator as i64 / self.denominator as i64) as i32
    }

    /// 衰减量（dB，负数表示衰减）
    pub fn decibels(self) -> f64 {
        20.0 * (self.numerator as f64 / self.denominator as f64).log10()
    }
}

impl Default for Damping {
    fn default() -> Self {
        Self::NONE
    }
}

/// 将 24-bit 样本截断为 16-bit 并施加衰减
///
/// 输入超出 24-bit 范围时先钳位，保证右移结果有意义
#[inline]
pub fn truncate_24_to_16(sample: i32, damping: Damping) -> i16 {
    let sample = sample.clamp(INT24_MIN, INT24_MAX);
    let shifted = (sample + ROUNDING_BIAS) >> SHIFT_24_TO_16;
    let clamped = shifted.clamp(i16::MIN as i32, i16::MAX as i32);
    damping
        .apply(clamped)
        .clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
