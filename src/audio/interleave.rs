//! 单声道查找表 → 交织多声道缓冲区
//!
//! 帧交织：每个单声道样本连续复制 C 次（L R L R ...），不是按声道分块

/// 每个单声道样本复制到所有声道
pub fn interleave(mono: &[i16], channels: usize) -> Vec<i16> {
    tile_interleaved(mono, channels, mono.len())
}

/// 循环平铺查找表直到 `frames` 帧，再交织到 `channels` 个声道
///
/// 查找表覆盖整数个周期，平铺后首尾相位连续
pub fn tile_interleaved(mono: &[i16], channels: usize, frames: usize) -> Vec<i16> {
    assert!(channels > 0, "channel count must be non-zero");
    assert!(
        frames == 0 || !mono.is_empty(),
        "cannot tile an empty lookup table"
    );

    let mut out = Vec::with_capacity(frames * channels);
    for &sample in mono.iter().cycle().take(frames) {
        out.extend(std::iter::repeat(sample).take(channels));
    }
    out
}
