//! 只读样本环
//!
//! 缓冲区在启动时构造，之后只移动读位置。
//! `next_frame` 是唯一的读取入口：
//! - 读位置 + 帧长 <= 缓冲区长度：直接返回缓冲区切片
//! - 否则：把尾部和头部拼接到临时缓冲区，返回完整的一帧（绝不短读）
//!
//! 读位置只按 sink 实际接受的帧数前进（`advance`），对缓冲区长度取模

use super::format::{ByteOrder, WireBuffer};

#[derive(Debug)]
pub struct FrameRing {
    buffer: WireBuffer,
    channels: usize,
    /// 读位置（样本数，始终 < buffer.len()）
    read_pos: usize,
    /// 跨越环绕点时拼接帧用的临时缓冲区
    scratch: Vec<u16>,
}

impl FrameRing {
    /// 缓冲区长度必须是声道数的非零整数倍
    pub fn new(buffer: WireBuffer, channels: usize) -> Self {
        assert!(channels > 0, "channel count must be non-zero");
        assert!(!buffer.is_empty(), "ring buffer must not be empty");
        assert!(
            buffer.len() % channels == 0,
            "buffer length {} is not a multiple of {} channels",
            buffer.len(),
            channels
        );

        Self {
            buffer,
            channels,
            read_pos: 0,
            scratch: Vec::new(),
        }
    }

    /// 从读位置开始的 `frames` 帧（`frames × channels` 个样本），不移动读位置
    pub fn next_frame(&mut self, frames: usize) -> &[u16] {
        let wanted = frames * self.channels;
        let words = self.buffer.words();
        let pos = self.read_pos;

        if pos + wanted <= words.len() {
            return &words[pos..pos + wanted];
        }

        // buffer[pos..] ++ buffer[0..]，帧比整个缓冲区还长时继续循环
        self.scratch.clear();
        self.scratch.reserve(wanted);
        self.scratch.extend(
            words[pos..]
                .iter()
                .chain(words.iter().cycle())
                .take(wanted)
                .copied(),
        );
        &self.scratch
    }

    /// 读位置前进 `frames` 帧
    #[inline]
    pub fn advance(&mut self, frames: usize) {
        let len = self.buffer.len();
        self.read_pos = (self.read_pos + (frames * self.channels) % len) % len;
    }

    /// 当前读位置（样本数）
    #[inline]
    pub fn position(&self) -> usize {
        self.read_pos
    }

    /// 回到缓冲区起点
    pub fn rewind(&mut self) {
        self.read_pos = 0;
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// 缓冲区样本数
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 缓冲区帧数
    #[inline]
    pub fn frames(&self) -> usize {
        self.buffer.len() / self.channels
    }

    #[inline]
    pub fn order(&self) -> ByteOrder {
        self.buffer.order()
    }

    pub fn buffer(&self) -> &WireBuffer {
        &self.buffer
    }
}
