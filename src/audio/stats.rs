//! 播放统计模块
//!
//! 单线程播放循环内收集：写入次数、帧数、短写、恢复、写入间隔

use std::fmt;

use super::timing::now_ns;

/// 播放统计收集器
#[derive(Debug, Default)]
pub struct PlaybackStats {
    writes: u64,
    frames_requested: u64,
    frames_written: u64,
    short_writes: u64,
    write_errors: u64,
    recoveries: u64,
    failed_recoveries: u64,
    aborted: bool,
    drain_failed: bool,

    // 写入间隔（纳秒）
    last_write_ns: u64,
    interval_min_ns: u64,
    interval_max_ns: u64,
    interval_sum_ns: u64,
    interval_count: u64,
}

impl PlaybackStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 记录一次成功返回的写入（使用当前时间）
    #[inline]
    pub fn record_write(&mut self, requested: usize, written: usize) {
        self.record_write_at(requested, written, now_ns());
    }

    /// 记录一次成功返回的写入
    ///
    /// `timestamp_ns`: 写入完成时刻，0 表示不参与间隔统计
    pub fn record_write_at(&mut self, requested: usize, written: usize, timestamp_ns: u64) {
        self.writes += 1;
        self.frames_requested += requested as u64;
        self.frames_written += written as u64;
        if written < requested {
            self.short_writes += 1;
        }
        self.record_interval(timestamp_ns);
    }

    /// 记录一次负返回值的写入
    #[inline]
    pub fn record_write_error(&mut self, requested: usize) {
        self.writes += 1;
        self.write_errors += 1;
        self.frames_requested += requested as u64;
    }

    #[inline]
    pub fn record_recovery(&mut self, succeeded: bool) {
        if succeeded {
            self.recoveries += 1;
        } else {
            self.failed_recoveries += 1;
        }
    }

    /// 写入循环提前终止
    pub fn record_abort(&mut self) {
        self.aborted = true;
    }

    pub fn record_drain_failure(&mut self) {
        self.drain_failed = true;
    }

    fn record_interval(&mut self, timestamp_ns: u64) {
        if timestamp_ns == 0 {
            return;
        }
        let last = std::mem::replace(&mut self.last_write_ns, timestamp_ns);
        if last == 0 {
            return;
        }

        let interval = timestamp_ns.saturating_sub(last);
        if self.interval_count == 0 {
            self.interval_min_ns = interval;
            self.interval_max_ns = interval;
        } else {
            self.interval_min_ns = self.interval_min_ns.min(interval);
            self.interval_max_ns = self.interval_max_ns.max(interval);
        }
        self.interval_sum_ns += interval;
        self.interval_count += 1;
    }

    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes
    }

    #[inline]
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    #[inline]
    pub fn short_writes(&self) -> u64 {
        self.short_writes
    }

    /// 生成报告
    pub fn report(&self, sample_rate: u32) -> StatsReport {
        let audio_secs = if sample_rate > 0 {
            self.frames_written as f64 / sample_rate as f64
        } else {
            0.0
        };

        let intervals = if self.interval_count == 0 {
            IntervalStats::default()
        } else {
            IntervalStats {
                min_ns: self.interval_min_ns,
                max_ns: self.interval_max_ns,
                avg_ns: self.interval_sum_ns / self.interval_count,
                count: self.interval_count,
            }
        };

        StatsReport {
            writes: self.writes,
            frames_requested: self.frames_requested,
            frames_written: self.frames_written,
            short_writes: self.short_writes,
            write_errors: self.write_errors,
            recoveries: self.recoveries,
            failed_recoveries: self.failed_recoveries,
            aborted: self.aborted,
            drain_failed: self.drain_failed,
            audio_secs,
            intervals,
        }
    }
}

/// 写入间隔统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalStats {
    pub min_ns: u64,
    pub max_ns: u64,
    pub avg_ns: u64,
    pub count: u64,
}

/// 统计报告
#[derive(Debug, Clone)]
pub struct StatsReport {
    pub writes: u64,
    pub frames_requested: u64,
    pub frames_written: u64,
    pub short_writes: u64,
    pub write_errors: u64,
    pub recoveries: u64,
    pub failed_recoveries: u64,
    /// 写入循环因恢复失败提前结束
    pub aborted: bool,
    pub drain_failed: bool,
    /// 实际送出的音频时长（秒）
    pub audio_secs: f64,
    pub intervals: IntervalStats,
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} writes, {}/{} frames ({:.2}s), {} short, {} errors, {} recovered",
            self.writes,
            self.frames_written,
            self.frames_requested,
            self.audio_secs,
            self.short_writes,
            self.write_errors,
            self.recoveries
        )?;
        if self.intervals.count > 0 {
            write!(
                f,
                ", interval {:.2}/{:.2}/{:.2}ms (min/avg/max)",
                self.intervals.min_ns as f64 / 1e6,
                self.intervals.avg_ns as f64 / 1e6,
                self.intervals.max_ns as f64 / 1e6
            )?;
        }
        if self.aborted {
            write!(f, ", aborted")?;
        }
        if self.drain_failed {
            write!(f, ", drain failed")?;
        }
        Ok(())
    }
}
