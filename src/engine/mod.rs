//! 播放引擎
//!
//! 单线程、阻塞式播放循环：
//! Closed → Configured → Streaming → Draining → Closed
//!
//! - 打开设备或设置参数失败：致命错误，直接返回
//! - 写入返回负值：恢复一次，恢复失败则提前结束写入循环
//! - 短写：记录日志，只按实际写入帧数前进
//! - drain 失败：记录日志，仍然关闭设备

mod config;
mod preset;

pub use config::{prepare_ring, ConfigError, PlaybackConfig};
pub use preset::Preset;

use thiserror::Error;

use crate::audio::{AudioSink, FrameRing, Pacer, PlaybackStats, SinkError, SleepPacer, StatsReport};

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Closed,
    Configured,
    Streaming,
    Draining,
}

/// 引擎错误（均为致命错误）
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("ring buffer has {ring} channel(s) but playback is configured for {config}")]
    ChannelMismatch { ring: usize, config: usize },
}

/// 单帧写入结果
enum WriteStep {
    /// sink 接受的帧数（恢复成功后为 0）
    Written(usize),
    /// 恢复失败，结束写入循环
    Abort,
}

/// 播放器
///
/// 在整个生命周期内独占 sink
pub struct Player<S: AudioSink, P: Pacer = SleepPacer> {
    config: PlaybackConfig,
    sink: S,
    pacer: P,
    state: PlaybackState,
    stats: PlaybackStats,
}

impl<S: AudioSink> Player<S, SleepPacer> {
    pub fn new(config: PlaybackConfig, sink: S) -> Self {
        Self::with_pacer(config, sink, SleepPacer)
    }
}

impl<S: AudioSink, P: Pacer> Player<S, P> {
    pub fn with_pacer(config: PlaybackConfig, sink: S, pacer: P) -> Self {
        Self {
            config,
            sink,
            pacer,
            state: PlaybackState::Closed,
            stats: PlaybackStats::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// 完整播放一次：打开 → 写入 → drain → 关闭
    ///
    /// 只有配置阶段的错误会返回 Err；写入阶段的问题记录在报告里
    pub fn run(&mut self, ring: &mut FrameRing) -> Result<StatsReport, PlayerError> {
        self.config.validate()?;
        if ring.channels() != self.config.channels() {
            return Err(PlayerError::ChannelMismatch {
                ring: ring.channels(),
                config: self.config.channels(),
            });
        }

        self.stats.reset();
        self.configure()?;
        self.stream(ring);
        self.drain_and_close();

        let report = self.stats.report(self.config.format.sample_rate);
        log::info!("Playback finished: {}", report);
        Ok(report)
    }

    /// Closed → Configured
    fn configure(&mut self) -> Result<(), PlayerError> {
        debug_assert_eq!(self.state, PlaybackState::Closed);

        self.sink.open(self.config.device)?;

        let params = self.config.sink_params();
        if let Err(e) = self.sink.set_params(&params) {
            self.sink.close();
            return Err(e.into());
        }

        self.state = PlaybackState::Configured;
        log::info!(
            "Sink configured: '{}' {}Hz {}ch S16 {}",
            self.config.device,
            params.format.sample_rate,
            params.format.channels,
            params.format.order.name()
        );
        Ok(())
    }

    /// Configured → Streaming，直到写满总时长或恢复失败
    fn stream(&mut self, ring: &mut FrameRing) {
        self.state = PlaybackState::Streaming;

        let total = self.config.total_writes();
        let per_second = self.config.writes_per_second();
        let frames = self.config.frames_per_write;
        let period = self.config.frame_duration();

        log::info!(
            "Streaming {} writes of {} frames ({:?} each)",
            total,
            frames,
            period
        );

        for iteration in 1..=total {
            let written = match self.write_frame(ring, frames) {
                WriteStep::Written(n) => n,
                WriteStep::Abort => {
                    self.stats.record_abort();
                    log::warn!(
                        "Streaming aborted after {} of {} writes",
                        iteration - 1,
                        total
                    );
                    return;
                }
            };

            ring.advance(written);

            if self.config.pacing {
                self.pacer.pace(period);
            }

            if iteration % per_second == 0 {
                log::info!("Passed audio-write iterations: {}", iteration / per_second);
            }
        }
    }

    /// 写入一帧，负返回值时恢复一次
    fn write_frame(&mut self, ring: &mut FrameRing, frames: usize) -> WriteStep {
        let words = ring.next_frame(frames);

        match self.sink.write_interleaved(words, frames) {
            Ok(written) => {
                let written = written.min(frames);
                if written < frames {
                    log::warn!("Short write (expected {}, wrote {})", frames, written);
                } else {
                    log::debug!("Wrote {} frames", written);
                }
                self.stats.record_write(frames, written);
                WriteStep::Written(written)
            }
            Err(err) => {
                self.stats.record_write_error(frames);
                let code = err.code().unwrap_or(-libc::EIO);
                log::warn!("{}, attempting recovery", err);

                match self.sink.recover(code, false) {
                    Ok(()) => {
                        self.stats.record_recovery(true);
                        WriteStep::Written(0)
                    }
                    Err(recover_err) => {
                        self.stats.record_recovery(false);
                        log::error!("Write failed: {} ({})", err, recover_err);
                        WriteStep::Abort
                    }
                }
            }
        }
    }

    /// Streaming → Draining → Closed，drain 失败也要关闭
    fn drain_and_close(&mut self) {
        self.state = PlaybackState::Draining;

        if let Err(e) = self.sink.drain() {
            self.stats.record_drain_failure();
            log::warn!("{}", e);
        }

        self.sink.close();
        self.state = PlaybackState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    use crate::audio::{AudioFormat, ByteOrder, SinkParams, WireBuffer};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open(String),
        SetParams,
        /// (请求帧数, 第一个样本)
        Write(usize, u16),
        Recover(i32),
        Drain,
        Close,
    }

    /// 按脚本返回结果的 sink，脚本用完后全部写入成功
    #[derive(Default)]
    struct ScriptedSink {
        writes: VecDeque<Result<usize, i32>>,
        recover_fails: bool,
        open_fails: bool,
        params_fail: bool,
        drain_fails: bool,
        open: bool,
        calls: Vec<Call>,
    }

    impl ScriptedSink {
        fn writes(&self) -> Vec<(usize, u16)> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Write(frames, first) => Some((*frames, *first)),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, call: &Call) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl AudioSink for ScriptedSink {
        fn open(&mut self, device: &str) -> Result<(), SinkError> {
            self.calls.push(Call::Open(device.to_string()));
            if self.open_fails {
                return Err(SinkError::Open {
                    device: device.to_string(),
                    code: -2,
                    reason: "No such file or directory".into(),
                });
            }
            self.open = true;
            Ok(())
        }

        fn set_params(&mut self, _params: &SinkParams) -> Result<(), SinkError> {
            self.calls.push(Call::SetParams);
            if self.params_fail {
                return Err(SinkError::Params {
                    code: -22,
                    reason: "Invalid argument".into(),
                });
            }
            Ok(())
        }

        fn write_interleaved(&mut self, words: &[u16], frames: usize) -> Result<usize, SinkError> {
            self.calls.push(Call::Write(frames, words[0]));
            match self.writes.pop_front().unwrap_or(Ok(frames)) {
                Ok(n) => Ok(n),
                Err(code) => Err(SinkError::Write {
                    code,
                    reason: "Broken pipe".into(),
                }),
            }
        }

        fn recover(&mut self, code: i32, _silent: bool) -> Result<(), SinkError> {
            self.calls.push(Call::Recover(code));
            if self.recover_fails {
                return Err(SinkError::Recover {
                    code,
                    reason: "Broken pipe".into(),
                });
            }
            Ok(())
        }

        fn drain(&mut self) -> Result<(), SinkError> {
            self.calls.push(Call::Drain);
            if self.drain_fails {
                return Err(SinkError::Drain {
                    code: -5,
                    reason: "Input/output error".into(),
                });
            }
            Ok(())
        }

        fn close(&mut self) {
            if self.open {
                self.calls.push(Call::Close);
                self.open = false;
            }
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    #[derive(Default)]
    struct CountingPacer {
        periods: Vec<Duration>,
    }

    impl Pacer for CountingPacer {
        fn pace(&mut self, period: Duration) {
            self.periods.push(period);
        }
    }

    /// 8 kHz 立体声，每次 100 帧，1 秒 → 80 次写入
    fn config() -> PlaybackConfig {
        PlaybackConfig {
            device: "test",
            format: AudioFormat::new(8000, 2, ByteOrder::host()),
            frames_per_write: 100,
            buffer_frames: 1000,
            pacing: true,
            duration_secs: 1,
            latency_us: 500_000,
            soft_resample: false,
        }
    }

    /// 样本值 = 帧序号，两个声道相同
    fn ring() -> FrameRing {
        let samples: Vec<i16> = (0..1000).flat_map(|i| [i as i16, i as i16]).collect();
        FrameRing::new(WireBuffer::from_samples(&samples), 2)
    }

    fn player(sink: ScriptedSink) -> Player<ScriptedSink, CountingPacer> {
        Player::with_pacer(config(), sink, CountingPacer::default())
    }

    #[test]
    fn test_full_run() {
        let mut player = player(ScriptedSink::default());
        let mut ring = ring();

        let report = player.run(&mut ring).unwrap();

        assert_eq!(player.state(), PlaybackState::Closed);
        assert_eq!(report.writes, 80);
        assert_eq!(report.frames_written, 8000);
        assert_eq!(report.short_writes, 0);
        assert!(!report.aborted);
        assert_eq!(player.pacer.periods.len(), 80);
        assert!(player
            .pacer
            .periods
            .iter()
            .all(|&p| p == Duration::from_micros(12_500)));

        let sink = player.into_sink();
        assert_eq!(sink.calls[0], Call::Open("test".into()));
        assert_eq!(sink.calls[1], Call::SetParams);
        assert_eq!(sink.calls[sink.calls.len() - 2], Call::Drain);
        assert_eq!(sink.calls[sink.calls.len() - 1], Call::Close);

        // 每次从上一帧结束处继续，1000 帧缓冲区循环 8 次
        let writes = sink.writes();
        assert_eq!(writes[0], (100, 0));
        assert_eq!(writes[1], (100, 100));
        assert_eq!(writes[10], (100, 0));
    }

    #[test]
    fn test_short_write_advances_by_written_frames() {
        let sink = ScriptedSink {
            writes: VecDeque::from([Ok(100), Ok(40), Ok(0)]),
            ..Default::default()
        };
        let mut player = player(sink);
        let mut ring = ring();

        let report = player.run(&mut ring).unwrap();

        // 短写不终止循环
        assert_eq!(report.writes, 80);
        assert_eq!(report.short_writes, 2);
        assert_eq!(report.frames_written, 8000 - 60 - 100);
        assert!(!report.aborted);
        assert!(report.to_string().contains(", 2 short,"));

        let writes = player.into_sink().writes();
        assert_eq!(writes[1], (100, 100));
        assert_eq!(writes[2], (100, 140));
        // 写入 0 帧时位置不变
        assert_eq!(writes[3], (100, 140));
        assert_eq!(writes[4], (100, 240));
    }

    #[test]
    fn test_recovered_write_retries_same_frame() {
        let sink = ScriptedSink {
            writes: VecDeque::from([Ok(100), Err(-32)]),
            ..Default::default()
        };
        let mut player = player(sink);
        let mut ring = ring();

        let report = player.run(&mut ring).unwrap();

        assert_eq!(report.write_errors, 1);
        assert_eq!(report.recoveries, 1);
        assert!(!report.aborted);
        assert_eq!(report.writes, 80);

        let sink = player.into_sink();
        assert_eq!(sink.count(&Call::Recover(-32)), 1);
        let writes = sink.writes();
        assert_eq!(writes[1], (100, 100));
        assert_eq!(writes[2], (100, 100));
    }

    #[test]
    fn test_failed_recovery_aborts_but_drains_and_closes() {
        let sink = ScriptedSink {
            writes: VecDeque::from([Ok(100), Ok(100), Err(-32)]),
            recover_fails: true,
            ..Default::default()
        };
        let mut player = player(sink);
        let mut ring = ring();

        let report = player.run(&mut ring).unwrap();

        assert!(report.aborted);
        assert_eq!(report.writes, 3);
        assert_eq!(report.failed_recoveries, 1);
        assert_eq!(player.state(), PlaybackState::Closed);
        let text = report.to_string();
        assert!(text.contains("1 errors, 0 recovered"), "{}", text);
        assert!(text.ends_with(", aborted"), "{}", text);
        // 中止的那次写入之后不再睡眠
        assert_eq!(player.pacer.periods.len(), 2);

        let sink = player.into_sink();
        assert_eq!(sink.count(&Call::Recover(-32)), 1);
        assert_eq!(sink.count(&Call::Drain), 1);
        assert_eq!(sink.count(&Call::Close), 1);
        assert_eq!(sink.writes().len(), 3);
    }

    #[test]
    fn test_open_failure_is_fatal() {
        let sink = ScriptedSink {
            open_fails: true,
            ..Default::default()
        };
        let mut player = player(sink);
        let mut ring = ring();

        let err = player.run(&mut ring).unwrap_err();
        assert!(matches!(err, PlayerError::Sink(SinkError::Open { .. })));
        assert_eq!(player.state(), PlaybackState::Closed);

        let sink = player.into_sink();
        assert_eq!(sink.calls, vec![Call::Open("test".into())]);
    }

    #[test]
    fn test_params_failure_closes_sink() {
        let sink = ScriptedSink {
            params_fail: true,
            ..Default::default()
        };
        let mut player = player(sink);
        let mut ring = ring();

        let err = player.run(&mut ring).unwrap_err();
        assert!(matches!(err, PlayerError::Sink(SinkError::Params { .. })));

        let sink = player.into_sink();
        assert_eq!(
            sink.calls,
            vec![Call::Open("test".into()), Call::SetParams, Call::Close]
        );
        assert!(!sink.is_open());
    }

    #[test]
    fn test_drain_failure_still_closes() {
        let sink = ScriptedSink {
            drain_fails: true,
            ..Default::default()
        };
        let mut player = player(sink);
        let mut ring = ring();

        let report = player.run(&mut ring).unwrap();
        assert!(report.drain_failed);
        assert_eq!(player.state(), PlaybackState::Closed);

        let sink = player.into_sink();
        assert_eq!(sink.count(&Call::Drain), 1);
        assert_eq!(sink.count(&Call::Close), 1);
    }

    #[test]
    fn test_no_pacing() {
        let mut config = config();
        config.pacing = false;
        let mut player =
            Player::with_pacer(config, ScriptedSink::default(), CountingPacer::default());
        let mut ring = ring();

        player.run(&mut ring).unwrap();
        assert!(player.pacer.periods.is_empty());
    }

    #[test]
    fn test_channel_mismatch() {
        let mut player = player(ScriptedSink::default());
        let samples = vec![0i16; 100];
        let mut mono = FrameRing::new(WireBuffer::from_samples(&samples), 1);

        assert!(matches!(
            player.run(&mut mono),
            Err(PlayerError::ChannelMismatch { ring: 1, config: 2 })
        ));
        assert!(player.sink().calls.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let mut config = config();
        config.frames_per_write = 0;
        let mut player =
            Player::with_pacer(config, ScriptedSink::default(), CountingPacer::default());
        let mut ring = ring();

        assert!(matches!(
            player.run(&mut ring),
            Err(PlayerError::Config(ConfigError::ZeroFrameSize))
        ));
        assert!(player.sink().calls.is_empty());
    }
}
