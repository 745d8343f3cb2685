//! pcm-sine - 固定配置正弦波播放
//!
//! 生成 1 kHz 正弦，交织、转换字节序后按帧写入 ALSA 回放设备。
//! 命令行只用来选择预设，所有数值都是编译期常量。

use clap::{Parser, Subcommand, ValueEnum};

use pcm_sine::audio::ByteOrder;
use pcm_sine::engine::{Player, Preset};

/// Stream a fixed-configuration sine tone to the default ALSA playback device
#[derive(Parser)]
#[command(name = "pcm-sine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// 10 s mono sine, whole-second writes (default)
    Mono,

    /// 20 s mono sine, 24-bit samples truncated to 16-bit with 1 dB damping
    BitDepth,

    /// 30 s stereo sine, 3 dB damping, 24 ms frames from a one-second buffer
    Stereo,

    /// 40 s stereo sine, 24 ms frames from a single-period lookup table
    Lut,

    /// Print a preset's mono lookup table as a comma-separated list
    Table {
        #[arg(value_enum, default_value = "lut")]
        preset: PresetArg,
    },

    /// List ALSA PCM devices
    Devices,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    Mono,
    BitDepth,
    Stereo,
    Lut,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Mono => Preset::Mono,
            PresetArg::BitDepth => Preset::BitDepth,
            PresetArg::Stereo => Preset::Stereo,
            PresetArg::Lut => Preset::Lut,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command.unwrap_or(Commands::Mono) {
        Commands::Mono => play(Preset::Mono)?,
        Commands::BitDepth => play(Preset::BitDepth)?,
        Commands::Stereo => play(Preset::Stereo)?,
        Commands::Lut => play(Preset::Lut)?,
        Commands::Table { preset } => print_table(preset.into())?,
        Commands::Devices => show_devices()?,
    }

    Ok(())
}

/// 播放一个预设
fn play(preset: Preset) -> anyhow::Result<()> {
    println!("pcm-sine: {}", preset.description());
    println!("CPU is using: {}", ByteOrder::host().name());

    // 配置错误在打开设备之前暴露
    let mut ring = preset.prepare_ring()?;
    let mut player = Player::new(preset.playback(), backend::sink());

    let report = player.run(&mut ring)?;

    println!("{}", report);
    Ok(())
}

/// 打印查找表
fn print_table(preset: Preset) -> anyhow::Result<()> {
    let table = preset.table()?;
    println!(
        "int16_t sine{}Hz[{}] {{ {} }};",
        table.config().frequency,
        table.len(),
        table.to_comma_separated()
    );
    Ok(())
}

/// 显示设备列表
fn show_devices() -> anyhow::Result<()> {
    let devices = backend::list_devices()?;

    println!("=== PCM Devices ===\n");
    for device in &devices {
        println!("Name of device: {}", device.name.as_deref().unwrap_or("-"));
        println!(
            "Description of device: {}",
            device.description.as_deref().unwrap_or("-")
        );
        println!(
            "I/O type of device: {}",
            device.io.as_deref().unwrap_or("Input/Output")
        );
        println!();
    }
    println!("{} device(s)", devices.len());

    Ok(())
}

#[cfg(all(target_os = "linux", feature = "alsa"))]
mod backend {
    use pcm_sine::audio::alsa;
    use pcm_sine::audio::{AlsaSink, DeviceHint};

    pub fn sink() -> AlsaSink {
        AlsaSink::new()
    }

    pub fn list_devices() -> anyhow::Result<Vec<DeviceHint>> {
        Ok(alsa::list_devices()?)
    }
}

#[cfg(not(all(target_os = "linux", feature = "alsa")))]
mod backend {
    use pcm_sine::audio::{AudioSink, DeviceHint, SinkError, SinkParams};

    const NO_BACKEND: &str = "no audio backend compiled in (build on Linux with the `alsa` feature)";

    /// 没有可用后端时，打开即失败
    pub struct MissingSink;

    impl AudioSink for MissingSink {
        fn open(&mut self, device: &str) -> Result<(), SinkError> {
            Err(SinkError::Open {
                device: device.to_string(),
                code: -libc::ENODEV,
                reason: NO_BACKEND.to_string(),
            })
        }

        fn set_params(&mut self, _params: &SinkParams) -> Result<(), SinkError> {
            Err(SinkError::NotOpen)
        }

        fn write_interleaved(&mut self, _words: &[u16], _frames: usize) -> Result<usize, SinkError> {
            Err(SinkError::NotOpen)
        }

        fn recover(&mut self, _code: i32, _silent: bool) -> Result<(), SinkError> {
            Err(SinkError::NotOpen)
        }

        fn drain(&mut self) -> Result<(), SinkError> {
            Err(SinkError::NotOpen)
        }

        fn close(&mut self) {}

        fn is_open(&self) -> bool {
            false
        }
    }

    pub fn sink() -> MissingSink {
        MissingSink
    }

    pub fn list_devices() -> anyhow::Result<Vec<DeviceHint>> {
        anyhow::bail!(NO_BACKEND)
    }
}
