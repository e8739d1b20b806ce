// src/main.rs
mod config;
mod drivers;
mod engine;
mod gui;
mod recorder;
mod session;
mod types;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use anyhow::{bail, Context, Result};
use clap::Parser;
use config::MonitorConfig;
use drivers::{open_replay, open_serial, LineSource, Monitor, PlotStyle};
use engine::{RunSummary, StopReason};
use session::SessionFiles;

// 窗口模式下串口超时要短一些，否则界面会卡顿
const GUI_READ_TIMEOUT: Duration = Duration::from_millis(20);

#[derive(Parser, Debug)]
#[command(name = "vibescope")]
#[command(about = "Record and live-plot MPU6050 vibration telemetry from a serial port", long_about = None)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port name (e.g. COM3, /dev/ttyACM0)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Number of recent samples kept on the plot
    #[arg(long)]
    capacity: Option<usize>,

    /// Directory for the CSV log and PNG snapshot
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Resolution of the saved PNG
    #[arg(long)]
    dpi: Option<u32>,

    /// Read wire-format lines from a file instead of the serial port
    #[arg(long)]
    replay: Option<PathBuf>,

    /// No window; record and snapshot only
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn resolve(&self) -> Result<MonitorConfig> {
        let mut config = match &self.config {
            Some(path) => MonitorConfig::load(path)?,
            None => MonitorConfig::default(),
        };
        if let Some(port) = &self.port {
            config.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.baud = baud;
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dpi) = self.dpi {
            config.dpi = dpi;
        }
        config.validate()?;
        Ok(config)
    }
}

fn open_source(args: &Args, config: &MonitorConfig) -> Result<Box<dyn LineSource>> {
    if let Some(path) = &args.replay {
        println!("Replaying {}. Press Ctrl+C to stop.", path.display());
        return Ok(Box::new(open_replay(path)?));
    }
    let timeout = if args.headless {
        config.read_timeout()
    } else {
        config.read_timeout().min(GUI_READ_TIMEOUT)
    };
    let port = open_serial(&config.port, config.baud, timeout)?;
    // 打开串口会让 Arduino 复位
    std::thread::sleep(config.settle_delay());
    println!(
        "Reading from {} @ {}. Press Ctrl+C to stop.",
        config.port, config.baud
    );
    Ok(Box::new(port))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = args.resolve()?;
    log::debug!("resolved config: {}", config.to_json()?);

    // 打不开串口就直接退出，不创建任何文件
    let source = open_source(&args, &config)?;

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || {
        println!("\nStopping…");
        flag.store(true, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("could not create {}", config.output_dir.display())
    })?;
    let files = SessionFiles::now(&config.output_dir, &config.file_prefix);
    let monitor = Monitor::start(
        source,
        files,
        config.capacity,
        PlotStyle::for_dpi(config.dpi),
    )?;

    let summary = if args.headless {
        engine::run_headless(monitor, &stop, config.redraw_tick())?
    } else {
        match gui::run(monitor, stop, config.redraw_tick())? {
            Some(result) => result?,
            None => bail!("window closed before the session was torn down"),
        }
    };
    finish(summary)
}

fn finish(summary: RunSummary) -> Result<()> {
    log::info!("{} samples recorded", summary.samples);
    match summary.stop {
        StopReason::Fault(e) => Err(e).context("serial transport failed"),
        StopReason::EndOfStream | StopReason::Interrupted => Ok(()),
    }
}
