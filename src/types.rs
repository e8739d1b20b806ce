// src/types.rs
use std::path::PathBuf;

/// One validated telemetry record as sent by the microcontroller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub timestamp_ms: u64,
    pub magnitude: f64,
    pub rms: f64,
}

/// A sample placed on the plot's time axis (seconds since the first sample).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    pub elapsed: f64,
    pub magnitude: f64,
    pub rms: f64,
}

// 一次循环的结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pump {
    Accepted(SamplePoint),
    Rejected,
    Idle,
    Closed,
}

// 会话结束时产生的文件
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifacts {
    pub csv_path: PathBuf,
    pub png_path: PathBuf,
}

impl Artifacts {
    pub fn report(&self) {
        println!("Saved CSV: {}", self.csv_path.display());
        println!("Saved PNG: {}", self.png_path.display());
    }
}
