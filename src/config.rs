// src/config.rs
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::drivers::buffer::DEFAULT_CAPACITY;
use crate::drivers::MonitorError;

// 9x5 英寸的图，600 dpi 已是 5400x3000 像素
pub const MAX_DPI: u32 = 600;

/// Runtime settings. Every field has a default so a config file may set any subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub port: String,
    pub baud: u32,
    pub read_timeout_ms: u64,
    /// Wait after opening the port; the board resets when the port opens.
    pub settle_ms: u64,
    pub capacity: usize,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub dpi: u32,
    pub redraw_tick_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: "COM3".to_owned(),
            baud: 115_200,
            read_timeout_ms: 1000,
            settle_ms: 2000,
            capacity: DEFAULT_CAPACITY,
            output_dir: PathBuf::from("."),
            file_prefix: "vibration".to_owned(),
            dpi: 150,
            redraw_tick_ms: 1,
        }
    }
}

impl MonitorConfig {
    pub fn load(path: &Path) -> Result<Self, MonitorError> {
        let text = std::fs::read_to_string(path).map_err(|e| MonitorError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| MonitorError::Config(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.port.trim().is_empty() {
            return Err(MonitorError::Config("port name is empty".into()));
        }
        if self.baud == 0 {
            return Err(MonitorError::Config("baud rate must be greater than zero".into()));
        }
        if self.capacity == 0 {
            return Err(MonitorError::Config("capacity must be at least 1".into()));
        }
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(MonitorError::Config(format!(
                "dpi must be between 1 and {MAX_DPI}, got {}",
                self.dpi
            )));
        }
        Ok(())
    }

    /// Pretty JSON in the same shape [`MonitorConfig::load`] reads.
    pub fn to_json(&self) -> Result<String, MonitorError> {
        serde_json::to_string_pretty(self).map_err(|e| MonitorError::Config(e.to_string()))
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn redraw_tick(&self) -> Duration {
        Duration::from_millis(self.redraw_tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_arduino_sketch() {
        let config = MonitorConfig::default();
        assert_eq!(config.port, "COM3");
        assert_eq!(config.baud, 115_200);
        assert_eq!(config.capacity, 1200);
        assert_eq!(config.read_timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scope.json");
        std::fs::write(&path, r#"{ "port": "/dev/ttyACM0", "capacity": 600 }"#).unwrap();
        let config = MonitorConfig::load(&path).unwrap();
        assert_eq!(config.port, "/dev/ttyACM0");
        assert_eq!(config.capacity, 600);
        assert_eq!(config.baud, 115_200);
        assert_eq!(config.file_prefix, "vibration");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ port: ").unwrap();
        assert!(matches!(
            MonitorConfig::load(&path),
            Err(MonitorError::Config(_))
        ));
    }

    #[test]
    fn validation_rejects_zero_values() {
        let config = MonitorConfig {
            capacity: 0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
        let config = MonitorConfig {
            baud: 0,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_bounds_dpi() {
        let cases = [
            (0, false),
            (1, true),
            (MAX_DPI, true),
            (MAX_DPI + 1, false),
            (u32::MAX, false),
        ];
        for (dpi, ok) in cases {
            let config = MonitorConfig {
                dpi,
                ..MonitorConfig::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "dpi {dpi}");
        }
    }

    #[test]
    fn dumped_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.json");
        let config = MonitorConfig {
            port: "/dev/ttyUSB1".into(),
            dpi: 300,
            ..MonitorConfig::default()
        };
        std::fs::write(&path, config.to_json().unwrap()).unwrap();
        assert_eq!(MonitorConfig::load(&path).unwrap(), config);
    }
}
