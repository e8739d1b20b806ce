// src/session.rs
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};

/// Output paths of one run. Both files share a stem so they can be matched up later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionFiles {
    pub stem: String,
    pub csv_path: PathBuf,
    pub png_path: PathBuf,
}

impl SessionFiles {
    pub fn new(dir: &Path, prefix: &str, started_at: DateTime<Local>) -> Self {
        let stem = format!("{prefix}_{}", started_at.format("%Y%m%d_%H%M%S"));
        Self {
            csv_path: dir.join(format!("{stem}.csv")),
            png_path: dir.join(format!("{stem}.png")),
            stem,
        }
    }

    pub fn now(dir: &Path, prefix: &str) -> Self {
        Self::new(dir, prefix, Local::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn csv_and_png_share_the_timestamp_stem() {
        let started = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let files = SessionFiles::new(Path::new("out"), "vibration", started);
        assert_eq!(files.stem, "vibration_20240309_070501");
        assert_eq!(files.csv_path, Path::new("out/vibration_20240309_070501.csv"));
        assert_eq!(files.png_path, Path::new("out/vibration_20240309_070501.png"));
    }
}
