#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Creates `<root>/0_raw` and returns `root`.
pub fn data_root(dir: &Path) -> PathBuf {
    fs::create_dir_all(dir.join("0_raw")).unwrap();
    dir.to_path_buf()
}

/// Writes `0_raw/<project>/<recording>/acceleration.csv` with a device
/// comment line, a header and one row per sample.
pub fn write_recording(root: &Path, project: &str, recording: &str, rows: &[(i64, f64, f64, f64)]) -> PathBuf {
    let dir = root.join("0_raw").join(project).join(recording);
    fs::create_dir_all(&dir).unwrap();

    let mut content = String::from("# device=wrist-01 rate=100Hz\ntimestamp,x,y,z\n");
    for (timestamp, x, y, z) in rows {
        content.push_str(&format!("{timestamp},{x},{y},{z}\n"));
    }
    let path = dir.join("acceleration.csv");
    fs::write(&path, content).unwrap();
    path
}

/// `count` samples spaced `step` nanoseconds apart, starting at `origin`.
pub fn ramp(count: usize, origin: i64, step: i64) -> Vec<(i64, f64, f64, f64)> {
    (0..count)
        .map(|i| {
            let value = i as f64;
            (origin + step * i as i64, value, value * 2.0, 9.81)
        })
        .collect()
}
