//! Worker config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use wirecall_core::error::{Result, WireCallError};

pub use schema::{DecodeErrorPolicy, LogSection, WorkerConfig, WorkerSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<WorkerConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        WireCallError::Config(format!("read config failed ({}): {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<WorkerConfig> {
    let cfg: WorkerConfig = serde_yaml::from_str(s)
        .map_err(|e| WireCallError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<WorkerConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_from_file(path)
    } else {
        Ok(WorkerConfig::default())
    }
}
