use serde::Deserialize;
use wirecall_core::error::{Result, WireCallError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    pub version: u32,

    #[serde(default)]
    pub worker: WorkerSection,

    #[serde(default)]
    pub log: LogSection,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            worker: WorkerSection::default(),
            log: LogSection::default(),
        }
    }
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WireCallError::UnsupportedVersion);
        }

        self.worker.validate()?;
        self.log.validate()?;

        Ok(())
    }
}

/// What the serve loop does with text that is not a valid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeErrorPolicy {
    /// Log a warning and keep serving.
    #[default]
    Drop,
    /// Stop serving and return the decode error.
    Fail,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerSection {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    #[serde(default)]
    pub on_decode_error: DecodeErrorPolicy,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            on_decode_error: DecodeErrorPolicy::default(),
        }
    }
}

impl WorkerSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.channel_capacity) {
            return Err(WireCallError::Config(
                "worker.channel_capacity must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LogSection {
    pub fn validate(&self) -> Result<()> {
        if self.filter.trim().is_empty() {
            return Err(WireCallError::Config("log.filter must not be empty".into()));
        }
        Ok(())
    }
}

fn default_channel_capacity() -> usize {
    1024
}
fn default_log_filter() -> String {
    "info".into()
}
