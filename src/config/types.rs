use std::time::Duration;

use serde::Deserialize;

use crate::args::{ArrivalKind, HttpMethod};
use crate::error::ValidationError;

/// Contents of `pacebench.toml` / `pacebench.json`. Every field is optional;
/// flags given on the command line win.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub data: Option<String>,
    pub requests: Option<u64>,
    pub warmup: Option<u64>,
    pub rate: Option<u64>,
    #[serde(alias = "connections")]
    pub concurrency: Option<usize>,
    pub arrival: Option<ArrivalKind>,
    pub seed: Option<u64>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub status: Option<u16>,
    pub event_buffer: Option<usize>,
    pub verbose: Option<bool>,
}

/// A duration written either as whole seconds or with a unit suffix.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
