use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::constants;

/// One row of recording metadata, as handed over by the data source.
///
/// Field names serialize in camelCase (`videoName`, `fileSize`, ...) so exports
/// from the web dashboard load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
  pub id: u64,
  #[serde(default)]
  pub preview: String,
  /// Usually `<channel code>_<YYYY-MM-DD>_<HH:MM:SS>.Mp4`.
  pub video_name: String,
  /// Magnitude with an optional `KB`/`MB`/`GB` suffix, e.g. `488.141 MB`.
  pub file_size: String,
  /// `HH:MM:SS`, hours may exceed 24.
  pub file_duration: String,
  pub channel_name: String,
  pub channel_code: String,
  #[serde(default)]
  pub capture_date: String,
  #[serde(default)]
  pub log_start_time: String,
  #[serde(default)]
  pub log_end_time: String,
}

impl VideoRecord {
  /// Total length in seconds.
  pub fn duration_secs(&self) -> Result<u64, DurationError> {
    parse_duration(&self.file_duration)
  }

  /// Size normalized to MB, unit-less sizes use the configured implicit unit.
  pub fn size_mb(&self) -> Result<f64, FileSizeError> {
    parse_file_size(&self.file_size, constants().implicit_size_unit)
  }
}

// --- Errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
  #[error("expected HH:MM:SS, got {0:?}")]
  Shape(String),
  #[error("component {component:?} of {input:?} is not a non-negative integer")]
  NotANumber { input: String, component: String },
  #[error("{0:?} overflows a second count")]
  Overflow(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileSizeError {
  #[error("no leading number in {0:?}")]
  MissingMagnitude(String),
  #[error("unknown size unit {unit:?} in {input:?}")]
  UnknownUnit { input: String, unit: String },
}

/// A record value that could not be turned into a comparator value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
  #[error("malformed duration: {0}")]
  Duration(#[from] DurationError),
  #[error("malformed file size: {0}")]
  FileSize(#[from] FileSizeError),
}

// --- Duration ---

/// Parse `HH:MM:SS` into total seconds.
///
/// Every component must be plain ASCII digits. Components are summed as
/// `h*3600 + m*60 + s` without a per-field range, so `00:61:00` is 3660.
/// Only a total that overflows `u64` is rejected.
pub fn parse_duration(input: &str) -> Result<u64, DurationError> {
  let trimmed = input.trim();
  let parts: Vec<&str> = trimmed.split(':').collect();
  let [hours, minutes, seconds] = parts.as_slice() else {
    return Err(DurationError::Shape(input.to_string()));
  };

  let component = |c: &str| -> Result<u64, DurationError> {
    let not_a_number = || DurationError::NotANumber { input: input.to_string(), component: c.to_string() };
    if c.is_empty() || !c.bytes().all(|b| b.is_ascii_digit()) {
      return Err(not_a_number());
    }
    c.parse::<u64>().map_err(|_| not_a_number())
  };

  let (h, m, s) = (component(*hours)?, component(*minutes)?, component(*seconds)?);
  h.checked_mul(3600)
    .zip(m.checked_mul(60))
    .and_then(|(h, m)| h.checked_add(m)?.checked_add(s))
    .ok_or_else(|| DurationError::Overflow(input.to_string()))
}

// --- File size ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeUnit {
  #[serde(rename = "KB")]
  Kb,
  #[serde(rename = "MB")]
  Mb,
  #[serde(rename = "GB")]
  Gb,
}

impl SizeUnit {
  pub fn from_token(token: &str) -> Option<Self> {
    match token.to_ascii_uppercase().as_str() {
      "KB" => Some(SizeUnit::Kb),
      "MB" => Some(SizeUnit::Mb),
      "GB" => Some(SizeUnit::Gb),
      _ => None,
    }
  }

  pub fn to_mb(self, magnitude: f64) -> f64 {
    match self {
      SizeUnit::Kb => magnitude / 1024.0,
      SizeUnit::Mb => magnitude,
      SizeUnit::Gb => magnitude * 1024.0,
    }
  }
}

/// Parse a size like `137.504 MB` into MB. Sizes without a unit are read in `implicit`.
pub fn parse_file_size(input: &str, implicit: SizeUnit) -> Result<f64, FileSizeError> {
  let trimmed = input.trim();

  let mut seen_dot = false;
  let end = trimmed
    .char_indices()
    .find(|&(_, c)| {
      if c == '.' && !seen_dot {
        seen_dot = true;
        return false;
      }
      !c.is_ascii_digit()
    })
    .map_or(trimmed.len(), |(i, _)| i);

  let (number, rest) = trimmed.split_at(end);
  let magnitude: f64 = number
    .parse()
    .ok()
    .filter(|v: &f64| v.is_finite())
    .ok_or_else(|| FileSizeError::MissingMagnitude(input.to_string()))?;

  let unit_token = rest.trim();
  let unit = if unit_token.is_empty() {
    implicit
  } else {
    SizeUnit::from_token(unit_token)
      .ok_or_else(|| FileSizeError::UnknownUnit { input: input.to_string(), unit: unit_token.to_string() })?
  };
  Ok(unit.to_mb(magnitude))
}
