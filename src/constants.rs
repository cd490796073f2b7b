//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

use crate::record::SizeUnit;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Expected recording length band (inclusive)
  pub expected_min_secs: u64,
  pub expected_max_secs: u64,

  pub implicit_size_unit: SizeUnit,

  // Notifications
  pub toast_secs: u64,
  pub error_secs: u64,

  // Logging
  pub log_file_prefix: String,
  pub log_env_var: String,
  pub default_log_filter: String,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed the first test run catches it.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
