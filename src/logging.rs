use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::constants::constants;

fn env_filter() -> EnvFilter {
  let c = constants();
  EnvFilter::try_from_env(&c.log_env_var).unwrap_or_else(|_| EnvFilter::new(&c.default_log_filter))
}

pub fn log_dir() -> Option<PathBuf> {
  ProjectDirs::from("", "", "mvlog").map(|dirs| dirs.data_local_dir().join("logs"))
}

/// Log to a daily rolling file; the terminal belongs to the TUI.
///
/// Keep the returned guard alive until exit so buffered lines get flushed.
pub fn init_file() -> Result<Option<WorkerGuard>> {
  let Some(dir) = log_dir() else { return Ok(None) };
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log dir {}", dir.display()))?;

  let appender = tracing_appender::rolling::daily(&dir, &constants().log_file_prefix);
  let (writer, guard) = tracing_appender::non_blocking(appender);
  // try_init: a subscriber may already be installed (tests).
  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter())
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true)
    .try_init();
  Ok(Some(guard))
}

/// Log to stderr, for the non-interactive subcommands.
pub fn init_stderr() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter())
    .with_writer(std::io::stderr)
    .compact()
    .with_target(true)
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn log_dir_is_under_project_data() {
    if let Some(dir) = log_dir() {
      assert!(dir.ends_with("logs"));
    }
  }

  #[test]
  fn stderr_init_is_idempotent() {
    init_stderr();
    init_stderr();
    tracing::info!("logging: initialized twice");
  }
}
