use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::presenter::{SortDirection, SortField, SortState};

/// User preferences persisted between runs in `prefs.toml`.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq, Eq)]
pub struct Config {
  pub theme_name: Option<String>,
  pub sort_field: Option<SortField>,
  pub sort_direction: Option<SortDirection>,
}

pub fn prefs_path() -> Option<PathBuf> {
  ProjectDirs::from("", "", "mvlog").map(|dirs| dirs.config_dir().join("prefs.toml"))
}

impl Config {
  pub fn load() -> Self {
    prefs_path().map(|p| Self::load_from(&p)).unwrap_or_default()
  }

  /// Missing or unreadable files yield the defaults.
  pub fn load_from(path: &Path) -> Self {
    if let Ok(content) = std::fs::read_to_string(path) {
      match toml::from_str(&content) {
        Ok(config) => return config,
        Err(e) => warn!(path = %path.display(), err = %e, "config: ignoring malformed prefs"),
      }
    }
    Self::default()
  }

  pub fn save_to(&self, path: &Path) {
    if let Some(dir) = path.parent()
      && std::fs::create_dir_all(dir).is_err()
    {
      return;
    }
    if let Ok(content) = toml::to_string(self)
      && let Err(e) = std::fs::write(path, content)
    {
      warn!(path = %path.display(), err = %e, "config: failed to save prefs");
    }
  }

  /// Remembered sort, or the default (duration, ascending).
  pub fn sort_state(&self) -> SortState {
    let default = SortState::default();
    SortState {
      field: self.sort_field.unwrap_or(default.field),
      direction: self.sort_direction.unwrap_or(default.direction),
    }
  }
}
