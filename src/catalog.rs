//! Static dashboard data loaded from `catalog.ron` at compile time.
//!
//! Channel lists per language, the channel options of the search form, and
//! the recordings shown before any search. Parsed once via `LazyLock` and
//! never mutated afterwards.

use serde::Deserialize;
use std::sync::LazyLock;

use crate::record::VideoRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Language {
  English,
  Hindi,
  Tamil,
  Bengali,
  Kannada,
  Gujarati,
  Malayalam,
  Marathi,
  Telugu,
}

impl Language {
  pub const ALL: [Language; 9] = [
    Language::English,
    Language::Hindi,
    Language::Tamil,
    Language::Bengali,
    Language::Kannada,
    Language::Gujarati,
    Language::Malayalam,
    Language::Marathi,
    Language::Telugu,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Language::English => "English",
      Language::Hindi => "Hindi",
      Language::Tamil => "Tamil",
      Language::Bengali => "Bengali",
      Language::Kannada => "Kannada",
      Language::Gujarati => "Gujarati",
      Language::Malayalam => "Malayalam",
      Language::Marathi => "Marathi",
      Language::Telugu => "Telugu",
    }
  }

  pub fn code(self) -> &'static str {
    match self {
      Language::English => "english",
      Language::Hindi => "hindi",
      Language::Tamil => "tamil",
      Language::Bengali => "bengali",
      Language::Kannada => "kannada",
      Language::Gujarati => "gujarati",
      Language::Malayalam => "malayalam",
      Language::Marathi => "marathi",
      Language::Telugu => "telugu",
    }
  }
}

/// A channel option of the search form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchChannel {
  pub code: String,
  pub name: String,
}

impl SearchChannel {
  pub fn label(&self) -> String {
    format!("{} ({})", self.name, self.code)
  }
}

#[derive(Debug, Deserialize)]
struct LanguageChannels {
  language: Language,
  channels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Catalog {
  languages: Vec<LanguageChannels>,
  search_channels: Vec<SearchChannel>,
  recordings: Vec<VideoRecord>,
}

static CATALOG: LazyLock<Catalog> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; the catalog tests parse it.
  ron::from_str(include_str!("../catalog.ron")).expect("catalog.ron must be valid RON (embedded at compile time)")
});

/// Channels broadcasting in `language`, in display order.
pub fn channels_for(language: Language) -> &'static [String] {
  CATALOG.languages.iter().find(|l| l.language == language).map(|l| l.channels.as_slice()).unwrap_or_default()
}

pub fn search_channels() -> &'static [SearchChannel] {
  &CATALOG.search_channels
}

/// The bundled recordings, cloned so callers can own and reorder them.
pub fn sample_recordings() -> Vec<VideoRecord> {
  CATALOG.recordings.clone()
}
