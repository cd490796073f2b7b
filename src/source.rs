use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::catalog::sample_recordings;
use crate::record::VideoRecord;
use crate::search::SearchQuery;

/// Where recordings come from. Every query gets a fresh, complete list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
  /// The recordings bundled in `catalog.ron`.
  Embedded,
  /// A JSON array of records, re-read on every query.
  File(PathBuf),
}

impl VideoSource {
  pub fn from_arg(path: Option<PathBuf>) -> Self {
    path.map_or(VideoSource::Embedded, VideoSource::File)
  }

  pub fn describe(&self) -> String {
    match self {
      VideoSource::Embedded => "bundled sample".to_string(),
      VideoSource::File(path) => path.display().to_string(),
    }
  }

  pub async fn load_all(&self) -> Result<Vec<VideoRecord>> {
    let records = match self {
      VideoSource::Embedded => sample_recordings(),
      VideoSource::File(path) => {
        let content =
          tokio::fs::read_to_string(path).await.with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str::<Vec<VideoRecord>>(&content)
          .with_context(|| format!("{} is not a JSON array of recordings", path.display()))?
      }
    };
    warn_duplicate_ids(&records);
    Ok(records)
  }

  /// Load and keep the records matching `query`.
  pub async fn fetch(&self, query: &SearchQuery) -> Result<Vec<VideoRecord>> {
    let all = self.load_all().await?;
    let total = all.len();
    let matched: Vec<VideoRecord> = all.into_iter().filter(|r| query.matches(r)).collect();
    info!(source = %self.describe(), total, matched = matched.len(), "source: query served");
    Ok(matched)
  }
}

fn warn_duplicate_ids(records: &[VideoRecord]) {
  let mut seen = HashSet::with_capacity(records.len());
  for record in records {
    if !seen.insert(record.id) {
      warn!(id = record.id, name = %record.video_name, "source: duplicate record id");
    }
  }
}
