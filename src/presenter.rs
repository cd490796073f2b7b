//! Ordering and highlighting of the recordings table.
//!
//! Everything here is pure: records are borrowed, never mutated, and the
//! caller decides what to do with reported defects (the app logs them).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::constants::constants;
use crate::record::{RecordError, VideoRecord};

// --- Sort keys ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
  #[value(alias = "fileDuration")]
  Duration,
  #[value(name = "size", alias = "fileSize")]
  FileSize,
}

impl SortField {
  #[cfg(test)]
  pub const ALL: [SortField; 2] = [SortField::Duration, SortField::FileSize];

  pub fn label(self) -> &'static str {
    match self {
      SortField::Duration => "File Duration",
      SortField::FileSize => "File Size",
    }
  }

  /// Column key as used by the web dashboard.
  pub fn key(self) -> &'static str {
    match self {
      SortField::Duration => "fileDuration",
      SortField::FileSize => "fileSize",
    }
  }

  /// Map a column key to a sortable field. Unknown keys have no comparator.
  pub fn from_key(key: &str) -> Option<Self> {
    match key.trim().to_lowercase().as_str() {
      "fileduration" | "duration" => Some(SortField::Duration),
      "filesize" | "size" => Some(SortField::FileSize),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  Ascending,
  Descending,
}

impl SortDirection {
  pub fn short(self) -> &'static str {
    match self {
      SortDirection::Ascending => "asc",
      SortDirection::Descending => "desc",
    }
  }

  pub fn arrow(self) -> &'static str {
    match self {
      SortDirection::Ascending => "▲",
      SortDirection::Descending => "▼",
    }
  }
}

/// Last applied sort, owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
  pub field: SortField,
  pub direction: SortDirection,
}

impl Default for SortState {
  fn default() -> Self {
    Self { field: SortField::Duration, direction: SortDirection::Ascending }
  }
}

impl SortState {
  /// State after the user asks to sort by `field`: a repeated request on an
  /// ascending column flips it to descending, anything else starts ascending.
  pub fn request(self, field: SortField) -> Self {
    let direction = if self.field == field && self.direction == SortDirection::Ascending {
      SortDirection::Descending
    } else {
      SortDirection::Ascending
    };
    Self { field, direction }
  }
}

// --- Expected duration band ---

/// Inclusive range of durations considered normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBand {
  pub min_secs: u64,
  pub max_secs: u64,
}

impl Default for DurationBand {
  fn default() -> Self {
    let c = constants();
    Self { min_secs: c.expected_min_secs, max_secs: c.expected_max_secs }
  }
}

impl DurationBand {
  pub fn contains(&self, secs: u64) -> bool {
    (self.min_secs..=self.max_secs).contains(&secs)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attention {
  Normal,
  OutOfRange,
  /// Duration could not be parsed.
  Malformed,
}

impl Attention {
  pub fn needs_attention(self) -> bool {
    self != Attention::Normal
  }
}

pub fn attention_in(record: &VideoRecord, band: DurationBand) -> Attention {
  match record.duration_secs() {
    Ok(secs) if band.contains(secs) => Attention::Normal,
    Ok(_) => Attention::OutOfRange,
    Err(_) => Attention::Malformed,
  }
}

pub fn attention(record: &VideoRecord) -> Attention {
  attention_in(record, DurationBand::default())
}

/// Whether the row should be highlighted: duration outside the expected band,
/// or a duration that doesn't parse at all.
pub fn flag_out_of_range(record: &VideoRecord) -> bool {
  attention(record).needs_attention()
}

pub fn flag_out_of_range_in(record: &VideoRecord, band: DurationBand) -> bool {
  attention_in(record, band).needs_attention()
}

pub fn flags<'a>(records: impl IntoIterator<Item = &'a VideoRecord>) -> Vec<bool> {
  records.into_iter().map(flag_out_of_range).collect()
}

// --- Sorting ---

/// A record that was left out of the comparison because its value didn't parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefect {
  pub id: u64,
  pub field: SortField,
  pub error: RecordError,
}

/// Records in display order plus anything that couldn't be compared.
#[derive(Debug, Clone, Default)]
pub struct SortedView<'a> {
  pub rows: Vec<&'a VideoRecord>,
  pub defects: Vec<RecordDefect>,
}

impl SortedView<'_> {
  #[cfg(test)]
  pub fn ids(&self) -> Vec<u64> {
    self.rows.iter().map(|r| r.id).collect()
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }
}

/// Stable sort by `field`. Equal values keep their input order in both
/// directions. Records whose value doesn't parse go last, in input order,
/// and are listed in `defects`.
pub fn sort(records: &[VideoRecord], field: SortField, direction: SortDirection) -> SortedView<'_> {
  match field {
    SortField::Duration => sort_with(records, field, direction, |r| Ok(r.duration_secs()?), u64::cmp),
    SortField::FileSize => sort_with(records, field, direction, |r| Ok(r.size_mb()?), f64::total_cmp),
  }
}

fn sort_with<'a, K>(
  records: &'a [VideoRecord],
  field: SortField,
  direction: SortDirection,
  value: impl Fn(&VideoRecord) -> Result<K, RecordError>,
  compare: impl Fn(&K, &K) -> Ordering,
) -> SortedView<'a> {
  let mut keyed = Vec::with_capacity(records.len());
  let mut malformed = Vec::new();
  let mut defects = Vec::new();

  for record in records {
    match value(record) {
      Ok(key) => keyed.push((key, record)),
      Err(error) => {
        defects.push(RecordDefect { id: record.id, field, error });
        malformed.push(record);
      }
    }
  }

  // slice::sort_by is stable
  keyed.sort_by(|(a, _), (b, _)| match direction {
    SortDirection::Ascending => compare(a, b),
    SortDirection::Descending => compare(b, a),
  });

  let rows = keyed.into_iter().map(|(_, record)| record).chain(malformed).collect();
  SortedView { rows, defects }
}

/// Sort by a column key. Keys without a comparator leave the order as is.
pub fn sort_by_key<'a>(records: &'a [VideoRecord], key: &str, direction: SortDirection) -> SortedView<'a> {
  match SortField::from_key(key) {
    Some(field) => sort(records, field, direction),
    None => SortedView { rows: records.iter().collect(), defects: Vec::new() },
  }
}

// --- Presentation ---

#[derive(Debug, Clone, Copy)]
pub struct PresentedRow<'a> {
  pub record: &'a VideoRecord,
  pub attention: Attention,
}

/// Sorted rows paired with their attention flag.
#[derive(Debug, Clone, Default)]
pub struct Presentation<'a> {
  pub rows: Vec<PresentedRow<'a>>,
  pub defects: Vec<RecordDefect>,
}

pub fn present(records: &[VideoRecord], state: SortState, band: DurationBand) -> Presentation<'_> {
  let SortedView { rows, defects } = sort(records, state.field, state.direction);
  let rows = rows.into_iter().map(|record| PresentedRow { record, attention: attention_in(record, band) }).collect();
  Presentation { rows, defects }
}
