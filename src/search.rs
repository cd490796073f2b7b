use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;
use tracing::debug;

use crate::catalog::{SearchChannel, search_channels};
use crate::input::TextField;
use crate::record::VideoRecord;

/// Accepted date-time spellings: the form placeholder, `datetime-local`, and ISO-ish.
const DATETIME_FORMATS: [&str; 4] = ["%d/%m/%Y %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Timestamp format embedded in recording file names.
const CAPTURE_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
  #[error("Unrecognised {field} date '{input}' (use DD/MM/YYYY HH:MM)")]
  InvalidDate { field: &'static str, input: String },
  #[error("To date {} is before from date {}", .to.format(DISPLAY_FORMAT), .from.format(DISPLAY_FORMAT))]
  InvertedRange { from: NaiveDateTime, to: NaiveDateTime },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
  Start,
  End,
}

/// Parse a form date. A bare date means the start of the day for `Start`
/// and its last second for `End`.
pub fn parse_bound(input: &str, bound: Bound) -> Option<NaiveDateTime> {
  let input = input.trim();
  if let Some(dt) = DATETIME_FORMATS.iter().find_map(|f| NaiveDateTime::parse_from_str(input, f).ok()) {
    return Some(dt);
  }
  let date = DATE_FORMATS.iter().find_map(|f| NaiveDate::parse_from_str(input, f).ok())?;
  let time = match bound {
    Bound::Start => NaiveTime::MIN,
    Bound::End => NaiveTime::from_hms_opt(23, 59, 59)?,
  };
  Some(date.and_time(time))
}

/// Capture time embedded in a name like `1010485_2025-07-01_12:00:00.Mp4`.
pub fn capture_time(video_name: &str) -> Option<NaiveDateTime> {
  let (_, rest) = video_name.split_once('_')?;
  let stem = rest.rsplit_once('.').map_or(rest, |(stem, _)| stem);
  NaiveDateTime::parse_from_str(stem, CAPTURE_FORMAT).ok()
}

// --- Query ---

/// Validated search parameters handed to the data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
  pub from: Option<NaiveDateTime>,
  pub to: Option<NaiveDateTime>,
  pub channel: Option<SearchChannel>,
}

impl SearchQuery {
  pub fn new(from: &str, to: &str, channel: Option<SearchChannel>) -> Result<Self, SearchError> {
    let parse = |input: &str, bound, field| -> Result<Option<NaiveDateTime>, SearchError> {
      if input.trim().is_empty() {
        return Ok(None);
      }
      parse_bound(input, bound).map(Some).ok_or_else(|| SearchError::InvalidDate { field, input: input.to_string() })
    };
    let from = parse(from, Bound::Start, "from")?;
    let to = parse(to, Bound::End, "to")?;
    if let (Some(from), Some(to)) = (from, to)
      && to < from
    {
      return Err(SearchError::InvertedRange { from, to });
    }
    Ok(Self { from, to, channel })
  }

  pub fn is_unbounded(&self) -> bool {
    self.from.is_none() && self.to.is_none()
  }

  pub fn matches(&self, record: &VideoRecord) -> bool {
    if let Some(ref channel) = self.channel
      && record.channel_code != channel.code
    {
      return false;
    }
    if self.is_unbounded() {
      return true;
    }
    let Some(captured) = capture_time(&record.video_name) else {
      debug!(id = record.id, name = %record.video_name, "search: no capture time in video name, skipping");
      return false;
    };
    self.from.is_none_or(|from| captured >= from) && self.to.is_none_or(|to| captured <= to)
  }

  /// Toast text for a started search.
  pub fn describe(&self) -> String {
    let fmt = |dt: Option<NaiveDateTime>| dt.map_or_else(|| "any time".to_string(), |d| d.format(DISPLAY_FORMAT).to_string());
    let channel = self.channel.as_ref().map_or("All", |c| c.name.as_str());
    format!("Searching videos from {} to {} for channel {}", fmt(self.from), fmt(self.to), channel)
  }
}

// --- Form ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
  FromDate,
  ToDate,
  Channel,
  Submit,
}

impl FormField {
  pub const ALL: [FormField; 4] = [FormField::FromDate, FormField::ToDate, FormField::Channel, FormField::Submit];

  pub fn label(self) -> &'static str {
    match self {
      FormField::FromDate => "From Date",
      FormField::ToDate => "To Date",
      FormField::Channel => "Channel Name",
      FormField::Submit => "Search",
    }
  }

  pub fn is_text(self) -> bool {
    matches!(self, FormField::FromDate | FormField::ToDate)
  }
}

/// Input state of the "Past 24 Hrs" filter form.
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
  pub from_date: TextField,
  pub to_date: TextField,
  /// 0 is "All Channels", `n` is `search_channels()[n - 1]`.
  pub channel_index: usize,
}

impl SearchForm {
  pub fn channel(&self) -> Option<&'static SearchChannel> {
    self.channel_index.checked_sub(1).and_then(|i| search_channels().get(i))
  }

  pub fn channel_label(&self) -> String {
    self.channel().map_or_else(|| "All Channels".to_string(), SearchChannel::label)
  }

  /// Number of channel options including "All Channels".
  fn channel_options() -> usize {
    search_channels().len() + 1
  }

  pub fn next_channel(&mut self) {
    self.channel_index = (self.channel_index + 1) % Self::channel_options();
  }

  pub fn prev_channel(&mut self) {
    let n = Self::channel_options();
    self.channel_index = (self.channel_index + n - 1) % n;
  }

  pub fn to_query(&self) -> Result<SearchQuery, SearchError> {
    SearchQuery::new(&self.from_date.value, &self.to_date.value, self.channel().cloned())
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::tests::make_record;

  fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
  }

  // --- parse_bound ---

  #[test]
  fn parses_placeholder_format() {
    assert_eq!(parse_bound("01/07/2025 11:00", Bound::Start), Some(dt("2025-07-01 11:00:00")));
  }

  #[test]
  fn parses_datetime_local_format() {
    assert_eq!(parse_bound("2025-07-01T12:15", Bound::End), Some(dt("2025-07-01 12:15:00")));
    assert_eq!(parse_bound(" 2025-07-01 12:15 ", Bound::Start), Some(dt("2025-07-01 12:15:00")));
  }

  #[test]
  fn bare_date_spans_the_day() {
    assert_eq!(parse_bound("2025-07-01", Bound::Start), Some(dt("2025-07-01 00:00:00")));
    assert_eq!(parse_bound("01/07/2025", Bound::End), Some(dt("2025-07-01 23:59:59")));
  }

  #[test]
  fn rejects_garbage_dates() {
    assert_eq!(parse_bound("yesterday", Bound::Start), None);
    assert_eq!(parse_bound("32/07/2025 11:00", Bound::Start), None);
  }

  // --- capture_time ---

  #[test]
  fn capture_time_from_video_name() {
    assert_eq!(capture_time("1010485_2025-07-01_12:00:00.Mp4"), Some(dt("2025-07-01 12:00:00")));
    assert_eq!(capture_time("1010485_2025-07-01_12:00:00"), Some(dt("2025-07-01 12:00:00")));
    assert_eq!(capture_time("recording.mp4"), None);
    assert_eq!(capture_time("1010485_not-a-date.Mp4"), None);
  }

  // --- SearchQuery ---

  #[test]
  fn empty_inputs_are_unbounded() {
    let q = SearchQuery::new("", "  ", None).unwrap();
    assert!(q.is_unbounded());
    assert!(q.matches(&make_record(1, "01:00:00", "1 MB")));
  }

  #[test]
  fn inverted_range_is_rejected() {
    let err = SearchQuery::new("2025-07-02", "2025-07-01", None).unwrap_err();
    assert!(matches!(err, SearchError::InvertedRange { .. }));
  }

  #[test]
  fn invalid_date_names_the_field() {
    let err = SearchQuery::new("2025-07-01", "soon", None).unwrap_err();
    assert_eq!(err, SearchError::InvalidDate { field: "to", input: "soon".to_string() });
  }

  #[test]
  fn filters_by_capture_window() {
    let record = make_record(1, "01:00:00", "1 MB"); // captured 2025-07-01 12:00:00
    let inside = SearchQuery::new("01/07/2025 11:00", "01/07/2025 12:15", None).unwrap();
    assert!(inside.matches(&record));
    let before = SearchQuery::new("01/07/2025 12:01", "", None).unwrap();
    assert!(!before.matches(&record));
    let after = SearchQuery::new("", "01/07/2025 11:59", None).unwrap();
    assert!(!after.matches(&record));
  }

  #[test]
  fn filters_by_channel() {
    let record = make_record(1, "01:00:00", "1 MB");
    let same = SearchChannel { code: record.channel_code.clone(), name: "Channel 1".to_string() };
    let other = SearchChannel { code: "999".to_string(), name: "Other".to_string() };
    assert!(SearchQuery::new("", "", Some(same)).unwrap().matches(&record));
    assert!(!SearchQuery::new("", "", Some(other)).unwrap().matches(&record));
  }

  #[test]
  fn bounded_query_skips_names_without_timestamp() {
    let mut record = make_record(1, "01:00:00", "1 MB");
    record.video_name = "upload.mp4".to_string();
    let q = SearchQuery::new("2025-01-01", "", None).unwrap();
    assert!(!q.matches(&record));
  }

  #[test]
  fn describe_mentions_range_and_channel() {
    let q = SearchQuery::new("01/07/2025 11:00", "", None).unwrap();
    assert_eq!(q.describe(), "Searching videos from 01/07/2025 11:00 to any time for channel All");
    let channel = SearchChannel { code: "1".to_string(), name: "Channel 1".to_string() };
    let q = SearchQuery::new("", "", Some(channel)).unwrap();
    assert!(q.describe().ends_with("for channel Channel 1"));
  }

  // --- SearchForm ---

  #[test]
  fn channel_select_wraps() {
    let mut form = SearchForm::default();
    assert_eq!(form.channel_label(), "All Channels");
    form.prev_channel();
    assert_eq!(form.channel_index, search_channels().len());
    form.next_channel();
    assert_eq!(form.channel_index, 0);
    form.next_channel();
    assert_eq!(form.channel().map(|c| c.code.as_str()), Some("1010485"));
  }

  #[test]
  fn form_builds_query() {
    let mut form = SearchForm::default();
    form.from_date.set("01/07/2025 11:00");
    form.next_channel();
    let q = form.to_query().unwrap();
    assert_eq!(q.from, Some(dt("2025-07-01 11:00:00")));
    assert_eq!(q.to, None);
    assert_eq!(q.channel.map(|c| c.name), Some("Channel 1".to_string()));
  }
}
