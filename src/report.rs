//! Non-interactive rendering of a sorted view for `mvlog list`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write;

use crate::presenter::{Attention, SortState, SortedView, attention, flags};
use crate::record::VideoRecord;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportRow<'a> {
  #[serde(flatten)]
  record: &'a VideoRecord,
  out_of_range: bool,
}

pub fn to_json(view: &SortedView) -> Result<String> {
  let flagged = flags(view.rows.iter().copied());
  let rows: Vec<ReportRow> =
    view.rows.iter().copied().zip(flagged).map(|(record, out_of_range)| ReportRow { record, out_of_range }).collect();
  serde_json::to_string_pretty(&rows).context("Failed to encode recordings as JSON")
}

fn marker(attention: Attention) -> &'static str {
  match attention {
    Attention::Normal => "",
    Attention::OutOfRange => "⚠ out of range",
    Attention::Malformed => "?? malformed",
  }
}

/// One line per row, widest video name sets the column width.
pub fn to_text(view: &SortedView, sort: SortState) -> String {
  let name_w = view.rows.iter().map(|r| r.video_name.chars().count()).max().unwrap_or(0).max(10);
  let mut out = String::new();
  let _ = writeln!(out, "# {} recordings sorted by {} {}", view.len(), sort.field.label(), sort.direction.arrow());
  if view.is_empty() {
    return out;
  }
  let _ = writeln!(
    out,
    "{:>3}  {:<name_w$}  {:>12}  {:>10}  {:<20}  {}",
    "#", "Video", "Size", "Duration", "Channel", "Flag"
  );
  for (i, r) in view.rows.iter().enumerate() {
    let channel = format!("{} ({})", r.channel_name, r.channel_code);
    let line = format!(
      "{:>3}  {:<name_w$}  {:>12}  {:>10}  {:<20}  {}",
      i + 1,
      r.video_name,
      r.file_size,
      r.file_duration,
      channel,
      marker(attention(r))
    );
    let _ = writeln!(out, "{}", line.trim_end());
  }
  out
}
