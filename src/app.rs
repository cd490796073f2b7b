use anyhow::Result;
use clap::ValueEnum;
use ratatui::widgets::{ListState, TableState};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::catalog::{Language, channels_for};
use crate::config::Config;
use crate::constants::constants;
use crate::presenter::{DurationBand, SortField, SortState, present};
use crate::record::VideoRecord;
use crate::search::{FormField, SearchForm};
use crate::source::VideoSource;
use crate::theme::{THEMES, Theme, theme_index};

// --- Types ---

pub type QueryResult = Vec<VideoRecord>;

/// Top-level navigation tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tab {
  #[value(name = "past24hrs")]
  Past24Hrs,
  #[value(name = "language")]
  SearchByLanguage,
  #[value(name = "upload")]
  Upload,
  #[value(name = "login")]
  Login,
}

impl Tab {
  pub const ALL: [Tab; 4] = [Tab::Past24Hrs, Tab::SearchByLanguage, Tab::Upload, Tab::Login];

  pub fn label(self) -> &'static str {
    match self {
      Tab::Past24Hrs => "Past 24 Hrs",
      Tab::SearchByLanguage => "Search by Language",
      Tab::Upload => "Upload File",
      Tab::Login => "Login",
    }
  }

  pub fn index(self) -> usize {
    Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
  }

  /// Whether the recordings table is shown on this tab.
  pub fn has_table(self) -> bool {
    matches!(self, Tab::Past24Hrs | Tab::SearchByLanguage)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerField {
  Language,
  Channel,
  Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Form(FormField),
  Picker(PickerField),
  Table,
}

impl Focus {
  fn ring(tab: Tab) -> Vec<Focus> {
    match tab {
      Tab::Past24Hrs => FormField::ALL.iter().map(|f| Focus::Form(*f)).chain([Focus::Table]).collect(),
      Tab::SearchByLanguage => vec![
        Focus::Picker(PickerField::Language),
        Focus::Picker(PickerField::Channel),
        Focus::Picker(PickerField::Submit),
        Focus::Table,
      ],
      Tab::Upload | Tab::Login => vec![Focus::Table],
    }
  }

  pub fn is_text(self) -> bool {
    matches!(self, Focus::Form(f) if f.is_text())
  }
}

/// Language and channel selection of the "Search by Language" tab.
#[derive(Debug, Default)]
pub struct LanguagePicker {
  pub language: Option<Language>,
  pub channel_state: ListState,
}

impl LanguagePicker {
  pub fn channels(&self) -> &'static [String] {
    self.language.map(channels_for).unwrap_or_default()
  }

  pub fn selected_channel(&self) -> Option<&'static str> {
    self.channel_state.selected().and_then(|i| self.channels().get(i)).map(String::as_str)
  }

  /// Cycle the language; a new language clears the channel selection.
  pub fn step_language(&mut self, forward: bool) {
    let n = Language::ALL.len();
    let next = match self.language.and_then(|l| Language::ALL.iter().position(|x| *x == l)) {
      None if forward => 0,
      None => n - 1,
      Some(i) if forward => (i + 1) % n,
      Some(i) => (i + n - 1) % n,
    };
    self.language = Some(Language::ALL[next]);
    self.channel_state.select(None);
  }

  pub fn step_channel(&mut self, forward: bool) {
    let count = self.channels().len();
    if count == 0 {
      return;
    }
    let i = match self.channel_state.selected() {
      None => 0,
      Some(i) if forward => (i + 1) % count,
      Some(i) => (i + count - 1) % count,
    };
    self.channel_state.select(Some(i));
  }
}

/// Short-lived notification shown in the status line.
#[derive(Debug, Clone)]
pub struct Toast {
  pub title: String,
  pub body: String,
  shown_at: Instant,
}

impl Toast {
  pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
    Self { title: title.into(), body: body.into(), shown_at: Instant::now() }
  }

  fn expired(&self) -> bool {
    self.shown_at.elapsed() >= Duration::from_secs(constants().toast_secs)
  }
}

// --- App State ---

pub struct App {
  pub tab: Tab,
  pub focus: Focus,
  pub form: SearchForm,
  pub picker: LanguagePicker,
  pub theme_index: usize,
  pub sort: SortState,
  pub band: DurationBand,
  /// Records as last supplied by the source, never reordered in place.
  pub records: Vec<VideoRecord>,
  /// `records` in display order for the current sort.
  pub visible: Vec<VideoRecord>,
  pub table_state: TableState,
  pub source: VideoSource,
  pub toast: Option<Toast>,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub should_quit: bool,
  /// Where preferences are saved; `None` keeps them in memory only.
  prefs_path: Option<PathBuf>,
  search_rx: Option<oneshot::Receiver<Result<QueryResult>>>,
  error_time: Option<Instant>,
}

impl App {
  pub fn new(
    source: VideoSource,
    records: Vec<VideoRecord>,
    tab: Tab,
    config: &Config,
    prefs_path: Option<PathBuf>,
  ) -> Self {
    let mut app = Self {
      tab,
      focus: Focus::ring(tab)[0],
      form: SearchForm::default(),
      picker: LanguagePicker::default(),
      theme_index: theme_index(config.theme_name.as_deref()),
      sort: config.sort_state(),
      band: DurationBand::default(),
      records,
      visible: Vec::new(),
      table_state: TableState::default(),
      source,
      toast: None,
      last_error: None,
      status_message: None,
      should_quit: false,
      prefs_path,
      search_rx: None,
      error_time: None,
    };
    app.refresh_view();
    app
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and by theme_index() on initialization.
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  fn save_config(&self) {
    let Some(ref path) = self.prefs_path else { return };
    let config = Config {
      theme_name: Some(self.theme().name.to_string()),
      sort_field: Some(self.sort.field),
      sort_direction: Some(self.sort.direction),
    };
    config.save_to(path);
  }

  // --- Messages ---

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  pub fn notify(&mut self, title: &str, body: String) {
    info!(title, body = %body, "toast");
    self.toast = Some(Toast::new(title, body));
  }

  /// Drop errors and toasts that have been on screen long enough.
  pub fn expire_messages(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_secs)
    {
      self.clear_error();
    }
    if self.toast.as_ref().is_some_and(Toast::expired) {
      self.toast = None;
    }
  }

  // --- Navigation ---

  pub fn select_tab(&mut self, tab: Tab) {
    if self.tab == tab {
      return;
    }
    self.tab = tab;
    self.focus = Focus::ring(tab)[0];
    self.clear_error();
  }

  pub fn next_tab(&mut self) {
    let i = (self.tab.index() + 1) % Tab::ALL.len();
    self.select_tab(Tab::ALL[i]);
  }

  pub fn cycle_focus(&mut self, forward: bool) {
    let ring = Focus::ring(self.tab);
    let n = ring.len();
    let i = ring.iter().position(|f| *f == self.focus).unwrap_or(0);
    self.focus = if forward { ring[(i + 1) % n] } else { ring[(i + n - 1) % n] };
  }

  // --- Table ---

  /// Re-derive `visible` from `records` and the current sort.
  pub fn refresh_view(&mut self) {
    let presentation = present(&self.records, self.sort, self.band);
    for defect in &presentation.defects {
      warn!(id = defect.id, field = defect.field.key(), err = %defect.error, "presenter: record excluded from ordering");
    }
    self.visible = presentation.rows.iter().map(|row| row.record.clone()).collect();

    if self.visible.is_empty() {
      self.table_state.select(None);
    } else {
      let sel = self.table_state.selected().unwrap_or(0).min(self.visible.len() - 1);
      self.table_state.select(Some(sel));
    }
  }

  pub fn request_sort(&mut self, field: SortField) {
    self.sort = self.sort.request(field);
    self.refresh_view();
    self.notify(
      "Sorting applied",
      format!("Videos sorted by {} in {}ending order", field.label(), self.sort.direction.short()),
    );
    self.save_config();
  }

  pub fn move_selection(&mut self, forward: bool) {
    let count = self.visible.len();
    if count == 0 {
      return;
    }
    let i = match self.table_state.selected() {
      None => 0,
      Some(i) if forward => (i + 1) % count,
      Some(i) => if i == 0 { count - 1 } else { i - 1 },
    };
    self.table_state.select(Some(i));
  }

  pub fn select_first(&mut self) {
    if !self.visible.is_empty() {
      self.table_state.select(Some(0));
    }
  }

  pub fn select_last(&mut self) {
    if !self.visible.is_empty() {
      self.table_state.select(Some(self.visible.len() - 1));
    }
  }

  pub fn flagged_count(&self) -> usize {
    self.visible.iter().filter(|r| crate::presenter::flag_out_of_range_in(r, self.band)).count()
  }

  // --- Search ---

  pub fn trigger_search(&mut self) {
    let query = match self.form.to_query() {
      Ok(q) => q,
      Err(e) => {
        self.set_error(e.to_string());
        return;
      }
    };
    info!(query = ?query, "search triggered");
    self.clear_error();
    self.notify("Search initiated", query.describe());
    self.status_message = Some("Searching…".to_string());

    let source = self.source.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(source.fetch(&query).await);
    });
    // Replacing the receiver drops any older in-flight result.
    self.search_rx = Some(rx);
  }

  pub fn search_pending(&self) -> bool {
    self.search_rx.is_some()
  }

  pub fn check_pending(&mut self) {
    let Some(mut rx) = self.search_rx.take() else { return };
    match rx.try_recv() {
      Ok(result) => {
        self.status_message = None;
        match result {
          Ok(records) => {
            if records.is_empty() {
              self.set_error("No recordings match these filters.".to_string());
            }
            self.records = records;
            self.table_state.select(None);
            self.refresh_view();
          }
          Err(e) => {
            self.set_error(format!("Search failed: {:#}", e));
          }
        }
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.search_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        self.status_message = None;
        self.set_error("Search task failed.".to_string());
      }
    }
  }

  // --- Language picker ---

  pub fn select_channel(&mut self) {
    let Some(language) = self.picker.language else {
      self.set_error("Select a language first.".to_string());
      return;
    };
    let Some(channel) = self.picker.selected_channel() else {
      self.set_error("Choose a channel.".to_string());
      return;
    };
    info!(language = language.code(), channel, "picker: channel selected");
    self.clear_error();
    self.notify("Channel Selected", format!("Showing past 24 hrs videos for {}", channel));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::presenter::SortDirection;
  use crate::record::tests::make_record;

  fn app_with(records: Vec<VideoRecord>) -> App {
    App::new(VideoSource::Embedded, records, Tab::Past24Hrs, &Config::default(), None)
  }

  fn visible_ids(app: &App) -> Vec<u64> {
    app.visible.iter().map(|r| r.id).collect()
  }

  #[test]
  fn initial_view_is_sorted_without_touching_records() {
    let records =
      vec![make_record(1, "01:00:00", "1 MB"), make_record(2, "00:04:21", "1 MB"), make_record(3, "00:16:31", "1 MB")];
    let app = app_with(records.clone());
    assert_eq!(visible_ids(&app), vec![2, 3, 1]);
    assert_eq!(app.records, records);
    assert_eq!(app.table_state.selected(), Some(0));
    assert_eq!(app.flagged_count(), 2);
  }

  #[test]
  fn repeated_sort_request_toggles_direction() {
    let records = vec![make_record(1, "00:10:00", "3 MB"), make_record(2, "00:20:00", "1 MB")];
    let mut app = app_with(records);
    app.request_sort(SortField::Duration);
    assert_eq!(app.sort.direction, SortDirection::Descending);
    assert_eq!(visible_ids(&app), vec![2, 1]);
    app.request_sort(SortField::FileSize);
    assert_eq!(app.sort, SortState { field: SortField::FileSize, direction: SortDirection::Ascending });
    assert_eq!(visible_ids(&app), vec![2, 1]);
    assert!(app.toast.as_ref().is_some_and(|t| t.body == "Videos sorted by File Size in ascending order"));
  }

  #[test]
  fn empty_records_clear_selection() {
    let app = app_with(Vec::new());
    assert!(app.visible.is_empty());
    assert_eq!(app.table_state.selected(), None);
  }

  #[test]
  fn selection_wraps() {
    let mut app = app_with(vec![make_record(1, "01:00:00", "1 MB"), make_record(2, "01:00:00", "1 MB")]);
    app.move_selection(false);
    assert_eq!(app.table_state.selected(), Some(1));
    app.move_selection(true);
    assert_eq!(app.table_state.selected(), Some(0));
  }

  #[test]
  fn focus_ring_per_tab() {
    let mut app = app_with(Vec::new());
    assert_eq!(app.focus, Focus::Form(FormField::FromDate));
    app.cycle_focus(false);
    assert_eq!(app.focus, Focus::Table);
    app.cycle_focus(true);
    assert_eq!(app.focus, Focus::Form(FormField::FromDate));

    app.select_tab(Tab::SearchByLanguage);
    assert_eq!(app.focus, Focus::Picker(PickerField::Language));
    app.select_tab(Tab::Login);
    assert_eq!(app.focus, Focus::Table);
    app.next_tab();
    assert_eq!(app.tab, Tab::Past24Hrs);
  }

  #[test]
  fn picker_language_change_clears_channel() {
    let mut picker = LanguagePicker::default();
    assert!(picker.channels().is_empty());
    picker.step_channel(true);
    assert_eq!(picker.selected_channel(), None);

    picker.step_language(true);
    assert_eq!(picker.language, Some(Language::English));
    picker.step_channel(true);
    assert_eq!(picker.selected_channel(), Some("NDTV 24x7"));
    picker.step_language(true);
    assert_eq!(picker.language, Some(Language::Hindi));
    assert_eq!(picker.selected_channel(), None);
  }

  #[test]
  fn picker_language_wraps_backwards() {
    let mut picker = LanguagePicker::default();
    picker.step_language(false);
    assert_eq!(picker.language, Some(Language::Telugu));
    picker.step_language(true);
    assert_eq!(picker.language, Some(Language::English));
  }

  #[test]
  fn channel_select_requires_language_and_channel() {
    let mut app = app_with(Vec::new());
    app.select_channel();
    assert!(app.last_error.is_some());
    app.picker.step_language(true);
    app.select_channel();
    assert_eq!(app.last_error.as_deref(), Some("Choose a channel."));
    app.picker.step_channel(true);
    app.select_channel();
    assert!(app.last_error.is_none());
    assert!(app.toast.as_ref().is_some_and(|t| t.body == "Showing past 24 hrs videos for NDTV 24x7"));
  }

  #[test]
  fn invalid_form_reports_error_without_searching() {
    let mut app = app_with(Vec::new());
    app.form.from_date.set("not a date");
    app.trigger_search();
    assert!(app.last_error.as_deref().is_some_and(|e| e.contains("from")));
    assert!(!app.search_pending());
  }

  #[test]
  fn theme_and_sort_are_saved_to_prefs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.toml");
    let mut app = App::new(VideoSource::Embedded, Vec::new(), Tab::Past24Hrs, &Config::default(), Some(path.clone()));
    app.next_theme();
    app.request_sort(SortField::FileSize);
    let saved = Config::load_from(&path);
    assert_eq!(saved.theme_name.as_deref(), Some(THEMES[1].name));
    assert_eq!(saved.sort_state(), SortState { field: SortField::FileSize, direction: SortDirection::Ascending });
  }

  #[test]
  fn config_sort_is_applied() {
    let config = Config { sort_field: Some(SortField::FileSize), ..Config::default() };
    let app = App::new(VideoSource::Embedded, Vec::new(), Tab::Upload, &config, None);
    assert_eq!(app.sort.field, SortField::FileSize);
    assert_eq!(app.tab, Tab::Upload);
  }

  #[tokio::test]
  async fn search_replaces_records() {
    let mut app = app_with(Vec::new());
    app.form.next_channel();
    app.trigger_search();
    assert!(app.search_pending());
    assert!(app.toast.as_ref().is_some_and(|t| t.title == "Search initiated"));

    for _ in 0..100 {
      app.check_pending();
      if !app.search_pending() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!app.search_pending());
    assert_eq!(visible_ids(&app), vec![1]);
    assert!(app.status_message.is_none());
  }
}
