use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, Focus, PickerField, Tab};
use crate::presenter::SortField;
use crate::search::FormField;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Single-line editable text with a char-indexed cursor.
#[derive(Debug, Clone, Default)]
pub struct TextField {
  pub value: String,
  pub cursor: usize,
  /// Horizontal scroll offset (display columns), maintained by the renderer.
  pub scroll: usize,
}

impl TextField {
  #[cfg(test)]
  pub fn set(&mut self, value: &str) {
    self.value = value.to_string();
    self.cursor = value.chars().count();
    self.scroll = 0;
  }

  pub fn clear(&mut self) {
    self.value.clear();
    self.cursor = 0;
    self.scroll = 0;
  }

  pub fn is_empty(&self) -> bool {
    self.value.is_empty()
  }

  /// Apply an editing key. Returns false if the key isn't an editing key.
  /// Characters are typed only when no modifier other than Shift is held.
  pub fn edit(&mut self, key: event::KeyEvent) -> bool {
    match key.code {
      KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
        let byte_idx = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_idx, c);
        self.cursor += 1;
      }
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let byte_idx = char_to_byte_index(&self.value, self.cursor);
          self.value.remove(byte_idx);
        }
      }
      KeyCode::Delete => {
        if self.cursor < self.value.chars().count() {
          let byte_idx = char_to_byte_index(&self.value, self.cursor);
          self.value.remove(byte_idx);
        }
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
      }
      KeyCode::Right => {
        if self.cursor < self.value.chars().count() {
          self.cursor += 1;
        }
      }
      KeyCode::Home => {
        self.cursor = 0;
      }
      KeyCode::End => {
        self.cursor = self.value.chars().count();
      }
      _ => return false,
    }
    true
  }
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  // Ctrl+R — reset the filter form
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
    app.form.clear();
    app.clear_error();
    return;
  }

  match key.code {
    KeyCode::F(n @ 1..=4) => {
      app.select_tab(Tab::ALL[usize::from(n) - 1]);
      return;
    }
    KeyCode::Tab => {
      app.cycle_focus(true);
      return;
    }
    KeyCode::BackTab => {
      app.cycle_focus(false);
      return;
    }
    _ => {}
  }

  // Plain digits and letters are text while a date field has focus.
  if !app.focus.is_text() {
    match key.code {
      KeyCode::Char(c @ '1'..='4') => {
        let idx = c as usize - '1' as usize;
        app.select_tab(Tab::ALL[idx]);
        return;
      }
      KeyCode::Char(']') => {
        app.next_tab();
        return;
      }
      KeyCode::Char('q') => {
        app.should_quit = true;
        return;
      }
      _ => {}
    }
  }

  match app.focus {
    Focus::Form(field) => handle_form_key(app, field, key),
    Focus::Picker(field) => handle_picker_key(app, field, key),
    Focus::Table => handle_table_key(app, key),
  }
}

fn handle_form_key(app: &mut App, field: FormField, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => {
      app.trigger_search();
      return;
    }
    KeyCode::Down => {
      app.cycle_focus(true);
      return;
    }
    KeyCode::Up => {
      app.cycle_focus(false);
      return;
    }
    _ => {}
  }

  match field {
    FormField::FromDate | FormField::ToDate => {
      let text = if field == FormField::FromDate { &mut app.form.from_date } else { &mut app.form.to_date };
      if key.code == KeyCode::Esc {
        if text.is_empty() {
          app.focus = Focus::Table;
        } else {
          text.clear();
        }
        return;
      }
      if text.edit(key) {
        app.clear_error();
      }
    }
    FormField::Channel => match key.code {
      KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => app.form.next_channel(),
      KeyCode::Left | KeyCode::Char('h') => app.form.prev_channel(),
      KeyCode::Esc => app.focus = Focus::Table,
      _ => {}
    },
    FormField::Submit => {
      if key.code == KeyCode::Esc {
        app.focus = Focus::Table;
      }
    }
  }
}

fn handle_picker_key(app: &mut App, field: PickerField, key: event::KeyEvent) {
  match (field, key.code) {
    (_, KeyCode::Esc) => app.focus = Focus::Table,
    (PickerField::Language, KeyCode::Right | KeyCode::Char('l')) => app.picker.step_language(true),
    (PickerField::Language, KeyCode::Left | KeyCode::Char('h')) => app.picker.step_language(false),
    (PickerField::Language, KeyCode::Enter | KeyCode::Down) => {
      if app.picker.language.is_some() {
        app.focus = Focus::Picker(PickerField::Channel);
      } else {
        app.picker.step_language(true);
      }
    }
    (PickerField::Channel, KeyCode::Down | KeyCode::Char('j')) => app.picker.step_channel(true),
    (PickerField::Channel, KeyCode::Up | KeyCode::Char('k')) => app.picker.step_channel(false),
    (PickerField::Channel | PickerField::Submit, KeyCode::Enter) => app.select_channel(),
    _ => {}
  }
}

fn handle_table_key(app: &mut App, key: event::KeyEvent) {
  if !app.tab.has_table() {
    if key.code == KeyCode::Esc {
      app.should_quit = true;
    }
    return;
  }
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.move_selection(true),
    KeyCode::Up | KeyCode::Char('k') => app.move_selection(false),
    KeyCode::Home | KeyCode::Char('g') => app.select_first(),
    KeyCode::End | KeyCode::Char('G') => app.select_last(),
    KeyCode::Char('d') => app.request_sort(SortField::Duration),
    KeyCode::Char('s') => app.request_sort(SortField::FileSize),
    KeyCode::Esc => app.should_quit = true,
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::presenter::SortDirection;
  use crate::source::VideoSource;
  use ratatui::crossterm::event::KeyEvent;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app() -> App {
    App::new(VideoSource::Embedded, crate::catalog::sample_recordings(), Tab::Past24Hrs, &Config::default(), None)
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6); // past end
  }

  // --- TextField ---

  #[test]
  fn text_field_editing() {
    let mut field = TextField::default();
    for c in "2025-07-01".chars() {
      assert!(field.edit(key(KeyCode::Char(c))));
    }
    field.edit(key(KeyCode::Home));
    field.edit(key(KeyCode::Delete));
    assert_eq!(field.value, "025-07-01");
    field.edit(key(KeyCode::End));
    field.edit(key(KeyCode::Backspace));
    assert_eq!(field.value, "025-07-0");
    field.edit(key(KeyCode::Left));
    field.edit(KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT));
    assert_eq!(field.value, "025-07-X0");
    assert!(!field.edit(key(KeyCode::Enter)));
  }

  #[test]
  fn text_field_ignores_modified_chars() {
    let mut field = TextField::default();
    assert!(!field.edit(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)));
    assert!(!field.edit(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL | KeyModifiers::SHIFT)));
    assert!(field.is_empty());
    assert!(field.edit(KeyEvent::new(KeyCode::Left, KeyModifiers::ALT)));
  }

  #[test]
  fn text_field_multibyte_cursor() {
    let mut field = TextField::default();
    field.set("日本");
    assert_eq!(field.cursor, 2);
    field.edit(key(KeyCode::Backspace));
    assert_eq!(field.value, "日");
  }

  // --- key routing ---

  #[test]
  fn digits_go_to_date_field_not_tabs() {
    let mut app = app();
    handle_key_event(&mut app, key(KeyCode::Char('2')));
    assert_eq!(app.tab, Tab::Past24Hrs);
    assert_eq!(app.form.from_date.value, "2");
  }

  #[test]
  fn digits_switch_tabs_from_table() {
    let mut app = app();
    app.focus = Focus::Table;
    handle_key_event(&mut app, key(KeyCode::Char('3')));
    assert_eq!(app.tab, Tab::Upload);
    handle_key_event(&mut app, key(KeyCode::F(2)));
    assert_eq!(app.tab, Tab::SearchByLanguage);
    app.focus = Focus::Table;
    handle_key_event(&mut app, key(KeyCode::Char(']')));
    assert_eq!(app.tab, Tab::Upload);
  }

  #[test]
  fn sort_keys_on_table() {
    let mut app = app();
    app.focus = Focus::Table;
    handle_key_event(&mut app, key(KeyCode::Char('s')));
    assert_eq!(app.sort.field, SortField::FileSize);
    handle_key_event(&mut app, key(KeyCode::Char('s')));
    assert_eq!(app.sort.direction, SortDirection::Descending);
    assert_eq!(app.visible.first().map(|r| r.id), Some(1)); // 488.141 MB
  }

  #[test]
  fn channel_select_cycles_with_arrows() {
    let mut app = app();
    app.focus = Focus::Form(FormField::Channel);
    handle_key_event(&mut app, key(KeyCode::Right));
    assert_eq!(app.form.channel_index, 1);
    handle_key_event(&mut app, key(KeyCode::Left));
    handle_key_event(&mut app, key(KeyCode::Left));
    assert_eq!(app.form.channel_label(), "Channel 10 (1010670)");
  }

  #[test]
  fn picker_flow() {
    let mut app = app();
    app.select_tab(Tab::SearchByLanguage);
    handle_key_event(&mut app, key(KeyCode::Enter)); // picks the first language
    handle_key_event(&mut app, key(KeyCode::Right));
    assert_eq!(app.picker.language.map(|l| l.label()), Some("Hindi"));
    handle_key_event(&mut app, key(KeyCode::Down));
    assert_eq!(app.focus, Focus::Picker(PickerField::Channel));
    handle_key_event(&mut app, key(KeyCode::Down));
    handle_key_event(&mut app, key(KeyCode::Enter));
    assert!(app.toast.as_ref().is_some_and(|t| t.body.ends_with("Aaj Tak")));
  }

  #[test]
  fn alt_chars_do_not_reach_date_field() {
    let mut app = app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
    assert!(app.form.from_date.is_empty());
  }

  #[test]
  fn ctrl_c_quits_from_anywhere() {
    let mut app = app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[test]
  fn esc_on_date_clears_then_leaves() {
    let mut app = app();
    handle_key_event(&mut app, key(KeyCode::Char('1')));
    handle_key_event(&mut app, key(KeyCode::Esc));
    assert!(app.form.from_date.is_empty());
    assert_eq!(app.focus, Focus::Form(FormField::FromDate));
    handle_key_event(&mut app, key(KeyCode::Esc));
    assert_eq!(app.focus, Focus::Table);
  }
}
