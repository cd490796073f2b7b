use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span, Text},
  widgets::{Block, BorderType, Cell, List, ListItem, Padding, Paragraph, Row, Table, Tabs},
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, Focus, PickerField, Tab};
use crate::input::TextField;
use crate::presenter::{Attention, SortField, attention_in};
use crate::search::FormField;
use crate::theme::Theme;

const DATE_PLACEHOLDER: &str = "DD/MM/YYYY HH:MM";

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn boxed<'a>(theme: &Theme, title: &'a str, focused: bool) -> Block<'a> {
  let color = if focused { theme.accent } else { theme.border };
  Block::bordered()
    .title(format!(" {} ", title))
    .title_style(Style::default().fg(if focused { theme.accent } else { theme.muted }))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
    .padding(Padding::horizontal(1))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, footer_area] =
    Layout::vertical([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)])
      .areas(frame.area());

  render_header(frame, app, header_area);
  match app.tab {
    Tab::Past24Hrs => {
      let [filters_area, table_area] = Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(main_area);
      render_filters(frame, app, filters_area);
      render_table(frame, app, table_area);
    }
    Tab::SearchByLanguage => {
      let [picker_area, table_area] = Layout::vertical([Constraint::Length(8), Constraint::Min(3)]).areas(main_area);
      render_picker(frame, app, picker_area);
      render_table(frame, app, table_area);
    }
    Tab::Upload => render_placeholder(frame, theme, main_area, "Upload File", "File upload functionality coming soon."),
    Tab::Login => render_placeholder(frame, theme, main_area, "Login", "Login functionality coming soon."),
  }
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let brand = " ▶ MV Logger ";
  let left = Line::from(Span::styled(brand, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let tabs_x = area.x + brand.chars().count() as u16 + 1;
  let tabs_area = Rect { x: tabs_x, width: area.width.saturating_sub(tabs_x - area.x), ..area }.intersection(area);
  let titles: Vec<Line> =
    Tab::ALL.iter().enumerate().map(|(i, t)| Line::from(format!("{} {}", i + 1, t.label()))).collect();
  let tabs = Tabs::new(titles)
    .select(app.tab.index())
    .style(Style::default().fg(theme.muted))
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD))
    .divider(Span::styled("│", Style::default().fg(theme.border)));
  frame.render_widget(tabs, tabs_area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area }
      .intersection(area);
  frame.render_widget(right, right_area);
}

/// Render a single-line text field, keeping the cursor in view.
fn render_text_field(frame: &mut Frame, theme: &Theme, field: &mut TextField, area: Rect, title: &str, focused: bool) {
  let block = boxed(theme, title, focused);
  let inner_w = area.width.saturating_sub(4) as usize;
  if inner_w == 0 {
    frame.render_widget(block, area);
    return;
  }
  let cursor_col = display_width(&field.value, field.cursor);

  if cursor_col < field.scroll {
    field.scroll = cursor_col;
  } else if cursor_col >= field.scroll + inner_w {
    field.scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let paragraph = if field.value.is_empty() {
    Paragraph::new(Span::styled(DATE_PLACEHOLDER, Style::default().fg(theme.muted)))
  } else {
    let visible: String = field
      .value
      .chars()
      .scan(0usize, |col, c| {
        let w = c.width().unwrap_or(0);
        let start = *col;
        *col += w;
        Some((start, *col, c))
      })
      .skip_while(|(_, end, _)| *end <= field.scroll)
      .take_while(|(start, _, _)| *start < field.scroll + inner_w)
      .map(|(_, _, c)| c)
      .collect();
    Paragraph::new(visible).style(Style::default().fg(theme.fg))
  };
  frame.render_widget(paragraph.block(block), area);

  if focused {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(field.scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_filters(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let [from_area, to_area, channel_area, submit_area] = Layout::horizontal([
    Constraint::Percentage(28),
    Constraint::Percentage(28),
    Constraint::Percentage(30),
    Constraint::Min(12),
  ])
  .areas(area);

  let focused = |f: FormField| app.focus == Focus::Form(f);
  let (from_focused, to_focused) = (focused(FormField::FromDate), focused(FormField::ToDate));
  let channel_focused = focused(FormField::Channel);
  let submit_focused = focused(FormField::Submit);

  render_text_field(frame, theme, &mut app.form.from_date, from_area, FormField::FromDate.label(), from_focused);
  render_text_field(frame, theme, &mut app.form.to_date, to_area, FormField::ToDate.label(), to_focused);

  let inner_w = channel_area.width.saturating_sub(8) as usize;
  let channel = Line::from(vec![
    Span::styled("◀ ", Style::default().fg(theme.muted)),
    Span::styled(truncate_str(&app.form.channel_label(), inner_w), Style::default().fg(theme.fg)),
    Span::styled(" ▶", Style::default().fg(theme.muted)),
  ]);
  frame.render_widget(
    Paragraph::new(channel).block(boxed(theme, FormField::Channel.label(), channel_focused)),
    channel_area,
  );

  let label = if app.search_pending() { "Searching…" } else { "⏎ Search" };
  let button_style = if submit_focused {
    Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(theme.accent)
  };
  frame.render_widget(
    Paragraph::new(Span::styled(label, button_style)).alignment(Alignment::Center).block(boxed(theme, "", submit_focused)),
    submit_area,
  );
}

fn render_picker(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let [left_area, channels_area] =
    Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(area);
  let [language_area, submit_area, _] =
    Layout::vertical([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)]).areas(left_area);

  let language_focused = app.focus == Focus::Picker(PickerField::Language);
  let language = match app.picker.language {
    Some(l) => Line::from(vec![
      Span::styled("◀ ", Style::default().fg(theme.muted)),
      Span::styled(l.label(), Style::default().fg(theme.fg)),
      Span::styled(" ▶", Style::default().fg(theme.muted)),
    ]),
    None => Line::from(Span::styled("Choose Language", Style::default().fg(theme.muted))),
  };
  frame.render_widget(Paragraph::new(language).block(boxed(theme, "Select Language", language_focused)), language_area);

  let submit_focused = app.focus == Focus::Picker(PickerField::Submit);
  let enabled = app.picker.selected_channel().is_some();
  let button_style = match (submit_focused, enabled) {
    (true, _) => Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD),
    (false, true) => Style::default().fg(theme.accent),
    (false, false) => Style::default().fg(theme.muted),
  };
  frame.render_widget(
    Paragraph::new(Span::styled("⏎ Search Channel", button_style))
      .alignment(Alignment::Center)
      .block(boxed(theme, "", submit_focused)),
    submit_area,
  );

  let channels_focused = app.focus == Focus::Picker(PickerField::Channel);
  let block = boxed(theme, "Select Channel", channels_focused);
  if app.picker.language.is_none() {
    let hint = Paragraph::new(Span::styled("Select language first", Style::default().fg(theme.muted))).block(block);
    frame.render_widget(hint, channels_area);
    return;
  }
  let items: Vec<ListItem> = app
    .picker
    .channels()
    .iter()
    .enumerate()
    .map(|(i, name)| {
      let bg = if i % 2 == 1 { theme.stripe_bg } else { theme.bg };
      ListItem::new(Line::from(Span::styled(name.as_str(), Style::default().fg(theme.fg)))).bg(bg)
    })
    .collect();
  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
  frame.render_stateful_widget(list, channels_area, &mut app.picker.channel_state);
}

fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Table;
  let sort = app.sort;

  let header_cell = |field: Option<SortField>, label: &'static str| {
    let text = match field {
      Some(f) if f == sort.field => format!("{} {}", label, sort.direction.arrow()),
      Some(_) => format!("{} ⇅", label),
      None => label.to_string(),
    };
    Cell::from(text)
  };
  let header = Row::new(vec![
    header_cell(None, "#"),
    header_cell(Some(SortField::FileSize), "Video Information"),
    header_cell(Some(SortField::Duration), "File Duration"),
    header_cell(None, "Channel Name"),
    header_cell(None, "Capture Date"),
    header_cell(None, "Log Start"),
    header_cell(None, "Log End"),
  ])
  .style(Style::default().fg(theme.muted).add_modifier(Modifier::BOLD))
  .bottom_margin(1);

  let rows: Vec<Row> = app
    .visible
    .iter()
    .enumerate()
    .map(|(i, record)| {
      let attention = attention_in(record, app.band);
      let bg = match attention {
        Attention::Normal if i % 2 == 1 => theme.stripe_bg,
        Attention::Normal => theme.bg,
        Attention::OutOfRange | Attention::Malformed => theme.warning_bg,
      };
      let duration = match attention {
        Attention::Normal => Span::styled(record.file_duration.clone(), Style::default().fg(theme.fg)),
        Attention::OutOfRange => {
          Span::styled(format!("{} ⚠", record.file_duration), Style::default().fg(theme.warning).bold())
        }
        Attention::Malformed => Span::styled(format!("?? {}", record.file_duration), Style::default().fg(theme.error)),
      };
      Row::new(vec![
        Cell::from(format!("{}", i + 1)),
        Cell::from(Text::from(vec![
          Line::from(Span::styled(record.video_name.as_str(), Style::default().fg(theme.fg))),
          Line::from(Span::styled(format!("Size: {}", record.file_size), Style::default().fg(theme.muted))),
        ])),
        Cell::from(duration),
        Cell::from(Text::from(vec![
          Line::from(Span::styled(record.channel_name.as_str(), Style::default().fg(theme.fg))),
          Line::from(Span::styled(format!("Code: {}", record.channel_code), Style::default().fg(theme.muted))),
        ])),
        Cell::from(record.capture_date.as_str()),
        Cell::from(record.log_start_time.as_str()),
        Cell::from(record.log_end_time.as_str()),
      ])
      .height(2)
      .bg(bg)
    })
    .collect();

  let flagged = app.flagged_count();
  let title = Line::from(vec![
    Span::styled(" Video Files ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(format!("({}) ", app.visible.len()), Style::default().fg(theme.muted)),
  ]);
  let sort_label = format!(" Sort by: {} {} · {} flagged ", sort.field.label(), sort.direction.arrow(), flagged);
  let block = Block::bordered()
    .title(title)
    .title_bottom(Line::from(Span::styled(sort_label, Style::default().fg(theme.muted))).right_aligned())
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(if focused { theme.accent } else { theme.border }));

  let widths = [
    Constraint::Length(4),
    Constraint::Min(32),
    Constraint::Length(15),
    Constraint::Min(16),
    Constraint::Length(13),
    Constraint::Length(10),
    Constraint::Length(10),
  ];
  let table = Table::new(rows, widths)
    .header(header)
    .block(block)
    .column_spacing(1)
    .highlight_symbol("▶ ")
    .row_highlight_style(if focused {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().add_modifier(Modifier::BOLD)
    });

  if app.visible.is_empty() {
    let empty = Paragraph::new(vec![
      Line::from(""),
      Line::from(Span::styled("No recordings to show.", Style::default().fg(theme.muted))),
    ])
    .alignment(Alignment::Center)
    .block(
      Block::bordered()
        .title(" Video Files ")
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(empty, area);
    return;
  }
  frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_placeholder(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, body: &str) {
  let text = vec![
    Line::from(""),
    Line::from(""),
    Line::from(Span::styled(title.to_string(), Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled(body.to_string(), Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text)
    .alignment(Alignment::Center)
    .block(Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border)));
  frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(toast) = &app.toast {
    (format!(" ✔ {}: {}", toast.title, toast.body), Style::default().fg(theme.status))
  } else {
    (
      format!(" Ready · {} recordings from {}", app.records.len(), app.source.describe()),
      Style::default().fg(theme.muted),
    )
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn footer_keys(app: &App) -> Vec<(&'static str, &'static str)> {
  let mut keys = match app.focus {
    Focus::Form(field) if field.is_text() => vec![("Enter", "Search"), ("↑↓", "Field"), ("Esc", "Clear")],
    Focus::Form(FormField::Channel) => vec![("←→", "Channel"), ("Enter", "Search"), ("↑↓", "Field")],
    Focus::Form(_) => vec![("Enter", "Search"), ("↑↓", "Field")],
    Focus::Picker(PickerField::Language) => vec![("←→", "Language"), ("Enter", "Channels")],
    Focus::Picker(_) => vec![("j/k", "Channel"), ("Enter", "Select")],
    Focus::Table if app.tab.has_table() => {
      vec![("j/k", "Navigate"), ("d", "Sort duration"), ("s", "Sort size"), ("Esc", "Quit")]
    }
    Focus::Table => vec![("1-4", "Tabs"), ("]", "Next tab"), ("Esc", "Quit")],
  };
  keys.push(("Tab", "Focus"));
  if app.tab == Tab::Past24Hrs {
    keys.push(("^r", "Reset"));
  }
  keys.push(("^t", "Theme"));
  keys
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys = footer_keys(app);

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area }
      .intersection(area);
  frame.render_widget(right, right_area);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::source::VideoSource;
  use ratatui::{Terminal, backend::TestBackend};

  fn make_app(tab: Tab) -> App {
    App::new(VideoSource::Embedded, crate::catalog::sample_recordings(), tab, &Config::default(), None)
  }

  fn render(app: &mut App) -> String {
    render_sized(app, 140, 40)
  }

  fn render_sized(app: &mut App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| ui(frame, app)).unwrap();
    let buffer = terminal.backend().buffer().clone();
    buffer.content().iter().map(|c| c.symbol()).collect::<String>()
  }

  #[test]
  fn truncate_keeps_short_strings() {
    assert_eq!(truncate_str("abc", 5), "abc");
    assert_eq!(truncate_str("abcdef", 4), "abc…");
  }

  #[test]
  fn display_width_counts_wide_chars() {
    assert_eq!(display_width("a日b", 3), 4);
    assert_eq!(display_width("a日b", 1), 1);
  }

  #[test]
  fn past_24hrs_shows_table_and_flags() {
    let mut app = make_app(Tab::Past24Hrs);
    let screen = render(&mut app);
    assert!(screen.contains("Video Files"));
    assert!(screen.contains("1015268_2025-07-01_12:00:00.Mp4"));
    assert!(screen.contains("00:04:21 ⚠"));
    assert!(screen.contains("From Date"));
  }

  #[test]
  fn narrow_terminal_renders_every_tab() {
    for tab in Tab::ALL {
      let mut app = make_app(tab);
      render_sized(&mut app, 14, 20);
      app.form.from_date.set("01/07/2025 11:00");
      render_sized(&mut app, 14, 20);
      render_sized(&mut app, 4, 6);
    }
  }

  #[test]
  fn cursor_stays_inside_a_scrolled_field() {
    let mut app = make_app(Tab::Past24Hrs);
    app.form.from_date.set("01/07/2025 11:00 and then some more text");
    let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
    terminal.draw(|frame| ui(frame, &mut app)).unwrap();
    assert!(app.form.from_date.scroll > 0);
    let cursor = terminal.get_cursor_position().unwrap();
    assert!(cursor.x < 60 * 28 / 100);
  }

  #[test]
  fn placeholders_render() {
    let mut app = make_app(Tab::Upload);
    assert!(render(&mut app).contains("File upload functionality coming soon."));
    let mut app = make_app(Tab::Login);
    assert!(render(&mut app).contains("Login functionality coming soon."));
  }

  #[test]
  fn language_tab_asks_for_language_first() {
    let mut app = make_app(Tab::SearchByLanguage);
    assert!(render(&mut app).contains("Select language first"));
    app.picker.step_language(true);
    assert!(render(&mut app).contains("NDTV 24x7"));
  }

  #[test]
  fn footer_changes_with_focus() {
    let mut app = make_app(Tab::Past24Hrs);
    assert!(footer_keys(&app).contains(&("Esc", "Clear")));
    app.focus = Focus::Table;
    assert!(footer_keys(&app).contains(&("d", "Sort duration")));
  }
}
