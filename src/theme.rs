use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
  /// Rows whose duration is outside the expected band.
  pub warning: Color,
  pub warning_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "slate",
    bg: Color::Rgb(15, 17, 21),
    fg: Color::Rgb(240, 242, 245),
    accent: Color::Rgb(99, 140, 255),
    muted: Color::Rgb(130, 138, 150),
    border: Color::Rgb(45, 50, 60),
    highlight_fg: Color::Rgb(240, 242, 245),
    highlight_bg: Color::Rgb(45, 52, 65),
    stripe_bg: Color::Rgb(24, 27, 33),
    status: Color::Rgb(120, 200, 160),
    error: Color::Rgb(240, 100, 100),
    key_fg: Color::Rgb(15, 17, 21),
    key_bg: Color::Rgb(130, 138, 150),
    warning: Color::Rgb(245, 180, 70),
    warning_bg: Color::Rgb(60, 45, 20),
  },
  Theme {
    name: "paper",
    bg: Color::Rgb(250, 248, 242),
    fg: Color::Rgb(40, 40, 40),
    accent: Color::Rgb(30, 90, 200),
    muted: Color::Rgb(120, 120, 120),
    border: Color::Rgb(200, 196, 186),
    highlight_fg: Color::Rgb(20, 20, 20),
    highlight_bg: Color::Rgb(220, 230, 250),
    stripe_bg: Color::Rgb(240, 238, 230),
    status: Color::Rgb(30, 130, 80),
    error: Color::Rgb(190, 40, 40),
    key_fg: Color::Rgb(250, 248, 242),
    key_bg: Color::Rgb(90, 90, 90),
    warning: Color::Rgb(170, 90, 0),
    warning_bg: Color::Rgb(253, 236, 200),
  },
  Theme {
    name: "terminal",
    bg: Color::Reset,
    fg: Color::White,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    status: Color::Green,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
    warning: Color::Yellow,
    warning_bg: Color::Reset,
  },
];

/// Index of the theme called `name`, falling back to the first one.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}
