mod app;
mod catalog;
mod config;
mod constants;
mod input;
mod logging;
mod presenter;
mod record;
mod report;
mod search;
mod source;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use app::{App, Tab};
use config::Config;
use presenter::{SortDirection, SortField, sort_by_key};
use source::VideoSource;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Cli {
  #[command(flatten)]
  view: ViewArgs,

  /// Tab to open on start
  #[arg(short, long, value_enum, default_value = "past24hrs")]
  tab: Tab,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Args, Debug, Clone)]
struct ViewArgs {
  /// JSON array of recordings to load instead of the bundled sample
  #[arg(short, long, global = true)]
  data: Option<PathBuf>,

  /// Column to sort by (default: the remembered sort, else duration)
  #[arg(short, long, value_enum, global = true)]
  sort: Option<SortField>,

  /// Sort in descending order
  #[arg(long, global = true)]
  desc: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the sorted, flagged recordings and exit
  List {
    /// Emit JSON instead of a text table
    #[arg(long)]
    json: bool,
  },
  /// Print shell completions
  Completions {
    #[arg(value_enum)]
    shell: clap_complete::Shell,
  },
}

impl ViewArgs {
  /// Layer command-line sort choices over the saved preferences.
  fn apply(&self, config: &mut Config) {
    if let Some(field) = self.sort {
      config.sort_field = Some(field);
    }
    if self.desc {
      config.sort_direction = Some(SortDirection::Descending);
    } else if self.sort.is_some() {
      config.sort_direction = Some(SortDirection::Ascending);
    }
  }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Some(Command::Completions { shell }) => {
      clap_complete::generate(shell, &mut Cli::command(), "mvlog", &mut std::io::stdout());
      Ok(())
    }
    Some(Command::List { json }) => {
      logging::init_stderr();
      list(&cli.view, json).await
    }
    None => {
      let _guard = logging::init_file()?;
      interactive(cli.view, cli.tab).await
    }
  }
}

async fn list(view: &ViewArgs, json: bool) -> Result<()> {
  let source = VideoSource::from_arg(view.data.clone());
  let records = source.load_all().await?;

  let mut config = Config::default();
  view.apply(&mut config);
  let sort = config.sort_state();

  let view = sort_by_key(&records, sort.field.key(), sort.direction);
  for defect in &view.defects {
    eprintln!("record {}: {}: {}", defect.id, defect.field.label(), defect.error);
  }
  let output = if json { report::to_json(&view)? } else { report::to_text(&view, sort) };
  println!("{}", output);
  Ok(())
}

async fn interactive(view: ViewArgs, tab: Tab) -> Result<()> {
  let source = VideoSource::from_arg(view.data.clone());
  let records = source.load_all().await?;

  let prefs_path = config::prefs_path();
  let mut config = Config::load();
  view.apply(&mut config);
  info!(source = %source.describe(), records = records.len(), "mvlog: starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let app = App::new(source, records, tab, &config, prefs_path);
  let result = run(&mut terminal, app).await;
  ratatui::restore();
  if let Err(ref e) = result {
    warn!(err = %e, "mvlog: exited with error");
  }
  result
}

async fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
  loop {
    app.check_pending();
    app.expire_messages();

    terminal.draw(|frame| ui::ui(frame, &mut app)).context("Failed to draw frame")?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(&mut app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  Ok(())
}
