//! Interactive terminal editor for HTTP mock rules
//!
//! Lists the current mock rules with plain-English summaries and lets them
//! be added, edited, reordered, saved, reset, imported and exported.
//!
//! # Example
//!
//! ```no_run
//! use mock_rules::builtin_default_rules;
//! use mock_rules_tui::{App, AppConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::new(AppConfig::default(), builtin_default_rules());
//!     mock_rules_tui::run(app).await
//! }
//! ```

pub mod app;
pub mod components;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::{App, AppConfig};
pub use event::{Event, EventHandler};
pub use theme::Theme;

use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Instant;
use tracing::{info, warn};

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Run the editor until the user quits.
///
/// The terminal is put back into cooked mode on the way out, whether the
/// loop ends normally or with an error.
pub async fn run(mut app: App) -> anyhow::Result<()> {
    let mut terminal = enter_terminal()?;
    info!(rules = app.page.rules().len(), "starting rule editor");

    let result = event_loop(&mut terminal, &mut app).await;
    if let Err(e) = leave_terminal(&mut terminal) {
        warn!(error = %e, "failed to restore terminal");
    }
    info!(unsaved = app.page.are_some_rules_unsaved(), "rule editor closed");
    result
}

fn enter_terminal() -> anyhow::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn leave_terminal(terminal: &mut Term) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(terminal: &mut Term, app: &mut App) -> anyhow::Result<()> {
    let mut events = EventHandler::new(app.config.refresh_interval);
    let size = terminal.size()?;
    app.on_resize(size.width, size.height);

    while !app.should_quit {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let Some(event) = events.next().await else {
            warn!("terminal input closed");
            break;
        };
        match event {
            Event::Key(key) => app.handle_key_event(key),
            Event::Paste(text) => app.handle_paste(&text),
            Event::Tick => app.on_tick(Instant::now()),
            Event::Resize(width, height) => app.on_resize(width, height),
        }
    }
    Ok(())
}
