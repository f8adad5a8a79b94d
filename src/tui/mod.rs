//! Full-screen user manager: the form on the left, the users table on the
//! right.

mod app;
mod view;

use std::io::{Stdout, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Handle;

use crate::ui;
use crate::users::UserApi;

use app::App;

const POLL_TIMEOUT: Duration = Duration::from_millis(100);

struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    cleaned_up: bool,
}

impl Screen {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;

        Ok(Self {
            terminal,
            cleaned_up: false,
        })
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Run the interactive user manager until the user quits.
///
/// Blocks the calling thread; call it from `spawn_blocking` so request tasks
/// keep running on the runtime. Diagnostics go to `log_file` while the
/// screen is up.
pub fn run(
    api: Arc<dyn UserApi>,
    handle: Handle,
    lock_name_on_edit: bool,
    log_file: PathBuf,
) -> Result<()> {
    ui::redirect_to_file(Some(log_file));
    let result = run_screen(api, handle, lock_name_on_edit);
    ui::redirect_to_file(None);
    result
}

fn run_screen(api: Arc<dyn UserApi>, handle: Handle, lock_name_on_edit: bool) -> Result<()> {
    let mut screen = Screen::new()?;
    let mut app = App::new(api, handle, lock_name_on_edit);
    app.start();

    let mut needs_redraw = true;
    while !app.should_quit {
        if app.drain_completions() {
            needs_redraw = true;
        }

        if needs_redraw {
            screen.terminal.draw(|f| view::draw(f, &app))?;
            needs_redraw = false;
        }

        if !event::poll(POLL_TIMEOUT)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(request) = app.handle_key(key) {
                    app.dispatch(request);
                }
                needs_redraw = true;
            }
            Event::Resize(_, _) => needs_redraw = true,
            _ => {}
        }
    }

    screen.cleanup()
}
