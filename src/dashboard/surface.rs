use std::io;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;

use crate::error::ResultOkLogExt;

/// A display the dashboard paints its frames onto.
pub trait Surface {
    /// Returns the current `(width, height)` of the display.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Replaces the displayed frame with `text`, clipped to `width` x `height`.
    fn paint(&mut self, text: &str, width: u16, height: u16) -> io::Result<()>;

    /// Hands the display back to its previous owner.
    fn release(&mut self) -> io::Result<()>;
}

/// Owns a [`Surface`] and releases it when dropped, even during a panic.
pub struct SurfaceGuard<S: Surface> {
    surface: Option<S>,
}

impl<S: Surface> SurfaceGuard<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface: Some(surface),
        }
    }

    pub fn surface(&mut self) -> &mut S {
        self.surface
            .as_mut()
            .expect("surface is only taken on release")
    }

    /// Releases the surface now, reporting failures to the caller instead of
    /// only logging them.
    pub fn release(mut self) -> io::Result<()> {
        match self.surface.take() {
            Some(mut surface) => surface.release(),
            None => Ok(()),
        }
    }
}

impl<S: Surface> Drop for SurfaceGuard<S> {
    fn drop(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release().ok_log(log::Level::Warn);
        }
    }
}

/// The controlling terminal, switched to raw mode and the alternate screen.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSurface {
    /// Takes over the terminal.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if raw mode or the alternate screen
    /// cannot be entered. Partial setup is rolled back.
    pub fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        let setup = || -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
            terminal.hide_cursor()?;
            terminal.clear()?;
            Ok(terminal)
        };

        match setup() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                roll_back(&mut io::stdout());
                Err(err)
            }
        }
    }
}

/// Undoes a partial takeover of the terminal writing to `out`. Failures are
/// logged, the original setup error is what the caller sees.
fn roll_back(out: &mut impl io::Write) {
    execute!(out, LeaveAlternateScreen).ok_log(log::Level::Warn);
    disable_raw_mode().ok_log(log::Level::Warn);
}

impl Surface for TerminalSurface {
    fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    fn paint(&mut self, text: &str, width: u16, height: u16) -> io::Result<()> {
        self.terminal.draw(|frame| {
            let area = Rect::new(0, 0, width, height).intersection(frame.area());
            frame.render_widget(Paragraph::new(text), area);
        })?;
        Ok(())
    }

    fn release(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}
