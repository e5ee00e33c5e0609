//! Live, continuously refreshing process view.
//!
//! The [`Dashboard`] runs a single cooperative loop that waits on the first
//! of three sources each iteration:
//!
//! - cancellation, which ends the run immediately (also while a query is in
//!   flight; its result is dropped),
//! - a terminal event, which may quit or change the active [`SortKey`]
//!   (also read while a query is in flight),
//! - the refresh timer, which queries the node, renders the listing and
//!   paints it.
//!
//! A failed query keeps the previous frame on screen. The terminal is
//! handed back through [`SurfaceGuard`] on every exit path.
mod keys;
mod session;
mod surface;

use std::io;
use std::ops::ControlFlow;
use std::time::Duration;

use crossterm::event::Event;
use futures::{Stream, StreamExt};
use tokio::time::MissedTickBehavior;

pub use keys::{Command, command_for};
pub use session::Session;
pub use surface::{Surface, SurfaceGuard, TerminalSurface};

use crate::error::ResultOkLogExt;
use crate::machine::Machine;
use crate::render::PROCESS_SEPARATOR;
use crate::report::Reporter;
use crate::sort::SortKey;

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to initialize terminal: {0}")]
    Init(#[source] io::Error),
    #[error("failed to read terminal size: {0}")]
    Geometry(#[source] io::Error),
    #[error("failed to draw frame: {0}")]
    Paint(#[source] io::Error),
    #[error("failed to read terminal events: {0}")]
    Events(#[source] io::Error),
    #[error("failed to restore terminal: {0}")]
    Restore(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct Dashboard<M> {
    reporter: Reporter<M>,
    sort_key: SortKey,
    period: Duration,
}

impl<M: Machine> Dashboard<M> {
    /// Creates a dashboard refreshing every `period`.
    ///
    /// The live view covers a single node: the reporter is narrowed to its
    /// first target.
    pub fn new(mut reporter: Reporter<M>, sort_key: SortKey, period: Duration) -> Self {
        reporter.narrow_to_first_target();
        Self {
            reporter,
            sort_key,
            period,
        }
    }

    /// Runs the dashboard on `surface` until a quit key is pressed, the
    /// event stream ends or `cancel` completes.
    ///
    /// Returns the final session state.
    ///
    /// # Errors
    ///
    /// Fails if the terminal size cannot be read, a frame cannot be painted,
    /// the event stream reports an error or the surface cannot be released.
    pub async fn run<S, E, C>(&self, surface: S, mut events: E, cancel: C) -> Result<Session>
    where
        S: Surface,
        E: Stream<Item = io::Result<Event>> + Unpin,
        C: Future<Output = ()>,
    {
        let mut guard = SurfaceGuard::new(surface);
        let mut session = Session::new(self.sort_key);
        let mut cancel = std::pin::pin!(cancel);

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = &mut cancel => {
                    log::debug!("Dashboard cancelled");
                    break;
                }
                event = events.next() => {
                    if handle_event(&mut session, event)?.is_break() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let (width, height) = guard.surface().size().map_err(Error::Geometry)?;
                    session.resize(width, height);

                    let started = tokio::time::Instant::now();
                    let mut query = std::pin::pin!(self.reporter.processes(session.sort_key()));
                    // Keys stay live while the node answers; a sort change
                    // only affects the next query.
                    let report = loop {
                        tokio::select! {
                            biased;

                            () = &mut cancel => break None,
                            event = events.next() => {
                                if handle_event(&mut session, event)?.is_break() {
                                    break None;
                                }
                            }
                            report = &mut query => break Some(report),
                        }
                    };
                    let Some(report) = report else {
                        log::debug!("Dashboard stopped while a query was in flight");
                        break;
                    };
                    log::trace!("Query took {:?}", started.elapsed());

                    // A failed refresh leaves the previous frame on screen.
                    let Some(table) = report.ok_log(log::Level::Debug) else {
                        continue;
                    };
                    let frame = table.render(PROCESS_SEPARATOR);
                    guard
                        .surface()
                        .paint(&frame, width, height)
                        .map_err(Error::Paint)?;
                    session.show(frame);
                }
            }
        }

        guard.release().map_err(Error::Restore)?;
        Ok(session)
    }
}

/// Applies one terminal event to the session. Breaks on quit keys and when
/// the event stream ends.
fn handle_event(
    session: &mut Session,
    event: Option<io::Result<Event>>,
) -> Result<ControlFlow<()>> {
    match event {
        Some(Ok(event)) => match command_for(&event) {
            Some(Command::Quit) => return Ok(ControlFlow::Break(())),
            Some(Command::Sort(sort_key)) => session.set_sort_key(sort_key),
            None => {}
        },
        Some(Err(err)) => return Err(Error::Events(err)),
        None => {
            log::debug!("Terminal event stream closed");
            return Ok(ControlFlow::Break(()));
        }
    }
    Ok(ControlFlow::Continue(()))
}
