//! Event bus for redline.
//!
//! Terminal input, timer ticks, review sync updates, page size reads and
//! overlay clicks are all normalised into a single `AppEvent` enum and sent
//! over a tokio unbounded MPSC channel. The main loop receives from this
//! channel and dispatches accordingly.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms ≈ 30 FPS) — triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms = 4 Hz) — triggers application-state updates.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use redline_core::review_sync::ReviewSyncState;
use redline_core::types::{DocVariant, PageSize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// All events the application can receive from any source.
#[derive(Debug)]
#[non_exhaustive]
pub enum AppEvent {
    /// A key press from the terminal (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// A mouse event from the terminal (click, drag, move, scroll).
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Logic tick for state updates (4 Hz / 250 ms).
    Tick,
    /// Render tick — triggers a `terminal.draw()` call (≈30 FPS / 33 ms).
    Render,
    /// New snapshot from the review sync controller.
    ReviewUpdate(Box<ReviewSyncState>),
    /// A page image reported its natural size.
    SurfaceLoaded { variant: DocVariant, page: usize, size: PageSize },
    /// A highlighted region was clicked; carries the diff's `element_id`.
    DiffSelected(String),
}

/// Holds the sender and receiver ends of the unified event channel.
pub struct EventHandler {
    /// Send half — clone this for each producer.
    pub tx: mpsc::UnboundedSender<AppEvent>,
    /// Receive half — owned by the main loop.
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background tokio task that feeds terminal input and the two
/// timers into the event channel.
///
/// `reader.next().fuse()` keeps `select!` from polling a finished stream.
/// Only `KeyEventKind::Press` is forwarded; Windows reports releases too.
/// Mouse movement is forwarded as-is since hover emphasis depends on it.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            let sent = tokio::select! {
                _ = tick_tick => tx.send(AppEvent::Tick),
                _ = render_tick => tx.send(AppEvent::Render),
                maybe_event = crossterm_event => match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        tx.send(AppEvent::Key(key))
                    }
                    Some(Ok(Event::Resize(w, h))) => tx.send(AppEvent::Resize(w, h)),
                    Some(Ok(Event::Mouse(mouse))) => tx.send(AppEvent::Mouse(mouse)),
                    _ => Ok(()),
                },
            };
            if sent.is_err() {
                // Receiver dropped: the main loop has exited.
                break;
            }
        }
    });
}
