//! Inbound terminal events

use crossterm::event::{Event, EventStream, KeyEvent};
use futures::StreamExt;
use std::collections::VecDeque;
use std::future::Future;
use std::io;

/// The subset of terminal input the root understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Async source of raw events. `Ok(None)` ends the event loop, an error
/// aborts it.
pub trait EventSource {
    fn next_event(&mut self) -> impl Future<Output = io::Result<Option<RawEvent>>>;
}

/// Live terminal input through crossterm's `EventStream`
pub struct CrosstermEvents {
    stream: EventStream,
}

impl CrosstermEvents {
    pub fn new() -> Self {
        Self {
            stream: EventStream::new(),
        }
    }
}

impl Default for CrosstermEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEvents {
    async fn next_event(&mut self) -> io::Result<Option<RawEvent>> {
        while let Some(event) = self.stream.next().await {
            match event? {
                Event::Key(key) => return Ok(Some(RawEvent::Key(key))),
                Event::Resize(w, h) => return Ok(Some(RawEvent::Resize(w, h))),
                other => tracing::trace!(event = ?other, "ignoring terminal event"),
            }
        }
        Ok(None)
    }
}

/// Replays a fixed list of events, then ends
///
/// With `hold_open` the source stays pending once drained instead of
/// returning `None`, so inbox traffic (command results, `Quit`) decides when
/// the loop stops. `then_fail` reports an I/O error once drained.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<RawEvent>,
    hold_open: bool,
    failure: Option<io::Error>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            hold_open: false,
            failure: None,
        }
    }

    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn then_fail(mut self, error: io::Error) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedEvents {
    async fn next_event(&mut self) -> io::Result<Option<RawEvent>> {
        if let Some(event) = self.events.pop_front() {
            return Ok(Some(event));
        }
        if let Some(error) = self.failure.take() {
            return Err(error);
        }
        if self.hold_open {
            std::future::pending::<()>().await;
        }
        Ok(None)
    }
}
