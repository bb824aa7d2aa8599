//! Root controller
//!
//! The [`Root`] owns the panel tree and is the only place requests are
//! handled. Everything runs on one control task:
//!
//! ```text
//!   EventSource ──RawEvent──┐
//!                           ▼
//!   inbox ◄── workers ◄── Root ──Msg──► tree ──Update.up──► Root
//!     │        (queue)     ▲
//!     └──────Msg───────────┘
//! ```
//!
//! A raw key becomes [`Msg::Key`] and follows the focus chain. Whatever the
//! tree answers (requests, unused keys) is processed in the same cycle;
//! commands are collected and submitted to the [`CommandQueue`] before the
//! next wait. Focus revoke and grant are applied back to back without going
//! through the queue.

mod events;
mod queue;
mod terminal;

pub use events::{CrosstermEvents, EventSource, RawEvent, ScriptedEvents};
pub use queue::{CommandQueue, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
pub use terminal::run_in_terminal;

use crate::logging::{NoopObserver, Observer};
use crate::msg::{classify, Command, FocusGrant, Handling, KeyMsg, Msg, Path, Payload};
use crate::panel::{KeyBinding, KeyDef, Node, Update};
use anyhow::{Context, Result};
use crossterm::event::{KeyEvent, KeyEventKind};
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::Interval;

/// Upper bound on messages processed for a single input before the rest is dropped
const MAX_CASCADE: usize = 10_000;

/// Broadcast payload sent on every tick when a tick interval is configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

#[derive(Debug, Clone)]
pub struct RootOptions {
    pub workers: usize,
    pub queue_capacity: usize,
    pub tick: Option<Duration>,
    /// Focus this path right after init
    pub initial_focus: Option<Path>,
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            tick: None,
            initial_focus: None,
        }
    }
}

pub struct Root {
    tree: Box<dyn Node>,
    screen: Buffer,
    inbox_tx: mpsc::UnboundedSender<Msg>,
    inbox_rx: Option<mpsc::UnboundedReceiver<Msg>>,
    pending: Vec<Command>,
    quit_binding: KeyBinding,
    bindings: Vec<KeyBinding>,
    observer: Box<dyn Observer>,
    options: RootOptions,
    help_text: String,
    quit: bool,
    initialized: bool,
    force_redraw: bool,
    next_key_id: u64,
    last_unused_key: Option<u64>,
}

impl Root {
    pub fn new(tree: impl Node + 'static) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            tree: Box::new(tree),
            screen: Buffer::empty(Rect::default()),
            inbox_tx,
            inbox_rx: Some(inbox_rx),
            pending: Vec::new(),
            quit_binding: quit_binding(KeyDef::ctrl('c')),
            bindings: Vec::new(),
            observer: Box::new(NoopObserver),
            options: RootOptions::default(),
            help_text: String::new(),
            quit: false,
            initialized: false,
            force_redraw: true,
            next_key_id: 0,
            last_unused_key: None,
        }
    }

    pub fn with_options(mut self, options: RootOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Replace the default Ctrl+C quit key
    pub fn with_quit_key(mut self, key: KeyDef) -> Self {
        self.quit_binding = quit_binding(key);
        self
    }

    /// Root-level binding, tried after global shortcuts for unused keys
    pub fn with_key_binding(mut self, binding: KeyBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Sender for messages injected from outside the tree
    pub fn inbox(&self) -> mpsc::UnboundedSender<Msg> {
        self.inbox_tx.clone()
    }

    pub fn tree(&self) -> &dyn Node {
        self.tree.as_ref()
    }

    pub fn screen(&self) -> &Buffer {
        &self.screen
    }

    /// Help text of the most recently focused panel
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Commands collected since the last call; `run` submits these itself
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }

    /// Assign paths, initialise the tree and apply the initial focus
    pub fn init(&mut self) -> Result<()> {
        self.tree.set_path(&[]);
        let update = self.tree.init().context("Failed to initialise panel tree")?;
        self.initialized = true;
        self.apply(update);
        if let Some(path) = self.options.initial_focus.clone() {
            self.handle_message(Msg::focus(path));
        }
        tracing::info!(root = %self.tree.name(), "panel tree initialised");
        Ok(())
    }

    /// Process `msg` and everything it cascades into
    pub fn handle_message(&mut self, msg: Msg) {
        self.dispatch(VecDeque::from([msg]));
    }

    pub fn handle_event(&mut self, event: RawEvent) {
        match event {
            RawEvent::Key(key) => self.handle_key(key),
            RawEvent::Resize(width, height) => self.resize(width, height),
        }
    }

    /// Wrap a raw key and send it down the focus chain
    pub fn handle_key(&mut self, event: KeyEvent) {
        if !matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
            return;
        }
        self.next_key_id += 1;
        let key = KeyMsg::new(event, self.next_key_id);

        // Quit and overriding root bindings win before the tree sees anything
        let overriding = std::iter::once(&self.quit_binding)
            .chain(self.bindings.iter().filter(|kb| kb.overrides))
            .find(|kb| kb.matches(&event))
            .cloned();
        if let Some(binding) = overriding {
            if key.claim() {
                self.apply(binding.fire());
                return;
            }
        }

        self.handle_message(Msg::Key(key.clone()));
        if !key.is_used() && self.last_unused_key != Some(key.id) {
            self.handle_message(Msg::KeyUnused(key));
        }
    }

    /// Resize the retained screen and lay the tree out again
    pub fn resize(&mut self, width: u16, height: u16) {
        let area = Rect::new(0, 0, width, height);
        tracing::debug!(width, height, "resize");
        self.screen = Buffer::empty(area);
        let update = self.tree.handle_size(area);
        self.force_redraw = true;
        self.apply(update);
    }

    /// Redraw the tree into the retained screen; `true` if anything changed
    pub fn draw(&mut self) -> bool {
        let force = std::mem::take(&mut self.force_redraw);
        if force {
            self.screen.reset();
        }
        let started = Instant::now();
        let changed = self.tree.draw(&mut self.screen, force);
        if changed {
            self.observer.frame_drawn(started.elapsed());
        }
        changed
    }

    /// Drive the tree until `Quit` or until `events` ends
    pub async fn run<B, E>(&mut self, terminal: &mut Terminal<B>, events: &mut E) -> Result<()>
    where
        B: Backend,
        E: EventSource,
    {
        let mut inbox = self
            .inbox_rx
            .take()
            .context("Root event loop is already running")?;
        let mut queue = CommandQueue::start(
            self.options.workers,
            self.options.queue_capacity,
            self.inbox_tx.clone(),
        );

        let result = self.event_loop(terminal, events, &mut inbox, &queue).await;

        queue.shutdown();
        self.inbox_rx = Some(inbox);
        tracing::info!(quit = self.quit, "event loop finished");
        result
    }

    async fn event_loop<B, E>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &mut E,
        inbox: &mut mpsc::UnboundedReceiver<Msg>,
        queue: &CommandQueue,
    ) -> Result<()>
    where
        B: Backend,
        E: EventSource,
    {
        if !self.initialized {
            self.init()?;
        }
        let size = terminal.size().context("Failed to read terminal size")?;
        self.resize(size.width, size.height);

        let mut ticker = self.options.tick.map(tokio::time::interval);

        loop {
            for command in self.take_commands() {
                queue.submit(command).await;
            }
            if self.quit {
                break;
            }

            if self.draw() {
                let screen = &self.screen;
                terminal
                    .draw(|frame| frame.buffer_mut().merge(screen))
                    .context("Failed to draw frame")?;
            }

            tokio::select! {
                event = events.next_event() => match event.context("Terminal event stream failed")? {
                    Some(event) => self.handle_event(event),
                    None => {
                        tracing::info!("event source closed");
                        break;
                    }
                },
                Some(msg) = inbox.recv() => self.handle_message(msg),
                _ = next_tick(&mut ticker) => {
                    self.handle_message(Msg::Broadcast(Payload::new(Tick)));
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, update: Update) {
        self.pending.extend(update.cmds);
        if !update.up.is_empty() {
            self.dispatch(update.up.into());
        }
    }

    fn dispatch(&mut self, mut queue: VecDeque<Msg>) {
        let mut processed = 0usize;
        while let Some(msg) = queue.pop_front() {
            processed += 1;
            if processed > MAX_CASCADE {
                tracing::warn!(dropped = queue.len() + 1, "message cascade limit reached");
                break;
            }

            self.observer.message(&msg);
            let update = match classify(&msg) {
                Handling::Request => self.handle_request(msg),
                Handling::Untyped => {
                    tracing::trace!(kind = msg.kind(), "untyped message reached root");
                    Update::none()
                }
                Handling::FocusPropagated | Handling::Routed(_) | Handling::Broadcast => {
                    self.tree.handle_message(&msg)
                }
            };
            self.pending.extend(update.cmds);
            queue.extend(update.up);
        }
    }

    fn handle_request(&mut self, msg: Msg) -> Update {
        match msg {
            Msg::FocusRequest(request) if request.relation.is_directional() => {
                tracing::trace!(path = ?request.path, relation = ?request.relation, "unresolved directional focus request");
                Update::none()
            }
            Msg::FocusRequest(request) => {
                let mut update = self.tree.handle_message(&Msg::FocusRevoke);
                update.merge(self.tree.handle_message(&Msg::FocusGrant(FocusGrant {
                    path: request.path.clone(),
                })));
                self.observer.focus_granted(&request.path);
                update
            }
            Msg::ContextualHelp(text) => {
                self.help_text = text.clone();
                self.tree.handle_message(&Msg::HelpText(text))
            }
            Msg::KeyUnused(key) => self.handle_unused_key(key),
            Msg::Quit => {
                tracing::info!("quit requested");
                self.quit = true;
                Update::none()
            }
            other => {
                tracing::trace!(kind = other.kind(), "not a request");
                Update::none()
            }
        }
    }

    /// Local shortcuts of visible panels first, then global shortcuts, then
    /// root bindings
    fn handle_unused_key(&mut self, key: KeyMsg) -> Update {
        if self.last_unused_key == Some(key.id) || key.is_used() {
            return Update::none();
        }
        self.last_unused_key = Some(key.id);

        let mut update = self.tree.handle_message(&Msg::LocalShortcut {
            path: Vec::new(),
            key: key.clone(),
        });
        if key.is_used() {
            return update;
        }

        update.merge(self.tree.handle_message(&Msg::GlobalShortcut(key.clone())));
        if key.is_used() {
            return update;
        }

        let binding = self
            .bindings
            .iter()
            .find(|kb| !kb.overrides && kb.matches(&key.event))
            .cloned();
        if let Some(binding) = binding {
            if key.claim() {
                update.merge(binding.fire());
                return update;
            }
        }

        self.observer.key_unused(&key);
        update
    }
}

fn quit_binding(key: KeyDef) -> KeyBinding {
    KeyBinding::key(key)
        .overriding()
        .with_help("quit", "Exit the application")
        .on(|| Update::up(Msg::Quit))
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
