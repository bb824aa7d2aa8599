//! Deferred work
//!
//! A [`Command`] is a future that eventually yields at most one message. Panels
//! return commands from their handlers; the root flattens them and hands each
//! task to the worker pool. The resulting message re-enters the tree on the
//! control task.

use super::{classify, Handling, Msg, Path};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A single unit of queued work
pub type Task = Pin<Box<dyn Future<Output = Option<Msg>> + Send + 'static>>;

pub enum Command {
    Task(Task),
    Batch(Vec<Command>),
}

impl Command {
    /// Run `future` on a worker; its output (if any) is delivered to the root
    pub fn perform<F>(future: F) -> Self
    where
        F: Future<Output = Option<Msg>> + Send + 'static,
    {
        Command::Task(Box::pin(future))
    }

    /// Deliver `msg` on a later control-task cycle
    pub fn message(msg: Msg) -> Self {
        Command::perform(async move { Some(msg) })
    }

    pub fn quit() -> Self {
        Command::message(Msg::Quit)
    }

    pub fn batch(commands: impl IntoIterator<Item = Command>) -> Self {
        Command::Batch(commands.into_iter().collect())
    }

    /// Rewrite the eventual message of every task in this command
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Msg) -> Msg + Send + Sync + 'static,
    {
        self.map_shared(Arc::new(f))
    }

    fn map_shared(self, f: Arc<dyn Fn(Msg) -> Msg + Send + Sync>) -> Self {
        match self {
            Command::Task(task) => Command::perform(async move { task.await.map(|msg| f(msg)) }),
            Command::Batch(commands) => Command::Batch(
                commands
                    .into_iter()
                    .map(|c| c.map_shared(Arc::clone(&f)))
                    .collect(),
            ),
        }
    }

    /// Send untyped results back to the panel at `path`
    ///
    /// Protocol messages pass through unchanged; a `Custom` payload becomes a
    /// `Routed` message addressed to `path`.
    pub fn route_to(self, path: Path) -> Self {
        self.map(move |msg| match classify(&msg) {
            Handling::Untyped => match msg {
                Msg::Custom(payload) => Msg::Routed {
                    path: path.clone(),
                    payload,
                },
                other => other,
            },
            _ => msg,
        })
    }

    /// Flatten nested batches into individual tasks
    pub fn flatten(self) -> Vec<Task> {
        let mut tasks = Vec::new();
        self.flatten_into(&mut tasks);
        tasks
    }

    fn flatten_into(self, tasks: &mut Vec<Task>) {
        match self {
            Command::Task(task) => tasks.push(task),
            Command::Batch(commands) => {
                for command in commands {
                    command.flatten_into(tasks);
                }
            }
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Task(_) => f.write_str("Task"),
            Command::Batch(commands) => f.debug_list().entries(commands).finish(),
        }
    }
}
