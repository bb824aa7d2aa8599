//! Command worker pool
//!
//! Commands are flattened into tasks and pushed onto a bounded queue. A fixed
//! number of workers pull from it, run each task to completion and forward the
//! resulting message to the control task's inbox.

use crate::msg::{Command, Msg, Task};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

pub struct CommandQueue {
    tx: Option<mpsc::Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
}

impl CommandQueue {
    /// Spawn `workers` tasks draining a queue of `capacity` slots
    pub fn start(workers: usize, capacity: usize, inbox: mpsc::UnboundedSender<Msg>) -> Self {
        let (tx, rx) = mpsc::channel::<Task>(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..workers.max(1))
            .map(|id| tokio::spawn(worker_loop(id, Arc::clone(&rx), inbox.clone())))
            .collect();

        Self { tx: Some(tx), workers }
    }

    /// Enqueue every task of `command`, waiting while the queue is full
    pub async fn submit(&self, command: Command) {
        let Some(tx) = &self.tx else {
            tracing::warn!("command submitted after shutdown");
            return;
        };
        for task in command.flatten() {
            if tx.send(task).await.is_err() {
                tracing::warn!("command queue closed, dropping task");
                return;
            }
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting work; workers exit once the queue drains
    pub fn shutdown(&mut self) {
        self.tx = None;
    }

    /// Shut down and wait for in-flight tasks to finish
    pub async fn join(mut self) {
        self.shutdown();
        for worker in std::mem::take(&mut self.workers) {
            if let Err(e) = worker.await {
                tracing::warn!("command worker ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for CommandQueue {
    fn drop(&mut self) {
        // Tasks still pending (timers, long-running work) die with the queue
        for worker in &self.workers {
            worker.abort();
        }
    }
}

async fn worker_loop(id: usize, rx: Arc<Mutex<mpsc::Receiver<Task>>>, inbox: mpsc::UnboundedSender<Msg>) {
    tracing::trace!(worker = id, "command worker started");
    loop {
        // Hold the lock only while waiting for the next task
        let task = {
            let mut rx = rx.lock().await;
            rx.recv().await
        };
        let Some(task) = task else {
            break;
        };
        if let Some(msg) = task.await {
            if inbox.send(msg).is_err() {
                tracing::debug!(worker = id, "inbox closed, stopping worker");
                break;
            }
        }
    }
    tracing::trace!(worker = id, "command worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
    struct Done(u32);

    #[tokio::test]
    async fn batched_commands_all_reach_the_inbox() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let queue = CommandQueue::start(3, 2, tx);
        assert_eq!(queue.worker_count(), 3);

        let command = Command::batch([
            Command::message(Msg::custom(Done(1))),
            Command::batch([
                Command::message(Msg::custom(Done(2))),
                Command::message(Msg::custom(Done(3))),
            ]),
            Command::perform(async { None }),
            Command::message(Msg::custom(Done(4))),
        ]);
        queue.submit(command).await;

        let mut seen = HashSet::new();
        for _ in 0..4 {
            let msg = rx.recv().await.expect("message");
            let done = msg.payload().and_then(|p| p.downcast_ref::<Done>()).copied();
            seen.insert(done.expect("Done payload"));
        }
        assert_eq!(seen, (1..=4).map(Done).collect::<HashSet<_>>());

        queue.join().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut queue = CommandQueue::start(1, 1, tx);
        queue.shutdown();
        queue.submit(Command::quit()).await;
        queue.join().await;
        assert!(rx.try_recv().is_err());
    }
}
