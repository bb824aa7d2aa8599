//! Runtime observation hooks
//!
//! The root calls these at fixed points of the message cycle. Every method
//! has a no-op default so an observer only implements what it cares about.

use crate::msg::{KeyMsg, Msg};
use std::time::Duration;

pub trait Observer {
    /// Every message the root dispatches, before delivery
    fn message(&mut self, _msg: &Msg) {}

    /// Focus landed on `path`
    fn focus_granted(&mut self, _path: &[usize]) {}

    /// A key nobody claimed, including the root's own bindings
    fn key_unused(&mut self, _key: &KeyMsg) {}

    /// A frame was composed; `elapsed` covers the tree's draw pass
    fn frame_drawn(&mut self, _elapsed: Duration) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Emits tracing events for every hook
#[derive(Debug, Default)]
pub struct TracingObserver {
    frames: u64,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Observer for TracingObserver {
    fn message(&mut self, msg: &Msg) {
        tracing::trace!(kind = msg.kind(), "dispatch");
    }

    fn focus_granted(&mut self, path: &[usize]) {
        tracing::debug!(?path, "focus granted");
    }

    fn key_unused(&mut self, key: &KeyMsg) {
        tracing::debug!(
            code = ?key.event.code,
            modifiers = ?key.event.modifiers,
            latency_us = key.received_at.elapsed().as_micros() as u64,
            "key unused"
        );
    }

    fn frame_drawn(&mut self, elapsed: Duration) {
        self.frames += 1;
        tracing::trace!(frame = self.frames, elapsed_us = elapsed.as_micros() as u64, "frame");
    }
}
