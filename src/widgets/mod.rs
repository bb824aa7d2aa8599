//! Widgets used by the demo binary
//!
//! Small, self-contained [`Widget`](crate::panel::Widget) implementations.
//! Each owns its state and only talks to the tree through messages.

mod logs;
mod scroll;
mod status;
mod tabs;
mod text;

pub use logs::{format_log_entry, LogView};
pub use scroll::ScrollState;
pub use status::{format_uptime, StatusLine};
pub use tabs::TabStrip;
pub use text::TextView;
