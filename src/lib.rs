//! panelkit - composable terminal panels
//!
//! A tree of rectangular panels laid out horizontally, vertically or stacked
//! as tabs. Panels own keyboard focus, handle resize and exchange typed
//! messages with siblings, ancestors and a root controller.
//!
//! - [`msg`] - messages, routing categories and deferred commands
//! - [`layout`] - dimension constraints and the layout solver
//! - [`panel`] - containers, leaf panels, key bindings
//! - [`movement`] - focus movement graphs and the Tab focus ring
//! - [`runtime`] - the root controller, command workers, event sources
//!
//! Ambient pieces used by the demo binary: [`config`], [`logging`], [`cli`],
//! [`widgets`] and [`demo`].

pub mod cli;
pub mod config;
pub mod demo;
pub mod layout;
pub mod logging;
pub mod movement;
pub mod msg;
pub mod panel;
pub mod runtime;
pub mod widgets;
