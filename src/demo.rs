// Demo layout: a small panel application showing the toolkit end to end
//
// ┌ header ─────────────────────────────────────────────────────────┐
// │ nav (24) │ tab strip                          │ logs (35%, ≤60)  │
// │          │ stacked pages: overview/layout/keys │                  │
// └ status ─────────────────────────────────────────────────────────┘
//
// Focus moves with Tab (ring), Ctrl-N/Ctrl-P (movement graph), arrows
// (resolved by the nearest matching container) and F1-F3 (global shortcuts).

use crate::config::Config;
use crate::layout::Dimension;
use crate::logging::{LogBuffer, TracingObserver};
use crate::movement::{FocusRing, MovementGraph, MovementNode, Selector};
use crate::msg::Msg;
use crate::panel::{Container, KeyBinding, KeyDef, Movement, Panel, PanelStyle, Update};
use crate::runtime::{Root, RootOptions};
use crate::widgets::{LogView, StatusLine, TabStrip, TextView};
use crossterm::event::KeyCode;

pub const PAGES: &str = "pages";

const NAV_TEXT: &str = "\
Tab      next panel
C-n/C-p  movement graph
arrows   neighbour panel
F1/F2/F3 nav/pages/logs
1-3 [ ]  switch page
j/k      scroll
q, C-c   quit";

const OVERVIEW_TEXT: &str = "\
Panels form a tree of containers and leaves.

Keys travel down the focus chain; whatever a panel
leaves unclaimed travels back up to the root, which
offers it to global shortcuts and its own bindings.

Focus requests go to the root, which revokes focus
everywhere and grants it to exactly one path.";

/// Leaf handles the demo wires focus movement to
pub struct DemoPanels {
    pub nav: Panel,
    pub strip: Panel,
    pub pages: Vec<Panel>,
    pub logs: Panel,
}

fn panels(logs: LogBuffer) -> DemoPanels {
    let boxed = PanelStyle::bordered();

    let nav = Panel::new("nav", TextView::new(NAV_TEXT))
        .with_title("keys")
        .with_style(boxed)
        .with_help("nav: Tab or arrows to move on")
        .with_global_shortcut(KeyDef::from(KeyCode::F(1)))
        .with_movement(Movement::both());

    let strip = Panel::new("tabs", TabStrip::new(PAGES, ["overview", "layout", "about"]))
        .with_help("tabs: 1-3 or [ ] switch page")
        .with_movement(Movement::both());

    let pages = vec![
        Panel::new("overview", TextView::new(OVERVIEW_TEXT))
            .with_title("overview")
            .with_style(boxed)
            .with_help("overview: j/k scroll")
            .with_global_shortcut(KeyDef::from(KeyCode::F(2)))
            .with_movement(Movement::both()),
        Panel::new("layout", TextView::new(layout_text()))
            .with_title("layout")
            .with_style(boxed)
            .with_help("layout: j/k scroll")
            .with_movement(Movement::both()),
        Panel::new("about", TextView::new(about_text()))
            .with_title("about")
            .with_style(boxed)
            .with_help("about: j/k scroll")
            .with_movement(Movement::both()),
    ];

    let logs = Panel::new("logs", LogView::new(logs))
        .with_title("logs")
        .with_style(boxed)
        .with_help("logs: j/k scroll, f follow")
        .with_global_shortcut(KeyDef::from(KeyCode::F(3)))
        .with_movement(Movement::both());

    DemoPanels {
        nav,
        strip,
        pages,
        logs,
    }
}

fn layout_text() -> String {
    let body = [
        Dimension::fixed(24),
        Dimension::unspecified(),
        Dimension::ratio(0.35).with_max(60),
    ];
    let mut text = String::from("body (horizontal):\n");
    for d in body {
        text.push_str(&format!("  {}\n", d));
    }
    text.push_str("\nAt most one child may be unspecified;\nit receives the remainder.");
    text
}

fn about_text() -> String {
    format!(
        "panelkit {}\n\nConfig: {}",
        crate::config::VERSION,
        Config::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(no home directory)".to_string())
    )
}

/// Wire Tab, Ctrl-N/Ctrl-P onto the demo panels
fn bind_movement(panels: &DemoPanels) {
    let page_handles: Vec<_> = panels.pages.iter().map(Panel::handle).collect();

    let graph = MovementGraph::new(Selector::looping([
        MovementNode::sequence([panels.nav.handle(), panels.strip.handle()]),
        Selector::visible(
            page_handles
                .iter()
                .cloned()
                .map(|h| MovementNode::sequence([h])),
        )
        .into(),
        MovementNode::sequence([panels.logs.handle()]),
    ]));
    graph.bind(
        Some(KeyBinding::key(KeyDef::ctrl('n')).with_help("next", "Next panel in the graph")),
        Some(KeyBinding::key(KeyDef::ctrl('p')).with_help("prev", "Previous panel in the graph")),
    );

    let ring = FocusRing::new();
    ring.attach(&panels.nav.handle());
    ring.attach(&panels.strip.handle());
    for handle in &page_handles {
        ring.attach(handle);
    }
    ring.attach(&panels.logs.handle());
}

/// The demo panel tree
pub fn demo_tree(logs: LogBuffer) -> Container {
    let panels = panels(logs);
    bind_movement(&panels);
    let DemoPanels {
        nav,
        strip,
        pages,
        logs,
    } = panels;

    let mut stacked = Container::stacked(PAGES);
    for page in pages {
        stacked = stacked.with_tab(page);
    }

    let main = Container::vertical("main")
        .with_child(strip, Dimension::fixed(1))
        .with_child(stacked, Dimension::unspecified());

    let body = Container::horizontal("body")
        .with_child(nav, Dimension::fixed(24))
        .with_child(main, Dimension::unspecified())
        .with_child(logs, Dimension::ratio(0.35).with_max(60));

    let header = Panel::new(
        "header",
        TextView::new(format!("panelkit {} - composable terminal panels", crate::config::VERSION)),
    );

    Container::vertical("root")
        .with_child(header, Dimension::fixed(1))
        .with_child(body, Dimension::unspecified())
        .with_child(Panel::new("status", StatusLine::new()), Dimension::fixed(1))
}

/// Root controller for the demo, configured from `config`
pub fn demo_root(config: &Config, logs: LogBuffer) -> Root {
    let options = RootOptions {
        workers: config.workers,
        queue_capacity: config.queue_capacity,
        tick: config.tick(),
        initial_focus: Some(vec![1, 0]),
    };
    Root::new(demo_tree(logs))
        .with_options(options)
        .with_observer(TracingObserver::new())
        .with_key_binding(
            KeyBinding::key(KeyDef::char('q'))
                .with_help("quit", "Exit the demo")
                .on(|| Update::up(Msg::Quit)),
        )
}
