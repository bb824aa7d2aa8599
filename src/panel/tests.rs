//! Tree-level tests: paths, routing, focus and layout working together

use super::*;
use crate::layout::Dimension;
use crate::msg::{FocusGrant, FocusRequest, KeyMsg, Payload, Relation};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<(String, String)>>>;

// ─────────────────────────────────────────────────────────────────────────────
// Fixtures
// ─────────────────────────────────────────────────────────────────────────────

struct Probe {
    name: String,
    log: Log,
    fill: char,
}

impl Widget for Probe {
    fn update(&mut self, msg: &Msg) -> Update {
        self.log
            .borrow_mut()
            .push((self.name.clone(), msg.kind().to_string()));
        Update::none()
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, _ctx: &RenderContext) {
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                buf[(x, y)].set_char(self.fill);
            }
        }
    }
}

fn leaf(name: &str, log: &Log) -> Panel {
    leaf_with_fill(name, log, name.chars().next().unwrap_or('?'))
}

fn leaf_with_fill(name: &str, log: &Log, fill: char) -> Panel {
    Panel::new(
        name,
        Probe {
            name: name.to_string(),
            log: log.clone(),
            fill,
        },
    )
}

/// ```text
/// root (vertical)
/// ├── a                [0]
/// └── row (horizontal) [1]
///     ├── b            [1,0]
///     └── tabs (stacked) [1,1]
///         ├── c        [1,1,0]
///         └── d        [1,1,1]
/// ```
fn sample_tree(log: &Log) -> Container {
    let tabs = Container::stacked("tabs")
        .with_tab(leaf("c", log))
        .with_tab(leaf("d", log));
    let row = Container::horizontal("row")
        .with_child(leaf("b", log), Dimension::fixed(4))
        .with_child(tabs, Dimension::unspecified());
    Container::vertical("root")
        .with_child(leaf("a", log), Dimension::fixed(1))
        .with_child(row, Dimension::unspecified())
}

fn init(mut root: Container) -> Container {
    root.set_path(&[]);
    root.init().unwrap();
    root
}

fn handles(root: &Container) -> Vec<PanelHandle> {
    let mut out = Vec::new();
    root.collect_handles(&mut out);
    out
}

fn focused_names(root: &Container) -> Vec<String> {
    handles(root)
        .into_iter()
        .filter(|h| h.is_focused())
        .map(|h| h.name().to_string())
        .collect()
}

fn grant(root: &mut Container, path: Vec<usize>) -> Update {
    let mut update = root.handle_message(&Msg::FocusRevoke);
    update.merge(root.handle_message(&Msg::FocusGrant(FocusGrant { path })));
    update
}

fn key(code: KeyCode) -> KeyMsg {
    KeyMsg::new(KeyEvent::new(code, KeyModifiers::NONE), 7)
}

// ─────────────────────────────────────────────────────────────────────────────
// Paths
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn paths_extend_parent_path_by_child_index() {
    let log = Log::default();
    let root = init(sample_tree(&log));

    let paths: Vec<(String, Vec<usize>)> = handles(&root)
        .iter()
        .map(|h| (h.name().to_string(), h.path()))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("a".to_string(), vec![0]),
            ("b".to_string(), vec![1, 0]),
            ("c".to_string(), vec![1, 1, 0]),
            ("d".to_string(), vec![1, 1, 1]),
        ]
    );

    let row = root.child(1).unwrap();
    assert_eq!(row.path(), &[1]);
}

#[test]
fn push_and_remove_reassign_paths() {
    let log = Log::default();
    let mut row = Container::horizontal("row")
        .with_child(leaf("x", &log), Dimension::fixed(2))
        .with_child(leaf("y", &log), Dimension::unspecified());
    row.set_path(&[3]);

    row.push(Box::new(leaf("z", &log)), Dimension::fixed(1));
    assert_eq!(row.child(2).unwrap().path(), &[3, 2]);

    let removed = row.remove(0).unwrap();
    assert_eq!(removed.name(), "x");
    assert_eq!(row.child(0).unwrap().path(), &[3, 0]);
    assert_eq!(row.child(1).unwrap().path(), &[3, 1]);
    assert!(row.remove(5).is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Routing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn routed_message_reaches_exactly_one_node() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));

    for (target, name) in [
        (vec![0], "a"),
        (vec![1, 0], "b"),
        (vec![1, 1, 0], "c"),
        (vec![1, 1, 1], "d"),
    ] {
        log.borrow_mut().clear();
        root.handle_message(&Msg::Routed {
            path: target,
            payload: Payload::new(()),
        });
        assert_eq!(
            log.borrow().as_slice(),
            [(name.to_string(), "Routed".to_string())]
        );
    }
}

#[test]
fn out_of_range_route_is_a_no_op() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));

    let update = root.handle_message(&Msg::Routed {
        path: vec![1, 9],
        payload: Payload::new(()),
    });
    assert!(update.is_empty());
    assert!(log.borrow().is_empty());
}

#[test]
fn broadcast_reaches_every_leaf() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));

    root.handle_message(&Msg::Broadcast(Payload::new(1u8)));
    let names: Vec<String> = log.borrow().iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}

#[test]
fn requests_and_untyped_are_not_delivered() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));

    root.handle_message(&Msg::Quit);
    root.handle_message(&Msg::custom(()));
    assert!(log.borrow().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Focus
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn focus_is_exclusive_across_grants() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));

    grant(&mut root, vec![0]);
    assert_eq!(focused_names(&root), vec!["a"]);

    grant(&mut root, vec![1, 0]);
    assert_eq!(focused_names(&root), vec!["b"]);
    assert!(root.is_focused());
    assert!(root.child(1).unwrap().is_focused());
    assert!(!root.child(0).unwrap().is_focused());
}

#[test]
fn grant_at_container_goes_to_first_or_selected_child() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));

    grant(&mut root, vec![1]);
    assert_eq!(focused_names(&root), vec!["b"]);

    grant(&mut root, vec![1, 1]);
    assert_eq!(focused_names(&root), vec!["c"]);

    // empty path is a broadcast grant for the root itself
    grant(&mut root, vec![]);
    assert_eq!(focused_names(&root), vec!["a"]);
}

#[test]
fn holding_container_keeps_focus_and_resolves_own_bindings() {
    let log = Log::default();
    let list = Container::horizontal("list")
        .with_focus_mode(FocusMode::Hold)
        .with_key_binding(KeyBinding::key(KeyCode::Enter).on(|| Update::up(Msg::Quit)))
        .with_child(leaf("p", &log), Dimension::unspecified());
    let mut root = init(Container::vertical("root").with_child(list, Dimension::unspecified()));

    grant(&mut root, vec![0]);
    assert!(root.child(0).unwrap().is_focused());
    assert!(focused_names(&root).is_empty());

    let update = root.handle_message(&Msg::Key(key(KeyCode::Enter)));
    assert!(matches!(update.up.as_slice(), [Msg::Quit]));
    assert!(log.borrow().is_empty(), "children never see the key");

    let update = root.handle_message(&Msg::Key(key(KeyCode::Char('z'))));
    assert!(matches!(update.up.as_slice(), [Msg::KeyUnused(_)]));

    root.handle_message(&Msg::FocusRevoke);
    assert!(!root.is_focused());
}

#[test]
fn keys_follow_the_focused_chain_only() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));
    grant(&mut root, vec![1, 1, 0]);
    log.borrow_mut().clear();

    root.handle_message(&Msg::Key(key(KeyCode::Char('k'))));
    assert_eq!(
        log.borrow().as_slice(),
        [("c".to_string(), "Key".to_string())]
    );
}

#[test]
fn keys_without_focus_go_nowhere() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));
    let update = root.handle_message(&Msg::Key(key(KeyCode::Char('k'))));
    assert!(update.is_empty());
    assert!(log.borrow().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Directional movement
// ─────────────────────────────────────────────────────────────────────────────

fn movable_row(log: &Log) -> Container {
    let cell = |name: &str| leaf(name, log).with_movement(Movement::both());
    let column = Container::vertical("col")
        .with_child(cell("m"), Dimension::fixed(1))
        .with_child(cell("n"), Dimension::unspecified());
    Container::horizontal("row")
        .with_child(cell("l"), Dimension::fixed(3))
        .with_child(column, Dimension::unspecified())
        .with_child(cell("r"), Dimension::fixed(3))
}

fn request_of(update: &Update) -> &FocusRequest {
    match update.up.as_slice() {
        [Msg::FocusRequest(req)] => req,
        other => panic!("expected one focus request, got {other:?}"),
    }
}

#[test]
fn matching_ancestor_resolves_direction_with_wrap() {
    let log = Log::default();
    let mut root = init(movable_row(&log));

    grant(&mut root, vec![2]);
    let update = root.handle_message(&Msg::Key(key(KeyCode::Right)));
    assert_eq!(request_of(&update), &FocusRequest::to(vec![0]));

    let update = root.handle_message(&Msg::Key(key(KeyCode::Left)));
    assert_eq!(request_of(&update), &FocusRequest::to(vec![1]));
}

#[test]
fn nested_container_resolves_its_own_axis() {
    let log = Log::default();
    let mut root = init(movable_row(&log));

    grant(&mut root, vec![1, 0]);
    let update = root.handle_message(&Msg::Key(key(KeyCode::Down)));
    assert_eq!(request_of(&update), &FocusRequest::to(vec![1, 1]));

    // horizontal move from inside the column is resolved by the row
    let update = root.handle_message(&Msg::Key(key(KeyCode::Right)));
    assert_eq!(request_of(&update), &FocusRequest::to(vec![2]));
}

#[test]
fn unmatched_direction_reaches_the_top_unresolved() {
    let log = Log::default();
    let mut root = init(movable_row(&log));

    grant(&mut root, vec![0]);
    let update = root.handle_message(&Msg::Key(key(KeyCode::Up)));
    let req = request_of(&update);
    assert_eq!(req.relation, Relation::Up);
    assert_eq!(req.path, vec![0]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tabs
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn select_tab_updates_hidden_flags_and_notifies() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));
    let hs = handles(&root);
    let (c, d) = (&hs[2], &hs[3]);
    assert!(!c.is_hidden_in_tab());
    assert!(d.is_hidden_in_tab());

    let update = root.handle_message(&Msg::SelectTab {
        container: "tabs".into(),
        index: 1,
    });
    assert!(c.is_hidden_in_tab());
    assert!(!d.is_hidden_in_tab());

    let mut notified = Vec::new();
    for cmd in update.cmds {
        for task in cmd.flatten() {
            notified.push(task.await);
        }
    }
    assert!(matches!(
        notified.as_slice(),
        [Some(Msg::TabSelected { container, index: 1 })] if container == "tabs"
    ));
}

#[test]
fn select_tab_moves_focus_out_of_hidden_tab() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));
    grant(&mut root, vec![1, 1, 0]);

    let update = root.handle_message(&Msg::SelectTab {
        container: "tabs".into(),
        index: 1,
    });
    assert_eq!(request_of(&update), &FocusRequest::to(vec![1, 1, 1]));
}

#[test]
fn tabs_wrap_in_both_directions() {
    let log = Log::default();
    let mut tabs = Container::stacked("tabs")
        .with_tab(leaf("x", &log))
        .with_tab(leaf("y", &log))
        .with_tab(leaf("z", &log));
    tabs.set_path(&[]);
    tabs.init().unwrap();

    tabs.prev_tab();
    assert_eq!(tabs.selected(), 2);
    tabs.next_tab();
    assert_eq!(tabs.selected(), 0);
    assert!(tabs.select(7).is_empty());
    assert_eq!(tabs.selected(), 0);
}

#[test]
fn hiding_a_container_hides_all_its_leaves() {
    let log = Log::default();
    let inner = Container::horizontal("inner")
        .with_child(leaf("p", &log), Dimension::unspecified());
    let mut tabs = Container::stacked("tabs")
        .with_tab(leaf("q", &log))
        .with_tab(inner);
    tabs.set_path(&[]);
    tabs.init().unwrap();

    let hs = {
        let mut out = Vec::new();
        tabs.collect_handles(&mut out);
        out
    };
    assert!(!hs[0].is_hidden_in_tab());
    assert!(hs[1].is_hidden_in_tab());

    tabs.select(1);
    assert!(hs[0].is_hidden_in_tab());
    assert!(!hs[1].is_hidden_in_tab());
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout and drawing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn resize_applies_solver_to_children() {
    let log = Log::default();
    let mut row = init(
        Container::horizontal("row")
            .with_child(leaf("a", &log), Dimension::fixed(10))
            .with_child(leaf("b", &log), Dimension::unspecified())
            .with_child(leaf("c", &log), Dimension::ratio(0.5).with_max(30)),
    );
    row.handle_size(Rect::new(0, 0, 100, 5));

    let widths: Vec<u16> = (0..3).map(|i| row.child(i).unwrap().area().width).collect();
    assert_eq!(widths, vec![10, 60, 30]);
    let xs: Vec<u16> = (0..3).map(|i| row.child(i).unwrap().area().x).collect();
    assert_eq!(xs, vec![0, 10, 70]);
}

#[test]
fn stacked_children_share_the_whole_region() {
    let log = Log::default();
    let mut root = init(sample_tree(&log));
    root.handle_size(Rect::new(0, 0, 20, 6));

    let row = root.child(1).unwrap();
    assert_eq!(row.area(), Rect::new(0, 1, 20, 5));
    let hs = handles(&root);
    assert_eq!(hs.len(), 4);
}

#[test]
fn invalid_layout_fails_init_with_context() {
    let log = Log::default();
    let mut root = Container::horizontal("bad")
        .with_child(leaf("a", &log), Dimension::fixed(3))
        .with_child(leaf("b", &log), Dimension::fixed(4));
    root.set_path(&[]);

    let err = root.init().unwrap_err();
    let text = format!("{err:#}");
    assert!(text.contains("'bad'"), "{text}");
    assert!(text.contains("Fixed(3), Fixed(4)"), "{text}");
}

#[test]
fn nested_invalid_layout_reports_its_path() {
    let log = Log::default();
    let inner = Container::vertical("inner")
        .with_child(leaf("a", &log), Dimension::unspecified())
        .with_child(leaf("b", &log), Dimension::unspecified());
    let mut root = Container::horizontal("root").with_child(inner, Dimension::unspecified());
    root.set_path(&[]);

    let text = format!("{:#}", root.init().unwrap_err());
    assert!(text.contains("at path [0]"), "{text}");
}

fn row_text(buf: &Buffer, y: u16) -> String {
    (buf.area.left()..buf.area.right())
        .map(|x| buf[(x, y)].symbol().to_string())
        .collect()
}

#[test]
fn draw_composes_children_without_overlap() {
    let log = Log::default();
    let mut row = init(
        Container::horizontal("row")
            .with_child(leaf_with_fill("a", &log, 'a'), Dimension::fixed(2))
            .with_child(leaf_with_fill("b", &log, 'b'), Dimension::unspecified())
            .with_child(leaf_with_fill("c", &log, 'c'), Dimension::fixed(1)),
    );
    let area = Rect::new(0, 0, 6, 1);
    row.handle_size(area);

    let mut buf = Buffer::empty(area);
    assert!(row.draw(&mut buf, false));
    assert_eq!(row_text(&buf, 0), "aabbbc");
    assert!(!row.draw(&mut buf, false), "nothing changed");
}

#[test]
fn stacked_container_draws_selected_tab_only() {
    let log = Log::default();
    let mut tabs = init(
        Container::stacked("tabs")
            .with_tab(leaf_with_fill("x", &log, 'x'))
            .with_tab(leaf_with_fill("y", &log, 'y')),
    );
    let area = Rect::new(0, 0, 3, 1);
    tabs.handle_size(area);

    let mut buf = Buffer::empty(area);
    tabs.draw(&mut buf, false);
    assert_eq!(row_text(&buf, 0), "xxx");

    tabs.select(1);
    assert!(tabs.draw(&mut buf, false));
    assert_eq!(row_text(&buf, 0), "yyy");
}

#[test]
fn decorated_container_borders_children() {
    let log = Log::default();
    let mut boxed = init(
        Container::horizontal("boxed")
            .with_style(PanelStyle::bordered().with_border_type(ratatui::widgets::BorderType::Plain))
            .with_child(leaf_with_fill("a", &log, 'a'), Dimension::unspecified()),
    );
    let area = Rect::new(0, 0, 4, 3);
    boxed.handle_size(area);

    let mut buf = Buffer::empty(area);
    boxed.draw(&mut buf, true);
    assert_eq!(row_text(&buf, 0), "┌──┐");
    assert_eq!(row_text(&buf, 1), "│aa│");
    assert_eq!(row_text(&buf, 2), "└──┘");
}
