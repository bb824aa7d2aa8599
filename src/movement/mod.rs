//! Focus movement graphs
//!
//! A graph describes keyboard traversal over leaf panels independently of
//! where they sit in the tree:
//!
//! ```text
//! Selector (sequential, looping)
//! ├── Sequence [A, B]
//! └── Sequence [C, D]
//!
//! next: A → B → C → D → A        previous: the reverse
//! ```
//!
//! - [`Sequence`] - ordered panels, no wraparound at its edges
//! - [`Selector`] - ordered sub-graphs; optionally chains across them
//!   (`sequential`) and wraps at the ends (`looping`). A non-sequential
//!   selector picks its first/last entry with a [`PickPolicy`], by default
//!   the first candidate not hidden behind a tab.
//!
//! [`MovementGraph::bind`] installs a binding on every panel of the graph. The
//! destination is resolved when the key fires, so tab switches made after the
//! graph was built are respected.

mod ring;

pub use ring::FocusRing;

use crate::panel::{KeyBinding, PanelHandle, Update};
use std::rc::Rc;

/// Chooses one panel among equally-first (or equally-last) candidates
pub type PickPolicy = fn(&[PanelHandle]) -> Option<PanelHandle>;

/// First candidate not hidden behind a tab
pub fn visible_pick(candidates: &[PanelHandle]) -> Option<PanelHandle> {
    candidates.iter().find(|p| !p.is_hidden_in_tab()).cloned()
}

#[derive(Debug, Clone)]
pub struct Sequence {
    panels: Vec<PanelHandle>,
}

impl Sequence {
    pub fn new(panels: impl IntoIterator<Item = PanelHandle>) -> Self {
        Self {
            panels: panels.into_iter().collect(),
        }
    }

    fn position(&self, panel: &PanelHandle) -> Option<usize> {
        self.panels.iter().position(|p| p == panel)
    }

    fn next(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        let index = self.position(panel)?;
        self.panels.get(index + 1).cloned()
    }

    fn previous(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        let index = self.position(panel)?;
        index.checked_sub(1).and_then(|i| self.panels.get(i)).cloned()
    }
}

#[derive(Clone)]
pub struct Selector {
    chains: Vec<MovementNode>,
    sequential: bool,
    looping: bool,
    pick: PickPolicy,
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("chains", &self.chains)
            .field("sequential", &self.sequential)
            .field("looping", &self.looping)
            .finish_non_exhaustive()
    }
}

impl Selector {
    /// Sequential and looping: next/previous walk every chain and wrap
    pub fn looping(chains: impl IntoIterator<Item = MovementNode>) -> Self {
        Self {
            sequential: true,
            looping: true,
            ..Self::visible(chains)
        }
    }

    /// Chains stay separate; first/last pick the first visible candidate
    pub fn visible(chains: impl IntoIterator<Item = MovementNode>) -> Self {
        Self {
            chains: chains.into_iter().collect(),
            sequential: false,
            looping: false,
            pick: visible_pick,
        }
    }

    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_pick(mut self, pick: PickPolicy) -> Self {
        self.pick = pick;
        self
    }

    fn chain_of(&self, panel: &PanelHandle) -> Option<usize> {
        self.chains.iter().position(|c| c.contains(panel))
    }

    fn next(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        let index = self.chain_of(panel)?;
        if let Some(next) = self.chains[index].next(panel) {
            return Some(next);
        }
        if !self.sequential {
            return None;
        }
        match self.chains.get(index + 1) {
            Some(chain) => chain.first(),
            None if self.looping => self.first(),
            None => None,
        }
    }

    fn previous(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        let index = self.chain_of(panel)?;
        if let Some(previous) = self.chains[index].previous(panel) {
            return Some(previous);
        }
        if !self.sequential {
            return None;
        }
        match index.checked_sub(1) {
            Some(i) => self.chains[i].last(),
            None if self.looping => self.last(),
            None => None,
        }
    }

    fn first(&self) -> Option<PanelHandle> {
        if self.sequential {
            return self.chains.first()?.first();
        }
        let candidates: Vec<PanelHandle> = self.chains.iter().filter_map(|c| c.first()).collect();
        (self.pick)(&candidates)
    }

    fn last(&self) -> Option<PanelHandle> {
        if self.sequential {
            return self.chains.last()?.last();
        }
        let candidates: Vec<PanelHandle> = self.chains.iter().filter_map(|c| c.last()).collect();
        (self.pick)(&candidates)
    }
}

#[derive(Debug, Clone)]
pub enum MovementNode {
    Sequence(Sequence),
    Selector(Selector),
}

impl MovementNode {
    pub fn sequence(panels: impl IntoIterator<Item = PanelHandle>) -> Self {
        MovementNode::Sequence(Sequence::new(panels))
    }

    pub fn next(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        match self {
            MovementNode::Sequence(s) => s.next(panel),
            MovementNode::Selector(s) => s.next(panel),
        }
    }

    pub fn previous(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        match self {
            MovementNode::Sequence(s) => s.previous(panel),
            MovementNode::Selector(s) => s.previous(panel),
        }
    }

    pub fn first(&self) -> Option<PanelHandle> {
        match self {
            MovementNode::Sequence(s) => s.panels.first().cloned(),
            MovementNode::Selector(s) => s.first(),
        }
    }

    pub fn last(&self) -> Option<PanelHandle> {
        match self {
            MovementNode::Sequence(s) => s.panels.last().cloned(),
            MovementNode::Selector(s) => s.last(),
        }
    }

    pub fn contains(&self, panel: &PanelHandle) -> bool {
        match self {
            MovementNode::Sequence(s) => s.panels.contains(panel),
            MovementNode::Selector(s) => s.chains.iter().any(|c| c.contains(panel)),
        }
    }

    /// Every panel, in traversal order
    pub fn panels(&self) -> Vec<PanelHandle> {
        match self {
            MovementNode::Sequence(s) => s.panels.clone(),
            MovementNode::Selector(s) => s.chains.iter().flat_map(|c| c.panels()).collect(),
        }
    }
}

impl From<Sequence> for MovementNode {
    fn from(sequence: Sequence) -> Self {
        MovementNode::Sequence(sequence)
    }
}

impl From<Selector> for MovementNode {
    fn from(selector: Selector) -> Self {
        MovementNode::Selector(selector)
    }
}

/// A movement graph shared with the bindings it installs
///
/// Installed bindings hold a reference to the graph, so it lives as long as
/// the panels it was bound to.
#[derive(Debug, Clone)]
pub struct MovementGraph {
    root: Rc<MovementNode>,
}

impl MovementGraph {
    pub fn new(root: impl Into<MovementNode>) -> Self {
        Self {
            root: Rc::new(root.into()),
        }
    }

    pub fn root(&self) -> &MovementNode {
        &self.root
    }

    pub fn next(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        self.root.next(panel)
    }

    pub fn previous(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        self.root.previous(panel)
    }

    /// Install `next`/`previous` on every panel of the graph
    ///
    /// Each copy's action asks the root to focus the destination as resolved
    /// from the whole graph at key time; at an edge without wraparound the
    /// key is consumed and nothing happens.
    pub fn bind(&self, next: Option<KeyBinding>, previous: Option<KeyBinding>) {
        for panel in self.root.panels() {
            if let Some(kb) = &next {
                panel.add_key_binding(self.edge(kb, &panel, MovementNode::next));
            }
            if let Some(kb) = &previous {
                panel.add_key_binding(self.edge(kb, &panel, MovementNode::previous));
            }
        }
        tracing::debug!(panels = self.root.panels().len(), "movement bindings installed");
    }

    fn edge(
        &self,
        template: &KeyBinding,
        from: &PanelHandle,
        step: fn(&MovementNode, &PanelHandle) -> Option<PanelHandle>,
    ) -> KeyBinding {
        let graph = Rc::clone(&self.root);
        let from = from.clone();
        template.clone().on(move || match step(&graph, &from) {
            Some(dest) => Update::up(dest.focus_request()),
            None => Update::none(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::{FocusRequest, Msg};
    use crate::panel::KeyDef;

    fn handles(names: &[&str]) -> Vec<PanelHandle> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let h = PanelHandle::new(*n);
                h.set_path(&[i]);
                h
            })
            .collect()
    }

    fn name(h: Option<PanelHandle>) -> Option<String> {
        h.map(|h| h.name().to_string())
    }

    fn two_chains(hs: &[PanelHandle]) -> [MovementNode; 2] {
        [
            MovementNode::sequence(hs[0..2].to_vec()),
            MovementNode::sequence(hs[2..4].to_vec()),
        ]
    }

    #[test]
    fn sequence_stops_at_edges() {
        let hs = handles(&["a", "b"]);
        let seq = MovementNode::sequence(hs.clone());
        assert_eq!(name(seq.next(&hs[0])), Some("b".into()));
        assert_eq!(name(seq.next(&hs[1])), None);
        assert_eq!(name(seq.previous(&hs[0])), None);
        assert_eq!(name(seq.previous(&hs[1])), Some("a".into()));
    }

    #[test]
    fn unknown_panel_has_no_neighbours() {
        let hs = handles(&["a", "b"]);
        let stranger = PanelHandle::new("x");
        let seq = MovementNode::sequence(hs);
        assert!(seq.next(&stranger).is_none());
        assert!(seq.previous(&stranger).is_none());
    }

    #[test]
    fn looping_selector_wraps() {
        let hs = handles(&["a", "b", "c", "d"]);
        let sel = MovementNode::from(Selector::looping(two_chains(&hs)));

        assert_eq!(name(sel.next(&hs[1])), Some("c".into()));
        assert_eq!(name(sel.next(&hs[3])), Some("a".into()));
        assert_eq!(name(sel.previous(&hs[0])), Some("d".into()));
        assert_eq!(name(sel.previous(&hs[2])), Some("b".into()));
    }

    #[test]
    fn sequential_selector_without_loop_stops_at_ends() {
        let hs = handles(&["a", "b", "c", "d"]);
        let sel = MovementNode::from(Selector::looping(two_chains(&hs)).with_looping(false));

        assert_eq!(name(sel.next(&hs[1])), Some("c".into()));
        assert_eq!(name(sel.next(&hs[3])), None);
        assert_eq!(name(sel.previous(&hs[0])), None);
    }

    #[test]
    fn non_sequential_selector_keeps_chains_separate() {
        let hs = handles(&["a", "b", "c", "d"]);
        let sel = MovementNode::from(Selector::visible(two_chains(&hs)));

        assert_eq!(name(sel.next(&hs[0])), Some("b".into()));
        assert_eq!(name(sel.next(&hs[1])), None);
        assert_eq!(name(sel.previous(&hs[2])), None);
    }

    #[test]
    fn visible_pick_skips_hidden_tabs() {
        let hs = handles(&["a", "b", "c", "d"]);
        let sel = MovementNode::from(Selector::visible(two_chains(&hs)));
        assert_eq!(name(sel.first()), Some("a".into()));
        assert_eq!(name(sel.last()), Some("b".into()));

        hs[0].set_hidden_in_tab(true);
        hs[1].set_hidden_in_tab(true);
        assert_eq!(name(sel.first()), Some("c".into()));
        assert_eq!(name(sel.last()), Some("d".into()));

        for h in &hs {
            h.set_hidden_in_tab(true);
        }
        assert!(sel.first().is_none());
    }

    #[test]
    fn nested_selector_over_tabs_enters_visible_tab() {
        // [x] then a tab group {[a,b] | [c,d]}, looping over both
        let hs = handles(&["x", "a", "b", "c", "d"]);
        let tabs = Selector::visible([
            MovementNode::sequence(hs[1..3].to_vec()),
            MovementNode::sequence(hs[3..5].to_vec()),
        ]);
        let graph = MovementNode::from(Selector::looping([
            MovementNode::sequence([hs[0].clone()]),
            tabs.into(),
        ]));

        hs[1].set_hidden_in_tab(true);
        hs[2].set_hidden_in_tab(true);
        assert_eq!(name(graph.next(&hs[0])), Some("c".into()));
        assert_eq!(name(graph.previous(&hs[0])), Some("d".into()));
        assert_eq!(graph.panels().len(), 5);
    }

    #[test]
    fn bind_installs_focus_bindings_resolved_at_key_time() {
        let hs = handles(&["a", "b", "c", "d"]);
        let graph = MovementGraph::new(Selector::looping(two_chains(&hs)));
        graph.bind(
            Some(KeyBinding::key(KeyDef::ctrl('n'))),
            Some(KeyBinding::key(KeyDef::ctrl('p'))),
        );

        let bindings = hs[3].key_bindings();
        assert_eq!(bindings.len(), 2);

        let update = bindings[0].fire();
        match update.up.as_slice() {
            [Msg::FocusRequest(req)] => assert_eq!(req, &FocusRequest::to(vec![0])),
            other => panic!("unexpected {other:?}"),
        }

        // paths read when the key fires
        hs[0].set_path(&[9, 9]);
        let update = bindings[0].fire();
        match update.up.as_slice() {
            [Msg::FocusRequest(req)] => assert_eq!(req.path, vec![9, 9]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn edge_without_destination_does_nothing() {
        let hs = handles(&["a", "b"]);
        let graph = MovementGraph::new(MovementNode::sequence(hs.clone()));
        graph.bind(Some(KeyBinding::key(KeyDef::ctrl('n'))), None);

        let bindings = hs[1].key_bindings();
        assert_eq!(bindings.len(), 1);
        assert!(bindings[0].fire().is_empty());
    }
}
