//! Message classification
//!
//! Containers consult [`classify`] before deciding how to fan a message out.
//! The result borrows the route path from the message, so classification
//! never allocates.

use super::{Msg, Path};

/// How the tree delivers a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling<'a> {
    /// Root controller only
    Request,
    /// Along the focused chain
    FocusPropagated,
    /// To the single node whose path equals the carried path
    Routed(&'a [usize]),
    /// To every node in the subtree
    Broadcast,
    /// Not recognised by the routing layer
    Untyped,
}

impl Handling<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Handling::Request => "request",
            Handling::FocusPropagated => "focus-propagated",
            Handling::Routed(_) => "routed",
            Handling::Broadcast => "broadcast",
            Handling::Untyped => "untyped",
        }
    }
}

/// Messages carrying a path are routed, unless the path is empty
fn by_path(path: &Path) -> Handling<'_> {
    if path.is_empty() {
        Handling::Broadcast
    } else {
        Handling::Routed(path)
    }
}

/// Map a message to its delivery category. Pure and total.
pub fn classify(msg: &Msg) -> Handling<'_> {
    match msg {
        Msg::FocusRequest(_) | Msg::ContextualHelp(_) | Msg::KeyUnused(_) | Msg::Quit => {
            Handling::Request
        }
        Msg::Key(_) => Handling::FocusPropagated,
        Msg::FocusGrant(grant) => by_path(&grant.path),
        Msg::LocalShortcut { path, .. } => by_path(path),
        Msg::Routed { path, .. } => by_path(path),
        Msg::FocusRevoke
        | Msg::GlobalShortcut(_)
        | Msg::SelectTab { .. }
        | Msg::TabSelected { .. }
        | Msg::HelpText(_)
        | Msg::Broadcast(_) => Handling::Broadcast,
        Msg::Custom(_) => Handling::Untyped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::{FocusGrant, FocusRequest, KeyMsg, Payload};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key() -> KeyMsg {
        KeyMsg::new(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), 0)
    }

    fn samples() -> Vec<Msg> {
        vec![
            Msg::focus(vec![0, 1]),
            Msg::ContextualHelp("help".into()),
            Msg::KeyUnused(key()),
            Msg::Quit,
            Msg::Key(key()),
            Msg::FocusGrant(FocusGrant { path: vec![2] }),
            Msg::FocusGrant(FocusGrant { path: vec![] }),
            Msg::LocalShortcut {
                path: vec![1],
                key: key(),
            },
            Msg::Routed {
                path: vec![0, 0, 3],
                payload: Payload::new(1u32),
            },
            Msg::FocusRevoke,
            Msg::GlobalShortcut(key()),
            Msg::SelectTab {
                container: "tabs".into(),
                index: 1,
            },
            Msg::TabSelected {
                container: "tabs".into(),
                index: 1,
            },
            Msg::HelpText("h".into()),
            Msg::Broadcast(Payload::new("x")),
            Msg::custom(5i64),
        ]
    }

    #[test]
    fn classification_is_deterministic() {
        for msg in samples() {
            assert_eq!(classify(&msg), classify(&msg), "{}", msg.kind());
        }
    }

    #[test]
    fn requests_are_root_only() {
        let req = Msg::FocusRequest(FocusRequest::to(vec![1]));
        assert_eq!(classify(&req), Handling::Request);
        assert_eq!(classify(&Msg::Quit), Handling::Request);
        assert_eq!(classify(&Msg::KeyUnused(key())), Handling::Request);
    }

    #[test]
    fn keys_follow_focus() {
        assert_eq!(classify(&Msg::Key(key())), Handling::FocusPropagated);
    }

    #[test]
    fn focus_grant_depends_on_path() {
        let routed = Msg::FocusGrant(FocusGrant { path: vec![0, 2] });
        assert_eq!(classify(&routed), Handling::Routed(&[0, 2]));

        let everyone = Msg::FocusGrant(FocusGrant { path: vec![] });
        assert_eq!(classify(&everyone), Handling::Broadcast);
    }

    #[test]
    fn revoke_is_broadcast_and_custom_is_untyped() {
        assert_eq!(classify(&Msg::FocusRevoke), Handling::Broadcast);
        assert_eq!(classify(&Msg::custom(())), Handling::Untyped);
    }
}
