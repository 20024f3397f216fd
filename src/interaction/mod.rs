//! Interaction semantics of the graph view
//!
//! Pure state machines driven by explicit timestamps, so any front-end
//! (or a test) can feed them events from its own clock.
//!
//! Wiring: every click on a node goes to [`ClickResolver::click`], which
//! alone decides pin toggles. Native double-click events go to
//! [`Viewport::double_click`], which only acts on the empty canvas. A
//! double-click on a node therefore toggles its pin exactly once.

pub mod click;
pub mod debounce;
pub mod hover;
pub mod viewport;

pub use click::{ClickAction, ClickResolver, DOUBLE_CLICK_WINDOW};
pub use debounce::{debounced, Debouncer};
pub use hover::{hover_styles, EdgeStyle, HoverStyles, NodeStyle};
pub use viewport::{DoubleClickOutcome, PointerTarget, Transform, Viewport};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    enum Event {
        Click(PointerTarget),
        DoubleClick(PointerTarget),
    }

    /// Feed a browser-style event sequence through both handlers
    fn dispatch(events: Vec<(u64, Event)>) -> (Vec<ClickAction>, Vec<DoubleClickOutcome>) {
        let mut clicks = ClickResolver::default();
        let mut viewport = Viewport::new();
        let t0 = Instant::now();
        let mut actions = Vec::new();
        let mut outcomes = Vec::new();

        for (ms, event) in events {
            let now = t0 + Duration::from_millis(ms);
            match event {
                Event::Click(PointerTarget::Node(id)) => actions.extend(clicks.click(&id, now)),
                Event::Click(PointerTarget::Canvas) => {}
                Event::DoubleClick(target) => outcomes.push(viewport.double_click(target, now)),
            }
        }
        actions.extend(clicks.poll(t0 + Duration::from_secs(10)));
        (actions, outcomes)
    }

    fn node(id: &str) -> PointerTarget {
        PointerTarget::Node(id.to_string())
    }

    #[test]
    fn test_node_double_click_toggles_pin_once() {
        let (actions, outcomes) = dispatch(vec![
            (0, Event::Click(node("entity-dune"))),
            (120, Event::Click(node("entity-dune"))),
            (121, Event::DoubleClick(node("entity-dune"))),
        ]);

        let toggles = actions.iter().filter(|a| matches!(a, ClickAction::TogglePin(_))).count();
        assert_eq!(toggles, 1);
        assert_eq!(actions, vec![ClickAction::TogglePin("entity-dune".to_string())]);
        assert_eq!(outcomes, vec![DoubleClickOutcome::Ignored]);
    }

    #[test]
    fn test_canvas_double_click_only_resets() {
        let (actions, outcomes) = dispatch(vec![
            (0, Event::Click(PointerTarget::Canvas)),
            (120, Event::Click(PointerTarget::Canvas)),
            (121, Event::DoubleClick(PointerTarget::Canvas)),
        ]);

        assert!(actions.is_empty());
        assert_eq!(outcomes, vec![DoubleClickOutcome::ResetView]);
    }
}
