//! Click versus double-click on graph nodes
//!
//! A click does not open the detail view right away. It waits out the
//! double-click window; a second click on the same node inside the window
//! cancels the detail view and toggles the pin instead.

use std::time::{Duration, Instant};

pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    OpenDetail(String),
    TogglePin(String),
}

#[derive(Debug, Clone)]
struct PendingClick {
    node: String,
    at: Instant,
}

#[derive(Debug, Clone)]
pub struct ClickResolver {
    window: Duration,
    pending: Option<PendingClick>,
}

impl Default for ClickResolver {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_WINDOW)
    }
}

impl ClickResolver {
    pub fn new(window: Duration) -> Self {
        Self { window, pending: None }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Register a click. Returns an action that is decided right now: a pin
    /// toggle for a double-click, or the detail view of an earlier click on
    /// another node that this click supersedes.
    pub fn click(&mut self, node: &str, now: Instant) -> Option<ClickAction> {
        match self.pending.take() {
            Some(prev) if prev.node == node && now.saturating_duration_since(prev.at) < self.window => {
                Some(ClickAction::TogglePin(prev.node))
            }
            prev => {
                self.pending = Some(PendingClick {
                    node: node.to_string(),
                    at: now,
                });
                prev.map(|p| ClickAction::OpenDetail(p.node))
            }
        }
    }

    /// Fire the pending detail view once its window has passed
    pub fn poll(&mut self, now: Instant) -> Option<ClickAction> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.at) >= self.window);
        if due {
            self.pending.take().map(|p| ClickAction::OpenDetail(p.node))
        } else {
            None
        }
    }

    /// When the pending click fires, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.at + self.window)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_single_click_opens_after_window() {
        let mut clicks = ClickResolver::default();
        let t0 = Instant::now();

        assert_eq!(clicks.click("entity-dune", t0), None);
        assert_eq!(clicks.poll(t0 + ms(150)), None);
        assert_eq!(
            clicks.poll(t0 + ms(200)),
            Some(ClickAction::OpenDetail("entity-dune".to_string()))
        );
        assert!(!clicks.has_pending());
    }

    #[test]
    fn test_double_click_toggles_and_never_opens() {
        let mut clicks = ClickResolver::default();
        let t0 = Instant::now();

        clicks.click("entity-dune", t0);
        assert_eq!(
            clicks.click("entity-dune", t0 + ms(120)),
            Some(ClickAction::TogglePin("entity-dune".to_string()))
        );
        assert_eq!(clicks.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn test_slow_second_click_is_a_new_click() {
        let mut clicks = ClickResolver::default();
        let t0 = Instant::now();

        clicks.click("a", t0);
        assert_eq!(
            clicks.click("a", t0 + ms(250)),
            Some(ClickAction::OpenDetail("a".to_string()))
        );
        assert_eq!(clicks.deadline(), Some(t0 + ms(450)));
    }

    #[test]
    fn test_click_on_other_node_flushes_pending() {
        let mut clicks = ClickResolver::default();
        let t0 = Instant::now();

        clicks.click("a", t0);
        assert_eq!(clicks.click("b", t0 + ms(50)), Some(ClickAction::OpenDetail("a".to_string())));
        assert_eq!(clicks.poll(t0 + ms(250)), Some(ClickAction::OpenDetail("b".to_string())));
    }
}
