//! Per-node interaction state
//!
//! A node is either simulation-controlled (`Free`), fixed by the user
//! (`Pinned`), or held by an in-progress drag. Dragging remembers whether
//! the node was pinned so release can restore it.

/// Interaction state of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinState {
    #[default]
    Free,
    Pinned,
    Dragging { was_pinned: bool },
}

impl PinState {
    /// Whether the simulation must leave the node's position alone
    pub fn is_fixed(&self) -> bool {
        !matches!(self, PinState::Free)
    }

    pub fn is_pinned(&self) -> bool {
        matches!(self, PinState::Pinned)
    }

    /// Double-click transition
    pub fn toggled(self) -> Self {
        match self {
            PinState::Free => PinState::Pinned,
            PinState::Pinned => PinState::Free,
            PinState::Dragging { was_pinned } => PinState::Dragging {
                was_pinned: !was_pinned,
            },
        }
    }

    /// Pointer-down transition
    pub fn drag_started(self) -> Self {
        match self {
            PinState::Free => PinState::Dragging { was_pinned: false },
            PinState::Pinned => PinState::Dragging { was_pinned: true },
            dragging => dragging,
        }
    }

    /// Pointer-up transition
    pub fn drag_ended(self) -> Self {
        match self {
            PinState::Dragging { was_pinned: true } => PinState::Pinned,
            PinState::Dragging { was_pinned: false } => PinState::Free,
            other => other,
        }
    }
}
