use std::time::Instant;

/// One of the two synchronized surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    /// Panel A, the page image.
    Image,
    /// Panel B, the text editor.
    Editor,
}

impl Panel {
    pub fn other(self) -> Panel {
        match self {
            Panel::Image => Panel::Editor,
            Panel::Editor => Panel::Image,
        }
    }
}

/// Which panel, if any, is currently driving the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveSource {
    #[default]
    Idle,
    SyncingFrom(Panel),
}

/// Per-session sync state owned by a single controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub enabled: bool,
    pub active_source: ActiveSource,
    pub current_block_id: Option<String>,
}

impl SyncState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            active_source: ActiveSource::Idle,
            current_block_id: None,
        }
    }

    /// True when an event from `panel` must be dropped because the other
    /// panel is mid-sync.
    pub fn blocks_events_from(&self, panel: Panel) -> bool {
        self.active_source == ActiveSource::SyncingFrom(panel.other())
    }
}

/// Latch held while a sync is applied to a panel.
///
/// Dropping the guard records when the latch releases, so a panel that panics
/// mid-scroll still lets the state machine return to `Idle`.
pub(crate) struct SettleGuard<'a> {
    pub(crate) state: &'a mut SyncState,
    settle_until: &'a mut Option<Instant>,
    release_at: Instant,
}

impl<'a> SettleGuard<'a> {
    pub(crate) fn begin(
        state: &'a mut SyncState,
        settle_until: &'a mut Option<Instant>,
        source: Panel,
        release_at: Instant,
    ) -> Self {
        state.active_source = ActiveSource::SyncingFrom(source);
        Self {
            state,
            settle_until,
            release_at,
        }
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        *self.settle_until = Some(self.release_at);
    }
}
