use crate::{Instant, Milliseconds};

/// Repeat behaviour of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Fires once, then goes back to [`TimerState::Dormant`].
    OneShot,
    /// Re-arms itself after every expiry.
    Periodic,
}

/// Lifecycle state of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Created or stopped; not in the due-set.
    Dormant,
    /// Waiting for its `next_due`.
    Armed,
    /// Its callback is running on the dispatch context.
    ExpiredPendingDispatch,
}

/// Location of a timer in the service table.
///
/// The generation is bumped every time the slot is freed, which invalidates every handle
/// created before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimerKey {
    pub(crate) slot: usize,
    pub(crate) generation: u32,
}

/// Handle to a timer owned by a `TimerService`.
///
/// Handles are plain values: they can be copied into callbacks and across contexts.
/// A handle becomes invalid once its timer is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle<I> {
    pub(crate) key: TimerKey,
    pub(crate) id: I,
}

impl<I: Copy> TimerHandle<I> {
    /// Returns the identifier given at creation.
    ///
    /// Does not touch the service and never blocks, so it is safe to call from a callback.
    pub fn id(&self) -> I {
        self.id
    }
}

/// Function invoked on the dispatch context each time a timer expires.
///
/// Callbacks run to completion before any other timer is serviced. A callback that blocks
/// delays every other timer of the service.
pub trait TimerCallback<I>: Sync {
    fn on_expiry(&self, p_timer: TimerHandle<I>);
}

impl<I> TimerCallback<I> for fn(TimerHandle<I>) {
    fn on_expiry(&self, p_timer: TimerHandle<I>) {
        self(p_timer)
    }
}

/// Counters kept for every timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerStats {
    /// Number of times the callback was invoked.
    pub expirations: u32,
    /// Number of periods skipped because dispatch fell more than one period behind.
    pub overruns: u32,
}

pub(crate) struct TimerEntry<'a, I> {
    pub(crate) id: I,
    pub(crate) period: Milliseconds,
    pub(crate) mode: TimerMode,
    pub(crate) callback: &'a dyn TimerCallback<I>,
    pub(crate) state: TimerState,
    pub(crate) next_due: Option<Instant>,
    /// Creation order, used to break ties between equal `next_due`.
    pub(crate) seq: u32,
    /// Set once `delete` is accepted; the handle is rejected from then on.
    pub(crate) deleting: bool,
    pub(crate) stats: TimerStats,
}

impl<I> TimerEntry<'_, I> {
    pub(crate) fn is_active(&self) -> bool {
        match self.state {
            TimerState::Armed => true,
            TimerState::ExpiredPendingDispatch => self.mode == TimerMode::Periodic,
            TimerState::Dormant => false,
        }
    }
}
