use crate::KernelError::{ChannelClosed, InvalidArgument, InvalidHandle, Timeout, TimerTableFull};
use crate::clock::TimeSource;
use crate::timers::command::{BlockTime, Command, CommandQueue, PushError};
use crate::timers::due_set::{DueEntry, DueSet};
use crate::timers::timer::{
    TimerCallback, TimerEntry, TimerHandle, TimerKey, TimerMode, TimerState, TimerStats,
};
use crate::{Instant, KernelResult, Milliseconds};
use heapless::Vec;
use spin::Mutex;

struct TimerSlot<'a, I> {
    generation: u32,
    entry: Option<TimerEntry<'a, I>>,
}

struct TimerTable<'a, I, const N: usize> {
    slots: Vec<TimerSlot<'a, I>, N>,
    next_seq: u32,
}

impl<'a, I, const N: usize> TimerTable<'a, I, N> {
    const fn new() -> Self {
        TimerTable {
            slots: Vec::new(),
            next_seq: 0,
        }
    }

    /// Stores `p_entry` in the first free slot.
    fn insert(&mut self, p_entry: TimerEntry<'a, I>) -> Option<TimerKey> {
        if let Some(l_slot) = self.slots.iter().position(|l_s| l_s.entry.is_none()) {
            self.slots[l_slot].entry = Some(p_entry);
            return Some(TimerKey {
                slot: l_slot,
                generation: self.slots[l_slot].generation,
            });
        }

        let l_slot = self.slots.len();
        self.slots
            .push(TimerSlot {
                generation: 0,
                entry: Some(p_entry),
            })
            .ok()?;
        Some(TimerKey {
            slot: l_slot,
            generation: 0,
        })
    }

    /// Entry behind `p_key`, including one whose deletion is pending.
    fn get_mut(&mut self, p_key: TimerKey) -> Option<&mut TimerEntry<'a, I>> {
        self.slots
            .get_mut(p_key.slot)
            .filter(|l_s| l_s.generation == p_key.generation)
            .and_then(|l_s| l_s.entry.as_mut())
    }

    /// Entry behind `p_key` if the handle is still usable by callers.
    fn get_live(&mut self, p_key: TimerKey) -> Option<&mut TimerEntry<'a, I>> {
        self.get_mut(p_key).filter(|l_e| !l_e.deleting)
    }

    fn free(&mut self, p_key: TimerKey) {
        if let Some(l_slot) = self.slots.get_mut(p_key.slot) {
            if l_slot.generation == p_key.generation {
                l_slot.entry = None;
                l_slot.generation = l_slot.generation.wrapping_add(1);
            }
        }
    }

    fn count(&self) -> usize {
        self.slots.iter().filter(|l_s| l_s.entry.is_some()).count()
    }
}

/// Software timer service.
///
/// Timers are created on the caller's context and only touch the timer table. Arming,
/// stopping and deleting are sent as commands through a bounded queue of `Q` entries and
/// applied by the dispatch context, the single context that calls [`TimerService::process`]
/// or [`TimerService::run`]. Expired timers are serviced in order of due time, then in
/// order of creation. Up to `N` timers can exist at the same time.
///
/// Callbacks run on the dispatch context with no timer lock held. They may call
/// [`TimerHandle::id`] and queue commands, but should do so with a bounded
/// [`BlockTime`]: the queue is only drained by the dispatch context itself.
pub struct TimerService<'a, I, const N: usize, const Q: usize> {
    clock: &'a dyn TimeSource,
    table: Mutex<TimerTable<'a, I, N>>,
    commands: CommandQueue<Q>,
    /// Owned by the dispatch context.
    due: Mutex<DueSet<N>>,
}

impl<'a, I: Copy, const N: usize, const Q: usize> TimerService<'a, I, N, Q> {
    /// Creates an empty service driven by `p_clock`.
    pub const fn new(p_clock: &'a dyn TimeSource) -> Self {
        TimerService {
            clock: p_clock,
            table: Mutex::new(TimerTable::new()),
            commands: CommandQueue::new(),
            due: Mutex::new(DueSet::new()),
        }
    }

    /// Creates a dormant timer.
    ///
    /// # Parameters
    /// - `p_period`: Delay between arming and expiry, and between two periodic expiries.
    /// - `p_mode`: One-shot or periodic.
    /// - `p_id`: Identifier handed back by [`TimerHandle::id`].
    /// - `p_callback`: Function invoked on every expiry.
    ///
    /// # Returns
    /// A handle to the new timer. The timer is not armed.
    ///
    /// # Errors
    /// - [`InvalidArgument`] if the period is zero or the callback is missing.
    /// - [`TimerTableFull`] if `N` timers already exist.
    pub fn create(
        &self,
        p_period: Milliseconds,
        p_mode: TimerMode,
        p_id: I,
        p_callback: Option<&'a dyn TimerCallback<I>>,
    ) -> KernelResult<TimerHandle<I>> {
        if p_period.to_u32() == 0 {
            return Err(InvalidArgument("timer period must be greater than zero"));
        }
        let l_callback = p_callback.ok_or(InvalidArgument("timer callback is missing"))?;

        let mut l_table = self.table.lock();
        let l_seq = l_table.next_seq;
        let l_key = l_table
            .insert(TimerEntry {
                id: p_id,
                period: p_period,
                mode: p_mode,
                callback: l_callback,
                state: TimerState::Dormant,
                next_due: None,
                seq: l_seq,
                deleting: false,
                stats: TimerStats::default(),
            })
            .ok_or(TimerTableFull(N))?;
        l_table.next_seq = l_seq.wrapping_add(1);

        timer_log!(debug, "timer {} created, period {}", l_key.slot, p_period);
        Ok(TimerHandle {
            key: l_key,
            id: p_id,
        })
    }

    /// Arms the timer so that it expires one period after this call.
    ///
    /// Restarting an armed timer moves its expiry to one period after this call.
    ///
    /// # Errors
    /// - [`InvalidHandle`] if the timer was deleted.
    /// - [`Timeout`] if the command queue stayed full for `p_block`. The timer is not armed.
    /// - [`ChannelClosed`] if the service was shut down.
    pub fn start(&self, p_timer: TimerHandle<I>, p_block: BlockTime) -> KernelResult<()> {
        self.with_timer(p_timer, |_| ())?;
        let l_issued_at = self.clock.now();
        self.submit(
            Command::Start {
                key: p_timer.key,
                issued_at: l_issued_at,
            },
            p_block,
        )
    }

    /// Restarts the timer counting from now. Same as [`TimerService::start`].
    pub fn reset(&self, p_timer: TimerHandle<I>, p_block: BlockTime) -> KernelResult<()> {
        self.start(p_timer, p_block)
    }

    /// Disarms the timer. Stopping a dormant timer is not an error.
    ///
    /// # Errors
    /// Same as [`TimerService::start`].
    pub fn stop(&self, p_timer: TimerHandle<I>, p_block: BlockTime) -> KernelResult<()> {
        self.with_timer(p_timer, |_| ())?;
        self.submit(Command::Stop { key: p_timer.key }, p_block)
    }

    /// Deletes the timer.
    ///
    /// The handle is rejected by every operation as soon as this call succeeds. The slot is
    /// released by the dispatch context.
    ///
    /// # Errors
    /// Same as [`TimerService::start`]. On failure the timer is left untouched.
    pub fn delete(&self, p_timer: TimerHandle<I>, p_block: BlockTime) -> KernelResult<()> {
        self.with_timer(p_timer, |l_entry| l_entry.deleting = true)?;

        let l_result = self.submit(Command::Delete { key: p_timer.key }, p_block);
        if l_result.is_err() {
            if let Some(l_entry) = self.table.lock().get_mut(p_timer.key) {
                l_entry.deleting = false;
            }
        }
        l_result
    }

    /// Returns true while the timer is armed or its periodic callback is running.
    pub fn is_active(&self, p_timer: TimerHandle<I>) -> KernelResult<bool> {
        self.with_timer(p_timer, |l_entry| l_entry.is_active())
    }

    pub fn state(&self, p_timer: TimerHandle<I>) -> KernelResult<TimerState> {
        self.with_timer(p_timer, |l_entry| l_entry.state)
    }

    pub fn period(&self, p_timer: TimerHandle<I>) -> KernelResult<Milliseconds> {
        self.with_timer(p_timer, |l_entry| l_entry.period)
    }

    pub fn mode(&self, p_timer: TimerHandle<I>) -> KernelResult<TimerMode> {
        self.with_timer(p_timer, |l_entry| l_entry.mode)
    }

    /// Returns the next expiry time, `None` if the timer is not armed.
    ///
    /// Commands still in the queue are not reflected.
    pub fn expiry_time(&self, p_timer: TimerHandle<I>) -> KernelResult<Option<Instant>> {
        self.with_timer(p_timer, |l_entry| l_entry.next_due)
    }

    pub fn stats(&self, p_timer: TimerHandle<I>) -> KernelResult<TimerStats> {
        self.with_timer(p_timer, |l_entry| l_entry.stats)
    }

    /// Number of commands waiting for the dispatch context.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Number of existing timers, including those whose deletion is pending.
    pub fn timer_count(&self) -> usize {
        self.table.lock().count()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Runs one dispatch iteration.
    ///
    /// Applies the queued commands, then fires every expired timer. This is repeated as long
    /// as callbacks queue new commands.
    ///
    /// # Returns
    /// The earliest expiry time among armed timers, `None` if no timer is armed.
    pub fn process(&self) -> Option<Instant> {
        let mut l_due = self.due.lock();
        loop {
            self.apply_pending(&mut l_due);
            self.fire_expired(&mut l_due);
            if self.commands.is_empty() || self.is_closed() {
                break;
            }
        }
        l_due.next_deadline()
    }

    /// Dispatch loop. Returns once the service is shut down.
    pub fn run(&self) {
        timer_log!(info, "timer service running");
        while !self.is_closed() {
            let l_next = self.process();
            if self.is_closed() {
                break;
            }
            self.clock.wait_until(l_next);
        }
        timer_log!(info, "timer service stopped");
    }

    /// Closes the command queue and makes [`TimerService::run`] return.
    ///
    /// Queued commands are discarded. Later `start`, `stop` and `delete` calls fail with
    /// [`ChannelClosed`].
    pub fn shutdown(&self) {
        self.commands.close();
        self.clock.notify();
    }

    fn with_timer<R>(
        &self,
        p_timer: TimerHandle<I>,
        p_action: impl FnOnce(&mut TimerEntry<'a, I>) -> R,
    ) -> KernelResult<R> {
        let mut l_table = self.table.lock();
        let l_entry = l_table.get_live(p_timer.key).ok_or(InvalidHandle)?;
        Ok(p_action(l_entry))
    }

    fn submit(&self, p_command: Command, p_block: BlockTime) -> KernelResult<()> {
        let l_deadline = match p_block {
            BlockTime::Forever => None,
            BlockTime::Bounded(l_wait) => Some(self.clock.now() + l_wait),
        };

        loop {
            match self.commands.try_push(p_command) {
                Ok(()) => {
                    self.clock.notify();
                    return Ok(());
                }
                Err(PushError::Closed) => return Err(ChannelClosed),
                Err(PushError::Full) => {}
            }
            if let Some(l_deadline) = l_deadline {
                if self.clock.now() >= l_deadline {
                    timer_log!(
                        warn,
                        "{} of timer {} timed out, queue full",
                        p_command.name(),
                        p_command.key().slot
                    );
                    return Err(Timeout);
                }
            }
            self.clock.relax();
        }
    }

    fn apply_pending(&self, p_due: &mut DueSet<N>) {
        while let Some(l_command) = self.commands.pop() {
            let l_key = l_command.key();
            let mut l_table = self.table.lock();

            let Some(l_entry) = l_table.get_mut(l_key) else {
                timer_log!(warn, "{} dropped, timer {} is gone", l_command.name(), l_key.slot);
                continue;
            };
            p_due.remove_slot(l_key.slot);

            match l_command {
                Command::Start { issued_at, .. } => {
                    let l_next = issued_at + l_entry.period;
                    l_entry.state = TimerState::Armed;
                    l_entry.next_due = Some(l_next);
                    let l_seq = l_entry.seq;
                    Self::arm(p_due, l_next, l_seq, l_key.slot);
                }
                Command::Stop { .. } => {
                    l_entry.state = TimerState::Dormant;
                    l_entry.next_due = None;
                }
                Command::Delete { .. } => {
                    l_table.free(l_key);
                    timer_log!(debug, "timer {} deleted", l_key.slot);
                }
            }
        }
    }

    fn fire_expired(&self, p_due: &mut DueSet<N>) {
        let l_now = self.clock.now();
        // Timers whose delete is being queued keep their due entry until the delete lands.
        let mut l_held: Vec<DueEntry, N> = Vec::new();

        while let Some(l_expired) = p_due.pop_due(l_now) {
            let l_fire = {
                let mut l_table = self.table.lock();
                let l_generation = match l_table.slots.get(l_expired.slot) {
                    Some(l_slot) => l_slot.generation,
                    None => continue,
                };
                let l_key = TimerKey {
                    slot: l_expired.slot,
                    generation: l_generation,
                };
                match l_table.get_mut(l_key) {
                    Some(l_entry) if l_entry.deleting => {
                        // At most one entry per slot, so this never overflows.
                        let _ = l_held.push(l_expired);
                        continue;
                    }
                    Some(l_entry) => {
                        l_entry.state = TimerState::ExpiredPendingDispatch;
                        Some((
                            l_entry.callback,
                            TimerHandle {
                                key: l_key,
                                id: l_entry.id,
                            },
                        ))
                    }
                    None => None,
                }
            };
            let Some((l_callback, l_handle)) = l_fire else {
                continue;
            };

            timer_log!(debug, "timer {} expired at {}", l_expired.slot, l_now);
            l_callback.on_expiry(l_handle);

            let mut l_table = self.table.lock();
            let Some(l_entry) = l_table.get_mut(l_handle.key) else {
                continue;
            };
            l_entry.stats.expirations = l_entry.stats.expirations.wrapping_add(1);

            if l_entry.mode == TimerMode::OneShot {
                l_entry.state = TimerState::Dormant;
                l_entry.next_due = None;
                continue;
            }

            // Re-arm from the previous due time. A due time equal to now is still fired,
            // only periods that are entirely in the past are skipped.
            let mut l_next = l_expired.due + l_entry.period;
            while l_next < l_now {
                l_next += l_entry.period;
                l_entry.stats.overruns = l_entry.stats.overruns.wrapping_add(1);
            }
            l_entry.state = TimerState::Armed;
            l_entry.next_due = Some(l_next);
            Self::arm(p_due, l_next, l_expired.seq, l_expired.slot);
        }

        for l_entry in l_held {
            Self::arm(p_due, l_entry.due, l_entry.seq, l_entry.slot);
        }
    }

    fn arm(p_due: &mut DueSet<N>, p_due_at: Instant, p_seq: u32, p_slot: usize) {
        let l_entry = DueEntry {
            due: p_due_at,
            seq: p_seq,
            slot: p_slot,
        };
        if p_due.insert(l_entry).is_err() {
            timer_log!(error, "due-set full, timer {} not armed", p_slot);
        }
    }
}
