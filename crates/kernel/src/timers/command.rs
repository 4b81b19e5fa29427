use crate::Instant;
use crate::Milliseconds;
use crate::timers::timer::TimerKey;
use core::sync::atomic::{AtomicBool, Ordering};
use heapless::Deque;
use spin::Mutex;

/// How long a caller accepts to wait for room in the command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTime {
    /// Wait until the command is queued or the service is shut down.
    Forever,
    /// Give up with `KernelError::Timeout` after the given duration.
    Bounded(Milliseconds),
}

/// Do not wait at all when the command queue is full.
pub const NO_WAIT: BlockTime = BlockTime::Bounded(Milliseconds(0));

/// Request sent to the dispatch context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    /// Arm (or re-arm) the timer counting from `issued_at`.
    Start { key: TimerKey, issued_at: Instant },
    Stop { key: TimerKey },
    Delete { key: TimerKey },
}

impl Command {
    pub(crate) fn key(&self) -> TimerKey {
        match self {
            Command::Start { key, .. } | Command::Stop { key } | Command::Delete { key } => *key,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::Start { .. } => "start",
            Command::Stop { .. } => "stop",
            Command::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushError {
    Full,
    Closed,
}

/// Bounded FIFO of commands waiting for the dispatch context.
///
/// Once closed, the queue is empty and refuses every command.
pub(crate) struct CommandQueue<const Q: usize> {
    queue: Mutex<Deque<Command, Q>>,
    closed: AtomicBool,
}

impl<const Q: usize> CommandQueue<Q> {
    pub(crate) const fn new() -> Self {
        CommandQueue {
            queue: Mutex::new(Deque::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn try_push(&self, p_command: Command) -> Result<(), PushError> {
        let mut l_queue = self.queue.lock();
        if self.is_closed() {
            return Err(PushError::Closed);
        }
        l_queue.push_back(p_command).map_err(|_| PushError::Full)
    }

    /// Drops the queued commands and refuses new ones.
    pub(crate) fn close(&self) {
        let mut l_queue = self.queue.lock();
        self.closed.store(true, Ordering::Release);
        l_queue.clear();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn pop(&self) -> Option<Command> {
        self.queue.lock().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
