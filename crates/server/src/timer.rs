//! Server-owned countdown timers.
//!
//! A session holds one slot per timer kind. Starting a kind whose slot is
//! occupied is a refused no-op, so a session can never run two countdowns of
//! the same kind at once. Slots hold plain state; the hub's tick loop is the
//! only driver, calling [`TimerSlots::tick`] once per configured interval.

/// The two countdown kinds a session can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Game 1 brainstorm countdown.
    Main,
    /// Per-pitcher countdown (Game 1 and Game 4).
    Pitch,
}

#[derive(Debug, Clone)]
struct Countdown {
    remaining: u32,
}

/// One step of a live countdown. `remaining` runs from the start value down
/// to 0; the step that reports 0 also reports `finished` and has already
/// cleared the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStep {
    pub remaining: u32,
    pub finished: bool,
}

/// Single-slot countdown holders for one session.
#[derive(Debug, Clone, Default)]
pub struct TimerSlots {
    main: Option<Countdown>,
    pitch: Option<Countdown>,
}

impl TimerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<Countdown> {
        match kind {
            TimerKind::Main => &mut self.main,
            TimerKind::Pitch => &mut self.pitch,
        }
    }

    /// Start a countdown. Returns `false` without touching the running
    /// countdown when the slot is already occupied.
    pub fn start(&mut self, kind: TimerKind, seconds: u32) -> bool {
        let slot = self.slot_mut(kind);
        if slot.is_some() {
            return false;
        }
        *slot = Some(Countdown { remaining: seconds });
        true
    }

    /// Drop a countdown without a terminal tick.
    pub fn cancel(&mut self, kind: TimerKind) {
        *self.slot_mut(kind) = None;
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Main => self.main.is_some(),
            TimerKind::Pitch => self.pitch.is_some(),
        }
    }

    /// Advance the countdown of `kind` by one unit. Returns the step to
    /// broadcast, or `None` when the slot is empty.
    pub fn tick(&mut self, kind: TimerKind) -> Option<TimerStep> {
        let slot = self.slot_mut(kind);
        let countdown = slot.as_mut()?;
        let remaining = countdown.remaining;
        if remaining == 0 {
            *slot = None;
            return Some(TimerStep {
                remaining: 0,
                finished: true,
            });
        }
        countdown.remaining -= 1;
        Some(TimerStep {
            remaining,
            finished: false,
        })
    }
}
