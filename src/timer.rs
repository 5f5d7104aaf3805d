//! Pomodoro countdown.
//!
//! Self-contained and independent of the board model: a work period,
//! then a break, driven by a 1 Hz [`PomodoroTimer::tick`]. The display
//! holds at 00:00 for one tick before the phase rolls over.

pub const DEFAULT_WORK_MINUTES: u64 = 25;
pub const DEFAULT_BREAK_MINUTES: u64 = 5;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TimerPhase {
    Work,
    Break,
}

impl TimerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerPhase::Work => "work",
            TimerPhase::Break => "break",
        }
    }
}

/// Raised by [`PomodoroTimer::tick`] when a period elapses.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TimerEvent {
    WorkFinished,
    BreakFinished,
}

#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    work_seconds: u64,
    break_seconds: u64,
    remaining: u64,
    phase: TimerPhase,
    running: bool,
}

impl PomodoroTimer {
    pub fn new(work_minutes: u64, break_minutes: u64) -> Self {
        let work_seconds = work_minutes * 60;
        Self {
            work_seconds,
            break_seconds: break_minutes * 60,
            remaining: work_seconds,
            phase: TimerPhase::Work,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining
    }

    /// Begin a fresh work period.
    pub fn start(&mut self) {
        self.phase = TimerPhase::Work;
        self.remaining = self.work_seconds;
        self.running = true;
    }

    /// Halt and reset the display to a full work period.
    pub fn stop(&mut self) {
        self.running = false;
        self.phase = TimerPhase::Work;
        self.remaining = self.work_seconds;
    }

    /// Restart the current phase from its full duration. Ignored while
    /// stopped.
    pub fn restart(&mut self) {
        if !self.running {
            return;
        }
        self.remaining = match self.phase {
            TimerPhase::Work => self.work_seconds,
            TimerPhase::Break => self.break_seconds,
        };
    }

    /// Advance one second. A finished work period rolls straight into the
    /// break; a finished break stops the timer.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            return None;
        }

        match self.phase {
            TimerPhase::Work => {
                self.phase = TimerPhase::Break;
                self.remaining = self.break_seconds;
                Some(TimerEvent::WorkFinished)
            }
            TimerPhase::Break => {
                self.stop();
                Some(TimerEvent::BreakFinished)
            }
        }
    }

    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}
