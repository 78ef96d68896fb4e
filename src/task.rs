use bevy::prelude::*;
use std::time::Duration;

/// One-shot task on top of a Bevy [`Timer`]. The owner schedules it, ticks
/// it every frame and reschedules it when it fires; cancelling disarms it so
/// nothing fires into a finished run.
#[derive(Debug, Clone, Default)]
pub struct ScheduledTask {
    timer: Timer,
    armed: bool,
}

impl ScheduledTask {
    /// Arm the task to fire after `delay_secs`, replacing any pending firing
    pub fn schedule(&mut self, delay_secs: f32) {
        self.timer = Timer::from_seconds(delay_secs.max(0.0), TimerMode::Once);
        self.armed = true;
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Seconds until the task fires, if armed
    pub fn remaining_secs(&self) -> Option<f32> {
        self.armed.then(|| self.timer.remaining_secs())
    }

    /// Advance by `delta`; returns true exactly once when the task comes due,
    /// after which it stays disarmed until scheduled again
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.armed {
            return false;
        }
        self.timer.tick(delta);
        if self.timer.finished() {
            self.armed = false;
            return true;
        }
        false
    }
}
