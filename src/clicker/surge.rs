//! SURGE MODE sessions and the bonus target that starts them.

use rand::Rng;

use crate::time::{Timeout, TICKS_PER_SEC};

/// Seconds a SURGE MODE session lasts before pet bonuses.
pub const SURGE_BASE_SECONDS: u32 = 10;
/// Multiplier on click and passive gains while SURGE MODE is active.
pub const SURGE_MULTIPLIER: f64 = 2.0;

/// Bonus target spawn delay window, in seconds.
const SPAWN_MIN_SECS: u32 = 30;
const SPAWN_MAX_SECS: u32 = 90;
/// How long a spawned target stays clickable.
pub const TARGET_VISIBLE_SECS: u32 = 8;

/// Session length for a given pet time bonus.
pub fn surge_duration(surge_time_bonus: f64) -> u32 {
    SURGE_BASE_SECONDS + surge_time_bonus.max(0.0) as u32
}

/// The SURGE MODE state machine: idle, or active with whole seconds left.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurgeSession {
    active: bool,
    time_left: u32,
}

impl SurgeSession {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Gain multiplier for clicks and passive ticks right now.
    pub fn multiplier(&self) -> f64 {
        if self.active {
            SURGE_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Idle → Active. Returns false (and changes nothing) when already active.
    pub fn activate(&mut self, seconds: u32) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.time_left = seconds;
        true
    }

    /// One-second countdown. Returns true on the Active → Idle transition.
    pub fn countdown(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.active = false;
            return true;
        }
        false
    }
}

/// Schedules the transient clickable target that grants SURGE MODE.
#[derive(Clone, Debug, PartialEq)]
pub struct BonusTarget {
    visible: bool,
    /// Ticks until the next appearance.
    spawn: Timeout,
    /// Ticks until a visible target auto-hides.
    hide: Timeout,
}

impl BonusTarget {
    pub fn new() -> Self {
        Self {
            visible: false,
            spawn: Timeout::idle(),
            hide: Timeout::idle(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn spawn_timer(&self) -> &Timeout {
        &self.spawn
    }

    pub fn hide_timer(&self) -> &Timeout {
        &self.hide
    }

    /// Arm the next appearance at a random point in the spawn window.
    pub fn schedule(&mut self, rng: &mut impl Rng) {
        let secs = rng.gen_range(SPAWN_MIN_SECS..=SPAWN_MAX_SECS);
        self.spawn.arm(secs * TICKS_PER_SEC);
    }

    /// Show the target unless SURGE MODE is running, in which case the
    /// appearance is skipped and the caller should reschedule.
    pub fn show(&mut self, surge_active: bool) -> bool {
        if surge_active || self.visible {
            return false;
        }
        self.visible = true;
        self.hide.arm(TARGET_VISIBLE_SECS * TICKS_PER_SEC);
        true
    }

    /// Remove a visible target (claimed or expired). Returns whether one was showing.
    pub fn take(&mut self) -> bool {
        let was_visible = self.visible;
        self.visible = false;
        self.hide.cancel();
        was_visible
    }

    /// Advance both timers one tick: `(spawn_due, hide_due)`.
    pub fn tick(&mut self) -> (bool, bool) {
        (self.spawn.tick(), self.hide.tick())
    }

    /// Cancel every pending timer and hide the target.
    pub fn cancel(&mut self) {
        self.visible = false;
        self.spawn.cancel();
        self.hide.cancel();
    }
}

impl Default for BonusTarget {
    fn default() -> Self {
        Self::new()
    }
}
