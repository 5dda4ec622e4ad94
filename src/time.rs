//! Fixed-timestep clock plus the tick-driven timers built on it.
//!
//! `draw_web()` fires at ~60fps with a variable delta. [`GameTime`] turns
//! that into whole 100ms ticks, and every periodic behaviour in the game
//! ([`Interval`]) or one-shot delay ([`Timeout`]) counts those ticks, so the
//! whole schedule is deterministic under test.

/// Discrete ticks per real-time second.
pub const TICKS_PER_SEC: u32 = 10;

pub struct GameTime {
    /// Milliseconds per tick (100ms at 10 ticks/sec)
    ms_per_tick: f64,
    /// Milliseconds not yet consumed as ticks
    accumulator: f64,
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None before the first frame
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp (`performance.now()`), get back the number
    /// of whole ticks that elapsed since the previous call.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            // Clamp so a backgrounded tab does not replay minutes of ticks at once
            Some(prev) => (now_ms - prev).clamp(0.0, 500.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}

/// A repeating timer measured in ticks. Cancelled timers never fire.
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    period: u32,
    elapsed: u32,
    running: bool,
}

impl Interval {
    /// A running interval that first fires `period` ticks from now.
    pub fn every(period: u32) -> Self {
        Self {
            period: period.max(1),
            elapsed: 0,
            running: true,
        }
    }

    /// A stopped interval; call [`Interval::start`] to arm it.
    pub fn stopped(period: u32) -> Self {
        Self {
            running: false,
            ..Self::every(period)
        }
    }

    /// (Re)start with a full period before the next fire.
    pub fn start(&mut self) {
        self.elapsed = 0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed = 0;
    }

    /// Advance one tick. Returns true when the period completes.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed += 1;
        if self.elapsed >= self.period {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// A one-shot delay measured in ticks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeout {
    remaining: Option<u32>,
}

impl Timeout {
    pub fn idle() -> Self {
        Self { remaining: None }
    }

    pub fn arm(&mut self, ticks: u32) {
        self.remaining = Some(ticks.max(1));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// Advance one tick. Returns true exactly once, on expiry.
    pub fn tick(&mut self) -> bool {
        match self.remaining {
            Some(1) => {
                self.remaining = None;
                true
            }
            Some(n) => {
                self.remaining = Some(n - 1);
                false
            }
            None => false,
        }
    }
}
