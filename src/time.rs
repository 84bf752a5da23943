//! Frame clock re-emitting a `tick` per rendered frame.

use instant::{Duration, Instant};

use crate::events::EventEmitter;

/// Snapshot handed to listeners and to [`World::update`](crate::world::World::update).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Seconds since the previous tick (clamped).
    pub delta: f32,
    /// Seconds since the clock started.
    pub elapsed: f32,
    pub frame: u64,
}

#[derive(Debug)]
pub struct Time {
    start: Instant,
    current: Instant,
    delta: Duration,
    elapsed: Duration,
    frame: u64,
    dt_min: Duration,
    dt_max: Duration,
    pub events: EventEmitter<Tick>,
}

impl Time {
    /// Roughly one frame at 60Hz, used until the first real tick arrives.
    pub const INITIAL_DELTA: Duration = Duration::from_millis(16);

    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Delta time is clamped so that a stalled window (debugger, minimized tab) doesn't
    /// produce a huge step in animations and damping.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            current: now,
            delta: Self::INITIAL_DELTA,
            elapsed: Duration::ZERO,
            frame: 0,
            dt_min,
            dt_max,
            events: EventEmitter::new(),
        }
    }

    pub fn tick(&mut self) -> Tick {
        self.advance(self.current.elapsed());
        self.current = Instant::now();
        let tick = self.snapshot();
        self.events.trigger(&tick);
        tick
    }

    /// Advance by an explicit amount instead of reading the wall clock.
    pub fn advance(&mut self, dt: Duration) {
        self.delta = dt.clamp(self.dt_min, self.dt_max);
        self.elapsed += self.delta;
        self.frame = self.frame.wrapping_add(1);
    }

    /// Restart the baseline, e.g. after the app was suspended.
    pub fn reset(&mut self) {
        self.current = Instant::now();
    }

    pub fn snapshot(&self) -> Tick {
        Tick {
            delta: self.delta.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
            frame: self.frame,
        }
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn started_at(&self) -> Instant {
        self.start
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
