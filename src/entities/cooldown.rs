use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Millisecond time source used by every cooldown in the simulation
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Wall clock measured from the moment it was created
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock. Clones share the same time, so a test can keep one
/// handle and give the other to a formation.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// A countdown timer. Times are absolute milliseconds from a [`Clock`].
#[derive(Debug, Clone)]
pub struct Cooldown {
    duration: u64,
    variance: u64,
    /// Duration drawn at the last reset, jittered by `variance`
    deadline: u64,
    last_reset: Option<u64>,
}

impl Cooldown {
    pub fn new(duration: u64) -> Self {
        Self::with_variance(duration, 0)
    }

    pub fn with_variance(duration: u64, variance: u64) -> Self {
        Self {
            duration,
            variance: variance.min(duration),
            deadline: duration,
            last_reset: None,
        }
    }

    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.last_reset.is_some()
    }

    /// Restarts the countdown at `now`, drawing a fresh deadline uniformly from
    /// `duration ± variance` when a variance is configured.
    pub fn reset<R: Rng>(&mut self, now: u64, rng: &mut R) {
        self.last_reset = Some(now);
        self.deadline = if self.variance == 0 {
            self.duration
        } else {
            rng.random_range(self.duration - self.variance..=self.duration + self.variance)
        };
    }

    /// True once the drawn deadline has elapsed. Does not reset.
    ///
    /// A cooldown that was never reset arms itself here and reports
    /// not finished.
    pub fn check_finished(&mut self, now: u64) -> bool {
        let deadline = self.deadline;
        self.elapsed_at_least(now, deadline)
    }

    /// True once at least `ms` have passed since the last reset.
    pub fn check_more_than(&mut self, now: u64, ms: u64) -> bool {
        self.elapsed_at_least(now, ms)
    }

    fn elapsed_at_least(&mut self, now: u64, ms: u64) -> bool {
        match self.last_reset {
            Some(start) => now.saturating_sub(start) >= ms,
            None => {
                self.last_reset = Some(now);
                self.deadline = self.duration;
                false
            }
        }
    }
}

/// How gated actions are paced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceMode {
    /// Cooldowns and movement ticks follow the clock
    Clocked,
    /// Every gate opens immediately; used to drive deterministic simulations
    Unthrottled,
}

/// Clock, randomness and pacing mode bundled together. All cooldown queries
/// and movement-tick throttling go through here, so clocked and unthrottled
/// runs take the same code path.
pub struct Pacer {
    clock: Box<dyn Clock>,
    mode: PaceMode,
    rng: StdRng,
}

impl Pacer {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            mode: PaceMode::Clocked,
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(clock: Box<dyn Clock>, seed: u64) -> Self {
        Self {
            clock,
            mode: PaceMode::Clocked,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn system() -> Self {
        Self::new(Box::new(SystemClock::new()))
    }

    pub fn mode(&self) -> PaceMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PaceMode) {
        self.mode = mode;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn finished(&self, cooldown: &mut Cooldown) -> bool {
        match self.mode {
            PaceMode::Clocked => cooldown.check_finished(self.now()),
            PaceMode::Unthrottled => true,
        }
    }

    pub fn more_than(&self, cooldown: &mut Cooldown, ms: u64) -> bool {
        match self.mode {
            PaceMode::Clocked => cooldown.check_more_than(self.now(), ms),
            PaceMode::Unthrottled => true,
        }
    }

    pub fn reset(&mut self, cooldown: &mut Cooldown) {
        let now = self.now();
        cooldown.reset(now, &mut self.rng);
    }

    /// Resets the cooldown only if it has never been started
    pub fn arm(&mut self, cooldown: &mut Cooldown) {
        if !cooldown.is_armed() {
            self.reset(cooldown);
        }
    }

    /// Advances a frame counter and reports whether a throttled tick is due.
    /// The counter is cleared whenever a tick fires.
    pub fn tick_due(&self, counter: &mut u32, threshold: u32) -> bool {
        *counter += 1;
        let due = match self.mode {
            PaceMode::Clocked => *counter >= threshold,
            PaceMode::Unthrottled => true,
        };
        if due {
            *counter = 0;
        }
        due
    }

    /// Uniform value in `0..bound`, or 0 for an empty range
    pub fn roll(&mut self, bound: i32) -> i32 {
        if bound <= 0 {
            0
        } else {
            self.rng.random_range(0..bound)
        }
    }

    /// Uniform index in `0..len`; `None` for an empty collection
    pub fn pick(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.rng.random_range(0..len))
    }
}
