//! Fixed-rate timers driven by externally supplied frame time
//!
//! Time is counted in integer microseconds and the k-th firing of an N Hz
//! timer lands exactly on `k * 1_000_000 / N`, so one second of frames always
//! yields N firings regardless of how the second was sliced.

const MICROS_PER_SEC: u64 = 1_000_000;

/// Convert seconds to whole microseconds (negative and NaN become 0)
pub fn seconds_to_micros(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * MICROS_PER_SEC as f64).round() as u64
    } else {
        0
    }
}

/// A periodic trigger
#[derive(Debug, Clone)]
pub struct Timer {
    rate_hz: u32,
    running: bool,
    /// Microseconds since `start`
    elapsed: u64,
    /// Firings since `start`
    fired: u64,
}

impl Timer {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            rate_hz: rate_hz.max(1),
            running: false,
            elapsed: 0,
            fired: 0,
        }
    }

    /// Start from zero. Starting a running timer is a no-op.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.elapsed = 0;
            self.fired = 0;
        }
    }

    /// Stop the timer. Cancelling a stopped timer is a no-op.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Microseconds until the next firing, if running
    fn until_due(&self) -> Option<u64> {
        if !self.running {
            return None;
        }
        let due = (self.fired + 1) * MICROS_PER_SEC / self.rate_hz as u64;
        Some(due.saturating_sub(self.elapsed))
    }

    fn elapse(&mut self, micros: u64) {
        if self.running {
            self.elapsed += micros;
        }
    }
}

/// Which periodic trigger fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Simulation,
    Difficulty,
}

/// Two independent timers consumed in chronological order
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub simulation: Timer,
    pub difficulty: Timer,
}

impl Scheduler {
    pub fn new(simulation_hz: u32, difficulty_hz: u32) -> Self {
        Self {
            simulation: Timer::new(simulation_hz),
            difficulty: Timer::new(difficulty_hz),
        }
    }

    pub fn start(&mut self) {
        self.simulation.start();
        self.difficulty.start();
    }

    pub fn cancel(&mut self) {
        self.simulation.cancel();
        self.difficulty.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.simulation.is_running() || self.difficulty.is_running()
    }

    /// Take the next trigger that falls within `budget` microseconds,
    /// consuming the time up to it. When nothing is due the whole budget is
    /// consumed and None is returned. Simulation wins ties.
    pub fn poll(&mut self, budget: &mut u64) -> Option<Trigger> {
        let next = [
            (Trigger::Simulation, self.simulation.until_due()),
            (Trigger::Difficulty, self.difficulty.until_due()),
        ]
        .into_iter()
        .filter_map(|(trigger, due)| due.map(|d| (trigger, d)))
        .min_by_key(|&(_, due)| due);

        match next {
            Some((trigger, due)) if due <= *budget => {
                self.simulation.elapse(due);
                self.difficulty.elapse(due);
                *budget -= due;
                match trigger {
                    Trigger::Simulation => self.simulation.fired += 1,
                    Trigger::Difficulty => self.difficulty.fired += 1,
                }
                Some(trigger)
            }
            _ => {
                self.simulation.elapse(*budget);
                self.difficulty.elapse(*budget);
                *budget = 0;
                None
            }
        }
    }
}

/// Fires once after `delay` microseconds without a new `bump`
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_secs: f64) -> Self {
        Self {
            delay: seconds_to_micros(delay_secs),
            pending: None,
        }
    }

    /// Record a new value and restart the quiet period
    pub fn bump(&mut self, value: T) {
        self.pending = Some((value, 0));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance time; returns the latest value once the quiet period has passed
    pub fn advance(&mut self, micros: u64) -> Option<T> {
        let (_, waited) = self.pending.as_mut()?;
        *waited += micros;
        if *waited >= self.delay {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, seconds: f64) -> Vec<Trigger> {
        let mut budget = seconds_to_micros(seconds);
        let mut out = Vec::new();
        while let Some(trigger) = scheduler.poll(&mut budget) {
            out.push(trigger);
        }
        out
    }

    #[test]
    fn test_one_second_is_exact() {
        let mut scheduler = Scheduler::new(60, 1);
        scheduler.start();
        let triggers = drain(&mut scheduler, 1.0);
        let sims = triggers.iter().filter(|t| **t == Trigger::Simulation).count();
        let diffs = triggers.iter().filter(|t| **t == Trigger::Difficulty).count();
        assert_eq!(sims, 60);
        assert_eq!(diffs, 1);
        // Simulation wins the tie at t = 1s
        assert_eq!(triggers[triggers.len() - 1], Trigger::Difficulty);
    }

    #[test]
    fn test_frame_slicing_does_not_matter() {
        let mut whole = Scheduler::new(60, 1);
        whole.start();
        let a = drain(&mut whole, 3.0);

        let mut sliced = Scheduler::new(60, 1);
        sliced.start();
        let mut b = Vec::new();
        // Uneven frames adding up to 3s
        for dt in [0.007, 0.033, 0.016, 0.1, 0.044].iter().cycle().take(75) {
            b.extend(drain(&mut sliced, *dt));
        }
        assert_eq!(a, b);
        assert_eq!(sliced.simulation.fired(), 180);
        assert_eq!(sliced.difficulty.fired(), 3);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut scheduler = Scheduler::new(60, 1);
        scheduler.cancel();
        scheduler.cancel();
        assert!(!scheduler.is_running());
        assert!(drain(&mut scheduler, 5.0).is_empty());

        scheduler.start();
        assert!(scheduler.is_running());
        scheduler.cancel();
        scheduler.cancel();
        assert!(drain(&mut scheduler, 5.0).is_empty());
    }

    #[test]
    fn test_restart_resets_phase() {
        let mut scheduler = Scheduler::new(60, 1);
        scheduler.start();
        drain(&mut scheduler, 0.9);
        scheduler.cancel();
        scheduler.start();
        // A fresh start needs a full second for the difficulty tick
        let triggers = drain(&mut scheduler, 0.5);
        assert!(!triggers.contains(&Trigger::Difficulty));
    }

    #[test]
    fn test_cancel_mid_frame_stops_delivery() {
        let mut scheduler = Scheduler::new(60, 1);
        scheduler.start();
        let mut budget = seconds_to_micros(0.1);
        assert_eq!(scheduler.poll(&mut budget), Some(Trigger::Simulation));
        scheduler.cancel();
        assert_eq!(scheduler.poll(&mut budget), None);
        assert_eq!(budget, 0);
    }

    #[test]
    fn test_debouncer_waits_for_quiet() {
        let mut debounce = Debouncer::new(0.25);
        debounce.bump(1);
        assert_eq!(debounce.advance(seconds_to_micros(0.2)), None);
        debounce.bump(2);
        assert_eq!(debounce.advance(seconds_to_micros(0.2)), None);
        assert_eq!(debounce.advance(seconds_to_micros(0.05)), Some(2));
        assert!(!debounce.is_pending());
        assert_eq!(debounce.advance(seconds_to_micros(1.0)), None);
    }

    #[test]
    fn test_seconds_to_micros_rejects_garbage() {
        assert_eq!(seconds_to_micros(-1.0), 0);
        assert_eq!(seconds_to_micros(f64::NAN), 0);
        assert_eq!(seconds_to_micros(0.25), 250_000);
    }
}
