use std::fmt;

/// Sentinel step meaning "this scheduler will never fire again".
pub const NEVER: u64 = u64::MAX;

/// Schedules observer calls during a simulation.
///
/// A scheduler is a pure policy value: given the engine's current step and
/// the run target, it returns the next absolute step at which its observer
/// must be notified. It never fails; exhausted or disabled schedules return
/// [`NEVER`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scheduler {
    interval: Option<u64>,
    calls: Option<u64>,
    target: Option<u64>,
    steps: Option<Vec<u64>>,
}

impl Scheduler {
    /// Notify at a fixed step interval. A zero interval never fires.
    pub fn every(interval: u64) -> Self {
        Self {
            interval: Some(interval),
            ..Self::default()
        }
    }

    /// Spread a fixed number of notifications over the run target.
    ///
    /// The effective interval is derived from the engine's target step at
    /// evaluation time, so it follows the run configuration.
    pub fn spread(calls: u64) -> Self {
        Self {
            calls: Some(calls),
            ..Self::default()
        }
    }

    /// Spread a fixed number of notifications over an explicit target step.
    pub fn spread_until(calls: u64, target: u64) -> Self {
        Self {
            calls: Some(calls),
            target: Some(target),
            ..Self::default()
        }
    }

    /// Notify exactly at the given steps.
    pub fn at(mut steps: Vec<u64>) -> Self {
        steps.sort_unstable();
        steps.dedup();
        Self {
            steps: Some(steps),
            ..Self::default()
        }
    }

    /// A scheduler that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// Returns the fixed interval, if this is an interval schedule.
    pub fn interval(&self) -> Option<u64> {
        self.interval
    }

    /// Returns the call budget, if this is a spread schedule.
    pub fn calls(&self) -> Option<u64> {
        self.calls
    }

    /// Returns the next absolute step strictly greater than `step` at which
    /// the associated observer must fire, or [`NEVER`].
    ///
    /// # Arguments
    ///
    /// * `step` - The engine's current step.
    /// * `max_steps` - The run target, used to derive spread intervals.
    pub fn next_after(&self, step: u64, max_steps: u64) -> u64 {
        if let Some(interval) = self.interval {
            return next_multiple(step, interval);
        }
        if let Some(calls) = self.calls {
            if calls == 0 {
                return NEVER;
            }
            let span = self.target.unwrap_or(max_steps);
            let interval = (span / calls).max(1);
            return next_multiple(step, interval);
        }
        if let Some(steps) = &self.steps {
            return steps.iter().copied().find(|&s| s > step).unwrap_or(NEVER);
        }
        NEVER
    }
}

fn next_multiple(step: u64, interval: u64) -> u64 {
    if interval == 0 {
        return NEVER;
    }
    (step / interval + 1).saturating_mul(interval)
}

impl From<u64> for Scheduler {
    /// An integer is shorthand for a fixed-interval schedule.
    fn from(interval: u64) -> Self {
        Scheduler::every(interval)
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(interval) = self.interval {
            write!(f, "every {} steps", interval)
        } else if let Some(calls) = self.calls {
            match self.target {
                Some(target) => write!(f, "{} calls up to step {}", calls, target),
                None => write!(f, "{} calls over the run", calls),
            }
        } else if let Some(steps) = &self.steps {
            write!(f, "at {} fixed steps", steps.len())
        } else {
            write!(f, "never")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_interval_triggers_at_multiples() {
        let s = Scheduler::every(3);
        assert_eq!(s.next_after(0, 10), 3);
        assert_eq!(s.next_after(3, 10), 6);
        assert_eq!(s.next_after(4, 10), 6);
        assert_eq!(s.next_after(9, 10), 12);
    }

    #[test]
    fn zero_interval_never_fires() {
        assert_eq!(Scheduler::every(0).next_after(0, 10), NEVER);
        assert_eq!(Scheduler::never().next_after(5, 10), NEVER);
    }

    #[test]
    fn spread_derives_interval_from_target() {
        let s = Scheduler::spread(5);
        // target 100 -> interval 20
        assert_eq!(s.next_after(0, 100), 20);
        assert_eq!(s.next_after(20, 100), 40);
        // explicit target wins over the run target
        let s = Scheduler::spread_until(5, 50);
        assert_eq!(s.next_after(0, 100), 10);
    }

    #[test]
    fn spread_interval_is_at_least_one() {
        let s = Scheduler::spread(100);
        assert_eq!(s.next_after(0, 10), 1);
        assert_eq!(s.next_after(7, 10), 8);
    }

    #[test]
    fn explicit_steps_fire_in_order_then_exhaust() {
        let s = Scheduler::at(vec![7, 2, 5, 5]);
        assert_eq!(s.next_after(0, 10), 2);
        assert_eq!(s.next_after(2, 10), 5);
        assert_eq!(s.next_after(6, 10), 7);
        assert_eq!(s.next_after(7, 10), NEVER);
    }

    #[test]
    fn integer_shorthand_is_fixed_interval() {
        let s: Scheduler = 25u64.into();
        assert_eq!(s.interval(), Some(25));
        assert_eq!(s.next_after(0, 100), 25);
    }

    #[test]
    fn cadence_descriptions() {
        assert_eq!(Scheduler::every(10).to_string(), "every 10 steps");
        assert_eq!(Scheduler::spread(20).to_string(), "20 calls over the run");
        assert_eq!(Scheduler::never().to_string(), "never");
    }
}
