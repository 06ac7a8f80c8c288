/// Semantic time units that pass per simulation tick, independent of the wall-clock frame time.
pub const TICK: u64 = 17;

/// Number of time units per second.
pub const UNITS_PER_S: u64 = 1000;

/// whole_secs converts accumulated time units into whole seconds (rounded down).
pub fn whole_secs(units: u64) -> u64 {
    units / UNITS_PER_S
}

/// Trigger points reached by a single countdown step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountdownStep {
    pub activated: bool,
    pub expired: bool,
}

/// Countdown counts a fixed number of ticks down to zero. The first step reports the activation
/// trigger, the step that brings the counter from 1 to 0 reports expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
}

impl Countdown {
    pub fn new(duration: u32) -> Countdown {
        Countdown {
            duration,
            remaining: duration,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// step advances the countdown by one tick. Calling it on a finished countdown is a no-op.
    pub fn step(&mut self) -> CountdownStep {
        if self.remaining == 0 {
            return CountdownStep::default();
        }

        let step = CountdownStep {
            activated: self.remaining == self.duration,
            expired: self.remaining == 1,
        };
        self.remaining -= 1;
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_reports_activation_then_expiry() {
        let mut cd = Countdown::new(3);

        let first = cd.step();
        assert!(first.activated && !first.expired);
        assert_eq!(cd.remaining(), 2);

        assert_eq!(cd.step(), CountdownStep::default());

        let last = cd.step();
        assert!(last.expired && !last.activated);
        assert!(cd.is_finished());

        // finished countdowns stay put
        assert_eq!(cd.step(), CountdownStep::default());
        assert_eq!(cd.remaining(), 0);
    }

    #[test]
    fn whole_secs_rounds_down() {
        assert_eq!(whole_secs(999), 0);
        assert_eq!(whole_secs(59 * TICK), 1);
    }
}
