use std::time::{Duration, Instant};

/// Rate limiter for things like progress logs. The first call to `perform` only runs after
/// `every` has passed since creation.
pub struct Every {
    every: Duration,
    last: Instant,
}

impl Every {
    pub fn new(every: Duration) -> Self {
        Self::starting_at(every, Instant::now())
    }

    fn starting_at(every: Duration, last: Instant) -> Self {
        Self { every, last }
    }

    pub fn perform(&mut self, f: impl FnOnce()) {
        self.perform_at(Instant::now(), f)
    }

    fn perform_at(&mut self, now: Instant, f: impl FnOnce()) {
        if now.saturating_duration_since(self.last) >= self.every {
            self.last = now;
            f()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn waits_for_the_interval() {
        let start = Instant::now();
        let mut every = Every::starting_at(Duration::from_secs(10), start);
        let mut count = 0;

        every.perform_at(start + Duration::from_secs(3), || count += 1);
        assert_eq!(0, count);

        every.perform_at(start + Duration::from_secs(10), || count += 1);
        assert_eq!(1, count);

        every.perform_at(start + Duration::from_secs(15), || count += 1);
        assert_eq!(1, count);

        every.perform_at(start + Duration::from_secs(21), || count += 1);
        assert_eq!(2, count);
    }

    #[test]
    fn zero_always_performs() {
        let mut every = Every::new(Duration::ZERO);
        let mut count = 0;
        for _ in 0..3 {
            every.perform(|| count += 1);
        }
        assert_eq!(3, count);
    }
}
