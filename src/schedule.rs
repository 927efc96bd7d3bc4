use std::time::{Duration, Instant};

/// Tracks when the next periodic update is due.
#[derive(Debug, Clone, Copy)]
pub struct UpdateSchedule {
    interval: Option<Duration>,
    last: Option<Instant>,
}

impl UpdateSchedule {
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// True on the first call and then once per elapsed interval. Never true
    /// without an interval.
    pub fn due(&mut self, now: Instant) -> bool {
        let Some(interval) = self.interval else {
            return false;
        };
        let due = match self.last {
            Some(last) => now.saturating_duration_since(last) >= interval,
            None => true,
        };
        if due {
            self.last = Some(now);
        }
        due
    }

    /// Time until the next update, for sizing poll timeouts.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let interval = self.interval?;
        match self.last {
            Some(last) => Some(interval.saturating_sub(now.saturating_duration_since(last))),
            None => Some(Duration::ZERO),
        }
    }

    /// Count an update triggered from elsewhere.
    pub fn mark(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_once_per_interval() {
        let start = Instant::now();
        let mut schedule = UpdateSchedule::new(Some(Duration::from_secs(1)));
        assert!(schedule.due(start));
        assert!(!schedule.due(start + Duration::from_millis(500)));
        assert!(schedule.due(start + Duration::from_millis(1000)));
        assert!(!schedule.due(start + Duration::from_millis(1500)));
    }

    #[test]
    fn never_due_without_interval() {
        let mut schedule = UpdateSchedule::new(None);
        assert!(!schedule.due(Instant::now()));
        assert_eq!(schedule.remaining(Instant::now()), None);
    }

    #[test]
    fn marking_pushes_the_next_update_back() {
        let start = Instant::now();
        let mut schedule = UpdateSchedule::new(Some(Duration::from_secs(2)));
        schedule.mark(start);
        assert_eq!(
            schedule.remaining(start + Duration::from_millis(500)),
            Some(Duration::from_millis(1500))
        );
        assert!(!schedule.due(start + Duration::from_secs(1)));
    }
}
