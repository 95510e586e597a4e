use chrono::NaiveDate;
use std::time::Duration;

/// Source of the local calendar date, swappable in tests.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Daily reply ceiling plus the pause enforced after each reply.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    ceiling: u32,
    delay: Duration,
    sent_today: u32,
    day: NaiveDate,
}

impl RateLimiter {
    pub fn new(ceiling: u32, delay: Duration, today: NaiveDate) -> Self {
        Self {
            ceiling,
            delay,
            sent_today: 0,
            day: today,
        }
    }

    /// Reset the counter when the date moved since the last reset.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today != self.day {
            self.day = today;
            self.sent_today = 0;
            true
        } else {
            false
        }
    }

    pub fn exhausted(&self) -> bool {
        self.sent_today >= self.ceiling
    }

    pub fn record(&mut self) {
        self.sent_today = self.sent_today.saturating_add(1);
    }

    pub fn sent_today(&self) -> u32 {
        self.sent_today
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.sent_today)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
