use chrono::{DateTime, Datelike, Utc};

/// Host-supplied time source (§6 "Consumed" interfaces). Only seasonal-month
/// derivation goes through this; audit/memory timestamps are stamped with
/// `chrono::Utc::now()` directly at the call site, same as everywhere else in
/// this codebase.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn current_month(&self) -> u32 {
        self.now().month()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
