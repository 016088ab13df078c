//! Wall-clock sources for the recompute loop

/// Unix-seconds clock
pub trait Clock: Send {
    fn now(&mut self) -> u64;
}

/// System time via chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Always returns the same instant
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&mut self) -> u64 {
        self.0
    }
}

/// Never lets readings go backwards within a session
#[derive(Debug, Clone)]
pub struct MonotonicClock<C> {
    inner: C,
    last: u64,
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(inner: C) -> Self {
        Self { inner, last: 0 }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&mut self) -> u64 {
        let t = self.inner.now();
        if t < self.last {
            log::warn!("clock went backwards ({} < {}), holding", t, self.last);
        } else {
            self.last = t;
        }
        self.last
    }
}
