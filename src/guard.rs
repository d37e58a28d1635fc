//! Access and throttle guards gating when the engines may run.
//!
//! Thin plumbing over the host's notion of users and button clicks: an
//! editor allow-list and a cooldown between invocations. Both are pure over
//! caller-supplied inputs so the host wiring stays outside the crate.

use std::time::{Duration, Instant};

/// Who is allowed to trigger the engines: the workbook owner plus an
/// explicit editor allow-list.
#[derive(Clone, Debug)]
pub struct AccessPolicy {
    owner: String,
    editors: Vec<String>,
}

impl AccessPolicy {
    pub fn new(owner: impl Into<String>, editors: impl IntoIterator<Item = String>) -> Self {
        Self {
            owner: owner.into(),
            editors: editors.into_iter().collect(),
        }
    }

    pub fn allows(&self, email: &str) -> bool {
        email == self.owner || self.editors.iter().any(|editor| editor == email)
    }
}

/// Cooldown between consecutive invocations of one trigger.
#[derive(Clone, Debug)]
pub struct Cooldown {
    delay: Duration,
    last_run: Option<Instant>,
}

impl Cooldown {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_run: None,
        }
    }

    /// Passes if at least `delay` elapsed since the last accepted call,
    /// recording `now` as the new last run. Otherwise returns the remaining
    /// wait time and leaves the recorded timestamp untouched.
    pub fn check(&mut self, now: Instant) -> Result<(), Duration> {
        if let Some(last_run) = self.last_run {
            let elapsed = now.saturating_duration_since(last_run);
            if elapsed < self.delay {
                return Err(self.delay - elapsed);
            }
        }
        self.last_run = Some(now);
        Ok(())
    }
}
