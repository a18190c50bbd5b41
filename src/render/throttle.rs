use std::time::Duration;

/// Whether a redraw may happen now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    Open,
    /// Too soon after the previous draw; retry at `until`.
    Wait { until: Duration },
}

/// Bounds redraw frequency during continuous pointer movement.
#[derive(Clone, Debug)]
pub struct RedrawThrottle {
    interval: Duration,
    last: Option<Duration>,
}

impl RedrawThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// `force` bypasses the interval, e.g. for the final draw after a gesture ends.
    pub fn gate(&self, now: Duration, force: bool) -> Gate {
        match self.last {
            Some(last) if !force && now < last + self.interval => Gate::Wait {
                until: last + self.interval,
            },
            _ => Gate::Open,
        }
    }

    pub fn record(&mut self, now: Duration) {
        self.last = Some(now);
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/throttle.rs"]
mod tests;
