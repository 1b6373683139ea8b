//! Per-phase percentage tracking.

/// Converts a running row count into whole percentages and suppresses
/// repeats.
///
/// One tracker is created per phase of a single table transfer; no state is
/// shared between transfers.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: u64,
    last: Option<u8>,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self { total, last: None }
    }

    /// Initial 0% emission. Always returns `Some(0)`.
    pub fn start(&mut self) -> Option<u8> {
        self.last = Some(0);
        Some(0)
    }

    /// Percentage for `current` processed rows, or `None` when it equals the
    /// last percentage emitted.
    pub fn update(&mut self, current: u64) -> Option<u8> {
        let percent = percent_of(current, self.total);
        if self.last == Some(percent) {
            return None;
        }
        self.last = Some(percent);
        Some(percent)
    }

    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

/// `current * 100 / total`, clamped to `[0, 100]`. An empty phase is complete.
pub fn percent_of(current: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = current.saturating_mul(100) / total;
    pct.min(100) as u8
}
