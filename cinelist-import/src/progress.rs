//! Import progress reporting.

/// Trait for receiving import progress updates.
pub trait ImportProgress {
    /// Called when a pass starts (e.g., "Users: 12 in snapshot").
    fn on_phase(&self, message: &str);

    /// Called after each snapshot row is reconciled.
    fn on_item(&self, current: usize, total: usize, label: &str);

    /// Called when the import has committed.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_phase(&self, _message: &str) {}
    fn on_item(&self, _current: usize, _total: usize, _label: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_item(&self, current: usize, total: usize, label: &str) {
        if current.is_multiple_of(500) || current == total {
            log::info!("  [{}/{}] {}", current, total, label);
        }
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
