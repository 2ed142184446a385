use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Shared cooperative cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

/// Checkpoint percentages of a run.
pub mod checkpoint {
    /// Pattern generation spans `0..=GENERATED`, split evenly across stock lengths.
    pub const GENERATED: u8 = 40;
    pub const MODEL_BUILT: u8 = 45;
    pub const SOLVER_STARTED: u8 = 50;
    pub const SOLVER_FINISHED: u8 = 90;
    pub const DECODED: u8 = 98;
    pub const DONE: u8 = 100;
}

/// Monotonic progress counter with an optional callback.
///
/// Lower values than the last reported one are swallowed, so the sink never
/// sees progress go backwards.
pub struct ProgressReporter {
    current: Arc<AtomicU8>,
    sink: Option<ProgressCallback>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            current: Arc::new(AtomicU8::new(0)),
            sink: None,
        }
    }

    pub fn with_callback(mut self, callback: ProgressCallback) -> Self {
        self.sink = Some(callback);
        self
    }

    /// Shares the counter with another thread, e.g. a polling UI.
    pub fn with_counter(mut self, counter: Arc<AtomicU8>) -> Self {
        self.current = counter;
        self
    }

    pub fn current(&self) -> u8 {
        self.current.load(Ordering::Acquire)
    }

    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.current.fetch_max(percent, Ordering::AcqRel);
        if percent > previous
            && let Some(sink) = &self.sink
        {
            sink(percent);
        }
    }

    /// Reports `done` of `total` steps scaled into `0..=span`.
    pub fn report_fraction(&self, done: usize, total: usize, span: u8) {
        if total == 0 {
            self.report(span);
            return;
        }
        let scaled = (done.min(total) * span as usize) / total;
        self.report(scaled as u8);
    }
}
