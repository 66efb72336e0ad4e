//! `Benchmark` library: named time marks and the time elapsed between them.

use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Constructor argument.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BenchmarkOptions {
    /// Decimal places used by [`Benchmark::elapsed_display`].
    pub decimals: usize,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self { decimals: 4 }
    }
}

#[derive(Debug, Default)]
pub struct Benchmark {
    options: BenchmarkOptions,
    marks: Mutex<HashMap<String, Instant>>,
}

impl Benchmark {
    pub fn new(options: BenchmarkOptions) -> Self {
        Self {
            options,
            marks: Mutex::new(HashMap::new()),
        }
    }

    /// Set (or reset) a mark at the current time.
    pub fn mark(&self, name: &str) {
        self.marks.lock().insert(name.to_string(), Instant::now());
    }

    pub fn is_marked(&self, name: &str) -> bool {
        self.marks.lock().contains_key(name)
    }

    /// Time from `start` to `end`. An unset `end` is marked now; an unset
    /// `start` gives `None`.
    pub fn elapsed(&self, start: &str, end: &str) -> Option<Duration> {
        let mut marks = self.marks.lock();
        let from = *marks.get(start)?;
        let to = *marks
            .entry(end.to_string())
            .or_insert_with(Instant::now);
        Some(to.saturating_duration_since(from))
    }

    /// [`Benchmark::elapsed`] in seconds, with the configured precision.
    pub fn elapsed_display(&self, start: &str, end: &str) -> Option<String> {
        let elapsed = self.elapsed(start, end)?;
        Some(format!(
            "{:.*}",
            self.options.decimals,
            elapsed.as_secs_f64()
        ))
    }
}
