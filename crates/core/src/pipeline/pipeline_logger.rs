use std::collections::BTreeMap;
use std::time::Instant;

use crate::shared::constants::DEFAULT_PROGRESS_EVERY;

/// Sink for progress, per-stage timings and per-item counts emitted by the
/// redaction use cases.
pub trait PipelineLogger: Send {
    /// `done` of `total` items handled. `total` is 0 when unknown.
    fn progress(&mut self, done: usize, total: usize);

    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// One observation of a per-item quantity, such as faces in a frame.
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Called once when a run ends.
    fn summary(&self) {}
}

/// Discards everything. Used by tests and embedders that report elsewhere.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _done: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Running aggregate of one named series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Series {
    pub count: usize,
    pub total: f64,
    pub min: f64,
    pub max: f64,
}

impl Series {
    fn first(value: f64) -> Self {
        Self {
            count: 1,
            total: value,
            min: value,
            max: value,
        }
    }

    fn add(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

fn record(map: &mut BTreeMap<String, Series>, name: &str, value: f64) {
    match map.get_mut(name) {
        Some(series) => series.add(value),
        None => {
            map.insert(name.to_string(), Series::first(value));
        }
    }
}

/// Reports through the `log` facade, one progress line every `every` items.
///
/// Series are kept as running aggregates so memory stays flat over long
/// videos.
pub struct LogPipelineLogger {
    every: usize,
    unit: &'static str,
    done: usize,
    stages: BTreeMap<String, Series>,
    metrics: BTreeMap<String, Series>,
    started: Instant,
}

impl LogPipelineLogger {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            unit: "frames",
            done: 0,
            stages: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
        }
    }

    /// Names what `progress` counts in log lines. Defaults to "frames".
    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    fn should_report(&self, done: usize, total: usize) -> bool {
        done % self.every == 0 || (total > 0 && done == total)
    }

    pub fn stage(&self, name: &str) -> Option<&Series> {
        self.stages.get(name)
    }

    pub fn metric_series(&self, name: &str) -> Option<&Series> {
        self.metrics.get(name)
    }

    /// `None` until something has been recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.done == 0 && self.stages.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let secs = self.started.elapsed().as_secs_f64();
        let mut lines = vec![format!("Run summary: {} {} in {secs:.1}s", self.done, self.unit)];

        for (name, s) in &self.stages {
            lines.push(format!(
                "  {name:<8} avg {:6.1}ms  max {:6.1}ms  total {:7.0}ms",
                s.mean(),
                s.max,
                s.total
            ));
        }
        for (name, s) in &self.metrics {
            lines.push(format!(
                "  {name:<8} avg {:.1}  max {:.0}  total {:.0}",
                s.mean(),
                s.max,
                s.total
            ));
        }
        if self.done > 0 && secs > 0.0 {
            lines.push(format!("  {:.1} {}/s", self.done as f64 / secs, self.unit));
        }

        Some(lines.join("\n"))
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_EVERY)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, done: usize, total: usize) {
        self.done = self.done.max(done);
        if !self.should_report(done, total) {
            return;
        }
        let unit = self.unit;
        if total > 0 {
            log::info!("{done}/{total} {unit} ({:.0}%)", done as f64 * 100.0 / total as f64);
        } else {
            log::info!("{done} {unit}");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        record(&mut self.stages, stage, duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        record(&mut self.metrics, name, value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}
