//! Progress notifications emitted while issues are evaluated.

use crate::models::IssueMeta;
use indicatif::{ProgressBar, ProgressStyle};

/// Emitted once per evaluated issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub code: &'static str,
    pub name: &'static str,
    /// 1-based position of this issue in the run.
    pub index: usize,
    /// Number of issues the run will evaluate.
    pub total: usize,
    pub failed: bool,
}

/// Receives progress callbacks from the engine.
pub trait ProgressMonitor: Send + Sync {
    /// Called before an issue's compute step runs.
    fn started(&self, _meta: &IssueMeta, _total: usize) {}

    /// Called after an issue produced an outcome or failed.
    fn finished(&self, event: &ProgressEvent);
}

impl<F> ProgressMonitor for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn finished(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards all notifications.
pub struct NoProgress;

impl ProgressMonitor for NoProgress {
    fn finished(&self, _event: &ProgressEvent) {}
}

/// Terminal progress bar. Clones drive the same bar.
#[derive(Clone)]
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Evaluation complete");
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressMonitor for BarProgress {
    fn started(&self, meta: &IssueMeta, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message(meta.name);
    }

    fn finished(&self, event: &ProgressEvent) {
        self.bar.set_length(event.total as u64);
        self.bar.set_position(event.index as u64);
        if event.failed {
            self.bar.println(format!("  {} failed", event.name));
        }
    }
}
