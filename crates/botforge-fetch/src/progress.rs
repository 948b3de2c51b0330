//! Producer/consumer progress reporting.
//!
//! The transfer side pushes [`ProgressEvent`]s through an unbounded
//! channel and never blocks or fails on the observer's behalf: sends into
//! a closed channel are ignored, so detaching the reporter mid-transfer
//! is always safe. The reporter walks Idle -> Active -> Done, renders an
//! indicatif bar while Active, and honors cancellation by detaching
//! itself only; the underlying transfer always runs to completion or I/O
//! failure.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use once_cell::sync::Lazy;
use tokio::sync::{mpsc, watch};

const PB_STYLE: &str = "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {percent:>3}% {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

/// Bar length; ratios in [0, 1] map onto this many positions.
const RATIO_SCALE: u64 = 1000;

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// One-way message from the transfer task to the observer.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// Completion ratio in `[0, 1]`, monotonically non-decreasing.
    Ratio(f64),
    /// The transfer surfaced an error; the reporter should stop.
    Failed(String),
}

/// Sending half handed to the transfer side.
///
/// Every send is best-effort: a detached or finished reporter makes the
/// sends no-ops, never errors.
#[derive(Clone)]
pub struct ProgressSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSink {
    pub fn ratio(&self, ratio: f64) {
        let _ = self.tx.send(ProgressEvent::Ratio(ratio));
    }

    pub fn failed(&self, message: impl Into<String>) {
        let _ = self.tx.send(ProgressEvent::Failed(message.into()));
    }

    /// Adapt the sink to the transfer's progress callback shape.
    pub fn callback(&self) -> Arc<dyn Fn(f64) + Send + Sync> {
        let sink = self.clone();
        Arc::new(move |ratio| sink.ratio(ratio))
    }
}

/// Flips the reporter to Done without touching the transfer.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Terminal reporter state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReporterOutcome {
    pub cancelled: bool,
    pub failed: bool,
    /// `true` if at least one event arrived before the reporter finished.
    pub observed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Active,
}

/// Consumes progress events and renders them.
pub struct ProgressReporter {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
    cancel: watch::Receiver<bool>,
    label: String,
    hidden: bool,
    state: State,
    bar: Option<ProgressBar>,
}

/// Build a connected sink/reporter/cancel triple for one transfer.
pub fn progress_channel(
    label: impl Into<String>,
) -> (ProgressSink, ProgressReporter, CancelHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    (
        ProgressSink { tx },
        ProgressReporter {
            rx,
            cancel: cancel_rx,
            label: label.into(),
            hidden: false,
            state: State::Idle,
            bar: None,
        },
        CancelHandle { tx: cancel_tx },
    )
}

impl ProgressReporter {
    /// Consume events without drawing anything. Used by tests and by
    /// callers that want the state machine but no terminal output.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Run until the producer finishes, fails, or the observer is
    /// cancelled. A producer that already completed before this task was
    /// scheduled degrades to a drain with no animation.
    pub async fn run(mut self) -> ReporterOutcome {
        let mut outcome = ReporterOutcome::default();
        let mut cancel_open = true;
        loop {
            tokio::select! {
                changed = self.cancel.changed(), if cancel_open => {
                    match changed {
                        Ok(()) if *self.cancel.borrow() => {
                            outcome.cancelled = true;
                            self.finish("cancelled");
                            return outcome;
                        }
                        Ok(()) => {}
                        Err(_) => cancel_open = false,
                    }
                }
                event = self.rx.recv() => match event {
                    Some(ProgressEvent::Ratio(ratio)) => {
                        outcome.observed = true;
                        self.activate();
                        if let Some(bar) = &self.bar {
                            bar.set_position((ratio.clamp(0.0, 1.0) * RATIO_SCALE as f64) as u64);
                        }
                        if ratio >= 1.0 {
                            self.finish("done");
                            return outcome;
                        }
                    }
                    Some(ProgressEvent::Failed(message)) => {
                        outcome.observed = true;
                        outcome.failed = true;
                        self.finish(&message);
                        return outcome;
                    }
                    // Producer gone without a final ratio: either a silent
                    // transfer (no content length) or one that finished
                    // before we were scheduled. Not an error.
                    None => {
                        self.finish("done");
                        return outcome;
                    }
                }
            }
        }
    }

    fn activate(&mut self) {
        if self.state == State::Active {
            return;
        }
        self.state = State::Active;
        if self.hidden {
            return;
        }
        let bar = ProgressBar::with_draw_target(Some(RATIO_SCALE), ProgressDrawTarget::stderr());
        if let Some(style) = PB_TEMPLATE.as_ref() {
            bar.set_style(style.clone());
        }
        bar.set_message(self.label.clone());
        self.bar = Some(bar);
    }

    fn finish(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.abandon_with_message(format!("{} - {message}", self.label));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn idle_to_done_when_producer_sends_nothing() {
        let (sink, reporter, _cancel) = progress_channel("t");
        drop(sink);
        let outcome = reporter.hidden().run().await;
        assert_eq!(outcome, ReporterOutcome::default());
    }

    #[tokio::test]
    async fn final_ratio_completes_the_reporter() {
        let (sink, reporter, _cancel) = progress_channel("t");
        sink.ratio(0.25);
        sink.ratio(0.5);
        sink.ratio(1.0);
        let outcome = reporter.hidden().run().await;
        assert!(outcome.observed);
        assert!(!outcome.cancelled);
        assert!(!outcome.failed);
    }

    #[tokio::test]
    async fn failure_event_ends_with_failed_flag() {
        let (sink, reporter, _cancel) = progress_channel("t");
        sink.ratio(0.4);
        sink.failed("connection reset");
        let outcome = reporter.hidden().run().await;
        assert!(outcome.failed);
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn cancellation_detaches_without_failing() {
        let (sink, reporter, cancel) = progress_channel("t");
        sink.ratio(0.1);
        let task = tokio::spawn(reporter.hidden().run());
        cancel.cancel();
        let outcome = task.await.unwrap();
        assert!(outcome.cancelled);
        assert!(!outcome.failed);
        // producer keeps sending into the void without error
        sink.ratio(0.9);
        sink.ratio(1.0);
    }

    #[tokio::test]
    async fn producer_finishing_first_degrades_to_drain() {
        let (sink, reporter, _cancel) = progress_channel("t");
        for i in 1..=10 {
            sink.ratio(f64::from(i) / 10.0);
        }
        drop(sink);
        // reporter starts only after the producer is completely done
        let outcome = reporter.hidden().run().await;
        assert!(outcome.observed);
        assert!(!outcome.failed);
    }
}
