//! Background workers for loads and pipeline runs.
//!
//! Each request runs on its own thread and reports exactly one
//! [`WorkerMessage`] on the session's channel, even when the work panics.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use vp_pca::{PreprocessingConfig, Reducer, Reduction};
use vp_spectra::{AveragedSpectrum, LoadedSpectra, SpectrumLoader};

use crate::pipeline::run_pipeline;

/// Monotonic per-session request number.
pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Load,
    Pipeline,
}

#[derive(Debug)]
pub enum WorkerMessage {
    Loaded {
        run: RunId,
        loaded: Box<LoadedSpectra>,
    },
    Reduced {
        run: RunId,
        labels: Vec<String>,
        config: PreprocessingConfig,
        reduction: Reduction,
    },
    Failed {
        run: RunId,
        kind: RunKind,
        message: String,
    },
}

impl WorkerMessage {
    pub fn run(&self) -> RunId {
        match self {
            WorkerMessage::Loaded { run, .. }
            | WorkerMessage::Reduced { run, .. }
            | WorkerMessage::Failed { run, .. } => *run,
        }
    }
}

/// Run `work`, turning a panic into a `Failed` message, and send the result.
fn report(
    run: RunId,
    kind: RunKind,
    tx: &Sender<WorkerMessage>,
    work: impl FnOnce() -> WorkerMessage,
) {
    let message = panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        let message = format!("worker panicked: {}", panic_text(payload.as_ref()));
        tracing::error!(run, ?kind, "{message}");
        WorkerMessage::Failed { run, kind, message }
    });
    // The session may be gone; nobody is left to tell.
    let _ = tx.send(message);
}

fn panic_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown cause"
    }
}

pub(crate) fn spawn_pipeline(
    run: RunId,
    spectrum: AveragedSpectrum,
    config: PreprocessingConfig,
    reducer: Arc<dyn Reducer>,
    tx: Sender<WorkerMessage>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        report(run, RunKind::Pipeline, &tx, || {
            match run_pipeline(spectrum.matrix(), &config, reducer.as_ref()) {
                Ok(reduction) => WorkerMessage::Reduced {
                    run,
                    labels: spectrum.labels().to_vec(),
                    config,
                    reduction,
                },
                Err(e) => WorkerMessage::Failed {
                    run,
                    kind: RunKind::Pipeline,
                    message: e.to_string(),
                },
            }
        });
    })
}

pub(crate) fn spawn_load(
    run: RunId,
    loader: SpectrumLoader,
    path: PathBuf,
    tx: Sender<WorkerMessage>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        report(run, RunKind::Load, &tx, || match loader.load(&path) {
            Ok(loaded) => WorkerMessage::Loaded {
                run,
                loaded: Box::new(loaded),
            },
            Err(e) => WorkerMessage::Failed {
                run,
                kind: RunKind::Load,
                message: e.to_string(),
            },
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn panicking_work_still_reports_once() {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            report(7, RunKind::Pipeline, &tx, || panic!("boom"));
        })
        .join()
        .unwrap();
        match rx.try_recv().unwrap() {
            WorkerMessage::Failed { run, kind, message } => {
                assert_eq!(run, 7);
                assert_eq!(kind, RunKind::Pipeline);
                assert_eq!(message, "worker panicked: boom");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn formatted_panic_text_is_kept() {
        let (tx, rx) = mpsc::channel();
        report(1, RunKind::Load, &tx, || panic!("bad row {}", 3));
        assert!(matches!(
            rx.try_recv().unwrap(),
            WorkerMessage::Failed { message, .. } if message == "worker panicked: bad row 3"
        ));
    }
}
