//! One chart series: a sample table plus the machinery that fills it.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::JoinHandle;

use vp_core::{Point, within};
use vp_pca::{PreprocessingConfig, Reducer, Reduction};
use vp_spectra::{AveragedSpectrum, LoadReport, LoadedSpectra, SpectrumLoader};
use vp_table::{SampleTable, SelectionOutcome, SelectionProjector, TableChange};

use crate::config::{AppConfig, RunPolicy};
use crate::pipeline::rows_from_reduction;
use crate::worker::{RunId, RunKind, WorkerMessage, spawn_load, spawn_pipeline};

/// Explained variance and singular values of the current projection.
#[derive(Debug, Clone, PartialEq)]
pub struct PcaSummary {
    pub explained_variance_ratio: (f64, f64),
    pub singular_values: (f64, f64),
    pub preprocessing: PreprocessingConfig,
}

impl PcaSummary {
    fn from_reduction(reduction: &Reduction, preprocessing: PreprocessingConfig) -> Self {
        Self {
            explained_variance_ratio: reduction.explained_variance_ratio,
            singular_values: reduction.singular_values,
            preprocessing,
        }
    }

    /// Ratios as percentages with one decimal, e.g. `"72.4%"`.
    pub fn ratio_text(&self) -> (String, String) {
        let (a, b) = self.explained_variance_ratio;
        (format!("{:.1}%", a * 100.0), format!("{:.1}%", b * 100.0))
    }

    pub fn singular_text(&self) -> (String, String) {
        let (a, b) = self.singular_values;
        (format!("{a:.1}"), format!("{b:.1}"))
    }
}

impl fmt::Display for PcaSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r1, r2) = self.ratio_text();
        let (s1, s2) = self.singular_text();
        write!(
            f,
            "PC1 {r1} (sv {s1}), PC2 {r2} (sv {s2}), preprocessing: {}",
            self.preprocessing
        )
    }
}

/// The single plotted point under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverTarget {
    pub row: usize,
    pub label: String,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Loaded {
        source: PathBuf,
        rows: usize,
        cols: usize,
        report: LoadReport,
    },
    TableReplaced {
        /// Pipeline run whose result now fills the table.
        run: RunId,
        rows: usize,
        change: Option<TableChange>,
    },
    LoadFailed {
        message: String,
    },
    PipelineFailed {
        message: String,
    },
    /// A result arrived for a request that a newer one replaced.
    Superseded {
        run: RunId,
        kind: RunKind,
    },
}

pub struct TableSession {
    name: String,
    table: SampleTable,
    projector: SelectionProjector,
    preprocessing: PreprocessingConfig,
    spectrum: Option<AveragedSpectrum>,
    source: Option<PathBuf>,
    summary: Option<PcaSummary>,
    hover: Option<HoverTarget>,
    reducer: Arc<dyn Reducer>,
    loader: SpectrumLoader,
    policy: RunPolicy,
    hover_epsilon: f64,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    next_run: RunId,
    latest_load: Option<RunId>,
    latest_pipeline: Option<RunId>,
    in_flight: usize,
    workers: Vec<JoinHandle<()>>,
}

impl fmt::Debug for TableSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSession")
            .field("name", &self.name)
            .field("rows", &self.table.len())
            .field("preprocessing", &self.preprocessing)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl TableSession {
    pub fn new(
        name: impl Into<String>,
        reducer: Arc<dyn Reducer>,
        loader: SpectrumLoader,
        config: &AppConfig,
    ) -> Self {
        let (tx, rx) = channel();
        Self {
            name: name.into(),
            table: SampleTable::new(),
            projector: SelectionProjector::new(),
            preprocessing: config.preprocessing,
            spectrum: None,
            source: None,
            summary: None,
            hover: None,
            reducer,
            loader,
            policy: config.run_policy,
            hover_epsilon: config.hover_epsilon,
            tx,
            rx,
            next_run: 0,
            latest_load: None,
            latest_pipeline: None,
            in_flight: 0,
            workers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the legend entry of this series.
    pub fn set_series_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    /// Direct access for cell edits, pastes and subscriptions.
    pub fn table_mut(&mut self) -> &mut SampleTable {
        &mut self.table
    }

    pub fn spectrum(&self) -> Option<&AveragedSpectrum> {
        self.spectrum.as_ref()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn summary(&self) -> Option<&PcaSummary> {
        self.summary.as_ref()
    }

    pub fn preprocessing(&self) -> PreprocessingConfig {
        self.preprocessing
    }

    pub fn busy(&self) -> bool {
        self.in_flight > 0
    }

    fn allocate_run(&mut self) -> RunId {
        let run = self.next_run;
        self.next_run += 1;
        run
    }

    /// Load a manifest in the background. Prior data stays until it succeeds.
    pub fn request_load(&mut self, manifest: impl Into<PathBuf>) -> RunId {
        let run = self.allocate_run();
        let path = manifest.into();
        tracing::debug!(session = %self.name, run, manifest = %path.display(), "load requested");
        self.latest_load = Some(run);
        self.in_flight += 1;
        let handle = spawn_load(run, self.loader.clone(), path, self.tx.clone());
        self.workers.push(handle);
        run
    }

    /// Replace the spectrum and recompute the projection.
    pub fn set_spectrum(&mut self, spectrum: AveragedSpectrum) -> RunId {
        self.spectrum = Some(spectrum);
        self.schedule_pipeline()
    }

    /// Change preprocessing. Recomputes only when the value changed and data is present.
    pub fn set_config(&mut self, preprocessing: PreprocessingConfig) -> Option<RunId> {
        if preprocessing == self.preprocessing {
            return None;
        }
        self.preprocessing = preprocessing;
        if self.spectrum.is_some() {
            Some(self.schedule_pipeline())
        } else {
            None
        }
    }

    fn schedule_pipeline(&mut self) -> RunId {
        let run = self.allocate_run();
        self.latest_pipeline = Some(run);
        self.in_flight += 1;
        if let Some(spectrum) = &self.spectrum {
            tracing::debug!(
                session = %self.name,
                run,
                rows = spectrum.rows(),
                preprocessing = %self.preprocessing,
                "pipeline scheduled"
            );
            let handle = spawn_pipeline(
                run,
                spectrum.clone(),
                self.preprocessing,
                Arc::clone(&self.reducer),
                self.tx.clone(),
            );
            self.workers.push(handle);
        }
        run
    }

    /// Apply every finished result without blocking.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(message) => self.handle(message, &mut events),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.workers.retain(|h| !h.is_finished());
        events
    }

    /// Block until no load or pipeline run is in flight.
    pub fn wait_idle(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while self.in_flight > 0 {
            match self.rx.recv() {
                Ok(message) => self.handle(message, &mut events),
                Err(_) => break,
            }
        }
        self.workers.retain(|h| !h.is_finished());
        events
    }

    fn is_superseded(&self, run: RunId, kind: RunKind) -> bool {
        if self.policy == RunPolicy::LastFinishedWins {
            return false;
        }
        let latest = match kind {
            RunKind::Load => self.latest_load,
            RunKind::Pipeline => self.latest_pipeline,
        };
        latest.is_some_and(|latest| latest != run)
    }

    fn handle(&mut self, message: WorkerMessage, events: &mut Vec<SessionEvent>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let run = message.run();
        match message {
            WorkerMessage::Loaded { loaded, .. } => {
                if self.is_superseded(run, RunKind::Load) {
                    events.push(SessionEvent::Superseded {
                        run,
                        kind: RunKind::Load,
                    });
                    return;
                }
                self.apply_load(*loaded, events);
            }
            WorkerMessage::Reduced {
                labels,
                config,
                reduction,
                ..
            } => {
                if self.is_superseded(run, RunKind::Pipeline) {
                    tracing::debug!(session = %self.name, run, "stale pipeline result dropped");
                    events.push(SessionEvent::Superseded {
                        run,
                        kind: RunKind::Pipeline,
                    });
                    return;
                }
                self.apply_reduction(run, &labels, config, &reduction, events);
            }
            WorkerMessage::Failed { kind, message, .. } => {
                tracing::warn!(session = %self.name, run, ?kind, error = %message, "run failed");
                events.push(match kind {
                    RunKind::Load => SessionEvent::LoadFailed { message },
                    RunKind::Pipeline => SessionEvent::PipelineFailed { message },
                });
            }
        }
    }

    fn apply_load(&mut self, loaded: LoadedSpectra, events: &mut Vec<SessionEvent>) {
        let LoadedSpectra {
            source,
            spectrum,
            report,
        } = loaded;
        let (rows, cols) = spectrum.shape();
        events.push(SessionEvent::Loaded {
            source: source.clone(),
            rows,
            cols,
            report,
        });
        self.source = Some(source);
        self.set_spectrum(spectrum);
    }

    fn apply_reduction(
        &mut self,
        run: RunId,
        labels: &[String],
        config: PreprocessingConfig,
        reduction: &Reduction,
        events: &mut Vec<SessionEvent>,
    ) {
        let rows = rows_from_reduction(labels, reduction);
        let count = rows.len();
        let change = self.table.replace_all(rows);
        self.projector.clear();
        self.hover = None;
        self.summary = Some(PcaSummary::from_reduction(reduction, config));
        tracing::info!(session = %self.name, rows = count, preprocessing = %config, "table updated");
        events.push(SessionEvent::TableReplaced {
            run,
            rows: count,
            change,
        });
    }

    /// The unique row within the hover tolerance of `point`, if exactly one matches.
    pub fn hover(&mut self, point: Point) -> Option<&HoverTarget> {
        let eps = self.hover_epsilon;
        let mut matches = self.table.rows().iter().enumerate().filter(|(_, r)| {
            within(r.pc1, point.x, eps) && within(r.pc2, point.y, eps)
        });
        self.hover = match (matches.next(), matches.next()) {
            (Some((row, r)), None) => Some(HoverTarget {
                row,
                label: r.label.clone(),
                point: Point::new(r.pc1, r.pc2),
            }),
            _ => None,
        };
        self.hover.as_ref()
    }

    pub fn hover_target(&self) -> Option<&HoverTarget> {
        self.hover.as_ref()
    }

    pub fn hover_leave(&mut self) {
        self.hover = None;
    }

    /// Edit one cell; the selection view follows.
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) -> Option<TableChange> {
        let change = self.table.set_cell(row, col, value)?;
        self.after_edit();
        Some(change)
    }

    /// Paste tab-separated text at an anchor cell; the selection view follows.
    pub fn paste(&mut self, row: usize, col: usize, text: &str) -> Option<TableChange> {
        let change = self.table.paste(row, col, text)?;
        self.after_edit();
        Some(change)
    }

    /// Remove rows. Selected rows that survive keep their selection.
    pub fn remove_rows(&mut self, indices: &BTreeSet<usize>) -> Option<TableChange> {
        let change = self.table.remove(indices)?;
        self.projector.rows_removed(&self.table, indices);
        self.hover = None;
        Some(change)
    }

    fn after_edit(&mut self) {
        self.projector.refresh(&self.table);
        self.hover = None;
    }

    pub fn select_rows(&mut self, selected: &[usize]) -> SelectionOutcome {
        self.projector.update(&self.table, selected)
    }

    pub fn selection(&self) -> &[usize] {
        self.projector.selected()
    }

    /// Table of the selected rows, in selection order.
    pub fn selected_table(&self) -> &SampleTable {
        self.projector.derived()
    }
}
