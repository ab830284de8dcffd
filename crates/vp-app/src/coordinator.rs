//! Several table sessions drawn on one shared chart.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use vp_core::{Bounds, IdAllocator, TableHandle};
use vp_pca::{Reducer, SvdReducer};
use vp_spectra::{SpectrumLoader, WorkerPool};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::session::{SessionEvent, TableSession};

/// Axis range used while no table has data, before padding.
pub const DEFAULT_AXIS_RANGE: Bounds = Bounds::new(-10.0, 10.0, -10.0, 10.0);

pub struct MultiTableCoordinator {
    config: AppConfig,
    pool: WorkerPool,
    reducer: Arc<dyn Reducer>,
    sessions: Vec<(TableHandle, TableSession)>,
    ids: IdAllocator,
    /// Raised by table change listeners, lowered when bounds are recomputed.
    dirty: Rc<Cell<bool>>,
    bounds: Cell<Bounds>,
}

impl std::fmt::Debug for MultiTableCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiTableCoordinator")
            .field("tables", &self.sessions.len())
            .field("pool", &self.pool)
            .field("bounds", &self.bounds.get())
            .finish()
    }
}

impl MultiTableCoordinator {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        Self::with_reducer(config, Arc::new(SvdReducer::default()))
    }

    pub fn with_reducer(config: AppConfig, reducer: Arc<dyn Reducer>) -> AppResult<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.worker_threads)?;
        let bounds = DEFAULT_AXIS_RANGE.padded(config.bounds_margin);
        Ok(Self {
            config,
            pool,
            reducer,
            sessions: Vec::new(),
            ids: IdAllocator::new(),
            dirty: Rc::new(Cell::new(false)),
            bounds: Cell::new(bounds),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Create an empty session named `table N`, N counting the new table.
    pub fn add_table(&mut self) -> TableHandle {
        let handle = self.ids.allocate();
        let name = format!("table {}", self.sessions.len() + 1);
        let loader = SpectrumLoader::new(self.pool.clone(), self.config.loader_options());
        let mut session = TableSession::new(name, Arc::clone(&self.reducer), loader, &self.config);
        let dirty = Rc::clone(&self.dirty);
        session.table_mut().subscribe(move |_| dirty.set(true));
        tracing::debug!(table = %handle, name = session.name(), "table added");
        self.sessions.push((handle, session));
        handle
    }

    pub fn remove_table(&mut self, handle: TableHandle) -> AppResult<TableSession> {
        let pos = self
            .sessions
            .iter()
            .position(|(h, _)| *h == handle)
            .ok_or(AppError::TableNotFound(handle))?;
        let (_, session) = self.sessions.remove(pos);
        tracing::debug!(table = %handle, name = session.name(), "table removed");
        self.dirty.set(true);
        Ok(session)
    }

    pub fn session(&self, handle: TableHandle) -> Option<&TableSession> {
        self.sessions.iter().find(|(h, _)| *h == handle).map(|(_, s)| s)
    }

    pub fn session_mut(&mut self, handle: TableHandle) -> Option<&mut TableSession> {
        self.sessions
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, s)| s)
    }

    pub fn sessions(&self) -> impl Iterator<Item = (TableHandle, &TableSession)> {
        self.sessions.iter().map(|(h, s)| (*h, s))
    }

    pub fn handles(&self) -> Vec<TableHandle> {
        self.sessions.iter().map(|(h, _)| *h).collect()
    }

    pub fn busy(&self) -> bool {
        self.sessions.iter().any(|(_, s)| s.busy())
    }

    /// Padded union of every table's data range.
    ///
    /// Recomputed on read whenever a table changed since the last call, so
    /// edits made through `session_mut` are visible without polling.
    pub fn combined_bounds(&self) -> Bounds {
        if self.dirty.get() {
            self.recompute_bounds()
        } else {
            self.bounds.get()
        }
    }

    pub fn recompute_bounds(&self) -> Bounds {
        let raw = self
            .sessions
            .iter()
            .filter_map(|(_, s)| s.table().range_bounds())
            .reduce(|a, b| a.union(&b))
            .unwrap_or(DEFAULT_AXIS_RANGE);
        let bounds = raw.padded(self.config.bounds_margin);
        self.bounds.set(bounds);
        self.dirty.set(false);
        tracing::debug!(
            xmin = bounds.xmin,
            xmax = bounds.xmax,
            ymin = bounds.ymin,
            ymax = bounds.ymax,
            "combined bounds updated"
        );
        bounds
    }

    /// Poll every session; bounds follow whenever any table changed.
    pub fn poll(&mut self) -> Vec<(TableHandle, SessionEvent)> {
        let mut events = Vec::new();
        for (handle, session) in &mut self.sessions {
            events.extend(session.poll().into_iter().map(|e| (*handle, e)));
        }
        if self.dirty.get() {
            self.recompute_bounds();
        }
        events
    }

    /// Block until every session is idle.
    pub fn wait_idle(&mut self) -> Vec<(TableHandle, SessionEvent)> {
        let mut events = Vec::new();
        for (handle, session) in &mut self.sessions {
            events.extend(session.wait_idle().into_iter().map(|e| (*handle, e)));
        }
        if self.dirty.get() {
            self.recompute_bounds();
        }
        events
    }
}
