//! vp-app: application services shared by the CLI and any graphical shell.
//!
//! Everything here runs on the interactive thread except the pipeline and
//! load workers, which report back over a channel drained by
//! [`TableSession::poll`].

pub mod config;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod session;
pub mod worker;
pub mod workspace;

pub use config::{AppConfig, RunPolicy};
pub use coordinator::{DEFAULT_AXIS_RANGE, MultiTableCoordinator};
pub use error::{AppError, AppResult};
pub use export::{png_path, save_table_csv, write_table_csv};
pub use pipeline::{rows_from_reduction, run_pipeline};
pub use session::{HoverTarget, PcaSummary, SessionEvent, TableSession};
pub use worker::{RunId, RunKind, WorkerMessage};
pub use workspace::{ChartWorkspace, cursor_readout};
