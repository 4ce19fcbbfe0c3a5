#![forbid(unsafe_code)]
//! memstat-exec: statistics table, compilation hooks, scope guard, reporting,
//! and trace replay.
//!
//! One `StatisticsService` per process owns the `StatTable`. Compiler threads
//! carry their own `CompilerThreadContext` (and with it their `PeakCounter`)
//! and pass it into the hooks; the table lock is only taken when a compilation
//! commits and while a report is rendered.

pub mod context;
pub mod error;
pub mod guard;
pub mod record;
pub mod replay;
pub mod service;
pub mod table;

pub use context::{CompileTask, CompilerThreadContext};
pub use error::{ExecError, Result};
pub use guard::ScopedTrackingGuard;
pub use record::StatRecord;
pub use replay::{parse_yaml_trace, replay, ReplayOutcome, Trace};
pub use service::StatisticsService;
pub use table::{Commit, StatTable};
