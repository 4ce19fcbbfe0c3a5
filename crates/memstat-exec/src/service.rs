//! `StatisticsService`: compilation hooks, the enable switch, and reporting.
//!
//! Lifecycle is one-way: a service starts disabled and `enable()` may be
//! called exactly once. The table is created at that moment and lives as long
//! as the service. `install()` is the process-level initialization routine;
//! it builds the one registry the runtime hands to its compiler threads.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use memstat_core::prelude::*;
use memstat_mem::PeakCounter;

use crate::context::CompilerThreadContext;
use crate::error::Result;
use crate::record::{RecordView, StatRecord};
use crate::table::{sort_by_size, Commit, StatTable};

static GLOBAL: OnceCell<StatisticsService> = OnceCell::new();

pub struct StatisticsService {
    enabled: AtomicBool,
    table: OnceCell<Mutex<StatTable>>,
    epoch: Instant,
    inline_out: Mutex<Box<dyn Write + Send>>,
}

impl Default for StatisticsService {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsService {
    /// A disabled service printing inline lines to stdout.
    pub fn new() -> Self {
        Self::with_inline_output(Box::new(std::io::stdout()))
    }

    /// A disabled service printing inline lines to `out`.
    pub fn with_inline_output(out: Box<dyn Write + Send>) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            table: OnceCell::new(),
            epoch: Instant::now(),
            inline_out: Mutex::new(out),
        }
    }

    /// Build the process-wide service from `config`. Panics if called twice.
    pub fn install(config: &StatConfig) -> &'static StatisticsService {
        let mut fresh = false;
        let service = GLOBAL.get_or_init(|| {
            fresh = true;
            let service = StatisticsService::new();
            if config.should_enable() {
                service.enable();
            }
            service
        });
        assert!(fresh, "statistics service installed twice");
        service
    }

    /// The service built by `install()`, if any.
    pub fn global() -> Option<&'static StatisticsService> {
        GLOBAL.get()
    }

    /// Create the table and flip the switch. Must be called at most once.
    pub fn enable(&self) {
        assert!(
            !self.enabled() && self.table.set(Mutex::new(StatTable::new())).is_ok(),
            "compilation memory statistic enabled twice"
        );
        self.enabled.store(true, Ordering::Release);
        tracing::info!("Compilation memory statistic enabled");
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Reset the thread's counter baseline.
    pub fn on_compilation_start(&self, ctx: &mut CompilerThreadContext) {
        debug_assert!(self.enabled(), "Not enabled?");
        if !self.enabled() {
            return;
        }
        ctx.start_episode();
    }

    /// Arena allocate/free hook. Returns true if a new peak was reached.
    pub fn on_arena_change(
        &self,
        ctx: &mut CompilerThreadContext,
        delta: isize,
        tag: ArenaTag,
    ) -> bool {
        debug_assert!(self.enabled(), "Not enabled?");
        if !self.enabled() {
            return false;
        }
        ctx.account(delta, tag)
    }

    /// Commit the thread's peak for its current task.
    pub fn on_compilation_end(&self, ctx: &mut CompilerThreadContext) {
        debug_assert!(self.enabled(), "Not enabled?");
        let Some(table) = self.table.get() else {
            return;
        };
        debug_assert!(ctx.task().is_some(), "compilation ended without a task");
        let Some(task) = ctx.task() else {
            return;
        };
        debug_assert!(
            task.directive().should_collect_memstat(),
            "Only call if memstat is enabled"
        );

        let method = task.method().clone();
        method.make_permanent();
        let kind = task.kind();
        let counter = ctx.counter();

        if task.directive().should_print_memstat() {
            self.print_inline(kind, &method, counter);
        }

        let commit = Commit {
            kind,
            peak: counter.snapshot(),
            time: self.epoch.elapsed().as_secs_f64(),
            thread: ctx.id(),
        };
        let mut table = table.lock();
        let record = table.upsert(&method, &commit);
        tracing::debug!(
            method = %method,
            total = commit.peak.total,
            recompilations = record.recompilations(),
            "memstat commit"
        );
    }

    fn print_inline(&self, kind: CompilerKind, method: &MethodIdentity, counter: &PeakCounter) {
        let mut out = self.inline_out.lock();
        if let Err(e) = writeln!(out, "{} Arena usage {}: {}", kind, method, counter) {
            tracing::warn!(error = %e, method = %method, "inline memstat print failed");
        }
    }

    /// Print every record with `total >= min_size`, largest first.
    ///
    /// Sorting and printing happen under the table lock so each row is self
    /// consistent; commits from other threads wait meanwhile.
    pub fn report(&self, out: &mut dyn Write, human_readable: bool, min_size: usize) -> Result<()> {
        writeln!(out, "Compilation memory statistics")?;

        if !self.enabled() {
            writeln!(out, "(unavailable)")?;
            return Ok(());
        }

        writeln!(out)?;
        StatRecord::print_legend(out)?;
        writeln!(out)?;

        if min_size > 0 {
            writeln!(out, " (cutoff: {} bytes)", min_size)?;
        }
        writeln!(out)?;

        StatRecord::print_header(out)?;

        let Some(table) = self.table.get() else {
            writeln!(out, "Not initialized.")?;
            return Ok(());
        };

        let table = table.lock();
        let mut filtered = table.snapshot(min_size);
        if min_size > 0 {
            writeln!(out, "({}/{})", filtered.len(), table.len())?;
        }
        if filtered.is_empty() {
            writeln!(out, "No entries.")?;
        } else {
            sort_by_size(&mut filtered);
            for record in &filtered {
                record.print_on(out, human_readable)?;
            }
        }
        Ok(())
    }

    /// Same selection and order as `report`, as a JSON array.
    pub fn report_json(&self, min_size: usize) -> Result<serde_json::Value> {
        let views: Vec<RecordView> = match self.table.get() {
            Some(table) => {
                let table = table.lock();
                let mut filtered = table.snapshot(min_size);
                sort_by_size(&mut filtered);
                filtered.iter().map(|r| r.to_view()).collect()
            }
            None => Vec::new(),
        };
        Ok(serde_json::to_value(views)?)
    }

    /// Copy of the record for `method`.
    pub fn lookup(&self, method: &MethodIdentity) -> Option<StatRecord> {
        self.table.get()?.lock().get(method).cloned()
    }

    /// Number of distinct methods recorded.
    pub fn len(&self) -> usize {
        self.table.get().map_or(0, |t| t.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
