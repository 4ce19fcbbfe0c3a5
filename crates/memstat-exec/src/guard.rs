//! RAII pairing of the start/end compilation hooks.
//!
//! Wrap the whole compilation in a `ScopedTrackingGuard`. If the task's
//! directive asks for collection the start hook runs now and the end hook runs
//! on drop, on every exit path including `?` returns and unwinding.

use memstat_core::prelude::ArenaTag;

use crate::context::CompilerThreadContext;
use crate::service::StatisticsService;

pub struct ScopedTrackingGuard<'a> {
    service: &'a StatisticsService,
    ctx: &'a mut CompilerThreadContext,
    active: bool,
}

impl<'a> ScopedTrackingGuard<'a> {
    /// Start tracking the task installed in `ctx`, if its directive collects
    /// and the service is enabled.
    pub fn new(service: &'a StatisticsService, ctx: &'a mut CompilerThreadContext) -> Self {
        let active = service.enabled()
            && ctx
                .task()
                .is_some_and(|t| t.directive().should_collect_memstat());
        if active {
            service.on_compilation_start(ctx);
        }
        Self {
            service,
            ctx,
            active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Forward an arena event. Accounted whenever the service is on, tracked or not.
    pub fn on_arena_change(&mut self, delta: isize, tag: ArenaTag) -> bool {
        if !self.service.enabled() {
            return false;
        }
        self.service.on_arena_change(self.ctx, delta, tag)
    }

    pub fn context(&self) -> &CompilerThreadContext {
        &*self.ctx
    }
}

impl Drop for ScopedTrackingGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            self.service.on_compilation_end(self.ctx);
        }
    }
}
