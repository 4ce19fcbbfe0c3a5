//! Per-thread compilation context.
//!
//! Each compiler thread owns one `CompilerThreadContext` and hands it to the
//! service hooks by `&mut`. Nothing in here is shared, so the hot path takes no
//! lock.

use std::sync::Arc;

use memstat_core::prelude::*;
use memstat_mem::PeakCounter;

/// The compilation a thread is working on.
#[derive(Clone)]
pub struct CompileTask {
    method: MethodIdentity,
    kind: CompilerKind,
    directive: CompileDirective,
    live_nodes: Option<Arc<dyn LiveNodeSource>>,
}

impl CompileTask {
    pub fn new(method: MethodIdentity, kind: CompilerKind, directive: CompileDirective) -> Self {
        Self {
            method,
            kind,
            directive,
            live_nodes: None,
        }
    }

    /// Attach the engine's live node counter. Only sampled for C2 compilations.
    pub fn with_live_nodes(mut self, source: Arc<dyn LiveNodeSource>) -> Self {
        self.live_nodes = Some(source);
        self
    }

    pub fn method(&self) -> &MethodIdentity {
        &self.method
    }

    pub fn kind(&self) -> CompilerKind {
        self.kind
    }

    pub fn directive(&self) -> &CompileDirective {
        &self.directive
    }

    fn node_source(&self) -> Option<&dyn LiveNodeSource> {
        match self.kind {
            CompilerKind::C2 => self.live_nodes.as_deref(),
            _ => None,
        }
    }
}

pub struct CompilerThreadContext {
    id: CompilerThreadId,
    counter: PeakCounter,
    task: Option<CompileTask>,
}

impl Default for CompilerThreadContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerThreadContext {
    pub fn new() -> Self {
        Self {
            id: CompilerThreadId::next(),
            counter: PeakCounter::new(),
            task: None,
        }
    }

    pub fn id(&self) -> CompilerThreadId {
        self.id
    }

    pub fn counter(&self) -> &PeakCounter {
        &self.counter
    }

    pub fn task(&self) -> Option<&CompileTask> {
        self.task.as_ref()
    }

    /// Install the next task; returns the previous one.
    pub fn set_task(&mut self, task: CompileTask) -> Option<CompileTask> {
        self.task.replace(task)
    }

    pub fn clear_task(&mut self) -> Option<CompileTask> {
        self.task.take()
    }

    pub(crate) fn start_episode(&mut self) {
        self.counter.start();
    }

    /// Route one arena event into this thread's counter.
    pub(crate) fn account(&mut self, delta: isize, tag: ArenaTag) -> bool {
        let nodes = self.task.as_ref().and_then(CompileTask::node_source);
        self.counter.account(delta, tag, nodes)
    }
}
