//! Replay of recorded compilation traces.
//!
//! A trace lists compilations and the arena events each one produced. Replay
//! runs them on a small pool of worker threads, each owning one
//! `CompilerThreadContext`, and drives the same hooks a compiler would.
//!
//! Example:
//! ```yaml
//! threads: 2
//! compilations:
//!   - class: "java/lang/String"
//!     method: "indexOf"
//!     signature: "(I)I"
//!     compiler: c2
//!     directive: { collect: true, print: false }
//!     events:
//!       - { delta: 4096, tag: node, live_nodes: 120 }
//!       - { delta: 1024, tag: resource }
//!       - { delta: -4096, tag: node }
//! ```

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use memstat_core::prelude::*;

use crate::context::{CompileTask, CompilerThreadContext};
use crate::error::{ExecError, Result};
use crate::guard::ScopedTrackingGuard;
use crate::service::StatisticsService;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Preferred worker count; callers may override.
    #[serde(default)]
    pub threads: Option<usize>,
    pub compilations: Vec<TraceCompilation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceCompilation {
    pub class: String,
    pub method: String,
    pub signature: String,
    #[serde(default)]
    pub compiler: CompilerKind,
    /// Explicit switches; when absent the config's commands decide.
    #[serde(default)]
    pub directive: Option<CompileDirective>,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TraceEvent {
    pub delta: isize,
    pub tag: ArenaTag,
    /// Live node count the engine would report from this point on.
    #[serde(default)]
    pub live_nodes: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub compilations: usize,
    /// Compilations that ran with collection on.
    pub tracked: usize,
}

/// Parse and validate a YAML trace.
pub fn parse_yaml_trace(yaml: &str) -> Result<Trace> {
    let trace: Trace = serde_yaml::from_str(yaml)?;
    trace.validate()?;
    Ok(trace)
}

impl Trace {
    pub fn validate(&self) -> Result<()> {
        for (i, c) in self.compilations.iter().enumerate() {
            if c.class.is_empty() || c.method.is_empty() {
                return Err(ExecError::Invalid(format!(
                    "compilation #{}: class and method must be non-empty",
                    i
                )));
            }
            if let Some(d) = c.directive {
                if d.print && !d.collect {
                    return Err(ExecError::Invalid(format!(
                        "compilation #{} ({}::{}): print requires collect",
                        i, c.class, c.method
                    )));
                }
            }
            let mut running: isize = 0;
            for (j, ev) in c.events.iter().enumerate() {
                running = running.saturating_add(ev.delta);
                if running < 0 {
                    return Err(ExecError::Invalid(format!(
                        "compilation #{} ({}::{}): event #{} frees more than was allocated",
                        i, c.class, c.method, j
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Run every compilation of `trace` on `threads` workers.
///
/// The trace is validated first; an invalid one is rejected before any
/// worker starts.
pub fn replay(
    service: &StatisticsService,
    symbols: &SymbolTable,
    trace: &Trace,
    config: &StatConfig,
    threads: usize,
) -> Result<ReplayOutcome> {
    trace.validate()?;
    let workers = threads.clamp(1, trace.compilations.len().max(1));
    let next = AtomicUsize::new(0);
    let tracked = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for _ in 0..workers {
            s.spawn(|| {
                let mut ctx = CompilerThreadContext::new();
                while let Some(c) = trace.compilations.get(next.fetch_add(1, Ordering::Relaxed)) {
                    if compile_one(service, symbols, config, &mut ctx, c) {
                        tracked.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    Ok(ReplayOutcome {
        compilations: trace.compilations.len(),
        tracked: tracked.into_inner(),
    })
}

fn compile_one(
    service: &StatisticsService,
    symbols: &SymbolTable,
    config: &StatConfig,
    ctx: &mut CompilerThreadContext,
    c: &TraceCompilation,
) -> bool {
    let method = MethodIdentity::intern(symbols, &c.class, &c.method, &c.signature);
    let directive = if service.enabled() {
        c.directive.unwrap_or_else(|| config.directive_for(&method))
    } else {
        CompileDirective::default()
    };

    let nodes = Arc::new(AtomicU32::new(0));
    let source = Arc::clone(&nodes);
    ctx.set_task(
        CompileTask::new(method, c.compiler, directive)
            .with_live_nodes(Arc::new(move || source.load(Ordering::Relaxed))),
    );

    let active = {
        let mut guard = ScopedTrackingGuard::new(service, ctx);
        for ev in &c.events {
            if let Some(n) = ev.live_nodes {
                nodes.store(n, Ordering::Relaxed);
            }
            guard.on_arena_change(ev.delta, ev.tag);
        }
        guard.is_active()
    };

    ctx.clear_task();
    active
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_running_total() {
        let yaml = r#"
compilations:
  - class: Foo
    method: bar
    signature: "()V"
    events:
      - { delta: 10, tag: node }
      - { delta: -20, tag: node }
"#;
        let err = parse_yaml_trace(yaml).unwrap_err();
        assert!(err.to_string().contains("frees more than was allocated"));
    }

    #[test]
    fn rejects_print_without_collect() {
        let yaml = r#"
compilations:
  - class: Foo
    method: bar
    signature: "()V"
    directive: { collect: false, print: true }
"#;
        assert!(parse_yaml_trace(yaml).is_err());
    }

    #[test]
    fn defaults_apply() {
        let yaml = r#"
compilations:
  - class: Foo
    method: bar
    signature: "()V"
"#;
        let trace = parse_yaml_trace(yaml).unwrap();
        assert_eq!(trace.threads, None);
        assert_eq!(trace.compilations[0].compiler, CompilerKind::C1);
        assert!(trace.compilations[0].directive.is_none());
        assert!(trace.compilations[0].events.is_empty());
    }

    #[test]
    fn replay_rejects_unvalidated_trace() {
        let trace = Trace {
            threads: None,
            compilations: vec![TraceCompilation {
                class: "Foo".into(),
                method: "bar".into(),
                signature: "()V".into(),
                compiler: CompilerKind::C2,
                directive: Some(CompileDirective::new(true, false)),
                events: vec![TraceEvent {
                    delta: -64,
                    tag: ArenaTag::Node,
                    live_nodes: None,
                }],
            }],
        };
        let service = StatisticsService::new();
        service.enable();
        let symbols = SymbolTable::new();
        let err = replay(&service, &symbols, &trace, &StatConfig::default(), 2).unwrap_err();
        assert!(err.to_string().contains("frees more than was allocated"));
        assert!(service.is_empty());
    }
}
