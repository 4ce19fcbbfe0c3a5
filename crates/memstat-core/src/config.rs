//! Statistics configuration that downstream crates can serialize/deserialize.
//!
//! Which compilations are tracked is decided per method by `MemStatCommand`s;
//! the result for one compilation is a `CompileDirective`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::method::MethodIdentity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatConfig {
    /// Turn the service on even without any command.
    pub enabled: bool,

    /// Per-method opt-in commands. Later commands override earlier ones.
    pub commands: Vec<MemStatCommand>,

    /// Render byte counts with K/M/G suffixes in reports.
    pub human_readable: bool,

    /// Report cutoff in bytes; 0 reports everything.
    pub min_size: usize,

    /// Worker threads used when replaying a trace.
    pub threads: usize,
}

impl Default for StatConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            commands: Vec::new(),
            human_readable: false,
            min_size: 0,
            threads: 2,
        }
    }
}

impl StatConfig {
    /// Build a config from `MEMSTAT_*` environment variables on top of defaults.
    /// Malformed values are ignored, except commands which must parse.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("MEMSTAT_ENABLED") {
            if let Some(v) = parse_bool(&s) {
                cfg.enabled = v;
            }
        }

        if let Ok(s) = std::env::var("MEMSTAT_COMMANDS") {
            cfg.commands = parse_command_list(&s)?;
        }

        if let Ok(s) = std::env::var("MEMSTAT_HUMAN_READABLE") {
            if let Some(v) = parse_bool(&s) {
                cfg.human_readable = v;
            }
        }

        if let Ok(s) = std::env::var("MEMSTAT_MIN_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.min_size = v;
            }
        }

        if let Ok(s) = std::env::var("MEMSTAT_THREADS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.threads = v.max(1);
            }
        }

        Ok(cfg)
    }

    /// A MemStat command implies the service must be running.
    pub fn should_enable(&self) -> bool {
        self.enabled || !self.commands.is_empty()
    }

    /// Directive of the last command matching `method`, or nothing.
    pub fn directive_for(&self, method: &MethodIdentity) -> CompileDirective {
        self.commands
            .iter()
            .rev()
            .find(|c| c.pattern.matches(method))
            .map(|c| c.directive())
            .unwrap_or_default()
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a `;`-separated list of commands. Empty entries are skipped.
pub fn parse_command_list(s: &str) -> Result<Vec<MemStatCommand>> {
    s.split(';')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(MemStatCommand::parse)
        .collect()
}

/// Per-compilation switches. `print` implies `collect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileDirective {
    #[serde(default)]
    pub collect: bool,
    #[serde(default)]
    pub print: bool,
}

impl CompileDirective {
    pub const fn new(collect: bool, print: bool) -> Self {
        Self {
            collect: collect || print,
            print,
        }
    }

    pub const fn collect() -> Self {
        Self::new(true, false)
    }

    pub const fn print() -> Self {
        Self::new(true, true)
    }

    pub fn should_collect_memstat(&self) -> bool {
        self.collect || self.print
    }

    pub fn should_print_memstat(&self) -> bool {
        self.print
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemStatMode {
    Collect,
    Print,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemStatCommand {
    pub mode: MemStatMode,
    pub pattern: MethodPattern,
}

impl MemStatCommand {
    /// Parse `mode,pattern` or a bare `pattern` (collect).
    pub fn parse(s: &str) -> Result<Self> {
        let (mode, pattern) = match s.split_once(',') {
            Some((mode, pattern)) => {
                let mode = match mode.trim().to_ascii_lowercase().as_str() {
                    "collect" => MemStatMode::Collect,
                    "print" => MemStatMode::Print,
                    other => {
                        return Err(Error::Config(format!("unknown MemStat mode '{}'", other)))
                    }
                };
                (mode, pattern)
            }
            None => (MemStatMode::Collect, s),
        };
        Ok(Self {
            mode,
            pattern: MethodPattern::parse(pattern.trim())?,
        })
    }

    pub fn directive(&self) -> CompileDirective {
        match self.mode {
            MemStatMode::Collect => CompileDirective::collect(),
            MemStatMode::Print => CompileDirective::print(),
        }
    }
}

/// `Class.method` or `Class::method` pattern. Each part is `*`, `*x`, `x*`, `*x*` or exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodPattern {
    pub class: String,
    pub method: String,
}

impl MethodPattern {
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::Pattern(s.to_string()));
        }
        let (class, method) = if let Some((c, m)) = s.split_once("::") {
            (c, m)
        } else if let Some((c, m)) = s.rsplit_once('.') {
            (c, m)
        } else {
            (s, "*")
        };
        for part in [class, method] {
            let inner = part.trim_matches('*');
            if part.is_empty() || inner.contains('*') {
                return Err(Error::Pattern(s.to_string()));
            }
        }
        Ok(Self {
            class: class.to_string(),
            method: method.to_string(),
        })
    }

    pub fn matches(&self, method: &MethodIdentity) -> bool {
        part_matches(&self.class, method.qualifier().as_str())
            && part_matches(&self.method, method.name().as_str())
    }
}

fn part_matches(pattern: &str, text: &str) -> bool {
    let lead = pattern.starts_with('*');
    let trail = pattern.len() > 1 && pattern.ends_with('*');
    let core = pattern.trim_matches('*');
    match (lead, trail) {
        _ if core.is_empty() => true,
        (true, true) => text.contains(core),
        (true, false) => text.ends_with(core),
        (false, true) => text.starts_with(core),
        (false, false) => text == core,
    }
}
