//! Arena and compiler tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag carried by every arena; decides which category an allocation lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArenaTag {
    /// Untagged arena; counted in the total only.
    Other,
    /// Resource area (general scratch memory).
    #[serde(alias = "ra")]
    Resource,
    /// Handle area; counted in the total only.
    Handle,
    /// Node arena (IR nodes).
    #[serde(alias = "na")]
    Node,
}

/// Which compiler produced a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerKind {
    #[default]
    C1,
    C2,
    Jvmci,
    None,
}

impl CompilerKind {
    pub fn name(self) -> &'static str {
        match self {
            CompilerKind::C1 => "c1",
            CompilerKind::C2 => "c2",
            CompilerKind::Jvmci => "jvmci",
            CompilerKind::None => "none",
        }
    }
}

impl fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
