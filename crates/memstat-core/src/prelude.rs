//! Convenient re-exports for downstream crates.

pub use crate::config::{CompileDirective, MemStatCommand, MemStatMode, MethodPattern, StatConfig};
pub use crate::error::{Error, Result};
pub use crate::hooks::LiveNodeSource;
pub use crate::id::CompilerThreadId;
pub use crate::method::MethodIdentity;
pub use crate::symbol::{Symbol, SymbolTable};
pub use crate::types::{ArenaTag, CompilerKind};
