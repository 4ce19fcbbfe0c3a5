//! `MethodIdentity`: the (owning type, name, signature) key of a compiled method.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::symbol::{Symbol, SymbolTable};

#[derive(Clone, PartialEq, Eq)]
pub struct MethodIdentity {
    qualifier: Symbol,
    name: Symbol,
    signature: Symbol,
}

impl MethodIdentity {
    pub fn new(qualifier: Symbol, name: Symbol, signature: Symbol) -> Self {
        Self {
            qualifier,
            name,
            signature,
        }
    }

    /// Intern the three parts in `symbols` and build the identity.
    pub fn intern(symbols: &SymbolTable, qualifier: &str, name: &str, signature: &str) -> Self {
        Self::new(
            symbols.intern(qualifier),
            symbols.intern(name),
            symbols.intern(signature),
        )
    }

    pub fn qualifier(&self) -> &Symbol {
        &self.qualifier
    }

    pub fn name(&self) -> &Symbol {
        &self.name
    }

    pub fn signature(&self) -> &Symbol {
        &self.signature
    }

    /// XOR of the component hashes.
    pub fn compute_hash(&self) -> u32 {
        self.qualifier.identity_hash() ^ self.name.identity_hash() ^ self.signature.identity_hash()
    }

    /// Pin all three symbols; done once, right before a new table insert.
    pub fn make_permanent(&self) {
        self.qualifier.make_permanent();
        self.name.make_permanent();
        self.signature.make_permanent();
    }

    pub fn is_permanent(&self) -> bool {
        self.qualifier.is_permanent() && self.name.is_permanent() && self.signature.is_permanent()
    }
}

impl Hash for MethodIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.compute_hash());
    }
}

impl fmt::Display for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}({})", self.qualifier, self.name, self.signature)
    }
}

impl fmt::Debug for MethodIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodIdentity({})", self)
    }
}
