//! Naming conflicts.

use std::fmt;

use serde::Serialize;
use tether_common::decl::{MemberId, SourceLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ConflictKind {
    /// One member receives two different fixed names.
    Divergent,
    /// Two unrelated members end up with the same name on one concrete type.
    Collision,
}

/// A naming conflict between two seed members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameConflict {
    pub kind: ConflictKind,
    /// The two members the clashing names were seeded on, lower id first.
    pub first: MemberId,
    pub second: MemberId,
    /// Signatures of `first` and `second`.
    pub first_signature: String,
    pub second_signature: String,
    /// For a collision the shared name; for divergence the two fixed names.
    pub names: Vec<String>,
    /// Where the conflict shows up: the concrete type or the member that
    /// receives both names.
    pub site: String,
    pub location: SourceLocation,
}

impl fmt::Display for NameConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConflictKind::Collision => write!(
                f,
                "`{}` and `{}` both translate to `{}` on `{}`; annotate one of them with a distinct fixed name",
                self.first_signature,
                self.second_signature,
                self.names.join("`, `"),
                self.site
            ),
            ConflictKind::Divergent => write!(
                f,
                "`{}` inherits different fixed names (`{}`) from `{}` and `{}`; give them the same fixed name",
                self.site,
                self.names.join("`, `"),
                self.first_signature,
                self.second_signature
            ),
        }
    }
}

impl std::error::Error for NameConflict {}
