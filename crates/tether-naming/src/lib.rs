//! Hierarchy naming resolver.
//!
//! Assigns every member a translated name such that members linked by
//! override/implements edges share a name, since the target language looks
//! methods up by name only. Runs once per compilation over the fully loaded
//! declaration graph:
//!
//! 1. seed every member with its fixed name, short name or auto name
//! 2. propagate names down the edges to a fixed point ([`propagate`])
//! 3. report divergent fixed names and collisions on concrete types
//!    ([`conflict`])

pub mod conflict;
pub mod error;
pub mod graph;
pub mod names;
pub mod propagate;

use serde::Serialize;
use tether_common::decl::{CompilationUnit, MemberId};

pub use error::{ConflictKind, NameConflict};
pub use graph::{Edge, EdgeKind, HierarchyGraph};
pub use names::NameOrigin;
pub use propagate::Propagation;

/// The final name of one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedName {
    pub member: MemberId,
    pub name: String,
    /// Further names the member must answer to, one per losing inherited name.
    pub aliases: Vec<String>,
    pub origin: NameOrigin,
    /// Member the name was seeded on.
    pub seed: MemberId,
    /// Declared on a host-only type; excluded from propagation and checks.
    pub host_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingResult {
    /// Indexed by `MemberId`.
    pub names: Vec<ResolvedName>,
    /// Sorted by kind, then seed pair.
    pub conflicts: Vec<NameConflict>,
}

impl NamingResult {
    pub fn name_of(&self, id: MemberId) -> &str {
        &self.names[id.0 as usize].name
    }
}

/// Resolve names for every member of the unit.
#[tracing::instrument(skip_all, fields(members = unit.members.len()))]
pub fn resolve_names(unit: &CompilationUnit) -> NamingResult {
    let graph = HierarchyGraph::build(unit);
    let mut propagation = Propagation::new(unit, &graph);
    propagation.propagate();

    let names: Vec<ResolvedName> = (0..propagation.member_count() as u32)
        .map(MemberId)
        .map(|id| {
            let state = propagation.state(id);
            ResolvedName {
                member: id,
                name: state.winner.name.clone(),
                aliases: state.aliases.iter().cloned().collect(),
                origin: state.winner.origin,
                seed: state.winner.seed,
                host_only: !graph.is_tracked(id),
            }
        })
        .collect();

    let mut conflicts = conflict::divergent(unit, &graph, &propagation);
    conflicts.extend(conflict::collisions(unit, &graph, &names));
    conflicts.sort_by(|a, b| (a.kind, a.first, a.second).cmp(&(b.kind, b.first, b.second)));

    tracing::debug!(conflicts = conflicts.len(), "naming pass finished");
    NamingResult { names, conflicts }
}
