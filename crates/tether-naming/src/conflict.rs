//! Conflict detection over propagated names.
//!
//! Detection is lazy: two unrelated members with the same name are only a
//! problem once some concrete type provides both of them.

use std::collections::{BTreeMap, BTreeSet};

use ena::unify::{InPlaceUnificationTable, UnifyKey};
use tether_common::decl::{CompilationUnit, MemberId, TypeId};

use crate::error::{ConflictKind, NameConflict};
use crate::graph::HierarchyGraph;
use crate::names::NameOrigin;
use crate::propagate::Propagation;
use crate::ResolvedName;

// ── Connected components ───────────────────────────────────────────────

/// Union-find key for one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey(u32);

impl UnifyKey for ComponentKey {
    type Value = ();

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        ComponentKey(u)
    }

    fn tag() -> &'static str {
        "ComponentKey"
    }
}

/// Members connected by any chain of override/implements edges.
pub struct Components {
    table: InPlaceUnificationTable<ComponentKey>,
    keys: Vec<ComponentKey>,
}

impl Components {
    pub fn build(graph: &HierarchyGraph) -> Self {
        let mut table = InPlaceUnificationTable::new();
        let keys = (0..graph.len()).map(|_| table.new_key(())).collect();
        let mut components = Self { table, keys };
        for edge in graph.edges() {
            let a = components.key(edge.ancestor);
            let b = components.key(edge.descendant);
            components.table.union(a, b);
        }
        components
    }

    fn key(&self, id: MemberId) -> ComponentKey {
        self.keys[id.0 as usize]
    }

    /// Whether `a` and `b` are meant to be the same member.
    pub fn connected(&mut self, a: MemberId, b: MemberId) -> bool {
        let (ka, kb) = (self.key(a), self.key(b));
        self.table.find(ka) == self.table.find(kb)
    }
}

fn ordered(a: MemberId, b: MemberId) -> (MemberId, MemberId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ── Divergent fixed names ──────────────────────────────────────────────

/// Members that receive two different fixed names, one report per seed pair.
pub fn divergent(
    unit: &CompilationUnit,
    graph: &HierarchyGraph,
    propagation: &Propagation<'_>,
) -> Vec<NameConflict> {
    let mut reported = BTreeSet::new();
    let mut conflicts = Vec::new();

    for (id, member) in unit.member_ids() {
        if !graph.is_tracked(id) {
            continue;
        }
        let mut fixed: BTreeMap<&str, MemberId> = BTreeMap::new();
        let own = propagation.seed(id);
        if own.origin == NameOrigin::Fixed {
            fixed.insert(&own.name, id);
        }
        for parent in graph.parents(id) {
            let winner = &propagation.state(parent).winner;
            if winner.origin == NameOrigin::Fixed {
                let seed = fixed.entry(&winner.name).or_insert(winner.seed);
                *seed = (*seed).min(winner.seed);
            }
        }

        let mut names = fixed.into_iter();
        let (Some((first_name, first_seed)), Some((second_name, second_seed))) =
            (names.next(), names.next())
        else {
            continue;
        };
        let (first, second) = ordered(first_seed, second_seed);
        if !reported.insert((first, second)) {
            continue;
        }
        conflicts.push(NameConflict {
            kind: ConflictKind::Divergent,
            first,
            second,
            first_signature: unit.member_signature(first),
            second_signature: unit.member_signature(second),
            names: vec![first_name.to_string(), second_name.to_string()],
            site: unit.member_signature(id),
            location: member.location.clone(),
        });
    }
    conflicts
}

// ── Collisions on concrete types ───────────────────────────────────────

/// Unrelated members sharing a name or alias on one concrete type, one
/// report per seed pair.
pub fn collisions(
    unit: &CompilationUnit,
    graph: &HierarchyGraph,
    names: &[ResolvedName],
) -> Vec<NameConflict> {
    let mut components = Components::build(graph);
    let by_type = unit.members_by_type();
    let mut reported = BTreeSet::new();
    let mut conflicts = Vec::new();

    for (index, ty) in unit.types.iter().enumerate() {
        if !ty.is_concrete() || ty.host_only {
            continue;
        }
        let id = TypeId(index as u32);

        // Every name the type answers to, split by static/instance.
        let mut slots: BTreeMap<(bool, &str), Vec<MemberId>> = BTreeMap::new();
        let provided = std::iter::once(id)
            .chain(unit.supertypes(id))
            .filter_map(|t| by_type.get(&t))
            .flatten()
            .copied()
            .filter(|&m| graph.is_tracked(m));
        for member in provided {
            let resolved = &names[member.0 as usize];
            let is_static = unit.member(member).is_static;
            for name in std::iter::once(&resolved.name).chain(&resolved.aliases) {
                slots.entry((is_static, name.as_str())).or_default().push(member);
            }
        }

        for ((_, name), members) in &slots {
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    if components.connected(a, b) {
                        continue;
                    }
                    let (first, second) = ordered(names[a.0 as usize].seed, names[b.0 as usize].seed);
                    if !reported.insert((first, second)) {
                        continue;
                    }
                    tracing::debug!(
                        ty = %ty.name,
                        name = %name,
                        "name collision between unrelated members"
                    );
                    conflicts.push(NameConflict {
                        kind: ConflictKind::Collision,
                        first,
                        second,
                        first_signature: unit.member_signature(first),
                        second_signature: unit.member_signature(second),
                        names: vec![name.to_string()],
                        site: ty.name.clone(),
                        location: ty.location.clone(),
                    });
                }
            }
        }
    }
    conflicts
}
