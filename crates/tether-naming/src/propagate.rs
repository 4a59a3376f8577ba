//! Name propagation along override/implements edges.
//!
//! Every member starts from its seed name. A member's state is recomputed
//! from its own seed and its parents' current states until nothing changes:
//!
//! - an explicit fixed name beats a short name, which beats an inherited
//!   auto name, which beats the member's own auto name
//! - equal ranks are decided by the seed member's auto name
//! - inherited names that lose are kept as aliases
//!
//! On a DAG this has exactly one fixed point, so the result does not depend
//! on member order and a second run reports no changes.

use std::cmp::Reverse;
use std::collections::{BTreeSet, VecDeque};

use tether_common::decl::{CompilationUnit, MemberId};

use crate::graph::HierarchyGraph;
use crate::names::{auto_name, seed_name, NameOrigin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub origin: NameOrigin,
    /// Member the name was seeded on.
    pub seed: MemberId,
    /// Whether the name arrived over an edge.
    pub inherited: bool,
}

impl Candidate {
    fn rank(&self) -> u8 {
        match (self.origin, self.inherited) {
            (NameOrigin::Fixed, _) => 3,
            (NameOrigin::ShortName, _) => 2,
            (NameOrigin::Auto, true) => 1,
            (NameOrigin::Auto, false) => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameState {
    pub winner: Candidate,
    pub aliases: BTreeSet<String>,
}

pub struct Propagation<'g> {
    graph: &'g HierarchyGraph,
    seeds: Vec<Candidate>,
    /// Auto long name of every member, the tie-break key.
    auto_names: Vec<String>,
    states: Vec<NameState>,
}

impl<'g> Propagation<'g> {
    pub fn new(unit: &CompilationUnit, graph: &'g HierarchyGraph) -> Self {
        let seeds: Vec<Candidate> = unit
            .member_ids()
            .map(|(id, _)| {
                let (name, origin) = seed_name(unit, id);
                Candidate {
                    name,
                    origin,
                    seed: id,
                    inherited: false,
                }
            })
            .collect();
        let auto_names = unit.member_ids().map(|(id, _)| auto_name(unit, id)).collect();
        let states = seeds
            .iter()
            .map(|seed| NameState {
                winner: seed.clone(),
                aliases: BTreeSet::new(),
            })
            .collect();
        Self {
            graph,
            seeds,
            auto_names,
            states,
        }
    }

    pub fn state(&self, id: MemberId) -> &NameState {
        &self.states[id.0 as usize]
    }

    pub fn seed(&self, id: MemberId) -> &Candidate {
        &self.seeds[id.0 as usize]
    }

    pub fn auto_name(&self, id: MemberId) -> &str {
        &self.auto_names[id.0 as usize]
    }

    pub fn member_count(&self) -> usize {
        self.states.len()
    }

    /// Run the worklist to a fixed point. Returns the number of state
    /// changes made.
    pub fn propagate(&mut self) -> usize {
        let count = self.states.len();
        let mut queued = vec![true; count];
        let mut worklist: VecDeque<MemberId> = (0..count as u32).map(MemberId).collect();
        let mut changes = 0;

        while let Some(id) = worklist.pop_front() {
            queued[id.0 as usize] = false;
            if !self.graph.is_tracked(id) {
                continue;
            }
            let next = self.compute(id);
            if next == self.states[id.0 as usize] {
                continue;
            }
            self.states[id.0 as usize] = next;
            changes += 1;
            for child in self.graph.children(id) {
                if !std::mem::replace(&mut queued[child.0 as usize], true) {
                    worklist.push_back(child);
                }
            }
        }

        tracing::debug!(changes, "name propagation reached a fixed point");
        changes
    }

    fn compute(&self, id: MemberId) -> NameState {
        let own = self.seeds[id.0 as usize].clone();
        let mut incoming: Vec<Candidate> = Vec::new();
        let mut inherited_names = BTreeSet::new();

        for parent in self.graph.parents(id) {
            let state = &self.states[parent.0 as usize];
            inherited_names.insert(state.winner.name.clone());
            inherited_names.extend(state.aliases.iter().cloned());
            incoming.push(Candidate {
                inherited: true,
                ..state.winner.clone()
            });
        }

        let winner = std::iter::once(own)
            .chain(incoming)
            .min_by(|a, b| {
                let key = |c: &Candidate| {
                    (
                        Reverse(c.rank()),
                        self.auto_names[c.seed.0 as usize].clone(),
                        c.name.clone(),
                    )
                };
                key(a).cmp(&key(b))
            })
            .unwrap_or_else(|| self.seeds[id.0 as usize].clone());

        inherited_names.remove(&winner.name);
        NameState {
            winner,
            aliases: inherited_names,
        }
    }
}
