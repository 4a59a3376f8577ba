//! Member hierarchy as an arena-indexed DAG.
//!
//! Nodes are members, addressed by their `MemberId` index. An edge runs
//! from an ancestor member to the member that overrides or implements it.
//! Members declared on host-only types are not part of the graph: they get
//! no edges and take no part in propagation or conflict checks.

use tether_common::decl::{CompilationUnit, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeKind {
    Overrides,
    Implements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    /// The overridden or implemented member.
    pub ancestor: MemberId,
    pub descendant: MemberId,
    pub kind: EdgeKind,
}

#[derive(Debug)]
pub struct HierarchyGraph {
    tracked: Vec<bool>,
    edges: Vec<Edge>,
    /// Edge indices by ancestor.
    outgoing: Vec<Vec<usize>>,
    /// Edge indices by descendant.
    incoming: Vec<Vec<usize>>,
}

impl HierarchyGraph {
    pub fn build(unit: &CompilationUnit) -> Self {
        let count = unit.members.len();
        let tracked: Vec<bool> = unit
            .members
            .iter()
            .map(|m| !unit.ty(m.declaring_type).host_only)
            .collect();

        let mut graph = Self {
            tracked,
            edges: Vec::new(),
            outgoing: vec![Vec::new(); count],
            incoming: vec![Vec::new(); count],
        };

        for (id, member) in unit.member_ids() {
            let links = member
                .overrides
                .iter()
                .map(|&a| (a, EdgeKind::Overrides))
                .chain(member.implements.iter().map(|&a| (a, EdgeKind::Implements)));
            for (ancestor, kind) in links {
                if (ancestor.0 as usize) < count {
                    graph.add_edge(Edge {
                        ancestor,
                        descendant: id,
                        kind,
                    });
                }
            }
        }

        tracing::debug!(
            members = count,
            edges = graph.edges.len(),
            "built member hierarchy"
        );
        graph
    }

    fn add_edge(&mut self, edge: Edge) {
        if !self.is_tracked(edge.ancestor) || !self.is_tracked(edge.descendant) {
            return;
        }
        if self.edges.contains(&edge) {
            return;
        }
        let index = self.edges.len();
        self.outgoing[edge.ancestor.0 as usize].push(index);
        self.incoming[edge.descendant.0 as usize].push(index);
        self.edges.push(edge);
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Whether the member takes part in propagation and conflict checks.
    pub fn is_tracked(&self, id: MemberId) -> bool {
        self.tracked.get(id.0 as usize).copied().unwrap_or(false)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Direct ancestors of `id`.
    pub fn parents(&self, id: MemberId) -> impl Iterator<Item = MemberId> + '_ {
        self.incoming[id.0 as usize]
            .iter()
            .map(|&e| self.edges[e].ancestor)
    }

    /// Direct descendants of `id`.
    pub fn children(&self, id: MemberId) -> impl Iterator<Item = MemberId> + '_ {
        self.outgoing[id.0 as usize]
            .iter()
            .map(|&e| self.edges[e].descendant)
    }
}
