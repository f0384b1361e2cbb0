//! petgraph-backed grouping.
//!
//! Chained groups are the connected components, found by union-find over the
//! edges; strict groups come from Bron–Kerbosch with pivoting.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::common::{Member, OrthoGroup};

use super::{Adjacency, GroupingStrategy};

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphStrategy;

struct MemberGraph<'a> {
    graph: UnGraph<&'a Member, ()>,
}

impl<'a> MemberGraph<'a> {
    fn build(adjacency: &'a Adjacency) -> Self {
        let mut graph: UnGraph<&'a Member, ()> =
            UnGraph::with_capacity(adjacency.vertex_count(), adjacency.edge_count());
        let mut index: FxHashMap<&'a Member, NodeIndex> = FxHashMap::default();
        for (member, _) in adjacency.iter() {
            index.insert(member, graph.add_node(member));
        }
        for (member, neighbors) in adjacency.iter() {
            let a = index[member];
            for other in neighbors.iter().filter(|o| member < *o) {
                graph.add_edge(a, index[other], ());
            }
        }
        Self { graph }
    }

    fn group(&self, nodes: &[NodeIndex]) -> OrthoGroup {
        OrthoGroup::new(nodes.iter().map(|&n| self.graph[n].clone()).collect())
    }

    fn neighbor_sets(&self) -> Vec<FxHashSet<NodeIndex>> {
        self.graph
            .node_indices()
            .map(|n| self.graph.neighbors(n).collect())
            .collect()
    }
}

fn bron_kerbosch(
    clique: &mut Vec<NodeIndex>,
    mut candidates: FxHashSet<NodeIndex>,
    mut excluded: FxHashSet<NodeIndex>,
    neighbors: &[FxHashSet<NodeIndex>],
    out: &mut Vec<Vec<NodeIndex>>,
) {
    if candidates.is_empty() && excluded.is_empty() {
        if clique.len() >= 2 {
            out.push(clique.clone());
        }
        return;
    }

    // Pivot with the most neighbors among the candidates.
    let Some(pivot) = candidates
        .iter()
        .chain(excluded.iter())
        .max_by_key(|u| candidates.intersection(&neighbors[u.index()]).count())
        .copied()
    else {
        return;
    };
    let branch: Vec<NodeIndex> = candidates
        .difference(&neighbors[pivot.index()])
        .copied()
        .collect();

    for v in branch {
        let nv = &neighbors[v.index()];
        clique.push(v);
        bron_kerbosch(
            clique,
            candidates.intersection(nv).copied().collect(),
            excluded.intersection(nv).copied().collect(),
            neighbors,
            out,
        );
        clique.pop();
        candidates.remove(&v);
        excluded.insert(v);
    }
}

impl GroupingStrategy for GraphStrategy {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn chained_groups(&self, adjacency: &Adjacency) -> Vec<OrthoGroup> {
        let g = MemberGraph::build(adjacency);
        let mut components = UnionFind::<usize>::new(g.graph.node_count());
        for edge in g.graph.edge_references() {
            components.union(edge.source().index(), edge.target().index());
        }

        let mut by_root: FxHashMap<usize, Vec<NodeIndex>> = FxHashMap::default();
        for (node, root) in components.into_labeling().into_iter().enumerate() {
            by_root.entry(root).or_default().push(NodeIndex::new(node));
        }
        by_root.values().map(|nodes| g.group(nodes)).collect()
    }

    fn strict_groups(&self, adjacency: &Adjacency) -> Vec<OrthoGroup> {
        let g = MemberGraph::build(adjacency);
        let neighbors = g.neighbor_sets();
        let mut cliques = Vec::new();
        bron_kerbosch(
            &mut Vec::new(),
            g.graph.node_indices().collect(),
            FxHashSet::default(),
            &neighbors,
            &mut cliques,
        );
        cliques.iter().map(|c| g.group(c)).collect()
    }
}
