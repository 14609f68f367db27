// SliceSim: Real-time network slice provisioning written in Rust
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Node ranking
//!
//! Each node is described by four attributes:
//!
//! - **Local Resource** `LR(v) = cpu(v) * sum(bw(e))` over all adjacent links.
//! - **Global Resource** `GR(v)`: the average over all other nodes `u` of the minimum bandwidth plus
//!   the minimum CPU along the shortest path from `v` to `u`.
//! - **Degree Centrality** `DC(v) = degree(v) / (|V| - 1)`.
//! - **Closeness Centrality** `CC(v) = (|V| - 1) / sum(dist(v, u))`, or `0` if the sum is `0`.
//!
//! The score of a node is `S(v) = alpha * LR(v) * DC(v) + beta * GR(v) * CC(v)`. While placing a
//! slice node, the score of a physical candidate is divided by `H(v) + epsilon`, where `H(v)` is the
//! sum of hop distances from `v` to the physical nodes already hosting the neighbors of that slice
//! node.
//!
//! Shortest paths are computed by hop count with a breadth-first search from every node. The BFS
//! visits neighbors in ascending order, and the predecessor of a node is always its neighbor with
//! the lowest id that is one hop closer to the source. All values are computed on a frozen snapshot
//! of the graph, which allows the searches to run in parallel.

use std::collections::VecDeque;

use itertools::Itertools;
use petgraph::{prelude::*, visit::EdgeRef};
use rayon::prelude::*;

use crate::{
    network::{PhysicalLink, PhysicalNode},
    slice::{SliceLink, SliceNode},
    types::{IndexType, LinkId, NodeId},
};

/// Number of hops assumed for a node that cannot be reached.
pub const UNREACHABLE_HOPS: usize = 1000;

/// CPU value of a node, used for ranking.
pub trait NodeWeight {
    /// CPU value of the node (the available CPU of a physical node, or the demand of a slice node).
    fn cpu_weight(&self) -> f64;
}

/// Bandwidth value of a link, used for ranking.
pub trait LinkWeight {
    /// Bandwidth value of the link (the available bandwidth of a physical link, or the demand of a
    /// slice link).
    fn bandwidth_weight(&self) -> f64;
}

impl NodeWeight for PhysicalNode {
    fn cpu_weight(&self) -> f64 {
        self.cpu().available()
    }
}

impl LinkWeight for PhysicalLink {
    fn bandwidth_weight(&self) -> f64 {
        self.bandwidth().available()
    }
}

impl NodeWeight for SliceNode {
    fn cpu_weight(&self) -> f64 {
        self.cpu()
    }
}

impl LinkWeight for SliceLink {
    fn bandwidth_weight(&self) -> f64 {
        self.bandwidth()
    }
}

/// The four ranking attributes of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct NodeAttributes {
    /// Local resource
    pub lr: f64,
    /// Global resource
    pub gr: f64,
    /// Degree centrality
    pub dc: f64,
    /// Closeness centrality
    pub cc: f64,
}

impl NodeAttributes {
    /// Combined score `alpha * LR * DC + beta * GR * CC`.
    pub fn score(&self, alpha: f64, beta: f64) -> f64 {
        alpha * self.lr * self.dc + beta * self.gr * self.cc
    }
}

/// Computes the ranking of all nodes in a graph.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct NodeRanker {
    /// Weight of the local part `LR * DC`.
    pub alpha: f64,
    /// Weight of the global part `GR * CC`.
    pub beta: f64,
    /// Added to `H` to avoid a division by zero.
    pub epsilon: f64,
}

impl Default for NodeRanker {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.5,
            epsilon: 1e-5,
        }
    }
}

impl NodeRanker {
    /// Create a new ranker
    pub fn new(alpha: f64, beta: f64, epsilon: f64) -> Self {
        Self {
            alpha,
            beta,
            epsilon,
        }
    }

    /// Compute the attributes and hop distances of all nodes in `graph`.
    pub fn rank<N, E>(&self, graph: &Graph<N, E, Undirected, IndexType>) -> Ranking
    where
        N: NodeWeight + Sync,
        E: LinkWeight + Sync,
    {
        let n = graph.node_count();
        let adj = adjacency(graph);

        let trees: Vec<ShortestPathTree> = (0..n)
            .into_par_iter()
            .map(|source| ShortestPathTree::compute(graph, &adj, NodeId::new(source)))
            .collect();

        let attributes = trees
            .iter()
            .enumerate()
            .map(|(v, tree)| {
                let v = NodeId::new(v);
                if n <= 1 {
                    return NodeAttributes::default();
                }
                let others = (n - 1) as f64;
                let lr = graph[v].cpu_weight()
                    * graph
                        .edges(v)
                        .map(|e| e.weight().bandwidth_weight())
                        .sum::<f64>();
                let degree = adj[v.index()].iter().map(|(u, _)| *u).dedup().count();
                let dist_sum: usize = tree.dist.iter().flatten().sum();
                NodeAttributes {
                    lr,
                    gr: tree.resource_sum / others,
                    dc: degree as f64 / others,
                    cc: if dist_sum == 0 {
                        0.0
                    } else {
                        others / dist_sum as f64
                    },
                }
            })
            .collect();

        Ranking {
            ranker: *self,
            attributes,
            dist: trees.into_iter().map(|t| t.dist).collect(),
        }
    }
}

/// Result of [`NodeRanker::rank`]: the attributes of every node together with all hop distances.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Parameters used for scoring
    ranker: NodeRanker,
    /// Attributes of each node, indexed by node id
    attributes: Vec<NodeAttributes>,
    /// Hop distances, indexed by source and destination
    dist: Vec<Vec<Option<usize>>>,
}

impl Ranking {
    /// Attributes of a node.
    pub fn attributes(&self, v: NodeId) -> NodeAttributes {
        self.attributes
            .get(v.index())
            .copied()
            .unwrap_or_default()
    }

    /// Score `S(v)` of a node.
    pub fn score(&self, v: NodeId) -> f64 {
        self.attributes(v).score(self.ranker.alpha, self.ranker.beta)
    }

    /// Adjusted score `S(v) / (h + epsilon)`.
    pub fn adjusted_score(&self, v: NodeId, h: f64) -> f64 {
        self.score(v) / (h + self.ranker.epsilon)
    }

    /// Number of hops on the shortest path from `a` to `b`, or `None` if `b` cannot be reached.
    pub fn hops(&self, a: NodeId, b: NodeId) -> Option<usize> {
        self.dist.get(a.index())?.get(b.index()).copied().flatten()
    }

    /// Cooperative provisioning coefficient `H(v)`: the sum of hop distances from `v` to all nodes
    /// in `mapped`. Nodes that cannot be reached count as [`UNREACHABLE_HOPS`].
    pub fn cooperation(&self, v: NodeId, mapped: impl IntoIterator<Item = NodeId>) -> f64 {
        mapped
            .into_iter()
            .map(|m| self.hops(v, m).unwrap_or(UNREACHABLE_HOPS))
            .sum::<usize>() as f64
    }

    /// Order all nodes by descending score. Nodes with equal score are ordered by their id.
    pub fn order(&self) -> Vec<NodeId> {
        let mut nodes: Vec<(NodeId, f64)> = (0..self.attributes.len())
            .map(NodeId::new)
            .map(|v| (v, self.score(v)))
            .collect();
        nodes.sort_by(|(a, sa), (b, sb)| sb.total_cmp(sa).then(a.cmp(b)));
        nodes.into_iter().map(|(v, _)| v).collect()
    }
}

/// Sorted adjacency list: for each node, all `(neighbor, link)` pairs ordered by neighbor and link
/// id.
pub(crate) fn adjacency<N, E>(
    graph: &Graph<N, E, Undirected, IndexType>,
) -> Vec<Vec<(NodeId, LinkId)>> {
    graph
        .node_indices()
        .map(|v| {
            let mut neighbors: Vec<(NodeId, LinkId)> = graph
                .edges(v)
                .map(|e| {
                    let u = if e.source() == v { e.target() } else { e.source() };
                    (u, e.id())
                })
                .filter(|(u, _)| *u != v)
                .collect();
            neighbors.sort();
            neighbors
        })
        .collect()
}

/// Result of a BFS from a single source.
#[derive(Debug)]
struct ShortestPathTree {
    /// Hop distance to each node (`None` if unreachable).
    dist: Vec<Option<usize>>,
    /// Sum over all reachable nodes of the minimum bandwidth plus the minimum CPU along the path.
    resource_sum: f64,
}

impl ShortestPathTree {
    /// Run the BFS from `source`.
    fn compute<N, E>(
        graph: &Graph<N, E, Undirected, IndexType>,
        adj: &[Vec<(NodeId, LinkId)>],
        source: NodeId,
    ) -> Self
    where
        N: NodeWeight,
        E: LinkWeight,
    {
        let n = graph.node_count();
        let mut dist: Vec<Option<usize>> = vec![None; n];
        let mut pred: Vec<Option<(NodeId, LinkId)>> = vec![None; n];
        let mut order: Vec<NodeId> = Vec::with_capacity(n);
        let mut queue = VecDeque::new();

        dist[source.index()] = Some(0);
        queue.push_back(source);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            let d = dist[v.index()].unwrap_or_default();
            for &(u, e) in adj[v.index()].iter() {
                match dist[u.index()] {
                    None => {
                        dist[u.index()] = Some(d + 1);
                        pred[u.index()] = Some((v, e));
                        queue.push_back(u);
                    }
                    Some(du) if du == d + 1 => {
                        // keep the lowest-id predecessor
                        if pred[u.index()].map(|p| (v, e) < p).unwrap_or(true) {
                            pred[u.index()] = Some((v, e));
                        }
                    }
                    _ => {}
                }
            }
        }

        // minimum bandwidth and cpu along the path, processed in BFS order, such that the
        // predecessor is always done already.
        let mut min_bw = vec![f64::INFINITY; n];
        let mut min_cpu = vec![f64::INFINITY; n];
        min_cpu[source.index()] = graph[source].cpu_weight();
        let mut resource_sum = 0.0;
        for v in order.into_iter().skip(1) {
            if let Some((p, e)) = pred[v.index()] {
                min_bw[v.index()] = min_bw[p.index()].min(graph[e].bandwidth_weight());
                min_cpu[v.index()] = min_cpu[p.index()].min(graph[v].cpu_weight());
                resource_sum += min_bw[v.index()] + min_cpu[v.index()];
            }
        }

        Self { dist, resource_sum }
    }
}
