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

//! # Path selection
//!
//! Slice links are routed over paths in the physical network. Candidate paths are the `K` shortest
//! simple paths by hop count (Yen's algorithm). Among the candidates that have enough residual
//! bandwidth on every link, a [`PathStrategy`] picks one.

use std::collections::{HashMap, HashSet, VecDeque};

use itertools::Itertools;
use petgraph::prelude::*;

use crate::{
    network::{PhysicalGraph, PhysicalNetwork},
    ranking::adjacency,
    types::{IndexType, LinkId, NodeId},
};

/// A simple path in a graph, as a sequence of nodes and the links between them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Path {
    /// All nodes along the path, including source and target.
    nodes: Vec<NodeId>,
    /// All links along the path. There is always one less link than nodes.
    links: Vec<LinkId>,
}

impl Path {
    /// Create a path that consists only of `source`.
    pub fn new(source: NodeId) -> Self {
        Self {
            nodes: vec![source],
            links: Vec::new(),
        }
    }

    /// Append a hop to the path.
    pub fn push(&mut self, link: LinkId, node: NodeId) {
        self.links.push(link);
        self.nodes.push(node);
    }

    /// All nodes along the path.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// All links along the path.
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// Number of links on the path.
    pub fn hops(&self) -> usize {
        self.links.len()
    }

    /// First node of the path.
    pub fn source(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Last node of the path.
    pub fn target(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

/// Compute up to `k` shortest simple paths from `source` to `target`, measured in hop count, using
/// Yen's algorithm. Paths are returned in non-decreasing hop count; paths of equal length appear in
/// the order in which they were discovered. Parallel links yield distinct paths.
pub fn k_shortest_paths<N, E>(
    graph: &Graph<N, E, Undirected, IndexType>,
    source: NodeId,
    target: NodeId,
    k: usize,
) -> Vec<Path> {
    let mut found: Vec<Path> = Vec::new();
    if k == 0
        || source == target
        || graph.node_weight(source).is_none()
        || graph.node_weight(target).is_none()
    {
        return found;
    }

    let adj = adjacency(graph);
    let no_nodes = HashSet::new();
    let no_links = HashSet::new();
    match bfs_path(&adj, source, target, &no_nodes, &no_links) {
        Some(p) => found.push(p),
        None => return found,
    }

    let mut candidates: Vec<Path> = Vec::new();
    while found.len() < k {
        let Some(last) = found.last().cloned() else {
            break;
        };
        for i in 0..last.hops() {
            let spur = last.nodes[i];
            let root_links = &last.links[..i];

            // remove the next link of every known path that shares the same root
            let banned_links: HashSet<LinkId> = found
                .iter()
                .filter(|p| p.links.len() > i && &p.links[..i] == root_links)
                .map(|p| p.links[i])
                .collect();
            // remove all root nodes except the spur node
            let banned_nodes: HashSet<NodeId> = last.nodes[..i].iter().copied().collect();

            if let Some(spur_path) = bfs_path(&adj, spur, target, &banned_nodes, &banned_links) {
                let mut path = Path {
                    nodes: last.nodes[..i].to_vec(),
                    links: root_links.to_vec(),
                };
                path.nodes.extend(spur_path.nodes);
                path.links.extend(spur_path.links);
                if !found.contains(&path) && !candidates.contains(&path) {
                    candidates.push(path);
                }
            }
        }

        match candidates.iter().position_min_by_key(|p| p.hops()) {
            Some(idx) => found.push(candidates.remove(idx)),
            None => break,
        }
    }

    found
}

/// Shortest path by hop count, avoiding the given nodes and links. Neighbors are explored in
/// ascending order, so the result is deterministic.
fn bfs_path(
    adj: &[Vec<(NodeId, LinkId)>],
    source: NodeId,
    target: NodeId,
    banned_nodes: &HashSet<NodeId>,
    banned_links: &HashSet<LinkId>,
) -> Option<Path> {
    let mut pred: HashMap<NodeId, (NodeId, LinkId)> = HashMap::new();
    let mut visited: HashSet<NodeId> = HashSet::from([source]);
    let mut queue = VecDeque::from([source]);
    while let Some(v) = queue.pop_front() {
        if v == target {
            break;
        }
        for &(u, l) in adj[v.index()].iter() {
            if banned_links.contains(&l) || banned_nodes.contains(&u) || !visited.insert(u) {
                continue;
            }
            pred.insert(u, (v, l));
            queue.push_back(u);
        }
    }

    if !visited.contains(&target) {
        return None;
    }

    let mut hops = Vec::new();
    let mut cur = target;
    while cur != source {
        let (p, l) = *pred.get(&cur)?;
        hops.push((l, cur));
        cur = p;
    }
    let mut path = Path::new(source);
    for (l, v) in hops.into_iter().rev() {
        path.push(l, v);
    }
    Some(path)
}

/// Bandwidth that is tentatively reserved while routing the links of a single slice. Nothing in
/// here is reflected in the physical network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TentativeBandwidth {
    /// Reserved bandwidth per physical link
    reserved: HashMap<LinkId, f64>,
}

impl TentativeBandwidth {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bandwidth tentatively reserved on `link`.
    pub fn reserved(&self, link: LinkId) -> f64 {
        self.reserved.get(&link).copied().unwrap_or_default()
    }

    /// Reserve `demand` on every link of `path`.
    pub fn reserve(&mut self, path: &Path, demand: f64) {
        for &link in path.links() {
            *self.reserved.entry(link).or_default() += demand;
        }
    }

    /// Bandwidth still available on `link` after all tentative reservations.
    pub fn residual(&self, net: &PhysicalNetwork, link: LinkId) -> f64 {
        net.graph()
            .edge_weight(link)
            .map(|l| l.bandwidth().available())
            .unwrap_or_default()
            - self.reserved(link)
    }

    /// Check whether every link on `path` has at least `demand` residual bandwidth.
    pub fn is_feasible(&self, net: &PhysicalNetwork, path: &Path, demand: f64) -> bool {
        path.links()
            .iter()
            .all(|l| self.residual(net, *l) >= demand)
    }

    /// Compute `Γ = max(1 - residual / initial) * hops` over all links on the path. A link without
    /// capacity counts as fully utilized.
    pub fn gamma(&self, net: &PhysicalNetwork, path: &Path) -> f64 {
        let graph: &PhysicalGraph = net.graph();
        let max_util = path
            .links()
            .iter()
            .map(|l| {
                let initial = graph
                    .edge_weight(*l)
                    .map(|x| x.bandwidth().initial())
                    .unwrap_or_default();
                if initial > 0.0 {
                    1.0 - self.residual(net, *l) / initial
                } else {
                    1.0
                }
            })
            .fold(0.0, f64::max);
        max_util * path.hops() as f64
    }
}

/// Strategy to choose a path among all feasible candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PathStrategy {
    /// Pick the shortest feasible path. Ties are broken by the enumeration order.
    FirstFeasible,
    /// Pick the feasible path with the lowest [`TentativeBandwidth::gamma`]. Ties are broken by the
    /// hop count, and then by the enumeration order.
    MinMaxBwUtilHops,
}

/// Finds paths for slice links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSelector {
    /// Number of shortest paths to enumerate
    pub k: usize,
    /// Strategy to pick the path among all feasible ones
    pub strategy: PathStrategy,
}

impl PathSelector {
    /// Create a new path selector
    pub fn new(k: usize, strategy: PathStrategy) -> Self {
        Self { k, strategy }
    }

    /// Enumerate the `k` shortest paths from `source` to `target`, and keep only those that can
    /// carry `demand` given the tentative reservations.
    pub fn feasible_paths(
        &self,
        net: &PhysicalNetwork,
        tentative: &TentativeBandwidth,
        source: NodeId,
        target: NodeId,
        demand: f64,
    ) -> Vec<Path> {
        k_shortest_paths(net.graph(), source, target, self.k)
            .into_iter()
            .filter(|p| tentative.is_feasible(net, p, demand))
            .collect()
    }

    /// Pick a path among the feasible candidates. Returns `None` if there are no candidates.
    pub fn choose(
        &self,
        net: &PhysicalNetwork,
        tentative: &TentativeBandwidth,
        candidates: Vec<Path>,
    ) -> Option<Path> {
        match self.strategy {
            PathStrategy::FirstFeasible => {
                let idx = candidates.iter().position_min_by_key(|p| p.hops())?;
                candidates.into_iter().nth(idx)
            }
            PathStrategy::MinMaxBwUtilHops => {
                let mut best: Option<(f64, Path)> = None;
                for path in candidates {
                    let gamma = tentative.gamma(net, &path);
                    let better = match &best {
                        None => true,
                        Some((best_gamma, best_path)) => {
                            gamma < *best_gamma
                                || (gamma == *best_gamma && path.hops() < best_path.hops())
                        }
                    };
                    if better {
                        best = Some((gamma, path));
                    }
                }
                best.map(|(_, path)| path)
            }
        }
    }

    /// Find the path for a slice link with bandwidth `demand`, or `None` if no feasible path exists.
    pub fn select(
        &self,
        net: &PhysicalNetwork,
        tentative: &TentativeBandwidth,
        source: NodeId,
        target: NodeId,
        demand: f64,
    ) -> Option<Path> {
        let candidates = self.feasible_paths(net, tentative, source, target, demand);
        self.choose(net, tentative, candidates)
    }
}
