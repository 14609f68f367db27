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

//! Stage 1: place every slice node on a physical node.
//!
//! Slice nodes are placed in order of descending score on the slice graph. Each one goes to the
//! candidate with the highest adjusted score `S(v) / (H(v) + epsilon)`, where candidates must have
//! enough available CPU, be close enough to the expected location, and not host another node of
//! the same slice. Ties are broken by the lowest `H`, and then by the lowest node id.

use std::{cmp::Ordering, collections::BTreeMap};

use itertools::Itertools;
use log::*;

use crate::{
    network::PhysicalNetwork,
    slice::SliceRequest,
    types::NodeId,
};

use super::{ProvisionConfig, RejectReason};

/// A physical node that could host the slice node currently being placed.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Physical node
    node: NodeId,
    /// Cooperative provisioning coefficient
    h: f64,
    /// Adjusted score
    score: f64,
}

impl Candidate {
    /// Order candidates from best to worst.
    fn cmp_rank(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(self.h.total_cmp(&other.h))
            .then(self.node.cmp(&other.node))
    }
}

/// Compute the tentative host of every slice node, indexed by slice node id. The network is not
/// modified.
pub fn map_nodes(
    config: &ProvisionConfig,
    net: &PhysicalNetwork,
    request: &SliceRequest,
) -> Result<Vec<NodeId>, RejectReason> {
    let ranker = config.ranker();
    let slice_graph = request.graph();
    let order = ranker.rank(slice_graph).order();
    let physical = ranker.rank(net.graph());

    let mut hosts: BTreeMap<NodeId, NodeId> = BTreeMap::new();

    for slice_node in order {
        let demand = &slice_graph[slice_node];

        // physical nodes hosting the slice neighbors of this node
        let mapped: Vec<NodeId> = slice_graph
            .neighbors(slice_node)
            .unique()
            .filter_map(|n| hosts.get(&n).copied())
            .collect();

        let best = net
            .graph()
            .node_indices()
            .filter(|v| !hosts.values().any(|h| h == v))
            .filter(|v| {
                let node = &net.graph()[*v];
                node.cpu().available() >= demand.cpu()
                    && node.location().distance(&demand.location()) <= demand.max_deviation()
            })
            .map(|v| {
                let h = physical.cooperation(v, mapped.iter().copied());
                Candidate {
                    node: v,
                    h,
                    score: physical.adjusted_score(v, h),
                }
            })
            .min_by(Candidate::cmp_rank);

        match best {
            Some(c) => {
                trace!(
                    "slice {}: place {} on {} (score {:.3}, H = {})",
                    request.id(),
                    demand.name(),
                    net.node_name(c.node),
                    c.score,
                    c.h
                );
                hosts.insert(slice_node, c.node);
            }
            None => return Err(RejectReason::NodeMappingFailed { node: slice_node }),
        }
    }

    Ok(hosts.into_values().collect())
}
