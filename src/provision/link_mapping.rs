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

//! Stage 2: route every slice link over a physical path.
//!
//! Slice links are routed in order of descending bandwidth demand (ties by slice link id). Each
//! link is routed between the hosts of its endpoints, using the [`PathSelector`] of the
//! configuration. Bandwidth of already routed links is kept in a [`TentativeBandwidth`] ledger, so
//! that later links of the same slice see the residual capacity.
//!
//! [`PathSelector`]: crate::path::PathSelector

use std::collections::BTreeMap;

use log::*;
use petgraph::visit::EdgeRef;

use crate::{
    formatter::NetworkFormatter,
    network::PhysicalNetwork,
    path::{Path, TentativeBandwidth},
    slice::SliceRequest,
    types::{LinkId, NodeId},
};

use super::{ProvisionConfig, RejectReason};

/// Compute the tentative path of every slice link, indexed by slice link id. `hosts` must contain
/// the host of every slice node, as computed by [`super::node_mapping::map_nodes`]. The network
/// is not modified.
pub fn map_links(
    config: &ProvisionConfig,
    net: &PhysicalNetwork,
    request: &SliceRequest,
    hosts: &[NodeId],
) -> Result<Vec<Path>, RejectReason> {
    let selector = config.path_selector();
    let slice_graph = request.graph();

    let mut links: Vec<(LinkId, NodeId, NodeId, f64)> = slice_graph
        .edge_references()
        .map(|e| (e.id(), e.source(), e.target(), e.weight().bandwidth()))
        .collect();
    links.sort_by(|a, b| b.3.total_cmp(&a.3).then(a.0.cmp(&b.0)));

    let mut tentative = TentativeBandwidth::new();
    let mut paths: BTreeMap<LinkId, Path> = BTreeMap::new();

    for (link, a, b, demand) in links {
        let (Some(&src), Some(&dst)) = (hosts.get(a.index()), hosts.get(b.index())) else {
            return Err(RejectReason::LinkMappingFailed { link });
        };
        match selector.select(net, &tentative, src, dst, demand) {
            Some(path) => {
                trace!(
                    "slice {}: route link {} ({demand:.1}) over {}",
                    request.id(),
                    link.index(),
                    path.fmt(net)
                );
                tentative.reserve(&path, demand);
                paths.insert(link, path);
            }
            None => return Err(RejectReason::LinkMappingFailed { link }),
        }
    }

    Ok(paths.into_values().collect())
}
