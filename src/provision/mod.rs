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

//! # Provisioning engine
//!
//! A slice request is provisioned in two stages. First, every slice node is placed on a physical
//! node ([`node_mapping`]). Then, every slice link is routed over a physical path between the hosts
//! of its endpoints ([`link_mapping`]). Both stages only produce tentative assignments. The
//! resources are reserved in the [`PhysicalNetwork`] only once both stages succeed, so a rejected
//! request leaves the network untouched.

use log::*;
use thiserror::Error;

use crate::{
    formatter::NetworkFormatter,
    network::PhysicalNetwork,
    path::{Path, PathSelector, PathStrategy},
    ranking::NodeRanker,
    slice::SliceRequest,
    types::{LinkId, NetworkError, NodeId, SliceError, SliceId},
};

pub mod link_mapping;
pub mod node_mapping;

/// Variant of the provisioning algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Algorithm {
    /// RT-CSP: route each slice link over the shortest feasible path.
    RtCsp,
    /// RT-CSP+: route each slice link over the feasible path that minimizes the bottleneck
    /// utilization scaled by the hop count.
    RtCspPlus,
}

impl Algorithm {
    /// Path selection strategy of this variant.
    pub fn path_strategy(&self) -> PathStrategy {
        match self {
            Algorithm::RtCsp => PathStrategy::FirstFeasible,
            Algorithm::RtCspPlus => PathStrategy::MinMaxBwUtilHops,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::RtCsp => f.write_str("RT-CSP"),
            Algorithm::RtCspPlus => f.write_str("RT-CSP+"),
        }
    }
}

/// Parameters of the provisioning engine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ProvisionConfig {
    /// Weight of the local part of the node score.
    pub alpha: f64,
    /// Weight of the global part of the node score.
    pub beta: f64,
    /// Added to the cooperative provisioning coefficient to avoid a division by zero.
    pub epsilon: f64,
    /// Number of shortest paths considered for each slice link.
    pub k: usize,
    /// Algorithm variant
    pub algorithm: Algorithm,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.5,
            epsilon: 1e-5,
            k: 3,
            algorithm: Algorithm::RtCspPlus,
        }
    }
}

impl ProvisionConfig {
    /// Node ranker with the parameters of this configuration.
    pub fn ranker(&self) -> NodeRanker {
        NodeRanker::new(self.alpha, self.beta, self.epsilon)
    }

    /// Path selector with the parameters of this configuration.
    pub fn path_selector(&self) -> PathSelector {
        PathSelector::new(self.k, self.algorithm.path_strategy())
    }
}

/// Reason why a slice request was rejected. Rejections are expected outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RejectReason {
    /// No physical node satisfies the CPU, location, and co-hosting constraints of a slice node.
    NodeMappingFailed {
        /// Slice node that could not be placed
        node: NodeId,
    },
    /// No path with enough bandwidth exists for a slice link.
    LinkMappingFailed {
        /// Slice link that could not be routed
        link: LinkId,
    },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NodeMappingFailed { node } => {
                write!(f, "node mapping failed for slice node {}", node.index())
            }
            RejectReason::LinkMappingFailed { link } => {
                write!(f, "link mapping failed for slice link {}", link.index())
            }
        }
    }
}

/// Placement of a slice: a physical node for every slice node, and a physical path for every slice
/// link.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Mapping {
    /// Slice to which the mapping belongs.
    slice: SliceId,
    /// Host of each slice node, indexed by slice node id.
    nodes: Vec<NodeId>,
    /// Path of each slice link, indexed by slice link id.
    paths: Vec<Path>,
}

impl Mapping {
    /// Create a new mapping. The caller must ensure that `nodes` and `paths` are indexed by slice
    /// node and slice link id. [`PhysicalNetwork::commit`] checks that they fit the request.
    pub fn new(slice: SliceId, nodes: Vec<NodeId>, paths: Vec<Path>) -> Self {
        Self {
            slice,
            nodes,
            paths,
        }
    }

    /// Slice to which the mapping belongs.
    pub fn slice(&self) -> SliceId {
        self.slice
    }

    /// Host of each slice node.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Path of each slice link.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Physical host of a slice node.
    pub fn host(&self, slice_node: NodeId) -> Option<NodeId> {
        self.nodes.get(slice_node.index()).copied()
    }

    /// Physical path of a slice link.
    pub fn path(&self, slice_link: LinkId) -> Option<&Path> {
        self.paths.get(slice_link.index())
    }

    /// Resources consumed by the slice: all CPU demands, plus each bandwidth demand multiplied by
    /// the hop count of its path.
    pub fn cost(&self, request: &SliceRequest) -> f64 {
        let graph = request.graph();
        let bandwidth: f64 = graph
            .edge_indices()
            .zip(self.paths.iter())
            .map(|(l, p)| graph[l].bandwidth() * p.hops() as f64)
            .sum();
        request.total_cpu() + bandwidth
    }
}

/// Result of a provisioning attempt.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ProvisionOutcome {
    /// The slice was accepted, and its resources are committed.
    Accepted(Mapping),
    /// The slice was rejected. The network is unchanged.
    Rejected(RejectReason),
}

impl ProvisionOutcome {
    /// Returns `true` if the slice was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, ProvisionOutcome::Accepted(_))
    }
}

/// A slice that is currently committed to the physical network.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ActiveSlice {
    /// The request
    request: SliceRequest,
    /// Where the request is placed
    mapping: Mapping,
    /// Time at which the slice departs
    expiry: f64,
}

impl ActiveSlice {
    /// Create a new active slice, expiring at `arrival + lifetime`.
    pub fn new(request: SliceRequest, mapping: Mapping) -> Self {
        let expiry = request.departure();
        Self {
            request,
            mapping,
            expiry,
        }
    }

    /// The request
    pub fn request(&self) -> &SliceRequest {
        &self.request
    }

    /// Where the request is placed
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Time at which the slice departs
    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    /// Revenue of the slice.
    pub fn revenue(&self) -> f64 {
        self.request.revenue()
    }

    /// Cost of the slice.
    pub fn cost(&self) -> f64 {
        self.mapping.cost(&self.request)
    }
}

/// Fatal errors of the provisioning engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProvisionError {
    /// The physical network reported an error.
    #[error("{0}")]
    Network(#[from] NetworkError),
    /// The slice request is malformed.
    #[error("{0}")]
    Slice(#[from] SliceError),
}

/// The provisioning engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Provisioner {
    /// Parameters
    config: ProvisionConfig,
}

impl Provisioner {
    /// Create a new provisioner.
    pub fn new(config: ProvisionConfig) -> Self {
        Self { config }
    }

    /// Parameters of the provisioner.
    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    /// Try to provision a slice request. If both stages succeed, the resources are committed to
    /// the network and the mapping is returned. Otherwise, the network is not modified.
    ///
    /// Malformed requests, and requests whose slice id is already committed, result in an error.
    pub fn provision(
        &self,
        net: &mut PhysicalNetwork,
        request: &SliceRequest,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        request.validate()?;
        if net.is_committed(request.id()) {
            return Err(NetworkError::AlreadyCommitted(request.id()).into());
        }

        let nodes = match node_mapping::map_nodes(&self.config, net, request) {
            Ok(nodes) => nodes,
            Err(reason) => return Ok(self.reject(request, reason)),
        };
        let paths = match link_mapping::map_links(&self.config, net, request, &nodes) {
            Ok(paths) => paths,
            Err(reason) => return Ok(self.reject(request, reason)),
        };

        let mapping = Mapping::new(request.id(), nodes, paths);
        net.commit(request, &mapping)?;
        debug!(
            "{} accepted slice {}: {}",
            self.config.algorithm,
            request.id(),
            mapping.fmt(net)
        );
        Ok(ProvisionOutcome::Accepted(mapping))
    }

    /// Release the resources of an active slice.
    pub fn release(
        &self,
        net: &mut PhysicalNetwork,
        slice: &ActiveSlice,
    ) -> Result<(), ProvisionError> {
        net.release(slice.request(), slice.mapping())?;
        debug!("Released slice {}", slice.request().id());
        Ok(())
    }

    /// Log the rejection and build the outcome
    fn reject(&self, request: &SliceRequest, reason: RejectReason) -> ProvisionOutcome {
        debug!(
            "{} rejected slice {}: {}",
            self.config.algorithm,
            request.id(),
            reason
        );
        ProvisionOutcome::Rejected(reason)
    }
}
