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

//! Slice requests: small virtual networks that should be embedded into the physical network.

use petgraph::{algo::connected_components, prelude::*};

use crate::types::{IndexType, LinkId, Location, NodeId, SliceError, SliceId};

/// Graph type of a slice request.
pub type SliceGraph = Graph<SliceNode, SliceLink, Undirected, IndexType>;

/// Virtual node of a slice request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SliceNode {
    /// Name of the node
    name: String,
    /// Required CPU
    cpu: f64,
    /// Location where the node should be deployed.
    location: Location,
    /// Maximum distance between the expected location and the physical node.
    max_deviation: f64,
}

impl SliceNode {
    /// Name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required CPU
    pub fn cpu(&self) -> f64 {
        self.cpu
    }

    /// Location where the node should be deployed.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Maximum distance between the expected location and the physical node.
    pub fn max_deviation(&self) -> f64 {
        self.max_deviation
    }
}

/// Virtual link of a slice request.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SliceLink {
    /// Required bandwidth
    bandwidth: f64,
}

impl SliceLink {
    /// Required bandwidth
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

/// A slice request, arriving at `arrival` and staying for `lifetime` time units if it gets
/// accepted. Slice requests are never modified once they are handed to the provisioner.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SliceRequest {
    /// Identification
    id: SliceId,
    /// Time at which the request arrives.
    arrival: f64,
    /// Duration for which the slice stays active.
    lifetime: f64,
    /// Topology of the slice with all demands
    graph: SliceGraph,
}

impl SliceRequest {
    /// Create a new slice request without any nodes.
    pub fn new(id: impl Into<SliceId>, arrival: f64, lifetime: f64) -> Self {
        Self {
            id: id.into(),
            arrival,
            lifetime,
            graph: SliceGraph::default(),
        }
    }

    /// Add a new slice node. Its name is derived from the slice id (`SR3_VN0`).
    pub fn add_node(
        &mut self,
        cpu: f64,
        location: impl Into<Location>,
        max_deviation: f64,
    ) -> NodeId {
        let name = format!("{}_VN{}", self.id, self.graph.node_count());
        self.graph.add_node(SliceNode {
            name,
            cpu,
            location: location.into(),
            max_deviation,
        })
    }

    /// Add a new slice link between two slice nodes.
    pub fn add_link(&mut self, a: NodeId, b: NodeId, bandwidth: f64) -> Result<LinkId, SliceError> {
        for x in [a, b] {
            if self.graph.node_weight(x).is_none() {
                return Err(SliceError::UnknownNode(self.id, x));
            }
        }
        if a == b {
            return Err(SliceError::SelfLoop(self.id, a));
        }
        Ok(self.graph.add_edge(a, b, SliceLink { bandwidth }))
    }

    /// Identification
    pub fn id(&self) -> SliceId {
        self.id
    }

    /// Time at which the request arrives.
    pub fn arrival(&self) -> f64 {
        self.arrival
    }

    /// Duration for which the slice stays active.
    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    /// Time at which an accepted slice departs.
    pub fn departure(&self) -> f64 {
        self.arrival + self.lifetime
    }

    /// Topology of the slice with all demands
    pub fn graph(&self) -> &SliceGraph {
        &self.graph
    }

    /// Number of slice nodes
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of slice links
    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sum of all CPU demands.
    pub fn total_cpu(&self) -> f64 {
        self.graph.node_weights().map(|n| n.cpu).sum()
    }

    /// Sum of all bandwidth demands.
    pub fn total_bandwidth(&self) -> f64 {
        self.graph.edge_weights().map(|l| l.bandwidth).sum()
    }

    /// Revenue earned when the slice is accepted: all CPU demands plus all bandwidth demands.
    pub fn revenue(&self) -> f64 {
        self.total_cpu() + self.total_bandwidth()
    }

    /// Check that the request is well-formed. The request must have at least one node, all demands
    /// must be positive, the deviations non-negative, the timing valid, and the graph connected.
    pub fn validate(&self) -> Result<(), SliceError> {
        let id = self.id;
        if self.graph.node_count() == 0 {
            return Err(SliceError::Empty(id));
        }
        for n in self.graph.node_indices() {
            let node = &self.graph[n];
            if node.cpu.is_nan() || node.cpu <= 0.0 {
                return Err(SliceError::InvalidCpuDemand(id, n, node.cpu));
            }
            if node.max_deviation.is_nan() || node.max_deviation < 0.0 {
                return Err(SliceError::NegativeDeviation(id, n, node.max_deviation));
            }
        }
        for l in self.graph.edge_indices() {
            let bw = self.graph[l].bandwidth;
            if bw.is_nan() || bw <= 0.0 {
                return Err(SliceError::InvalidBandwidthDemand(id, l, bw));
            }
        }
        if self.lifetime.is_nan() || self.lifetime <= 0.0 {
            return Err(SliceError::InvalidLifetime(id, self.lifetime));
        }
        if !self.arrival.is_finite() || self.arrival < 0.0 {
            return Err(SliceError::InvalidArrivalTime(id, self.arrival));
        }
        if connected_components(&self.graph) > 1 {
            return Err(SliceError::Disconnected(id));
        }
        Ok(())
    }
}
