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

//! # Physical network
//!
//! This module represents the shared infrastructure: nodes with CPU capacity and a location, and
//! undirected links with bandwidth capacity. Every resource keeps track of the reservations of all
//! committed slices. The available capacity is always derived from the initial capacity and those
//! reservations, such that releasing a slice restores the exact value from before its commit.

use std::collections::{BTreeMap, BTreeSet};

use log::*;
use petgraph::{algo::connected_components, prelude::*, visit::EdgeRef};

use crate::{
    provision::Mapping,
    slice::SliceRequest,
    types::{IndexType, LinkId, Location, NetworkError, NodeId, SliceId},
};

/// Slack used when checking that a reservation fits into the available capacity.
const TOLERANCE: f64 = 1e-9;

/// Graph type of the physical network.
pub type PhysicalGraph = Graph<PhysicalNode, PhysicalLink, Undirected, IndexType>;

/// A finite resource (CPU or bandwidth), shared among all committed slices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Capacity {
    /// Capacity of the resource when no slice is committed.
    initial: f64,
    /// Amount reserved by each committed slice.
    reservations: BTreeMap<SliceId, f64>,
    /// Sum of all reservations, in the order of the slice ids.
    used: f64,
}

impl Capacity {
    /// Create a new, unused resource.
    pub fn new(initial: f64) -> Result<Self, NetworkError> {
        if !initial.is_finite() || initial < 0.0 {
            return Err(NetworkError::InvalidCapacity(initial));
        }
        Ok(Self {
            initial,
            reservations: BTreeMap::new(),
            used: 0.0,
        })
    }

    /// Capacity without any slice committed.
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// Sum of the reservations of all committed slices.
    pub fn used(&self) -> f64 {
        self.used
    }

    /// Remaining capacity. This value is always between `0` and [`Capacity::initial`].
    pub fn available(&self) -> f64 {
        (self.initial - self.used).max(0.0)
    }

    /// Fraction of the initial capacity that is in use. A resource without capacity has
    /// utilization `0`.
    pub fn utilization(&self) -> f64 {
        if self.initial > 0.0 {
            self.used / self.initial
        } else {
            0.0
        }
    }

    /// Amount reserved by a specific slice.
    pub fn reserved_by(&self, slice: SliceId) -> f64 {
        self.reservations.get(&slice).copied().unwrap_or_default()
    }

    /// Iterate over all slices that hold a reservation.
    pub fn slices(&self) -> impl Iterator<Item = SliceId> + '_ {
        self.reservations.keys().copied()
    }

    /// Add `amount` to the reservation of `slice`.
    fn reserve(&mut self, slice: SliceId, amount: f64) {
        *self.reservations.entry(slice).or_default() += amount;
        self.update();
    }

    /// Remove the entire reservation of `slice`.
    fn release(&mut self, slice: SliceId) -> Option<f64> {
        let amount = self.reservations.remove(&slice);
        self.update();
        amount
    }

    /// Recompute the used capacity.
    fn update(&mut self) {
        self.used = self.reservations.values().sum();
    }
}

/// A node in the physical network.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PhysicalNode {
    /// Name of the node
    name: String,
    /// Position of the node
    location: Location,
    /// CPU resources of the node
    cpu: Capacity,
}

impl PhysicalNode {
    /// Name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the node
    pub fn location(&self) -> Location {
        self.location
    }

    /// CPU resource, including all reservations.
    pub fn cpu(&self) -> &Capacity {
        &self.cpu
    }
}

/// A link in the physical network.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PhysicalLink {
    /// Bandwidth resources of the link
    bandwidth: Capacity,
}

impl PhysicalLink {
    /// Bandwidth resource, including all reservations.
    pub fn bandwidth(&self) -> &Capacity {
        &self.bandwidth
    }
}

/// The physical network, on which slices are provisioned.
///
/// ```rust
/// use slicesim::prelude::*;
///
/// fn main() -> Result<(), NetworkError> {
///     let mut net = PhysicalNetwork::new();
///     let a = net.add_node("a", 10.0, (0.0, 0.0))?;
///     let b = net.add_node("b", 10.0, (10.0, 0.0))?;
///     let l = net.add_link(a, b, 100.0)?;
///
///     assert_eq!(net.link(l)?.bandwidth().available(), 100.0);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PhysicalNetwork {
    /// Topology with all resources
    graph: PhysicalGraph,
    /// All slices that are currently committed
    committed: BTreeSet<SliceId>,
}

impl PhysicalNetwork {
    /// Create an empty physical network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from a list of nodes `(name, cpu, location)` and a list of links `(a, b,
    /// bandwidth)`. The links refer to the nodes by their position in the node list.
    pub fn build<L>(
        nodes: impl IntoIterator<Item = (String, f64, L)>,
        links: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self, NetworkError>
    where
        L: Into<Location>,
    {
        let mut net = Self::new();
        for (name, cpu, location) in nodes {
            net.add_node(name, cpu, location)?;
        }
        for (a, b, bandwidth) in links {
            net.add_link(NodeId::new(a), NodeId::new(b), bandwidth)?;
        }
        Ok(net)
    }

    /// Add a new node to the network.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        cpu: f64,
        location: impl Into<Location>,
    ) -> Result<NodeId, NetworkError> {
        let node = PhysicalNode {
            name: name.into(),
            location: location.into(),
            cpu: Capacity::new(cpu)?,
        };
        Ok(self.graph.add_node(node))
    }

    /// Add a new link between two nodes. Multiple links may connect the same two nodes.
    pub fn add_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        bandwidth: f64,
    ) -> Result<LinkId, NetworkError> {
        self.node(a)?;
        self.node(b)?;
        if a == b {
            return Err(NetworkError::SelfLoop(a));
        }
        let link = PhysicalLink {
            bandwidth: Capacity::new(bandwidth)?,
        };
        Ok(self.graph.add_edge(a, b, link))
    }

    /// Underlying graph.
    pub fn graph(&self) -> &PhysicalGraph {
        &self.graph
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of links
    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> {
        self.graph.node_indices()
    }

    /// Iterate over all links.
    pub fn links(&self) -> impl Iterator<Item = LinkId> {
        self.graph.edge_indices()
    }

    /// Get a reference to a node.
    pub fn node(&self, node: NodeId) -> Result<&PhysicalNode, NetworkError> {
        self.graph
            .node_weight(node)
            .ok_or(NetworkError::NodeNotFound(node))
    }

    /// Get a reference to a link.
    pub fn link(&self, link: LinkId) -> Result<&PhysicalLink, NetworkError> {
        self.graph
            .edge_weight(link)
            .ok_or(NetworkError::LinkNotFound(link))
    }

    /// Get both endpoints of a link.
    pub fn link_endpoints(&self, link: LinkId) -> Result<(NodeId, NodeId), NetworkError> {
        self.graph
            .edge_endpoints(link)
            .ok_or(NetworkError::LinkNotFound(link))
    }

    /// Find all links that connect `a` and `b`, ordered by their id.
    pub fn links_between(&self, a: NodeId, b: NodeId) -> Vec<LinkId> {
        let mut links: Vec<LinkId> = self
            .graph
            .edges_connecting(a, b)
            .map(|e| e.id())
            .collect();
        links.sort();
        links
    }

    /// Get the node id from its name.
    pub fn get_node_id(&self, name: impl AsRef<str>) -> Result<NodeId, NetworkError> {
        let name = name.as_ref();
        self.graph
            .node_indices()
            .find(|n| self.graph[*n].name == name)
            .ok_or_else(|| NetworkError::NodeNameNotFound(name.to_string()))
    }

    /// Get the name of a node, or `"?"` if the node does not exist.
    pub fn node_name(&self, node: NodeId) -> &str {
        self.graph
            .node_weight(node)
            .map(|n| n.name.as_str())
            .unwrap_or("?")
    }

    /// Returns `true` if every node can reach every other node.
    pub fn is_connected(&self) -> bool {
        connected_components(&self.graph) <= 1
    }

    /// Returns `true` if the slice is currently committed.
    pub fn is_committed(&self, slice: SliceId) -> bool {
        self.committed.contains(&slice)
    }

    /// Iterate over all committed slices.
    pub fn committed_slices(&self) -> impl Iterator<Item = SliceId> + '_ {
        self.committed.iter().copied()
    }

    /// Reserve the resources of a slice request, according to the mapping. The reservation is
    /// all-or-nothing: either all resources are reserved, or (if an error is returned) the network
    /// remains unchanged.
    pub fn commit(&mut self, request: &SliceRequest, mapping: &Mapping) -> Result<(), NetworkError> {
        let slice = request.id();
        if self.committed.contains(&slice) {
            return Err(NetworkError::AlreadyCommitted(slice));
        }
        let (cpu, bandwidth) = self.demands(request, mapping)?;

        // check that everything fits before changing anything
        for (&node, &demand) in cpu.iter() {
            let available = self.node(node)?.cpu.available();
            if demand > available + TOLERANCE {
                return Err(NetworkError::InsufficientCpu {
                    node,
                    demand,
                    available,
                });
            }
        }
        for (&link, &demand) in bandwidth.iter() {
            let available = self.link(link)?.bandwidth.available();
            if demand > available + TOLERANCE {
                return Err(NetworkError::InsufficientBandwidth {
                    link,
                    demand,
                    available,
                });
            }
        }

        for (node, demand) in cpu {
            self.graph[node].cpu.reserve(slice, demand);
        }
        for (link, demand) in bandwidth {
            self.graph[link].bandwidth.reserve(slice, demand);
        }
        self.committed.insert(slice);
        trace!("Committed slice {slice}");
        Ok(())
    }

    /// Release all resources of a committed slice. This is the exact inverse of
    /// [`PhysicalNetwork::commit`].
    pub fn release(
        &mut self,
        request: &SliceRequest,
        mapping: &Mapping,
    ) -> Result<(), NetworkError> {
        let slice = request.id();
        if !self.committed.contains(&slice) {
            return Err(NetworkError::NotCommitted(slice));
        }
        let (cpu, bandwidth) = self.demands(request, mapping)?;
        for node in cpu.into_keys() {
            self.graph[node].cpu.release(slice);
        }
        for link in bandwidth.into_keys() {
            self.graph[link].bandwidth.release(slice);
        }
        self.committed.remove(&slice);
        trace!("Released slice {slice}");
        Ok(())
    }

    /// Compute the total demand of a mapped slice on every physical node and link. Returns an error
    /// if the mapping does not match the request.
    #[allow(clippy::type_complexity)]
    fn demands(
        &self,
        request: &SliceRequest,
        mapping: &Mapping,
    ) -> Result<(BTreeMap<NodeId, f64>, BTreeMap<LinkId, f64>), NetworkError> {
        let slice = request.id();
        let graph = request.graph();
        if mapping.slice() != slice
            || mapping.nodes().len() != graph.node_count()
            || mapping.paths().len() != graph.edge_count()
        {
            return Err(NetworkError::InvalidMapping(slice));
        }

        let mut cpu = BTreeMap::new();
        for (slice_node, &host) in graph.node_indices().zip(mapping.nodes()) {
            self.node(host)?;
            if cpu.insert(host, graph[slice_node].cpu()).is_some() {
                // two slice nodes share the same physical node
                return Err(NetworkError::InvalidMapping(slice));
            }
        }

        let mut bandwidth: BTreeMap<LinkId, f64> = BTreeMap::new();
        for (slice_link, path) in graph.edge_references().zip(mapping.paths()) {
            let src = mapping.nodes()[slice_link.source().index()];
            let dst = mapping.nodes()[slice_link.target().index()];
            let connects = (path.source(), path.target()) == (Some(src), Some(dst))
                || (path.source(), path.target()) == (Some(dst), Some(src));
            if !connects {
                return Err(NetworkError::InvalidMapping(slice));
            }
            for &link in path.links() {
                self.link(link)?;
                *bandwidth.entry(link).or_default() += slice_link.weight().bandwidth();
            }
        }

        Ok((cpu, bandwidth))
    }

    /// Compute the overall resource utilization of the network.
    pub fn utilization(&self) -> Utilization {
        let mut u = Utilization::default();
        for node in self.graph.node_weights() {
            u.cpu_initial += node.cpu.initial;
            u.cpu_used += node.cpu.used;
        }
        for link in self.graph.edge_weights() {
            u.bandwidth_initial += link.bandwidth.initial;
            u.bandwidth_used += link.bandwidth.used;
        }
        u
    }
}

/// Overall resource utilization of the physical network.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Utilization {
    /// Total CPU capacity
    pub cpu_initial: f64,
    /// Total CPU reserved by committed slices
    pub cpu_used: f64,
    /// Total bandwidth capacity
    pub bandwidth_initial: f64,
    /// Total bandwidth reserved by committed slices
    pub bandwidth_used: f64,
}

impl Utilization {
    /// Total CPU that is not reserved
    pub fn cpu_available(&self) -> f64 {
        self.cpu_initial - self.cpu_used
    }

    /// Total bandwidth that is not reserved
    pub fn bandwidth_available(&self) -> f64 {
        self.bandwidth_initial - self.bandwidth_used
    }

    /// CPU utilization in percent
    pub fn cpu_percent(&self) -> f64 {
        if self.cpu_initial > 0.0 {
            self.cpu_used / self.cpu_initial * 100.0
        } else {
            0.0
        }
    }

    /// Bandwidth utilization in percent
    pub fn bandwidth_percent(&self) -> f64 {
        if self.bandwidth_initial > 0.0 {
            self.bandwidth_used / self.bandwidth_initial * 100.0
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for Utilization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CPU {:.1}% ({:.1}/{:.1}), bandwidth {:.1}% ({:.1}/{:.1})",
            self.cpu_percent(),
            self.cpu_used,
            self.cpu_initial,
            self.bandwidth_percent(),
            self.bandwidth_used,
            self.bandwidth_initial,
        )
    }
}
