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

//! Module containing all type definitions

use std::fmt::Display;

use petgraph::prelude::*;
use thiserror::Error;

/// Index type used for all graphs.
pub(crate) type IndexType = u32;
/// Node identification, both in the physical network and in a slice request.
pub type NodeId = NodeIndex<IndexType>;
/// Link identification, both in the physical network and in a slice request.
pub type LinkId = EdgeIndex<IndexType>;

/// Identification of a slice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SliceId(pub usize);

impl Display for SliceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SR{}", self.0)
    }
}

impl From<usize> for SliceId {
    fn from(x: usize) -> Self {
        Self(x)
    }
}

/// Position of a node in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Location {
    /// x coordinate
    pub x: f64,
    /// y coordinate
    pub y: f64,
}

impl Location {
    /// Create a new location
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two locations.
    pub fn distance(&self, other: &Location) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Location {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Physical network errors. Every one of them is fatal for a simulation run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Node is not present in the physical network.
    #[error("Node {0:?} was not found in the physical network")]
    NodeNotFound(NodeId),
    /// Node name is not present in the physical network.
    #[error("Node {0} was not found in the physical network")]
    NodeNameNotFound(String),
    /// Link is not present in the physical network.
    #[error("Link {0:?} was not found in the physical network")]
    LinkNotFound(LinkId),
    /// Links must connect two different nodes.
    #[error("Cannot add a link from {0:?} to itself")]
    SelfLoop(NodeId),
    /// Capacities must be finite and non-negative.
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(f64),
    /// The slice is already committed to the network.
    #[error("Slice {0} is already committed")]
    AlreadyCommitted(SliceId),
    /// The slice is not committed to the network.
    #[error("Slice {0} is not committed")]
    NotCommitted(SliceId),
    /// The mapping does not belong to the request, or has the wrong shape.
    #[error("The mapping does not fit the slice request {0}")]
    InvalidMapping(SliceId),
    /// Reserving CPU would exceed the available capacity.
    #[error("Node {node:?} has only {available} CPU left, but {demand} is requested")]
    InsufficientCpu {
        /// Physical node
        node: NodeId,
        /// CPU demand that should be reserved
        demand: f64,
        /// Available CPU
        available: f64,
    },
    /// Reserving bandwidth would exceed the available capacity.
    #[error("Link {link:?} has only {available} bandwidth left, but {demand} is requested")]
    InsufficientBandwidth {
        /// Physical link
        link: LinkId,
        /// Bandwidth demand that should be reserved
        demand: f64,
        /// Available bandwidth
        available: f64,
    },
}

/// Malformed slice requests.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SliceError {
    /// The slice request has no nodes.
    #[error("Slice {0} must have at least one node")]
    Empty(SliceId),
    /// A slice node demands a non-positive amount of CPU.
    #[error("Node {1:?} of slice {0} has invalid CPU demand: {2}")]
    InvalidCpuDemand(SliceId, NodeId, f64),
    /// A slice link demands a non-positive amount of bandwidth.
    #[error("Link {1:?} of slice {0} has invalid bandwidth demand: {2}")]
    InvalidBandwidthDemand(SliceId, LinkId, f64),
    /// A slice node allows a negative deviation.
    #[error("Node {1:?} of slice {0} has negative max deviation: {2}")]
    NegativeDeviation(SliceId, NodeId, f64),
    /// The lifetime must be positive.
    #[error("Slice {0} has invalid lifetime: {1}")]
    InvalidLifetime(SliceId, f64),
    /// The arrival time must be non-negative.
    #[error("Slice {0} has invalid arrival time: {1}")]
    InvalidArrivalTime(SliceId, f64),
    /// A slice link references a node that does not exist.
    #[error("Slice {0} has no node {1:?}")]
    UnknownNode(SliceId, NodeId),
    /// A slice link connects a node with itself.
    #[error("Slice {0} has a link from {1:?} to itself")]
    SelfLoop(SliceId, NodeId),
    /// The slice graph is not connected.
    #[error("Slice {0} is not connected")]
    Disconnected(SliceId),
}

/// Invalid parameters of a random generator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A rate or mean must be positive and finite.
    #[error("Invalid rate or mean: {0}")]
    InvalidRate(f64),
    /// A range of values must satisfy `0 <= min <= max`.
    #[error("Invalid range: [{0}, {1}]")]
    InvalidRange(f64, f64),
    /// A range of node counts must satisfy `1 <= min <= max`.
    #[error("Invalid node count range: [{0}, {1}]")]
    InvalidNodeRange(usize, usize),
    /// A probability must be in `[0, 1]`.
    #[error("Invalid probability: {0}")]
    InvalidProbability(f64),
    /// The physical network could not be built.
    #[error("{0}")]
    Network(#[from] NetworkError),
}
