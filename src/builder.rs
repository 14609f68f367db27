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

//! Builder for random physical networks.
//!
//! ```rust
//! use rand::prelude::*;
//! use slicesim::builder::WaxmanConfig;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let net = WaxmanConfig { nodes: 20, ..Default::default() }.build(&mut rng).unwrap();
//! assert_eq!(net.num_nodes(), 20);
//! assert!(net.is_connected());
//! ```

use std::collections::BTreeSet;

use log::*;
use petgraph::prelude::*;
use rand::prelude::*;

use crate::{
    generator::{check_probability, check_range, check_rate},
    network::PhysicalNetwork,
    types::{ConfigError, IndexType, Location, NodeId},
};

/// Parameters of the Waxman model: nodes are placed uniformly at random, and two nodes at distance
/// `d` are connected with probability `beta * exp(-d / (alpha * L))`, where `L` is the diagonal of
/// the area.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WaxmanConfig {
    /// Number of physical nodes
    pub nodes: usize,
    /// Width and height of the area
    pub area: (f64, f64),
    /// Sensitivity of the link probability to the distance
    pub alpha: f64,
    /// Maximum link probability
    pub beta: f64,
    /// Range of CPU capacities
    pub cpu: (f64, f64),
    /// Range of bandwidth capacities
    pub bandwidth: (f64, f64),
}

impl Default for WaxmanConfig {
    fn default() -> Self {
        Self {
            nodes: 100,
            area: (500.0, 500.0),
            alpha: 0.5,
            beta: 0.2,
            cpu: (50.0, 100.0),
            bandwidth: (50.0, 100.0),
        }
    }
}

impl WaxmanConfig {
    /// Generate a connected physical network. Disconnected components are joined by linking the
    /// closest pair of nodes between the main component and each other component.
    pub fn build<R: Rng>(&self, rng: &mut R) -> Result<PhysicalNetwork, ConfigError> {
        check_range((0.0, self.area.0))?;
        check_range((0.0, self.area.1))?;
        check_rate(self.alpha)?;
        check_probability(self.beta)?;
        check_range(self.cpu)?;
        check_range(self.bandwidth)?;

        let mut net = PhysicalNetwork::new();
        let mut locations: Vec<Location> = Vec::with_capacity(self.nodes);
        for i in 0..self.nodes {
            let x = rng.gen_range(0.0..=self.area.0);
            let y = rng.gen_range(0.0..=self.area.1);
            let cpu = rng.gen_range(self.cpu.0..=self.cpu.1);
            let loc = Location::new(x, y);
            net.add_node(format!("PN{i}"), cpu, loc)?;
            locations.push(loc);
        }

        let max_dist = self.area.0.hypot(self.area.1);
        for j in 1..self.nodes {
            for i in 0..j {
                let d = locations[i].distance(&locations[j]);
                let p = if max_dist > 0.0 {
                    self.beta * (-d / (self.alpha * max_dist)).exp()
                } else {
                    self.beta
                };
                if rng.gen::<f64>() < p {
                    let bw = rng.gen_range(self.bandwidth.0..=self.bandwidth.1);
                    net.add_link(node(i), node(j), bw)?;
                }
            }
        }

        // join all components with the main one
        let mut comps = components(net.graph()).into_iter();
        if let Some(mut main) = comps.next() {
            for comp in comps {
                let closest = main
                    .iter()
                    .flat_map(|a| comp.iter().map(move |b| (*a, *b)))
                    .min_by(|(a1, b1), (a2, b2)| {
                        let d1 = locations[a1.index()].distance(&locations[b1.index()]);
                        let d2 = locations[a2.index()].distance(&locations[b2.index()]);
                        d1.total_cmp(&d2)
                    });
                if let Some((a, b)) = closest {
                    let bw = rng.gen_range(self.bandwidth.0..=self.bandwidth.1);
                    net.add_link(a, b, bw)?;
                }
                main.extend(comp);
            }
        }

        debug!(
            "Generated a Waxman topology with {} nodes and {} links",
            net.num_nodes(),
            net.num_links()
        );
        Ok(net)
    }
}

/// Get the node id at a given position.
fn node(i: usize) -> NodeId {
    NodeId::new(i)
}

/// Compute the connected components of a graph. Components are ordered by their lowest node id,
/// and the nodes within each component are sorted.
pub(crate) fn components<N, E>(graph: &Graph<N, E, Undirected, IndexType>) -> Vec<Vec<NodeId>> {
    let mut missing: BTreeSet<NodeId> = graph.node_indices().collect();
    let mut comps = Vec::new();
    while let Some(r) = missing.iter().next().copied() {
        missing.remove(&r);
        let mut comp = vec![r];
        let mut to_explore = vec![r];
        while let Some(r) = to_explore.pop() {
            for x in graph.neighbors(r) {
                if missing.remove(&x) {
                    comp.push(x);
                    to_explore.push(x);
                }
            }
        }
        comp.sort();
        comps.push(comp);
    }
    comps
}
