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

//! # SliceSim: Real-time network slice provisioning
//!
//! This library maps virtual network slices onto a shared physical network under CPU, bandwidth,
//! and location constraints, and simulates a stream of such slice requests over time. It
//! implements the two variants RT-CSP and RT-CSP+ of the real-time cooperative slice provisioning
//! algorithm.
//!
//! ## Structure
//! The source code of this library is structured as follows:
//! - The module [`network`] contains the [`PhysicalNetwork`], which keeps track of all resources
//!   reserved by committed slices. The module [`slice`] defines the [`SliceRequest`].
//! - The module [`ranking`] computes the node attributes (local and global resources, degree and
//!   closeness centrality) and the combined scores used for node placement.
//! - The module [`path`] enumerates the `K` shortest paths (Yen's algorithm) and selects one
//!   according to a [`path::PathStrategy`].
//! - The module [`provision`] contains the [`Provisioner`], which maps a slice in two stages (nodes,
//!   then links), and commits the result atomically.
//! - The modules [`event`], [`sim`], and [`metrics`] implement the discrete-event simulation that
//!   drives a stream of requests, and the aggregates it reports.
//! - The modules [`builder`] and [`generator`] create random physical networks (Waxman model) and
//!   random request streams (Poisson arrivals, exponential lifetimes).
//!
//! ## Example
//!
//! ```rust
//! use slicesim::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut net = PhysicalNetwork::new();
//!     let a = net.add_node("a", 10.0, (0.0, 0.0))?;
//!     let b = net.add_node("b", 10.0, (10.0, 0.0))?;
//!     net.add_link(a, b, 10.0)?;
//!
//!     let mut request = SliceRequest::new(0, 0.0, 100.0);
//!     let x = request.add_node(5.0, (0.0, 0.0), 1.0);
//!     let y = request.add_node(5.0, (10.0, 0.0), 1.0);
//!     request.add_link(x, y, 4.0)?;
//!
//!     let provisioner = Provisioner::new(ProvisionConfig::default());
//!     let outcome = provisioner.provision(&mut net, &request)?;
//!     assert!(outcome.is_accepted());
//!     assert_eq!(net.node(a)?.cpu().available(), 5.0);
//!     Ok(())
//! }
//! ```

#![deny(
    missing_docs,
    clippy::missing_docs_in_private_items,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::result_large_err)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod builder;
pub mod event;
mod formatter;
pub mod generator;
pub mod metrics;
pub mod network;
pub mod path;
pub mod provision;
pub mod ranking;
pub mod sim;
pub mod slice;
#[cfg(test)]
mod test;
pub mod types;

pub use formatter::NetworkFormatter;
pub use network::PhysicalNetwork;
pub use provision::{Provisioner, ProvisionOutcome};
pub use sim::{run_simulation, Simulator};
pub use slice::SliceRequest;

/// Re-exports of the most important types.
pub mod prelude {
    pub use crate::{
        event::{Event, EventKind, EventQueue, TimedEventQueue},
        formatter::NetworkFormatter,
        metrics::MetricsSnapshot,
        network::PhysicalNetwork,
        path::{Path, PathStrategy},
        provision::{
            ActiveSlice, Algorithm, Mapping, ProvisionConfig, ProvisionError, ProvisionOutcome,
            Provisioner, RejectReason,
        },
        sim::{run_simulation, Horizon, SimConfig, SimError, SimReport, Simulator},
        slice::SliceRequest,
        types::{LinkId, Location, NetworkError, NodeId, SliceError, SliceId},
    };
}
