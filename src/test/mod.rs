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

//! Test module

use crate::{
    network::PhysicalNetwork,
    slice::SliceRequest,
    types::{Location, NodeId},
};

mod test_network;
mod test_path;
mod test_ranking;

/// Build the following network. Node `a` is at `(0, 0)`, `b` at `(100, 0)`, `c` at `(0, 100)` and
/// `d` at `(100, 100)`. All nodes have 100 CPU. All links have 100 bandwidth, except the diagonal
/// `a -- d`, which has `diagonal` bandwidth.
///
/// ```text
/// a ----- b
/// | \     |
/// |   \   |
/// |     \ |
/// c ----- d
/// ```
///
/// The links are added in the order `a-b`, `b-d`, `a-c`, `c-d`, `a-d`.
pub(crate) fn square(diagonal: f64) -> (PhysicalNetwork, [NodeId; 4]) {
    let net = PhysicalNetwork::build(
        [
            ("a".to_string(), 100.0, (0.0, 0.0)),
            ("b".to_string(), 100.0, (100.0, 0.0)),
            ("c".to_string(), 100.0, (0.0, 100.0)),
            ("d".to_string(), 100.0, (100.0, 100.0)),
        ],
        [
            (0, 1, 100.0),
            (1, 3, 100.0),
            (0, 2, 100.0),
            (2, 3, 100.0),
            (0, 3, diagonal),
        ],
    )
    .unwrap();
    let ids = [0, 1, 2, 3].map(NodeId::new);
    (net, ids)
}

/// Build a chain of nodes `n0 -- n1 -- ... -- nk`, one link for each given bandwidth. Node `ni` is
/// at `(10 * i, 0)` and has `cpu` CPU.
///
/// ```text
/// n0 --- n1 --- n2 --- ...
/// ```
pub(crate) fn chain(cpu: f64, bandwidths: &[f64]) -> PhysicalNetwork {
    PhysicalNetwork::build(
        (0..=bandwidths.len()).map(|i| (format!("n{i}"), cpu, (10.0 * i as f64, 0.0))),
        bandwidths.iter().enumerate().map(|(i, bw)| (i, i + 1, *bw)),
    )
    .unwrap()
}

/// Add a slice node that can only be placed within distance `1` of `location`.
pub(crate) fn pinned(request: &mut SliceRequest, cpu: f64, location: (f64, f64)) -> NodeId {
    request.add_node(cpu, Location::from(location), 1.0)
}
