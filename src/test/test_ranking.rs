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

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use test_log::test;

use super::{chain, pinned};
use crate::{
    network::PhysicalNetwork,
    path::Path,
    provision::Mapping,
    ranking::{NodeRanker, UNREACHABLE_HOPS},
    slice::SliceRequest,
    types::{LinkId, NodeId},
};

/// Slice graph with three nodes in a line.
///
/// ```text
///  v0 (1) --[4]-- v1 (2) --[5]-- v2 (3)
/// ```
fn line_slice() -> SliceRequest {
    let mut r = SliceRequest::new(0, 0.0, 1.0);
    let v0 = r.add_node(1.0, (0.0, 0.0), 0.0);
    let v1 = r.add_node(2.0, (0.0, 0.0), 0.0);
    let v2 = r.add_node(3.0, (0.0, 0.0), 0.0);
    r.add_link(v0, v1, 4.0).unwrap();
    r.add_link(v1, v2, 5.0).unwrap();
    r
}

#[test]
fn attributes_of_line() {
    let r = line_slice();
    let ranking = NodeRanker::default().rank(r.graph());
    let [v0, v1, v2] = [0, 1, 2].map(NodeId::new);

    let a0 = ranking.attributes(v0);
    assert_relative_eq!(a0.lr, 4.0);
    assert_relative_eq!(a0.dc, 0.5);
    assert_relative_eq!(a0.cc, 2.0 / 3.0);
    // (4 + 1) to v1 and (4 + 1) to v2
    assert_relative_eq!(a0.gr, 5.0);

    let a1 = ranking.attributes(v1);
    assert_relative_eq!(a1.lr, 18.0);
    assert_relative_eq!(a1.dc, 1.0);
    assert_relative_eq!(a1.cc, 1.0);
    // (4 + 1) to v0 and (5 + 2) to v2
    assert_relative_eq!(a1.gr, 6.0);

    let a2 = ranking.attributes(v2);
    assert_relative_eq!(a2.lr, 15.0);
    assert_relative_eq!(a2.dc, 0.5);
    assert_relative_eq!(a2.cc, 2.0 / 3.0);
    assert_relative_eq!(a2.gr, 6.0);

    assert_relative_eq!(ranking.score(v0), 1.0 + 5.0 / 3.0);
    assert_relative_eq!(ranking.score(v1), 12.0);
    assert_relative_eq!(ranking.score(v2), 5.75);
    assert_eq!(ranking.order(), vec![v1, v2, v0]);
}

#[test]
fn hops_and_cooperation() {
    let r = line_slice();
    let ranking = NodeRanker::default().rank(r.graph());
    let [v0, v1, v2] = [0, 1, 2].map(NodeId::new);

    assert_eq!(ranking.hops(v0, v2), Some(2));
    assert_eq!(ranking.hops(v1, v1), Some(0));
    assert_eq!(ranking.hops(v0, NodeId::new(5)), None);
    assert_relative_eq!(ranking.cooperation(v0, [v1, v2]), 3.0);
    assert_relative_eq!(ranking.cooperation(v0, Vec::<NodeId>::new()), 0.0);
    assert_relative_eq!(
        ranking.adjusted_score(v1, 2.0),
        12.0 / (2.0 + 1e-5),
        max_relative = 1e-12
    );
}

#[test]
fn ranking_weights() {
    let r = line_slice();
    let v1 = NodeId::new(1);
    let local = NodeRanker::new(1.0, 0.0, 1e-5).rank(r.graph());
    let global = NodeRanker::new(0.0, 1.0, 1e-5).rank(r.graph());
    assert_relative_eq!(local.score(v1), 18.0);
    assert_relative_eq!(global.score(v1), 6.0);
}

#[test]
fn single_node() {
    let mut net = PhysicalNetwork::new();
    let a = net.add_node("a", 10.0, (0.0, 0.0)).unwrap();
    let ranking = NodeRanker::default().rank(net.graph());
    assert_relative_eq!(ranking.score(a), 0.0);
    assert_eq!(ranking.order(), vec![a]);
}

#[test]
fn disconnected() {
    let mut net = PhysicalNetwork::new();
    let a = net.add_node("a", 10.0, (0.0, 0.0)).unwrap();
    let b = net.add_node("b", 10.0, (0.0, 0.0)).unwrap();
    let ranking = NodeRanker::default().rank(net.graph());
    let attr = ranking.attributes(a);
    assert_relative_eq!(attr.lr, 0.0);
    assert_relative_eq!(attr.gr, 0.0);
    assert_relative_eq!(attr.dc, 0.0);
    assert_relative_eq!(attr.cc, 0.0);
    assert_eq!(ranking.hops(a, b), None);
    assert_relative_eq!(ranking.cooperation(a, [b]), UNREACHABLE_HOPS as f64);
}

#[test]
fn parallel_links() {
    let mut net = PhysicalNetwork::new();
    let a = net.add_node("a", 2.0, (0.0, 0.0)).unwrap();
    let b = net.add_node("b", 5.0, (0.0, 0.0)).unwrap();
    net.add_link(a, b, 3.0).unwrap();
    net.add_link(a, b, 4.0).unwrap();
    let ranking = NodeRanker::default().rank(net.graph());

    let attr = ranking.attributes(a);
    assert_relative_eq!(attr.lr, 14.0);
    assert_relative_eq!(attr.dc, 1.0);
    assert_relative_eq!(attr.cc, 1.0);
    // the lowest link is used for the path: 3 + min(2, 5)
    assert_relative_eq!(attr.gr, 5.0);
}

#[test]
fn ranking_uses_available_resources() {
    let mut net = chain(10.0, &[10.0]);
    let [n0, n1] = [0, 1].map(NodeId::new);
    let before = NodeRanker::default().rank(net.graph());
    assert_relative_eq!(before.attributes(n0).lr, 100.0);

    let mut r = SliceRequest::new(0, 0.0, 1.0);
    let x = pinned(&mut r, 4.0, (0.0, 0.0));
    let y = pinned(&mut r, 4.0, (10.0, 0.0));
    r.add_link(x, y, 5.0).unwrap();
    let mut path = Path::new(n0);
    path.push(LinkId::new(0), n1);
    net.commit(&r, &Mapping::new(r.id(), vec![n0, n1], vec![path]))
        .unwrap();

    let after = NodeRanker::default().rank(net.graph());
    assert_relative_eq!(after.attributes(n0).lr, 30.0);
    // min bandwidth 5, min cpu 6
    assert_relative_eq!(after.attributes(n0).gr, 11.0);
}
