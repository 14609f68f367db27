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

use pretty_assertions::assert_eq;
use test_log::test;

use super::{chain, pinned};
use crate::{
    formatter::NetworkFormatter,
    network::PhysicalNetwork,
    path::Path,
    provision::Mapping,
    slice::SliceRequest,
    types::{LinkId, NetworkError, NodeId, SliceError, SliceId},
};

/// Two slice nodes on `n0` and `n1`, connected by a link with demand `bw`.
fn two_node_slice(id: usize, cpu: f64, bw: f64) -> (SliceRequest, Mapping) {
    let mut r = SliceRequest::new(id, 0.0, 10.0);
    let x = pinned(&mut r, cpu, (0.0, 0.0));
    let y = pinned(&mut r, cpu, (10.0, 0.0));
    r.add_link(x, y, bw).unwrap();
    let mut path = Path::new(NodeId::new(0));
    path.push(LinkId::new(0), NodeId::new(1));
    let mapping = Mapping::new(r.id(), vec![NodeId::new(0), NodeId::new(1)], vec![path]);
    (r, mapping)
}

fn available(net: &PhysicalNetwork) -> (Vec<f64>, Vec<f64>) {
    (
        net.nodes()
            .map(|n| net.node(n).unwrap().cpu().available())
            .collect(),
        net.links()
            .map(|l| net.link(l).unwrap().bandwidth().available())
            .collect(),
    )
}

#[test]
fn build_network() {
    let net = chain(10.0, &[5.0, 6.0]);
    assert_eq!(net.num_nodes(), 3);
    assert_eq!(net.num_links(), 2);
    assert!(net.is_connected());
    assert_eq!(net.get_node_id("n1"), Ok(NodeId::new(1)));
    assert_eq!(
        net.get_node_id("x"),
        Err(NetworkError::NodeNameNotFound("x".to_string()))
    );
    assert_eq!(
        net.link_endpoints(LinkId::new(1)),
        Ok((NodeId::new(1), NodeId::new(2)))
    );
    assert_eq!(net.node_name(NodeId::new(7)), "?");
}

#[test]
fn invalid_network() {
    let mut net = PhysicalNetwork::new();
    let a = net.add_node("a", 10.0, (0.0, 0.0)).unwrap();
    assert_eq!(
        net.add_node("b", -1.0, (0.0, 0.0)),
        Err(NetworkError::InvalidCapacity(-1.0))
    );
    assert_eq!(net.add_link(a, a, 10.0), Err(NetworkError::SelfLoop(a)));
    assert_eq!(
        net.add_link(a, NodeId::new(1), 10.0),
        Err(NetworkError::NodeNotFound(NodeId::new(1)))
    );
    let b = net.add_node("b", 10.0, (0.0, 0.0)).unwrap();
    assert!(!net.is_connected());
    assert!(net.add_link(a, b, f64::NAN).is_err());
}

#[test]
fn parallel_links() {
    let mut net = PhysicalNetwork::new();
    let a = net.add_node("a", 10.0, (0.0, 0.0)).unwrap();
    let b = net.add_node("b", 10.0, (0.0, 0.0)).unwrap();
    let l1 = net.add_link(a, b, 10.0).unwrap();
    let l2 = net.add_link(b, a, 20.0).unwrap();
    assert_eq!(net.links_between(a, b), vec![l1, l2]);
    assert_eq!(net.links_between(b, a), vec![l1, l2]);
}

#[test]
fn commit_release_round_trip() {
    let mut net = chain(10.0, &[10.0]);
    let (r, mapping) = two_node_slice(0, 4.0, 3.0);
    let before = available(&net);

    net.commit(&r, &mapping).unwrap();
    assert_eq!(available(&net), (vec![6.0, 6.0], vec![7.0]));
    assert!(net.is_committed(r.id()));
    assert_eq!(net.committed_slices().collect::<Vec<_>>(), vec![SliceId(0)]);
    assert_eq!(net.node(NodeId::new(0)).unwrap().cpu().reserved_by(r.id()), 4.0);

    let u = net.utilization();
    assert_eq!(u.cpu_used, 8.0);
    assert_eq!(u.cpu_initial, 20.0);
    assert_eq!(u.bandwidth_used, 3.0);
    assert_eq!(u.bandwidth_available(), 7.0);

    net.release(&r, &mapping).unwrap();
    assert_eq!(available(&net), before);
    assert!(!net.is_committed(r.id()));
}

#[test]
fn release_is_exact() {
    let mut net = chain(1.0, &[1.0]);
    let slices: Vec<_> = [0.1, 0.2, 0.3]
        .into_iter()
        .enumerate()
        .map(|(i, x)| two_node_slice(i, x, x))
        .collect();
    for (r, m) in slices.iter() {
        net.commit(r, m).unwrap();
    }
    // release in a different order than the commit
    for i in [1, 2, 0] {
        let (r, m) = &slices[i];
        net.release(r, m).unwrap();
    }
    assert_eq!(available(&net), (vec![1.0, 1.0], vec![1.0]));
    assert_eq!(net.committed_slices().count(), 0);
}

#[test]
fn double_commit() {
    let mut net = chain(10.0, &[10.0]);
    let (r, mapping) = two_node_slice(0, 1.0, 1.0);
    net.commit(&r, &mapping).unwrap();
    assert_eq!(
        net.commit(&r, &mapping),
        Err(NetworkError::AlreadyCommitted(SliceId(0)))
    );
    assert_eq!(available(&net), (vec![9.0, 9.0], vec![9.0]));
}

#[test]
fn release_unknown() {
    let mut net = chain(10.0, &[10.0]);
    let (r, mapping) = two_node_slice(3, 1.0, 1.0);
    assert_eq!(
        net.release(&r, &mapping),
        Err(NetworkError::NotCommitted(SliceId(3)))
    );
}

#[test]
fn commit_insufficient() {
    let mut net = chain(10.0, &[10.0]);
    let before = available(&net);

    let (r, mapping) = two_node_slice(0, 11.0, 1.0);
    assert_eq!(
        net.commit(&r, &mapping),
        Err(NetworkError::InsufficientCpu {
            node: NodeId::new(0),
            demand: 11.0,
            available: 10.0
        })
    );
    assert_eq!(available(&net), before);

    let (r, mapping) = two_node_slice(1, 1.0, 11.0);
    assert_eq!(
        net.commit(&r, &mapping),
        Err(NetworkError::InsufficientBandwidth {
            link: LinkId::new(0),
            demand: 11.0,
            available: 10.0
        })
    );
    assert_eq!(available(&net), before);
    assert!(!net.is_committed(SliceId(1)));
}

#[test]
fn commit_invalid_mapping() {
    let mut net = chain(10.0, &[10.0]);
    let (r, _) = two_node_slice(0, 1.0, 1.0);

    // both nodes on the same host
    let mapping = Mapping::new(
        r.id(),
        vec![NodeId::new(0), NodeId::new(0)],
        vec![Path::new(NodeId::new(0))],
    );
    assert_eq!(
        net.commit(&r, &mapping),
        Err(NetworkError::InvalidMapping(SliceId(0)))
    );

    // path does not connect the hosts
    let mapping = Mapping::new(
        r.id(),
        vec![NodeId::new(0), NodeId::new(1)],
        vec![Path::new(NodeId::new(0))],
    );
    assert_eq!(
        net.commit(&r, &mapping),
        Err(NetworkError::InvalidMapping(SliceId(0)))
    );

    // mapping of another slice
    let (_, other) = two_node_slice(1, 1.0, 1.0);
    assert_eq!(
        net.commit(&r, &other),
        Err(NetworkError::InvalidMapping(SliceId(0)))
    );
    assert_eq!(net.committed_slices().count(), 0);
}

#[test]
fn slice_request() {
    let mut r = SliceRequest::new(4, 1.0, 10.0);
    let x = r.add_node(2.0, (0.0, 0.0), 5.0);
    let y = r.add_node(3.0, (1.0, 0.0), 5.0);
    assert_eq!(r.graph()[x].name(), "SR4_VN0");
    assert_eq!(r.add_link(x, x, 1.0), Err(SliceError::SelfLoop(SliceId(4), x)));
    assert_eq!(
        r.add_link(x, NodeId::new(2), 1.0),
        Err(SliceError::UnknownNode(SliceId(4), NodeId::new(2)))
    );
    assert_eq!(r.validate(), Err(SliceError::Disconnected(SliceId(4))));
    r.add_link(x, y, 4.0).unwrap();
    assert_eq!(r.validate(), Ok(()));
    assert_eq!(r.departure(), 11.0);
    assert_eq!(r.revenue(), 9.0);

    let r = SliceRequest::new(5, 1.0, 10.0);
    assert_eq!(r.validate(), Err(SliceError::Empty(SliceId(5))));

    let mut r = SliceRequest::new(6, 1.0, 0.0);
    r.add_node(1.0, (0.0, 0.0), 0.0);
    assert_eq!(r.validate(), Err(SliceError::InvalidLifetime(SliceId(6), 0.0)));

    let mut r = SliceRequest::new(7, 1.0, 1.0);
    r.add_node(1.0, (0.0, 0.0), -1.0);
    assert_eq!(
        r.validate(),
        Err(SliceError::NegativeDeviation(SliceId(7), NodeId::new(0), -1.0))
    );
}

#[test]
fn format_mapping() {
    let net = chain(10.0, &[10.0]);
    let (_, mapping) = two_node_slice(0, 1.0, 1.0);
    assert_eq!(mapping.paths()[0].fmt(&net), "n0 => n1");
    assert_eq!(
        mapping.fmt(&net),
        "nodes [0 -> n0, 1 -> n1], links [0: n0 => n1]"
    );
}
