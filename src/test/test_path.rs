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

use super::square;
use crate::{
    formatter::NetworkFormatter,
    network::PhysicalNetwork,
    path::{k_shortest_paths, Path, PathSelector, PathStrategy, TentativeBandwidth},
    types::{LinkId, NodeId},
};

/// Build a path from a list of `(link, node)` hops.
fn path(source: NodeId, hops: &[(usize, NodeId)]) -> Path {
    let mut p = Path::new(source);
    for (l, n) in hops {
        p.push(LinkId::new(*l), *n);
    }
    p
}

#[test]
fn yen_square() {
    let (net, [a, b, c, d]) = square(100.0);
    let paths = k_shortest_paths(net.graph(), a, d, 3);
    assert_eq!(
        paths,
        vec![
            path(a, &[(4, d)]),
            path(a, &[(0, b), (1, d)]),
            path(a, &[(2, c), (3, d)]),
        ]
    );
    assert_eq!(
        paths.iter().map(|p| p.fmt(&net)).collect::<Vec<_>>(),
        vec!["a => d", "a => b => d", "a => c => d"]
    );
}

#[test]
fn yen_fewer_paths_than_k() {
    let (net, [a, _, _, d]) = square(100.0);
    assert_eq!(k_shortest_paths(net.graph(), a, d, 10).len(), 3);
    assert_eq!(k_shortest_paths(net.graph(), a, d, 1).len(), 1);
    assert_eq!(k_shortest_paths(net.graph(), a, d, 0).len(), 0);
    assert_eq!(k_shortest_paths(net.graph(), a, a, 3).len(), 0);
}

#[test]
fn yen_longer_paths() {
    let (net, [_, b, c, _]) = square(100.0);
    let paths = k_shortest_paths(net.graph(), b, c, 5);
    let hops: Vec<usize> = paths.iter().map(Path::hops).collect();
    assert_eq!(hops, vec![2, 2, 3, 3]);
    for p in paths.iter() {
        assert_eq!(p.source(), Some(b));
        assert_eq!(p.target(), Some(c));
        // simple path
        let mut nodes = p.nodes().to_vec();
        nodes.sort();
        nodes.dedup();
        assert_eq!(nodes.len(), p.nodes().len());
    }
}

#[test]
fn yen_parallel_links() {
    let mut net = PhysicalNetwork::new();
    let a = net.add_node("a", 10.0, (0.0, 0.0)).unwrap();
    let b = net.add_node("b", 10.0, (0.0, 0.0)).unwrap();
    net.add_link(a, b, 10.0).unwrap();
    net.add_link(a, b, 10.0).unwrap();
    let paths = k_shortest_paths(net.graph(), a, b, 3);
    assert_eq!(paths, vec![path(a, &[(0, b)]), path(a, &[(1, b)])]);
}

#[test]
fn yen_unreachable() {
    let mut net = PhysicalNetwork::new();
    let a = net.add_node("a", 10.0, (0.0, 0.0)).unwrap();
    let b = net.add_node("b", 10.0, (0.0, 0.0)).unwrap();
    assert!(k_shortest_paths(net.graph(), a, b, 3).is_empty());
}

#[test]
fn tentative_bandwidth() {
    let (net, [a, _, _, d]) = square(10.0);
    let direct = path(a, &[(4, d)]);
    let mut tentative = TentativeBandwidth::new();
    assert_relative_eq!(tentative.residual(&net, LinkId::new(4)), 10.0);
    assert_relative_eq!(tentative.gamma(&net, &direct), 0.0);

    tentative.reserve(&direct, 8.0);
    assert_relative_eq!(tentative.reserved(LinkId::new(4)), 8.0);
    assert_relative_eq!(tentative.residual(&net, LinkId::new(4)), 2.0);
    assert_relative_eq!(tentative.gamma(&net, &direct), 0.8);
    assert!(tentative.is_feasible(&net, &direct, 2.0));
    assert!(!tentative.is_feasible(&net, &direct, 2.5));
}

#[test]
fn first_feasible() {
    let (net, [a, b, _, d]) = square(100.0);
    let mut tentative = TentativeBandwidth::new();
    tentative.reserve(&path(a, &[(4, d)]), 90.0);
    let selector = PathSelector::new(3, PathStrategy::FirstFeasible);

    assert_eq!(
        selector.select(&net, &tentative, a, d, 5.0),
        Some(path(a, &[(4, d)]))
    );
    assert_eq!(
        selector.select(&net, &tentative, a, d, 20.0),
        Some(path(a, &[(0, b), (1, d)]))
    );
    assert_eq!(selector.select(&net, &tentative, a, d, 200.0), None);
}

#[test]
fn min_max_bw_util_hops() {
    let (net, [a, b, c, d]) = square(100.0);
    let mut tentative = TentativeBandwidth::new();
    tentative.reserve(&path(a, &[(4, d)]), 90.0);
    let selector = PathSelector::new(3, PathStrategy::MinMaxBwUtilHops);

    // the diagonal has Γ = 0.9, both others have Γ = 0. Ties go to the first one.
    assert_eq!(
        selector.select(&net, &tentative, a, d, 5.0),
        Some(path(a, &[(0, b), (1, d)]))
    );

    // load the upper path, such that the lower one is best.
    tentative.reserve(&path(a, &[(0, b)]), 50.0);
    assert_eq!(
        selector.select(&net, &tentative, a, d, 5.0),
        Some(path(a, &[(2, c), (3, d)]))
    );
}

#[test]
fn min_max_bw_util_hops_prefers_short_paths() {
    let (net, [a, _, _, d]) = square(100.0);
    let mut tentative = TentativeBandwidth::new();
    // Γ of the diagonal is 0.3, while the other two have Γ = 0.2 * 2 = 0.4.
    tentative.reserve(&path(a, &[(4, d)]), 30.0);
    tentative.reserve(&path(a, &[(0, NodeId::new(1))]), 20.0);
    tentative.reserve(&path(a, &[(2, NodeId::new(2))]), 20.0);
    let selector = PathSelector::new(3, PathStrategy::MinMaxBwUtilHops);
    assert_eq!(
        selector.select(&net, &tentative, a, d, 5.0),
        Some(path(a, &[(4, d)]))
    );
}

#[test]
fn gamma_dominance() {
    let (net, [a, b, c, d]) = square(100.0);
    let mut tentative = TentativeBandwidth::new();
    tentative.reserve(&path(a, &[(4, d)]), 35.0);
    tentative.reserve(&path(a, &[(0, b), (1, d)]), 10.0);
    tentative.reserve(&path(c, &[(3, d)]), 25.0);
    let selector = PathSelector::new(3, PathStrategy::MinMaxBwUtilHops);

    let candidates = selector.feasible_paths(&net, &tentative, a, d, 5.0);
    assert_eq!(candidates.len(), 3);
    let chosen = selector
        .choose(&net, &tentative, candidates.clone())
        .unwrap();
    let gamma = tentative.gamma(&net, &chosen);
    for p in candidates.iter() {
        assert!(gamma <= tentative.gamma(&net, p));
    }
    assert_eq!(chosen, path(a, &[(0, b), (1, d)]));
}
