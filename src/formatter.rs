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

//! Module that introduces a formatter to display all types containing physical `NodeId`s.

use itertools::Itertools;

use crate::{network::PhysicalNetwork, path::Path, provision::Mapping, types::NodeId};

/// Trait to format a type that contains physical node ids, using the node names.
pub trait NetworkFormatter<'a, 'n> {
    /// Type that is returned, which implements `std::fmt::Display`.
    type Formatter;

    /// Return a struct that can be formatted and displayed.
    fn fmt(&'a self, net: &'n PhysicalNetwork) -> Self::Formatter;
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for NodeId {
    type Formatter = &'n str;

    fn fmt(&'a self, net: &'n PhysicalNetwork) -> Self::Formatter {
        net.node_name(*self)
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for Path {
    type Formatter = String;

    fn fmt(&'a self, net: &'n PhysicalNetwork) -> Self::Formatter {
        self.nodes().iter().map(|n| n.fmt(net)).join(" => ")
    }
}

impl<'a, 'n> NetworkFormatter<'a, 'n> for Mapping {
    type Formatter = String;

    fn fmt(&'a self, net: &'n PhysicalNetwork) -> Self::Formatter {
        format!(
            "nodes [{}], links [{}]",
            self.nodes()
                .iter()
                .enumerate()
                .map(|(i, n)| format!("{i} -> {}", n.fmt(net)))
                .join(", "),
            self.paths()
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{i}: {}", p.fmt(net)))
                .join(", ")
        )
    }
}
