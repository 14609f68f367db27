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

//! Running aggregates of a simulation: acceptance, revenue, and cost.
//!
//! The revenue of an accepted slice is the sum of all its demands. The cost additionally weights
//! every bandwidth demand by the number of hops of its path. All ratios with a zero denominator are
//! reported as `0`.

use crate::provision::RejectReason;

/// Incrementally updated counters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Metrics {
    /// Number of processed arrivals
    arrivals: usize,
    /// Number of accepted slices
    accepted: usize,
    /// Number of slices rejected during node mapping
    node_failures: usize,
    /// Number of slices rejected during link mapping
    link_failures: usize,
    /// Number of processed departures
    departures: usize,
    /// Cumulative revenue of all accepted slices
    revenue: f64,
    /// Cumulative cost of all accepted slices
    cost: f64,
}

impl Metrics {
    /// Create new, empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the arrival of a slice that got accepted.
    pub fn record_accepted(&mut self, revenue: f64, cost: f64) {
        self.arrivals += 1;
        self.accepted += 1;
        self.revenue += revenue;
        self.cost += cost;
    }

    /// Record the arrival of a slice that got rejected.
    pub fn record_rejected(&mut self, reason: RejectReason) {
        self.arrivals += 1;
        match reason {
            RejectReason::NodeMappingFailed { .. } => self.node_failures += 1,
            RejectReason::LinkMappingFailed { .. } => self.link_failures += 1,
        }
    }

    /// Record the departure of an active slice.
    pub fn record_departure(&mut self) {
        self.departures += 1;
    }

    /// Capture the current values at simulation time `time`, with `active` slices in the network.
    pub fn snapshot(&self, time: f64, active: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            time,
            arrivals: self.arrivals,
            accepted: self.accepted,
            rejected: self.node_failures + self.link_failures,
            node_failures: self.node_failures,
            link_failures: self.link_failures,
            departures: self.departures,
            active,
            revenue: self.revenue,
            cost: self.cost,
        }
    }
}

/// Aggregate values at a specific point in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MetricsSnapshot {
    /// Simulation time
    pub time: f64,
    /// Number of processed arrivals
    pub arrivals: usize,
    /// Number of accepted slices
    pub accepted: usize,
    /// Number of rejected slices
    pub rejected: usize,
    /// Number of slices rejected during node mapping
    pub node_failures: usize,
    /// Number of slices rejected during link mapping
    pub link_failures: usize,
    /// Number of processed departures
    pub departures: usize,
    /// Number of slices active in the network
    pub active: usize,
    /// Cumulative revenue
    pub revenue: f64,
    /// Cumulative cost
    pub cost: f64,
}

impl MetricsSnapshot {
    /// Fraction of arrivals that were accepted.
    pub fn acceptance_ratio(&self) -> f64 {
        ratio(self.accepted as f64, self.arrivals as f64)
    }

    /// Fraction of arrivals that were rejected.
    pub fn rejection_ratio(&self) -> f64 {
        ratio(self.rejected as f64, self.arrivals as f64)
    }

    /// Cumulative revenue per arrival.
    pub fn average_revenue(&self) -> f64 {
        ratio(self.revenue, self.arrivals as f64)
    }

    /// Cumulative revenue per unit of simulation time.
    pub fn revenue_per_time(&self) -> f64 {
        ratio(self.revenue, self.time)
    }

    /// Cumulative revenue divided by cumulative cost.
    pub fn revenue_cost_ratio(&self) -> f64 {
        ratio(self.revenue, self.cost)
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "t = {:.1}: {}/{} accepted ({:.2}%), revenue {:.1}, cost {:.1}, R/C {:.3}",
            self.time,
            self.accepted,
            self.arrivals,
            self.acceptance_ratio() * 100.0,
            self.revenue,
            self.cost,
            self.revenue_cost_ratio()
        )
    }
}

/// Divide, returning `0` if the denominator is `0`.
fn ratio(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else {
        a / b
    }
}
