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

//! Stream of random slice requests.
//!
//! Requests arrive according to a Poisson process (exponentially distributed inter-arrival times)
//! and stay for an exponentially distributed lifetime. The topology of each slice is an Erdős–Rényi
//! graph, which is made connected by linking every extra component to the main one.

use log::*;
use rand::prelude::*;
use rand_distr::Exp;

use crate::{
    builder::components,
    slice::SliceRequest,
    types::{ConfigError, Location, SliceError, SliceId},
};

/// Parameters of the request stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RequestConfig {
    /// Mean number of arrivals per time unit
    pub arrival_rate: f64,
    /// Mean lifetime of a slice
    pub mean_lifetime: f64,
    /// Minimum and maximum number of nodes of a slice
    pub nodes: (usize, usize),
    /// Probability that two slice nodes are connected
    pub connection_probability: f64,
    /// Range of CPU demands
    pub cpu: (f64, f64),
    /// Range of bandwidth demands
    pub bandwidth: (f64, f64),
    /// Width and height of the area in which expected locations are drawn
    pub area: (f64, f64),
    /// Maximum deviation from the expected location
    pub max_deviation: f64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            arrival_rate: 0.04,
            mean_lifetime: 500.0,
            nodes: (2, 10),
            connection_probability: 0.5,
            cpu: (1.0, 20.0),
            bandwidth: (1.0, 20.0),
            area: (500.0, 500.0),
            max_deviation: 80.0,
        }
    }
}

impl RequestConfig {
    /// Check that all parameters are valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate(self.arrival_rate)?;
        check_rate(self.mean_lifetime)?;
        if self.nodes.0 == 0 || self.nodes.0 > self.nodes.1 {
            return Err(ConfigError::InvalidNodeRange(self.nodes.0, self.nodes.1));
        }
        check_probability(self.connection_probability)?;
        check_range(self.cpu)?;
        check_range(self.bandwidth)?;
        check_range((0.0, self.area.0))?;
        check_range((0.0, self.area.1))?;
        check_range((0.0, self.max_deviation))?;
        Ok(())
    }
}

/// Infinite stream of random slice requests with ids `SR0`, `SR1`, ... The stream is fully
/// determined by the random number generator.
#[derive(Debug, Clone)]
pub struct RequestGenerator<R = StdRng> {
    /// Parameters
    config: RequestConfig,
    /// Random number generator
    rng: R,
    /// Distribution of the inter-arrival times
    inter_arrival: Exp<f64>,
    /// Distribution of the lifetimes
    lifetime: Exp<f64>,
    /// Arrival time of the last request
    time: f64,
    /// Id of the next request
    next_id: usize,
}

impl<R: Rng> RequestGenerator<R> {
    /// Create a new generator.
    pub fn new(config: RequestConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let inter_arrival =
            Exp::new(config.arrival_rate).map_err(|_| ConfigError::InvalidRate(config.arrival_rate))?;
        let lifetime = Exp::new(1.0 / config.mean_lifetime)
            .map_err(|_| ConfigError::InvalidRate(config.mean_lifetime))?;
        Ok(Self {
            config,
            rng,
            inter_arrival,
            lifetime,
            time: 0.0,
            next_id: 0,
        })
    }

    /// Draw the next request.
    fn generate(&mut self) -> Result<SliceRequest, SliceError> {
        let c = &self.config;
        let rng = &mut self.rng;

        self.time += self.inter_arrival.sample(rng);
        let lifetime = self.lifetime.sample(rng);
        let id = SliceId(self.next_id);
        self.next_id += 1;

        let mut request = SliceRequest::new(id, self.time, lifetime);
        let num_nodes = rng.gen_range(c.nodes.0..=c.nodes.1);
        let nodes: Vec<_> = (0..num_nodes)
            .map(|_| {
                let cpu = rng.gen_range(c.cpu.0..=c.cpu.1);
                let x = rng.gen_range(0.0..=c.area.0);
                let y = rng.gen_range(0.0..=c.area.1);
                request.add_node(cpu, Location::new(x, y), c.max_deviation)
            })
            .collect();

        for j in 1..num_nodes {
            for i in 0..j {
                if rng.gen_bool(c.connection_probability) {
                    let bw = rng.gen_range(c.bandwidth.0..=c.bandwidth.1);
                    request.add_link(nodes[i], nodes[j], bw)?;
                }
            }
        }

        // connect every other component to the main one
        let mut comps = components(request.graph()).into_iter();
        if let Some(mut main) = comps.next() {
            for comp in comps {
                if let (Some(&a), Some(&b)) = (main.choose(rng), comp.choose(rng)) {
                    let bw = rng.gen_range(c.bandwidth.0..=c.bandwidth.1);
                    request.add_link(a, b, bw)?;
                }
                main.extend(comp);
            }
        }

        trace!(
            "Generated slice {id} at {:.1} with {} nodes and {} links",
            request.arrival(),
            request.num_nodes(),
            request.num_links()
        );
        Ok(request)
    }
}

impl<R: Rng> Iterator for RequestGenerator<R> {
    type Item = SliceRequest;

    fn next(&mut self) -> Option<Self::Item> {
        match self.generate() {
            Ok(r) => Some(r),
            Err(e) => {
                error!("Cannot generate a slice request: {e}");
                None
            }
        }
    }
}

/// Check that a rate or mean is positive and finite.
pub(crate) fn check_rate(x: f64) -> Result<(), ConfigError> {
    if x.is_finite() && x > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate(x))
    }
}

/// Check that a range is finite, non-negative, and not empty.
pub(crate) fn check_range((min, max): (f64, f64)) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && 0.0 <= min && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange(min, max))
    }
}

/// Check that a probability is in `[0, 1]`.
pub(crate) fn check_probability(p: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability(p))
    }
}
