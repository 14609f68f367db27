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

//! # Discrete-event simulation
//!
//! The [`Simulator`] pulls slice requests from a stream (any iterator of [`SliceRequest`]) and
//! processes arrivals and departures in time order. Each arrival is provisioned; an accepted slice
//! schedules its departure at `arrival + lifetime`, where its resources are released again.
//! Arrivals are pulled lazily, one at a time, so the stream may be infinite.

use std::collections::{BTreeMap, HashMap};

use log::*;
use ordered_float::NotNan;
use rand::prelude::*;
use thiserror::Error;

use crate::{
    event::{Event, EventKind, EventQueue, TimedEventQueue},
    generator::{RequestConfig, RequestGenerator},
    metrics::{Metrics, MetricsSnapshot},
    network::PhysicalNetwork,
    provision::{
        ActiveSlice, ProvisionConfig, ProvisionError, ProvisionOutcome, Provisioner, RejectReason,
    },
    slice::SliceRequest,
    types::{ConfigError, SliceId},
};

/// When the simulation stops.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Horizon {
    /// Pull at most this many requests from the stream, and process all events until the queue is
    /// empty (including all departures).
    Arrivals(usize),
    /// Process all events up to (and including) this time. Slices that are still active remain in
    /// the network.
    Time(f64),
}

/// Configuration of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SimConfig {
    /// Parameters of the provisioning engine
    pub provision: ProvisionConfig,
    /// Seed for the request stream
    pub seed: u64,
    /// When to stop
    pub horizon: Horizon,
    /// Record a snapshot of the metrics every `record_interval` events. `0` disables the time
    /// series (the final snapshot is still recorded).
    pub record_interval: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            provision: ProvisionConfig::default(),
            seed: 42,
            horizon: Horizon::Arrivals(2000),
            record_interval: 100,
        }
    }
}

/// Outcome of a single arrival, as recorded in the [`SimReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ArrivalOutcome {
    /// The slice was accepted
    Accepted,
    /// The slice was rejected
    Rejected(RejectReason),
}

/// Result of a simulation run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SimReport {
    /// Metrics at the end of the run
    pub metrics: MetricsSnapshot,
    /// Metrics recorded during the run
    pub series: Vec<MetricsSnapshot>,
    /// Outcome of every arrival, in processing order
    pub outcomes: Vec<(SliceId, ArrivalOutcome)>,
}

/// Error of the simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// The provisioning engine has thrown an error
    #[error("{0}")]
    Provision(#[from] ProvisionError),
    /// The request stream could not be constructed
    #[error("{0}")]
    Config(#[from] ConfigError),
    /// The stream yielded a request that arrives before the previous one.
    #[error("Slice {slice} arrives at {arrival}, before the previous request at {previous}")]
    OutOfOrder {
        /// Slice that arrives too early
        slice: SliceId,
        /// Arrival time of that slice
        arrival: f64,
        /// Arrival time of the previous request
        previous: f64,
    },
    /// The arrival time is not a number.
    #[error("Slice {0} has an invalid arrival or departure time")]
    InvalidTime(SliceId),
    /// The stream yielded two requests with the same id.
    #[error("Slice {0} appears twice in the request stream")]
    DuplicateSlice(SliceId),
    /// An event refers to a slice that is unknown.
    #[error("Event refers to the unknown slice {0}")]
    UnknownSlice(SliceId),
}

/// Discrete-event simulator. It owns the physical network, the event queue, and all active
/// slices.
#[derive(Debug)]
pub struct Simulator<Q = TimedEventQueue> {
    /// The physical network
    net: PhysicalNetwork,
    /// The provisioning engine
    provisioner: Provisioner,
    /// Enqueued events
    queue: Q,
    /// Requests whose arrival is enqueued
    pending: HashMap<SliceId, SliceRequest>,
    /// Slices currently committed to the network
    active: BTreeMap<SliceId, ActiveSlice>,
    /// Running aggregates
    metrics: Metrics,
    /// Number of requests pulled from the stream
    pulled: usize,
    /// Arrival time of the last pulled request
    last_arrival: f64,
    /// Number of processed events
    processed: usize,
}

impl Simulator<TimedEventQueue> {
    /// Create a new simulator with the default event queue.
    pub fn new(net: PhysicalNetwork, config: ProvisionConfig) -> Self {
        Self::with_queue(net, config, TimedEventQueue::new())
    }
}

impl<Q: EventQueue> Simulator<Q> {
    /// Create a new simulator with a custom event queue.
    pub fn with_queue(net: PhysicalNetwork, config: ProvisionConfig, queue: Q) -> Self {
        Self {
            net,
            provisioner: Provisioner::new(config),
            queue,
            pending: HashMap::new(),
            active: BTreeMap::new(),
            metrics: Metrics::new(),
            pulled: 0,
            last_arrival: 0.0,
            processed: 0,
        }
    }

    /// The physical network
    pub fn network(&self) -> &PhysicalNetwork {
        &self.net
    }

    /// Consume the simulator and return the physical network.
    pub fn into_network(self) -> PhysicalNetwork {
        self.net
    }

    /// All slices that are currently active.
    pub fn active_slices(&self) -> impl Iterator<Item = &ActiveSlice> {
        self.active.values()
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.queue.get_time()
    }

    /// Current metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.time(), self.active.len())
    }

    /// Run the simulation on a stream of requests until the horizon is reached.
    pub fn run<S>(
        &mut self,
        stream: S,
        horizon: Horizon,
        record_interval: usize,
    ) -> Result<SimReport, SimError>
    where
        S: IntoIterator<Item = SliceRequest>,
    {
        let mut stream = stream.into_iter();
        let mut report = SimReport::default();
        info!(
            "Start simulation with {} on {} nodes and {} links",
            self.provisioner.config().algorithm,
            self.net.num_nodes(),
            self.net.num_links()
        );

        self.pull(&mut stream, horizon)?;

        while let Some(next) = self.queue.peek() {
            if let Horizon::Time(t) = horizon {
                if next.time.into_inner() > t {
                    break;
                }
            }
            let Some(event) = self.queue.pop() else {
                break;
            };
            trace!("{:?} of {} at {}", event.kind, event.slice, event.time);

            match event.kind {
                EventKind::Arrival => {
                    let outcome = self.arrival(event.slice)?;
                    report.outcomes.push((event.slice, outcome));
                    self.pull(&mut stream, horizon)?;
                }
                EventKind::Departure => self.departure(event.slice)?,
            }

            self.processed += 1;
            if record_interval > 0 && self.processed % record_interval == 0 {
                report.series.push(self.metrics());
            }
        }

        report.metrics = self.metrics();
        report.series.push(report.metrics);
        info!("{} finished: {}", self.provisioner.config().algorithm, report.metrics);
        info!("Resource utilization: {}", self.net.utilization());
        Ok(report)
    }

    /// Pull the next request from the stream, and enqueue its arrival.
    fn pull<S>(&mut self, stream: &mut S, horizon: Horizon) -> Result<(), SimError>
    where
        S: Iterator<Item = SliceRequest>,
    {
        if let Horizon::Arrivals(n) = horizon {
            if self.pulled >= n {
                return Ok(());
            }
        }
        let Some(request) = stream.next() else {
            return Ok(());
        };
        self.pulled += 1;

        let id = request.id();
        let arrival = request.arrival();
        if arrival < self.last_arrival {
            return Err(SimError::OutOfOrder {
                slice: id,
                arrival,
                previous: self.last_arrival,
            });
        }
        let time = NotNan::new(arrival).map_err(|_| SimError::InvalidTime(id))?;
        if self.pending.contains_key(&id) || self.active.contains_key(&id) {
            return Err(SimError::DuplicateSlice(id));
        }

        self.last_arrival = arrival;
        self.pending.insert(id, request);
        self.queue.push(Event::arrival(time, id));
        Ok(())
    }

    /// Process the arrival of a slice request.
    fn arrival(&mut self, slice: SliceId) -> Result<ArrivalOutcome, SimError> {
        let request = self
            .pending
            .remove(&slice)
            .ok_or(SimError::UnknownSlice(slice))?;

        match self.provisioner.provision(&mut self.net, &request)? {
            ProvisionOutcome::Accepted(mapping) => {
                let active = ActiveSlice::new(request, mapping);
                self.metrics.record_accepted(active.revenue(), active.cost());
                let expiry =
                    NotNan::new(active.expiry()).map_err(|_| SimError::InvalidTime(slice))?;
                self.queue.push(Event::departure(expiry, slice));
                self.active.insert(slice, active);
                Ok(ArrivalOutcome::Accepted)
            }
            ProvisionOutcome::Rejected(reason) => {
                self.metrics.record_rejected(reason);
                Ok(ArrivalOutcome::Rejected(reason))
            }
        }
    }

    /// Process the departure of an active slice.
    fn departure(&mut self, slice: SliceId) -> Result<(), SimError> {
        let active = self
            .active
            .remove(&slice)
            .ok_or(SimError::UnknownSlice(slice))?;
        self.provisioner.release(&mut self.net, &active)?;
        self.metrics.record_departure();
        Ok(())
    }
}

/// Run a simulation on a stream of requests, and return the final network together with the
/// report.
pub fn run_simulation<S>(
    net: PhysicalNetwork,
    stream: S,
    config: &SimConfig,
) -> Result<(PhysicalNetwork, SimReport), SimError>
where
    S: IntoIterator<Item = SliceRequest>,
{
    let mut sim = Simulator::new(net, config.provision);
    let report = sim
        .run(stream, config.horizon, config.record_interval)
        .map_err(|e| {
            warn!("Simulation aborted: {e}");
            e
        })?;
    Ok((sim.into_network(), report))
}

/// Run a simulation on requests drawn from a [`RequestGenerator`], seeded with `config.seed`.
pub fn run_seeded(
    net: PhysicalNetwork,
    requests: &RequestConfig,
    config: &SimConfig,
) -> Result<(PhysicalNetwork, SimReport), SimError> {
    let stream = RequestGenerator::new(requests.clone(), StdRng::seed_from_u64(config.seed))?;
    run_simulation(net, stream, config)
}
