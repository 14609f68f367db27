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

use std::{
    fs::{create_dir, File},
    io::BufWriter,
    path::PathBuf,
    time::Instant,
};

use clap::Parser;
use rand::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use time::{format_description, OffsetDateTime};

use slicesim::{
    builder::WaxmanConfig,
    generator::RequestConfig,
    provision::{Algorithm, ProvisionConfig},
    sim::{run_seeded, Horizon, SimConfig, SimError, SimReport},
};

/// Compare RT-CSP and RT-CSP+ on the same random network and the same stream of slice requests.
#[derive(Debug, Parser)]
struct Cli {
    /// Algorithms to run. If nothing was given, run all of them.
    #[clap(short = 'a', long = "algorithm")]
    algorithms: Vec<Algorithm>,
    /// Number of physical nodes
    #[clap(short = 'n', long = "nodes", default_value = "100")]
    nodes: usize,
    /// Number of slice requests to simulate. All departures are processed afterwards.
    #[clap(short = 'r', long = "requests", default_value = "2000")]
    requests: usize,
    /// Stop at this simulation time instead of after a fixed number of requests.
    #[clap(short = 'T', long = "time")]
    time: Option<f64>,
    /// Mean number of arrivals per time unit
    #[clap(short = 'l', long = "rate", default_value = "0.04")]
    arrival_rate: f64,
    /// Mean lifetime of a slice
    #[clap(short = 'L', long = "lifetime", default_value = "500")]
    mean_lifetime: f64,
    /// Probability that two nodes of a slice are connected
    #[clap(short = 'p', long = "prob", default_value = "0.5")]
    connection_probability: f64,
    /// Number of shortest paths considered for each slice link
    #[clap(short = 'k', default_value = "3")]
    k: usize,
    /// Weight of the local part of the node score
    #[clap(long, default_value = "0.5")]
    alpha: f64,
    /// Weight of the global part of the node score
    #[clap(long, default_value = "0.5")]
    beta: f64,
    /// Seed for both the physical network and the request stream
    #[clap(short = 's', long, default_value = "42")]
    seed: u64,
    /// Record the metrics every that many events.
    #[clap(short = 'i', long = "interval", default_value = "100")]
    record_interval: usize,
    /// Number of threads. Defaults to the number of CPUs.
    #[clap(short = 'j', long = "threads")]
    threads: Option<usize>,
    /// Write the results to this file instead of `results/slicesim_{timestamp}.json`.
    #[clap(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_timed();

    let args = Cli::parse();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.unwrap_or_else(num_cpus::get))
        .build_global()?;

    let algorithms = if args.algorithms.is_empty() {
        vec![Algorithm::RtCsp, Algorithm::RtCspPlus]
    } else {
        args.algorithms.clone()
    };

    let network = WaxmanConfig {
        nodes: args.nodes,
        ..Default::default()
    };
    let requests = RequestConfig {
        arrival_rate: args.arrival_rate,
        mean_lifetime: args.mean_lifetime,
        connection_probability: args.connection_probability,
        ..Default::default()
    };
    let horizon = match args.time {
        Some(t) => Horizon::Time(t),
        None => Horizon::Arrivals(args.requests),
    };

    let net = network.build(&mut StdRng::seed_from_u64(args.seed))?;
    println!(
        "Physical network: {} nodes, {} links",
        net.num_nodes(),
        net.num_links()
    );

    // every algorithm sees the same network and the same request stream
    let results: Vec<AlgorithmResult> = algorithms
        .into_par_iter()
        .map(|algorithm| -> Result<AlgorithmResult, SimError> {
            let config = SimConfig {
                provision: ProvisionConfig {
                    alpha: args.alpha,
                    beta: args.beta,
                    k: args.k,
                    algorithm,
                    ..Default::default()
                },
                seed: args.seed,
                horizon,
                record_interval: args.record_interval,
            };
            let start_time = Instant::now();
            let (_, report) = run_seeded(net.clone(), &requests, &config)?;
            Ok(AlgorithmResult {
                algorithm,
                config,
                time: start_time.elapsed().as_secs_f64(),
                report,
            })
        })
        .collect::<Result<_, _>>()?;

    for r in results.iter() {
        let m = &r.report.metrics;
        println!(
            "{: <8} {: >5}/{: <5} accepted ({: >6.2}%), node failures {: >5}, link failures {: >5}, revenue/time {: >8.2}, R/C {:.3}, took {:.3}s",
            r.algorithm.to_string(),
            m.accepted,
            m.arrivals,
            m.acceptance_ratio() * 100.0,
            m.node_failures,
            m.link_failures,
            m.revenue_per_time(),
            m.revenue_cost_ratio(),
            r.time,
        );
    }

    let path = match args.output {
        Some(path) => path,
        None => generate_path()?,
    };
    let experiment = Experiment {
        network: &network,
        requests: &requests,
        results: &results,
    };
    serde_json::to_writer_pretty(BufWriter::new(File::create(&path)?), &experiment)?;
    println!("Results written to {}", path.to_string_lossy());

    Ok(())
}

/// Generate the path of the results file, and create the results folder if necessary.
fn generate_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut path = PathBuf::from("results");
    if !path.exists() {
        create_dir(&path)?;
    }
    let cur_time = OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .format(&format_description::parse(
            "[year]-[month]-[day]_[hour]-[minute]-[second]",
        )?)?;
    path.push(format!("slicesim_{cur_time}.json"));
    Ok(path)
}

/// Everything that is written to the results file.
#[derive(Debug, Serialize)]
struct Experiment<'a> {
    network: &'a WaxmanConfig,
    requests: &'a RequestConfig,
    results: &'a [AlgorithmResult],
}

/// Result of a single algorithm.
#[derive(Debug, Serialize)]
struct AlgorithmResult {
    algorithm: Algorithm,
    config: SimConfig,
    time: f64,
    report: SimReport,
}
