use std::collections::BTreeMap;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use pce::algo::{compute_path, AlgorithmKind, ComputationStatus, Constraints};
use pce::graph::{
    load_topology, Edge, EdgeAttributes, Prefix, SrgbRange, TopologyGraph, Vertex,
    CLASS_TYPE_COUNT,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "path_compute_bench")]
#[command(about = "Benchmark the SPF/CSPF/SAMCRA path computation algorithms")]
struct Args {
    #[arg(long, default_value_t = 100)]
    nodes: usize,
    #[arg(long, default_value_t = 0.08)]
    density: f64,
    #[arg(long, default_value_t = 3)]
    seeds: usize,
    #[arg(long, default_value_t = 1)]
    start_seed: u64,
    #[arg(long, default_value_t = 8)]
    iterations: usize,
    #[arg(long, default_value_t = 100)]
    bandwidth_floor: u64,
    #[arg(long)]
    topology_yaml: Option<PathBuf>,
    #[arg(long)]
    output_json: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct LcgRng {
    state: u64,
}

impl LcgRng {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        self.state
    }

    fn next_f64(&mut self) -> f64 {
        let raw = self.next_u64() >> 11;
        (raw as f64) / ((1_u64 << 53) as f64)
    }

    fn range_u32(&mut self, low: u32, high: u32) -> u32 {
        low + (self.next_f64() * f64::from(high - low)) as u32
    }
}

fn bench_vertex(id: u64) -> Vertex {
    Vertex {
        id,
        name: format!("node-{id}"),
        srgb: Some(SrgbRange {
            lower_bound: 16000,
            range_size: 8000,
        }),
        prefixes: vec![Prefix {
            address: IpAddr::V4(Ipv4Addr::new(10, (id >> 8) as u8, id as u8, 1)),
            length: 32,
            node_sid: Some(id as u32),
        }],
    }
}

fn bench_attributes(rng: &mut LcgRng, remote: u64) -> EdgeAttributes {
    let te_metric = rng.range_u32(1, 20);
    EdgeAttributes {
        te_metric,
        delay: rng.range_u32(1, 40),
        loss: rng.range_u32(0, 5),
        admin_group: 0,
        max_link_bandwidth: 1000,
        max_resv_bandwidth: 800,
        unreserved_bandwidth: [800; CLASS_TYPE_COUNT],
        remote_address: Some(Ipv4Addr::new(192, (remote >> 8) as u8, remote as u8, 2)),
        remote_address6: Some(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, remote as u16)),
    }
}

fn add_bench_link(graph: &mut TopologyGraph, rng: &mut LcgRng, next_edge: &mut u64, a: u64, b: u64) {
    let forward_id = *next_edge;
    let backward_id = forward_id + 1;
    *next_edge += 2;

    graph.add_edge(Edge {
        id: forward_id,
        source: a,
        destination: b,
        attributes: Some(bench_attributes(rng, b)),
        reverse: Some(backward_id),
        diverted: false,
    });
    graph.add_edge(Edge {
        id: backward_id,
        source: b,
        destination: a,
        attributes: Some(bench_attributes(rng, a)),
        reverse: Some(forward_id),
        diverted: false,
    });
}

/// Ring over all vertices plus random chords: connected, with enough
/// alternate branches to exercise the constrained searches.
fn generate_topology(seed: u64, nodes: usize, density: f64) -> TopologyGraph {
    let mut rng = LcgRng::new(seed);
    let mut graph = TopologyGraph::new();
    let nodes = nodes.max(2) as u64;

    for id in 1..=nodes {
        graph.add_vertex(bench_vertex(id));
    }

    let mut next_edge = 1;
    for id in 1..=nodes {
        let next = if id == nodes { 1 } else { id + 1 };
        add_bench_link(&mut graph, &mut rng, &mut next_edge, id, next);
    }

    let p = density.clamp(0.0, 1.0);
    for a in 1..=nodes {
        for b in (a + 2)..=nodes {
            if a == 1 && b == nodes {
                continue;
            }
            if rng.next_f64() < p {
                add_bench_link(&mut graph, &mut rng, &mut next_edge, a, b);
            }
        }
    }

    graph
}

fn bench_algorithm(
    name: &str,
    graph: &TopologyGraph,
    kind: AlgorithmKind,
    source: u64,
    destination: u64,
    constraints: &Constraints,
    iterations: usize,
) -> Value {
    let mut elapsed_ms = 0.0;
    let mut last = None;

    for _ in 0..iterations.max(1) {
        let start = Instant::now();
        let path = compute_path(graph, kind, source, destination, constraints);
        elapsed_ms += start.elapsed().as_secs_f64() * 1000.0;
        last = Some(path);
    }

    match last {
        Some(path) => json!({
            "algorithm": name,
            "runtime_ms": elapsed_ms / iterations.max(1) as f64,
            "status": format!("{:?}", path.status),
            "completed": path.status == ComputationStatus::Completed,
            "te_metric": path.te_metric,
            "delay": path.delay,
            "hops": path.hops.len(),
        }),
        None => json!({ "algorithm": name }),
    }
}

fn aggregate(seed_rows: &[Value]) -> Value {
    let mut buckets: BTreeMap<String, (usize, usize, f64)> = BTreeMap::new();
    for row in seed_rows {
        let Some(algorithms) = row.get("algorithms").and_then(Value::as_array) else {
            continue;
        };
        for algorithm in algorithms {
            let Some(name) = algorithm.get("algorithm").and_then(Value::as_str) else {
                continue;
            };
            let entry = buckets.entry(name.to_string()).or_default();
            entry.0 += 1;
            if algorithm.get("completed").and_then(Value::as_bool) == Some(true) {
                entry.1 += 1;
            }
            if let Some(runtime) = algorithm.get("runtime_ms").and_then(Value::as_f64) {
                entry.2 += runtime;
            }
        }
    }

    let rows: Vec<Value> = buckets
        .into_iter()
        .map(|(name, (runs, completed, runtime_sum))| {
            json!({
                "algorithm": name,
                "runs": runs,
                "completed": completed,
                "runtime_ms": if runs == 0 { 0.0 } else { runtime_sum / runs as f64 },
            })
        })
        .collect();
    Value::Array(rows)
}

fn print_summary(aggregated: &Value) {
    println!("algorithm\truns\tcompleted\truntime_ms");
    let Some(rows) = aggregated.as_array() else {
        return;
    };
    for row in rows {
        println!(
            "{}\t{}\t{}\t{:.4}",
            row.get("algorithm").and_then(Value::as_str).unwrap_or("?"),
            row.get("runs").and_then(Value::as_u64).unwrap_or(0),
            row.get("completed").and_then(Value::as_u64).unwrap_or(0),
            row.get("runtime_ms")
                .and_then(Value::as_f64)
                .unwrap_or(f64::NAN),
        );
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut seed_rows = Vec::new();

    for idx in 0..args.seeds.max(1) {
        let seed = args.start_seed + idx as u64;
        let graph = match args.topology_yaml.as_ref() {
            Some(path) => load_topology(path)?,
            None => generate_topology(seed, args.nodes, args.density),
        };

        let source = graph.vertex_ids().next().unwrap_or(1);
        let destination = graph.vertex_ids().last().unwrap_or(source);
        let hop_budget = 20 * graph.vertex_count().max(2) as u32;

        let cspf_constraints = Constraints {
            bandwidth: Some(args.bandwidth_floor),
            ..Constraints::default()
        };
        let samcra_constraints = Constraints {
            te_metric: Some(hop_budget),
            delay: Some(2 * hop_budget),
            ..Constraints::default()
        };

        let algorithms = vec![
            bench_algorithm(
                "spf",
                &graph,
                AlgorithmKind::Spf,
                source,
                destination,
                &Constraints::default(),
                args.iterations,
            ),
            bench_algorithm(
                "cspf",
                &graph,
                AlgorithmKind::Cspf,
                source,
                destination,
                &cspf_constraints,
                args.iterations,
            ),
            bench_algorithm(
                "samcra",
                &graph,
                AlgorithmKind::Samcra,
                source,
                destination,
                &samcra_constraints,
                args.iterations,
            ),
        ];

        seed_rows.push(json!({
            "seed": seed,
            "vertices": graph.vertex_count(),
            "edges": graph.edge_count(),
            "source": source,
            "destination": destination,
            "algorithms": algorithms,
        }));
    }

    let aggregated = aggregate(&seed_rows);
    print_summary(&aggregated);

    let payload = json!({
        "config": {
            "nodes": args.nodes,
            "density": args.density,
            "seeds": args.seeds,
            "start_seed": args.start_seed,
            "iterations": args.iterations,
            "bandwidth_floor": args.bandwidth_floor,
            "topology_yaml": args.topology_yaml,
        },
        "runs": seed_rows,
        "aggregate": aggregated,
    });

    if let Some(path) = args.output_json {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(&payload)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}
