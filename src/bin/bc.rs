//! Betweenness-centrality driver.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::info;

use surge::algorithms::BetweennessCentrality;
use surge::cli::GraphArgs;
use surge::formats::Csr;
use surge::graph::{self, Properties};
use surge::{Profiler, Queue};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = GraphArgs::parse();

    let csr: Csr<f32> = args
        .load_csr()
        .with_context(|| format!("reading {}", args.path.display()))?;

    let queue = Queue::new();
    let properties = Properties {
        directed: !args.undirected,
        weighted: false,
    };
    let graph = graph::build(&queue, &csr, properties, GraphArgs::graph_location())?;
    info!(
        "graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    let source = args.resolve_source(graph.vertex_count())?;
    let profiler = Arc::new(Profiler::new());
    let mut bc = BetweennessCentrality::new(&graph).with_profiler(profiler.clone());
    bc.init(source)?;

    info!("running betweenness centrality from source {source}");
    let started = Instant::now();
    bc.run()?;
    eprintln!("time: {:.3} ms", started.elapsed().as_secs_f64() * 1e3);
    eprint!("{}", profiler.report());

    if args.print_output {
        println!("{:<10}{:<14}", "vertex", "centrality");
        for (vertex, score) in bc.centralities()?.into_iter().enumerate() {
            println!("{vertex:<10}{score:<14}");
        }
    }

    Ok(())
}
